use std::{
	error::{Error},
	fmt::{Display, Formatter, Result as FmtResult},
};

/// Identifies the dictionary entry point that raised an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
	GetValue,
	Remove,
	CurrentKey,
	CurrentValue,
	Next,
	Prev,
}
impl Operation {
	pub fn name(self) -> &'static str {
		match self {
			Operation::GetValue => "get_value",
			Operation::Remove => "remove",
			Operation::CurrentKey => "current_key",
			Operation::CurrentValue => "current_value",
			Operation::Next => "next",
			Operation::Prev => "prev",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		write!(f, "{}", self.name())
	}
}

/// Failure raised by a dictionary operation. Every failure is detected
/// before any structural change, so a returned error implies the
/// dictionary is exactly as it was before the call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DictionaryError {
	/// A value was requested for a key that is not in the dictionary.
	Lookup(Operation),
	/// A cursor operation was called while the cursor is undefined, or a
	/// removal targeted an absent key.
	Precondition(Operation),
}
impl DictionaryError {
	pub fn operation(&self) -> Operation {
		match self {
			DictionaryError::Lookup(op) => *op,
			DictionaryError::Precondition(op) => *op,
		}
	}
}
impl Display for DictionaryError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			DictionaryError::Lookup(op) => write!(f, "{}(): the dictionary does not contain the given key", op),
			DictionaryError::Precondition(Operation::Remove) => write!(f, "remove(): the dictionary does not contain the given key"),
			DictionaryError::Precondition(op) => write!(f, "{}(): the traversal cursor is undefined", op),
		}
	}
}
impl Error for DictionaryError {}

pub type DictionaryResult<T> = Result<T, DictionaryError>;
