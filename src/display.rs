use std::{
    fmt::{Formatter, Result as FmtResult, Display},
};

use crate::{
    dictionary::{OrderedDictionary},
};

/// Renders a single pair in the `key : value` dump format.
pub struct PairDisplay<'a, K, V>(pub &'a K, pub &'a V) where
    K: Display,
    V: Display;
impl<'a, K, V> Display for PairDisplay<'a, K, V> where
    K: Display,
    V: Display
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} : {}", self.0, self.1)
    }
}

/// Renders every pair of a dictionary as a `key : value` line, in
/// ascending key order.
pub struct OrderedDisplay<'a, K, V>(pub &'a OrderedDictionary<K, V>) where
    K: Ord + Display,
    V: Display;
impl<'a, K, V> Display for OrderedDisplay<'a, K, V> where
    K: Ord + Display,
    V: Display
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (key, value) in self.0.iter() {
            writeln!(f, "{}", PairDisplay(key, value))?;
        }
        Ok(())
    }
}

/// Renders every key of a dictionary on its own line, in pre-order.
pub struct PreOrderDisplay<'a, K, V>(pub &'a OrderedDictionary<K, V>) where
    K: Ord + Display;
impl<'a, K, V> Display for PreOrderDisplay<'a, K, V> where
    K: Ord + Display
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (key, _) in self.0.pre_order() {
            writeln!(f, "{}", key)?;
        }
        Ok(())
    }
}
