use std::{
    io::{self, Result as IoResult, BufRead, BufReader, Write, BufWriter, Read, Stdout, Stderr, StderrLock, StdoutLock},
    path::{PathBuf, Path},
    fmt::{self, Display, Debug, Result as FmtResult, Formatter, Arguments as FmtArguments},
    sync::{Mutex},
};

lazy_static! {
    pub static ref FilePathDb: Mutex<Vec<PathBuf>> = {
        Mutex::new(Vec::<PathBuf>::new())
    };
}

#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct FilePath {
    off: usize
}
impl FilePath {
    #[inline(always)]
    pub fn new(path: PathBuf) -> FilePath {
        let mut lock = FilePathDb.lock().unwrap();
        let off = lock.len();
        lock.push(path);
        FilePath { off: off }
    }
    #[inline(always)]
    pub fn unknown() -> FilePath {
        FilePath { off: usize::max_value() }
    }
}
impl Display for FilePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let lock = FilePathDb.lock().unwrap();
        let path = lock.get(self.off).map_or_else(|| Path::new("(unknown)"), |pb| pb.as_path());
        write!(f, "{}", path.display())
    }
}
impl Debug for FilePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

/// Position within a line-oriented input file.
#[derive(Clone, Copy)]
pub struct FilePosition {
    file: FilePath,
    line: u64,
    eof: bool,
}
impl FilePosition {
    #[inline(always)]
    pub fn new(path: FilePath) -> FilePosition {
        FilePosition {
            file: path,
            line: 0u64,
            eof: false,
        }
    }
    /// 1-based number of the last line read, or `0` if nothing was read yet.
    #[inline(always)]
    pub fn line(&self) -> u64 {
        self.line
    }
    #[inline(always)]
    pub fn path(&self) -> &FilePath {
        &self.file
    }
    #[inline(always)]
    pub fn finished(&self) -> bool {
        self.eof
    }
    #[inline(always)]
    fn advance(&mut self) {
        self.line += 1u64
    }
    #[inline(always)]
    fn finish(&mut self) {
        self.eof = true
    }
}
impl Display for FilePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: ", &self.file)?;
        if self.finished() {
            write!(f, "EOF")
        } else {
            write!(f, "line {}", self.line)
        }
    }
}
impl Debug for FilePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

/// Manages a reader by buffering, panicking on errors and keeping track of file position.
/// Iterates over input lines with the line terminator stripped.
pub struct InputReader<R> where R: Read {
    buf: BufReader<R>,
    pos: FilePosition,
}
impl<R> InputReader<R> where
    R: Read
{
    pub fn new(reader: R, path: FilePath) -> InputReader<R> {
        InputReader {
            buf: BufReader::with_capacity(1usize << 16, reader),
            pos: FilePosition::new(path),
        }
    }
    #[inline(always)]
    pub fn position(&self) -> &FilePosition {
        &self.pos
    }
}
impl<R> Iterator for InputReader<R> where
    R: Read
{
    type Item = String;
    fn next(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.buf.read_line(&mut line) {
            Ok(0usize) => {
                self.pos.finish();
                None
            },
            Ok(_) => {
                self.pos.advance();
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            },
            Err(err) => panic!("error reading file {}: {}", self.pos.path(), err),
        }
    }
}

/// Writes to a buffered output sink identified through a path, and manages panics on error.
pub struct OutputWriter<W: Write> {
    buf: BufWriter<W>,
    path: FilePath,
}
impl<W: Write> OutputWriter<W> {
    pub fn new(wt: W, path: FilePath) -> OutputWriter<W> {
        OutputWriter::<W>::with_capacity(wt, path, 1usize << 16)
    }
    pub fn with_capacity(wt: W, path: FilePath, cap: usize) -> OutputWriter<W> {
        OutputWriter::<W> {
            buf: BufWriter::with_capacity(cap, wt),
            path: path,
        }
    }
}
impl<W: Write> Write for OutputWriter<W> {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        Ok(self.buf.write(buf).unwrap_or_else(|err| panic!("error writing file {}: {}", self.path, err)))
    }
    fn flush(&mut self) -> IoResult<()> {
        Ok(self.buf.flush().unwrap_or_else(|err| panic!("error writing file {}: {}", self.path, err)))
    }
}

pub struct OutputMuting {
    mute: bool
}
impl OutputMuting {
    fn new() -> OutputMuting {
        OutputMuting { mute: false }
    }
    pub fn mute(&mut self) {
        self.mute = true;
    }
    pub fn unmute(&mut self) {
        self.mute = false;
    }
    pub fn is_muted(&self) -> bool {
        self.mute
    }
}

lazy_static! {
    pub static ref MutedOutput: Mutex<OutputMuting> = Mutex::new(OutputMuting::new());
}

pub struct OutputHandle {
    stdout: Stdout,
    stderr: Stderr,
}
impl OutputHandle {
    pub fn new() -> OutputHandle {
        OutputHandle {
            stdout: io::stdout(),
            stderr: io::stderr(),
        }
    }
    pub fn out(&self, args: FmtArguments) -> StdoutLock {
        let mut lock = self.stdout.lock();
        lock.write_fmt(args).unwrap_or_else(|err| panic!("{}", err));
        lock
    }
    pub fn err(&self, args: FmtArguments) -> StderrLock {
        let mut lock = self.stderr.lock();
        lock.write_fmt(args).unwrap_or_else(|err| panic!("{}", err));
        lock
    }
    pub fn maybe_out(&self, args: FmtArguments) -> Option<StdoutLock> {
        if MutedOutput.lock().unwrap().is_muted() {
            None
        } else {
            Some(self.out(args))
        }
    }
    pub fn maybe_err(&self, args: FmtArguments) -> Option<StderrLock> {
        if MutedOutput.lock().unwrap().is_muted() {
            None
        } else {
            Some(self.err(args))
        }
    }
}

lazy_static! {
    pub static ref MainOutput: OutputHandle = {
        OutputHandle::new()
    };
}

/// Panic payload carrying a message that has already been rendered through
/// the message macros, so that `main` can print it verbatim.
pub struct PrintedPanic {
    message: String,
}
impl PrintedPanic {
    pub fn new(args: FmtArguments) -> PrintedPanic {
        PrintedPanic { message: fmt::format(args) }
    }
    pub fn check(&self, s: &str) -> bool {
        self.message.contains(s)
    }
}
impl Write for PrintedPanic {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.message.push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }
    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
impl Display for PrintedPanic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.message)
    }
}

#[macro_export]
macro_rules! breakline {
    ($lock: expr) => {
        std::io::Write::write_fmt(&mut $lock, format_args!("\n  ")).unwrap_or_else(|err| panic!("{}", err))
    }
}

#[macro_export]
macro_rules! append {
    ($lock: expr, $($args: expr),*) => {
        std::io::Write::write_fmt(&mut $lock, format_args!("{}", format!($($args),*))).unwrap_or_else(|err| panic!("{}", err))
    }
}

#[macro_export]
macro_rules! headed_message {
    ($constructor: expr, $tag_style: expr, $tag: literal, $title_style: expr, $title: literal, $pos: expr, $lock: ident, $block: block, $after: expr) => {
        if let Some(mut $lock) = $constructor(format_args!("{} {}", $tag_style($tag), $title_style($title))) {
            breakline!($lock);
            if let Some(pos) = $pos {
                append!($lock, "{} {}", ::colored::Colorize::bold(::colored::Colorize::blue("-->")), format!("{}", pos));
                breakline!($lock);
            }
            $block
            std::io::Write::write_fmt(&mut $lock, format_args!("\n\n")).unwrap_or_else(|err| panic!("{}", err));
            $after($lock)
        } else {
            let $lock = ();
            $after($lock)
        }
    };
    ($constructor: expr, $title_style: expr, $title: literal, $pos: expr, $lock: ident, $block: block, $after: expr) => {
        if let Some(mut $lock) = $constructor(format_args!("{}", $title_style($title))) {
            breakline!($lock);
            if let Some(pos) = $pos {
                append!($lock, "{} {}", ::colored::Colorize::bold(::colored::Colorize::blue("-->")), format!("{}", pos));
                breakline!($lock);
            }
            $block
            std::io::Write::write_fmt(&mut $lock, format_args!("\n\n")).unwrap_or_else(|err| panic!("{}", err));
            $after($lock)
        } else {
            let $lock = ();
            $after($lock)
        }
    };
}

#[macro_export]
macro_rules! create_message {
    (panick @ $title: literal, $pos: expr, $lock: ident, $block: block) => {{
        headed_message!(|lock| Some($crate::io::PrintedPanic::new(lock)),
            |msg| ::colored::Colorize::bold(::colored::Colorize::red(msg)), "Fatal error:",
            |msg| ::colored::Colorize::bold(msg), $title,
            $pos, $lock, $block, |lock| std::panic::panic_any(lock))
    }};
    (fatal @ $title: literal, $pos: expr, $lock: ident, $block: block) => {{
        headed_message!(|lock| $crate::io::MainOutput.maybe_err(lock),
            |msg| ::colored::Colorize::bold(::colored::Colorize::red(msg)), "Fatal error:",
            |msg| ::colored::Colorize::bold(msg), $title,
            $pos, $lock, $block, |_| ())
    }};
    (warning @ $title: literal, $pos: expr, $lock: ident, $block: block) => {{
        headed_message!(|lock| $crate::io::MainOutput.maybe_err(lock),
            |msg| ::colored::Colorize::bold(::colored::Colorize::yellow(msg)), "Warning:",
            |msg| ::colored::Colorize::bold(msg), $title,
            $pos, $lock, $block, |_| ())
    }};
    (info @ $title: literal, $pos: expr, $lock: ident, $block: block) => {{
        headed_message!(|lock| $crate::io::MainOutput.maybe_out(lock),
            |msg| ::colored::Colorize::bold(msg), $title,
            $pos, $lock, $block, |_| ())
    }};
    (success @ $title: literal, $pos: expr, $lock: ident, $block: block) => {{
        headed_message!(|lock| $crate::io::MainOutput.maybe_out(lock),
            |msg| ::colored::Colorize::bold(::colored::Colorize::green(msg)), "Success:",
            |msg| ::colored::Colorize::bold(msg), $title,
            $pos, $lock, $block, |_| ())
    }};
    (progress @ $title: literal, $pos: expr, $lock: ident, $block: block) => {{
        headed_message!(|lock| $crate::io::MainOutput.maybe_out(lock),
            |msg| ::colored::Colorize::bold(::colored::Colorize::blue(msg)), "Progress:",
            |msg| ::colored::Colorize::bold(msg), $title,
            $pos, $lock, $block, |_| ())
    }};
}

#[macro_export]
macro_rules! panick {
    ($title: literal @ $pos: expr, $lock: ident, $block: block) => {
        create_message!(panick @ $title, Some(&$pos), $lock, $block)
    };
    ($title: literal, $lock: ident, $block: block) => {
        create_message!(panick @ $title, Option::<&$crate::io::FilePosition>::None, $lock, $block)
    };
}

#[macro_export]
macro_rules! fatal {
    ($title: literal @ $pos: expr, $lock: ident, $block: block) => {
        create_message!(fatal @ $title, Some(&$pos), $lock, $block)
    };
    ($title: literal, $lock: ident, $block: block) => {
        create_message!(fatal @ $title, Option::<&$crate::io::FilePosition>::None, $lock, $block)
    };
}

#[macro_export]
macro_rules! warning {
    ($title: literal @ $pos: expr, $lock: ident, $block: block) => {
        create_message!(warning @ $title, Some(&$pos), $lock, $block)
    };
    ($title: literal, $lock: ident, $block: block) => {
        create_message!(warning @ $title, Option::<&$crate::io::FilePosition>::None, $lock, $block)
    };
}

#[macro_export]
macro_rules! info {
    ($title: literal @ $pos: expr, $lock: ident, $block: block) => {
        create_message!(info @ $title, Some(&$pos), $lock, $block)
    };
    ($title: literal, $lock: ident, $block: block) => {
        create_message!(info @ $title, Option::<&$crate::io::FilePosition>::None, $lock, $block)
    };
}

#[macro_export]
macro_rules! success {
    ($title: literal @ $pos: expr, $lock: ident, $block: block) => {
        create_message!(success @ $title, Some(&$pos), $lock, $block)
    };
    ($title: literal, $lock: ident, $block: block) => {
        create_message!(success @ $title, Option::<&$crate::io::FilePosition>::None, $lock, $block)
    };
}

#[macro_export]
macro_rules! progress {
    ($title: literal @ $pos: expr, $lock: ident, $block: block) => {
        create_message!(progress @ $title, Some(&$pos), $lock, $block)
    };
    ($title: literal, $lock: ident, $block: block) => {
        create_message!(progress @ $title, Option::<&$crate::io::FilePosition>::None, $lock, $block)
    };
}
