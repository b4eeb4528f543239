use std::fmt;
use std::io;

/// Fatal errors, mapped onto exit codes by the CLI: usage/parse/I-O exit 1,
/// invariant violations exit 2. DSL runtime type errors are not here; they
/// stay data-local as the error value.
#[derive(Debug)]
pub enum Error {
    Usage(String),
    Parse(String),
    Io(io::Error),
    Invariant(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn usage(msg: impl Into<String>) -> Error {
        Error::Usage(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Error {
        Error::Parse(msg.into())
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Invariant(_) => 2,
            _ => 1,
        }
    }

    /// A write failure on a closed downstream pipe is normal end-of-stream.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage(msg) => write!(f, "usage: {msg}"),
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Invariant(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<strec_dsl::error::Errors> for Error {
    fn from(e: strec_dsl::error::Errors) -> Self {
        Error::Parse(e.to_string())
    }
}
