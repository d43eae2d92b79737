use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

pub type Result<T> = std::result::Result<T, ForthError>;

/// Any failure raised while parsing or executing program text, plus the two non-local exits.
///
/// ABORT and QUIT are not errors in the user-visible sense: they unwind out of whatever is
/// executing and are caught at the source-driver boundary, which treats them as a clean end
/// of that source.  Carrying them in the error channel gives them exactly the propagation
/// behavior of an exception without any separate machinery.
#[derive(Clone, PartialEq, Eq)]
pub enum ForthError {
    /// A script error with a human readable message.
    Script(String),

    /// The ABORT unwind.  The data, return and execution stacks have already been cleared.
    Abort,

    /// The QUIT unwind.  The return and execution stacks have already been cleared.
    Quit,
}

impl ForthError {
    /// Is this one of the two non-local exits rather than a reportable error?
    pub fn is_unwind(&self) -> bool {
        matches!(self, ForthError::Abort | ForthError::Quit)
    }

    /// The message to report to the user.
    pub fn message(&self) -> &str {
        match self {
            ForthError::Script(message) => message,
            ForthError::Abort => "ABORT",
            ForthError::Quit => "QUIT",
        }
    }
}

impl Error for ForthError {}

impl Display for ForthError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Debug for ForthError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Allow I/O failures to surface as script errors.
impl From<std::io::Error> for ForthError {
    fn from(error: std::io::Error) -> ForthError {
        ForthError::Script(format!("I/O error: {}", error))
    }
}

/// Create a new script error wrapped in a Result::Err.
pub fn script_error<T>(message: String) -> Result<T> {
    Err(ForthError::Script(message))
}

/// Create a new script error from a fixed message, wrapped in a Result::Err.
pub fn script_error_str<T>(message: &str) -> Result<T> {
    script_error(message.to_string())
}
