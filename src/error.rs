use crate::compiler::CompileError;
use crate::syntax::SyntaxError;

/// Why a pattern could not be turned into a [`Pattern`](crate::Pattern).
///
/// A subject that does not match is never an error; matching methods
/// return `None` or `false` for that.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The pattern text is malformed.
    Syntax(SyntaxError),
    /// The pattern parsed but could not be lowered to a program.
    Compile(CompileError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "Syntax error: {err}"),
            Self::Compile(err) => write!(f, "Compile error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(err) => Some(err),
            Self::Compile(err) => Some(err),
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Self::Syntax(err)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}
