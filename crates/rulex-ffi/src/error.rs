use orion_error::ErrorCode;
use rulex_core::CoreReason;
use rulex_lang::ParseError;

/// Failure at the C boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FfiReason {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("result contains an interior NUL byte")]
    InvalidOutput,
    #[error("internal panic")]
    Panic,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("logging initialisation failed: {0}")]
    Logging(String),
    #[error("{0}")]
    Core(CoreReason),
}

impl ErrorCode for FfiReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) => 2001,
            Self::InvalidOutput => 2002,
            Self::Panic => 2003,
            Self::Config(_) => 2004,
            Self::Logging(_) => 2005,
            Self::Core(c) => c.error_code(),
        }
    }
}

impl FfiReason {
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Core(c) => c.position(),
            _ => None,
        }
    }
}

impl From<CoreReason> for FfiReason {
    fn from(reason: CoreReason) -> Self {
        Self::Core(reason)
    }
}

impl From<ParseError> for FfiReason {
    fn from(e: ParseError) -> Self {
        Self::Core(e.into())
    }
}
