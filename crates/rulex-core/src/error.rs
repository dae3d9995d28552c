use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};
use rulex_lang::ParseError;

use crate::eval::EvalError;
use crate::event::EventError;

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("{0}")]
    Parse(ParseError),
    #[error("{0}")]
    Eval(EvalError),
    #[error("{0}")]
    Event(EventError),
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Parse(e) => e.code(),
            Self::Eval(e) => e.code(),
            Self::Event(e) => e.code(),
            Self::Uvs(u) => u.error_code(),
        }
    }
}

impl CoreReason {
    /// Byte offset into the expression source, for parse failures.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Parse(e) => Some(e.position),
            _ => None,
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
