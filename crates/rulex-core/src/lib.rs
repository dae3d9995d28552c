#[macro_use]
mod log_macros;

pub mod engine;
pub mod error;
pub mod eval;
pub mod event;

pub use engine::Engine;
pub use error::{CoreError, CoreReason, CoreResult};
pub use eval::{EvalError, EvalErrorKind, evaluate};
pub use event::{EventContext, EventError, FieldSource};
