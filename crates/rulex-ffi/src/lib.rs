//! C ABI for the rulex expression engine.
//!
//! Every buffer or handle returned here is owned by the caller until it is
//! passed back to the matching release function exactly once:
//!
//! | returned by                                   | released with            |
//! |-----------------------------------------------|--------------------------|
//! | `expression_parse`, `expression_engine_parse` | `expression_free`        |
//! | `expression_evaluate`, `evaluate`, ...        | `free_evaluate`          |
//! | `expression_engine_new`                       | `expression_engine_free` |
//! | `ExpressionError::message`                    | `expression_error_free`  |
//!
//! Panics never cross the boundary; they surface as error code 2003.

mod api;
pub mod error;
mod record;
pub mod tracing_init;

pub use api::*;
pub use error::FfiReason;
pub use record::{ExpressionError, expression_error_free};
