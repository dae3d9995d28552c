pub mod engine;
pub mod limits;
pub mod logging;
mod validate;

pub use engine::EngineConfig;
pub use limits::LimitsConfig;
pub use logging::{LogFormat, LoggingConfig};
