use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::limits::LimitsConfig;
use crate::logging::LoggingConfig;
use crate::validate;

/// Top-level engine configuration, read from TOML.
///
/// ```toml
/// [limits]
/// max_depth = 128
/// max_input_bytes = 65536
///
/// [logging]
/// level = "info"
/// format = "plain"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for EngineConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a validated [`EngineConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        validate::validate(&config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
