use serde::Deserialize;

use rulex_lang::ParseLimits;

/// Parser bounds. All fields have defaults so the `[limits]` section may be
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum nesting depth and tree height of a parsed expression.
    pub max_depth: usize,
    /// Maximum expression source length in bytes.
    pub max_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: ParseLimits::DEFAULT_MAX_DEPTH,
            max_input_bytes: ParseLimits::DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl From<&LimitsConfig> for ParseLimits {
    fn from(cfg: &LimitsConfig) -> Self {
        ParseLimits {
            max_depth: cfg.max_depth,
            max_input_bytes: cfg.max_input_bytes,
        }
    }
}
