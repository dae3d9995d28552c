use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Logging configuration. All fields have defaults so the entire `[logging]`
/// section may be omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global level filter (`"info"`, `"debug"`, ...).
    pub level: String,
    /// Per-target overrides, e.g. `{ rulex_core = "debug" }`.
    pub modules: HashMap<String, String>,
    /// Optional log file. Relative paths resolve against the directory passed
    /// to the subscriber initialiser.
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: HashMap::new(),
            file: None,
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive string: global level first, then module overrides
    /// sorted by target so the result is stable.
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        let mut directives = vec![self.level.clone()];
        directives.extend(modules.into_iter().map(|(target, level)| format!("{target}={level}")));
        directives.join(",")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}
