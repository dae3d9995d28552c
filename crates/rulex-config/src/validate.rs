use rulex_lang::ParseLimits;

use crate::engine::EngineConfig;

const MAX_DEPTH_CEILING: usize = ParseLimits::MAX_DEPTH_CEILING;
const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Internal validation, called by `EngineConfig::from_str` / `load`.
pub(crate) fn validate(config: &EngineConfig) -> anyhow::Result<()> {
    let limits = &config.limits;
    if limits.max_depth == 0 || limits.max_depth > MAX_DEPTH_CEILING {
        anyhow::bail!(
            "limits.max_depth must be in 1..={MAX_DEPTH_CEILING}, got {}",
            limits.max_depth,
        );
    }
    if limits.max_input_bytes == 0 {
        anyhow::bail!("limits.max_input_bytes must be > 0");
    }

    check_level("logging.level", &config.logging.level)?;
    for (target, level) in &config.logging.modules {
        check_level(&format!("logging.modules.{target}"), level)?;
    }
    Ok(())
}

fn check_level(key: &str, level: &str) -> anyhow::Result<()> {
    if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        anyhow::bail!("{key}: unknown log level {level:?}, expected one of {LEVELS:?}");
    }
    Ok(())
}
