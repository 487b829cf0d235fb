use portfolio_rollup_core::calendar::{Granularity, YearWindow};
use portfolio_rollup_core::ProrationMode;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

use crate::input::file::resolve_path;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "PORTFOLIO_ROLLUP_CONFIG";

/// Defaults applied beneath the input file and command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub granularity: Granularity,
    pub proration: ProrationMode,
    pub year_window: YearWindow,
    /// tracing filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Month,
            proration: ProrationMode::Fractional,
            year_window: YearWindow::default(),
            log_level: "warn".to_string(),
        }
    }
}

/// Load the YAML config named by `--config` or `PORTFOLIO_ROLLUP_CONFIG`.
///
/// No file configured means built-in defaults; a configured file that is
/// missing or malformed is an error.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_string(),
        None => match env::var(CONFIG_ENV) {
            Ok(p) if !p.trim().is_empty() => p,
            _ => return Ok(AppConfig::default()),
        },
    };

    let canonical = resolve_path(&path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read config '{}': {}", canonical.display(), e))?;
    let config = parse_config(&contents)
        .map_err(|e| format!("Failed to parse config '{}': {}", canonical.display(), e))?;
    tracing::debug!(path = %canonical.display(), "loaded config");
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<AppConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(contents)
}
