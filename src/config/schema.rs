use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Summary window used when `egress --since` is not given
pub const DEFAULT_EGRESS_WINDOW: &str = "30d";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identity used when --user is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub egress: EgressConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EgressConfig {
    /// humantime span, e.g. "30d" or "12h"
    #[serde(default = "default_window")]
    pub window: String,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

fn default_window() -> String {
    DEFAULT_EGRESS_WINDOW.to_string()
}

impl EgressConfig {
    /// Parsed summary window. Only meaningful after [`validate_config`].
    pub fn window_duration(&self) -> Option<Duration> {
        parse_window(&self.window).ok()
    }
}

/// Parse a humantime span, rejecting zero.
pub fn parse_window(s: &str) -> Result<Duration, String> {
    let duration = humantime::parse_duration(s.trim()).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err("window must be longer than zero".to_string());
    }
    Ok(duration)
}

/// Validate a loaded configuration.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref user_id) = config.user_id {
        if user_id.trim().is_empty() {
            errors.push("user_id: must not be empty".to_string());
        }
    }

    if let Some(ref catalog) = config.catalog {
        if catalog.as_os_str().is_empty() {
            errors.push("catalog: path must not be empty".to_string());
        }
    }

    if let Some(ref data_dir) = config.data_dir {
        if data_dir.as_os_str().is_empty() {
            errors.push("data_dir: path must not be empty".to_string());
        }
    }

    if let Err(e) = parse_window(&config.egress.window) {
        errors.push(format!("egress.window: invalid '{}' - {}", config.egress.window, e));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
