pub mod init;
mod schema;

pub use schema::{parse_window, validate_config, Config, EgressConfig, DEFAULT_EGRESS_WINDOW};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (~/.config/pillarscore/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pillarscore")
}

/// Get the default config file path (~/.config/pillarscore/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/pillarscore/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or names unknown fields
/// - Any value fails validation
///
/// A missing file at the default path is not an error and yields defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Invalid config in {}", config_path.display()))
}

/// Parse and validate configuration YAML
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        serde_saphyr::from_str(content).context("Failed to parse config: invalid YAML")?;

    if let Err(errors) = validate_config(&config) {
        anyhow::bail!("{}", errors.join("\n"));
    }

    config.catalog = config.catalog.as_deref().map(expand_home);
    config.data_dir = config.data_dir.as_deref().map(expand_home);
    Ok(config)
}
