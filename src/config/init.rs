use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, parse_window, Config, EgressConfig, DEFAULT_EGRESS_WINDOW};
use crate::prompt::Prompter;

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, writes there; otherwise to the default config path.
pub fn run_init_wizard<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    default_path: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let config_path = default_path.unwrap_or_else(get_config_path);

    prompter.say("pillarscore configuration")?;
    prompter.say("=========================")?;

    if config_path.exists() {
        let overwrite = prompter.ask_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            prompter.say("Keeping existing config.")?;
            return Ok(None);
        }
    }

    let config = collect_config(prompter)?;

    let yaml = serde_saphyr::to_string(&config).context("Failed to serialize config")?;
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }
    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    prompter.say(&format!("Config written to {}", config_path.display()))?;
    Ok(Some(config_path))
}

fn collect_config<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<Config> {
    prompter.say("Results and egress logs are stored per user id.")?;
    let user_id = loop {
        let input = prompter.ask("User id: ")?;
        if !input.is_empty() {
            break input;
        }
        prompter.say("  Invalid: must not be empty. Try again.")?;
    };

    let catalog = prompter.ask("Catalog file (leave empty to pass --catalog each time): ")?;

    prompter.say("The egress window is how far back `pillarscore egress` looks by default.")?;
    let window = loop {
        let input = prompter.ask_with_default("Egress window", DEFAULT_EGRESS_WINDOW)?;
        match parse_window(&input) {
            Ok(_) => break input,
            Err(e) => prompter.say(&format!("  Invalid: {}. Try again.", e))?,
        }
    };

    Ok(Config {
        user_id: Some(user_id),
        catalog: (!catalog.is_empty()).then(|| PathBuf::from(catalog)),
        data_dir: None,
        egress: EgressConfig { window },
    })
}
