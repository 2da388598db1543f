//! Config command handlers

use anyhow::{bail, Context, Result};

use biblio_core::Config;

use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;

pub fn run(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Set { key, value }) => set(&key, &value, output),
        Some(ConfigCommands::Show) | None => show(output),
    }
}

/// Show the effective configuration and where it came from
fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url);
        }
        OutputFormat::Human => {
            println!("api_url:  {}", config.api_url);
            println!("data_dir: {}", config.data_dir.display());
            match &config.log_file {
                Some(path) => println!("log_file: {}", path.display()),
                None => println!("log_file: (not set)"),
            }
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Change one configuration value and save the file
fn set(key: &str, value: &str, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key {
        "api_url" => config.api_url = value.to_string(),
        "data_dir" => config.data_dir = value.into(),
        "log_file" => {
            config.log_file = match value {
                "" | "none" => None,
                path => Some(path.into()),
            }
        }
        _ => bail!(
            "Unknown configuration key '{}'. Valid keys: api_url, data_dir, log_file",
            key
        ),
    }

    config.save().context("Failed to save configuration")?;
    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
