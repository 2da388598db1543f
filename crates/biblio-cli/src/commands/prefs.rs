//! Preference command handlers

use anyhow::{bail, Result};

use biblio_core::{FontScale, PreferencesPatch, Session, Theme};

use crate::output::{Output, OutputFormat};
use crate::PrefsCommands;

pub async fn run(
    command: Option<PrefsCommands>,
    session: &mut Session,
    output: &Output,
) -> Result<()> {
    match command {
        Some(PrefsCommands::Set { key, value }) => set(session, &key, &value, output).await,
        Some(PrefsCommands::Show) | None => show(session, output),
    }
}

/// Show the current display preferences
fn show(session: &Session, output: &Output) -> Result<()> {
    let prefs = session.preferences();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "theme": prefs.theme.to_string(),
                    "font_scale": prefs.font_scale.to_string(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{} {}", prefs.theme, prefs.font_scale);
        }
        OutputFormat::Human => {
            println!("theme:      {}", prefs.theme);
            println!("font_scale: {}", prefs.font_scale);
        }
    }

    Ok(())
}

/// Change one display preference
///
/// The change lands locally first; when a session token is present it is
/// also mirrored to the server, best-effort.
async fn set(session: &mut Session, key: &str, value: &str, output: &Output) -> Result<()> {
    let patch = match key {
        "theme" => {
            let theme: Theme = value.parse().map_err(anyhow::Error::msg)?;
            PreferencesPatch::theme(theme)
        }
        "font_scale" | "fontscale" => {
            let scale: FontScale = value.parse().map_err(anyhow::Error::msg)?;
            PreferencesPatch::font_scale(scale)
        }
        _ => bail!("Unknown preference key '{}'. Valid keys: theme, font_scale", key),
    };

    session.set_preferences(patch).await;
    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
