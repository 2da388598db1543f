//! Status command handler

use anyhow::Result;

use biblio_core::{Config, Session};

use crate::output::{Output, OutputFormat};

/// Show session status
pub async fn show(session: &mut Session, config: &Config, output: &Output) -> Result<()> {
    if session.is_authenticated() {
        session.bootstrap().await;
    }

    let prefs = session.preferences();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "authenticated": session.is_authenticated(),
                    "user": session.user().map(|u| u.email.clone()),
                    "error": session.error(),
                    "counts": {
                        "books": session.books().len(),
                        "authors": session.authors().len()
                    },
                    "preferences": {
                        "theme": prefs.theme.to_string(),
                        "font_scale": prefs.font_scale.to_string()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!(
                "{}",
                if session.is_authenticated() {
                    "authenticated"
                } else {
                    "anonymous"
                }
            );
        }
        OutputFormat::Human => {
            println!("Biblio Status");
            println!("=============");
            println!();
            println!("Server:");
            println!("  URL: {}", config.api_url);
            println!();
            println!("Session:");
            match session.user() {
                Some(user) => println!("  Logged in as {}", user.email),
                None if session.is_authenticated() => {
                    println!("  Token present (user not fetched)")
                }
                None => println!("  Not logged in"),
            }
            if let Some(err) = session.error() {
                println!("  Warning: {}", err);
            }
            println!();
            println!("Contents:");
            println!("  Books:   {}", session.books().len());
            println!("  Authors: {}", session.authors().len());
            println!();
            println!("Preferences:");
            println!("  Theme:      {}", prefs.theme);
            println!("  Font scale: {}", prefs.font_scale);
        }
    }

    Ok(())
}
