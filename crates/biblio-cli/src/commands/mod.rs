//! Command handlers

pub mod auth;
pub mod author;
pub mod book;
pub mod config;
pub mod prefs;
pub mod status;

use anyhow::{bail, Result};
use biblio_core::Session;

/// Require a token and bring collections up to date
///
/// Data commands call this first; the bootstrap's generic error becomes
/// the command failure.
pub(crate) async fn sync_session(session: &mut Session) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not logged in. Run `biblio login <email>` first.");
    }

    session.bootstrap().await;
    if let Some(err) = session.error() {
        bail!("{}", err);
    }

    Ok(())
}
