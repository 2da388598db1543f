//! Author command handlers

use anyhow::{bail, Result};

use biblio_core::{NewAuthor, Session};

use crate::commands::sync_session;
use crate::output::Output;
use crate::AuthorCommands;

pub async fn run(command: AuthorCommands, session: &mut Session, output: &Output) -> Result<()> {
    match command {
        AuthorCommands::Add { name, biography } => add(session, name, biography, output).await,
        AuthorCommands::List => list(session, output).await,
    }
}

/// List authors
async fn list(session: &mut Session, output: &Output) -> Result<()> {
    sync_session(session).await?;

    output.print_authors(session.authors());
    Ok(())
}

/// Add an author
async fn add(
    session: &mut Session,
    name: String,
    biography: Option<String>,
    output: &Output,
) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not logged in. Run `biblio login <email>` first.");
    }

    let draft = NewAuthor {
        name: name.clone(),
        biography,
    };

    session.create_author(&draft).await?;
    output.success(&format!("Added author '{}'", name));
    Ok(())
}
