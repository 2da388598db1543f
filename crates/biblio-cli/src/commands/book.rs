//! Book command handlers

use anyhow::{bail, Result};

use biblio_core::{NewBook, Session};

use crate::commands::sync_session;
use crate::editor;
use crate::output::Output;
use crate::BookCommands;

pub async fn run(command: BookCommands, session: &mut Session, output: &Output) -> Result<()> {
    match command {
        BookCommands::Add {
            title,
            description,
            isbn,
            year,
            author,
        } => add(session, title, description, isbn, year, author, output).await,
        BookCommands::List { filter } => list(session, filter, output).await,
        BookCommands::Show { id } => show(session, id, output).await,
        BookCommands::Edit { id } => edit(session, id, output).await,
        BookCommands::Delete { id } => delete(session, id, output).await,
    }
}

/// List books, optionally filtered by title, author name, or ISBN
async fn list(session: &mut Session, filter: Option<String>, output: &Output) -> Result<()> {
    sync_session(session).await?;

    let query = filter.unwrap_or_default();
    let books = session.filtered_books(&query);
    output.print_books(&books);
    Ok(())
}

/// Show one book
async fn show(session: &mut Session, id: i64, output: &Output) -> Result<()> {
    sync_session(session).await?;

    let Some(book) = session.books().iter().find(|b| b.id == id) else {
        bail!("Book {} not found", id);
    };
    output.print_book(book);
    Ok(())
}

/// Add a book
async fn add(
    session: &mut Session,
    title: String,
    description: Option<String>,
    isbn: Option<String>,
    year: Option<i32>,
    author_ids: Vec<i64>,
    output: &Output,
) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not logged in. Run `biblio login <email>` first.");
    }

    let draft = NewBook {
        title: title.clone(),
        description,
        isbn,
        published_year: year,
        author_ids: if author_ids.is_empty() {
            None
        } else {
            Some(author_ids)
        },
    };

    session.create_book(&draft).await?;
    output.success(&format!("Added '{}'", title));
    Ok(())
}

/// Edit a book in $EDITOR
async fn edit(session: &mut Session, id: i64, output: &Output) -> Result<()> {
    sync_session(session).await?;

    let Some(book) = session.books().iter().find(|b| b.id == id) else {
        bail!("Book {} not found", id);
    };
    let book = book.clone();

    let content = editor::edit_text(&editor::book_template(&book))?;

    let Some(patch) = editor::parse_book_edit(&content, &book) else {
        output.message("No changes.");
        return Ok(());
    };

    session.update_book(id, &patch).await?;
    output.success(&format!("Updated '{}'", book.title));
    Ok(())
}

/// Delete a book
async fn delete(session: &mut Session, id: i64, output: &Output) -> Result<()> {
    sync_session(session).await?;

    let Some(book) = session.books().iter().find(|b| b.id == id) else {
        bail!("Book {} not found", id);
    };
    let title = book.title.clone();

    if output.should_prompt() && !editor::confirm(&format!("Delete '{}'?", title))? {
        output.message("Cancelled.");
        return Ok(());
    }

    session.delete_book(id).await?;
    output.success(&format!("Deleted '{}'", title));
    Ok(())
}
