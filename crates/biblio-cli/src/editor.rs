//! $EDITOR integration
//!
//! Books are edited as a small key/value template in the user's editor;
//! the edited template round-trips back into a partial update.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

use anyhow::{anyhow, Context, Result};

use biblio_core::{Book, BookPatch};

/// Run the user's editor over the given text and return the result
///
/// The editor comes from $EDITOR, then $VISUAL, then a short list of
/// well-known fallbacks. The scratch file is removed either way.
pub fn edit_text(template: &str) -> Result<String> {
    let editor = resolve_editor()?;
    let path = env::temp_dir().join(format!("biblio-edit-{}.txt", std::process::id()));

    fs::write(&path, template)
        .with_context(|| format!("Failed to write edit buffer: {:?}", path))?;

    let run = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor: {}", editor));

    let content = match run {
        Ok(status) if status.success() => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read edit buffer back: {:?}", path)),
        Ok(_) => Err(anyhow!("Editor '{}' exited with an error.", editor)),
        Err(e) => Err(e),
    };

    let _ = fs::remove_file(&path);
    content
}

fn resolve_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        match env::var(var) {
            Ok(editor) if !editor.is_empty() => return Ok(editor),
            _ => {}
        }
    }

    ["nano", "vim", "vi", "emacs"]
        .into_iter()
        .find(|candidate| in_path(candidate))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("No editor found. Set $EDITOR, e.g. `export EDITOR=nano`."))
}

fn in_path(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Ask a yes/no question on the terminal
///
/// Answers no when stdin is not a TTY, so piped invocations never hang.
pub fn confirm(question: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Render a book as an editable template
pub fn book_template(book: &Book) -> String {
    let author_ids = book
        .authors
        .iter()
        .map(|a| a.id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "# Edit book — lines starting with # are ignored\n\
         # authors takes a comma-separated list of author ids\n\n\
         title: {}\n\
         description: {}\n\
         isbn: {}\n\
         published_year: {}\n\
         authors: {}\n",
        book.title,
        book.description.as_deref().unwrap_or(""),
        book.isbn.as_deref().unwrap_or(""),
        book.published_year
            .map(|y| y.to_string())
            .unwrap_or_default(),
        author_ids,
    )
}

/// Parse an edited template back into a patch against the original
///
/// Returns None when nothing changed. An emptied value means "leave
/// unchanged" rather than "clear the field".
pub fn parse_book_edit(content: &str, original: &Book) -> Option<BookPatch> {
    let mut patch = BookPatch::default();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }

        if let Some(value) = line.strip_prefix("title:") {
            let value = value.trim();
            if !value.is_empty() && value != original.title {
                patch.title = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("description:") {
            let value = value.trim();
            if !value.is_empty() && original.description.as_deref() != Some(value) {
                patch.description = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("isbn:") {
            let value = value.trim();
            if !value.is_empty() && original.isbn.as_deref() != Some(value) {
                patch.isbn = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("published_year:") {
            if let Ok(year) = value.trim().parse::<i32>() {
                if original.published_year != Some(year) {
                    patch.published_year = Some(year);
                }
            }
        } else if let Some(value) = line.strip_prefix("authors:") {
            let ids: Vec<i64> = value
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            let current: Vec<i64> = original.authors.iter().map(|a| a.id).collect();
            if ids != current {
                patch.author_ids = Some(ids);
            }
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::Author;
    use chrono::Utc;

    fn sample_book() -> Book {
        let now = Utc::now();
        Book {
            id: 1,
            title: "Dune".to_string(),
            description: Some("Desert planet".to_string()),
            isbn: None,
            published_year: Some(1965),
            owner_id: 1,
            created_at: now,
            updated_at: now,
            authors: vec![Author {
                id: 4,
                name: "Frank Herbert".to_string(),
                biography: None,
                created_at: now,
            }],
        }
    }

    #[test]
    fn test_in_path() {
        #[cfg(unix)]
        assert!(in_path("ls"));
        assert!(!in_path("surely-not-an-installed-binary-42"));
    }

    #[test]
    fn test_template_round_trip_is_no_change() {
        let book = sample_book();
        let template = book_template(&book);
        assert!(parse_book_edit(&template, &book).is_none());
    }

    #[test]
    fn test_parse_changed_fields() {
        let book = sample_book();
        let content = "\
            title: Dune Messiah\n\
            description: Desert planet\n\
            isbn: 9780441013593\n\
            published_year: 1969\n\
            authors: 4\n";

        let patch = parse_book_edit(content, &book).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Dune Messiah"));
        assert!(patch.description.is_none());
        assert_eq!(patch.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(patch.published_year, Some(1969));
        assert!(patch.author_ids.is_none());
    }

    #[test]
    fn test_parse_author_ids_change() {
        let book = sample_book();
        let patch = parse_book_edit("authors: 4, 7\n", &book).unwrap();
        assert_eq!(patch.author_ids, Some(vec![4, 7]));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let book = sample_book();
        let content = "# a comment\n\n# title: Ignored\n";
        assert!(parse_book_edit(content, &book).is_none());
    }
}
