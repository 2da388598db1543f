//! CLI output rendering
//!
//! Every command renders through [`Output`] so the three formats stay
//! consistent: labelled fields and tables by default, pretty-printed
//! JSON with `--json`, and bare ids with `--quiet` for scripting.

use biblio_core::{Author, Book};

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Labelled fields and tables (default)
    Human,
    /// Pretty-printed JSON
    Json,
    /// Ids only, one per line
    Quiet,
}

impl OutputFormat {
    /// Resolve the format from the global CLI flags; quiet wins over json
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        match (json, quiet) {
            (_, true) => OutputFormat::Quiet,
            (true, _) => OutputFormat::Json,
            (false, false) => OutputFormat::Human,
        }
    }
}

/// Renders command results in the selected format
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Confirmation prompts only make sense in interactive human output
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Render one book with all its fields
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(book).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
            OutputFormat::Human => {
                println!("ID:          {}", book.id);
                println!("Title:       {}", book.title);
                if !book.authors.is_empty() {
                    println!("Authors:     {}", book.author_names());
                }
                if let Some(year) = book.published_year {
                    println!("Published:   {}", year);
                }
                if let Some(ref isbn) = book.isbn {
                    println!("ISBN:        {}", isbn);
                }
                if let Some(ref desc) = book.description {
                    println!("Description: {}", desc);
                }
                println!("Created:     {}", book.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", book.updated_at.format("%Y-%m-%d %H:%M"));
            }
        }
    }

    /// Render a book list as one row per book
    pub fn print_books(&self, books: &[&Book]) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(books).unwrap());
            }
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    let by = if book.authors.is_empty() {
                        "(no author)".to_string()
                    } else {
                        book.author_names()
                    };
                    let detail = match book.published_year {
                        Some(year) => format!("{} ({})", clip(&by, 34), year),
                        None => clip(&by, 41),
                    };
                    println!("{:>4} | {} | {}", book.id, clip(&book.title, 35), detail);
                }
                println!("\n{} book(s)", books.len());
            }
        }
    }

    /// Render an author list as one row per author
    pub fn print_authors(&self, authors: &[Author]) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(authors).unwrap());
            }
            OutputFormat::Quiet => {
                for author in authors {
                    println!("{}", author.id);
                }
            }
            OutputFormat::Human => {
                if authors.is_empty() {
                    println!("No authors found.");
                    return;
                }
                for author in authors {
                    match author.biography {
                        Some(ref bio) => println!(
                            "{:>4} | {} | {}",
                            author.id,
                            author.name,
                            clip(bio.lines().next().unwrap_or(""), 50)
                        ),
                        None => println!("{:>4} | {}", author.id, author.name),
                    }
                }
                println!("\n{} author(s)", authors.len());
            }
        }
    }

    /// Announce a completed action
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({"status": "success", "message": message})
            ),
            OutputFormat::Quiet => {}
        }
    }

    /// Informational text, suppressed in quiet mode
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => println!("{}", serde_json::json!({"message": msg})),
            OutputFormat::Quiet => {}
        }
    }
}

/// Shorten to at most `max` characters, ellipsis included
///
/// Counts chars rather than bytes so multibyte titles survive.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // --quiet beats --json when both are given
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_clip_short_strings_untouched() {
        assert_eq!(clip("Dune", 10), "Dune");
        assert_eq!(clip("exactly ten", 11), "exactly ten");
    }

    #[test]
    fn test_clip_long_strings() {
        assert_eq!(clip("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_clip_counts_chars_not_bytes() {
        assert_eq!(clip("bibliothèque éternelle", 10), "bibliot...");
    }

    #[test]
    fn test_prompting_only_in_human_mode() {
        assert!(Output::new(OutputFormat::Human).should_prompt());
        assert!(!Output::new(OutputFormat::Json).should_prompt());
        assert!(!Output::new(OutputFormat::Quiet).should_prompt());
    }
}
