//! Data models for biblio
//!
//! Wire-level shapes for the Bibliotheque API: users, authors, books, and
//! the request payloads for creating and updating them. Books embed their
//! authors on read and reference them by id on write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account on the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An author, shared across the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A catalogued book with its authors embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub authors: Vec<Author>,
}

impl Book {
    /// Comma-joined author names for display
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether this book matches a lowercased filter needle
    fn matches(&self, needle: &str) -> bool {
        if self.title.to_lowercase().contains(needle) {
            return true;
        }
        if self
            .authors
            .iter()
            .any(|a| a.name.to_lowercase().contains(needle))
        {
            return true;
        }
        self.isbn
            .as_deref()
            .map(|isbn| isbn.to_lowercase().contains(needle))
            .unwrap_or(false)
    }
}

/// Filter books by a substring of title, author name, or ISBN
///
/// Matching is case-insensitive; surrounding whitespace in the query is
/// ignored. An empty query returns all books unchanged in order.
pub fn filter_books<'a>(books: &'a [Book], query: &str) -> Vec<&'a Book> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return books.iter().collect();
    }
    books.iter().filter(|b| b.matches(&needle)).collect()
}

/// Login/register request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Payload for creating a book
///
/// Authors are referenced by id; optional fields are omitted from the
/// request body when unset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewBook {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<i64>>,
}

impl NewBook {
    /// Create a payload with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update payload for a book
///
/// Only fields that are set are sent; the server leaves the rest untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<i64>>,
}

impl BookPatch {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.isbn.is_none()
            && self.published_year.is_none()
            && self.author_ids.is_none()
    }
}

/// Payload for creating an author
#[derive(Debug, Clone, Serialize)]
pub struct NewAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl NewAuthor {
    /// Create a payload with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            biography: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: i64, name: &str) -> Author {
        Author {
            id,
            name: name.to_string(),
            biography: None,
            created_at: Utc::now(),
        }
    }

    fn book(id: i64, title: &str, isbn: Option<&str>, authors: Vec<Author>) -> Book {
        let now = Utc::now();
        Book {
            id,
            title: title.to_string(),
            description: None,
            isbn: isbn.map(str::to_string),
            published_year: None,
            owner_id: 1,
            created_at: now,
            updated_at: now,
            authors,
        }
    }

    fn sample_shelf() -> Vec<Book> {
        vec![
            book(
                1,
                "Dune",
                Some("9780441013593"),
                vec![author(1, "Frank Herbert")],
            ),
            book(
                2,
                "Foundation",
                Some("9780553293357"),
                vec![author(2, "Isaac Asimov")],
            ),
        ]
    }

    #[test]
    fn test_filter_by_author_substring() {
        let books = sample_shelf();
        let hits = filter_books(&books, "asimov");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Foundation");
    }

    #[test]
    fn test_filter_by_isbn_substring() {
        let books = sample_shelf();
        let hits = filter_books(&books, "0441013");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Dune");
    }

    #[test]
    fn test_filter_by_title_case_insensitive() {
        let books = sample_shelf();
        let hits = filter_books(&books, "dUnE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_empty_filter_returns_all_in_order() {
        let books = sample_shelf();
        let hits = filter_books(&books, "");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[1].id, 2);

        // Whitespace-only behaves like empty
        let hits = filter_books(&books, "   ");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_filter_no_match() {
        let books = sample_shelf();
        assert!(filter_books(&books, "tolkien").is_empty());
    }

    #[test]
    fn test_book_deserialization() {
        let json = r#"{
            "id": 7,
            "title": "Dune",
            "description": null,
            "isbn": "9780441013593",
            "published_year": 1965,
            "owner_id": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "authors": [
                {"id": 1, "name": "Frank Herbert", "biography": null, "created_at": "2024-01-01T00:00:00Z"}
            ]
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, 7);
        assert_eq!(book.published_year, Some(1965));
        assert_eq!(book.authors.len(), 1);
        assert_eq!(book.author_names(), "Frank Herbert");
    }

    #[test]
    fn test_book_missing_authors_defaults_empty() {
        let json = r#"{
            "id": 7,
            "title": "Dune",
            "owner_id": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert!(book.authors.is_empty());
        assert!(book.isbn.is_none());
    }

    #[test]
    fn test_new_book_omits_unset_fields() {
        let draft = NewBook::new("Dune");
        let json = serde_json::to_string(&draft).unwrap();
        assert_eq!(json, r#"{"title":"Dune"}"#);

        let draft = NewBook {
            title: "Dune".to_string(),
            published_year: Some(1965),
            author_ids: Some(vec![1, 2]),
            ..NewBook::default()
        };
        let value: serde_json::Value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["published_year"], 1965);
        assert_eq!(value["author_ids"], serde_json::json!([1, 2]));
        assert!(value.get("isbn").is_none());
    }

    #[test]
    fn test_book_patch_is_empty() {
        assert!(BookPatch::default().is_empty());

        let patch = BookPatch {
            title: Some("Dune Messiah".to_string()),
            ..BookPatch::default()
        };
        assert!(!patch.is_empty());
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"title":"Dune Messiah"}"#);
    }

    #[test]
    fn test_auth_response_deserialization() {
        let json = r#"{
            "access_token": "t1",
            "token_type": "bearer",
            "user": {
                "id": 1,
                "email": "demo@example.com",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }
        }"#;

        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.access_token, "t1");
        assert_eq!(auth.token_type, "bearer");
        assert_eq!(auth.user.email, "demo@example.com");
    }
}
