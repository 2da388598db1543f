//! Biblio Core Library
//!
//! This crate provides the core functionality for biblio, a terminal
//! client for the Bibliotheque personal book-cataloguing service.
//!
//! # Architecture
//!
//! - **Session**: owns the bearer token and everything gated on it
//! - **ApiClient**: one typed operation per server endpoint
//! - **PreferenceStore**: durable local display preferences, reconciled
//!   best-effort with the server copy after login
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut session = Session::open(&config);
//!
//! session.login("demo@example.com", "password123").await?;
//!
//! // Collections are populated by the login bootstrap
//! let books = session.books();
//! ```
//!
//! # Modules
//!
//! - `session`: token lifecycle and data synchronization (main entry point)
//! - `client`: API gateway client
//! - `models`: wire-level data structures and the book filter
//! - `preferences`: display preferences with durable storage
//! - `config`: application configuration
//! - `error`: gateway error taxonomy

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod preferences;
pub mod session;

pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use models::{filter_books, AuthResponse, Author, Book, BookPatch, NewAuthor, NewBook, User};
pub use preferences::{FontScale, PreferenceStore, Preferences, PreferencesPatch, Theme};
pub use session::{Session, BOOTSTRAP_ERROR};
