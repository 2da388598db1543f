//! Session controller and data synchronization
//!
//! Owns the authentication token lifecycle and everything gated on it: the
//! current user, the author and book collections, the selected book, and
//! the bootstrap error. Token presence is the single gate for data
//! visibility; when the token is cleared, every dependent collection is
//! cleared with it.
//!
//! ## Bootstrap
//!
//! After authentication (or on startup with a persisted token) the session
//! fetches the current user, authors, and books concurrently. The three
//! fetches commit together or not at all; any failure surfaces one generic
//! error and leaves previously-held collections untouched. A fourth,
//! best-effort fetch reconciles server-held preferences into the local
//! store and never surfaces its failure.
//!
//! ## Mutations
//!
//! Writes never merge the server's response into local state. Each one
//! performs exactly one gateway call and then re-fetches the affected
//! collection. Creating or deleting a book resets the selection to the
//! first book of the refreshed list.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{filter_books, Author, Book, BookPatch, NewAuthor, NewBook, User};
use crate::preferences::{PreferenceStore, Preferences, PreferencesPatch};

/// User-visible message when the core bootstrap fetches fail
pub const BOOTSTRAP_ERROR: &str =
    "Cannot retrieve data. Check your token or that the server is reachable.";

/// The client session: token lifecycle plus all token-gated state
pub struct Session {
    /// API gateway, carries the bearer token
    client: ApiClient,
    /// Local display preferences
    prefs: PreferenceStore,
    /// Where the token is persisted across restarts
    token_path: PathBuf,
    /// Bearer token; presence means "authenticated"
    token: Option<String>,
    /// Current user, fetched rather than derived
    user: Option<User>,
    /// Book collection, in server order
    books: Vec<Book>,
    /// Author collection
    authors: Vec<Author>,
    /// Selected book id
    selected: Option<i64>,
    /// Generic bootstrap error, if the last bootstrap failed
    error: Option<String>,
}

impl Session {
    /// Open a session from configuration
    ///
    /// If a token was persisted by an earlier run, the gateway is
    /// configured with it and the session reports authenticated; the
    /// caller should run [`bootstrap`](Self::bootstrap) to validate the
    /// token by side effect. A failing bootstrap sets the generic error
    /// but never logs the user out.
    pub fn open(config: &Config) -> Self {
        let mut client = ApiClient::new(&config.api_url);
        let token_path = config.token_path();

        let token = fs::read_to_string(&token_path)
            .ok()
            .map(|content| content.trim().to_string())
            .filter(|token| !token.is_empty());

        if token.is_some() {
            client.set_token(token.clone());
        }

        Self {
            client,
            prefs: PreferenceStore::open(config),
            token_path,
            token,
            user: None,
            books: Vec::new(),
            authors: Vec::new(),
            selected: None,
            error: None,
        }
    }

    /// Whether a token is present
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    /// The last bootstrap error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    /// The selected book, resolved against the current list
    pub fn selected_book(&self) -> Option<&Book> {
        let id = self.selected?;
        self.books.iter().find(|b| b.id == id)
    }

    /// Select a book by id; ignored if the id is not in the list
    pub fn select_book(&mut self, id: i64) {
        if self.books.iter().any(|b| b.id == id) {
            self.selected = Some(id);
        }
    }

    /// Books matching a filter query (title, author name, or ISBN)
    pub fn filtered_books(&self, query: &str) -> Vec<&Book> {
        filter_books(&self.books, query)
    }

    /// Current display preferences
    pub fn preferences(&self) -> Preferences {
        self.prefs.get()
    }

    /// Access the preference store (markers for the UI)
    pub fn preference_store(&self) -> &PreferenceStore {
        &self.prefs
    }

    /// Authenticate with email and password
    ///
    /// On success the token is persisted, the gateway configured, the user
    /// stored from the login response, and a bootstrap run. Failures
    /// propagate unchanged.
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<()> {
        validate_credentials(email, password)?;
        let auth = self.client.login(email, password).await?;
        self.establish(auth.access_token, auth.user).await;
        Ok(())
    }

    /// Create an account, then log in with the same credentials
    pub async fn register(&mut self, email: &str, password: &str) -> ApiResult<()> {
        validate_credentials(email, password)?;
        self.client.register(email, password).await?;
        let auth = self.client.login(email, password).await?;
        self.establish(auth.access_token, auth.user).await;
        Ok(())
    }

    /// Log out: clear the token and all dependent state synchronously
    pub fn logout(&mut self) {
        self.remove_token_file();
        self.client.set_token(None);
        self.token = None;
        self.user = None;
        self.books.clear();
        self.authors.clear();
        self.selected = None;
        self.error = None;
    }

    /// Fetch user, authors, and books together; reconcile preferences
    ///
    /// No-op without a token. The three core fetches are issued
    /// concurrently and commit all-or-nothing: on any failure a single
    /// generic error is set and previously-held collections are left
    /// unchanged. On success, the first book is selected if none is. The
    /// trailing preference fetch replaces the local store wholesale on
    /// success and is swallowed on failure.
    ///
    /// Overlapping bootstraps cannot occur: the exclusive receiver
    /// serializes callers.
    pub async fn bootstrap(&mut self) {
        if self.token.is_none() {
            return;
        }

        let fetched = tokio::try_join!(
            self.client.current_user(),
            self.client.authors(),
            self.client.books(),
        );

        match fetched {
            Ok((user, authors, books)) => {
                self.user = Some(user);
                self.authors = authors;
                self.books = books;
                self.error = None;
                if self.selected.is_none() {
                    self.selected = self.books.first().map(|b| b.id);
                }
            }
            Err(e) => {
                warn!("Bootstrap fetch failed: {}", e);
                self.error = Some(BOOTSTRAP_ERROR.to_string());
                return;
            }
        }

        match self.client.preferences().await {
            Ok(remote) => self.prefs.replace(remote.into()),
            Err(e) => debug!("Preference fetch failed, keeping local values: {}", e),
        }
    }

    /// Create a book, re-fetch the list, and select its first entry
    pub async fn create_book(&mut self, draft: &NewBook) -> ApiResult<()> {
        if draft.title.trim().is_empty() {
            return Err(ApiError::Validation("title is required".to_string()));
        }
        self.client.create_book(draft).await?;
        self.refresh_books(true).await
    }

    /// Update a book and re-fetch the list; selection is preserved
    pub async fn update_book(&mut self, id: i64, patch: &BookPatch) -> ApiResult<()> {
        if patch.is_empty() {
            return Err(ApiError::Validation("nothing to update".to_string()));
        }
        self.client.update_book(id, patch).await?;
        self.refresh_books(false).await
    }

    /// Delete a book, re-fetch the list, and reset the selection
    pub async fn delete_book(&mut self, id: i64) -> ApiResult<()> {
        self.client.delete_book(id).await?;
        self.refresh_books(true).await
    }

    /// Create an author and re-fetch the author list
    pub async fn create_author(&mut self, draft: &NewAuthor) -> ApiResult<()> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::Validation("name is required".to_string()));
        }
        self.client.create_author(draft).await?;
        self.authors = self.client.authors().await?;
        Ok(())
    }

    /// Apply a preference change locally, then mirror it best-effort
    ///
    /// The local store is the durable source of truth; a failed mirror is
    /// logged and swallowed. Anonymous sessions skip the mirror entirely.
    pub async fn set_preferences(&mut self, patch: PreferencesPatch) {
        self.prefs.update(patch);
        if self.token.is_none() {
            return;
        }
        if let Err(e) = self.client.upsert_preferences(&patch).await {
            debug!("Preference mirror failed: {}", e);
        }
    }

    async fn refresh_books(&mut self, reset_selection: bool) -> ApiResult<()> {
        self.books = self.client.books().await?;
        if reset_selection {
            self.selected = self.books.first().map(|b| b.id);
        }
        Ok(())
    }

    async fn establish(&mut self, token: String, user: User) {
        self.persist_token(&token);
        self.client.set_token(Some(token.clone()));
        self.token = Some(token);
        self.user = Some(user);
        self.bootstrap().await;
    }

    /// Persist the token; failures are logged, never surfaced
    fn persist_token(&self, token: &str) {
        if let Some(parent) = self.token_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create data directory: {}", e);
                return;
            }
        }
        if let Err(e) = fs::write(&self.token_path, token) {
            warn!("Failed to persist token to {:?}: {}", self.token_path, e);
        }
    }

    fn remove_token_file(&self) {
        if let Err(e) = fs::remove_file(&self.token_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove token file {:?}: {}", self.token_path, e);
            }
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() {
        return Err(ApiError::Validation("email is required".to_string()));
    }
    if password.is_empty() {
        return Err(ApiError::Validation("password is required".to_string()));
    }
    Ok(())
}
