//! API gateway client
//!
//! Thin typed wrapper over the Bibliotheque HTTP API: one async operation
//! per server endpoint. The bearer token is explicit client state, set by
//! the session controller; callers are responsible for sequencing a
//! `set_token` before the calls that depend on it. No retries, timeouts,
//! or cancellation: a failed request simply fails.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, Author, Book, BookPatch, Credentials, NewAuthor, NewBook, User};
use crate::preferences::{PreferencesPatch, ServerPreferences};

/// Typed client for the Bibliotheque API
pub struct ApiClient {
    /// Underlying HTTP client
    http: reqwest::Client,
    /// Server base URL, without trailing slash
    base_url: String,
    /// Bearer token attached to authenticated requests
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Set or clear the bearer token for subsequent requests
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Whether a bearer token is configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Reject non-success responses, capturing status and body
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Remote {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a JSON body after the status check
    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Create an account
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<User> {
        debug!("POST /api/users/register ({})", email);
        let response = self
            .http
            .post(self.url("/api/users/register"))
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Authenticate, returning the token and user
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        debug!("POST /api/users/login ({})", email);
        let response = self
            .http
            .post(self.url("/api/users/login"))
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetch the authenticated user
    pub async fn current_user(&self) -> ApiResult<User> {
        let response = self
            .with_auth(self.http.get(self.url("/api/users/me")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// List all authors
    pub async fn authors(&self) -> ApiResult<Vec<Author>> {
        let response = self
            .with_auth(self.http.get(self.url("/api/authors/")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Create an author
    pub async fn create_author(&self, draft: &NewAuthor) -> ApiResult<Author> {
        debug!("POST /api/authors/ ({})", draft.name);
        let response = self
            .with_auth(self.http.post(self.url("/api/authors/")).json(draft))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// List all books
    pub async fn books(&self) -> ApiResult<Vec<Book>> {
        let response = self
            .with_auth(self.http.get(self.url("/api/books/")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Create a book
    pub async fn create_book(&self, draft: &NewBook) -> ApiResult<Book> {
        debug!("POST /api/books/ ({})", draft.title);
        let response = self
            .with_auth(self.http.post(self.url("/api/books/")).json(draft))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Partially update a book
    pub async fn update_book(&self, id: i64, patch: &BookPatch) -> ApiResult<Book> {
        debug!("PUT /api/books/{}", id);
        let response = self
            .with_auth(
                self.http
                    .put(self.url(&format!("/api/books/{}", id)))
                    .json(patch),
            )
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: i64) -> ApiResult<()> {
        debug!("DELETE /api/books/{}", id);
        let response = self
            .with_auth(self.http.delete(self.url(&format!("/api/books/{}", id))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Fetch the server-held preferences
    pub async fn preferences(&self) -> ApiResult<ServerPreferences> {
        let response = self
            .with_auth(self.http.get(self.url("/api/preferences/me")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Upsert the server-held preferences
    pub async fn upsert_preferences(&self, patch: &PreferencesPatch) -> ApiResult<ServerPreferences> {
        debug!("PUT /api/preferences/me");
        let response = self
            .with_auth(self.http.put(self.url("/api/preferences/me")).json(patch))
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::json;

    /// Bind a fixture router on a loopback port and return its base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn user_json() -> serde_json::Value {
        json!({
            "id": 1,
            "email": "demo@example.com",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_login_decodes_auth_response() {
        let app = Router::new().route(
            "/api/users/login",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["email"], "demo@example.com");
                assert_eq!(body["password"], "password123");
                Json(json!({
                    "access_token": "t1",
                    "token_type": "bearer",
                    "user": user_json()
                }))
            }),
        );

        let client = ApiClient::new(serve(app).await);
        let auth = client.login("demo@example.com", "password123").await.unwrap();
        assert_eq!(auth.access_token, "t1");
        assert_eq!(auth.user.id, 1);
    }

    #[tokio::test]
    async fn test_bearer_header_follows_set_token() {
        let app = Router::new().route(
            "/api/users/me",
            get(|headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer t1") => Json(user_json()).into_response(),
                    _ => (StatusCode::UNAUTHORIZED, "Not authenticated").into_response(),
                }
            }),
        );

        let mut client = ApiClient::new(serve(app).await);

        // Without a token the server rejects us
        let err = client.current_user().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.is_auth_error());

        client.set_token(Some("t1".to_string()));
        let user = client.current_user().await.unwrap();
        assert_eq!(user.email, "demo@example.com");

        // Clearing the token drops the header again
        client.set_token(None);
        assert!(client.current_user().await.is_err());
    }

    #[tokio::test]
    async fn test_remote_error_carries_status_and_body() {
        let app = Router::new().route(
            "/api/books/",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "title required") }),
        );

        let client = ApiClient::new(serve(app).await);
        let err = client.create_book(&NewBook::new("")).await.unwrap_err();
        match err {
            ApiError::Remote { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "title required");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let app = Router::new().route(
            "/api/books/{id}",
            delete(|axum::extract::Path(id): axum::extract::Path<i64>| async move {
                assert_eq!(id, 42);
                StatusCode::NO_CONTENT
            }),
        );

        let client = ApiClient::new(serve(app).await);
        client.delete_book(42).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on this port
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.books().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/books/"), "http://localhost:8000/api/books/");
    }
}
