//! API error handling
//!
//! Provides typed errors for gateway operations. Every failure a caller can
//! see is one of three kinds: the request never completed, the server
//! answered with a failure status, or the input was rejected before any
//! request was sent.

use thiserror::Error;

/// Errors that can occur when talking to the Bibliotheque API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be completed at all (connect failure,
    /// broken transport, undecodable success body)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server responded with a non-success status
    #[error("server returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Client-side validation failed before any request was issued
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// HTTP status of a remote failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected our credentials or token
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = ApiError::Remote {
            status: 422,
            body: r#"{"detail":"title required"}"#.to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("title required"));
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_auth_error_detection() {
        let err = ApiError::Remote {
            status: 401,
            body: "Unauthorized".to_string(),
        };
        assert!(err.is_auth_error());

        let err = ApiError::Remote {
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ApiError::Validation("email is required".to_string());
        assert_eq!(err.to_string(), "email is required");
        assert!(err.status().is_none());
    }
}
