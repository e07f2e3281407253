//! Error types for Trazo
//!
//! This module defines the error taxonomy used throughout the client,
//! using `thiserror` for ergonomic error handling. HTTP responses are
//! classified into these variants once, at the transport boundary, so
//! callers can match on the kind instead of inspecting status codes.

use thiserror::Error;

/// Main error type for Trazo client operations
///
/// This enum encompasses all possible errors that can occur during
/// authentication, resource calls, content updates, configuration
/// loading, and session persistence.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the request token (401). The session is
    /// invalidated locally before this error reaches the caller.
    #[error("Authentication required: your session has expired, please log in again")]
    AuthenticationRequired,

    /// Login or registration was rejected by the server
    #[error("Invalid credentials: {detail}")]
    InvalidCredentials {
        /// Server-provided rejection detail
        detail: String,
    },

    /// A diagram content write was rejected because the resource changed
    /// since it was last read. The caller must re-fetch the content and
    /// its timestamp before retrying; nothing is merged automatically.
    #[error("Version conflict: the diagram was modified by someone else, re-fetch before retrying")]
    VersionConflict,

    /// The requested resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The endpoint rejected the HTTP verb (405)
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The server refused the operation for this user (403)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Server-side field validation failed; the detail is surfaced
    /// verbatim for display
    #[error("Validation failed: {detail}")]
    ValidationFailed {
        /// Server-provided field errors
        detail: String,
    },

    /// Any other non-success response from the server
    #[error("Server error ({status}): {detail}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Server-provided detail, or the raw body when none
        detail: String,
    },

    /// Transport-level failure (connection refused, DNS, timeout).
    /// Never retried automatically; retrying is a caller decision.
    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// Response body could not be decoded into the expected shape
    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Session file read/write errors
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The configured server base URL is not a valid URL
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether this error means the local session is no longer valid
    pub fn is_auth_expiry(&self) -> bool {
        matches!(self, ApiError::AuthenticationRequired)
    }

    /// Whether a collaborator removal retry on the id-keyed path is
    /// warranted: only when the username-keyed path provably deleted
    /// nothing (the route is absent or rejects the verb)
    pub fn is_route_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_) | ApiError::MethodNotAllowed(_)
        )
    }
}

/// Result type alias for Trazo client operations
///
/// Library calls return this discriminated result so callers can match
/// on error kinds such as [`ApiError::VersionConflict`]. The binary's
/// command layer wraps it in `anyhow` for display.
pub type Result<T> = std::result::Result<T, ApiError>;
