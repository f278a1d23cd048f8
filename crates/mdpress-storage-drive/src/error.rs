//! Error types for the Drive integration.

/// Error from Drive API operations.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// OAuth credential error (missing, revoked, or unrefreshable).
    #[error("OAuth error: {0}")]
    Auth(String),

    /// Response was well-formed but missing a required field.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
