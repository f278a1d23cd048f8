//! Backend trait and attempt error types.
//!
//! Provides the core [`StorageBackend`] trait for abstracting document
//! upload destinations, along with [`BackendError`] for unified
//! per-attempt error handling across backends.

use std::error::Error;

/// Stage of a backend attempt at which a failure occurred.
///
/// Permission setting is deliberately absent: a failed permission call is
/// downgraded to a warning on the result, never an attempt failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptStage {
    /// Required credentials or configuration are missing or could not be
    /// refreshed. Detected before any upload I/O.
    Credentials,
    /// The upload itself failed (network, API, or filesystem error).
    Upload,
    /// The uploaded object could not be resolved to a caller-usable URL.
    ResolveUrl,
}

impl std::fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Self::Credentials => "credentials",
            Self::Upload => "upload",
            Self::ResolveUrl => "url resolution",
        };
        f.write_str(stage)
    }
}

/// Error from a single backend attempt.
///
/// Always recovered locally by advancing the delivery chain; carries the
/// backend identifier and attempt stage so the failure can be diagnosed
/// from logs without aborting the request.
#[derive(Debug)]
pub struct BackendError {
    /// Stage at which the attempt failed.
    pub stage: AttemptStage,
    /// Backend identifier (e.g., "drive", "local").
    pub backend: &'static str,
    /// Human-readable context for the failure.
    pub message: Option<String>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl BackendError {
    /// Create a new attempt error.
    #[must_use]
    pub fn new(stage: AttemptStage, backend: &'static str) -> Self {
        Self {
            stage,
            backend,
            message: None,
            source: None,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a credentials-missing error.
    #[must_use]
    pub fn credentials(backend: &'static str, message: impl Into<String>) -> Self {
        Self::new(AttemptStage::Credentials, backend).with_message(message)
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[backend] stage failed: message (source)"
        write!(f, "[{}] {} failed", self.backend, self.stage)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn Error + 'static))
    }
}

/// Successful upload to a single backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    /// Caller-usable download URL.
    pub url: String,
    /// Non-fatal problem encountered during the attempt (e.g., the object
    /// was stored but could not be marked publicly readable).
    pub warning: Option<String>,
}

/// A storage destination capable of accepting uploaded bytes and returning
/// a retrievable URL.
///
/// Backends carry their own credential state, validated lazily at call
/// time and never cached as known good.
pub trait StorageBackend: Send + Sync {
    /// Stable backend identifier, reported in [`DeliveryResult::source`]
    /// and logs.
    ///
    /// [`DeliveryResult::source`]: crate::DeliveryResult
    fn name(&self) -> &'static str;

    /// Check that required credentials and configuration are present.
    ///
    /// Runs before any upload I/O; a failure here is an immediate
    /// per-backend failure and the chain advances without network calls.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] with [`AttemptStage::Credentials`] if the
    /// backend cannot be attempted.
    fn validate(&self) -> Result<(), BackendError>;

    /// Upload the document bytes under a name derived from `title`.
    ///
    /// Implementations fix the content type to `application/pdf`, generate
    /// a collision-resistant object name, and resolve a caller-usable URL,
    /// preferring a backend-provided direct-content link over a
    /// synthesized one.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on any failure during naming, upload, or
    /// URL resolution.
    fn upload(&self, bytes: &[u8], title: &str) -> Result<Uploaded, BackendError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn validate(&self) -> Result<(), BackendError> {
        (**self).validate()
    }

    fn upload(&self, bytes: &[u8], title: &str) -> Result<Uploaded, BackendError> {
        (**self).upload(bytes, title)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_display_minimal() {
        let err = BackendError::new(AttemptStage::Upload, "drive");

        assert_eq!(err.to_string(), "[drive] upload failed");
    }

    #[test]
    fn test_display_with_message() {
        let err = BackendError::credentials("drive", "refresh token not configured");

        assert_eq!(
            err.to_string(),
            "[drive] credentials failed: refresh token not configured"
        );
    }

    #[test]
    fn test_display_full() {
        let io_err = std::io::Error::other("disk full");
        let err = BackendError::new(AttemptStage::Upload, "local")
            .with_message("write failed")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[local] upload failed: write failed (disk full)"
        );
    }

    #[test]
    fn test_source_chain() {
        let io_err = std::io::Error::other("boom");
        let err = BackendError::new(AttemptStage::Upload, "local").with_source(io_err);

        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackendError>();
    }
}
