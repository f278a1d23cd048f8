//! Mock backend implementation for testing.
//!
//! Provides [`MockBackend`] for unit testing the delivery chain without
//! network or filesystem access.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{AttemptStage, BackendError, StorageBackend, Uploaded};

/// Scriptable backend for testing.
///
/// Succeeds with a fixed URL by default; use the builder methods to make
/// validation or upload fail.
///
/// # Example
///
/// ```ignore
/// use mdpress_storage::{DeliveryChain, MockBackend};
///
/// let chain = DeliveryChain::new(vec![
///     Box::new(MockBackend::new("remote").with_invalid_credentials()),
///     Box::new(MockBackend::new("local").with_url("file:///tmp/doc.pdf")),
/// ]);
/// ```
#[derive(Debug)]
pub struct MockBackend {
    name: &'static str,
    url: Option<String>,
    warning: Option<String>,
    fail_validation: bool,
    fail_upload: bool,
    attempts: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a mock backend that succeeds.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            url: None,
            warning: None,
            fail_validation: false,
            fail_upload: false,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the URL returned on successful upload.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach a non-fatal warning to successful uploads.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Make `validate()` fail as if credentials were missing.
    #[must_use]
    pub fn with_invalid_credentials(mut self) -> Self {
        self.fail_validation = true;
        self
    }

    /// Make `upload()` fail as if the backend API rejected the request.
    #[must_use]
    pub fn with_upload_failure(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    /// Counter incremented on every `upload()` call.
    #[must_use]
    pub fn attempt_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.attempts)
    }
}

impl StorageBackend for MockBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self) -> Result<(), BackendError> {
        if self.fail_validation {
            return Err(BackendError::credentials(
                self.name,
                "scripted credential failure",
            ));
        }
        Ok(())
    }

    fn upload(&self, _bytes: &[u8], title: &str) -> Result<Uploaded, BackendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload {
            return Err(BackendError::new(AttemptStage::Upload, self.name)
                .with_message("scripted upload failure"));
        }
        Ok(Uploaded {
            url: self
                .url
                .clone()
                .unwrap_or_else(|| format!("mock://{}/{title}", self.name)),
            warning: self.warning.clone(),
        })
    }
}
