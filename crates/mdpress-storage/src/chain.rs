//! Delivery chain: ordered backends attempted until first success.

use tracing::{info, warn};

use crate::backend::{BackendError, StorageBackend};

/// Outcome of a successful delivery.
///
/// Created once per request and returned to the caller; not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// Caller-usable download URL.
    pub url: String,
    /// Identifier of the backend that accepted the upload.
    pub source: &'static str,
    /// Non-fatal problem from the winning attempt, if any.
    pub warning: Option<String>,
}

/// Every configured backend failed.
///
/// Carries all per-backend attempt errors for diagnosis. In deployments
/// with the local fallback enabled this error is unreachable: the local
/// backend never fails validation and is the terminal case.
#[derive(Debug)]
pub struct DeliveryError {
    attempts: Vec<BackendError>,
}

impl DeliveryError {
    /// Per-backend attempt errors, in chain order.
    #[must_use]
    pub fn attempts(&self) -> &[BackendError] {
        &self.attempts
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no storage backends configured");
        }
        write!(f, "all {} storage backends failed", self.attempts.len())?;
        for attempt in &self.attempts {
            write!(f, "; {attempt}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeliveryError {}

/// Ordered list of storage backends attempted in sequence.
///
/// Backends are ordered by preference, most durable first; the first to
/// report success terminates the chain. One attempt per backend per
/// delivery; transient failures defer to the chain's fallback rather than
/// intra-backend retry.
pub struct DeliveryChain {
    backends: Vec<Box<dyn StorageBackend>>,
}

impl DeliveryChain {
    /// Create a chain from backends in preference order.
    #[must_use]
    pub fn new(backends: Vec<Box<dyn StorageBackend>>) -> Self {
        Self { backends }
    }

    /// Number of configured backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the chain has no backends.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Deliver document bytes through the chain.
    ///
    /// Each backend is validated first (credential absence advances the
    /// chain without network I/O), then attempted once. Failures are
    /// logged with backend and stage context and recorded.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] only when every backend fails.
    pub fn deliver(&self, bytes: &[u8], title: &str) -> Result<DeliveryResult, DeliveryError> {
        let mut attempts = Vec::new();

        for backend in &self.backends {
            if let Err(err) = backend.validate() {
                warn!(
                    backend = backend.name(),
                    stage = %err.stage,
                    error = %err,
                    "backend unavailable, advancing chain"
                );
                attempts.push(err);
                continue;
            }

            match backend.upload(bytes, title) {
                Ok(uploaded) => {
                    info!(
                        backend = backend.name(),
                        url = %uploaded.url,
                        "document delivered"
                    );
                    if let Some(warning) = &uploaded.warning {
                        warn!(backend = backend.name(), warning = %warning, "delivery warning");
                    }
                    return Ok(DeliveryResult {
                        url: uploaded.url,
                        source: backend.name(),
                        warning: uploaded.warning,
                    });
                }
                Err(err) => {
                    warn!(
                        backend = backend.name(),
                        stage = %err.stage,
                        error = %err,
                        "backend attempt failed, advancing chain"
                    );
                    attempts.push(err);
                }
            }
        }

        Err(DeliveryError { attempts })
    }
}
