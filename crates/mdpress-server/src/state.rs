//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use mdpress_config::DeliveryMode;
use mdpress_storage::DeliveryChain;
use mdpress_storage_drive::{DriveStore, TokenClient};

/// Consent-flow bootstrap configuration.
///
/// Only used by the auth endpoints; the delivery chain itself consumes an
/// already-configured credential.
pub(crate) struct AuthBootstrap {
    /// OAuth client id (for the consent URL).
    pub(crate) client_id: String,
    /// Redirect URI pointing at the callback endpoint.
    pub(crate) redirect_uri: String,
    /// Token exchange client for the callback.
    pub(crate) token_client: TokenClient,
}

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Ordered storage backends for document delivery.
    pub(crate) chain: DeliveryChain,
    /// Drive store handle for credential-status checks (also first in the
    /// chain when configured).
    pub(crate) drive: Option<Arc<DriveStore>>,
    /// Consent-flow bootstrap (present when a drive client is configured).
    pub(crate) auth: Option<Arc<AuthBootstrap>>,
    /// Conversion response mode for this deployment.
    pub(crate) mode: DeliveryMode,
    /// Local fallback directory served under `public_base` (None when the
    /// fallback backend is disabled).
    pub(crate) files_dir: Option<PathBuf>,
    /// Public base path for fallback downloads.
    pub(crate) public_base: String,
}
