//! Google Drive storage backend.
//!
//! Implements the remote object store of the delivery chain: a sync HTTP
//! client for the Drive v3 API with OAuth 2 refresh-token credentials.
//!
//! The store owns its credential configuration explicitly (no process
//! globals) and validates it lazily at call time: a missing or
//! unrefreshable credential makes this backend's attempt fail without
//! aborting the chain. The consent-flow helpers in [`token`] only
//! bootstrap a refresh token for operator configuration; delivery itself
//! consumes an already-configured credential.

mod client;
mod error;
mod token;

pub use client::{DriveConfig, DriveStore};
pub use error::DriveError;
pub use token::{RefreshCredential, TokenClient, consent_url};
