//! Storage backend abstraction and delivery chain.
//!
//! This crate provides a [`StorageBackend`] trait for uploading a rendered
//! document to a storage destination, plus the [`DeliveryChain`] that tries
//! an ordered list of backends until one succeeds. This enables:
//!
//! - **Unit testing** without network or filesystem access
//! - **Backend flexibility** (remote object store, local filesystem)
//! - **Fallback as configuration**: adding, removing, or reordering
//!   backends is a chain-construction change, not a code change
//!
//! # Architecture
//!
//! - [`StorageBackend`] trait with `validate()` and `upload()` methods
//! - [`DeliveryChain`] iterating backends in preference order
//! - [`BackendError`] carrying the failing backend and attempt stage, so a
//!   failed attempt can be diagnosed without aborting the request
//! - [`MockBackend`] for testing (behind `mock` feature flag)

mod backend;
mod chain;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod object_name;

pub use backend::{AttemptStage, BackendError, StorageBackend, Uploaded};
pub use chain::{DeliveryChain, DeliveryError, DeliveryResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockBackend;
pub use object_name::object_name;
