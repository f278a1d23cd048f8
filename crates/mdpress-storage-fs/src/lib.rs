//! Local filesystem storage backend.
//!
//! The terminal fallback of the delivery chain: requires no credentials,
//! so validation always succeeds, and a chain that ends with this backend
//! cannot be exhausted while the disk is writable. Files are written under
//! uniquely generated names (append-only), so concurrent deliveries never
//! collide. Nothing here prunes old files; retention is an operator
//! concern.

use std::path::{Path, PathBuf};

use tracing::debug;

use mdpress_storage::{AttemptStage, BackendError, StorageBackend, Uploaded, object_name};

/// Backend identifier reported in results and logs.
const BACKEND_NAME: &str = "local";

/// Filesystem storage backend.
///
/// Writes documents into a local directory and resolves URLs against a
/// public base path under which the server exposes that directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
    public_base: String,
}

impl FsStore {
    /// Create a store writing into `dir`, with URLs under `public_base`.
    ///
    /// The directory is created on first upload, not here: validation must
    /// stay side-effect free.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base: public_base.into(),
        }
    }

    /// Directory documents are written into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map an I/O error into an upload-stage attempt error.
    fn io_error(err: std::io::Error, path: &Path) -> BackendError {
        BackendError::new(AttemptStage::Upload, BACKEND_NAME)
            .with_message(format!("write failed (path: {})", path.display()))
            .with_source(err)
    }
}

impl StorageBackend for FsStore {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    /// The local backend never fails validation.
    fn validate(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn upload(&self, bytes: &[u8], title: &str) -> Result<Uploaded, BackendError> {
        let filename = object_name(title);
        let path = self.dir.join(&filename);

        std::fs::create_dir_all(&self.dir).map_err(|err| Self::io_error(err, &self.dir))?;
        std::fs::write(&path, bytes).map_err(|err| Self::io_error(err, &path))?;

        debug!(path = %path.display(), size = bytes.len(), "document written to fallback directory");

        Ok(Uploaded {
            url: format!("{}/{filename}", self.public_base.trim_end_matches('/')),
            warning: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_validation_always_passes() {
        let store = FsStore::new("/nonexistent/path", "/files");

        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path(), "/files");

        let uploaded = store.upload(b"%PDF-1.7 test", "My Report").unwrap();

        assert!(uploaded.url.starts_with("/files/My-Report-"));
        assert!(uploaded.url.ends_with(".pdf"));
        assert!(uploaded.warning.is_none());

        let filename = uploaded.url.strip_prefix("/files/").unwrap();
        let content = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(content, b"%PDF-1.7 test");
    }

    #[test]
    fn test_upload_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("pdf");
        let store = FsStore::new(&nested, "/files");

        store.upload(b"data", "Doc").unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_repeated_uploads_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path(), "/files");

        let first = store.upload(b"one", "Same Title").unwrap();
        let second = store.upload(b"two", "Same Title").unwrap();

        assert_ne!(first.url, second.url);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_public_base_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path(), "/files/");

        let uploaded = store.upload(b"data", "Doc").unwrap();

        assert!(uploaded.url.starts_with("/files/Doc-"));
        assert!(!uploaded.url.contains("//"));
    }
}
