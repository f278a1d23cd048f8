//! Drive REST API client and backend implementation.

use std::sync::RwLock;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};
use ureq::Agent;

use mdpress_storage::{AttemptStage, BackendError, StorageBackend, Uploaded, object_name};

use crate::error::DriveError;
use crate::token::TokenClient;

/// Backend identifier reported in results and logs.
const BACKEND_NAME: &str = "drive";

/// Multipart upload endpoint; asks for the fields URL resolution needs.
const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,webContentLink";

/// Files endpoint for metadata reads and permission writes.
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Lightweight read-only endpoint for credential checks.
const ABOUT_URL: &str = "https://www.googleapis.com/drive/v3/about?fields=user";

/// Per-backend HTTP timeout in seconds, bounding how long a hung remote
/// call can delay fallback.
const DEFAULT_TIMEOUT: u64 = 8;

/// Credential and placement configuration for the Drive backend.
///
/// Owned by the [`DriveStore`] instance; nothing here is read from the
/// process environment at call time.
#[derive(Debug, Clone, Default)]
pub struct DriveConfig {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token, exchanged for access tokens at use time.
    pub refresh_token: Option<String>,
    /// Pre-issued access token (used until it expires; optional).
    pub access_token: Option<String>,
    /// Folder to upload into (root of the authorized Drive if absent).
    pub folder_id: Option<String>,
}

/// File resource subset returned by upload and metadata calls.
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(rename = "webContentLink")]
    web_content_link: Option<String>,
}

/// Google Drive storage backend.
///
/// The cached access token lives behind an `RwLock`; two concurrent
/// deliveries may both refresh an absent token, which is tolerated since
/// the exchange is idempotent with respect to the end state.
pub struct DriveStore {
    agent: Agent,
    config: DriveConfig,
    token_client: TokenClient,
    access_token: RwLock<Option<String>>,
}

impl DriveStore {
    /// Create a store from explicit configuration.
    #[must_use]
    pub fn new(config: DriveConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let token_client = TokenClient::new(&config.client_id, &config.client_secret);
        let access_token = RwLock::new(config.access_token.clone());

        Self {
            agent,
            config,
            token_client,
            access_token,
        }
    }

    /// Whether enough configuration is present to attempt this backend.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty()
            && !self.config.client_secret.is_empty()
            && (self.config.refresh_token.is_some() || self.config.access_token.is_some())
    }

    /// Return the cached access token, deriving one from the refresh token
    /// on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Auth`] if no credential is configured or the
    /// refresh exchange fails.
    fn ensure_access_token(&self) -> Result<String, DriveError> {
        if let Some(token) = self.access_token.read().expect("token lock poisoned").clone() {
            return Ok(token);
        }
        self.refresh_access_token()
    }

    /// Exchange the refresh token for a fresh access token and cache it.
    ///
    /// Explicit so the credential lifecycle can be driven (and tested)
    /// without process-level mocking.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Auth`] if no refresh token is configured or
    /// the exchange fails.
    pub fn refresh_access_token(&self) -> Result<String, DriveError> {
        let refresh_token = self
            .config
            .refresh_token
            .as_deref()
            .ok_or_else(|| DriveError::Auth("no refresh token configured".to_owned()))?;

        debug!("exchanging refresh token for access token");
        let token = self.token_client.exchange_refresh_token(refresh_token)?;

        *self.access_token.write().expect("token lock poisoned") = Some(token.clone());
        Ok(token)
    }

    /// Check the configured credential with a read-only `about` call.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError`] if the credential is missing, expired, or
    /// rejected by the API.
    pub fn verify_credentials(&self) -> Result<(), DriveError> {
        let token = self.ensure_access_token()?;
        let response = self
            .agent
            .get(ABOUT_URL)
            .header("Authorization", &format!("Bearer {token}"))
            .header("Accept", "application/json")
            .call()?;
        Self::read_ok(response).map(|_| ())
    }

    /// Upload bytes as a multipart/related request, returning the file
    /// resource.
    fn upload_multipart(
        &self,
        token: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<DriveFile, DriveError> {
        let mut metadata = serde_json::json!({
            "name": name,
            "mimeType": "application/pdf",
        });
        if let Some(folder_id) = &self.config.folder_id {
            metadata["parents"] = serde_json::json!([folder_id]);
        }

        let boundary = format!("mdpressFormBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_related(&boundary, &metadata.to_string(), bytes);

        info!(name, size = bytes.len(), "uploading document to Drive");

        let response = self
            .agent
            .post(UPLOAD_URL)
            .header("Authorization", &format!("Bearer {token}"))
            .header(
                "Content-Type",
                &format!("multipart/related; boundary={boundary}"),
            )
            .header("Accept", "application/json")
            .send(&body[..])?;

        let mut body_reader = Self::read_ok(response)?;
        Ok(body_reader.read_json()?)
    }

    /// Best-effort attempt to mark the file publicly readable.
    fn allow_public_read(&self, token: &str, file_id: &str) -> Result<(), DriveError> {
        let body = serde_json::json!({"role": "reader", "type": "anyone"}).to_string();

        let response = self
            .agent
            .post(&format!("{FILES_URL}/{file_id}/permissions"))
            .header("Authorization", &format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(body.as_bytes())?;

        Self::read_ok(response).map(|_| ())
    }

    /// Resolve a caller-usable URL for an uploaded file.
    ///
    /// Prefers the link the API returned with the upload, then a metadata
    /// read, and finally synthesizes the direct-download form, which can
    /// work even when permission metadata could not be written.
    fn resolve_url(&self, token: &str, file: &DriveFile) -> String {
        if let Some(link) = &file.web_content_link {
            return link.clone();
        }

        let fetched = self
            .agent
            .get(&format!("{FILES_URL}/{}?fields=webContentLink", file.id))
            .header("Authorization", &format!("Bearer {token}"))
            .header("Accept", "application/json")
            .call()
            .map_err(DriveError::from)
            .and_then(|response| {
                let mut body_reader = Self::read_ok(response)?;
                Ok(body_reader.read_json::<DriveFile>()?)
            });

        match fetched {
            Ok(DriveFile {
                web_content_link: Some(link),
                ..
            }) => link,
            Ok(_) | Err(_) => synthesized_download_url(&file.id),
        }
    }

    /// Split a response into its body, mapping error statuses.
    fn read_ok(response: ureq::http::Response<ureq::Body>) -> Result<ureq::Body, DriveError> {
        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(DriveError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body_reader)
    }
}

impl StorageBackend for DriveStore {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    /// Validate configuration and derive an access token if needed.
    ///
    /// A failed refresh exchange is treated identically to absent
    /// credentials: this backend's attempt fails and the chain advances
    /// without any upload I/O.
    fn validate(&self) -> Result<(), BackendError> {
        if !self.is_configured() {
            return Err(BackendError::credentials(
                BACKEND_NAME,
                "client id, client secret, and a refresh or access token are required",
            ));
        }
        self.ensure_access_token().map(|_| ()).map_err(|err| {
            BackendError::new(AttemptStage::Credentials, BACKEND_NAME)
                .with_message("access token refresh failed")
                .with_source(err)
        })
    }

    fn upload(&self, bytes: &[u8], title: &str) -> Result<Uploaded, BackendError> {
        let token = self.ensure_access_token().map_err(|err| {
            BackendError::new(AttemptStage::Credentials, BACKEND_NAME)
                .with_message("access token unavailable")
                .with_source(err)
        })?;

        let name = object_name(title);
        let file = self.upload_multipart(&token, &name, bytes).map_err(|err| {
            BackendError::new(AttemptStage::Upload, BACKEND_NAME)
                .with_message(format!("upload of '{name}' failed"))
                .with_source(err)
        })?;

        if file.id.is_empty() {
            return Err(BackendError::new(AttemptStage::ResolveUrl, BACKEND_NAME)
                .with_message("upload response carried no file id"));
        }

        // Permission failure is logged but does not fail the upload: the
        // direct-download URL form may work regardless.
        let warning = match self.allow_public_read(&token, &file.id) {
            Ok(()) => None,
            Err(err) => {
                warn!(file_id = %file.id, error = %err, "could not mark file publicly readable");
                Some(format!("could not set public permission: {err}"))
            }
        };

        Ok(Uploaded {
            url: self.resolve_url(&token, &file),
            warning,
        })
    }
}

/// Assemble a multipart/related body: JSON metadata part plus media part.
fn multipart_related(boundary: &str, metadata: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + metadata.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Direct-download URL template for a file id.
fn synthesized_download_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={file_id}")
}
