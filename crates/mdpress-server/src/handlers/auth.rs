//! Authorization bootstrap and credential-status endpoints.
//!
//! These endpoints only bootstrap and inspect the drive credential; the
//! delivery pipeline consumes an already-configured refresh token and
//! never drives the consent flow itself.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use mdpress_storage_drive::consent_url;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/auth/url.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthUrlResponse {
    /// Consent-flow URL to open in a browser.
    auth_url: String,
}

/// Query parameters for GET /api/auth/callback.
#[derive(Deserialize)]
pub(crate) struct CallbackParams {
    /// Authorization code from the consent screen.
    code: Option<String>,
}

/// Response for GET /api/auth/callback.
///
/// The refresh token is displayed for manual operator configuration, not
/// stored by the server.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CallbackResponse {
    /// Long-lived refresh token.
    refresh_token: String,
    /// Operator instruction.
    message: &'static str,
}

/// Response for GET /api/auth/status.
#[derive(Serialize)]
struct StatusResponse {
    /// Whether a drive credential is configured.
    configured: bool,
    /// Whether the credential passed a read-only API check.
    valid: bool,
}

/// Handle GET /api/auth/url.
pub(crate) async fn auth_url(
    State(state): State<Arc<AppState>>,
) -> Result<Json<impl Serialize>, ServerError> {
    let auth = state.auth.as_ref().ok_or(ServerError::DriveNotConfigured)?;

    Ok(Json(AuthUrlResponse {
        auth_url: consent_url(&auth.client_id, &auth.redirect_uri),
    }))
}

/// Handle GET /api/auth/callback.
pub(crate) async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<impl Serialize>, ServerError> {
    let auth = state
        .auth
        .clone()
        .ok_or(ServerError::DriveNotConfigured)?;
    let code = params
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| ServerError::Input("missing 'code' query parameter".to_owned()))?;

    let credential = tokio::task::spawn_blocking(move || {
        auth.token_client.exchange_code(&code, &auth.redirect_uri)
    })
    .await??;

    info!("authorization code exchanged; refresh token issued");

    Ok(Json(CallbackResponse {
        refresh_token: credential.refresh_token,
        message: "Set this value as drive.refresh_token in mdpress.toml",
    }))
}

/// Handle GET /api/auth/status.
///
/// Performs a lightweight read-only call against the backend to confirm
/// the configured credential is currently usable.
pub(crate) async fn auth_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<impl Serialize>, ServerError> {
    let Some(drive) = state.drive.clone() else {
        return Ok(Json(StatusResponse {
            configured: false,
            valid: false,
        }));
    };

    let configured = drive.is_configured();
    let valid = configured
        && tokio::task::spawn_blocking(move || drive.verify_credentials())
            .await?
            .is_ok();

    Ok(Json(StatusResponse { configured, valid }))
}
