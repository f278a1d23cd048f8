//! Server error type and HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use mdpress_renderer::RenderError;
use mdpress_storage::DeliveryError;
use mdpress_storage_drive::DriveError;

/// Error returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Invalid request payload (client error, never retried).
    #[error("{0}")]
    Input(String),

    /// Request body carried an unsupported content type.
    #[error("unsupported content type: expected application/json or text/markdown")]
    UnsupportedMediaType,

    /// Document rendering failed (fatal, not retried).
    #[error("failed to render document")]
    Render(#[from] RenderError),

    /// Every configured storage backend failed.
    #[error("document storage is unavailable")]
    Delivery(#[from] DeliveryError),

    /// Drive API call failed (auth bootstrap endpoints).
    #[error("drive request failed")]
    Drive(#[from] DriveError),

    /// The requested endpoint needs a configured drive backend.
    #[error("drive backend is not configured")]
    DriveNotConfigured,

    /// Conversion task was cancelled or panicked.
    #[error("conversion task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// JSON error body returned to the caller.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Input(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Render(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery(_) | Self::Drive(_) => StatusCode::BAD_GATEWAY,
            Self::DriveNotConfigured => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // The caller gets a terse message; the detail goes to the log.
            match &self {
                Self::Delivery(err) => tracing::error!(error = %err, "delivery failed"),
                Self::Render(err) => tracing::error!(error = %err, "render failed"),
                Self::Drive(err) => tracing::error!(error = %err, "drive request failed"),
                Self::Task(err) => tracing::error!(error = %err, "conversion task failed"),
                _ => tracing::error!(error = %self, "request failed"),
            }
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_is_bad_request() {
        assert_eq!(
            ServerError::Input("markdown must not be empty".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_media_type_error_is_415() {
        assert_eq!(
            ServerError::UnsupportedMediaType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_missing_drive_is_404() {
        assert_eq!(ServerError::DriveNotConfigured.status(), StatusCode::NOT_FOUND);
    }
}
