//! Conversion endpoint.
//!
//! Accepts a markdown document, renders it to PDF, and either delivers it
//! through the storage chain (returning a download URL) or streams the
//! bytes back directly, depending on the deployment's response mode. The
//! two modes are never combined per request.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use mdpress_config::DeliveryMode;
use mdpress_renderer::RenderedDocument;

use crate::error::ServerError;
use crate::state::AppState;

/// JSON request body for POST /api/convert.
#[derive(Deserialize)]
struct ConvertRequest {
    /// Markdown source text.
    #[serde(default)]
    markdown: String,
}

/// Response for POST /api/convert in upload mode.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    /// Caller-usable download URL.
    download_url: String,
    /// Backend that accepted the upload.
    source: String,
    /// Non-fatal problem from the winning attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// Handle POST /api/convert.
///
/// Rendering and delivery are CPU- and network-bound sync work, so both
/// run inside one blocking task the handler awaits directly; a failure
/// there surfaces as a typed error before the response starts.
pub(crate) async fn convert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let markdown = extract_markdown(&headers, &body)?;

    match state.mode {
        DeliveryMode::Upload => {
            let result = tokio::task::spawn_blocking(move || {
                let document = mdpress_renderer::render(&markdown)?;
                let delivered = state.chain.deliver(&document.bytes, &document.title)?;
                Ok::<_, ServerError>(delivered)
            })
            .await??;

            Ok(Json(ConvertResponse {
                download_url: result.url,
                source: result.source.to_owned(),
                warning: result.warning,
            })
            .into_response())
        }
        DeliveryMode::Direct => {
            let document =
                tokio::task::spawn_blocking(move || mdpress_renderer::render(&markdown)).await??;
            Ok(direct_response(document))
        }
    }
}

/// Pull markdown text out of the request body.
///
/// Accepts a JSON object with a `markdown` field or raw markdown text;
/// anything else is rejected before the renderer or chain runs.
fn extract_markdown(headers: &HeaderMap, body: &Bytes) -> Result<String, ServerError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let markdown = if content_type.starts_with("application/json") {
        let request: ConvertRequest = serde_json::from_slice(body)
            .map_err(|err| ServerError::Input(format!("invalid JSON body: {err}")))?;
        request.markdown
    } else if content_type.starts_with("text/markdown") || content_type.starts_with("text/plain") {
        String::from_utf8(body.to_vec())
            .map_err(|_| ServerError::Input("body is not valid UTF-8".to_owned()))?
    } else {
        return Err(ServerError::UnsupportedMediaType);
    };

    if markdown.trim().is_empty() {
        return Err(ServerError::Input("markdown must not be empty".to_owned()));
    }
    Ok(markdown)
}

/// Build the direct-bytes response: PDF content type, attachment
/// disposition, body streamed from the rendered buffer.
fn direct_response(document: RenderedDocument) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}.pdf\"",
        sanitize_filename(&document.title)
    );
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}

/// Reduce a title to a safe attachment filename stem.
fn sanitize_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "document".to_owned()
    } else {
        stem.to_owned()
    }
}
