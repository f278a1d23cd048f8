//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/convert", post(handlers::convert::convert))
        .route("/api/health", get(handlers::health::health))
        .route("/api/auth/url", get(handlers::auth::auth_url))
        .route("/api/auth/callback", get(handlers::auth::auth_callback))
        .route("/api/auth/status", get(handlers::auth::auth_status));

    let mut router = Router::new().merge(api_routes);

    // Serve the fallback directory so local download URLs resolve.
    if let Some(files_dir) = &state.files_dir {
        router = router.nest_service(&state.public_base, ServeDir::new(files_dir));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tower::util::ServiceExt;

    use mdpress_config::DeliveryMode;
    use mdpress_storage::DeliveryChain;
    use mdpress_storage_fs::FsStore;

    use super::*;

    fn test_state(mode: DeliveryMode, dir: &Path) -> Arc<AppState> {
        Arc::new(AppState {
            chain: DeliveryChain::new(vec![Box::new(FsStore::new(dir, "/files"))]),
            drive: None,
            auth: None,
            mode,
            files_dir: Some(dir.to_path_buf()),
            public_base: "/files".to_owned(),
        })
    }

    async fn response_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_empty_markdown_is_client_error_and_nothing_runs() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(json_request("/api/convert", r#"{"markdown": ""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("markdown"));
        // Neither the renderer nor the delivery chain ran.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_content_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/convert")
                    .header("content-type", "application/xml")
                    .body(Body::from("<doc/>"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = response_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_convert_upload_mode_delivers_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(json_request(
                "/api/convert",
                r##"{"markdown": "# Hello\n\nThis is **bold**."}"##,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["source"], "local");
        let url = json["downloadUrl"].as_str().unwrap();
        assert!(url.starts_with("/files/Hello-"));
        assert!(url.ends_with(".pdf"));

        let filename = url.strip_prefix("/files/").unwrap();
        let content = std::fs::read(dir.path().join(filename)).unwrap();
        assert!(content.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_convert_accepts_raw_markdown_body() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/convert")
                    .header("content-type", "text/markdown")
                    .body(Body::from("# Raw\n\ntext"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert!(
            json["downloadUrl"]
                .as_str()
                .unwrap()
                .starts_with("/files/Raw-")
        );
    }

    #[tokio::test]
    async fn test_convert_direct_mode_streams_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Direct, dir.path()));

        let response = app
            .oneshot(json_request(
                "/api/convert",
                r##"{"markdown": "# Report\n\nbody"}"##,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/pdf"
        );
        let disposition = response
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("Report.pdf"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"%PDF-"));
        // Direct mode never touches the storage chain.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delivered_file_is_served_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(DeliveryMode::Upload, dir.path());

        let response = create_router(Arc::clone(&state))
            .oneshot(json_request("/api/convert", r##"{"markdown": "# Round Trip"}"##))
            .await
            .unwrap();
        let json = response_json(response).await;
        let url = json["downloadUrl"].as_str().unwrap().to_owned();

        let download = create_router(state)
            .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(download.status(), StatusCode::OK);
        let bytes = download.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_auth_url_requires_drive_config() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(Request::get("/api/auth/url").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_status_without_drive() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(DeliveryMode::Upload, dir.path()));

        let response = app
            .oneshot(Request::get("/api/auth/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["configured"], false);
        assert_eq!(json["valid"], false);
    }
}
