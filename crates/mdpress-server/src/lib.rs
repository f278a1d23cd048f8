//! HTTP server for mdpress.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - The conversion endpoint (markdown in, download URL or PDF bytes out)
//! - Health and credential-status endpoints
//! - Authorization bootstrap endpoints for the drive consent flow
//! - The local fallback directory, so fallback download URLs resolve
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum server (mdpress-server)
//!                      │
//!                      ├─► POST /api/convert ──► renderer ──► delivery chain
//!                      │                          (one awaited blocking task)
//!                      ├─► GET /api/health, /api/auth/*
//!                      │
//!                      └─► GET /files/* (tower-http ServeDir)
//! ```
//!
//! Requests are handled independently; the only shared state is the
//! delivery chain and its credential configuration, which is read-only
//! after startup (token refresh swaps a cached value, a tolerated benign
//! race).

mod app;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mdpress_config::{Config, DeliveryMode};
use mdpress_storage::{DeliveryChain, StorageBackend};
use mdpress_storage_drive::{DriveConfig, DriveStore, TokenClient};
use mdpress_storage_fs::FsStore;

use state::{AppState, AuthBootstrap};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Conversion response mode for this deployment.
    pub mode: DeliveryMode,
    /// Whether the local fallback backend is in the chain.
    pub fallback_enabled: bool,
    /// Directory the fallback backend writes into.
    pub fallback_dir: PathBuf,
    /// Public base path for fallback downloads.
    pub public_base: String,
    /// Drive backend configuration (`None` disables the remote backend).
    pub drive: Option<DriveConfig>,
    /// Redirect URI for the consent flow (defaults to this server's
    /// callback endpoint).
    pub redirect_uri: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            mode: DeliveryMode::Upload,
            fallback_enabled: true,
            fallback_dir: PathBuf::from("exports"),
            public_base: "/files".to_owned(),
            drive: None,
            redirect_uri: None,
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    let state = build_state(&config);
    let app = app::create_router(state);

    tracing::info!(address = %addr, mode = ?config.mode, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Build shared application state from the server configuration.
///
/// The chain is ordered most durable first: the drive backend when
/// configured, then the always-available local fallback.
fn build_state(config: &ServerConfig) -> Arc<AppState> {
    let drive = config
        .drive
        .clone()
        .map(|drive_config| Arc::new(DriveStore::new(drive_config)));

    let mut backends: Vec<Box<dyn StorageBackend>> = Vec::new();
    if let Some(drive) = &drive {
        backends.push(Box::new(Arc::clone(drive)));
    }
    let public_base = format!("/{}", config.public_base.trim_matches('/'));
    if config.fallback_enabled {
        backends.push(Box::new(FsStore::new(
            config.fallback_dir.clone(),
            public_base.clone(),
        )));
    }

    let redirect_uri = config.redirect_uri.clone().unwrap_or_else(|| {
        format!(
            "http://{}:{}/api/auth/callback",
            config.host, config.port
        )
    });
    let auth = config.drive.as_ref().map(|drive_config| {
        Arc::new(AuthBootstrap {
            client_id: drive_config.client_id.clone(),
            redirect_uri,
            token_client: TokenClient::new(&drive_config.client_id, &drive_config.client_secret),
        })
    });

    Arc::new(AppState {
        chain: DeliveryChain::new(backends),
        drive,
        auth,
        mode: config.mode,
        files_dir: config.fallback_enabled.then(|| config.fallback_dir.clone()),
        public_base,
    })
}

/// Create server configuration from mdpress config.
///
/// # Arguments
///
/// * `config` - mdpress configuration
#[must_use]
pub fn server_config_from_config(config: &Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        mode: config.delivery.mode,
        fallback_enabled: config.fallback.enabled,
        fallback_dir: config.fallback.dir.clone(),
        public_base: config.fallback.public_base.clone(),
        drive: config.drive.as_ref().map(|drive| DriveConfig {
            client_id: drive.client_id.clone(),
            client_secret: drive.client_secret.clone(),
            refresh_token: drive.refresh_token.clone(),
            access_token: drive.access_token.clone(),
            folder_id: drive.folder_id.clone(),
        }),
        redirect_uri: config.drive.as_ref().and_then(|drive| drive.redirect_uri.clone()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_build_state_chain_order() {
        let config = ServerConfig {
            drive: Some(DriveConfig {
                client_id: "id".to_owned(),
                client_secret: "secret".to_owned(),
                refresh_token: Some("refresh".to_owned()),
                access_token: None,
                folder_id: None,
            }),
            ..ServerConfig::default()
        };

        let state = build_state(&config);

        assert_eq!(state.chain.len(), 2);
        assert!(state.drive.is_some());
        assert!(state.auth.is_some());
    }

    #[test]
    fn test_build_state_without_drive() {
        let state = build_state(&ServerConfig::default());

        assert_eq!(state.chain.len(), 1);
        assert!(state.drive.is_none());
        assert!(state.auth.is_none());
    }

    #[test]
    fn test_build_state_without_fallback() {
        let config = ServerConfig {
            fallback_enabled: false,
            ..ServerConfig::default()
        };

        let state = build_state(&config);

        assert_eq!(state.chain.len(), 0);
        assert!(state.files_dir.is_none());
    }

    #[test]
    fn test_default_redirect_uri_points_at_callback() {
        let config = ServerConfig {
            drive: Some(DriveConfig {
                client_id: "id".to_owned(),
                client_secret: "secret".to_owned(),
                refresh_token: None,
                access_token: None,
                folder_id: None,
            }),
            ..ServerConfig::default()
        };

        let state = build_state(&config);

        assert_eq!(
            state.auth.as_ref().unwrap().redirect_uri,
            "http://127.0.0.1:8080/api/auth/callback"
        );
    }

    #[test]
    fn test_server_config_from_config_defaults() {
        let config = Config::default();

        let server_config = server_config_from_config(&config);

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 8080);
        assert_eq!(server_config.mode, DeliveryMode::Upload);
        assert!(server_config.fallback_enabled);
        assert!(server_config.drive.is_none());
    }
}
