//! `mdpress serve` command implementation.

use std::path::PathBuf;

use clap::Args;

use mdpress_config::{CliSettings, Config, DeliveryMode};
use mdpress_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdpress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Fallback directory for delivered documents (overrides config).
    #[arg(long)]
    fallback_dir: Option<PathBuf>,

    /// Stream PDF bytes back directly instead of uploading.
    #[arg(long)]
    direct: bool,

    /// Enable verbose output (show request and delivery logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Build CLI settings from args
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            fallback_dir: self.fallback_dir,
            mode: self.direct.then_some(DeliveryMode::Direct),
        };

        // Load config
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        // Print startup info
        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        match config.delivery.mode {
            DeliveryMode::Upload => {
                if config.drive.is_some() {
                    output.info("Delivery chain: drive, local fallback");
                } else {
                    output.info("Delivery chain: local fallback only");
                }
                if config.fallback.enabled {
                    output.info(&format!(
                        "Fallback directory: {}",
                        config.fallback.dir.display()
                    ));
                }
            }
            DeliveryMode::Direct => {
                output.info("Delivery: direct response (no upload)");
            }
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config)
            .await
            .map_err(|err| CliError::Server(err.to_string()))
    }
}
