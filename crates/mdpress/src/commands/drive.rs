//! `mdpress drive` command implementations.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Subcommand};

use mdpress_config::Config;
use mdpress_storage_drive::{TokenClient, consent_url};

use crate::error::CliError;
use crate::output::Output;

/// Redirect URI used when neither flag nor config provides one.
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/api/auth/callback";

/// Drive credential commands.
#[derive(Subcommand)]
pub(crate) enum DriveCommand {
    /// Generate an OAuth refresh token through the consent flow.
    GenerateToken(GenerateTokenArgs),
}

impl DriveCommand {
    /// Execute the drive command.
    ///
    /// # Errors
    ///
    /// Returns an error if token generation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::GenerateToken(args) => args.execute(),
        }
    }
}

/// Arguments for the drive generate-token command.
#[derive(Args)]
pub(crate) struct GenerateTokenArgs {
    /// OAuth client id (default: from config).
    #[arg(long)]
    client_id: Option<String>,

    /// OAuth client secret (default: from config).
    #[arg(long)]
    client_secret: Option<String>,

    /// Redirect URI registered for the client (default: from config or the
    /// local server callback).
    #[arg(long)]
    redirect_uri: Option<String>,

    /// Path to configuration file (default: auto-discover mdpress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl GenerateTokenArgs {
    /// Execute the generate-token command.
    ///
    /// # Errors
    ///
    /// Returns an error if the code exchange fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Load config
        let config = Config::load(self.config.as_deref(), None)?;

        // Resolve effective values
        let client_id = self
            .client_id
            .or_else(|| config.drive.as_ref().map(|d| d.client_id.clone()));
        let Some(client_id) = client_id else {
            output.error("Error: client id required (via --client-id or config)");
            return Err(CliError::Validation("client id required".to_owned()));
        };

        let client_secret = self
            .client_secret
            .or_else(|| config.drive.as_ref().map(|d| d.client_secret.clone()));
        let Some(client_secret) = client_secret else {
            output.error("Error: client secret required (via --client-secret or config)");
            return Err(CliError::Validation("client secret required".to_owned()));
        };

        let redirect_uri = self
            .redirect_uri
            .or_else(|| config.drive.as_ref().and_then(|d| d.redirect_uri.clone()))
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_owned());

        // Step 1: User authorization
        output.separator();
        output.highlight("Step 1: Authorization Required");
        output.separator();
        output.info("\nPlease open this URL in your browser:");
        output.highlight(&format!("\n{}\n", consent_url(&client_id, &redirect_uri)));

        // Read authorization code from stdin
        write!(io::stdout(), "Enter the authorization code: ")?;
        io::stdout().flush()?;
        let mut code = String::new();
        io::stdin().read_line(&mut code)?;
        let code = code.trim();

        // Step 2: Exchange for refresh token
        output.info("\nStep 2: Exchanging code for refresh token...");
        let credential =
            TokenClient::new(&client_id, &client_secret).exchange_code(code, &redirect_uri)?;

        // Output results
        output.separator();
        output.success("Authorization Successful!");
        output.separator();
        output.info("\nAdd these credentials to your mdpress.toml:");
        output.info("\n[drive]");
        output.info(&format!(r#"client_id = "{client_id}""#));
        output.info(&format!(r#"client_secret = "{client_secret}""#));
        output.info(&format!(
            r#"refresh_token = "{}""#,
            credential.refresh_token
        ));

        Ok(())
    }
}
