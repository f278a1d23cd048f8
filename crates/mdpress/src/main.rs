//! mdpress CLI - Markdown to PDF conversion and delivery.
//!
//! Provides commands for:
//! - `serve`: Start the conversion server
//! - `convert`: Render a markdown file to PDF locally
//! - `drive generate-token`: Generate an OAuth refresh token

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, DriveCommand, ServeArgs};
use output::Output;

/// mdpress - Markdown to PDF conversion and delivery.
#[derive(Parser)]
#[command(name = "mdpress", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the conversion server.
    Serve(ServeArgs),
    /// Render a markdown file to PDF locally.
    Convert(ConvertArgs),
    /// Drive credential commands.
    #[command(subcommand)]
    Drive(DriveCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Check if verbose flag is set for serve command
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
        Commands::Convert(args) => args.execute(),
        Commands::Drive(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
