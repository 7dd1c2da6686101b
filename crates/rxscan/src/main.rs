//! rxscan - transcribe handwritten prescriptions through a hosted vision model.
//!
//! Upload a photo of a prescription, send it with a fixed instruction to a
//! hosted multimodal model, then read or download the transcription.
//!
//! # Usage
//!
//! ```bash
//! # Serve the upload page on http://127.0.0.1:8501
//! rxscan serve
//!
//! # Transcribe one image from the terminal
//! rxscan extract prescription.jpg --output report.txt
//!
//! # Store the API key in the config file
//! rxscan config set-key <KEY>
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod web;

/// rxscan - transcribe handwritten prescriptions through a hosted vision model.
#[derive(Parser, Debug)]
#[command(name = "rxscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "RXSCAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the upload page
    Serve(cli::serve::ServeArgs),

    /// Transcribe a single image and print the result
    Extract(cli::extract::ExtractArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match rxscan_core::Config::load_or_default_path(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Config(_)) => {
            eprintln!("Warning: Failed to load config: {e}\n  Using default configuration.");
            rxscan_core::Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("rxscan v{}", rxscan_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Extract(args) => cli::extract::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config, config).await,
    }
}
