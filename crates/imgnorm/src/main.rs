//! imgnorm CLI - batch trim, pad, letterbox, watermark and convert images.
//!
//! imgnorm reads image files, runs them through a configurable normalization
//! chain on a bounded worker pool, and writes consistently named outputs plus
//! a zip archive and an optional JSON report.
//!
//! # Usage
//!
//! ```bash
//! # Trim transparent margins and convert to WebP
//! imgnorm process ./cutouts/ --output ./out
//!
//! # 250x250 thumbnails
//! imgnorm process a.png b.png --preset thumbnail
//!
//! # Watermark with a logo
//! imgnorm process ./photos/ --preset logo --logo brand.png
//!
//! # View configuration
//! imgnorm config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// imgnorm - batch image normalization.
#[derive(Parser, Debug)]
#[command(name = "imgnorm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a batch of images
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match imgnorm_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default logging settings. Check your config file with `imgnorm config path`."
            );
            imgnorm_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("imgnorm v{}", imgnorm_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
