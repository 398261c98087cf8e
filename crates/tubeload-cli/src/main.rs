use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod pipeline;

#[derive(Debug, Parser)]
#[command(name = "tubeload")]
#[command(about = "Load tracked YouTube channels, videos and comments into BigQuery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one extract, classify and load pass
    Run {
        /// Channels file (overrides `TUBELOAD_CHANNELS_PATH`)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extract, classify and validate, but skip warehouse writes
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate configuration and list the tracked channels
    CheckConfig {
        /// Channels file (overrides `TUBELOAD_CHANNELS_PATH`)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = tubeload_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run {
            config: channels_path,
            dry_run,
        } => commands::run(&config, channels_path.as_deref(), dry_run).await,
        Commands::CheckConfig {
            config: channels_path,
        } => commands::check_config(&config, channels_path.as_deref()),
    }
}

#[cfg(test)]
mod tests;
