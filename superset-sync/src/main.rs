mod api;
mod cli;
mod config;
mod sync;

use anyhow::{Context, Result};
use clap::Parser;

use cli::commands::{handle_export_command, handle_import_command};
use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file: {}", path.display()))?;
        }
        None => {
            // A missing ./.env is fine, the variables may already be set
            if let Err(err) = dotenvy::dotenv() {
                if !err.not_found() {
                    return Err(err).context("Failed to load .env");
                }
            }
        }
    }

    let config = Config::from_env()?;

    match cli.command {
        Commands::Export => handle_export_command(&config).await,
        Commands::Import => handle_import_command(&config).await,
    }
}
