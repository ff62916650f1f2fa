//! Command-line interface definitions

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "superset-sync")]
#[command(about = "Export and import Superset dashboards, charts and datasets")]
#[command(version)]
pub struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export every dashboard, chart and dataset to EXPORT_FOLDER
    Export,
    /// Import the files in EXPORT_FOLDER into the target instance
    Import,
}
