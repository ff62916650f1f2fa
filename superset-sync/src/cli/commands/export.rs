//! `export` command handler

use anyhow::Result;
use colored::*;
use log::info;

use crate::api::SupersetClient;
use crate::config::Config;
use crate::sync::export_all;

pub async fn handle_export_command(config: &Config) -> Result<()> {
    let client = SupersetClient::new(&config.source_url, config.credentials.clone())?;
    info!(
        "Exporting from {} into {}",
        client.base_url(),
        config.export_dir.display()
    );

    let summaries = export_all(&client, config).await?;

    for summary in &summaries {
        println!(
            "{:<10} {} written, {} skipped (WIP)",
            summary.entity.to_string().bold(),
            summary.written.to_string().bright_green(),
            summary.skipped_wip
        );
    }
    Ok(())
}
