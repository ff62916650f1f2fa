//! `import` command handler

use anyhow::Result;
use colored::*;
use log::info;

use crate::api::SupersetClient;
use crate::config::Config;
use crate::sync::import_all;

pub async fn handle_import_command(config: &Config) -> Result<()> {
    let client = SupersetClient::new(&config.target_url, config.credentials.clone())?;
    info!(
        "Importing {} into {}",
        config.export_dir.display(),
        client.base_url()
    );

    let summary = import_all(&client, config).await?;

    println!(
        "{} {} created, {} skipped",
        "Done:".bold(),
        summary.created.to_string().bright_green(),
        summary.skipped
    );
    Ok(())
}
