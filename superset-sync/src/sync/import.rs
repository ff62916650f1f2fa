//! Replay exported records against a target instance

use anyhow::{Context, Result, bail};
use colored::*;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::files::{discover_export_files, entity_prefix};
use super::normalize::{simplify_chart_data, simplify_dashboard_data, simplify_dataset_data};
use crate::api::{EntityKind, Filter, SupersetApi};
use crate::config::Config;

/// What happened to a single export file
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The record was submitted; holds the decoded response body
    Created(Value),
    /// A dataset with the same table name already exists on the target
    Skipped { table_name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Whether the target already has a dataset whose `table_name` equals `table_name`
pub async fn dataset_exists(api: &dyn SupersetApi, token: &str, table_name: &Value) -> Result<bool> {
    let matches = api
        .count_matching(
            token,
            EntityKind::Dataset,
            &Filter::eq("table_name", table_name.clone()),
        )
        .await?;
    Ok(matches > 0)
}

fn load_record(file_path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read export file: {}", file_path.display()))?;
    let record: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse export file: {}", file_path.display()))?;
    if !record.is_object() {
        bail!(
            "Export file {} does not contain a JSON object",
            file_path.display()
        );
    }
    Ok(record)
}

/// Import one export file as an `entity` record
///
/// The entity type is checked before anything is sent. Each call logs in
/// afresh and obtains its own CSRF token and cookies.
pub async fn import_entity(
    api: &dyn SupersetApi,
    config: &Config,
    entity: &str,
    file_path: &Path,
) -> Result<ImportOutcome> {
    let kind: EntityKind = entity
        .parse()
        .with_context(|| format!("Cannot import {}", file_path.display()))?;

    let token = api.login().await.context("Authentication failed")?;
    let session = api.csrf_session(&token).await?;

    let data = load_record(file_path)?;

    let payload = match kind {
        EntityKind::Chart => simplify_chart_data(&data)?,
        EntityKind::Dashboard => {
            simplify_dashboard_data(api, &token, &data, config.max_slug_attempts).await?
        }
        EntityKind::Dataset => {
            let payload = simplify_dataset_data(&data)?;
            let table_name_value = &payload["table_name"];
            if dataset_exists(api, &token, table_name_value).await? {
                let table_name = match table_name_value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!(
                    "{} {} already exists. Skipping import.",
                    "Dataset".yellow(),
                    table_name.bold()
                );
                return Ok(ImportOutcome::Skipped { table_name });
            }
            payload
        }
    };

    debug!("Submitting {} from {}", kind, file_path.display());
    let response = api
        .create(&token, &session, kind, &payload)
        .await
        .with_context(|| format!("Failed to import {}", file_path.display()))?;

    println!("{} {}", "Import successful:".bright_green(), response);
    Ok(ImportOutcome::Created(response))
}

/// Import every export file in natural order, stopping at the first failure
pub async fn import_all(api: &dyn SupersetApi, config: &Config) -> Result<ImportSummary> {
    let files = discover_export_files(&config.export_dir)?;
    info!(
        "Found {} export file(s) in {}",
        files.len(),
        config.export_dir.display()
    );

    let mut summary = ImportSummary::default();
    for path in files {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let entity = entity_prefix(file_name);

        match import_entity(api, config, entity, &path).await? {
            ImportOutcome::Created(response) => {
                debug!("{} accepted: {}", file_name, response);
                summary.created += 1;
            }
            ImportOutcome::Skipped { table_name } => {
                debug!("{} skipped, dataset '{}' exists", file_name, table_name);
                summary.skipped += 1;
            }
        }
    }

    info!(
        "Import finished: {} created, {} skipped",
        summary.created, summary.skipped
    );
    Ok(summary)
}
