//! Export every dashboard, chart and dataset to one JSON file per record

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::files::export_file_name;
use crate::api::{EntityKind, SupersetApi};
use crate::config::Config;

const WIP_MARKER: &str = "WIP";

/// Counters for one exported collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub entity: EntityKind,
    /// Page requests issued, including the final empty one
    pub pages: u32,
    pub written: usize,
    pub skipped_wip: usize,
}

/// Records whose `slice_name` contains `WIP` are never exported
pub fn is_work_in_progress(item: &Value) -> bool {
    item.get("slice_name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.contains(WIP_MARKER))
}

/// The record's integer `id` rendered for use in a file name
fn record_id(entity: EntityKind, item: &Value) -> Result<String> {
    match item.get("id") {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Some(other) => anyhow::bail!("{} record has a non-integer id: {}", entity, other),
        None => anyhow::bail!("{} record has no id: {}", entity, item),
    }
}

/// Serialize with 4-space indentation
pub fn to_pretty_json(item: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    item.serialize(&mut serializer)
        .context("Failed to serialize record")?;
    Ok(buf)
}

/// Write `item` to `{dir}/{entity}_{id}.json`, replacing any previous file
fn write_record(dir: &Path, entity: EntityKind, item: &Value) -> Result<PathBuf> {
    let id = record_id(entity, item)?;
    let path = dir.join(export_file_name(entity, &id));
    let contents = to_pretty_json(item)?;
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    Ok(path)
}

/// Page through one collection and write every non-WIP record
///
/// Stops at the first empty page, or after `config.page_limit` pages.
pub async fn export_entity(
    api: &dyn SupersetApi,
    config: &Config,
    token: &str,
    entity: EntityKind,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary {
        entity,
        pages: 0,
        written: 0,
        skipped_wip: 0,
    };

    for page in 0..config.page_limit {
        let results = api
            .fetch_entities(token, entity, page, config.page_size)
            .await?;
        summary.pages += 1;

        if results.is_empty() {
            debug!("{}: page {} is empty, collection exhausted", entity, page);
            break;
        }
        debug!("{}: page {} returned {} record(s)", entity, page, results.len());

        for item in &results {
            if is_work_in_progress(item) {
                debug!("{}: skipping work-in-progress record {}", entity, item["id"]);
                summary.skipped_wip += 1;
                continue;
            }
            let path = write_record(&config.export_dir, entity, item)?;
            debug!("Wrote {}", path.display());
            summary.written += 1;
        }
    }

    info!(
        "Exported {} {} record(s) ({} skipped as WIP, {} page request(s))",
        summary.written, entity, summary.skipped_wip, summary.pages
    );
    Ok(summary)
}

/// Export dashboards, charts and datasets, in that order
pub async fn export_all(api: &dyn SupersetApi, config: &Config) -> Result<Vec<ExportSummary>> {
    fs::create_dir_all(&config.export_dir).with_context(|| {
        format!(
            "Failed to create export directory: {}",
            config.export_dir.display()
        )
    })?;

    let token = api.login().await.context("Authentication failed")?;

    let mut summaries = Vec::with_capacity(EntityKind::EXPORT_ORDER.len());
    for entity in EntityKind::EXPORT_ORDER {
        summaries.push(export_entity(api, config, &token, entity).await?);
    }
    Ok(summaries)
}
