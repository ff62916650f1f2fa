//! Dashboard slug uniqueness

use anyhow::{Result, bail};
use log::debug;
use uuid::Uuid;

use crate::api::{EntityKind, Filter, SupersetApi};

/// `default-slug-{uuid v4}`
pub fn default_slug() -> String {
    format!("default-slug-{}", Uuid::new_v4())
}

/// Whether no dashboard on the target uses `slug`
pub async fn is_slug_unique(api: &dyn SupersetApi, token: &str, slug: &str) -> Result<bool> {
    let matches = api
        .count_matching(token, EntityKind::Dashboard, &Filter::eq("slug", slug))
        .await?;
    Ok(matches == 0)
}

/// Pick a slug that no dashboard on the target uses yet
///
/// Starts from `existing` (or a generated one) and draws from `next_slug`
/// until the target reports no match. At most `max_attempts` candidates are
/// checked. The check and the later create are separate requests, so this
/// only holds while nothing else creates dashboards in between.
pub async fn resolve_unique_slug<F>(
    api: &dyn SupersetApi,
    token: &str,
    existing: Option<String>,
    max_attempts: u32,
    mut next_slug: F,
) -> Result<String>
where
    F: FnMut() -> String + Send,
{
    let mut candidate = existing.unwrap_or_else(&mut next_slug);

    for attempt in 1..=max_attempts {
        if is_slug_unique(api, token, &candidate).await? {
            return Ok(candidate);
        }
        debug!("Slug '{}' already in use (attempt {})", candidate, attempt);
        candidate = next_slug();
    }

    bail!(
        "Could not find an unused dashboard slug after {} attempts",
        max_attempts
    )
}
