//! Per-entity normalization of exported records into creation payloads
//!
//! Exported records carry read-only fields and expanded relations that the
//! creation endpoints reject. Each entity type projects its own allow-list
//! and flattens related objects (`owners`, `dashboards`, `roles`) to bare IDs.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};

use super::slug::{default_slug, resolve_unique_slug};
use crate::api::SupersetApi;

const CHART_FIELDS: &[&str] = &[
    "cache_timeout",
    "certification_details",
    "certified_by",
    "datasource_id",
    "datasource_type",
    "description",
    "external_url",
    "is_managed_externally",
    "params",
    "query_context",
    "query_context_generation",
    "slice_name",
    "viz_type",
];

/// Field of `data`, or null when absent
fn field(data: &Value, key: &str) -> Value {
    data.get(key).cloned().unwrap_or(Value::Null)
}

/// Field of `data`, or `default` when absent or null
fn field_or_default(data: &Value, key: &str, default: Value) -> Value {
    match data.get(key) {
        Some(Value::Null) | None => default,
        Some(value) => value.clone(),
    }
}

/// Field of `data`, or `default` only when the key is absent
fn field_or_missing(data: &Value, key: &str, default: Value) -> Value {
    data.get(key).cloned().unwrap_or(default)
}

/// Flatten a list of related objects to their `id` values
///
/// An absent or null relation yields an empty list.
pub fn related_ids(data: &Value, key: &str) -> Result<Value> {
    let items = match data.get(key) {
        None | Some(Value::Null) => return Ok(Value::Array(Vec::new())),
        Some(Value::Array(items)) => items,
        Some(other) => bail!("Expected '{}' to be a list, found {}", key, other),
    };

    let ids = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.get("id")
                .cloned()
                .with_context(|| format!("Entry {} of '{}' has no id", i, key))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(ids))
}

/// Creation payload for `POST /chart/`
pub fn simplify_chart_data(data: &Value) -> Result<Value> {
    let mut out = Map::new();
    for key in CHART_FIELDS {
        out.insert(key.to_string(), field(data, key));
    }
    out.insert("dashboards".into(), related_ids(data, "dashboards")?);
    out.insert("owners".into(), related_ids(data, "owners")?);
    out.insert("datasource_name".into(), field(data, "datasource_name_text"));
    Ok(Value::Object(out))
}

/// Dashboard payload with `slug` already decided
pub fn dashboard_payload(data: &Value, slug: String) -> Result<Value> {
    Ok(json!({
        "certification_details": field_or_default(
            data,
            "certification_details",
            json!("No certification details provided"),
        ),
        "certified_by": field_or_default(data, "certified_by", json!("Not certified")),
        "css": field_or_default(data, "css", json!("/* Default CSS */")),
        "dashboard_title": field_or_default(data, "dashboard_title", json!("Untitled Dashboard")),
        "external_url": field_or_default(data, "external_url", json!("http://example.com")),
        "is_managed_externally": field_or_default(data, "is_managed_externally", json!(false)),
        "json_metadata": field_or_default(data, "json_metadata", json!("{}")),
        "owners": related_ids(data, "owners")?,
        "position_json": field_or_default(data, "position_json", json!("{}")),
        "published": field_or_default(data, "published", json!(false)),
        "roles": related_ids(data, "roles")?,
        "slug": slug,
    }))
}

/// Creation payload for `POST /dashboard/`, with a slug unused on the target
pub async fn simplify_dashboard_data(
    api: &dyn SupersetApi,
    token: &str,
    data: &Value,
    max_attempts: u32,
) -> Result<Value> {
    simplify_dashboard_data_with(api, token, data, max_attempts, default_slug).await
}

/// [`simplify_dashboard_data`] with a caller-supplied slug generator
pub async fn simplify_dashboard_data_with<F>(
    api: &dyn SupersetApi,
    token: &str,
    data: &Value,
    max_attempts: u32,
    next_slug: F,
) -> Result<Value>
where
    F: FnMut() -> String + Send,
{
    let existing = match data.get("slug") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    let slug = resolve_unique_slug(api, token, existing, max_attempts, next_slug).await?;
    dashboard_payload(data, slug)
}

/// Creation payload for `POST /dataset/`
pub fn simplify_dataset_data(data: &Value) -> Result<Value> {
    let database = data
        .get("database")
        .and_then(|db| db.get("id"))
        .cloned()
        .context("Dataset record has no database.id")?;

    Ok(json!({
        "database": database,
        "external_url": field_or_missing(data, "external_url", json!("")),
        "is_managed_externally": field_or_missing(data, "is_managed_externally", json!(false)),
        "owners": related_ids(data, "owners")?,
        "schema": field_or_missing(data, "schema", json!("")),
        "sql": field_or_missing(data, "sql", json!("")),
        "table_name": field_or_missing(data, "table_name", json!("")),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeSuperset;

    #[test]
    fn test_chart_projection() {
        let raw = json!({
            "id": 42,
            "slice_name": "Revenue",
            "viz_type": "table",
            "datasource_name_text": "public.orders",
            "dashboards": [{"id": 5, "dashboard_title": "Sales"}],
            "owners": [{"id": 1, "first_name": "Ada"}, {"id": 2}],
            "changed_on_delta_humanized": "2 days ago",
            "thumbnail_url": "/api/v1/chart/42/thumbnail/",
        });

        let chart = simplify_chart_data(&raw).unwrap();

        assert_eq!(chart["dashboards"], json!([5]));
        assert_eq!(chart["owners"], json!([1, 2]));
        assert_eq!(chart["datasource_name"], json!("public.orders"));
        assert_eq!(chart["slice_name"], json!("Revenue"));
        assert_eq!(chart["cache_timeout"], Value::Null);
        assert!(chart.get("id").is_none());
        assert!(chart.get("thumbnail_url").is_none());
        assert!(chart.get("changed_on_delta_humanized").is_none());
        assert!(chart.get("datasource_name_text").is_none());
        assert_eq!(chart.as_object().unwrap().len(), 16);
    }

    #[test]
    fn test_related_ids_requires_id() {
        let err = related_ids(&json!({"owners": [{"id": 1}, {"name": "x"}]}), "owners")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Entry 1 of 'owners' has no id"));
    }

    #[test]
    fn test_related_ids_absent_or_null() {
        assert_eq!(related_ids(&json!({}), "roles").unwrap(), json!([]));
        assert_eq!(related_ids(&json!({"roles": null}), "roles").unwrap(), json!([]));
    }

    #[test]
    fn test_dashboard_defaults() {
        let dashboard = dashboard_payload(&json!({"published": null}), "s".into()).unwrap();

        assert_eq!(dashboard["dashboard_title"], json!("Untitled Dashboard"));
        assert_eq!(
            dashboard["certification_details"],
            json!("No certification details provided")
        );
        assert_eq!(dashboard["certified_by"], json!("Not certified"));
        assert_eq!(dashboard["css"], json!("/* Default CSS */"));
        assert_eq!(dashboard["external_url"], json!("http://example.com"));
        assert_eq!(dashboard["json_metadata"], json!("{}"));
        assert_eq!(dashboard["position_json"], json!("{}"));
        assert_eq!(dashboard["published"], json!(false));
        assert_eq!(dashboard["is_managed_externally"], json!(false));
        assert_eq!(dashboard["owners"], json!([]));
        assert_eq!(dashboard["roles"], json!([]));
        assert_eq!(dashboard["slug"], json!("s"));
    }

    #[test]
    fn test_dashboard_keeps_present_values() {
        let raw = json!({
            "dashboard_title": "Ops",
            "published": true,
            "owners": [{"id": 3}],
            "roles": [{"id": 9}],
            "css": ".x {}",
        });
        let dashboard = dashboard_payload(&raw, "ops".into()).unwrap();

        assert_eq!(dashboard["dashboard_title"], json!("Ops"));
        assert_eq!(dashboard["published"], json!(true));
        assert_eq!(dashboard["owners"], json!([3]));
        assert_eq!(dashboard["roles"], json!([9]));
        assert_eq!(dashboard["css"], json!(".x {}"));
    }

    #[tokio::test]
    async fn test_dashboard_generated_slug_retries_until_unique() {
        let api = FakeSuperset::new().with_taken_slugs(&["candidate-1", "candidate-2"]);
        let mut n = 0;
        let generator = move || {
            n += 1;
            format!("candidate-{}", n)
        };

        let dashboard = simplify_dashboard_data_with(&api, "t", &json!({}), 10, generator)
            .await
            .unwrap();

        assert_eq!(dashboard["slug"], json!("candidate-3"));
    }

    #[tokio::test]
    async fn test_dashboard_existing_slug_kept_when_free() {
        let api = FakeSuperset::new();
        let dashboard = simplify_dashboard_data(&api, "t", &json!({"slug": "sales"}), 10)
            .await
            .unwrap();

        assert_eq!(dashboard["slug"], json!("sales"));
    }

    #[tokio::test]
    async fn test_dashboard_taken_slug_replaced_by_default() {
        let api = FakeSuperset::new().with_taken_slugs(&["sales"]);
        let dashboard = simplify_dashboard_data(&api, "t", &json!({"slug": "sales"}), 10)
            .await
            .unwrap();

        let slug = dashboard["slug"].as_str().unwrap();
        assert!(slug.starts_with("default-slug-"));
    }

    #[test]
    fn test_dataset_projection() {
        let raw = json!({
            "id": 11,
            "table_name": "orders",
            "schema": "public",
            "sql": null,
            "database": {"id": 2, "database_name": "warehouse"},
            "owners": [{"id": 1}],
            "columns": [{"column_name": "amount"}],
        });

        let dataset = simplify_dataset_data(&raw).unwrap();

        assert_eq!(dataset["database"], json!(2));
        assert_eq!(dataset["table_name"], json!("orders"));
        assert_eq!(dataset["schema"], json!("public"));
        assert_eq!(dataset["sql"], Value::Null);
        assert_eq!(dataset["external_url"], json!(""));
        assert_eq!(dataset["is_managed_externally"], json!(false));
        assert_eq!(dataset["owners"], json!([1]));
        assert!(dataset.get("columns").is_none());
    }

    #[test]
    fn test_dataset_requires_database_id() {
        let err = simplify_dataset_data(&json!({"table_name": "orders"}))
            .unwrap_err()
            .to_string();
        assert!(err.contains("database.id"));
    }
}
