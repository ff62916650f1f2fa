//! Query-string encoders for the `q` parameter
//!
//! Collection pages are requested with the rison form `(page:P,page_size:S)`,
//! exact-match lookups with a URL-encoded JSON filter document.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Rison-encoded pagination argument
pub fn page_query(page: u32, page_size: u32) -> String {
    format!("(page:{},page_size:{})", page, page_size)
}

/// A single column filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub col: String,
    pub opr: String,
    pub value: Value,
}

impl Filter {
    /// Exact match on `col`
    pub fn eq(col: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            col: col.into(),
            opr: "eq".to_string(),
            value: value.into(),
        }
    }

    /// URL-encoded `{"filters":[...]}` document for the `q` parameter
    pub fn to_query_param(&self) -> Result<String> {
        let query = FilterQuery {
            filters: std::slice::from_ref(self),
        };
        let json = serde_json::to_string(&query).context("Failed to serialize filter query")?;
        Ok(urlencoding::encode(&json).into_owned())
    }
}

#[derive(Serialize)]
struct FilterQuery<'a> {
    filters: &'a [Filter],
}
