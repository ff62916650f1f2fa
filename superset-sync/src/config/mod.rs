//! Runtime configuration resolved from the process environment
//!
//! Both the export and the import procedure receive the same [`Config`],
//! built once at startup. Required variables are validated up front so a
//! missing value fails immediately instead of surfacing later as a malformed
//! URL or a filesystem error.

use anyhow::{Result, bail};
use std::path::PathBuf;

pub const SOURCE_URL_VAR: &str = "SOURCE_SUPERSET_API_URL";
pub const TARGET_URL_VAR: &str = "TARGET_SUPERSET_API_URL";
pub const USERNAME_VAR: &str = "SUPERSET_USERNAME";
pub const PASSWORD_VAR: &str = "SUPERSET_PASSWORD";
pub const PROVIDER_VAR: &str = "SUPERSET_AUTH_PROVIDER";
pub const EXPORT_FOLDER_VAR: &str = "EXPORT_FOLDER";

/// Records requested per page when listing a collection
pub const PAGE_SIZE: u32 = 25;
/// Hard cap on pages fetched per collection
pub const PAGE_LIMIT: u32 = 1000;
/// Uniqueness checks allowed before giving up on a dashboard slug
pub const MAX_SLUG_ATTEMPTS: u32 = 10;

const DEFAULT_PROVIDER: &str = "db";

/// Login credentials for `/security/login`
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Authentication provider, `db` unless overridden
    pub provider: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the instance entities are exported from (e.g. `https://host/api/v1`)
    pub source_url: String,
    /// Base URL imports are replayed against. Falls back to `source_url`.
    pub target_url: String,
    pub credentials: Credentials,
    /// Directory holding one `{entity}_{id}.json` file per record
    pub export_dir: PathBuf,
    pub page_size: u32,
    pub page_limit: u32,
    pub max_slug_attempts: u32,
}

impl Config {
    /// Build the configuration from `std::env`
    ///
    /// Call after the dotenv file has been loaded.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let found = value(key);
            if found.is_none() {
                missing.push(key);
            }
            found.unwrap_or_default()
        };

        let source_url = require(SOURCE_URL_VAR);
        let username = require(USERNAME_VAR);
        let password = require(PASSWORD_VAR);
        let export_dir = require(EXPORT_FOLDER_VAR);

        if !missing.is_empty() {
            bail!(
                "Missing required environment variable(s): {}",
                missing.join(", ")
            );
        }

        let source_url = normalize_base_url(&source_url);
        let target_url = value(TARGET_URL_VAR)
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| source_url.clone());
        let provider = value(PROVIDER_VAR).unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        Ok(Self {
            source_url,
            target_url,
            credentials: Credentials {
                username,
                password,
                provider,
            },
            export_dir: PathBuf::from(export_dir),
            page_size: PAGE_SIZE,
            page_limit: PAGE_LIMIT,
            max_slug_attempts: MAX_SLUG_ATTEMPTS,
        })
    }
}

/// Strip trailing slashes so endpoint paths can be appended with `/`
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
