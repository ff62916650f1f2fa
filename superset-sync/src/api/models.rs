//! Superset REST API models

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The entity types that are exported and imported
///
/// The lowercase name doubles as the REST collection path segment
/// and as the filename prefix of exported records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Dashboard,
    Chart,
    Dataset,
}

impl EntityKind {
    /// Fixed order in which collections are exported
    pub const EXPORT_ORDER: [EntityKind; 3] =
        [EntityKind::Dashboard, EntityKind::Chart, EntityKind::Dataset];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Dashboard => "dashboard",
            EntityKind::Chart => "chart",
            EntityKind::Dataset => "dataset",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dashboard" => Ok(EntityKind::Dashboard),
            "chart" => Ok(EntityKind::Chart),
            "dataset" => Ok(EntityKind::Dataset),
            other => bail!(
                "Unknown entity type: '{}' (expected one of: dashboard, chart, dataset)",
                other
            ),
        }
    }
}

/// Body of `POST /security/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub provider: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Generic list envelope returned by collection endpoints
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub result: Vec<Value>,
}

/// `GET /security/csrf_token/` response
#[derive(Debug, Deserialize)]
pub struct CsrfResponse {
    pub result: String,
}

/// A CSRF token together with the session cookies issued alongside it
///
/// The server only accepts the token when it comes back with the cookies
/// from the same response, so the two are never stored apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrfSession {
    pub token: String,
    /// `name=value` pairs taken from the `Set-Cookie` headers
    pub cookies: Vec<String>,
}

impl CsrfSession {
    pub fn new(token: impl Into<String>, cookies: Vec<String>) -> Self {
        Self {
            token: token.into(),
            cookies,
        }
    }

    /// Value for a `Cookie` request header, if any cookies were issued
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            None
        } else {
            Some(self.cookies.join("; "))
        }
    }
}

/// Reduce a `Set-Cookie` header value to its `name=value` pair
pub fn cookie_pair(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    if pair.is_empty() || !pair.contains('=') {
        return None;
    }
    Some(pair.to_string())
}
