//! Superset REST client
//!
//! [`SupersetApi`] is the seam the export and import procedures talk to;
//! [`SupersetClient`] is the reqwest-backed implementation used at runtime.
//! Every call is a single request with no retry: a non-2xx response is
//! turned into an error carrying the method, URL, status and body.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::Value;

use super::models::{
    CsrfResponse, CsrfSession, EntityKind, ListResponse, LoginRequest, LoginResponse, cookie_pair,
};
use super::query::{Filter, page_query};
use crate::config::Credentials;

/// Operations the sync procedures need from a Superset instance
#[async_trait]
pub trait SupersetApi: Send + Sync {
    /// Exchange credentials for a bearer token (`POST /security/login`)
    async fn login(&self) -> Result<String>;

    /// One page of a collection (`GET /{entity}?q=(page:P,page_size:S)`)
    async fn fetch_entities(
        &self,
        token: &str,
        entity: EntityKind,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Value>>;

    /// CSRF token and the cookies that must accompany it
    async fn csrf_session(&self, token: &str) -> Result<CsrfSession>;

    /// Number of records in `entity` matching `filter`
    async fn count_matching(&self, token: &str, entity: EntityKind, filter: &Filter)
    -> Result<usize>;

    /// Create a record (`POST /{entity}/`), returning the decoded response body
    async fn create(
        &self,
        token: &str,
        session: &CsrfSession,
        entity: EntityKind,
        body: &Value,
    ) -> Result<Value>;
}

/// HTTP client bound to one Superset instance
pub struct SupersetClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl SupersetClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pass successful responses through, turn anything else into an error
async fn ensure_success(
    response: reqwest::Response,
    method: &str,
    url: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("{} {} failed with status {}: {}", method, url, status, body)
}

#[async_trait]
impl SupersetApi for SupersetClient {
    async fn login(&self) -> Result<String> {
        let url = self.url("/security/login");
        debug!("POST {}", url);

        let request = LoginRequest {
            username: &self.credentials.username,
            password: &self.credentials.password,
            provider: &self.credentials.provider,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send login request to {}", url))?;
        let response = ensure_success(response, "POST", &url).await?;

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;
        Ok(login.access_token)
    }

    async fn fetch_entities(
        &self,
        token: &str,
        entity: EntityKind,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Value>> {
        let url = self.url(&format!("/{}?q={}", entity, page_query(page, page_size)));
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {} page {}", entity, page))?;
        let response = ensure_success(response, "GET", &url).await?;

        let list: ListResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} page {}", entity, page))?;
        Ok(list.result)
    }

    async fn csrf_session(&self, token: &str) -> Result<CsrfSession> {
        let url = self.url("/security/csrf_token/");
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to request CSRF token")?;
        let response = ensure_success(response, "GET", &url).await?;

        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(cookie_pair)
            .collect();

        let csrf: CsrfResponse = response
            .json()
            .await
            .context("Failed to parse CSRF token response")?;

        debug!("Received CSRF token with {} cookie(s)", cookies.len());
        Ok(CsrfSession::new(csrf.result, cookies))
    }

    async fn count_matching(
        &self,
        token: &str,
        entity: EntityKind,
        filter: &Filter,
    ) -> Result<usize> {
        let url = self.url(&format!("/{}/?q={}", entity, filter.to_query_param()?));
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Failed to query {} by {}", entity, filter.col))?;
        let response = ensure_success(response, "GET", &url).await?;

        let list: ListResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} query response", entity))?;
        Ok(list.result.len())
    }

    async fn create(
        &self,
        token: &str,
        session: &CsrfSession,
        entity: EntityKind,
        body: &Value,
    ) -> Result<Value> {
        let url = self.url(&format!("/{}/", entity));
        debug!("POST {}", url);

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("X-CSRFToken", &session.token)
            .json(body);
        if let Some(cookies) = session.cookie_header() {
            request = request.header(COOKIE, cookies);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to submit {}", entity))?;
        let response = ensure_success(response, "POST", &url).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} creation response", entity))
    }
}
