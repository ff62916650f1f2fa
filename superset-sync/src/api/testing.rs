//! In-memory [`SupersetApi`] used by unit tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::client::SupersetApi;
use super::models::{CsrfSession, EntityKind};
use super::query::Filter;

/// Every request the fake has served, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login,
    FetchPage { entity: EntityKind, page: u32 },
    Csrf,
    Count { entity: EntityKind, col: String, value: Value },
    Create { entity: EntityKind, body: Value },
}

#[derive(Default)]
struct State {
    collections: HashMap<EntityKind, Vec<Value>>,
    taken_slugs: HashSet<String>,
    calls: Vec<Call>,
    next_id: i64,
}

/// Fake Superset instance backed by in-memory collections
///
/// Created records are appended to their collection, so existence checks
/// see them on later calls.
#[derive(Default)]
pub struct FakeSuperset {
    state: Mutex<State>,
}

impl FakeSuperset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, entity: EntityKind, records: Vec<Value>) -> Self {
        self.state
            .lock()
            .unwrap()
            .collections
            .insert(entity, records);
        self
    }

    /// Mark slugs as already used on the target
    pub fn with_taken_slugs(self, slugs: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .taken_slugs
            .extend(slugs.iter().map(|s| s.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn page_requests(&self, entity: EntityKind) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::FetchPage { entity: e, .. } if *e == entity))
            .count()
    }

    pub fn created(&self) -> Vec<(EntityKind, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { entity, body } => Some((entity, body)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SupersetApi for FakeSuperset {
    async fn login(&self) -> Result<String> {
        self.state.lock().unwrap().calls.push(Call::Login);
        Ok("access-token".to_string())
    }

    async fn fetch_entities(
        &self,
        token: &str,
        entity: EntityKind,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Value>> {
        if token.is_empty() {
            bail!("GET /{} failed with status 401 Unauthorized", entity);
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::FetchPage { entity, page });

        let records = state.collections.get(&entity).cloned().unwrap_or_default();
        let start = (page * page_size) as usize;
        Ok(records
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn csrf_session(&self, _token: &str) -> Result<CsrfSession> {
        self.state.lock().unwrap().calls.push(Call::Csrf);
        Ok(CsrfSession::new("csrf-token", vec!["session=fake".to_string()]))
    }

    async fn count_matching(
        &self,
        _token: &str,
        entity: EntityKind,
        filter: &Filter,
    ) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Count {
            entity,
            col: filter.col.clone(),
            value: filter.value.clone(),
        });

        let mut count = state
            .collections
            .get(&entity)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.get(&filter.col) == Some(&filter.value))
                    .count()
            })
            .unwrap_or(0);

        if entity == EntityKind::Dashboard && filter.col == "slug" {
            if let Some(slug) = filter.value.as_str() {
                if state.taken_slugs.contains(slug) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn create(
        &self,
        _token: &str,
        session: &CsrfSession,
        entity: EntityKind,
        body: &Value,
    ) -> Result<Value> {
        if session.token.is_empty() {
            bail!("POST /{}/ failed with status 400 Bad Request: CSRF token missing", entity);
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            entity,
            body: body.clone(),
        });

        state.next_id += 1;
        let id = state.next_id;
        let mut stored = body.clone();
        if let Some(obj) = stored.as_object_mut() {
            obj.insert("id".to_string(), json!(id));
        }
        state.collections.entry(entity).or_default().push(stored);

        Ok(json!({"id": id, "result": body}))
    }
}
