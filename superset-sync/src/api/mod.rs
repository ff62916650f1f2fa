//! Superset REST API client
//!
//! Covers the handful of endpoints the sync procedures rely on: login,
//! CSRF token issue, paginated collection listing, filtered lookups and
//! record creation.

pub mod client;
pub mod models;
pub mod query;

#[cfg(test)]
pub mod testing;

pub use client::{SupersetApi, SupersetClient};
pub use models::EntityKind;
pub use query::Filter;
