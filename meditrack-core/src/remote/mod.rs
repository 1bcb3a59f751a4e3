//! Remote table store.
//!
//! The remote store is a hosted table service speaking the PostgREST
//! dialect: one table per entity kind, rows as JSON objects, equality
//! filters and single-column ordering.

mod rest;

#[cfg(test)]
pub(crate) mod memory;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{ListQuery, Record};
use crate::error::RemoteError;

pub use rest::RestClient;

/// Connection settings for the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl RemoteSettings {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            api_key: Some(api_key.into()),
        }
    }

    /// Both the endpoint and the key are present and non-blank.
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.url) && present(&self.api_key)
    }
}

/// Operations the sync layer needs from a remote table store.
#[allow(async_fn_in_trait)]
pub trait RemoteStore: Send + Sync {
    /// All rows of `table`, ordered and limited per `query`.
    async fn select(&self, table: &str, query: &ListQuery) -> Result<Vec<Record>, RemoteError>;

    /// Inserts rows and returns them as stored.
    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<Vec<Record>, RemoteError>;

    /// Applies `patch` to rows where `column` equals `value`; returns the
    /// rows as stored after the update.
    async fn update(
        &self,
        table: &str,
        patch: Record,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>, RemoteError>;

    /// Deletes rows where `column` equals `value`. Matching nothing is not
    /// an error.
    async fn delete(&self, table: &str, column: &str, value: &str) -> Result<(), RemoteError>;
}

impl<R: RemoteStore> RemoteStore for Arc<R> {
    async fn select(&self, table: &str, query: &ListQuery) -> Result<Vec<Record>, RemoteError> {
        (**self).select(table, query).await
    }

    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<Vec<Record>, RemoteError> {
        (**self).insert(table, records).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Record,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>, RemoteError> {
        (**self).update(table, patch, column, value).await
    }

    async fn delete(&self, table: &str, column: &str, value: &str) -> Result<(), RemoteError> {
        (**self).delete(table, column, value).await
    }
}
