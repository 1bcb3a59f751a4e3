//! In-process remote store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::RemoteStore;
use crate::entity::{ListQuery, Record};
use crate::error::RemoteError;
use crate::sort::sort_records;

#[derive(Debug, Default)]
pub struct MemoryRemote {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    next_uuid: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a 503.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    fn enter(&self) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

fn matches(row: &Record, column: &str, value: &str) -> bool {
    match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(other) => other.to_string() == value,
        None => false,
    }
}

impl RemoteStore for MemoryRemote {
    async fn select(&self, table: &str, query: &ListQuery) -> Result<Vec<Record>, RemoteError> {
        self.enter()?;
        let mut rows = self.rows(table);
        if let Some(order) = &query.order {
            sort_records(&mut rows, order);
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, records: Vec<Record>) -> Result<Vec<Record>, RemoteError> {
        self.enter()?;
        let mut inserted = Vec::new();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        for mut record in records {
            if !record.contains_key("id") {
                let n = self.next_uuid.fetch_add(1, Ordering::SeqCst) + 1;
                record.insert(
                    "id".into(),
                    Value::String(format!("00000000-0000-4000-8000-{:012}", n)),
                );
            }
            rows.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        patch: Record,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>, RemoteError> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| matches(r, column, value)) {
                for (k, v) in &patch {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, column: &str, value: &str) -> Result<(), RemoteError> {
        self.enter()?;
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|r| !matches(r, column, value));
        }
        Ok(())
    }
}
