//! SQLite-backed row storage for the development remote store.
//!
//! Every table shares one SQL table. Rows are kept as JSON documents keyed by
//! `(tbl, id)`:
//! ```text
//! records
//!   tbl   TEXT   -- patients, doctors, appointments, test_reports
//!   id    TEXT
//!   body  TEXT   -- the row as a JSON object, including its id
//! ```

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use meditrack_core::{EntityKind, Record};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

/// Errors from the record store.
#[derive(Debug)]
pub enum RecordStoreError {
    /// Underlying database failure.
    Database(sqlx::Error),
    /// Migration failure while opening the store.
    Migrate(sqlx::migrate::MigrateError),
    /// A row with this id already exists in the table.
    Duplicate(String),
    /// Column names may only contain ASCII letters, digits and underscores.
    InvalidColumn(String),
    /// A stored or submitted row is not a JSON object.
    InvalidRecord(String),
}

impl std::fmt::Display for RecordStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStoreError::Database(e) => write!(f, "Database error: {}", e),
            RecordStoreError::Migrate(e) => write!(f, "Migration error: {}", e),
            RecordStoreError::Duplicate(id) => {
                write!(f, "duplicate key value violates unique constraint: id {}", id)
            }
            RecordStoreError::InvalidColumn(c) => write!(f, "Invalid column name: {}", c),
            RecordStoreError::InvalidRecord(e) => write!(f, "Invalid record: {}", e),
        }
    }
}

impl std::error::Error for RecordStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordStoreError::Database(e) => Some(e),
            RecordStoreError::Migrate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RecordStoreError {
    fn from(e: sqlx::Error) -> Self {
        RecordStoreError::Database(e)
    }
}

impl From<sqlx::migrate::MigrateError> for RecordStoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        RecordStoreError::Migrate(e)
    }
}

/// Returns true for the tables the server exposes.
pub fn is_known_table(table: &str) -> bool {
    EntityKind::ALL.iter().any(|kind| kind.table() == table)
}

fn json_path(column: &str) -> Result<String, RecordStoreError> {
    if column.is_empty()
        || !column
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(RecordStoreError::InvalidColumn(column.to_string()));
    }
    Ok(format!("$.{}", column))
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    body: String,
}

impl RecordRow {
    fn into_record(self) -> Result<Record, RecordStoreError> {
        match serde_json::from_str(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(RecordStoreError::InvalidRecord(format!(
                "row {} is not an object",
                self.id
            ))),
            Err(e) => Err(RecordStoreError::InvalidRecord(format!("row {}: {}", self.id, e))),
        }
    }
}

/// Row storage shared by all request handlers.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Opens (creating if needed) the database at `path` and runs migrations.
    pub async fn open(path: &Path) -> Result<Self, RecordStoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecordStoreError::Database(sqlx::Error::Io(e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    /// A private in-memory database, for tests.
    pub async fn in_memory() -> Result<Self, RecordStoreError> {
        // Each in-memory connection is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, RecordStoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Rows of `table` ordered by `order` (column, ascending) with nulls
    /// last, then by insertion.
    pub async fn select(
        &self,
        table: &str,
        order: Option<(&str, bool)>,
        limit: Option<i64>,
    ) -> Result<Vec<Record>, RecordStoreError> {
        let limit = limit.unwrap_or(-1);

        let rows: Vec<RecordRow> = match order {
            Some((column, ascending)) => {
                let path = json_path(column)?;
                let direction = if ascending { "ASC" } else { "DESC" };
                let sql = format!(
                    "SELECT id, body FROM records WHERE tbl = ? \
                     ORDER BY json_extract(body, ?) IS NULL, json_extract(body, ?) {}, rowid \
                     LIMIT ?",
                    direction
                );
                sqlx::query_as(&sql)
                    .bind(table)
                    .bind(&path)
                    .bind(&path)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT id, body FROM records WHERE tbl = ? ORDER BY rowid LIMIT ?")
                    .bind(table)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    /// Inserts rows in one transaction. Rows without an id get a UUID;
    /// missing timestamps are filled in.
    pub async fn insert(
        &self,
        table: &str,
        rows: Vec<Record>,
    ) -> Result<Vec<Record>, RecordStoreError> {
        let now = Value::String(Utc::now().to_rfc3339());
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(rows.len());

        for mut row in rows {
            let id = match row.get("id") {
                Some(Value::String(id)) if !id.is_empty() => id.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => Uuid::new_v4().to_string(),
            };
            row.insert("id".into(), Value::String(id.clone()));
            for column in ["created_at", "updated_at"] {
                if row.get(column).map_or(true, Value::is_null) {
                    row.insert(column.into(), now.clone());
                }
            }

            let body = Value::Object(row.clone()).to_string();
            let result = sqlx::query("INSERT INTO records (tbl, id, body) VALUES (?, ?, ?)")
                .bind(table)
                .bind(&id)
                .bind(&body)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => inserted.push(row),
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    return Err(RecordStoreError::Duplicate(id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Merges `patch` into rows whose `column` equals `value` (compared as
    /// text) and returns the updated rows. The id of a row never changes.
    pub async fn update(
        &self,
        table: &str,
        mut patch: Record,
        column: &str,
        value: &str,
    ) -> Result<Vec<Record>, RecordStoreError> {
        patch.remove("id");
        let path = json_path(column)?;
        let mut tx = self.pool.begin().await?;

        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, body FROM records \
             WHERE tbl = ? AND CAST(json_extract(body, ?) AS TEXT) = ? ORDER BY rowid",
        )
        .bind(table)
        .bind(&path)
        .bind(value)
        .fetch_all(&mut *tx)
        .await?;

        let mut updated = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            let mut record = row.into_record()?;
            for (key, value) in &patch {
                record.insert(key.clone(), value.clone());
            }

            sqlx::query("UPDATE records SET body = ? WHERE tbl = ? AND id = ?")
                .bind(Value::Object(record.clone()).to_string())
                .bind(table)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            updated.push(record);
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes rows whose `column` equals `value`; returns how many went.
    pub async fn delete(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<u64, RecordStoreError> {
        let path = json_path(column)?;
        let result = sqlx::query(
            "DELETE FROM records WHERE tbl = ? AND CAST(json_extract(body, ?) AS TEXT) = ?",
        )
        .bind(table)
        .bind(&path)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn row(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn ids(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_known_tables() {
        assert!(is_known_table("test_reports"));
        assert!(is_known_table("doctors"));
        assert!(!is_known_table("records"));
        assert!(!is_known_table("users"));
    }

    #[test]
    fn test_json_path_rejects_odd_columns() {
        assert_eq!(json_path("created_at").unwrap(), "$.created_at");
        assert!(json_path("a.b").is_err());
        assert!(json_path("x' OR 1=1").is_err());
        assert!(json_path("").is_err());
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("remote.db");

        let store = RecordStore::open(&path).await.unwrap();
        store
            .insert("patients", vec![row(json!({"id": "P001", "name": "A"}))])
            .await
            .unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_insert_fills_id_and_timestamps() {
        let store = RecordStore::in_memory().await.unwrap();
        let inserted = store
            .insert(
                "doctors",
                vec![row(json!({"first_name": "Ada", "last_name": "King"}))],
            )
            .await
            .unwrap();

        let id = inserted[0]["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(inserted[0]["created_at"].is_string());
        assert!(inserted[0]["updated_at"].is_string());

        let rows = store.select("doctors", None, None).await.unwrap();
        assert_eq!(rows, inserted);
    }

    #[tokio::test]
    async fn test_insert_keeps_supplied_values() {
        let store = RecordStore::in_memory().await.unwrap();
        let inserted = store
            .insert(
                "patients",
                vec![row(json!({"id": "P001", "created_at": "2024-01-01T00:00:00Z"}))],
            )
            .await
            .unwrap();
        assert_eq!(inserted[0]["id"], "P001");
        assert_eq!(inserted[0]["created_at"], "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected_atomically() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert("patients", vec![row(json!({"id": "P001"}))])
            .await
            .unwrap();

        let err = store
            .insert(
                "patients",
                vec![row(json!({"id": "P002"})), row(json!({"id": "P001"}))],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RecordStoreError::Duplicate(ref id) if id == "P001"));

        let rows = store.select("patients", None, None).await.unwrap();
        assert_eq!(ids(&rows), ["P001"]);
    }

    #[tokio::test]
    async fn test_same_id_in_different_tables() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert("patients", vec![row(json!({"id": "X1"}))])
            .await
            .unwrap();
        store
            .insert("doctors", vec![row(json!({"id": "X1"}))])
            .await
            .unwrap();

        assert_eq!(store.select("patients", None, None).await.unwrap().len(), 1);
        assert_eq!(store.select("doctors", None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_select_orders_with_nulls_last_and_limits() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert(
                "test_reports",
                vec![
                    row(json!({"id": "R1", "test_date": "2024-01-14"})),
                    row(json!({"id": "R2", "test_date": null})),
                    row(json!({"id": "R3", "test_date": "2024-01-15"})),
                    row(json!({"id": "R4", "test_date": "2024-01-13"})),
                ],
            )
            .await
            .unwrap();

        let desc = store
            .select("test_reports", Some(("test_date", false)), None)
            .await
            .unwrap();
        assert_eq!(ids(&desc), ["R3", "R1", "R4", "R2"]);

        let asc = store
            .select("test_reports", Some(("test_date", true)), Some(2))
            .await
            .unwrap();
        assert_eq!(ids(&asc), ["R4", "R1"]);
    }

    #[tokio::test]
    async fn test_update_merges_and_returns_rows() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert(
                "patients",
                vec![
                    row(json!({"id": "P001", "name": "John", "age": 45})),
                    row(json!({"id": "P002", "name": "Emily", "age": 28})),
                ],
            )
            .await
            .unwrap();

        let updated = store
            .update(
                "patients",
                row(json!({"id": "HIJACK", "name": "Johnny"})),
                "id",
                "P001",
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["id"], "P001");
        assert_eq!(updated[0]["name"], "Johnny");
        assert_eq!(updated[0]["age"], 45);

        let none = store
            .update("patients", row(json!({"name": "X"})), "id", "P404")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_matches_numbers_as_text() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert("patients", vec![row(json!({"id": "P001", "age": 45}))])
            .await
            .unwrap();

        let updated = store
            .update("patients", row(json!({"status": "Stable"})), "age", "45")
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_counts_rows() {
        let store = RecordStore::in_memory().await.unwrap();
        store
            .insert(
                "appointments",
                vec![row(json!({"id": "A001"})), row(json!({"id": "A002"}))],
            )
            .await
            .unwrap();

        assert_eq!(store.delete("appointments", "id", "A001").await.unwrap(), 1);
        assert_eq!(store.delete("appointments", "id", "A001").await.unwrap(), 0);
        let rows = store.select("appointments", None, None).await.unwrap();
        assert_eq!(ids(&rows), ["A002"]);
    }
}
