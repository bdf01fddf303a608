//! SQLite-backed invocation log via libsql. Implements LogStorePort.
//!
//! One database file (invocations.db) in the data directory. The table name is the
//! configured log target; `id` is the primary key so duplicate invocation ids are
//! rejected. Append-only: the relay never updates, deletes or reads rows.

use crate::domain::{DomainError, LogRecord};
use crate::ports::LogStorePort;
use libsql::{Connection, Database, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DB_FILE_NAME: &str = "invocations.db";

pub struct SqliteLogStore {
    // Kept alive for the lifetime of the connection.
    _db: Database,
    conn: Connection,
    table: String,
    db_path: PathBuf,
}

impl SqliteLogStore {
    /// Open (or create) `<base_dir>/invocations.db` and ensure the log table exists.
    /// Call this once at startup; the returned store is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>, table: &str) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::LogStore(e.to_string()))?;
        Self::open(base.join(DB_FILE_NAME), table).await
    }

    /// Open a specific database file.
    pub async fn open(db_path: impl AsRef<Path>, table: &str) -> Result<Self, DomainError> {
        validate_table_name(table)?;
        let db_path = db_path.as_ref().to_path_buf();
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::LogStore(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| DomainError::LogStore(e.to_string()))?;

        // PRAGMA returns a row; consume it (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::LogStore(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::LogStore(e.to_string()))?
            .is_some()
        {}

        conn.execute(&create_table_sql(table), ())
            .await
            .map_err(|e| DomainError::LogStore(e.to_string()))?;

        info!(path = %db_path.display(), table, "invocation log store ready");

        Ok(Self {
            _db: db,
            conn,
            table: table.to_string(),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait::async_trait]
impl LogStorePort for SqliteLogStore {
    async fn append(&self, record: &LogRecord) -> Result<(), DomainError> {
        let sql = format!(
            "INSERT INTO {} (id, request_id, status, prompt, response, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            self.table
        );
        self.conn
            .execute(
                &sql,
                params![
                    record.id.as_str(),
                    record.request_id.as_str(),
                    record.status.as_str(),
                    record.prompt.as_str(),
                    record.response.as_str(),
                    record.timestamp
                ],
            )
            .await
            .map_err(|e| DomainError::LogStore(format!("insert {} failed: {}", record.id, e)))?;
        debug!(id = %record.id, status = %record.status, "log record appended");
        Ok(())
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {} (
    id TEXT PRIMARY KEY NOT NULL,
    request_id TEXT NOT NULL,
    status TEXT NOT NULL,
    prompt TEXT NOT NULL,
    response TEXT NOT NULL,
    timestamp INTEGER NOT NULL
)"#,
        table
    )
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn validate_table_name(table: &str) -> Result<(), DomainError> {
    let mut chars = table.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DomainError::Config(format!(
            "invalid log table name {:?}: use letters, digits and underscores",
            table
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InvocationId, InvocationOutcome, LogStatus};
    use serde_json::json;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("inference-relay-test-{}", uuid::Uuid::new_v4()))
    }

    fn record(request_id: &str, outcome: InvocationOutcome) -> LogRecord {
        LogRecord::new(
            &InvocationId::new(1_700_000_000_000, request_id),
            "prompt",
            &outcome,
            1_700_000_000,
        )
    }

    async fn rows(store: &SqliteLogStore) -> Vec<(String, String, String, String, String, i64)> {
        let mut rows = store
            .conn
            .query(
                &format!(
                    "SELECT id, request_id, status, prompt, response, timestamp FROM {} ORDER BY id",
                    store.table
                ),
                (),
            )
            .await
            .unwrap();
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            out.push((
                row.get::<String>(0).unwrap(),
                row.get::<String>(1).unwrap(),
                row.get::<String>(2).unwrap(),
                row.get::<String>(3).unwrap(),
                row.get::<String>(4).unwrap(),
                row.get::<i64>(5).unwrap(),
            ));
        }
        out
    }

    #[tokio::test]
    async fn test_append_persists_all_fields() {
        let dir = temp_dir();
        let store = SqliteLogStore::connect(&dir, "invocation_logs").await.unwrap();
        assert_eq!(store.db_path(), dir.join(DB_FILE_NAME).as_path());

        let ok = record("a", InvocationOutcome::Success(json!({ "generated_text": "x" })));
        let err = record("b", InvocationOutcome::Failure("boom".to_string()));
        store.append(&ok).await.unwrap();
        store.append(&err).await.unwrap();

        let stored = rows(&store).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(
            stored[0],
            (
                "1700000000000#a".to_string(),
                "1700000000000#a".to_string(),
                LogStatus::Ok.as_str().to_string(),
                "prompt".to_string(),
                r#"{"generated_text":"x"}"#.to_string(),
                1_700_000_000
            )
        );
        assert_eq!(stored[1].2, "error");
        assert_eq!(stored[1].4, r#"{"invoke_error":"boom"}"#);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let dir = temp_dir();
        let store = SqliteLogStore::connect(&dir, "logs").await.unwrap();
        let first = record("same", InvocationOutcome::Success(json!(1)));

        store.append(&first).await.unwrap();
        let err = store.append(&first).await.unwrap_err();

        assert!(matches!(err, DomainError::LogStore(_)));
        assert_eq!(rows(&store).await.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_reopen_keeps_existing_rows() {
        let dir = temp_dir();
        {
            let store = SqliteLogStore::connect(&dir, "logs").await.unwrap();
            store
                .append(&record("r", InvocationOutcome::Success(json!(null))))
                .await
                .unwrap();
        }
        let store = SqliteLogStore::connect(&dir, "logs").await.unwrap();
        assert_eq!(rows(&store).await.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_invalid_table_name_rejected() {
        let dir = temp_dir();
        for name in ["", "1logs", "logs; DROP TABLE x", "my-table"] {
            let res = SqliteLogStore::connect(&dir, name).await;
            assert!(matches!(res, Err(DomainError::Config(_))), "name: {:?}", name);
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
