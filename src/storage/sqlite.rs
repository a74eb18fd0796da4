//! SQLite record store.
//!
//! Records live in a single `records` table keyed by the record key. All
//! database calls run on the blocking pool so the async runtime never waits
//! on disk I/O.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;
use tracing::debug;

use super::{RecordStore, StoredRecord};
use crate::error::StoreResult;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS records (
        record_key TEXT PRIMARY KEY,
        payload    BLOB NOT NULL,
        seq        INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )";

const CREATE_SEQ_INDEX: &str = "CREATE INDEX IF NOT EXISTS records_seq ON records (seq)";

// `seq` grows by one on every write and orders enumeration.
const UPSERT: &str = "
    INSERT INTO records (record_key, payload, seq, updated_at)
    VALUES (?1, ?2, (SELECT COALESCE(MAX(seq), 0) + 1 FROM records), ?3)
    ON CONFLICT(record_key) DO UPDATE SET
        payload = excluded.payload,
        seq = excluded.seq,
        updated_at = excluded.updated_at";

/// [`RecordStore`] backed by one SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened SQLite store");
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(CREATE_TABLE, [])?;
        conn.execute(CREATE_SEQ_INDEX, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn upsert(&self, key: &str, payload: Bytes) -> StoreResult<()> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        task::spawn_blocking(move || -> StoreResult<()> {
            let updated_at = Utc::now().timestamp_micros();
            conn.lock()
                .execute(UPSERT, params![key, &payload[..], updated_at])?;
            Ok(())
        })
        .await?
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        task::spawn_blocking(move || -> StoreResult<Option<Bytes>> {
            let payload: Option<Vec<u8>> = conn
                .lock()
                .query_row(
                    "SELECT payload FROM records WHERE record_key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(payload.map(Bytes::from))
        })
        .await?
    }

    async fn enumerate(&self, limit: usize) -> StoreResult<Vec<StoredRecord>> {
        let conn = Arc::clone(&self.conn);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        task::spawn_blocking(move || -> StoreResult<Vec<StoredRecord>> {
            let conn = conn.lock();
            let mut stmt = conn.prepare(
                "SELECT record_key, payload FROM records
                 ORDER BY seq DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                let key: String = row.get(0)?;
                let payload: Vec<u8> = row.get(1)?;
                Ok(StoredRecord::new(key, payload))
            })?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await?
    }
}
