//! SQLite-backed blob store.
//!
//! # Responsibility
//! - Open and configure the database file holding persisted snapshots.
//! - Persist blobs durably in the `blob_entries` table.
//!
//! # Invariants
//! - The schema version is tracked via `PRAGMA user_version`.
//! - Files written by a newer schema are refused, never rewritten.
//! - One row per key; writes upsert.

use super::{BlobStore, StorageError, StorageResult};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_BLOB_ENTRIES: &str = "CREATE TABLE IF NOT EXISTS blob_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Opens (creating if missing) a database file ready for `SqliteBlobStore`.
///
/// # Side effects
/// - Creates the file and the `blob_entries` table when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_blob_db(path: impl AsRef<Path>) -> StorageResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens an in-memory database ready for `SqliteBlobStore`.
///
/// The database lives as long as the returned connection.
pub fn open_blob_db_in_memory() -> StorageResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

/// Durable local blob store over a prepared SQLite connection.
pub struct SqliteBlobStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlobStore<'conn> {
    /// Wraps a connection after checking its schema is current.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM blob_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO blob_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        debug!(
            "event=blob_write module=storage status=ok backend=sqlite bytes={}",
            value.len()
        );
        Ok(())
    }
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StorageResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=storage status=start mode={mode}");

    let mut conn = open().map_err(|err| {
        error!(
            "event=db_open module=storage status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        StorageError::from(err)
    })?;

    match prepare_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=storage status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=storage status=error mode={} duration_ms={} error_code=db_schema_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn prepare_connection(conn: &mut Connection) -> StorageResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;

    let db_version = user_version(conn)?;
    if db_version > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if db_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_BLOB_ENTRIES)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=db_schema module=storage status=ok from_version={} to_version={}",
        db_version, SCHEMA_VERSION
    );
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> StorageResult<()> {
    let actual_version = user_version(conn)?;
    if actual_version != SCHEMA_VERSION {
        return Err(StorageError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'blob_entries'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StorageError::MissingRequiredTable("blob_entries"));
    }
    Ok(())
}

fn user_version(conn: &Connection) -> StorageResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
