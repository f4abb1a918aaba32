//! Key-value blob storage for persisted snapshots.
//!
//! # Responsibility
//! - Define the `BlobStore` contract the trip store persists through.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - `set` replaces any prior value stored under the same key.
//! - `get` returns `Ok(None)` for absent keys; errors are transport failures.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryBlobStore;
pub use sqlite::{open_blob_db, open_blob_db_in_memory, SqliteBlobStore, SCHEMA_VERSION};

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by blob store implementations.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite driver failure.
    Sqlite(rusqlite::Error),
    /// The database file was written by a newer build; it is left untouched.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Writing the value would exceed the store's capacity.
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        capacity_bytes: usize,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "trip database schema version {db_version} is newer than supported {latest_supported}; refusing to open"
            ),
            Self::QuotaExceeded {
                key,
                required_bytes,
                capacity_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes required, capacity {capacity_bytes}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_blob_db first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Key-value store holding opaque text blobs.
pub trait BlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}
