//! Core state store for the trip planner.
//! This crate is the single source of truth for trip tree invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod seed;
pub mod service;
pub mod snapshot;
pub mod storage;

pub use config::{SeedPolicy, StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use model::trip::{
    is_blank_id, validate_trips, Accommodation, Activity, ActivityId, Destination, DestinationId, EntityKind,
    NewActivity, NewDestination, NewTrip, TransportKind, Transportation, Trip, TripId,
    TripValidationError,
};
pub use seed::sample_trips;
pub use service::trip_store::{Outcome, StoreError, StoreResult, TripStore};
pub use snapshot::{decode_trips, encode_trips, parse_trips, SnapshotError};
pub use storage::{
    open_blob_db, open_blob_db_in_memory, BlobStore, MemoryBlobStore, SqliteBlobStore,
    StorageError, StorageResult, SCHEMA_VERSION,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
