use rusqlite::Connection;
use tripstore_core::{
    open_blob_db, open_blob_db_in_memory, BlobStore, NewActivity, NewTrip, SeedPolicy,
    SqliteBlobStore, StorageError, StoreConfig, Trip, TripStore, DEFAULT_STORAGE_KEY,
    SCHEMA_VERSION,
};

#[test]
fn open_in_memory_creates_current_schema() {
    let conn = open_blob_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "blob_entries");
}

#[test]
fn reopening_database_file_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trips.db");

    {
        let conn = open_blob_db(&path).unwrap();
        let mut store = SqliteBlobStore::try_new(&conn).unwrap();
        store.set("trips", "[]").unwrap();
    }

    let conn = open_blob_db(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    let store = SqliteBlobStore::try_new(&conn).unwrap();
    assert_eq!(store.get("trips").unwrap().as_deref(), Some("[]"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_blob_db(&path) {
        Err(StorageError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must be refused"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 999);
}

#[test]
fn get_returns_none_for_missing_key() {
    let conn = open_blob_db_in_memory().unwrap();
    let store = SqliteBlobStore::try_new(&conn).unwrap();

    assert_eq!(store.get("trips").unwrap(), None);
}

#[test]
fn set_upserts_one_row_per_key() {
    let conn = open_blob_db_in_memory().unwrap();
    let mut store = SqliteBlobStore::try_new(&conn).unwrap();

    store.set("trips", "[]").unwrap();
    store.set("trips", "[{}]").unwrap();
    store.set("other", "x").unwrap();

    assert_eq!(store.get("trips").unwrap().as_deref(), Some("[{}]"));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM blob_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn store_rejects_unprepared_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBlobStore::try_new(&conn) {
        Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unprepared connection must be rejected"),
    }
}

#[test]
fn trip_store_round_trips_through_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trips.db");
    let config = StoreConfig::default().with_seed(SeedPolicy::Empty);

    let before: Vec<Trip> = {
        let conn = open_blob_db(&path).unwrap();
        let storage = SqliteBlobStore::try_new(&conn).unwrap();
        let mut store = TripStore::open(storage, config.clone()).unwrap();
        let trip_id = store
            .add_trip(NewTrip {
                title: "Road trip".to_string(),
                budget: 750.0,
                ..NewTrip::default()
            })
            .unwrap();
        let destination_id = store
            .add_destination(&trip_id, Default::default())
            .unwrap()
            .unwrap();
        store
            .add_activity(
                &trip_id,
                &destination_id,
                NewActivity {
                    title: "Diner".to_string(),
                    cost: 18.5,
                    ..NewActivity::default()
                },
            )
            .unwrap();
        store.trips().iter().map(|trip| Trip::clone(trip)).collect()
    };

    let conn = open_blob_db(&path).unwrap();
    let storage = SqliteBlobStore::try_new(&conn).unwrap();
    let raw = storage.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"coverImage\""));

    let reopened = TripStore::open(storage, config).unwrap();
    let after: Vec<Trip> = reopened.trips().iter().map(|trip| Trip::clone(trip)).collect();
    assert_eq!(after, before);
    assert_eq!(after[0].total_cost(), 18.5);
}

#[test]
fn first_open_seeds_database_with_samples() {
    let conn = open_blob_db_in_memory().unwrap();
    let storage = SqliteBlobStore::try_new(&conn).unwrap();
    let store = TripStore::open(storage, StoreConfig::default()).unwrap();

    assert_eq!(store.trips().len(), 2);
    let raw = store.storage().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("European Adventure"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
