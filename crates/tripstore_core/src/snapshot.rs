//! Snapshot codec for the persisted trip collection.
//!
//! # Responsibility
//! - Serialize the whole trip collection to self-describing JSON.
//! - Parse persisted JSON back into trips.
//!
//! # Invariants
//! - Field names follow the stored schema (`startDate`, `coverImage`, ...).
//! - `parse_trips` only checks the JSON shape; `decode_trips` also rejects
//!   trees that break id invariants.

use crate::model::trip::{validate_trips, Trip, TripValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Errors from snapshot encoding/decoding.
#[derive(Debug)]
pub enum SnapshotError {
    /// JSON could not be produced or parsed.
    Json(serde_json::Error),
    /// JSON parsed but the trip tree breaks an invariant.
    Invalid(TripValidationError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "snapshot json error: {err}"),
            Self::Invalid(err) => write!(f, "invalid snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<TripValidationError> for SnapshotError {
    fn from(value: TripValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Encodes the trip collection as a JSON array.
pub fn encode_trips(trips: &[Arc<Trip>]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(trips)?)
}

/// Parses a JSON array of trips without checking tree invariants.
pub fn parse_trips(blob: &str) -> Result<Vec<Trip>, SnapshotError> {
    Ok(serde_json::from_str(blob)?)
}

/// Parses a JSON array of trips and checks id invariants.
pub fn decode_trips(blob: &str) -> Result<Vec<Trip>, SnapshotError> {
    let trips = parse_trips(blob)?;
    validate_trips(trips.iter())?;
    Ok(trips)
}
