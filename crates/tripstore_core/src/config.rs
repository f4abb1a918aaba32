//! Trip store configuration.

use crate::model::trip::Trip;
use crate::seed::sample_trips;

/// Storage key holding the whole trip collection.
pub const DEFAULT_STORAGE_KEY: &str = "trips";

/// What the store starts with when no usable snapshot is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// The two built-in sample trips.
    #[default]
    Samples,
    /// An empty collection.
    Empty,
}

impl SeedPolicy {
    pub fn trips(self) -> Vec<Trip> {
        match self {
            Self::Samples => sample_trips(),
            Self::Empty => Vec::new(),
        }
    }
}

/// Options for opening a `TripStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub seed: SeedPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed: SeedPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }
}
