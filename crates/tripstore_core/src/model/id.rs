//! Identifier generation.
//!
//! # Responsibility
//! - Supply fresh opaque ids for newly created entities.
//!
//! # Invariants
//! - Generated ids are non-empty.
//! - Callers never parse or inspect id contents.

use uuid::Uuid;

/// Source of fresh entity ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random UUID v4 ids. Default generator for production stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids, counting up from 1.
///
/// Useful where stable ids matter more than global uniqueness, e.g. tests
/// and fixtures.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
