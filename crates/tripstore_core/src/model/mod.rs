//! Trip planning domain model.
//!
//! # Responsibility
//! - Define canonical data structures for the trip hierarchy.
//! - Define how fresh entity ids are produced.
//!
//! # Invariants
//! - Every entity is identified by an opaque id that never changes.
//! - Containment is exclusive: a trip owns its destinations, a destination
//!   owns its activities and bookings.

pub mod id;
pub mod trip;
