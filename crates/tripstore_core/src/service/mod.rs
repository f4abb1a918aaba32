//! Core use-case services.
//!
//! # Responsibility
//! - Hold session state and orchestrate persistence through storage.
//! - Keep UI layers decoupled from storage and snapshot details.

pub mod trip_store;
