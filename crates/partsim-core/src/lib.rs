//! Partsim Core - Shared types and errors
//!
//! This crate defines the domain model used across the partition simulator:
//! - Partition and Process records with validated constructors
//! - The placement algorithm selector
//! - The append-only event log consumed by the presentation layer
//! - Error types

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
