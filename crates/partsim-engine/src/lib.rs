//! Partsim Engine
//!
//! Contiguous-memory allocation simulator: four placement policies applied
//! one process at a time by a step-paced, cancellable driver.

pub mod engine;
pub mod policies;
pub mod report;
pub mod runner;
pub mod workload;
