//! Error types for the partition simulator

use thiserror::Error;

/// Engine result type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Configuration-time validation errors
///
/// Rejected before entering the model; the caller corrects and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity or request size of zero
    #[error("Invalid size: {0}KB (must be positive)")]
    InvalidSize(u32),

    /// Id collides with an existing entry
    #[error("Duplicate id: {0}")]
    DuplicateId(u32),

    /// Reorder index outside the sequence
    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// No partition or process with the given id
    #[error("Unknown id: {0}")]
    UnknownId(u32),

    /// Unrecognized placement algorithm name
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Errors that can occur while driving a simulation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `start()` called with every process already allocated
    #[error("No pending work: every process is already allocated")]
    NoPendingWork,

    /// `step()` called while the driver is idle
    #[error("Simulation is not running")]
    NotRunning,

    /// `start()` called while a run is in progress
    #[error("Simulation is already running")]
    AlreadyRunning,

    /// Configuration mutation attempted mid-run
    #[error("Operation rejected while the simulation is running")]
    SimulationRunning,

    /// Removal of a partition that still holds an occupant
    #[error("Partition {0} is occupied")]
    PartitionOccupied(u32),

    /// Removal of a process that is still allocated
    #[error("Process {0} is allocated")]
    ProcessAllocated(u32),
}
