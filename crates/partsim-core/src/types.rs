//! Core types for the partition simulator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placement algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    FirstFit,
    BestFit,
    WorstFit,
    NextFit,
}

impl Algorithm {
    /// All algorithms, in comparison-run order
    pub const ALL: [Algorithm; 4] = [
        Algorithm::FirstFit,
        Algorithm::BestFit,
        Algorithm::WorstFit,
        Algorithm::NextFit,
    ];
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::FirstFit => write!(f, "First Fit"),
            Algorithm::BestFit => write!(f, "Best Fit"),
            Algorithm::WorstFit => write!(f, "Worst Fit"),
            Algorithm::NextFit => write!(f, "Next Fit"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-fit" | "firstfit" => Ok(Algorithm::FirstFit),
            "best" | "best-fit" | "bestfit" => Ok(Algorithm::BestFit),
            "worst" | "worst-fit" | "worstfit" => Ok(Algorithm::WorstFit),
            "next" | "next-fit" | "nextfit" => Ok(Algorithm::NextFit),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// A sized allocation request with a queue position and allocation status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: u32,
    pub size_kb: u32,
    pub allocated: bool,
    pub assigned_partition: Option<u32>,
}

impl Process {
    /// Create an unallocated process. Fails on a zero size.
    pub fn new(id: u32, size_kb: u32) -> Result<Self, ConfigError> {
        if size_kb == 0 {
            return Err(ConfigError::InvalidSize(size_kb));
        }
        Ok(Process {
            id,
            size_kb,
            allocated: false,
            assigned_partition: None,
        })
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Drop the allocation, returning the process to the pending pool
    pub fn clear_assignment(&mut self) {
        self.allocated = false;
        self.assigned_partition = None;
    }
}

/// A fixed-capacity contiguous memory block holding at most one occupant
///
/// The occupant is a snapshot of the process taken at allocation time,
/// decoupled from later queue mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub id: u32,
    pub capacity_kb: u32,
    pub occupant: Option<Process>,
}

impl Partition {
    /// Create a free partition. Fails on a zero capacity.
    pub fn new(id: u32, capacity_kb: u32) -> Result<Self, ConfigError> {
        if capacity_kb == 0 {
            return Err(ConfigError::InvalidSize(capacity_kb));
        }
        Ok(Partition {
            id,
            capacity_kb,
            occupant: None,
        })
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Unused capacity inside an occupied partition; zero when free
    pub fn internal_fragmentation_kb(&self) -> u32 {
        match &self.occupant {
            Some(proc) => self.capacity_kb - proc.size_kb,
            None => 0,
        }
    }
}

/// Event severity, mirrored by the presentation layer's log colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single simulation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// Append-only event record
///
/// Entry order is emission order; past entries are never mutated or removed
/// except by a full clear on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
