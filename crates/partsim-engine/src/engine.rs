//! Simulation driver for contiguous-memory allocation
//!
//! Owns the whole simulation state and advances it one process at a time.
//! Configuration and reordering are only accepted while idle; all mutation
//! during a run goes through `step()`, which the paced runner serializes.

use partsim_core::{
    Algorithm, ConfigError, EngineError, EventLog, Partition, Process, Result,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::policies::select_partition;

/// Outcome of a single simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Process committed to a partition
    Allocated { process_id: u32, partition_id: u32 },
    /// No qualifying partition; recorded, simulation continues
    Rejected { process_id: u32 },
    /// Process was already allocated (re-entry into a partial queue)
    Skipped,
    /// Queue exhausted; the driver has halted
    Completed,
}

/// The simulation state machine
///
/// States: Idle -> Running -> {Completed, Idle}. `stop()` returns to Idle
/// directly; a later `start()` resumes from the existing cursor unless a
/// `reset()` intervened.
#[derive(Debug, Clone)]
pub struct Simulation {
    partitions: Vec<Partition>,
    queue: Vec<Process>,
    algorithm: Algorithm,
    running: bool,
    cursor: usize,
    // Next-fit pointer: last successfully used index, carried across the run
    last_placed: usize,
    log: EventLog,
}

impl Simulation {
    /// Create an empty simulation
    pub fn new(algorithm: Algorithm) -> Self {
        Simulation {
            partitions: Vec::new(),
            queue: Vec::new(),
            algorithm,
            running: false,
            cursor: 0,
            last_placed: 0,
            log: EventLog::new(),
        }
    }

    /// Create a simulation from pre-built partition and process lists.
    ///
    /// Rejects duplicate ids within either list.
    pub fn with_config(
        partitions: Vec<Partition>,
        queue: Vec<Process>,
        algorithm: Algorithm,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for partition in &partitions {
            if !seen.insert(partition.id) {
                return Err(ConfigError::DuplicateId(partition.id).into());
            }
        }
        seen.clear();
        for process in &queue {
            if !seen.insert(process.id) {
                return Err(ConfigError::DuplicateId(process.id).into());
            }
        }
        Ok(Simulation {
            partitions,
            queue,
            algorithm,
            running: false,
            cursor: 0,
            last_placed: 0,
            log: EventLog::new(),
        })
    }

    // --- Query surface ---

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn queue(&self) -> &[Process] {
        &self.queue
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_placed(&self) -> usize {
        self.last_placed
    }

    // --- Configuration surface (idle only) ---

    fn ensure_idle(&self) -> Result<()> {
        if self.running {
            return Err(EngineError::SimulationRunning);
        }
        Ok(())
    }

    /// Append a partition, assigning the next free id. Returns the id.
    pub fn add_partition(&mut self, capacity_kb: u32) -> Result<u32> {
        self.ensure_idle()?;
        let id = next_id(self.partitions.iter().map(|p| p.id));
        self.partitions.push(Partition::new(id, capacity_kb)?);
        Ok(id)
    }

    /// Append a process to the queue, assigning the next free id.
    pub fn add_process(&mut self, size_kb: u32) -> Result<u32> {
        self.ensure_idle()?;
        let id = next_id(self.queue.iter().map(|p| p.id));
        self.queue.push(Process::new(id, size_kb)?);
        Ok(id)
    }

    /// Remove a free partition by id. Occupied partitions stay put.
    pub fn remove_partition(&mut self, id: u32) -> Result<()> {
        self.ensure_idle()?;
        let index = self
            .partitions
            .iter()
            .position(|p| p.id == id)
            .ok_or(ConfigError::UnknownId(id))?;
        if !self.partitions[index].is_free() {
            return Err(EngineError::PartitionOccupied(id));
        }
        self.partitions.remove(index);
        Ok(())
    }

    /// Remove an unallocated process by id.
    pub fn remove_process(&mut self, id: u32) -> Result<()> {
        self.ensure_idle()?;
        let index = self
            .queue
            .iter()
            .position(|p| p.id == id)
            .ok_or(ConfigError::UnknownId(id))?;
        if self.queue[index].allocated {
            return Err(EngineError::ProcessAllocated(id));
        }
        self.queue.remove(index);
        Ok(())
    }

    /// Move a partition to a new position.
    ///
    /// Partition ids are renumbered 1-based by position and every process's
    /// `assigned_partition` is remapped through the old-id -> new-id map so
    /// references stay valid.
    pub fn move_partition(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_idle()?;
        check_bounds(from, self.partitions.len())?;
        check_bounds(to, self.partitions.len())?;
        if from == to {
            return Ok(());
        }
        let item = self.partitions.remove(from);
        self.partitions.insert(to, item);

        let mut id_map = HashMap::new();
        for (index, partition) in self.partitions.iter_mut().enumerate() {
            let new_id = index as u32 + 1;
            id_map.insert(partition.id, new_id);
            partition.id = new_id;
        }
        for process in &mut self.queue {
            if let Some(old) = process.assigned_partition {
                if let Some(&new) = id_map.get(&old) {
                    process.assigned_partition = Some(new);
                }
            }
        }
        // Occupant snapshots reference the *new* partition ids too
        for partition in &mut self.partitions {
            if let Some(occupant) = &mut partition.occupant {
                if let Some(old) = occupant.assigned_partition {
                    if let Some(&new) = id_map.get(&old) {
                        occupant.assigned_partition = Some(new);
                    }
                }
            }
        }
        Ok(())
    }

    /// Move a process to a new queue position.
    ///
    /// Process ids are renumbered 1-based by position; occupant snapshots
    /// inside partitions are remapped so the allocation invariant holds.
    pub fn move_process(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_idle()?;
        check_bounds(from, self.queue.len())?;
        check_bounds(to, self.queue.len())?;
        if from == to {
            return Ok(());
        }
        let item = self.queue.remove(from);
        self.queue.insert(to, item);

        let mut id_map = HashMap::new();
        for (index, process) in self.queue.iter_mut().enumerate() {
            let new_id = index as u32 + 1;
            id_map.insert(process.id, new_id);
            process.id = new_id;
        }
        for partition in &mut self.partitions {
            if let Some(occupant) = &mut partition.occupant {
                if let Some(&new) = id_map.get(&occupant.id) {
                    occupant.id = new;
                }
            }
        }
        Ok(())
    }

    /// Switch the placement algorithm. Rejected mid-run.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> Result<()> {
        self.ensure_idle()?;
        self.algorithm = algorithm;
        Ok(())
    }

    // --- Control surface ---

    /// Begin (or resume) a run.
    ///
    /// The cursor and next-fit pointer are deliberately NOT reset here: a
    /// restart after a partial run resumes from the prior allocation state.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Err(EngineError::AlreadyRunning);
        }
        if self.queue.iter().all(|p| p.allocated) {
            return Err(EngineError::NoPendingWork);
        }
        self.running = true;
        self.log
            .info(format!("Starting {} Simulation...", self.algorithm));
        Ok(())
    }

    /// Advance the simulation by one process.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if !self.running {
            return Err(EngineError::NotRunning);
        }

        if self.cursor >= self.queue.len() {
            self.running = false;
            self.log.success("Simulation Complete.");
            debug!("queue exhausted, halting");
            return Ok(StepOutcome::Completed);
        }

        if self.queue[self.cursor].allocated {
            // Re-entering a partially run queue; no attempt event
            self.cursor += 1;
            return Ok(StepOutcome::Skipped);
        }

        let (process_id, size_kb) = {
            let process = &self.queue[self.cursor];
            (process.id, process.size_kb)
        };
        self.log.info(format!(
            "Attempting to allocate Process P{} ({}KB)...",
            process_id, size_kb
        ));

        let chosen = select_partition(&self.partitions, size_kb, self.algorithm, self.last_placed);

        let outcome = match chosen {
            Some(index) => {
                let partition_id = self.partitions[index].id;
                let capacity_kb = self.partitions[index].capacity_kb;

                let process = &mut self.queue[self.cursor];
                process.allocated = true;
                process.assigned_partition = Some(partition_id);
                self.partitions[index].occupant = Some(process.clone());

                if self.algorithm == Algorithm::NextFit {
                    self.last_placed = index;
                }

                self.log.success(format!(
                    "Success: P{} allocated to Block {} ({}KB).",
                    process_id, partition_id, capacity_kb
                ));
                debug!(process_id, partition_id, "allocation committed");
                StepOutcome::Allocated {
                    process_id,
                    partition_id,
                }
            }
            None => {
                self.log.error(format!(
                    "Failed: No suitable partition found for P{}.",
                    process_id
                ));
                debug!(process_id, "no qualifying partition");
                StepOutcome::Rejected { process_id }
            }
        };

        self.cursor += 1;
        Ok(outcome)
    }

    /// Clear every allocation and the log. Valid from any state; idempotent.
    pub fn reset(&mut self) {
        self.running = false;
        self.cursor = 0;
        self.last_placed = 0;
        for partition in &mut self.partitions {
            partition.occupant = None;
        }
        for process in &mut self.queue {
            process.clear_assignment();
        }
        self.log.clear();
        self.log.info("System Reset.");
    }

    /// Halt the run without touching allocation state.
    ///
    /// Any already-scheduled future step must observe `running == false`
    /// before mutating state; the runner checks this plus its cancel flag.
    pub fn stop(&mut self) {
        self.running = false;
    }
}

fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    ids.max().map_or(1, |max| max + 1)
}

fn check_bounds(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(ConfigError::IndexOutOfBounds { index, len }.into());
    }
    Ok(())
}
