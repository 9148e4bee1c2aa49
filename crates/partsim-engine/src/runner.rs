//! Delay-paced simulation runner
//!
//! Drives `Simulation::step()` on a timer: one full step, then a delay,
//! then the next. Re-entry is serialized by construction (the loop owns the
//! mutable borrow), and cancellation is checked before every step so a
//! stale tick can never mutate state after a stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use partsim_core::Result;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::engine::{Simulation, StepOutcome};

/// Pacing between allocation attempts
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1000);

/// Lighter pacing when skipping an already-allocated process
pub const DEFAULT_RECHECK_DELAY: Duration = Duration::from_millis(500);

/// Cancellation handle for a paced run
///
/// Cloneable and cheap; flipping it halts the runner before its next step.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Paced step loop
pub struct Runner {
    step_delay: Duration,
    recheck_delay: Duration,
    cancel: Arc<AtomicBool>,
}

impl Runner {
    /// Create a runner with the default pacing (1000ms / 500ms)
    pub fn new() -> Self {
        Self::with_delays(DEFAULT_STEP_DELAY, DEFAULT_RECHECK_DELAY)
    }

    /// Create a runner with custom pacing
    pub fn with_delays(step_delay: Duration, recheck_delay: Duration) -> Self {
        Runner {
            step_delay,
            recheck_delay,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Obtain a handle that can cancel this runner from another task
    pub fn handle(&self) -> StopHandle {
        StopHandle {
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Start the simulation and step it to completion or cancellation.
    ///
    /// `start()` preconditions (`NoPendingWork`, `AlreadyRunning`) and
    /// structural step errors propagate to the caller; per-process
    /// allocation failures do not, they are ordinary outcomes.
    pub async fn run(&self, sim: &mut Simulation) -> Result<()> {
        sim.start()?;
        info!(algorithm = %sim.algorithm(), "simulation started");

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                info!("runner cancelled, halting simulation");
                sim.stop();
                return Ok(());
            }
            if !sim.is_running() {
                // Stopped out from under us between steps
                return Ok(());
            }

            match sim.step()? {
                StepOutcome::Completed => {
                    info!("simulation complete");
                    return Ok(());
                }
                StepOutcome::Skipped => {
                    debug!("process already allocated, rechecking shortly");
                    sleep(self.recheck_delay).await;
                }
                StepOutcome::Allocated { process_id, partition_id } => {
                    debug!(process_id, partition_id, "allocated");
                    sleep(self.step_delay).await;
                }
                StepOutcome::Rejected { process_id } => {
                    debug!(process_id, "rejected");
                    sleep(self.step_delay).await;
                }
            }
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsim_core::{Algorithm, EngineError, Partition, Process};

    fn reference_simulation(algorithm: Algorithm) -> Simulation {
        let partitions = [100, 500, 200, 300, 600]
            .iter()
            .enumerate()
            .map(|(i, &cap)| Partition::new(i as u32 + 1, cap).unwrap())
            .collect();
        let queue = [212, 417, 112, 426]
            .iter()
            .enumerate()
            .map(|(i, &size)| Process::new(i as u32 + 1, size).unwrap())
            .collect();
        Simulation::with_config(partitions, queue, algorithm).unwrap()
    }

    fn instant_runner() -> Runner {
        Runner::with_delays(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_run_to_completion() {
        let mut sim = reference_simulation(Algorithm::FirstFit);
        instant_runner().run(&mut sim).await.unwrap();

        assert!(!sim.is_running());
        assert_eq!(sim.cursor(), sim.queue().len());
        assert_eq!(sim.queue().iter().filter(|p| p.allocated).count(), 3);
        assert_eq!(
            sim.log().entries().last().unwrap().message,
            "Simulation Complete."
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_first_step_leaves_state_untouched() {
        let mut sim = reference_simulation(Algorithm::FirstFit);
        let runner = instant_runner();
        runner.handle().stop();

        runner.run(&mut sim).await.unwrap();

        // start() ran, but no step fired after cancellation
        assert!(!sim.is_running());
        assert_eq!(sim.cursor(), 0);
        assert!(sim.queue().iter().all(|p| !p.allocated));
        assert_eq!(sim.log().len(), 1); // the start event only
    }

    #[tokio::test]
    async fn test_empty_queue_propagates_no_pending_work() {
        let partitions = vec![Partition::new(1, 100).unwrap()];
        let mut sim =
            Simulation::with_config(partitions, Vec::new(), Algorithm::FirstFit).unwrap();
        let err = instant_runner().run(&mut sim).await.unwrap_err();
        assert_eq!(err, EngineError::NoPendingWork);
    }

    #[tokio::test]
    async fn test_rerun_after_reset_matches_first_run() {
        let mut sim = reference_simulation(Algorithm::NextFit);
        instant_runner().run(&mut sim).await.unwrap();
        let first: Vec<Option<u32>> =
            sim.queue().iter().map(|p| p.assigned_partition).collect();

        sim.reset();
        instant_runner().run(&mut sim).await.unwrap();
        let second: Vec<Option<u32>> =
            sim.queue().iter().map(|p| p.assigned_partition).collect();

        assert_eq!(first, second);
    }
}
