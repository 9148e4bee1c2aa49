//! Run summaries for display and JSON output

use serde::{Deserialize, Serialize};

use crate::engine::Simulation;

/// Result of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub algorithm: String,
    pub total_processes: usize,
    pub allocated_processes: usize,
    pub failed_processes: usize,
    pub total_partitions: usize,
    pub free_partitions: usize,
    pub total_capacity_kb: u32,
    pub used_kb: u32,
    /// Unused capacity trapped inside occupied partitions
    pub internal_fragmentation_kb: u32,
}

impl SimulationReport {
    /// Summarize the current state of a simulation
    pub fn summarize(sim: &Simulation) -> Self {
        let allocated = sim.queue().iter().filter(|p| p.allocated).count();
        let used_kb = sim
            .partitions()
            .iter()
            .filter_map(|p| p.occupant.as_ref())
            .map(|occupant| occupant.size_kb)
            .sum();

        SimulationReport {
            algorithm: sim.algorithm().to_string(),
            total_processes: sim.queue().len(),
            allocated_processes: allocated,
            failed_processes: sim.queue().len() - allocated,
            total_partitions: sim.partitions().len(),
            free_partitions: sim.partitions().iter().filter(|p| p.is_free()).count(),
            total_capacity_kb: sim.partitions().iter().map(|p| p.capacity_kb).sum(),
            used_kb,
            internal_fragmentation_kb: sim
                .partitions()
                .iter()
                .map(|p| p.internal_fragmentation_kb())
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsim_core::{Algorithm, Partition, Process};

    #[test]
    fn test_report_fragmentation_arithmetic() {
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
        let mut sim = Simulation::with_config(partitions, queue, Algorithm::FirstFit).unwrap();
        sim.start().unwrap();
        while !matches!(sim.step().unwrap(), crate::engine::StepOutcome::Completed) {}

        let report = SimulationReport::summarize(&sim);
        assert_eq!(report.algorithm, "First Fit");
        assert_eq!(report.total_processes, 4);
        assert_eq!(report.allocated_processes, 3);
        assert_eq!(report.failed_processes, 1);
        assert_eq!(report.total_partitions, 5);
        assert_eq!(report.free_partitions, 2);
        assert_eq!(report.total_capacity_kb, 1700);
        // 212 + 417 + 112 in blocks of 500 + 600 + 200
        assert_eq!(report.used_kb, 741);
        assert_eq!(report.internal_fragmentation_kb, 288 + 183 + 88);
    }

    #[test]
    fn test_report_on_fresh_state() {
        let sim = Simulation::new(Algorithm::BestFit);
        let report = SimulationReport::summarize(&sim);
        assert_eq!(report.total_processes, 0);
        assert_eq!(report.total_capacity_kb, 0);
        assert_eq!(report.internal_fragmentation_kb, 0);
    }
}
