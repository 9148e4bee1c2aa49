//! Synthetic workload generation for the CLI

use partsim_core::{ConfigError, Process};
use rand::Rng;

/// Generate `count` random processes with sizes in `min_kb..=max_kb`.
///
/// Ids are 1-based queue positions, matching the engine's renumbering
/// scheme.
pub fn random_processes(
    count: usize,
    min_kb: u32,
    max_kb: u32,
) -> Result<Vec<Process>, ConfigError> {
    if min_kb == 0 {
        return Err(ConfigError::InvalidSize(min_kb));
    }
    if max_kb < min_kb {
        return Err(ConfigError::InvalidSize(max_kb));
    }

    let mut rng = rand::thread_rng();
    (1..=count)
        .map(|i| Process::new(i as u32, rng.gen_range(min_kb..=max_kb)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_processes_sizes_in_range() {
        let procs = random_processes(50, 64, 512).unwrap();
        assert_eq!(procs.len(), 50);
        for (i, proc) in procs.iter().enumerate() {
            assert_eq!(proc.id, i as u32 + 1);
            assert!((64..=512).contains(&proc.size_kb));
            assert!(!proc.allocated);
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(random_processes(5, 0, 100).is_err());
        assert!(random_processes(5, 200, 100).is_err());
    }
}
