//! Placement policies for partition selection
//!
//! All four algorithms restrict candidates to free partitions with
//! `capacity_kb >= request_kb`. Every function here is pure: the driver
//! commits the chosen index and maintains the next-fit cursor itself.

use partsim_core::{Algorithm, Partition};

/// Select a target partition index for a request of `request_kb`.
///
/// Returns `None` when no partition currently qualifies; that outcome is
/// expected and frequent, not an error.
pub fn select_partition(
    partitions: &[Partition],
    request_kb: u32,
    algorithm: Algorithm,
    next_fit_cursor: usize,
) -> Option<usize> {
    match algorithm {
        Algorithm::FirstFit => first_fit(partitions, request_kb),
        Algorithm::BestFit => best_fit(partitions, request_kb),
        Algorithm::WorstFit => worst_fit(partitions, request_kb),
        Algorithm::NextFit => next_fit(partitions, request_kb, next_fit_cursor),
    }
}

fn qualifies(partition: &Partition, request_kb: u32) -> bool {
    partition.is_free() && partition.capacity_kb >= request_kb
}

/// First qualifying partition in sequence order
pub fn first_fit(partitions: &[Partition], request_kb: u32) -> Option<usize> {
    partitions.iter().position(|p| qualifies(p, request_kb))
}

/// Qualifying partition with the smallest leftover; earliest index on ties
pub fn best_fit(partitions: &[Partition], request_kb: u32) -> Option<usize> {
    let mut best_diff = u32::MAX;
    let mut candidate = None;
    for (index, partition) in partitions.iter().enumerate() {
        if qualifies(partition, request_kb) {
            let diff = partition.capacity_kb - request_kb;
            // Strict comparison: later equal leftovers never replace the first
            if diff < best_diff {
                best_diff = diff;
                candidate = Some(index);
            }
        }
    }
    candidate
}

/// Qualifying partition with the largest leftover; earliest index on ties
pub fn worst_fit(partitions: &[Partition], request_kb: u32) -> Option<usize> {
    let mut worst_diff = None;
    let mut candidate = None;
    for (index, partition) in partitions.iter().enumerate() {
        if qualifies(partition, request_kb) {
            let diff = partition.capacity_kb - request_kb;
            if worst_diff.map_or(true, |w| diff > w) {
                worst_diff = Some(diff);
                candidate = Some(index);
            }
        }
    }
    candidate
}

/// Length-bounded circular scan starting at `cursor` inclusive.
///
/// The probe restarts at the last successfully used index, not the one
/// after it.
pub fn next_fit(partitions: &[Partition], request_kb: u32, cursor: usize) -> Option<usize> {
    let len = partitions.len();
    if len == 0 {
        return None;
    }
    for probe in 0..len {
        let index = (cursor + probe) % len;
        if qualifies(&partitions[index], request_kb) {
            return Some(index);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsim_core::Process;

    fn partitions(capacities: &[u32]) -> Vec<Partition> {
        capacities
            .iter()
            .enumerate()
            .map(|(i, &cap)| Partition::new(i as u32 + 1, cap).unwrap())
            .collect()
    }

    fn occupy(parts: &mut [Partition], index: usize) {
        let mut proc = Process::new(99, 1).unwrap();
        proc.allocated = true;
        proc.assigned_partition = Some(parts[index].id);
        parts[index].occupant = Some(proc);
    }

    #[test]
    fn test_first_fit_returns_minimum_qualifying_index() {
        let parts = partitions(&[100, 500, 200, 300, 600]);
        assert_eq!(first_fit(&parts, 212), Some(1));
        assert_eq!(first_fit(&parts, 50), Some(0));
        assert_eq!(first_fit(&parts, 600), Some(4));
    }

    #[test]
    fn test_first_fit_skips_occupied() {
        let mut parts = partitions(&[100, 500, 200, 300, 600]);
        occupy(&mut parts, 1);
        assert_eq!(first_fit(&parts, 212), Some(3));
    }

    #[test]
    fn test_best_fit_minimizes_leftover() {
        let parts = partitions(&[100, 500, 200, 300, 600]);
        // 212 fits in 500 (288), 300 (88), 600 (388) -> 300 at index 3
        assert_eq!(best_fit(&parts, 212), Some(3));
        // exact fit is eligible and preferred
        assert_eq!(best_fit(&parts, 200), Some(2));
    }

    #[test]
    fn test_best_fit_tie_breaks_to_earliest_index() {
        let parts = partitions(&[300, 300, 300]);
        assert_eq!(best_fit(&parts, 100), Some(0));
    }

    #[test]
    fn test_worst_fit_maximizes_leftover() {
        let parts = partitions(&[100, 500, 200, 300, 600]);
        assert_eq!(worst_fit(&parts, 212), Some(4));
        assert_eq!(worst_fit(&parts, 550), Some(4));
    }

    #[test]
    fn test_worst_fit_tie_breaks_to_earliest_index() {
        let parts = partitions(&[400, 400, 100]);
        assert_eq!(worst_fit(&parts, 50), Some(0));
    }

    #[test]
    fn test_next_fit_probes_from_cursor_inclusive() {
        let parts = partitions(&[100, 500, 200, 300, 600]);
        // Cursor on a qualifying index: it wins immediately
        assert_eq!(next_fit(&parts, 212, 1), Some(1));
        // Cursor past the last qualifier: wraps around
        assert_eq!(next_fit(&parts, 550, 0), Some(4));
        assert_eq!(next_fit(&parts, 212, 4), Some(4));
    }

    #[test]
    fn test_next_fit_wraps_exactly_once() {
        let mut parts = partitions(&[100, 500, 200, 300, 600]);
        occupy(&mut parts, 4);
        // From 4, only wrap candidates remain; 500 at index 1 is first in probe order
        assert_eq!(next_fit(&parts, 212, 4), Some(1));
        // Nothing qualifies: scan terminates after len probes
        assert_eq!(next_fit(&parts, 700, 2), None);
    }

    #[test]
    fn test_next_fit_never_skips_an_earlier_probe() {
        let parts = partitions(&[300, 300, 300, 300]);
        for cursor in 0..parts.len() {
            let chosen = next_fit(&parts, 100, cursor).unwrap();
            // With every partition qualifying, the probe start itself wins
            assert_eq!(chosen, cursor);
        }
    }

    #[test]
    fn test_empty_and_oversized_requests() {
        let empty: Vec<Partition> = Vec::new();
        for algo in Algorithm::ALL {
            assert_eq!(select_partition(&empty, 100, algo, 0), None);
        }

        let parts = partitions(&[100, 500, 200]);
        for algo in Algorithm::ALL {
            assert_eq!(select_partition(&parts, 501, algo, 0), None);
        }
    }

    #[test]
    fn test_choices_match_brute_force() {
        let mut parts = partitions(&[300, 150, 600, 150, 450, 300]);
        occupy(&mut parts, 2);
        occupy(&mut parts, 3);

        for request in [1, 100, 150, 151, 300, 301, 450, 700] {
            let qualifying: Vec<usize> = parts
                .iter()
                .enumerate()
                .filter(|(_, p)| qualifies(p, request))
                .map(|(i, _)| i)
                .collect();

            assert_eq!(first_fit(&parts, request), qualifying.first().copied());
            assert_eq!(
                best_fit(&parts, request),
                qualifying
                    .iter()
                    .copied()
                    .min_by_key(|&i| (parts[i].capacity_kb - request, i))
            );
            assert_eq!(
                worst_fit(&parts, request),
                qualifying
                    .iter()
                    .copied()
                    .min_by_key(|&i| (u32::MAX - (parts[i].capacity_kb - request), i))
            );
        }
    }

    #[test]
    fn test_cursor_beyond_length_is_reduced() {
        let parts = partitions(&[100, 500, 200]);
        // Stale cursor from a previous run with more partitions
        assert_eq!(next_fit(&parts, 150, 7), Some(1));
    }
}
