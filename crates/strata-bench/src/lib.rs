//! Benchmark workloads for the strata containers.
//!
//! Provides pre-built [`Workload`] profiles shared by the criterion benches:
//!
//! - [`reference_profile`]: 10K elements in default-sized deque blocks
//! - [`stress_profile`]: 1M elements, same block budget
//! - [`probe_indices`]: deterministic random-access index sequence via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata::prelude::*;

/// Shape of a benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Workload {
    /// Number of elements pushed.
    pub len: usize,
    /// Deque block budget.
    pub config: DequeConfig,
    /// Number of random-access probes per iteration.
    pub probes: usize,
}

impl Workload {
    /// A `DynArray` holding `0..len`.
    pub fn filled_array(&self) -> DynArray<u64> {
        (0..self.len as u64).collect()
    }

    /// A `ChunkedDeque` holding `0..len` with this workload's block budget.
    pub fn filled_deque(&self) -> ChunkedDeque<u64> {
        let mut d = ChunkedDeque::with_config(self.config);
        d.extend(0..self.len as u64);
        d
    }
}

/// Reference workload: 10K elements, default block budget.
pub fn reference_profile() -> Workload {
    Workload {
        len: 10_000,
        config: DequeConfig::default(),
        probes: 1_000,
    }
}

/// Stress workload: 1M elements, default block budget.
pub fn stress_profile() -> Workload {
    Workload {
        len: 1_000_000,
        config: DequeConfig::default(),
        probes: 10_000,
    }
}

/// Deterministic pseudo-random indices in `0..len`.
///
/// Same `(len, n, seed)` always yields the same sequence.
pub fn probe_indices(len: usize, n: usize, seed: u64) -> Vec<usize> {
    assert!(len > 0, "cannot probe an empty container");
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % len as u64) as usize
        })
        .collect()
}
