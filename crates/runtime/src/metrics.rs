use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Cycles kept for percentile reporting, about ten minutes at the default
/// decision cadence.
pub const DEFAULT_LATENCY_WINDOW: usize = 4_096;

/// Nearest-rank summary of the cycles currently in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyPercentiles {
    pub samples: usize,
    pub mean_micros: u64,
    pub p50_micros: u64,
    pub p90_micros: u64,
    pub p99_micros: u64,
    pub max_micros: u64,
}

/// Wall-clock cost of the most recent decision cycles.
///
/// Holds at most `capacity` samples; older cycles fall out of the window but
/// still count towards [`CycleLatency::recorded`].
#[derive(Debug, Clone)]
pub struct CycleLatency {
    window: VecDeque<u64>,
    capacity: usize,
    recorded: u64,
}

impl Default for CycleLatency {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LATENCY_WINDOW)
    }
}

impl CycleLatency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            recorded: 0,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.record_micros(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));
    }

    pub fn record_micros(&mut self, micros: u64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(micros);
        self.recorded += 1;
    }

    /// Every cycle ever recorded, including those evicted from the window.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn percentiles(&self) -> Option<LatencyPercentiles> {
        let samples = self.window.len();
        if samples == 0 {
            return None;
        }

        let mut sorted: Vec<u64> = self.window.iter().copied().collect();
        sorted.sort_unstable();
        let total: u128 = sorted.iter().map(|&micros| u128::from(micros)).sum();
        let mean_micros = u64::try_from(total / samples as u128).unwrap_or(u64::MAX);

        Some(LatencyPercentiles {
            samples,
            mean_micros,
            p50_micros: nearest_rank(&sorted, 50),
            p90_micros: nearest_rank(&sorted, 90),
            p99_micros: nearest_rank(&sorted, 99),
            max_micros: sorted[samples - 1],
        })
    }
}

/// `sorted` must be non-empty and ascending.
fn nearest_rank(sorted: &[u64], percentile: usize) -> u64 {
    let rank = (percentile * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}
