/// Performance profiling helpers for tracking kernel and frame timing.
///
/// Provides RAII-style profiling scopes and per-kernel launch statistics.
use super::dispatch::KernelId;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Instant;
use tracing::trace;

/// A profiling scope that measures elapsed time using RAII.
///
/// Time is logged at `trace` level when dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!("{} took {:.3}ms", self.name, self.elapsed_ms());
    }
}

/// Accumulated statistics for one kernel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KernelStats {
    /// Number of launches since the solver was created
    pub launches: u64,
    /// Total time spent in the kernel, in milliseconds
    pub total_ms: f64,
}

/// Per-kernel launch counters
#[derive(Debug, Default)]
pub struct KernelProfiler {
    stats: FxHashMap<KernelId, KernelStats>,
}

impl KernelProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one launch of `kernel`
    pub fn record(&mut self, kernel: KernelId, elapsed_ms: f64) {
        let entry = self.stats.entry(kernel).or_default();
        entry.launches += 1;
        entry.total_ms += elapsed_ms;
    }

    /// Statistics for one kernel (zero if it never ran)
    pub fn get(&self, kernel: KernelId) -> KernelStats {
        self.stats.get(&kernel).copied().unwrap_or_default()
    }

    /// Launches across all kernels
    pub fn total_launches(&self) -> u64 {
        self.stats.values().map(|s| s.launches).sum()
    }

    /// Snapshot of every kernel's statistics, in `KernelId::ALL` order
    pub fn snapshot(&self) -> Vec<(KernelId, KernelStats)> {
        KernelId::ALL
            .iter()
            .map(|&kernel| (kernel, self.get(kernel)))
            .collect()
    }
}

/// Simple frame timer for tracking simulation performance.
pub struct FrameTimer {
    last_frame_time_ms: f64,
}

impl FrameTimer {
    /// Creates a new frame timer.
    pub fn new() -> Self {
        Self {
            last_frame_time_ms: 0.0,
        }
    }

    /// Records frame time in milliseconds.
    pub fn record(&mut self, time_ms: f64) {
        self.last_frame_time_ms = time_ms;
    }

    /// Gets the last recorded frame time.
    pub fn last_frame_time_ms(&self) -> f64 {
        self.last_frame_time_ms
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
