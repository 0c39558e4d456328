//! Kernel dispatch
//!
//! Every stage of the pipeline is a data-parallel kernel over the grid: one
//! logical worker per cell, no ordering between cells inside a launch, and a
//! hard synchronization point between launches. [`ComputeBackend`] is the
//! seam where the execution strategy plugs in; [`Dispatcher`] wraps a backend
//! and keeps per-kernel launch statistics.
//!
//! Kernels receive `(x, y, &mut out_cell)` and may only write their own
//! output cell. Reads of neighbors must come from a different buffer.

use super::profiler::{KernelProfiler, KernelStats, ProfilerScope};
use crate::core_types::GridExtent;
use rayon::prelude::*;
use serde::Serialize;
use tracing::trace;

/// Identifier of every kernel the pipeline launches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KernelId {
    /// Pointer-driven velocity impulse
    AddVelocity,
    /// Pointer-driven density splat
    AddDensity,
    /// Border reflection / clearing / mirroring
    Boundary,
    /// One Jacobi relaxation sweep
    Jacobi,
    /// Central-difference divergence of velocity
    Divergence,
    /// Pressure gradient subtraction
    SubtractGradient,
    /// Semi-Lagrangian advection
    Advect,
    /// Buffer copy
    Copy,
    /// Buffer clear
    Clear,
}

impl KernelId {
    /// Every kernel, in pipeline order
    pub const ALL: [Self; 9] = [
        Self::AddVelocity,
        Self::AddDensity,
        Self::Boundary,
        Self::Jacobi,
        Self::Divergence,
        Self::SubtractGradient,
        Self::Advect,
        Self::Copy,
        Self::Clear,
    ];

    /// Stable kernel name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddVelocity => "add_velocity",
            Self::AddDensity => "add_density",
            Self::Boundary => "boundary",
            Self::Jacobi => "jacobi",
            Self::Divergence => "divergence",
            Self::SubtractGradient => "subtract_gradient",
            Self::Advect => "advect",
            Self::Copy => "copy",
            Self::Clear => "clear",
        }
    }
}

/// Execution strategy for per-cell kernels
///
/// Implementations must run `cell` exactly once for every cell of `extent`
/// and must not return until every write is visible to the caller.
pub trait ComputeBackend: Send + Sync {
    /// Run `cell(x, y, &mut out[y * width + x])` for every cell of `extent`
    fn run_kernel<T, F>(&self, kernel: KernelId, extent: GridExtent, out: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Send + Sync;

    /// Backend name used in logs
    fn name(&self) -> &'static str;

    /// True if kernels run on more than one thread
    fn is_parallel(&self) -> bool;
}

/// Row-parallel backend on the Rayon thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonBackend;

impl ComputeBackend for RayonBackend {
    fn run_kernel<T, F>(&self, _kernel: KernelId, extent: GridExtent, out: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Send + Sync,
    {
        debug_assert_eq!(out.len(), extent.cells());
        out.par_chunks_mut(extent.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, value) in row.iter_mut().enumerate() {
                    cell(x, y, value);
                }
            });
    }

    fn name(&self) -> &'static str {
        "rayon"
    }

    fn is_parallel(&self) -> bool {
        true
    }
}

/// Single-threaded backend
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn run_kernel<T, F>(&self, _kernel: KernelId, extent: GridExtent, out: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Send + Sync,
    {
        debug_assert_eq!(out.len(), extent.cells());
        for (y, row) in out.chunks_mut(extent.width).enumerate() {
            for (x, value) in row.iter_mut().enumerate() {
                cell(x, y, value);
            }
        }
    }

    fn name(&self) -> &'static str {
        "serial"
    }

    fn is_parallel(&self) -> bool {
        false
    }
}

/// Backend plus launch bookkeeping
///
/// All kernel launches in the pipeline go through a dispatcher so launch
/// counts and timings are recorded uniformly.
#[derive(Debug, Default)]
pub struct Dispatcher<B: ComputeBackend> {
    backend: B,
    profiler: KernelProfiler,
}

impl<B: ComputeBackend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            profiler: KernelProfiler::new(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Launch a per-cell kernel over the whole grid
    pub fn run_kernel<T, F>(&mut self, kernel: KernelId, extent: GridExtent, out: &mut [T], cell: F)
    where
        T: Send,
        F: Fn(usize, usize, &mut T) + Send + Sync,
    {
        let scope = ProfilerScope::new(kernel.name());
        self.backend.run_kernel(kernel, extent, out, cell);
        let elapsed = scope.elapsed_ms();
        trace!(
            "kernel {} on {} over {}x{}",
            kernel.name(),
            self.backend.name(),
            extent.width,
            extent.height
        );
        self.profiler.record(kernel, elapsed);
    }

    /// Run a kernel body on the calling thread, recording it like any launch
    ///
    /// Used for border-only kernels, which touch `O(width + height)` cells.
    pub fn run_inline<R>(&mut self, kernel: KernelId, body: impl FnOnce() -> R) -> R {
        let scope = ProfilerScope::new(kernel.name());
        let result = body();
        self.profiler.record(kernel, scope.elapsed_ms());
        result
    }

    /// Copy `src` into `dst` cell by cell
    pub fn copy<T>(&mut self, extent: GridExtent, src: &[T], dst: &mut [T])
    where
        T: Copy + Send + Sync,
    {
        self.run_kernel(KernelId::Copy, extent, dst, |x, y, out| {
            *out = src[extent.index(x, y)];
        });
    }

    /// Set every cell of `buffer` to `value`
    pub fn clear<T>(&mut self, extent: GridExtent, buffer: &mut [T], value: T)
    where
        T: Copy + Send + Sync,
    {
        self.run_kernel(KernelId::Clear, extent, buffer, |_, _, out| *out = value);
    }

    #[must_use]
    pub fn stats(&self, kernel: KernelId) -> KernelStats {
        self.profiler.get(kernel)
    }

    #[must_use]
    pub fn profiler(&self) -> &KernelProfiler {
        &self.profiler
    }
}
