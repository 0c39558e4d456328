//! Grid fluid solver module
//!
//! The pipeline is built from small data-parallel stages, each a public
//! function over plain slices so it can be exercised on its own:
//!
//! - [`source`]: pointer-driven velocity impulses and density splats
//! - [`boundary`]: border conditions (reflect, clear, mirror)
//! - [`jacobi`]: relaxation sweeps for diffusion and the pressure solve
//! - [`advection`]: semi-Lagrangian transport with dissipation
//! - [`projection`]: divergence removal
//!
//! Every stage launches its kernels through a [`Dispatcher`], which wraps a
//! [`ComputeBackend`] and records per-kernel statistics. Stencil stages
//! ping-pong between the named field and the shared scratch buffer and leave
//! scratch zeroed when they return.
//!
//! # Backend Selection
//!
//! `create_field_solver` picks the backend from [`FluidConfig::execution`]:
//! row-parallel kernels on Rayon by default, or everything on the calling
//! thread for deterministic debugging.
//!
//! # Example
//!
//! ```rust,ignore
//! use fluid_sim_core::solver::create_field_solver;
//! use fluid_sim_core::{FluidConfig, ForcingFrame};
//!
//! let mut solver = create_field_solver(FluidConfig::default())?;
//! solver.step(&ForcingFrame::idle());
//! ```
pub mod advection;
pub mod boundary;
pub mod dispatch;
mod fields;
mod fluid;
pub mod jacobi;
pub mod ping_pong;
pub mod profiler;
pub mod projection;
pub mod source;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

// Re-exports
pub use advection::{advect, self_advect};
pub use boundary::{enforce, BoundaryCondition};
pub use dispatch::{ComputeBackend, Dispatcher, KernelId, RayonBackend, SerialBackend};
pub use fields::{Field, FieldStore, ScratchField};
pub use fluid::FluidSolver;
pub use jacobi::{diffuse, relax, RelaxFactors};
pub use ping_pong::{PingPong, Slot};
pub use profiler::{FrameTimer, KernelProfiler, KernelStats, ProfilerScope};
pub use projection::{compute_divergence, project};
pub use r#trait::FieldSolver;
pub use source::inject;

use crate::config::{ExecutionMode, FluidConfig};
use crate::error::FluidError;
use tracing::info;

/// Create a field solver with the backend selected by `config.execution`
///
/// # Errors
///
/// Returns `FluidError::InvalidConfig` if `config` fails validation and
/// `FluidError::Allocation` if the fields cannot be allocated.
pub fn create_field_solver(config: FluidConfig) -> Result<Box<dyn FieldSolver>, FluidError> {
    match config.execution {
        ExecutionMode::Parallel => {
            info!(
                "Using Rayon backend ({} threads)",
                rayon::current_num_threads()
            );
            Ok(Box::new(FluidSolver::with_backend(config, RayonBackend)?))
        }
        ExecutionMode::Serial => {
            info!("Using serial backend");
            Ok(Box::new(FluidSolver::with_backend(config, SerialBackend)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_honors_execution_mode() {
        let config = FluidConfig {
            simulation_resolution: 8,
            render_resolution: 8,
            execution: ExecutionMode::Serial,
            ..FluidConfig::default()
        };
        let solver = create_field_solver(config.clone()).expect("serial solver");
        assert!(!solver.is_parallel());
        assert_eq!(solver.resolution(), 8);
        assert_eq!(solver.grid_scale(), 1.0);

        let config = FluidConfig {
            execution: ExecutionMode::Parallel,
            ..config
        };
        let solver = create_field_solver(config).expect("parallel solver");
        assert!(solver.is_parallel());
    }

    #[test]
    fn test_factory_rejects_tiny_grid() {
        let config = FluidConfig {
            simulation_resolution: 2,
            ..FluidConfig::default()
        };
        assert!(create_field_solver(config).is_err());
    }
}
