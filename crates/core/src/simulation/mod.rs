//! Interactive fluid simulation
//!
//! `FluidSimulation` is what a host drives once per displayed frame. It
//! combines:
//! - a boxed [`FieldSolver`] running the velocity and density steps
//! - the pointer history that turns pointer positions into impulses
//! - the drifting density color
//!
//! and produces a display image at render resolution on demand.

use crate::config::FluidConfig;
use crate::core_types::{Cell, Rgba};
use crate::error::FluidError;
use crate::forcing::{ForcingFrame, ForcingState, PointerInput};
use crate::palette::DensityColorCycler;
use crate::solver::{create_field_solver, FieldSolver, FrameTimer, ProfilerScope};
use crate::visualize;
use serde::Serialize;
use tracing::debug;

/// Summary of the simulation state after a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    /// Completed frames
    pub frame: u64,
    /// Sum of every density channel over the grid
    pub total_density: f32,
    /// Largest cell speed in the velocity field
    pub peak_speed: f32,
    /// Kernel launches since the solver was created
    pub kernel_launches: u64,
    /// Wall time of the last `update`, in milliseconds
    pub last_frame_ms: f64,
}

/// Pointer-driven fluid simulation
pub struct FluidSimulation {
    solver: Box<dyn FieldSolver>,
    forcing: ForcingState,
    colors: DensityColorCycler,
    timer: FrameTimer,
}

impl FluidSimulation {
    /// Create a simulation with the backend chosen by `config.execution`
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `config` fails validation and
    /// `FluidError::Allocation` if the fields cannot be allocated.
    pub fn new(config: FluidConfig) -> Result<Self, FluidError> {
        Ok(Self::from_solver(
            create_field_solver(config)?,
            DensityColorCycler::default(),
        ))
    }

    /// Like [`FluidSimulation::new`] with a seeded color sequence
    ///
    /// # Errors
    ///
    /// Same as [`FluidSimulation::new`].
    pub fn with_seed(config: FluidConfig, seed: u64) -> Result<Self, FluidError> {
        Ok(Self::from_solver(
            create_field_solver(config)?,
            DensityColorCycler::seeded(seed),
        ))
    }

    /// Wrap an existing solver
    #[must_use]
    pub fn from_solver(solver: Box<dyn FieldSolver>, colors: DensityColorCycler) -> Self {
        Self {
            solver,
            forcing: ForcingState::new(),
            colors,
            timer: FrameTimer::new(),
        }
    }

    /// Run one frame: update the color, build the forcing, step the solver
    ///
    /// `frame_dt` is the host's wall-clock frame time in seconds and only
    /// drives the color drift; the solver advances by its configured
    /// `delta_time` every frame.
    pub fn update(&mut self, input: &PointerInput, frame_dt: f32) -> ForcingFrame {
        let scope = ProfilerScope::new("frame");
        let color = self.colors.update(frame_dt);
        let frame = self.forcing.advance(input, color);
        self.solver.step(&frame);
        self.timer.record(scope.elapsed_ms());
        debug!(
            "Frame {} took {:.2}ms",
            self.solver.frame_count(),
            self.timer.last_frame_time_ms()
        );
        frame
    }

    /// Density upsampled to render resolution as RGBA8
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let config = self.solver.config();
        visualize::render_density(
            &self.solver.read_density(),
            config.simulation_resolution,
            config.render_resolution,
        )
    }

    /// Velocity upsampled to render resolution as RGBA8, for debugging
    #[must_use]
    pub fn render_velocity(&self) -> Vec<u8> {
        let config = self.solver.config();
        visualize::render_velocity(
            &self.solver.read_velocity(),
            config.simulation_resolution,
            config.render_resolution,
        )
    }

    #[must_use]
    pub fn stats(&self) -> SimulationStats {
        let density = self.solver.read_density();
        let velocity = self.solver.read_velocity();
        SimulationStats {
            frame: self.solver.frame_count(),
            total_density: density.iter().map(Rgba::component_sum).sum(),
            peak_speed: velocity.iter().map(|f| f.speed()).fold(0.0, f32::max),
            kernel_launches: self
                .solver
                .kernel_stats()
                .iter()
                .map(|(_, stats)| stats.launches)
                .sum(),
            last_frame_ms: self.timer.last_frame_time_ms(),
        }
    }

    /// Apply new scalar parameters to the running solver
    ///
    /// # Errors
    ///
    /// See [`FieldSolver::reconfigure`].
    pub fn reconfigure(&mut self, config: &FluidConfig) -> Result<(), FluidError> {
        self.solver.reconfigure(config)
    }

    /// Current injection color
    #[must_use]
    pub fn density_color(&self) -> Rgba {
        self.colors.current()
    }

    #[must_use]
    pub fn solver(&self) -> &dyn FieldSolver {
        self.solver.as_ref()
    }

    pub fn solver_mut(&mut self) -> &mut dyn FieldSolver {
        self.solver.as_mut()
    }
}
