//! Stable-fluids solver
//!
//! `FluidSolver` owns the field store and a kernel dispatcher and sequences
//! the pipeline stages into one velocity step and one density step per frame.
//! The stage order is load-bearing: diffusion perturbs divergence so it runs
//! before projection, advection transports an already projected field, and
//! the second projection removes the divergence self-advection reintroduces.

use super::advection;
use super::boundary::{enforce_condition, BoundaryCondition};
use super::dispatch::{ComputeBackend, Dispatcher, KernelId, RayonBackend};
use super::fields::FieldStore;
use super::jacobi;
use super::profiler::KernelStats;
use super::projection;
use super::source;
use super::FieldSolver;
use crate::config::FluidConfig;
use crate::core_types::{Flow, GridExtent, Rgba};
use crate::error::FluidError;
use crate::forcing::ForcingFrame;
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Grid fluid solver running its kernels on backend `B`
pub struct FluidSolver<B: ComputeBackend = RayonBackend> {
    fields: FieldStore,
    dispatcher: Dispatcher<B>,
    config: FluidConfig,
    // Fixed at construction; reconfigure never changes either resolution
    grid_scale: f32,
    frames: u64,
}

impl FluidSolver<RayonBackend> {
    /// Create a solver on the Rayon thread pool
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `config` fails validation and
    /// `FluidError::Allocation` if the fields cannot be allocated.
    pub fn new(config: FluidConfig) -> Result<Self, FluidError> {
        Self::with_backend(config, RayonBackend)
    }
}

impl<B: ComputeBackend> FluidSolver<B> {
    /// Create a solver running its kernels on `backend`
    ///
    /// # Errors
    ///
    /// Same as [`FluidSolver::new`].
    pub fn with_backend(config: FluidConfig, backend: B) -> Result<Self, FluidError> {
        config.validate()?;
        let fields = FieldStore::allocate(config.simulation_resolution)?;
        let grid_scale = config.grid_scale();
        info!(
            "Created fluid solver: {}x{} grid, render {}, grid scale {:.3}, {} backend",
            config.simulation_resolution,
            config.simulation_resolution,
            config.render_resolution,
            grid_scale,
            backend.name()
        );
        Ok(Self {
            fields,
            dispatcher: Dispatcher::new(backend),
            config,
            grid_scale,
            frames: 0,
        })
    }

    #[must_use]
    pub fn extent(&self) -> GridExtent {
        self.fields.extent()
    }

    #[must_use]
    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    /// Mutable field access, for seeding initial conditions
    pub fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.fields
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    /// Release every field
    pub fn dispose(self) {
        info!(
            "Disposing fluid solver after {} frames ({} kernel launches)",
            self.frames,
            self.dispatcher.profiler().total_launches()
        );
        self.fields.dispose();
    }

    /// Project the current velocity field towards zero divergence
    fn project_velocity(&mut self) {
        let extent = self.fields.extent();
        projection::project(
            &mut self.dispatcher,
            self.fields.velocity.as_mut_slice(),
            self.fields.divergence.as_mut_slice(),
            self.fields.pressure.as_mut_slice(),
            &mut self.fields.scratch,
            extent,
            self.grid_scale,
            self.config.solver_iterations,
        );
    }

    fn reflect_velocity(&mut self) {
        let extent = self.fields.extent();
        enforce_condition(
            &mut self.dispatcher,
            self.fields.velocity.as_mut_slice(),
            extent,
            BoundaryCondition::Reflect,
        );
    }

    fn clear_density_border(&mut self) {
        let extent = self.fields.extent();
        enforce_condition(
            &mut self.dispatcher,
            self.fields.density.as_mut_slice(),
            extent,
            BoundaryCondition::Clear,
        );
    }
}

impl<B: ComputeBackend> FieldSolver for FluidSolver<B> {
    fn velocity_step(&mut self, frame: &ForcingFrame) {
        let extent = self.fields.extent();
        let config = &self.config;

        source::inject_velocity(
            &mut self.dispatcher,
            self.fields.velocity.as_mut_slice(),
            extent,
            frame.current,
            frame.previous,
            frame.velocity_pressed,
            config.velocity_effect_radius,
            config.velocity_falloff,
            config.velocity_multiplier,
        );
        self.reflect_velocity();

        jacobi::diffuse(
            &mut self.dispatcher,
            self.fields.velocity.as_mut_slice(),
            self.fields.scratch.view_mut::<Flow>(),
            extent,
            self.config.viscosity,
            self.config.delta_time,
            self.config.solver_iterations,
        );
        self.reflect_velocity();
        self.project_velocity();

        advection::self_advect(
            &mut self.dispatcher,
            self.fields.velocity.as_mut_slice(),
            self.fields.scratch.view_mut::<Flow>(),
            extent,
            self.config.delta_time,
            self.config.velocity_dissipation,
        );
        self.reflect_velocity();
        self.project_velocity();
    }

    fn density_step(&mut self, frame: &ForcingFrame) {
        let extent = self.fields.extent();
        let config = &self.config;

        source::inject_density(
            &mut self.dispatcher,
            self.fields.density.as_mut_slice(),
            extent,
            frame.current,
            frame.color,
            frame.density_pressed,
            config.density_effect_radius,
            config.density_falloff,
        );
        self.clear_density_border();

        jacobi::diffuse(
            &mut self.dispatcher,
            self.fields.density.as_mut_slice(),
            self.fields.scratch.view_mut::<Rgba>(),
            extent,
            self.config.viscosity,
            self.config.delta_time,
            self.config.solver_iterations,
        );
        self.clear_density_border();

        advection::advect(
            &mut self.dispatcher,
            self.fields.density.as_mut_slice(),
            self.fields.velocity.as_slice(),
            self.fields.scratch.view_mut::<Rgba>(),
            extent,
            self.config.delta_time,
            self.config.density_dissipation,
        );
        self.clear_density_border();
    }

    fn step(&mut self, frame: &ForcingFrame) {
        self.velocity_step(frame);
        self.density_step(frame);
        self.frames += 1;
        debug!(
            "Frame {} complete ({} kernel launches so far)",
            self.frames,
            self.dispatcher.profiler().total_launches()
        );
    }

    fn read_density(&self) -> Cow<'_, [Rgba]> {
        Cow::Borrowed(self.fields.density.as_slice())
    }

    fn read_velocity(&self) -> Cow<'_, [Flow]> {
        Cow::Borrowed(self.fields.velocity.as_slice())
    }

    fn read_pressure(&self) -> Cow<'_, [f32]> {
        Cow::Borrowed(self.fields.pressure.as_slice())
    }

    fn resolution(&self) -> usize {
        self.fields.resolution()
    }

    fn grid_scale(&self) -> f32 {
        self.grid_scale
    }

    fn is_parallel(&self) -> bool {
        self.dispatcher.backend().is_parallel()
    }

    fn config(&self) -> &FluidConfig {
        &self.config
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn reconfigure(&mut self, config: &FluidConfig) -> Result<(), FluidError> {
        config.validate()?;
        if config.simulation_resolution != self.config.simulation_resolution {
            return Err(FluidError::ResolutionChange {
                param: "simulation_resolution",
                current: self.config.simulation_resolution,
                requested: config.simulation_resolution,
            });
        }
        if config.render_resolution != self.config.render_resolution {
            return Err(FluidError::ResolutionChange {
                param: "render_resolution",
                current: self.config.render_resolution,
                requested: config.render_resolution,
            });
        }
        if config.execution != self.config.execution {
            warn!(
                "Execution mode {:?} ignored on a live {} solver",
                config.execution,
                self.dispatcher.backend().name()
            );
        }
        let execution = self.config.execution;
        self.config = config.clone();
        self.config.execution = execution;
        info!(
            "Reconfigured fluid solver: viscosity {}, dt {}, {} iterations",
            self.config.viscosity, self.config.delta_time, self.config.solver_iterations
        );
        Ok(())
    }

    fn kernel_stats(&self) -> Vec<(KernelId, KernelStats)> {
        self.dispatcher.profiler().snapshot()
    }

    fn scratch_is_clear(&self) -> bool {
        self.fields.scratch.is_clear()
    }
}
