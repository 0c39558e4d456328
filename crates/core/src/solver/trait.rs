//! Field solver trait definition
//!
//! This module defines the `FieldSolver` trait, the backend-agnostic
//! interface hosts drive once per frame. Every solver owns its fields for its
//! whole lifetime; the trait only exposes stepping, read-back of the
//! simulated fields, and live reconfiguration of scalar parameters.

use super::dispatch::KernelId;
use super::profiler::KernelStats;
use crate::config::FluidConfig;
use crate::core_types::{Flow, Rgba};
use crate::error::FluidError;
use crate::forcing::ForcingFrame;
use std::borrow::Cow;

/// Backend-agnostic interface for a grid fluid solver
pub trait FieldSolver: Send + Sync {
    /// Advance the velocity field by one frame
    ///
    /// inject → reflect borders → diffuse → reflect borders → project →
    /// self-advect → reflect borders → project
    fn velocity_step(&mut self, frame: &ForcingFrame);

    /// Advance the density field by one frame through the current velocity
    ///
    /// inject → clear borders → diffuse → clear borders → advect → clear borders
    fn density_step(&mut self, frame: &ForcingFrame);

    /// Run [`velocity_step`](Self::velocity_step) then
    /// [`density_step`](Self::density_step) and count the frame
    fn step(&mut self, frame: &ForcingFrame);

    /// Read the density field (row-major, one `Rgba` per cell)
    fn read_density(&self) -> Cow<'_, [Rgba]>;

    /// Read the velocity field (row-major)
    fn read_velocity(&self) -> Cow<'_, [Flow]>;

    /// Read the pressure field kept as the warm start for the next solve
    fn read_pressure(&self) -> Cow<'_, [f32]>;

    /// Simulation grid size in cells along each axis
    fn resolution(&self) -> usize;

    /// Ratio of render resolution to simulation resolution
    fn grid_scale(&self) -> f32;

    /// `true` if kernels run on more than one thread
    fn is_parallel(&self) -> bool;

    /// Active configuration
    fn config(&self) -> &FluidConfig;

    /// Number of completed [`step`](Self::step) calls
    fn frame_count(&self) -> u64;

    /// Apply new scalar parameters to the live solver
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `config` fails validation and
    /// `FluidError::ResolutionChange` if it asks for a different grid size.
    /// The solver keeps its previous configuration on error.
    fn reconfigure(&mut self, config: &FluidConfig) -> Result<(), FluidError>;

    /// Launch count and accumulated time of every kernel launched so far
    fn kernel_stats(&self) -> Vec<(KernelId, KernelStats)>;

    /// `true` if the shared scratch buffer is entirely zero
    fn scratch_is_clear(&self) -> bool;
}
