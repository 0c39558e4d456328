//! Fluid Simulation Core Library
//!
//! A real-time 2D grid fluid solver in the stable-fluids style: implicit
//! diffusion and a pressure projection solved by Jacobi relaxation, plus
//! semi-Lagrangian advection. It is tuned to stay stable and look plausible
//! at interactive frame rates rather than to be physically exact.
//!
//! ## Pipeline
//!
//! Each frame runs a velocity step followed by a density step:
//! - Velocity: inject → reflect → diffuse → reflect → project → self-advect → reflect → project
//! - Density: inject → clear → diffuse → clear → advect → clear
//!
//! Every stage is a data-parallel kernel over the whole grid, launched through
//! a pluggable [`ComputeBackend`](solver::ComputeBackend).

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;
pub mod forcing;
pub mod palette;
pub mod visualize;

// Solver and host-facing simulation
pub mod simulation;
pub mod solver;

// Re-export core types
pub use config::{ExecutionMode, FluidConfig, MIN_SIMULATION_RESOLUTION};
pub use core_types::{Cell, Flow, GridExtent, Rgba, Vec2};
pub use error::FluidError;
pub use forcing::{viewport_to_grid, ForcingFrame, ForcingState, PointerInput};
pub use palette::DensityColorCycler;

// Re-export solver types
pub use simulation::{FluidSimulation, SimulationStats};
pub use solver::{
    create_field_solver, ComputeBackend, FieldSolver, FluidSolver, KernelId, KernelStats,
    RayonBackend, SerialBackend,
};
