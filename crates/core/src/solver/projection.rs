//! Pressure projection
//!
//! Removes the divergent part of the velocity field (Helmholtz-Hodge):
//!
//! 1. `div = ∇·u` with central differences
//! 2. Solve `∇²p = div` by Jacobi relaxation, warm-started from the previous
//!    frame's pressure, re-conditioning the pressure border before each sweep
//! 3. `u ← u − ∇p`
//!
//! The pressure solve is not run to convergence. Divergence is reduced, not
//! eliminated, and more iterations give a tighter result.

use super::boundary::{self, BoundaryCondition};
use super::dispatch::{ComputeBackend, Dispatcher, KernelId};
use super::fields::ScratchField;
use super::jacobi::{self, RelaxFactors, RightHandSide};
use super::ping_pong::PingPong;
use crate::core_types::{Cell, Flow, GridExtent};
use tracing::trace;

/// Central-difference divergence of `velocity` into `divergence`
pub fn compute_divergence<B: ComputeBackend>(
    dispatcher: &mut Dispatcher<B>,
    velocity: &[Flow],
    divergence: &mut [f32],
    extent: GridExtent,
    grid_scale: f32,
) {
    let half_inv = 0.5 / grid_scale;
    dispatcher.run_kernel(KernelId::Divergence, extent, divergence, |x, y, out| {
        let left = velocity[extent.clamped_index(x, y, -1, 0)].x;
        let right = velocity[extent.clamped_index(x, y, 1, 0)].x;
        let down = velocity[extent.clamped_index(x, y, 0, -1)].y;
        let up = velocity[extent.clamped_index(x, y, 0, 1)].y;
        *out = half_inv * ((right - left) + (up - down));
    });
}

/// Write `velocity − ∇pressure` into `out`
pub fn subtract_gradient<B: ComputeBackend>(
    dispatcher: &mut Dispatcher<B>,
    velocity: &[Flow],
    pressure: &[f32],
    out: &mut [Flow],
    extent: GridExtent,
    grid_scale: f32,
) {
    let half_inv = 0.5 / grid_scale;
    dispatcher.run_kernel(KernelId::SubtractGradient, extent, out, |x, y, cell| {
        let left = pressure[extent.clamped_index(x, y, -1, 0)];
        let right = pressure[extent.clamped_index(x, y, 1, 0)];
        let down = pressure[extent.clamped_index(x, y, 0, -1)];
        let up = pressure[extent.clamped_index(x, y, 0, 1)];
        let gradient = Flow::new(right - left, up - down) * half_inv;
        *cell = velocity[extent.index(x, y)] - gradient;
    });
}

/// Project `velocity` towards a divergence-free field
///
/// `pressure` is both the initial guess and the result, and keeps its values
/// for the next call. `divergence` is overwritten. Leaves `scratch` zeroed.
pub fn project<B: ComputeBackend>(
    dispatcher: &mut Dispatcher<B>,
    velocity: &mut [Flow],
    divergence: &mut [f32],
    pressure: &mut [f32],
    scratch: &mut ScratchField,
    extent: GridExtent,
    grid_scale: f32,
    iterations: usize,
) {
    compute_divergence(dispatcher, velocity, divergence, extent, grid_scale);

    let mut pair = PingPong::new(pressure, scratch.view_mut::<f32>());
    let slot = jacobi::relax(
        dispatcher,
        &mut pair,
        RightHandSide::Fixed(&*divergence),
        extent,
        RelaxFactors::pressure(grid_scale),
        iterations,
        Some(BoundaryCondition::Mirror.scale()),
    );
    trace!("pressure solve settled in {:?} after {} sweeps", slot, iterations);
    jacobi::settle(dispatcher, pair, extent);
    boundary::enforce_condition(dispatcher, pressure, extent, BoundaryCondition::Mirror);

    let staged = scratch.view_mut::<Flow>();
    subtract_gradient(dispatcher, velocity, pressure, staged, extent, grid_scale);
    dispatcher.copy(extent, &*staged, velocity);
    dispatcher.clear(extent, staged, Flow::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::dispatch::SerialBackend;
    use approx::assert_relative_eq;

    #[test]
    fn test_divergence_of_linear_expansion() {
        // u = (x, y) has divergence 2 everywhere in the interior
        let extent = GridExtent::square(5);
        let velocity: Vec<Flow> = (0..extent.cells())
            .map(|i| Flow::new((i % 5) as f32, (i / 5) as f32))
            .collect();
        let mut divergence = vec![0.0_f32; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        compute_divergence(&mut dispatcher, &velocity, &mut divergence, extent, 1.0);
        assert_relative_eq!(divergence[extent.index(2, 2)], 2.0);
        // Halved by a coarser grid scale
        compute_divergence(&mut dispatcher, &velocity, &mut divergence, extent, 2.0);
        assert_relative_eq!(divergence[extent.index(2, 2)], 1.0);
    }

    #[test]
    fn test_uniform_pressure_has_no_gradient() {
        let extent = GridExtent::square(4);
        let velocity = vec![Flow::new(0.3, -0.2); extent.cells()];
        let pressure = vec![5.0_f32; extent.cells()];
        let mut out = vec![Flow::ZERO; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        subtract_gradient(&mut dispatcher, &velocity, &pressure, &mut out, extent, 1.0);
        assert_eq!(out, velocity);
    }

    #[test]
    fn test_projection_reduces_divergence_and_clears_scratch() {
        let extent = GridExtent::square(12);
        let mut velocity = vec![Flow::ZERO; extent.cells()];
        for y in 4..8 {
            for x in 4..8 {
                velocity[extent.index(x, y)] = Flow::new(1.0, 0.0);
            }
        }
        let mut divergence = vec![0.0_f32; extent.cells()];
        let mut pressure = vec![0.0_f32; extent.cells()];
        let mut scratch = ScratchField::try_new(extent).expect("allocation");
        let mut dispatcher = Dispatcher::new(SerialBackend);

        compute_divergence(&mut dispatcher, &velocity, &mut divergence, extent, 1.0);
        let before: f32 = divergence.iter().map(|d| d.abs()).sum();

        project(
            &mut dispatcher,
            &mut velocity,
            &mut divergence,
            &mut pressure,
            &mut scratch,
            extent,
            1.0,
            40,
        );
        compute_divergence(&mut dispatcher, &velocity, &mut divergence, extent, 1.0);
        let after: f32 = divergence.iter().map(|d| d.abs()).sum();

        assert!(after < before, "divergence {before} -> {after}");
        assert!(scratch.is_clear());
        assert!(pressure.iter().any(|&p| p != 0.0));
    }
}
