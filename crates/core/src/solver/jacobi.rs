//! Jacobi relaxation
//!
//! One sweep of the 5-point stencil
//!
//! ```text
//! result[c] = diagonal · (left + right + down + up + center · rhs[c])
//! ```
//!
//! serves both linear solves in the pipeline:
//! - Diffusion, `(I − ν·dt·∇²) x = x₀`: `center = 1/(ν·dt)`, `diagonal = ν·dt / (1 + 4·ν·dt)`
//! - Pressure, `∇²p = div`: `center = −gridScale²`, `diagonal = 0.25`
//!
//! Sweeps ping-pong between the named field and scratch. The iteration count
//! is fixed; there is no convergence check. Large `ν·dt` products converge
//! slowly and are bounded only by that count.

use super::boundary;
use super::dispatch::{ComputeBackend, Dispatcher, KernelId};
use super::ping_pong::{PingPong, Slot};
use crate::core_types::{Cell, GridExtent};

/// Coefficients of one relaxation sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxFactors {
    /// Weight of the right-hand side
    pub center: f32,
    /// Weight applied to the neighbor sum plus weighted right-hand side
    pub diagonal: f32,
}

impl RelaxFactors {
    /// Factors for implicit diffusion
    #[must_use]
    pub fn diffusion(viscosity: f32, dt: f32) -> Self {
        let alpha = viscosity * dt;
        Self {
            center: 1.0 / alpha,
            diagonal: alpha / (1.0 + 4.0 * alpha),
        }
    }

    /// Factors for the pressure Poisson solve
    #[must_use]
    pub fn pressure(grid_scale: f32) -> Self {
        Self {
            center: -grid_scale * grid_scale,
            diagonal: 0.25,
        }
    }
}

/// Where a sweep reads its right-hand side from
#[derive(Debug, Clone, Copy)]
pub enum RightHandSide<'a, T> {
    /// The buffer being relaxed, as read by this sweep
    Current,
    /// A fixed field (e.g. divergence)
    Fixed(&'a [T]),
}

/// One Jacobi sweep from `current` into `result`
pub fn sweep<B, T>(
    dispatcher: &mut Dispatcher<B>,
    current: &[T],
    rhs: &[T],
    result: &mut [T],
    extent: GridExtent,
    factors: RelaxFactors,
) where
    B: ComputeBackend,
    T: Cell,
{
    dispatcher.run_kernel(KernelId::Jacobi, extent, result, |x, y, out| {
        let left = current[extent.clamped_index(x, y, -1, 0)];
        let right = current[extent.clamped_index(x, y, 1, 0)];
        let down = current[extent.clamped_index(x, y, 0, -1)];
        let up = current[extent.clamped_index(x, y, 0, 1)];
        let b = rhs[extent.index(x, y)];
        *out = (left + right + down + up + b * factors.center) * factors.diagonal;
    });
}

/// Run `iterations` sweeps, alternating the authoritative slot of `pair`
///
/// With `boundary_scale` set, the buffer about to be read is re-conditioned
/// with that scale before every sweep (the pressure solve). Returns the slot
/// holding the result; an even count lands back in the primary field.
pub fn relax<B, T>(
    dispatcher: &mut Dispatcher<B>,
    pair: &mut PingPong<'_, T>,
    rhs: RightHandSide<'_, T>,
    extent: GridExtent,
    factors: RelaxFactors,
    iterations: usize,
    boundary_scale: Option<f32>,
) -> Slot
where
    B: ComputeBackend,
    T: Cell,
{
    for _ in 0..iterations {
        if let Some(scale) = boundary_scale {
            boundary::enforce(dispatcher, pair.current_mut(), extent, scale);
        }
        let (current, result) = pair.split();
        let rhs = match rhs {
            RightHandSide::Current => current,
            RightHandSide::Fixed(field) => field,
        };
        sweep(dispatcher, current, rhs, result, extent, factors);
        pair.swap();
    }
    pair.settled_in()
}

/// Copy a settled result back into the named field and clear scratch
///
/// Returns the slot the result had settled in before the copy.
pub fn settle<B, T>(dispatcher: &mut Dispatcher<B>, pair: PingPong<'_, T>, extent: GridExtent) -> Slot
where
    B: ComputeBackend,
    T: Cell,
{
    let (slot, primary, scratch) = pair.into_parts();
    if slot == Slot::Scratch {
        dispatcher.copy(extent, &*scratch, primary);
    }
    dispatcher.clear(extent, scratch, T::ZERO);
    slot
}

/// Diffuse `field` in place with `iterations` implicit-diffusion sweeps
///
/// Borders are not re-conditioned between sweeps; the caller applies the
/// field's boundary condition afterwards. Leaves `scratch` zeroed.
pub fn diffuse<B, T>(
    dispatcher: &mut Dispatcher<B>,
    field: &mut [T],
    scratch: &mut [T],
    extent: GridExtent,
    viscosity: f32,
    dt: f32,
    iterations: usize,
) -> Slot
where
    B: ComputeBackend,
    T: Cell,
{
    let factors = RelaxFactors::diffusion(viscosity, dt);
    let mut pair = PingPong::new(field, scratch);
    relax(
        dispatcher,
        &mut pair,
        RightHandSide::Current,
        extent,
        factors,
        iterations,
        None,
    );
    settle(dispatcher, pair, extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rgba;
    use crate::solver::dispatch::SerialBackend;
    use approx::assert_relative_eq;

    #[test]
    fn test_diffusion_factors() {
        let factors = RelaxFactors::diffusion(0.05, 0.5);
        assert_relative_eq!(factors.center, 40.0, epsilon = 1e-4);
        assert_relative_eq!(factors.diagonal, 0.025 / 1.1, epsilon = 1e-6);
    }

    #[test]
    fn test_pressure_factors() {
        let factors = RelaxFactors::pressure(2.0);
        assert_eq!(factors.center, -4.0);
        assert_eq!(factors.diagonal, 0.25);
    }

    #[test]
    fn test_uniform_field_is_a_fixed_point_of_diffusion() {
        let extent = GridExtent::square(6);
        let mut field = vec![3.0_f32; extent.cells()];
        let mut scratch = vec![0.0_f32; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        diffuse(&mut dispatcher, &mut field, &mut scratch, extent, 0.05, 0.5, 7);
        for value in &field {
            assert_relative_eq!(*value, 3.0, epsilon = 1e-5);
        }
        assert!(scratch.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_even_iterations_settle_in_primary() {
        let extent = GridExtent::square(5);
        let mut field = vec![0.0_f32; extent.cells()];
        field[extent.index(2, 2)] = 1.0;
        let mut scratch = vec![0.0_f32; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        let mut pair = PingPong::new(&mut field, &mut scratch);
        let slot = relax(
            &mut dispatcher,
            &mut pair,
            RightHandSide::Current,
            extent,
            RelaxFactors::diffusion(0.05, 0.5),
            4,
            None,
        );
        assert_eq!(slot, Slot::Primary);
        settle(&mut dispatcher, pair, extent);
        // Settling from the primary slot launches only the clear
        assert_eq!(dispatcher.stats(KernelId::Copy).launches, 0);
        assert_eq!(dispatcher.stats(KernelId::Clear).launches, 1);
    }

    #[test]
    fn test_odd_iterations_copy_back() {
        let extent = GridExtent::square(5);
        let mut field = vec![Rgba::ZERO; extent.cells()];
        field[extent.index(2, 2)] = Rgba::RED;
        let mut scratch = vec![Rgba::ZERO; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        let slot = diffuse(&mut dispatcher, &mut field, &mut scratch, extent, 0.05, 0.5, 3);
        assert_eq!(slot, Slot::Scratch);
        assert_eq!(dispatcher.stats(KernelId::Copy).launches, 1);
        assert!(scratch.iter().all(|c| *c == Rgba::ZERO));

        // Diffusion spreads the spike but conserves the total
        let center = field[extent.index(2, 2)].r;
        let neighbor = field[extent.index(3, 2)].r;
        assert!(center < 1.0 && neighbor > 0.0);
        let total: f32 = field.iter().map(|c| c.r).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pressure_relaxation_reconditions_border() {
        let extent = GridExtent::square(5);
        let mut pressure = vec![0.0_f32; extent.cells()];
        let mut scratch = vec![0.0_f32; extent.cells()];
        let mut divergence = vec![0.0_f32; extent.cells()];
        divergence[extent.index(2, 2)] = 1.0;
        let mut dispatcher = Dispatcher::new(SerialBackend);

        let mut pair = PingPong::new(&mut pressure, &mut scratch);
        let slot = relax(
            &mut dispatcher,
            &mut pair,
            RightHandSide::Fixed(&divergence),
            extent,
            RelaxFactors::pressure(1.0),
            3,
            Some(1.0),
        );
        assert_eq!(slot, Slot::Scratch);
        assert_eq!(dispatcher.stats(KernelId::Boundary).launches, 3);
        settle(&mut dispatcher, pair, extent);

        // A positive source yields a pressure dip at the source
        assert!(pressure[extent.index(2, 2)] < 0.0);
        assert!(scratch.iter().all(|&v| v == 0.0));
    }
}
