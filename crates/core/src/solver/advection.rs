//! Semi-Lagrangian advection
//!
//! Each cell traces backwards along the velocity at its center, samples the
//! source field there and scales the sample by a dissipation factor. The
//! trace is unconditionally stable for any timestep, so large `dt` only
//! smears the field instead of blowing up.

use super::dispatch::{ComputeBackend, Dispatcher, KernelId};
use crate::core_types::{Cell, Flow, GridExtent, Vec2};

/// Bilinearly sample `field` at a continuous grid position
///
/// The position is clamped to `[0, width-1] × [0, height-1]`, so samples
/// never wrap around or read outside the field.
#[must_use]
pub fn sample_bilinear<T: Cell>(field: &[T], extent: GridExtent, position: Vec2) -> T {
    let max_x = (extent.width - 1) as f32;
    let max_y = (extent.height - 1) as f32;
    let px = position.x.clamp(0.0, max_x);
    let py = position.y.clamp(0.0, max_y);

    let x0 = px.floor() as usize;
    let y0 = py.floor() as usize;
    let x1 = (x0 + 1).min(extent.width - 1);
    let y1 = (y0 + 1).min(extent.height - 1);
    let tx = px - x0 as f32;
    let ty = py - y0 as f32;

    let bottom = field[extent.index(x0, y0)] * (1.0 - tx) + field[extent.index(x1, y0)] * tx;
    let top = field[extent.index(x0, y1)] * (1.0 - tx) + field[extent.index(x1, y1)] * tx;
    bottom * (1.0 - ty) + top * ty
}

/// Advect `source` through `velocity` into `out`
///
/// `out` must not alias `source` or `velocity`.
pub fn advect_into<B, T>(
    dispatcher: &mut Dispatcher<B>,
    source: &[T],
    velocity: &[Flow],
    out: &mut [T],
    extent: GridExtent,
    dt: f32,
    dissipation: f32,
) where
    B: ComputeBackend,
    T: Cell,
{
    dispatcher.run_kernel(KernelId::Advect, extent, out, |x, y, cell| {
        let flow: Vec2 = velocity[extent.index(x, y)].into();
        let origin = Vec2::new(x as f32, y as f32) - flow * dt;
        *cell = sample_bilinear(source, extent, origin) * dissipation;
    });
}

/// Advect `field` in place through `velocity`, staging through `scratch`
///
/// Leaves `scratch` zeroed.
pub fn advect<B, T>(
    dispatcher: &mut Dispatcher<B>,
    field: &mut [T],
    velocity: &[Flow],
    scratch: &mut [T],
    extent: GridExtent,
    dt: f32,
    dissipation: f32,
) where
    B: ComputeBackend,
    T: Cell,
{
    advect_into(dispatcher, &*field, velocity, scratch, extent, dt, dissipation);
    dispatcher.copy(extent, &*scratch, field);
    dispatcher.clear(extent, scratch, T::ZERO);
}

/// Advect the velocity field through itself
///
/// Every cell reads the pre-step velocity; results are staged in `scratch`
/// and copied back once the whole field has been traced.
pub fn self_advect<B>(
    dispatcher: &mut Dispatcher<B>,
    velocity: &mut [Flow],
    scratch: &mut [Flow],
    extent: GridExtent,
    dt: f32,
    dissipation: f32,
) where
    B: ComputeBackend,
{
    advect_into(dispatcher, &*velocity, &*velocity, scratch, extent, dt, dissipation);
    dispatcher.copy(extent, &*scratch, velocity);
    dispatcher.clear(extent, scratch, Flow::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rgba;
    use crate::solver::dispatch::SerialBackend;
    use approx::assert_relative_eq;

    fn ramp(extent: GridExtent) -> Vec<f32> {
        (0..extent.cells())
            .map(|i| (i % extent.width) as f32)
            .collect()
    }

    #[test]
    fn test_bilinear_interpolates_between_cells() {
        let extent = GridExtent::square(4);
        let field = ramp(extent);
        assert_relative_eq!(sample_bilinear(&field, extent, Vec2::new(1.25, 2.0)), 1.25);
        assert_relative_eq!(sample_bilinear(&field, extent, Vec2::new(2.0, 0.7)), 2.0);
    }

    #[test]
    fn test_bilinear_clamps_outside_grid() {
        let extent = GridExtent::square(4);
        let field = ramp(extent);
        assert_relative_eq!(sample_bilinear(&field, extent, Vec2::new(-5.0, 1.0)), 0.0);
        assert_relative_eq!(sample_bilinear(&field, extent, Vec2::new(40.0, 9.0)), 3.0);
    }

    #[test]
    fn test_zero_velocity_only_dissipates() {
        let extent = GridExtent::square(5);
        let mut density = vec![Rgba::RED; extent.cells()];
        let velocity = vec![Flow::ZERO; extent.cells()];
        let mut scratch = vec![Rgba::ZERO; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        advect(&mut dispatcher, &mut density, &velocity, &mut scratch, extent, 0.5, 0.5);
        for cell in &density {
            assert_relative_eq!(cell.r, 0.5);
            assert_relative_eq!(cell.g, 0.0);
        }
        assert!(scratch.iter().all(|c| *c == Rgba::ZERO));
    }

    #[test]
    fn test_uniform_flow_shifts_field() {
        let extent = GridExtent::square(6);
        let mut field = vec![0.0_f32; extent.cells()];
        field[extent.index(2, 3)] = 1.0;
        // One cell per step to the right
        let velocity = vec![Flow::new(2.0, 0.0); extent.cells()];
        let mut scratch = vec![0.0_f32; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        advect(&mut dispatcher, &mut field, &velocity, &mut scratch, extent, 0.5, 1.0);
        assert_relative_eq!(field[extent.index(3, 3)], 1.0);
        assert_relative_eq!(field[extent.index(2, 3)], 0.0);
    }

    #[test]
    fn test_self_advection_reads_pre_step_velocity() {
        let extent = GridExtent::square(5);
        let mut velocity = vec![Flow::new(1.0, 0.0); extent.cells()];
        let mut scratch = vec![Flow::ZERO; extent.cells()];
        let mut dispatcher = Dispatcher::new(SerialBackend);

        self_advect(&mut dispatcher, &mut velocity, &mut scratch, extent, 0.5, 0.999);
        for flow in &velocity {
            assert_relative_eq!(flow.x, 0.999);
            assert_relative_eq!(flow.y, 0.0);
        }
        assert_eq!(dispatcher.stats(KernelId::Advect).launches, 1);
        assert!(scratch.iter().all(|f| *f == Flow::ZERO));
    }
}
