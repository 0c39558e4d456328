//! Boundary conditions
//!
//! Every border cell is rewritten as `scale ×` its interior neighbor directly
//! across the border. Corner cells copy their diagonal interior neighbor, so
//! `(0, 0)` takes `(1, 1)`. Since border cells only read non-border cells the
//! pass is race-free in place.
//!
//! | scale | use      | effect                               |
//! |-------|----------|--------------------------------------|
//! | -1    | velocity | no flow through walls                |
//! |  0    | density  | nothing accumulates at walls         |
//! | +1    | pressure | zero normal gradient (Neumann)       |

use super::dispatch::{ComputeBackend, Dispatcher, KernelId};
use crate::core_types::{Cell, GridExtent};

/// Named boundary conditions used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// `scale = -1`
    Reflect,
    /// `scale = 0`
    Clear,
    /// `scale = +1`
    Mirror,
}

impl BoundaryCondition {
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Reflect => -1.0,
            Self::Clear => 0.0,
            Self::Mirror => 1.0,
        }
    }
}

/// Interior cell a border cell copies from
#[inline]
fn interior_source(extent: GridExtent, x: usize, y: usize) -> (usize, usize) {
    let sx = x.clamp(1, extent.width - 2);
    let sy = y.clamp(1, extent.height - 2);
    (sx, sy)
}

/// Rewrite every border cell of `field` as `scale ×` its interior neighbor
///
/// # Panics
///
/// Panics if the grid is smaller than 3×3 (no interior to copy from).
pub fn enforce<B, T>(dispatcher: &mut Dispatcher<B>, field: &mut [T], extent: GridExtent, scale: f32)
where
    B: ComputeBackend,
    T: Cell,
{
    assert!(
        extent.width >= 3 && extent.height >= 3,
        "Boundary enforcement needs at least a 3x3 grid"
    );
    dispatcher.run_inline(KernelId::Boundary, || {
        let (w, h) = (extent.width, extent.height);
        let mut write = |x: usize, y: usize| {
            let (sx, sy) = interior_source(extent, x, y);
            field[extent.index(x, y)] = field[extent.index(sx, sy)] * scale;
        };
        for x in 0..w {
            write(x, 0);
            write(x, h - 1);
        }
        for y in 1..h - 1 {
            write(0, y);
            write(w - 1, y);
        }
    });
}

/// Apply a named boundary condition
pub fn enforce_condition<B, T>(
    dispatcher: &mut Dispatcher<B>,
    field: &mut [T],
    extent: GridExtent,
    condition: BoundaryCondition,
) where
    B: ComputeBackend,
    T: Cell,
{
    enforce(dispatcher, field, extent, condition.scale());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Flow;
    use crate::solver::dispatch::SerialBackend;

    fn ramp(extent: GridExtent) -> Vec<Flow> {
        (0..extent.cells())
            .map(|i| Flow::new(i as f32 + 1.0, -(i as f32) * 0.5))
            .collect()
    }

    #[test]
    fn test_clear_zeroes_every_border_cell() {
        let extent = GridExtent::new(6, 5);
        let mut field = ramp(extent);
        let mut dispatcher = Dispatcher::new(SerialBackend);
        enforce_condition(&mut dispatcher, &mut field, extent, BoundaryCondition::Clear);

        for y in 0..extent.height {
            for x in 0..extent.width {
                let value = field[extent.index(x, y)];
                if extent.is_border(x, y) {
                    assert_eq!(value, Flow::ZERO, "border ({x}, {y}) not cleared");
                } else {
                    assert_ne!(value, Flow::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_reflect_negates_interior_neighbor() {
        let extent = GridExtent::square(5);
        let original = ramp(extent);
        let mut field = original.clone();
        let mut dispatcher = Dispatcher::new(SerialBackend);
        enforce(&mut dispatcher, &mut field, extent, -1.0);

        assert_eq!(field[extent.index(0, 2)], original[extent.index(1, 2)] * -1.0);
        assert_eq!(field[extent.index(4, 3)], original[extent.index(3, 3)] * -1.0);
        assert_eq!(field[extent.index(2, 0)], original[extent.index(2, 1)] * -1.0);
        assert_eq!(field[extent.index(1, 4)], original[extent.index(1, 3)] * -1.0);
        // Corners mirror the diagonal interior cell
        assert_eq!(field[extent.index(0, 0)], original[extent.index(1, 1)] * -1.0);
        assert_eq!(field[extent.index(4, 4)], original[extent.index(3, 3)] * -1.0);
        // Interior untouched
        assert_eq!(field[extent.index(2, 2)], original[extent.index(2, 2)]);
    }

    #[test]
    fn test_mirror_is_idempotent() {
        let extent = GridExtent::square(4);
        let mut field: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let mut dispatcher = Dispatcher::new(SerialBackend);
        enforce(&mut dispatcher, &mut field, extent, 1.0);
        let once = field.clone();
        enforce(&mut dispatcher, &mut field, extent, 1.0);
        assert_eq!(field, once);
        assert_eq!(dispatcher.stats(KernelId::Boundary).launches, 2);
    }
}
