//! Grid extent and index helpers shared by every kernel

use serde::{Deserialize, Serialize};

/// Dimensions of a dense 2D grid in cells
///
/// Fields are stored row-major: cell `(x, y)` lives at `y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridExtent {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
}

impl GridExtent {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Square extent of `resolution × resolution` cells
    #[must_use]
    pub const fn square(resolution: usize) -> Self {
        Self::new(resolution, resolution)
    }

    /// Total number of cells
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Row-major index of `(x, y)`
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Row-major index of `(x + dx, y + dy)`, clamped to the grid
    #[inline]
    #[must_use]
    pub fn clamped_index(&self, x: usize, y: usize, dx: isize, dy: isize) -> usize {
        let cx = x.saturating_add_signed(dx).min(self.width - 1);
        let cy = y.saturating_add_signed(dy).min(self.height - 1);
        self.index(cx, cy)
    }

    /// True if `(x, y)` lies on the outermost ring of cells
    #[inline]
    #[must_use]
    pub const fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    /// Number of cells on the outermost ring
    #[must_use]
    pub const fn border_cells(&self) -> usize {
        if self.width < 2 || self.height < 2 {
            self.cells()
        } else {
            2 * self.width + 2 * self.height - 4
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_index() {
        let extent = GridExtent::new(10, 4);
        assert_eq!(extent.cells(), 40);
        assert_eq!(extent.index(3, 2), 23);
    }

    #[test]
    fn test_clamped_index_stays_in_grid() {
        let extent = GridExtent::square(4);
        assert_eq!(extent.clamped_index(0, 0, -1, 0), extent.index(0, 0));
        assert_eq!(extent.clamped_index(3, 2, 1, 0), extent.index(3, 2));
        assert_eq!(extent.clamped_index(1, 3, 0, 1), extent.index(1, 3));
        assert_eq!(extent.clamped_index(1, 1, 1, -1), extent.index(2, 0));
    }

    #[test]
    fn test_border_detection() {
        let extent = GridExtent::square(5);
        assert!(extent.is_border(0, 2));
        assert!(extent.is_border(4, 4));
        assert!(!extent.is_border(2, 2));
        let count = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .filter(|&(x, y)| extent.is_border(x, y))
            .count();
        assert_eq!(count, extent.border_cells());
    }
}
