//! Field storage for the solver
//!
//! This module defines the dense 2D fields the pipeline operates on, the
//! shared scratch buffer used as the other half of every ping-pong, and the
//! `FieldStore` that owns all of them for the lifetime of a solver.

use crate::core_types::{Cell, Flow, GridExtent, Rgba};
use crate::error::FluidError;
use tracing::debug;

/// Dense 2D field of cells in row-major order
///
/// Fields are allocated once and never resized.
#[derive(Debug, Clone)]
pub struct Field<T: Cell> {
    /// Field values in row-major order (y * width + x)
    data: Vec<T>,
    extent: GridExtent,
}

/// Allocate a zeroed buffer, reporting failure instead of aborting
fn try_zeroed<T: Cell>(field: &'static str, cells: usize) -> Result<Vec<T>, FluidError> {
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| FluidError::Allocation { field, cells })?;
    data.resize(cells, T::ZERO);
    Ok(data)
}

impl<T: Cell> Field<T> {
    /// Create a new zero-initialized field
    ///
    /// # Errors
    ///
    /// Returns `FluidError::Allocation` if the backing buffer cannot be reserved.
    pub fn try_new(name: &'static str, extent: GridExtent) -> Result<Self, FluidError> {
        Ok(Self {
            data: try_zeroed(name, extent.cells())?,
            extent,
        })
    }

    /// Create a new zero-initialized field, panicking on allocation failure
    #[must_use]
    pub fn new(extent: GridExtent) -> Self {
        Self {
            data: vec![T::ZERO; extent.cells()],
            extent,
        }
    }

    /// Build a field from existing row-major values
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the extent.
    #[must_use]
    pub fn from_vec(extent: GridExtent, data: Vec<T>) -> Self {
        assert_eq!(data.len(), extent.cells(), "Field data does not match extent");
        Self { data, extent }
    }

    #[must_use]
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> T {
        assert!(
            x < self.extent.width && y < self.extent.height,
            "Coordinates out of bounds"
        );
        self.data[self.extent.index(x, y)]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        assert!(
            x < self.extent.width && y < self.extent.height,
            "Coordinates out of bounds"
        );
        let idx = self.extent.index(x, y);
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Sum of every component of every cell
    #[must_use]
    pub fn total(&self) -> f32 {
        self.data.iter().map(Cell::component_sum).sum()
    }

    /// Largest absolute component anywhere in the field
    #[must_use]
    pub fn max_abs(&self) -> f32 {
        self.data.iter().map(Cell::max_abs).fold(0.0, f32::max)
    }

    /// Smallest component anywhere in the field
    #[must_use]
    pub fn min_component(&self) -> f32 {
        self.data
            .iter()
            .map(Cell::min_component)
            .fold(f32::INFINITY, f32::min)
    }
}

/// The single scratch buffer shared by every ping-pong operation
///
/// Sized for the widest cell type ([`Rgba`]) and reinterpreted as whatever
/// cell type the current operation needs. Every operation that writes it
/// clears it before returning.
#[derive(Debug)]
pub struct ScratchField {
    raw: Vec<Rgba>,
    extent: GridExtent,
}

impl ScratchField {
    /// # Errors
    ///
    /// Returns `FluidError::Allocation` if the backing buffer cannot be reserved.
    pub fn try_new(extent: GridExtent) -> Result<Self, FluidError> {
        Ok(Self {
            raw: try_zeroed("scratch", extent.cells())?,
            extent,
        })
    }

    #[must_use]
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// View the scratch buffer as one field of `T` cells
    #[must_use]
    pub fn view<T: Cell>(&self) -> &[T] {
        let cells: &[T] = bytemuck::cast_slice(&self.raw);
        &cells[..self.extent.cells()]
    }

    /// Mutable view of the scratch buffer as one field of `T` cells
    pub fn view_mut<T: Cell>(&mut self) -> &mut [T] {
        let n = self.extent.cells();
        let cells: &mut [T] = bytemuck::cast_slice_mut(&mut self.raw);
        &mut cells[..n]
    }

    /// Zero the whole raw buffer
    pub fn clear(&mut self) {
        self.raw.fill(Rgba::ZERO);
    }

    /// True if every byte of the buffer is zero
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.raw.iter().all(|c| *c == Rgba::ZERO)
    }
}

/// Owner of every field the solver works on
///
/// Velocity and density are the simulated quantities. Divergence is transient
/// and recomputed on every projection. Pressure persists across frames as the
/// warm start for the next pressure solve.
#[derive(Debug)]
pub struct FieldStore {
    pub velocity: Field<Flow>,
    pub density: Field<Rgba>,
    pub divergence: Field<f32>,
    pub pressure: Field<f32>,
    pub scratch: ScratchField,
    extent: GridExtent,
}

impl FieldStore {
    /// Allocate all five fields zero-initialized at `resolution × resolution`
    ///
    /// # Errors
    ///
    /// Returns `FluidError::Allocation` if any field cannot be allocated.
    pub fn allocate(resolution: usize) -> Result<Self, FluidError> {
        let extent = GridExtent::square(resolution);
        let store = Self {
            velocity: Field::try_new("velocity", extent)?,
            density: Field::try_new("density", extent)?,
            divergence: Field::try_new("divergence", extent)?,
            pressure: Field::try_new("pressure", extent)?,
            scratch: ScratchField::try_new(extent)?,
            extent,
        };
        debug!(
            "Allocated fluid fields: {}x{} ({} cells per field)",
            extent.width,
            extent.height,
            extent.cells()
        );
        Ok(store)
    }

    /// Release every field
    pub fn dispose(self) {
        debug!(
            "Releasing fluid fields: {}x{}",
            self.extent.width, self.extent.height
        );
        drop(self);
    }

    #[must_use]
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.extent.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field: Field<f32> = Field::new(GridExtent::new(10, 20));
        assert_eq!(field.extent().width, 10);
        assert_eq!(field.extent().height, 20);
        assert_eq!(field.as_slice().len(), 200);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_field_get_set() {
        let mut field: Field<Flow> = Field::new(GridExtent::square(10));
        field.set(3, 4, Flow::new(1.0, 2.0));
        assert_eq!(field.get(3, 4), Flow::new(1.0, 2.0));

        // Verify row-major indexing
        let index = 4 * 10 + 3;
        assert_eq!(field.as_slice()[index], Flow::new(1.0, 2.0));
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_field_bounds_check() {
        let field: Field<f32> = Field::new(GridExtent::square(10));
        let _ = field.get(10, 5);
    }

    #[test]
    fn test_field_from_vec_and_fill() {
        let extent = GridExtent::new(3, 2);
        let mut field = Field::from_vec(extent, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(field.get(2, 1), 6.0);
        assert_eq!(field.total(), 21.0);

        field.fill(0.5);
        assert!(field.as_slice().iter().all(|&v| v == 0.5));
        assert_eq!(field.total(), 3.0);
    }

    #[test]
    #[should_panic(expected = "Field data does not match extent")]
    fn test_field_from_vec_rejects_wrong_length() {
        let _ = Field::from_vec(GridExtent::square(3), vec![0.0_f32; 8]);
    }

    #[test]
    fn test_store_allocates_zeroed_fields() {
        let store = FieldStore::allocate(8).expect("allocation");
        assert_eq!(store.resolution(), 8);
        assert_eq!(store.velocity.as_slice().len(), 64);
        assert_eq!(store.density.as_slice().len(), 64);
        assert_eq!(store.pressure.total(), 0.0);
        assert!(store.scratch.is_clear());
        store.dispose();
    }

    #[test]
    fn test_scratch_views_share_storage() {
        let mut scratch = ScratchField::try_new(GridExtent::square(4)).expect("allocation");
        assert_eq!(scratch.view::<f32>().len(), 16);
        assert_eq!(scratch.view::<Flow>().len(), 16);
        assert_eq!(scratch.view::<Rgba>().len(), 16);

        scratch.view_mut::<f32>()[5] = 3.0;
        assert!(!scratch.is_clear());
        // The scalar view aliases the first bytes of the raw buffer
        assert_eq!(scratch.view::<Rgba>()[1].g, 3.0);

        scratch.clear();
        assert!(scratch.is_clear());
        assert!(scratch.view::<Flow>().iter().all(|f| *f == Flow::ZERO));
    }

    #[test]
    fn test_field_statistics() {
        let mut field: Field<Rgba> = Field::new(GridExtent::square(3));
        field.set(1, 1, Rgba::new(1.0, 0.5, 0.0, -2.0));
        assert_eq!(field.total(), -0.5);
        assert_eq!(field.max_abs(), 2.0);
        assert_eq!(field.min_component(), -2.0);
    }
}
