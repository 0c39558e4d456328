//! Vector type alias for 2D grid-space positions and directions.

use nalgebra::Vector2;

/// 2D vector type for pointer positions and motion vectors.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used for forcing
/// positions (in grid cells) and the pointer motion that drives velocity injection.
pub type Vec2 = Vector2<f32>;
