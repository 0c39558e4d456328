//! Per-frame external forcing
//!
//! The host reports the pointer once per frame as a [`PointerInput`]. The
//! [`ForcingState`] keeps the previous pointer position so velocity impulses
//! follow the pointer's motion, and hands the solver an immutable
//! [`ForcingFrame`] describing exactly what to inject this frame.

use crate::core_types::{Cell, Rgba, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer state reported by the host for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Drag to push the fluid
    pub velocity_pressed: bool,
    /// Drag to add colored density
    pub density_pressed: bool,
    /// Pointer position in grid space (cells)
    pub position: Vec2,
}

impl PointerInput {
    /// Pointer at `position` with nothing pressed
    #[must_use]
    pub fn hover(position: Vec2) -> Self {
        Self {
            velocity_pressed: false,
            density_pressed: false,
            position,
        }
    }

    /// Pointer at `position` pushing and painting at once
    #[must_use]
    pub fn drag(position: Vec2) -> Self {
        Self {
            velocity_pressed: true,
            density_pressed: true,
            position,
        }
    }
}

/// Everything the solver injects during one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcingFrame {
    /// 1.0 while velocity injection is active, else 0.0
    pub velocity_pressed: f32,
    /// 1.0 while density injection is active, else 0.0
    pub density_pressed: f32,
    /// Pointer position this frame (grid space)
    pub current: Vec2,
    /// Pointer position last frame (grid space)
    pub previous: Vec2,
    /// Color of injected density
    pub color: Rgba,
}

impl ForcingFrame {
    /// A frame that injects nothing
    #[must_use]
    pub fn idle() -> Self {
        Self {
            velocity_pressed: 0.0,
            density_pressed: 0.0,
            current: Vec2::zeros(),
            previous: Vec2::zeros(),
            color: Rgba::ZERO,
        }
    }

    /// Pointer displacement since the previous frame
    #[must_use]
    pub fn motion(&self) -> Vec2 {
        self.current - self.previous
    }
}

/// Pointer history between frames
#[derive(Debug, Clone, Default)]
pub struct ForcingState {
    last_position: Option<Vec2>,
}

impl ForcingState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's forcing and remember the pointer for the next one
    ///
    /// The first sample has no history, so its previous position equals the
    /// current one and no velocity impulse comes out of the first frame.
    pub fn advance(&mut self, input: &PointerInput, color: Rgba) -> ForcingFrame {
        let current = input.position;
        let previous = self.last_position.unwrap_or(current);
        self.last_position = Some(current);
        ForcingFrame {
            velocity_pressed: pressed(input.velocity_pressed),
            density_pressed: pressed(input.density_pressed),
            current,
            previous,
            color,
        }
    }

    /// Forget the pointer history
    pub fn reset(&mut self) {
        self.last_position = None;
    }
}

#[inline]
fn pressed(flag: bool) -> f32 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Map a normalized viewport point to grid space
///
/// `viewport` is clamped to `[0, 1]²` before being scaled by `resolution`.
#[must_use]
pub fn viewport_to_grid(viewport: Vec2, resolution: usize) -> Vec2 {
    let scale = resolution as f32;
    Vec2::new(
        viewport.x.clamp(0.0, 1.0) * scale,
        viewport.y.clamp(0.0, 1.0) * scale,
    )
}
