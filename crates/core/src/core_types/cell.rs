//! Per-cell value types stored in simulation fields
//!
//! Every field in the solver is a dense row-major array of one of these cell
//! types. All of them are plain-old-data so the shared scratch buffer can be
//! reinterpreted as any of them.

use super::Vec2;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for super::Flow {}
    impl Sealed for super::Rgba {}
}

/// Value stored in a single grid cell
///
/// Stencil kernels are written once against this trait and run on scalar,
/// velocity and color fields alike. The trait is sealed: the scratch buffer is
/// sized for [`Rgba`], so no cell type may be wider than it.
pub trait Cell:
    sealed::Sealed
    + Pod
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
{
    /// The additive identity
    const ZERO: Self;

    /// Largest absolute component value
    fn max_abs(&self) -> f32;

    /// Sum of all components
    fn component_sum(&self) -> f32;

    /// Smallest component value
    fn min_component(&self) -> f32;

    /// True if every component is finite
    fn is_finite(&self) -> bool;
}

impl Cell for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn max_abs(&self) -> f32 {
        self.abs()
    }

    #[inline]
    fn component_sum(&self) -> f32 {
        *self
    }

    #[inline]
    fn min_component(&self) -> f32 {
        *self
    }

    #[inline]
    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

/// Flow velocity of one cell, in cells per unit time
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Flow {
    pub x: f32,
    pub y: f32,
}

impl Flow {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Speed (magnitude of the velocity vector)
    #[must_use]
    pub fn speed(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl From<Vec2> for Flow {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Flow> for Vec2 {
    fn from(f: Flow) -> Self {
        Vec2::new(f.x, f.y)
    }
}

impl Add for Flow {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Flow {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Flow {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Cell for Flow {
    const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    fn max_abs(&self) -> f32 {
        self.x.abs().max(self.y.abs())
    }

    #[inline]
    fn component_sum(&self) -> f32 {
        self.x + self.y
    }

    #[inline]
    fn min_component(&self) -> f32 {
        self.x.min(self.y)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Colored density of one cell
///
/// Each channel is an independent concentration; the visualization stage
/// clamps them to `[0, 1]` for display.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const CYAN: Self = Self::new(0.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Linear interpolation toward `target`, with `t` clamped to `[0, 1]`
    #[must_use]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        self + (target - self) * t
    }

    /// Channels as an array, in `r, g, b, a` order
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Add for Rgba {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.r + rhs.r,
            self.g + rhs.g,
            self.b + rhs.b,
            self.a + rhs.a,
        )
    }
}

impl Sub for Rgba {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.r - rhs.r,
            self.g - rhs.g,
            self.b - rhs.b,
            self.a - rhs.a,
        )
    }
}

impl Mul<f32> for Rgba {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl Cell for Rgba {
    const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    fn max_abs(&self) -> f32 {
        self.r
            .abs()
            .max(self.g.abs())
            .max(self.b.abs())
            .max(self.a.abs())
    }

    #[inline]
    fn component_sum(&self) -> f32 {
        self.r + self.g + self.b + self.a
    }

    #[inline]
    fn min_component(&self) -> f32 {
        self.r.min(self.g).min(self.b).min(self.a)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}
