//! Source injection
//!
//! Adds pointer-driven forcing to a field: a velocity impulse along the
//! pointer's motion, or a colored density splat. Each cell receives the
//! impulse weighted by a Gaussian-like falloff of its distance to the pointer:
//!
//! ```text
//! w = exp(-falloff · d² / radius²)   for d ≤ radius
//! w = 0                              otherwise
//! ```
//!
//! Each cell only reads and writes itself, so injection runs in place.

use super::dispatch::{ComputeBackend, Dispatcher, KernelId};
use crate::core_types::{Cell, Flow, GridExtent, Rgba, Vec2};

/// Falloff-weighted impulse centered on a grid-space point
#[derive(Debug, Clone, Copy)]
pub struct Impulse<T: Cell> {
    /// Center in grid space (cells)
    pub center: Vec2,
    /// Cells farther than this receive nothing
    pub radius: f32,
    /// Sharpness of the decay; 0 gives a flat disc
    pub falloff: f32,
    /// Value added at the center, already scaled by pressed state and multiplier
    pub value: T,
}

/// Weight of a cell at squared distance `dist_sq` from the impulse center
#[inline]
#[must_use]
pub fn falloff_weight(dist_sq: f32, radius: f32, falloff: f32) -> f32 {
    let radius_sq = radius * radius;
    if dist_sq > radius_sq {
        return 0.0;
    }
    (-falloff * dist_sq / radius_sq).exp()
}

/// Add `impulse` to every cell of `field`
pub fn inject<B, T>(
    dispatcher: &mut Dispatcher<B>,
    kernel: KernelId,
    field: &mut [T],
    extent: GridExtent,
    impulse: &Impulse<T>,
) where
    B: ComputeBackend,
    T: Cell,
{
    let impulse = *impulse;
    dispatcher.run_kernel(kernel, extent, field, move |x, y, cell| {
        let dx = x as f32 - impulse.center.x;
        let dy = y as f32 - impulse.center.y;
        let weight = falloff_weight(dx * dx + dy * dy, impulse.radius, impulse.falloff);
        if weight > 0.0 {
            *cell = *cell + impulse.value * weight;
        }
    });
}

/// Add a velocity impulse along the pointer motion `current - previous`
///
/// `pressed` is 0 or 1; nothing is launched when it is 0.
pub fn inject_velocity<B: ComputeBackend>(
    dispatcher: &mut Dispatcher<B>,
    velocity: &mut [Flow],
    extent: GridExtent,
    current: Vec2,
    previous: Vec2,
    pressed: f32,
    radius: f32,
    falloff: f32,
    multiplier: f32,
) {
    if pressed == 0.0 {
        return;
    }
    let motion = current - previous;
    let impulse = Impulse {
        center: current,
        radius,
        falloff,
        value: Flow::from(motion) * (multiplier * pressed),
    };
    inject(dispatcher, KernelId::AddVelocity, velocity, extent, &impulse);
}

/// Add a density splat of `color` at the pointer
///
/// `pressed` is 0 or 1; nothing is launched when it is 0.
pub fn inject_density<B: ComputeBackend>(
    dispatcher: &mut Dispatcher<B>,
    density: &mut [Rgba],
    extent: GridExtent,
    position: Vec2,
    color: Rgba,
    pressed: f32,
    radius: f32,
    falloff: f32,
) {
    if pressed == 0.0 {
        return;
    }
    let impulse = Impulse {
        center: position,
        radius,
        falloff,
        value: color * pressed,
    };
    inject(dispatcher, KernelId::AddDensity, density, extent, &impulse);
}
