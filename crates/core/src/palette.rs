//! Density color cycling
//!
//! Injected density drifts slowly through random hues: every
//! [`COLOR_CHANGE_INTERVAL`] seconds a new target hue is drawn, and each
//! frame the injection color eases toward it.

use crate::core_types::Rgba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seconds between new target colors
pub const COLOR_CHANGE_INTERVAL: f32 = 0.2;
/// Fraction of the remaining distance covered per second
pub const COLOR_EASE_RATE: f32 = 0.2;
/// Saturation of every target color
pub const TARGET_SATURATION: f32 = 0.8;
/// Value (brightness) of every target color
pub const TARGET_VALUE: f32 = 0.7;

/// Convert HSV (all components in `[0, 1]`) to opaque RGB
#[must_use]
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgba {
    let h = hue.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match sector as u32 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    Rgba::new(r, g, b, 1.0)
}

/// Slowly drifting injection color
#[derive(Debug, Clone)]
pub struct DensityColorCycler {
    current: Rgba,
    target: Rgba,
    since_change: f32,
    rng: StdRng,
}

impl Default for DensityColorCycler {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl DensityColorCycler {
    /// Cycler with a fixed seed, for reproducible runs
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            current: Rgba::CYAN,
            target: Rgba::RED,
            since_change: 0.0,
            rng,
        }
    }

    #[must_use]
    pub fn current(&self) -> Rgba {
        self.current
    }

    #[must_use]
    pub fn target(&self) -> Rgba {
        self.target
    }

    /// Advance by `frame_dt` seconds and return the color to inject
    pub fn update(&mut self, frame_dt: f32) -> Rgba {
        self.since_change += frame_dt;
        if self.since_change >= COLOR_CHANGE_INTERVAL {
            self.since_change = 0.0;
            let hue: f32 = self.rng.random();
            self.target = hsv_to_rgb(hue, TARGET_SATURATION, TARGET_VALUE);
        }
        self.current = self.current.lerp(self.target, frame_dt * COLOR_EASE_RATE);
        self.current
    }
}
