//! Display images from simulation fields
//!
//! Fields live at simulation resolution; the display runs at render
//! resolution. Both renderers bilinearly upsample and write tightly packed
//! RGBA8 rows, one row per Rayon task.

use crate::core_types::{Flow, GridExtent, Rgba, Vec2};
use crate::solver::advection::sample_bilinear;
use rayon::prelude::*;

/// Bytes per output pixel
pub const BYTES_PER_PIXEL: usize = 4;

#[inline]
fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Grid-space position sampled by pixel `(px, py)`
#[inline]
fn pixel_to_grid(px: usize, py: usize, scale: f32) -> Vec2 {
    Vec2::new(
        (px as f32 + 0.5) * scale - 0.5,
        (py as f32 + 0.5) * scale - 0.5,
    )
}

fn render_with<T, F>(field: &[T], sim_res: usize, render_res: usize, shade: F) -> Vec<u8>
where
    T: crate::core_types::Cell,
    F: Fn(T) -> [f32; 4] + Send + Sync,
{
    let extent = GridExtent::square(sim_res);
    debug_assert_eq!(field.len(), extent.cells());
    let scale = sim_res as f32 / render_res as f32;
    let mut pixels = vec![0_u8; render_res * render_res * BYTES_PER_PIXEL];
    pixels
        .par_chunks_mut(render_res * BYTES_PER_PIXEL)
        .enumerate()
        .for_each(|(py, row)| {
            for (px, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let value = sample_bilinear(field, extent, pixel_to_grid(px, py, scale));
                for (byte, channel) in pixel.iter_mut().zip(shade(value)) {
                    *byte = to_byte(channel);
                }
            }
        });
    pixels
}

/// Upsample the density field to `render_res²` RGBA8 pixels
///
/// Channels are clamped to `[0, 1]`.
#[must_use]
pub fn render_density(density: &[Rgba], sim_res: usize, render_res: usize) -> Vec<u8> {
    render_with(density, sim_res, render_res, Rgba::to_array)
}

/// Map velocity to color for debugging: `0.5 + 0.5·v` in red and green
#[must_use]
pub fn render_velocity(velocity: &[Flow], sim_res: usize, render_res: usize) -> Vec<u8> {
    render_with(velocity, sim_res, render_res, |flow| {
        [0.5 + 0.5 * flow.x, 0.5 + 0.5 * flow.y, 0.5, 1.0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Cell;

    #[test]
    fn test_uniform_density_upsamples_uniformly() {
        let density = vec![Rgba::new(1.0, 0.6, 0.0, 1.0); 16];
        let pixels = render_density(&density, 4, 8);
        assert_eq!(pixels.len(), 8 * 8 * 4);
        for pixel in pixels.chunks_exact(4) {
            assert_eq!(pixel, [255, 153, 0, 255]);
        }
    }

    #[test]
    fn test_density_is_clamped_for_display() {
        let density = vec![Rgba::new(3.0, -1.0, 0.25, 2.0); 9];
        let pixels = render_density(&density, 3, 3);
        assert_eq!(&pixels[..4], &[255, 0, 64, 255]);
    }

    #[test]
    fn test_still_fluid_renders_mid_gray() {
        let velocity = vec![Flow::ZERO; 9];
        let pixels = render_velocity(&velocity, 3, 6);
        assert!(pixels.chunks_exact(4).all(|p| p == [128, 128, 128, 255]));
    }
}
