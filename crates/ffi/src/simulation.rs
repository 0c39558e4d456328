use fluid_sim_core::{viewport_to_grid, PointerInput, Vec2};

use crate::error::{DefaultFluidSimError, FluidSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_fluid_sim_mut};
use crate::instance::FluidSimInstance;
use crate::FluidSimConfig;

/// Run one simulation frame.
///
/// Parameters
/// - `pointer_x`, `pointer_y`: Pointer position in normalized viewport
///   coordinates, clamped to `[0, 1]`.
/// - `velocity_pressed`: Push the fluid along the pointer's motion.
/// - `density_pressed`: Add colored density at the pointer.
/// - `frame_dt`: Host frame time in seconds; drives the color drift only.
///
/// Thread-safe: acquires the `RwLock` write lock for the update.
///
/// Returns `FluidSimErrorCode::InvalidParameter` if a coordinate is not
/// finite or `frame_dt` is negative or not finite.
///
/// Safety:
/// - `ptr` must be a valid pointer returned by `fluid_sim_new` and not yet
///   passed to `fluid_sim_destroy`.
/// - Calling with a dangling or foreign pointer is undefined behavior.
/// - A null `ptr` returns `FluidSimErrorCode::NullPointer` without touching
///   any state.
#[no_mangle]
pub extern "C" fn fluid_sim_update(
    ptr: *const FluidSimInstance,
    pointer_x: f32,
    pointer_y: f32,
    velocity_pressed: bool,
    density_pressed: bool,
    frame_dt: f32,
) -> FluidSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        if !pointer_x.is_finite() || !pointer_y.is_finite() {
            return Err(DefaultFluidSimError::invalid_parameter(format!(
                "Pointer position must be finite, got ({pointer_x}, {pointer_y})"
            )));
        }
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            return Err(DefaultFluidSimError::invalid_parameter(format!(
                "frame_dt must be finite and non-negative, got {frame_dt}"
            )));
        }

        let input = PointerInput {
            velocity_pressed,
            density_pressed,
            position: viewport_to_grid(
                Vec2::new(pointer_x, pointer_y),
                instance.simulation_resolution,
            ),
        };
        with_fluid_sim_mut(instance, |sim| {
            sim.update(&input, frame_dt);
        })
    })
}

/// Apply new scalar parameters to a live instance.
///
/// The simulation and render resolutions must match the instance's;
/// changing them returns `FluidSimErrorCode::ResolutionChange`. On any error
/// the previous configuration stays active.
///
/// Safety:
/// - `ptr` must be a valid pointer returned by `fluid_sim_new` and not yet
///   passed to `fluid_sim_destroy`.
/// - Calling with a dangling or foreign pointer is undefined behavior.
/// - A null `ptr` returns `FluidSimErrorCode::NullPointer`.
#[no_mangle]
pub extern "C" fn fluid_sim_reconfigure(
    ptr: *const FluidSimInstance,
    config: FluidSimConfig,
) -> FluidSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let config = config.to_core()?;
        with_fluid_sim_mut(instance, |sim| sim.reconfigure(&config))??;
        Ok(())
    })
}
