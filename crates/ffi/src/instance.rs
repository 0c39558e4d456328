use fluid_sim_core::FluidSimulation;
use std::ptr;
use std::sync::RwLock;

use crate::error::{DefaultFluidSimError, FluidSimErrorCode};
use crate::helpers::{track_error, track_result};
use crate::FluidSimConfig;

/// The main fluid simulation context.
///
/// # Thread Safety
/// `FluidSimInstance` is fully thread-safe and can be shared across threads
/// in Godot, Unreal Engine, or any other multi-threaded host.
///
/// The internal simulation is protected by an `RwLock`, allowing:
/// - **Multiple concurrent readers** (density read-back, rendering): `.read()` lock
/// - **Exclusive writer** (frame updates, reconfiguration): `.write()` lock
///
/// # Usage
/// ```cpp
/// FluidSimInstance* sim = nullptr;
/// if (fluid_sim_new(fluid_sim_default_config(), 0, &sim) != FluidSimErrorCode::Ok) {
///     return;
/// }
///
/// // Once per frame, pointer in normalized viewport coordinates
/// fluid_sim_update(sim, mouse_x, mouse_y, left_down, right_down, delta_time);
/// fluid_sim_render_density(sim, pixels, pixel_len);
///
/// fluid_sim_destroy(sim);
/// ```
pub struct FluidSimInstance {
    pub(crate) sim: RwLock<FluidSimulation>,
    /// Simulation grid size in cells, fixed for the instance's lifetime
    pub(crate) simulation_resolution: usize,
    /// Display image size in pixels, fixed for the instance's lifetime
    pub(crate) render_resolution: usize,
}

impl FluidSimInstance {
    /// Creates a new instance from a C configuration.
    ///
    /// A zero `seed` draws the density color sequence from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if any value is out of range and
    /// `AllocationFailed` if the fields cannot be allocated.
    pub(crate) fn new(config: &FluidSimConfig, seed: u64) -> Result<Box<Self>, DefaultFluidSimError> {
        let config = config.to_core()?;
        let simulation_resolution = config.simulation_resolution;
        let render_resolution = config.render_resolution;
        let sim = if seed == 0 {
            FluidSimulation::new(config)?
        } else {
            FluidSimulation::with_seed(config, seed)?
        };
        Ok(Box::new(Self {
            sim: RwLock::new(sim),
            simulation_resolution,
            render_resolution,
        }))
    }
}

/// Create a new fluid simulation instance and return it via out-parameter.
///
/// - Returns `FluidSimErrorCode::Ok` (0) on success with a valid instance in `out_instance`
/// - Returns a non-zero error code on failure with `out_instance` set to null
///
/// Parameters
/// - `config`: Solver configuration, usually from `fluid_sim_default_config()`.
/// - `seed`: Seed for the density color sequence; 0 for a random sequence.
/// - `out_instance`: Pointer to receive the created instance. Must be non-null.
///
/// Returns
/// - `FluidSimErrorCode::Ok`: success
/// - `FluidSimErrorCode::NullPointer`: `out_instance` is null
/// - `FluidSimErrorCode::InvalidConfig`: a configuration value is out of range
/// - `FluidSimErrorCode::AllocationFailed`: the fields could not be allocated
///
/// Call `fluid_sim_get_last_error()` for a human-readable description.
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call
///   `fluid_sim_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn fluid_sim_new(
    config: FluidSimConfig,
    seed: u64,
    out_instance: *mut *mut FluidSimInstance,
) -> FluidSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFluidSimError::null_pointer("out_instance"));
    }

    match track_result(FluidSimInstance::new(&config, seed)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            FluidSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroys an instance previously created by `fluid_sim_new`.
///
/// If `ptr` is null this function is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `fluid_sim_new`.
/// - The pointer MUST NOT have been freed already.
/// - After calling this function, the caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn fluid_sim_destroy(ptr: *mut FluidSimInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: The pointer was created by `Box::into_raw` in `fluid_sim_new`
    // and has not been freed. Dropping the Box releases every field.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
