use crate::error::{DefaultFluidSimError, FluidSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_fluid_sim};
use crate::instance::FluidSimInstance;

/// Get the simulation and render resolutions of an instance.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `fluid_sim_new`.
/// - `out_simulation` and `out_render` must be valid, writable pointers.
#[no_mangle]
pub unsafe extern "C" fn fluid_sim_get_resolution(
    ptr: *const FluidSimInstance,
    out_simulation: *mut u32,
    out_render: *mut u32,
) -> FluidSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        if out_simulation.is_null() {
            return Err(DefaultFluidSimError::null_pointer("out_simulation"));
        }
        if out_render.is_null() {
            return Err(DefaultFluidSimError::null_pointer("out_render"));
        }
        unsafe {
            *out_simulation = instance.simulation_resolution as u32;
            *out_render = instance.render_resolution as u32;
        }
        Ok(())
    })
}

/// Copy the density field into `out_rgba` as `r, g, b, a` floats per cell.
///
/// `len` is the number of floats `out_rgba` can hold and must be at least
/// `4 × simulation_resolution²`. Cells are row-major (`y * resolution + x`).
///
/// Thread-safe: takes the `RwLock` read lock.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `fluid_sim_new`.
/// - `out_rgba` must point to at least `len` writable `f32`s.
#[no_mangle]
pub unsafe extern "C" fn fluid_sim_read_density(
    ptr: *const FluidSimInstance,
    out_rgba: *mut f32,
    len: usize,
) -> FluidSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        if out_rgba.is_null() {
            return Err(DefaultFluidSimError::null_pointer("out_rgba"));
        }
        let required = instance.simulation_resolution * instance.simulation_resolution * 4;
        if len < required {
            return Err(DefaultFluidSimError::buffer_too_small("out_rgba", required, len));
        }
        // SAFETY: caller guarantees `len` writable floats; `required <= len`.
        let out = unsafe { std::slice::from_raw_parts_mut(out_rgba, required) };
        with_fluid_sim(instance, |sim| {
            let density = sim.solver().read_density();
            for (chunk, cell) in out.chunks_exact_mut(4).zip(density.iter()) {
                chunk.copy_from_slice(&cell.to_array());
            }
        })
    })
}

/// Render the density field at render resolution into `out_pixels` as RGBA8.
///
/// `len` is the number of bytes `out_pixels` can hold and must be at least
/// `4 × render_resolution²`.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `fluid_sim_new`.
/// - `out_pixels` must point to at least `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn fluid_sim_render_density(
    ptr: *const FluidSimInstance,
    out_pixels: *mut u8,
    len: usize,
) -> FluidSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        if out_pixels.is_null() {
            return Err(DefaultFluidSimError::null_pointer("out_pixels"));
        }
        let required = instance.render_resolution * instance.render_resolution * 4;
        if len < required {
            return Err(DefaultFluidSimError::buffer_too_small("out_pixels", required, len));
        }
        let pixels = with_fluid_sim(instance, fluid_sim_core::FluidSimulation::render)?;
        // SAFETY: caller guarantees `len` writable bytes; `pixels.len() == required <= len`.
        let out = unsafe { std::slice::from_raw_parts_mut(out_pixels, pixels.len()) };
        out.copy_from_slice(&pixels);
        Ok(())
    })
}
