use crate::error::{with_last_error_mut, DefaultFluidSimError, FluidSimError, FluidSimErrorCode};
use crate::instance::FluidSimInstance;
use fluid_sim_core::FluidSimulation;
use std::ffi::CString;

/// Set the thread-local error message and code.
/// Accepts any type implementing `FluidSimError` trait.
pub(crate) fn set_last_error(error: &impl FluidSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl FluidSimError) -> FluidSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = FluidSimErrorCode::Ok;
    });
}

/// Record the error of a failed result, or clear the last error on success.
pub(crate) fn track_result<T>(result: Result<T, DefaultFluidSimError>) -> Result<T, FluidSimErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Run an FFI body and translate its result into an error code.
pub(crate) fn handle_ffi_result_error<F>(body: F) -> FluidSimErrorCode
where
    F: FnOnce() -> Result<(), DefaultFluidSimError>,
{
    match track_result(body()) {
        Ok(()) => FluidSimErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow an instance from a raw pointer handed out by `fluid_sim_new`.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const FluidSimInstance,
) -> Result<&'a FluidSimInstance, DefaultFluidSimError> {
    // SAFETY: non-null pointers must come from `fluid_sim_new` and still be live,
    // as documented on every exported function taking one.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultFluidSimError::null_pointer("ptr"))
}

/// Run `f` with shared access to the simulation.
pub(crate) fn with_fluid_sim<F, R>(instance: &FluidSimInstance, f: F) -> Result<R, DefaultFluidSimError>
where
    F: FnOnce(&FluidSimulation) -> R,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultFluidSimError::lock_poisoned("RwLock"))?;
    Ok(f(&*sim))
}

/// Run `f` with exclusive access to the simulation.
pub(crate) fn with_fluid_sim_mut<F, R>(
    instance: &FluidSimInstance,
    f: F,
) -> Result<R, DefaultFluidSimError>
where
    F: FnOnce(&mut FluidSimulation) -> R,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultFluidSimError::lock_poisoned("RwLock"))?;
    Ok(f(&mut *sim))
}
