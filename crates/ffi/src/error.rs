use fluid_sim_core::FluidError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait FluidSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> FluidSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `FluidSimError` for every FFI failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultFluidSimError {
    code: FluidSimErrorCode,
    msg: String,
}

impl DefaultFluidSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: FluidSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"RwLock"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: FluidSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for an output buffer that cannot hold the result.
    pub fn buffer_too_small(param_name: &str, required: usize, provided: usize) -> Self {
        Self {
            code: FluidSimErrorCode::BufferTooSmall,
            msg: format!("Buffer '{param_name}' holds {provided} elements, {required} required"),
        }
    }

    /// Create error for invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: FluidSimErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<FluidError> for DefaultFluidSimError {
    fn from(error: FluidError) -> Self {
        let code = match error {
            FluidError::InvalidConfig { .. } | FluidError::Parse(_) | FluidError::Io(_) => {
                FluidSimErrorCode::InvalidConfig
            }
            FluidError::Allocation { .. } => FluidSimErrorCode::AllocationFailed,
            FluidError::ResolutionChange { .. } => FluidSimErrorCode::ResolutionChange,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl FluidSimError for DefaultFluidSimError {
    fn code(&self) -> FluidSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by fluid simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// A configuration value is out of range (values are rejected, never clamped).
    InvalidConfig = 3,

    /// The simulation fields could not be allocated.
    AllocationFailed = 4,

    /// A live instance was asked to change its simulation or render resolution.
    ResolutionChange = 5,

    /// An output buffer is smaller than the data to be written.
    BufferTooSmall = 6,

    /// Invalid parameter passed to function.
    InvalidParameter = 7,
}

impl From<DefaultFluidSimError> for FluidSimErrorCode {
    fn from(error: DefaultFluidSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored so returned raw pointers stay valid until the next error.
    static LAST_ERROR: RefCell<(Option<CString>, FluidSimErrorCode)> = const { RefCell::new((None, FluidSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, FluidSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, FluidSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if no error has occurred or the message cannot be converted to a C string.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread has its own error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error, or until the thread terminates.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// FluidSimInstance* sim = nullptr;
/// FluidSimErrorCode err = fluid_sim_new(fluid_sim_default_config(), &sim);
/// if (err != FluidSimErrorCode::Ok) {
///     const char* error = fluid_sim_get_last_error();
///     if (error) {
///         printf("Fluid sim creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn fluid_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `FluidSimErrorCode::Ok` (0) if no error has occurred on this thread
/// since the last successful call, otherwise the code of the last failure.
#[no_mangle]
pub extern "C" fn fluid_sim_get_last_error_code() -> FluidSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluid_error_maps_to_code() {
        let err = DefaultFluidSimError::from(FluidError::ResolutionChange {
            param: "simulation_resolution",
            current: 64,
            requested: 128,
        });
        assert_eq!(err.code(), FluidSimErrorCode::ResolutionChange);
        assert!(err.msg().contains("64"));

        let err = DefaultFluidSimError::from(FluidError::Allocation {
            field: "density",
            cells: 4,
        });
        assert_eq!(FluidSimErrorCode::from(err), FluidSimErrorCode::AllocationFailed);
    }
}
