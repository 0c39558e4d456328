//! C ABI for the fluid simulation
//!
//! Hosts create an opaque [`FluidSimInstance`] with `fluid_sim_new`, drive it
//! once per frame with `fluid_sim_update`, read the result back with
//! `fluid_sim_read_density` or `fluid_sim_render_density`, and release it
//! with `fluid_sim_destroy`. Every fallible call returns a
//! [`FluidSimErrorCode`]; details are available from
//! `fluid_sim_get_last_error` on the same thread.

mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;

pub use error::{fluid_sim_get_last_error, fluid_sim_get_last_error_code, FluidSimErrorCode};
pub use instance::{fluid_sim_destroy, fluid_sim_new, FluidSimInstance};
pub use queries::{fluid_sim_get_resolution, fluid_sim_read_density, fluid_sim_render_density};
pub use simulation::{fluid_sim_reconfigure, fluid_sim_update};

use error::DefaultFluidSimError;
use fluid_sim_core::{ExecutionMode, FluidConfig};

/// Kernel execution strategy
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidSimExecution {
    /// Row-parallel kernels on a thread pool
    Parallel = 0,
    /// All kernels on the calling thread
    Serial = 1,
}

/// Solver configuration passed across the FFI boundary
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidSimConfig {
    /// Simulation grid size in cells (at least 3)
    pub simulation_resolution: u32,
    /// Display image size in pixels
    pub render_resolution: u32,
    /// Diffusion strength, > 0
    pub viscosity: f32,
    /// Solver timestep, > 0
    pub delta_time: f32,
    /// Jacobi sweeps per diffusion and per pressure solve, > 0
    pub solver_iterations: u32,
    pub velocity_effect_radius: f32,
    pub velocity_falloff: f32,
    pub velocity_multiplier: f32,
    pub density_effect_radius: f32,
    pub density_falloff: f32,
    /// Per-frame velocity decay factor in (0, 1]
    pub velocity_dissipation: f32,
    /// Per-frame density decay factor in (0, 1]
    pub density_dissipation: f32,
    pub execution: FluidSimExecution,
}

impl From<&FluidConfig> for FluidSimConfig {
    fn from(config: &FluidConfig) -> Self {
        Self {
            simulation_resolution: config.simulation_resolution as u32,
            render_resolution: config.render_resolution as u32,
            viscosity: config.viscosity,
            delta_time: config.delta_time,
            solver_iterations: config.solver_iterations as u32,
            velocity_effect_radius: config.velocity_effect_radius,
            velocity_falloff: config.velocity_falloff,
            velocity_multiplier: config.velocity_multiplier,
            density_effect_radius: config.density_effect_radius,
            density_falloff: config.density_falloff,
            velocity_dissipation: config.velocity_dissipation,
            density_dissipation: config.density_dissipation,
            execution: match config.execution {
                ExecutionMode::Parallel => FluidSimExecution::Parallel,
                ExecutionMode::Serial => FluidSimExecution::Serial,
            },
        }
    }
}

impl FluidSimConfig {
    /// Convert to the core configuration and validate it
    pub(crate) fn to_core(&self) -> Result<FluidConfig, DefaultFluidSimError> {
        let config = FluidConfig {
            simulation_resolution: self.simulation_resolution as usize,
            render_resolution: self.render_resolution as usize,
            viscosity: self.viscosity,
            delta_time: self.delta_time,
            solver_iterations: self.solver_iterations as usize,
            velocity_effect_radius: self.velocity_effect_radius,
            velocity_falloff: self.velocity_falloff,
            velocity_multiplier: self.velocity_multiplier,
            density_effect_radius: self.density_effect_radius,
            density_falloff: self.density_falloff,
            velocity_dissipation: self.velocity_dissipation,
            density_dissipation: self.density_dissipation,
            execution: match self.execution {
                FluidSimExecution::Parallel => ExecutionMode::Parallel,
                FluidSimExecution::Serial => ExecutionMode::Serial,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// The default configuration (512² simulation, 1024² render).
#[no_mangle]
pub extern "C" fn fluid_sim_default_config() -> FluidSimConfig {
    FluidSimConfig::from(&FluidConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn small_config() -> FluidSimConfig {
        FluidSimConfig {
            simulation_resolution: 16,
            render_resolution: 32,
            solver_iterations: 8,
            velocity_effect_radius: 3.0,
            density_effect_radius: 4.0,
            execution: FluidSimExecution::Serial,
            ..fluid_sim_default_config()
        }
    }

    fn create(config: FluidSimConfig) -> *mut FluidSimInstance {
        let mut instance = ptr::null_mut();
        let code = unsafe { fluid_sim_new(config, 7, &mut instance) };
        assert_eq!(code, FluidSimErrorCode::Ok);
        assert!(!instance.is_null());
        instance
    }

    #[test]
    fn test_default_config_round_trips() {
        let config = fluid_sim_default_config();
        assert_eq!(config.simulation_resolution, 512);
        assert_eq!(config.to_core().expect("valid"), FluidConfig::default());
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let config = FluidSimConfig {
            viscosity: 0.0,
            ..small_config()
        };
        let mut instance = ptr::null_mut();
        let code = unsafe { fluid_sim_new(config, 0, &mut instance) };
        assert_eq!(code, FluidSimErrorCode::InvalidConfig);
        assert!(instance.is_null());
        assert_eq!(fluid_sim_get_last_error_code(), FluidSimErrorCode::InvalidConfig);

        let message = unsafe { CStr::from_ptr(fluid_sim_get_last_error()) };
        assert!(message.to_string_lossy().contains("viscosity"));
    }

    #[test]
    fn test_null_out_instance() {
        let code = unsafe { fluid_sim_new(small_config(), 0, ptr::null_mut()) };
        assert_eq!(code, FluidSimErrorCode::NullPointer);
    }

    #[test]
    fn test_update_and_read_back() {
        let instance = create(small_config());

        for i in 0..4 {
            let x = 0.4 + 0.05 * i as f32;
            let code = fluid_sim_update(instance, x, 0.5, true, true, 1.0 / 60.0);
            assert_eq!(code, FluidSimErrorCode::Ok);
        }

        let (mut sim_res, mut render_res) = (0_u32, 0_u32);
        let code = unsafe { fluid_sim_get_resolution(instance, &mut sim_res, &mut render_res) };
        assert_eq!(code, FluidSimErrorCode::Ok);
        assert_eq!((sim_res, render_res), (16, 32));

        let mut density = vec![0.0_f32; 16 * 16 * 4];
        let code = unsafe { fluid_sim_read_density(instance, density.as_mut_ptr(), density.len()) };
        assert_eq!(code, FluidSimErrorCode::Ok);
        assert!(density.iter().any(|&v| v > 0.0));

        let mut pixels = vec![0_u8; 32 * 32 * 4];
        let code = unsafe { fluid_sim_render_density(instance, pixels.as_mut_ptr(), pixels.len()) };
        assert_eq!(code, FluidSimErrorCode::Ok);

        let code = unsafe { fluid_sim_render_density(instance, pixels.as_mut_ptr(), 16) };
        assert_eq!(code, FluidSimErrorCode::BufferTooSmall);

        unsafe { fluid_sim_destroy(instance) };
    }

    #[test]
    fn test_reconfigure_rejects_resolution_change() {
        let instance = create(small_config());
        let resized = FluidSimConfig {
            simulation_resolution: 32,
            ..small_config()
        };
        assert_eq!(
            fluid_sim_reconfigure(instance, resized),
            FluidSimErrorCode::ResolutionChange
        );

        let thicker = FluidSimConfig {
            viscosity: 0.2,
            ..small_config()
        };
        assert_eq!(fluid_sim_reconfigure(instance, thicker), FluidSimErrorCode::Ok);
        assert_eq!(fluid_sim_get_last_error_code(), FluidSimErrorCode::Ok);

        unsafe { fluid_sim_destroy(instance) };
    }

    #[test]
    fn test_null_instance_is_rejected() {
        assert_eq!(
            fluid_sim_update(ptr::null(), 0.5, 0.5, true, true, 0.016),
            FluidSimErrorCode::NullPointer
        );
        assert_eq!(fluid_sim_get_last_error_code(), FluidSimErrorCode::NullPointer);
        assert_eq!(
            fluid_sim_reconfigure(ptr::null(), small_config()),
            FluidSimErrorCode::NullPointer
        );
        unsafe { fluid_sim_destroy(ptr::null_mut()) };
    }
}
