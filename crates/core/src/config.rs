//! Solver configuration
//!
//! All scalar parameters the pipeline consumes live in [`FluidConfig`]. A
//! configuration is validated when it is loaded or applied; invalid values
//! are rejected rather than clamped because they produce divide-by-zero or
//! non-convergent relaxation coefficients.

use crate::error::FluidError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest grid that still has an interior cell behind every border cell
pub const MIN_SIMULATION_RESOLUTION: usize = 3;

/// Which compute backend runs the kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Row-parallel kernels on the Rayon thread pool
    #[default]
    Parallel,
    /// All kernels on the calling thread
    Serial,
}

/// Configuration for the fluid solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
    /// Simulation grid size in cells (square grid)
    pub simulation_resolution: usize,

    /// Display resolution the density field is upsampled to.
    /// `render_resolution / simulation_resolution` is the grid scale used by
    /// the projection coefficients.
    pub render_resolution: usize,

    /// Kinematic viscosity used by the diffusion solve
    pub viscosity: f32,

    /// Simulation timestep per frame
    pub delta_time: f32,

    /// Jacobi sweeps per diffusion and per pressure solve.
    /// Fixed count, no convergence check.
    pub solver_iterations: usize,

    /// Radius (cells) of the pointer velocity impulse
    pub velocity_effect_radius: f32,
    /// Sharpness of the velocity impulse falloff
    pub velocity_falloff: f32,
    /// Scale applied to the pointer motion vector
    pub velocity_multiplier: f32,

    /// Radius (cells) of the pointer density splat
    pub density_effect_radius: f32,
    /// Sharpness of the density splat falloff
    pub density_falloff: f32,

    /// Per-frame decay applied when velocity advects itself
    pub velocity_dissipation: f32,
    /// Per-frame decay applied when density is advected
    pub density_dissipation: f32,

    /// Backend used to run kernels
    pub execution: ExecutionMode,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            simulation_resolution: 512,
            render_resolution: 1024,
            viscosity: 0.05,
            delta_time: 0.5,
            solver_iterations: 50,
            velocity_effect_radius: 15.0,
            velocity_falloff: 3.0,
            velocity_multiplier: 1.0,
            density_effect_radius: 30.0,
            density_falloff: 5.0,
            velocity_dissipation: 0.999,
            density_dissipation: 0.996,
            execution: ExecutionMode::Parallel,
        }
    }
}

fn require_positive(param: &'static str, value: f32) -> Result<(), FluidError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FluidError::invalid_value(
            param,
            "must be finite and positive",
            value,
        ))
    }
}

fn require_non_negative(param: &'static str, value: f32) -> Result<(), FluidError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FluidError::invalid_value(
            param,
            "must be finite and non-negative",
            value,
        ))
    }
}

fn require_dissipation(param: &'static str, value: f32) -> Result<(), FluidError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(FluidError::invalid_value(
            param,
            "must lie in (0, 1]",
            value,
        ))
    }
}

impl FluidConfig {
    /// Check every parameter against its valid range
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), FluidError> {
        if self.simulation_resolution < MIN_SIMULATION_RESOLUTION {
            return Err(FluidError::invalid_count(
                "simulation_resolution",
                &format!("must be at least {MIN_SIMULATION_RESOLUTION}"),
                self.simulation_resolution,
            ));
        }
        if self.render_resolution == 0 {
            return Err(FluidError::invalid_count(
                "render_resolution",
                "must be positive",
                self.render_resolution,
            ));
        }
        require_positive("viscosity", self.viscosity)?;
        require_positive("delta_time", self.delta_time)?;
        if self.solver_iterations == 0 {
            return Err(FluidError::invalid_count(
                "solver_iterations",
                "must be positive",
                self.solver_iterations,
            ));
        }
        require_positive("velocity_effect_radius", self.velocity_effect_radius)?;
        require_non_negative("velocity_falloff", self.velocity_falloff)?;
        if !self.velocity_multiplier.is_finite() {
            return Err(FluidError::invalid_value(
                "velocity_multiplier",
                "must be finite",
                self.velocity_multiplier,
            ));
        }
        require_positive("density_effect_radius", self.density_effect_radius)?;
        require_non_negative("density_falloff", self.density_falloff)?;
        require_dissipation("velocity_dissipation", self.velocity_dissipation)?;
        require_dissipation("density_dissipation", self.density_dissipation)?;
        Ok(())
    }

    /// Ratio of display resolution to simulation resolution
    #[must_use]
    pub fn grid_scale(&self) -> f32 {
        self.render_resolution as f32 / self.simulation_resolution as f32
    }

    /// Parse a TOML document, filling missing keys from the defaults
    ///
    /// # Errors
    ///
    /// Returns `FluidError::Parse` for malformed TOML and
    /// `FluidError::InvalidConfig` if a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, FluidError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    ///
    /// # Errors
    ///
    /// Returns `FluidError::Io` if the file cannot be read, otherwise the
    /// same errors as [`FluidConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FluidError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FluidConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_scale(), 2.0);
        assert_eq!(config.solver_iterations, 50);
    }

    #[test]
    fn test_rejects_zero_viscosity() {
        let config = FluidConfig {
            viscosity: 0.0,
            ..Default::default()
        };
        match config.validate() {
            Err(FluidError::InvalidConfig { param, .. }) => assert_eq!(param, "viscosity"),
            other => panic!("expected viscosity rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_positive_timestep_and_iterations() {
        let config = FluidConfig {
            delta_time: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FluidError::InvalidConfig {
                param: "delta_time",
                ..
            })
        ));

        let config = FluidConfig {
            solver_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FluidError::InvalidConfig {
                param: "solver_iterations",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan_instead_of_clamping() {
        let config = FluidConfig {
            viscosity: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FluidConfig {
            density_dissipation: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FluidError::InvalidConfig {
                param: "density_dissipation",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let config = FluidConfig {
            simulation_resolution: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FluidError::InvalidConfig {
                param: "simulation_resolution",
                ..
            })
        ));
    }

    #[test]
    fn test_from_toml_fills_defaults() {
        let config = FluidConfig::from_toml_str(
            r#"
            simulation_resolution = 64
            render_resolution = 256
            viscosity = 0.1
            execution = "serial"
            "#,
        )
        .expect("valid config");
        assert_eq!(config.simulation_resolution, 64);
        assert_eq!(config.grid_scale(), 4.0);
        assert_eq!(config.viscosity, 0.1);
        assert_eq!(config.execution, ExecutionMode::Serial);
        assert_eq!(config.solver_iterations, 50);
        assert_eq!(config.density_falloff, 5.0);
    }

    #[test]
    fn test_from_toml_validates() {
        let result = FluidConfig::from_toml_str("delta_time = 0.0");
        assert!(matches!(
            result,
            Err(FluidError::InvalidConfig {
                param: "delta_time",
                ..
            })
        ));

        let result = FluidConfig::from_toml_str("viscosity = \"thick\"");
        assert!(matches!(result, Err(FluidError::Parse(_))));
    }
}
