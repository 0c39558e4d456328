//! Error types for solver construction and configuration
//!
//! The per-frame pipeline is infallible; everything that can fail happens
//! when a configuration is loaded or fields are allocated.

use thiserror::Error;

/// Errors raised while configuring or constructing a fluid solver
#[derive(Debug, Error)]
pub enum FluidError {
    /// A configuration value is outside its valid range.
    /// Values are rejected, never clamped.
    #[error("invalid configuration: {param} {reason}")]
    InvalidConfig {
        /// Name of the offending parameter (e.g. `"viscosity"`)
        param: &'static str,
        /// Description of the constraint that was violated
        reason: String,
    },

    /// A field could not be allocated at solver startup
    #[error("failed to allocate {field} field ({cells} cells)")]
    Allocation {
        /// Name of the field that failed to allocate
        field: &'static str,
        /// Requested number of cells
        cells: usize,
    },

    /// A live solver was asked to change its grid size
    #[error("cannot change {param} from {current} to {requested} on a live solver")]
    ResolutionChange {
        /// Which resolution parameter changed
        param: &'static str,
        /// Resolution the solver was allocated with
        current: usize,
        /// Resolution requested by the new configuration
        requested: usize,
    },

    /// The configuration text is not valid TOML for `FluidConfig`
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl FluidError {
    /// Create an `InvalidConfig` error for a float parameter
    pub(crate) fn invalid_value(param: &'static str, constraint: &str, value: f32) -> Self {
        Self::InvalidConfig {
            param,
            reason: format!("{constraint}, got {value}"),
        }
    }

    /// Create an `InvalidConfig` error for an integer parameter
    pub(crate) fn invalid_count(param: &'static str, constraint: &str, value: usize) -> Self {
        Self::InvalidConfig {
            param,
            reason: format!("{constraint}, got {value}"),
        }
    }
}
