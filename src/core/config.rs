//! Forest configuration.
//!
//! [`ForestConfig`] carries the numeric knobs that control vertex deduplication and
//! refinement limits. It is built with [`ForestConfigBuilder`]:
//!
//! ```rust
//! use quadforest::core::config::{ForestConfig, ForestConfigBuilder};
//!
//! let config = ForestConfigBuilder::default()
//!     .tolerance(1e-12)
//!     .min_cell_size(1.0 / 64.0)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.min_cell_size(), Some(1.0 / 64.0));
//!
//! // Unset fields fall back to the defaults.
//! assert_eq!(ForestConfigBuilder::default().build().unwrap(), ForestConfig::default());
//! ```

use crate::core::forest::ForestError;
use crate::core::vertex::VERTEX_TOLERANCE;

/// Default bucket size of the vertex registry's spatial hash.
pub const DEFAULT_VERTEX_GRID_CELL_SIZE: f64 = 1e-6;

/// Numeric configuration of a [`Forest`](crate::core::forest::Forest).
#[derive(Builder, Clone, Copy, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate_fields"))]
pub struct ForestConfig {
    /// Coordinate equality epsilon (max-norm) used when deduplicating vertices.
    #[builder(default = "VERTEX_TOLERANCE")]
    tolerance: f64,

    /// Bucket size of the registry's spatial hash. Must be at least `tolerance`.
    #[builder(default = "DEFAULT_VERTEX_GRID_CELL_SIZE")]
    vertex_grid_cell_size: f64,

    /// Smallest admissible child width or height. `None` disables the limit.
    #[builder(setter(into, strip_option), default)]
    min_cell_size: Option<f64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            tolerance: VERTEX_TOLERANCE,
            vertex_grid_cell_size: DEFAULT_VERTEX_GRID_CELL_SIZE,
            min_cell_size: None,
        }
    }
}

impl ForestConfig {
    /// Coordinate equality epsilon.
    #[inline]
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Bucket size of the registry's spatial hash.
    #[inline]
    #[must_use]
    pub const fn vertex_grid_cell_size(&self) -> f64 {
        self.vertex_grid_cell_size
    }

    /// Smallest admissible child width or height, if limited.
    #[inline]
    #[must_use]
    pub const fn min_cell_size(&self) -> Option<f64> {
        self.min_cell_size
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidConfig`] if a value is non-finite or not positive,
    /// or if the grid cell size is smaller than the tolerance.
    pub fn validate(&self) -> Result<(), ForestError> {
        check(self.tolerance, self.vertex_grid_cell_size, self.min_cell_size)
            .map_err(|message| ForestError::InvalidConfig { message })
    }
}

impl ForestConfigBuilder {
    fn validate_fields(&self) -> Result<(), String> {
        check(
            self.tolerance.unwrap_or(VERTEX_TOLERANCE),
            self.vertex_grid_cell_size
                .unwrap_or(DEFAULT_VERTEX_GRID_CELL_SIZE),
            self.min_cell_size.flatten(),
        )
    }
}

impl From<ForestConfigBuilderError> for ForestError {
    fn from(error: ForestConfigBuilderError) -> Self {
        Self::InvalidConfig {
            message: error.to_string(),
        }
    }
}

fn check(tolerance: f64, grid_cell_size: f64, min_cell_size: Option<f64>) -> Result<(), String> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(format!("tolerance must be finite and positive, got {tolerance}"));
    }
    if !(grid_cell_size.is_finite() && grid_cell_size > 0.0) {
        return Err(format!(
            "vertex_grid_cell_size must be finite and positive, got {grid_cell_size}"
        ));
    }
    if grid_cell_size < tolerance {
        return Err(format!(
            "vertex_grid_cell_size ({grid_cell_size}) must not be smaller than tolerance ({tolerance})"
        ));
    }
    if let Some(min) = min_cell_size
        && !(min.is_finite() && min > 0.0)
    {
        return Err(format!("min_cell_size must be finite and positive, got {min}"));
    }
    Ok(())
}
