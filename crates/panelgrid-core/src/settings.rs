#![forbid(unsafe_code)]

//! Runtime grid settings.
//!
//! [`RuntimeSettings`] is the set of numbers the interaction machine needs to
//! turn pixels into grid cells. Hosts usually measure the grid once, derive
//! the column width, and push the result into the state container; the
//! static parts can be loaded from TOML or JSON.
//!
//! # Loading
//!
//! ```toml
//! # panelgrid.toml
//! column_count = 24
//! gutter_size = 4.0
//! ```
//!
//! ```rust,ignore
//! let settings = RuntimeSettings::from_toml_file("panelgrid.toml")?;
//! let settings = RuntimeSettings::from_json_str(json)?;
//! ```
//!
//! Fields missing from a file keep their [`Default`] values.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default number of grid columns.
pub const DEFAULT_COLUMN_COUNT: u32 = 48;

/// Default gap between cells, in pixels.
pub const DEFAULT_GUTTER_SIZE: f64 = 8.0;

/// Default row height, in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 26.0;

/// Default column width, in pixels, used until the host measures the grid.
pub const DEFAULT_COLUMN_PIXEL_WIDTH: f64 = 20.0;

/// Pixel metrics of one grid instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Number of columns; column + width of every panel stays within it.
    pub column_count: u32,
    /// Gap between adjacent cells.
    pub gutter_size: f64,
    /// Height of one grid row.
    pub row_height: f64,
    /// Width of one grid column.
    pub column_pixel_width: f64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            column_count: DEFAULT_COLUMN_COUNT,
            gutter_size: DEFAULT_GUTTER_SIZE,
            row_height: DEFAULT_ROW_HEIGHT,
            column_pixel_width: DEFAULT_COLUMN_PIXEL_WIDTH,
        }
    }
}

impl RuntimeSettings {
    /// Pixels from one column start to the next.
    #[inline]
    #[must_use]
    pub fn column_step(&self) -> f64 {
        self.column_pixel_width + self.gutter_size
    }

    /// Pixels from one row start to the next.
    #[inline]
    #[must_use]
    pub fn row_step(&self) -> f64 {
        self.row_height + self.gutter_size
    }

    /// Return a copy with `column_pixel_width` derived from the measured
    /// width of the grid element.
    #[must_use]
    pub fn with_grid_width(mut self, grid_width: f64) -> Self {
        self.column_pixel_width = self.derive_column_width(grid_width);
        self
    }

    /// Column width that makes `column_count` columns and their gutters fill
    /// `grid_width` exactly.
    #[must_use]
    pub fn derive_column_width(&self, grid_width: f64) -> f64 {
        if self.column_count == 0 {
            return 0.0;
        }
        let gutters = self.gutter_size * f64::from(self.column_count.saturating_sub(1));
        ((grid_width - gutters) / f64::from(self.column_count)).max(0.0)
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s).map_err(SettingsError::Toml)?;
        settings.validated()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SettingsError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(s).map_err(SettingsError::Json)?;
        settings.validated()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SettingsError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the settings are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.column_count == 0 {
            errors.push("column_count must be > 0".into());
        }
        if self.row_height <= 0.0 {
            errors.push(format!("row_height must be > 0, got {}", self.row_height));
        }
        if self.gutter_size < 0.0 {
            errors.push(format!("gutter_size must be >= 0, got {}", self.gutter_size));
        }
        if self.column_pixel_width < 0.0 {
            errors.push(format!(
                "column_pixel_width must be >= 0, got {}",
                self.column_pixel_width
            ));
        }
        if self.column_step() <= 0.0 {
            errors.push("column_pixel_width + gutter_size must be > 0".into());
        }

        errors
    }

    fn validated(self) -> Result<Self, SettingsError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SettingsError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading settings.
#[derive(Debug)]
pub enum SettingsError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
