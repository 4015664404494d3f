//! Error types.
//!
//! All errors derive [`thiserror::Error`].

use thiserror::Error;

/// Returned when a physics operation receives input outside its domain.
///
/// Inputs coming from the page are clamped before they reach the formulas, so
/// in practice this surfaces only from direct library calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameter {
    #[error("well width must be positive and finite; got {0}")]
    Width(f64),

    #[error("quantum number must be at least 1; got {0}")]
    Level(u32),

    #[error("a curve needs at least 2 samples; got {0}")]
    Resolution(usize),

    #[error("scan range must satisfy 0 < min <= max; got [{0}, {1}]")]
    ScanRange(f64, f64),

    /// A grid was reused for a well of a different width.
    #[error("grid spans a {grid} nm well but the well is {well} nm wide")]
    GridWidth { grid: f64, well: f64 },

    #[error("curve has {0} samples but its grid has {1}")]
    Misaligned(usize, usize),
}

impl InvalidParameter {
    pub(crate) fn check_width(width: f64) -> Result<(), Self> {
        (width.is_finite() && width > 0.0).then_some(()).ok_or(Self::Width(width))
    }

    pub(crate) fn check_level(level: u32) -> Result<(), Self> {
        (level >= 1).then_some(()).ok_or(Self::Level(level))
    }

    pub(crate) fn check_resolution(resolution: usize) -> Result<(), Self> {
        (resolution >= 2).then_some(()).ok_or(Self::Resolution(resolution))
    }

    pub(crate) fn check_scan_range(min: f64, max: f64) -> Result<(), Self> {
        (min.is_finite() && max.is_finite() && min > 0.0 && max >= min)
            .then_some(())
            .ok_or(Self::ScanRange(min, max))
    }

    pub(crate) fn check_grid_width(grid: f64, well: f64) -> Result<(), Self> {
        (grid == well).then_some(()).ok_or(Self::GridWidth { grid, well })
    }

    pub(crate) fn check_aligned(values: usize, grid: usize) -> Result<(), Self> {
        (values == grid).then_some(()).ok_or(Self::Misaligned(values, grid))
    }
}

/// Returned from model loading and prediction.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model download error: {0}")]
    Download(#[from] reqwest::Error),

    /// The forest parsed but its node arrays do not describe valid trees.
    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("model expects {expected} features per sample; got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("model returned {0} predictions for a single sample")]
    PredictionCount(usize),

    #[error(transparent)]
    Parameter(#[from] InvalidParameter),
}
