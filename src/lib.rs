//! Particle in a one-dimensional infinite potential well.
//!
//! [`physics`] evaluates the closed-form energies and eigenstates, [`model`]
//! wraps the regression model that predicts the ground-state energy, and
//! [`evaluation`] assembles what the web page draws. Widths are in nanometers
//! and energies in electron-volts throughout.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod physics;
pub mod units;

pub use error::{InvalidParameter, ModelError};
pub use physics::{
    analytic_energy, energy_curve, generate_grid, probability_density, waveform, EnergyCurve,
    ProbabilityCurve, SampleGrid, WaveformCurve, WellParameters,
};
