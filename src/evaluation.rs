//! One page refresh: clamp the slider values, run the physics, and package
//! everything the page draws.

use serde::{Deserialize, Serialize};

use crate::config::HostConfig;
use crate::error::InvalidParameter;
use crate::model::{estimate_energy, EnergyEstimate, EnergyPredictor};
use crate::physics::{
    analytic_energy, energy_curve, node_count, normalization, EnergyCurve, ProbabilityCurve,
    SampleGrid, WaveformCurve, WellParameters,
};

/// Raw query string of `/evaluate`.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub width: Option<f64>,
    pub level: Option<u32>,
    pub resolution: Option<usize>,
}

/// Slider values after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WellRequest {
    pub width: f64,
    pub level: u32,
    pub resolution: usize,
}

pub fn clamp(q: &ViewQuery, config: &HostConfig) -> WellRequest {
    let width = q
        .width
        .filter(|w| w.is_finite())
        .map_or(config.width.default, |w| config.width.clamp(w));
    let level = q.level.map_or(config.level.default, |n| config.level.clamp(n));
    let resolution = q
        .resolution
        .map_or(config.resolution.default, |r| config.resolution.clamp(r));
    WellRequest { width, level, resolution }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub width: f64,
    pub level: u32,
    pub analytic_ground: f64,
    pub predicted_ground: Option<f64>,
    /// predicted − analytic ground-state energy (eV)
    pub deviation: Option<f64>,
    pub relative_deviation: Option<f64>,
    pub analytic_level: f64,
    pub note: Option<String>,
    pub x: SampleGrid,
    pub psi: WaveformCurve,
    pub probability: ProbabilityCurve,
    pub normalization: f64,
    pub nodes: u32,
}

/// Compute the payload for one request. A missing or failing model leaves
/// the prediction and deviation fields empty and explains why in `note`.
pub fn evaluate(
    req: WellRequest,
    predictor: Option<&dyn EnergyPredictor>,
) -> Result<Evaluation, InvalidParameter> {
    let params = WellParameters::new(req.width, req.level)?;
    let (x, psi, probability) = params.sample(req.resolution)?;

    let (estimate, note): (Option<EnergyEstimate>, _) = match predictor {
        Some(model) => match estimate_energy(params, model) {
            Ok(estimate) => (Some(estimate), None),
            Err(e) => {
                log::warn!("prediction failed for L = {} nm: {e}", params.width);
                (None, Some(format!("prediction failed: {e}")))
            }
        },
        None => (None, Some("model unavailable; showing analytic values only".to_string())),
    };

    log::debug!(
        "evaluated L = {} nm, n = {}, {} samples",
        params.width,
        params.level,
        req.resolution
    );

    Ok(Evaluation {
        width: params.width,
        level: params.level,
        analytic_ground: analytic_energy(params.width, 1)?,
        predicted_ground: estimate.map(|est| est.predicted_ground),
        deviation: estimate.map(|est| est.deviation()),
        relative_deviation: estimate.map(|est| est.relative_deviation()),
        analytic_level: params.energy(),
        note,
        normalization: normalization(&probability, &x)?,
        nodes: node_count(params.level),
        x,
        psi,
        probability,
    })
}

/// The energy-vs-width curve shown under the wavefunction plots.
pub fn scan(config: &HostConfig) -> Result<EnergyCurve, InvalidParameter> {
    let s = config.scan;
    energy_curve((s.min_width, s.max_width), s.steps, s.level)
}
