//! Particle-in-a-box physics for the one-dimensional infinite well.
//! All lengths are in nanometers and all energies in electron-volts.

use std::f64::consts::PI;

use serde::Serialize;

use crate::error::InvalidParameter;
use crate::units::{hbar, joule_to_ev, me, nm_to_m};

/// Well width L (nm) and quantum number n (1, 2, 3, ...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WellParameters {
    pub width: f64,
    pub level: u32,
}

impl WellParameters {
    pub fn new(width: f64, level: u32) -> Result<Self, InvalidParameter> {
        InvalidParameter::check_width(width)?;
        InvalidParameter::check_level(level)?;
        Ok(WellParameters { width, level })
    }

    /// Analytic energy of this level (eV).
    pub fn energy(&self) -> f64 {
        level_energy(self.width, self.level)
    }

    /// Sample grid, wavefunction and probability density in one pass.
    pub fn sample(
        &self,
        resolution: usize,
    ) -> Result<(SampleGrid, WaveformCurve, ProbabilityCurve), InvalidParameter> {
        let grid = generate_grid(self.width, resolution)?;
        let psi = waveform(&grid, *self)?;
        let prob = probability_density(&psi);
        Ok((grid, psi, prob))
    }
}

/// Uniformly spaced x-coordinates over [0, L], both endpoints included.
///
/// Only [`generate_grid`] builds one, so the points never leave [0, width].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleGrid {
    points: Vec<f64>,
    #[serde(skip)]
    width: f64,
}

impl SampleGrid {
    /// Width (nm) of the well this grid spans.
    pub fn width(&self) -> f64 {
        self.width
    }
}

/// ψ(x) values aligned index-for-index with a [`SampleGrid`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WaveformCurve(Vec<f64>);

/// |ψ(x)|² values aligned index-for-index with a [`SampleGrid`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityCurve(Vec<f64>);

macro_rules! curve_accessors {
    ($($ty:ident . $field:tt),*) => {
        $(
            impl $ty {
                pub fn as_slice(&self) -> &[f64] {
                    &self.$field
                }

                pub fn len(&self) -> usize {
                    self.$field.len()
                }

                pub fn is_empty(&self) -> bool {
                    self.$field.is_empty()
                }

                pub fn iter(&self) -> std::slice::Iter<'_, f64> {
                    self.$field.iter()
                }
            }

            impl std::ops::Index<usize> for $ty {
                type Output = f64;

                fn index(&self, i: usize) -> &f64 {
                    &self.$field[i]
                }
            }
        )*
    };
}

curve_accessors!(SampleGrid.points, WaveformCurve.0, ProbabilityCurve.0);

/// One point of an [`EnergyCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyPoint {
    pub width: f64,
    pub energy: f64,
}

/// Analytic energy (eV) over a range of well widths (nm) at a fixed level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyCurve {
    pub level: u32,
    pub points: Vec<EnergyPoint>,
}

impl EnergyCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Calculate E_n = n² π² ħ² / (2 m L²) for an electron in a well of width L
/// (nm), returned in eV.
pub fn analytic_energy(width: f64, level: u32) -> Result<f64, InvalidParameter> {
    InvalidParameter::check_width(width)?;
    InvalidParameter::check_level(level)?;
    Ok(level_energy(width, level))
}

// Assumes validated input.
fn level_energy(width: f64, level: u32) -> f64 {
    let n = level as f64;
    let l = nm_to_m(width);
    let en = n * n * PI * PI * hbar * hbar / (2.0 * me * l * l);
    joule_to_ev(en)
}

/// Generate `resolution` evenly spaced points over [0, L].
///
/// The last point is pinned to exactly `width` so boundary values are not
/// shifted by rounding in `width * t`.
pub fn generate_grid(width: f64, resolution: usize) -> Result<SampleGrid, InvalidParameter> {
    InvalidParameter::check_width(width)?;
    InvalidParameter::check_resolution(resolution)?;
    Ok(SampleGrid { points: linspace(0.0, width, resolution), width })
}

fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let denom = (count - 1) as f64;
    let mut xs = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f64 / denom;
        xs.push(start + (stop - start) * t);
    }
    if let Some(last) = xs.last_mut() {
        *last = stop;
    }
    xs
}

/// Calculate ψ_n(x) = √(2/L) sin(nπx/L) at every grid point.
///
/// The grid must have been generated for the same width as `params`.
pub fn waveform(
    grid: &SampleGrid,
    params: WellParameters,
) -> Result<WaveformCurve, InvalidParameter> {
    InvalidParameter::check_grid_width(grid.width, params.width)?;
    let l = params.width;
    let k = params.level as f64 * PI / l;
    let norm = (2.0 / l).sqrt();
    Ok(WaveformCurve(grid.iter().map(|&x| norm * (k * x).sin()).collect()))
}

/// Calculate |ψ|² elementwise.
pub fn probability_density(psi: &WaveformCurve) -> ProbabilityCurve {
    ProbabilityCurve(psi.iter().map(|&p| p * p).collect())
}

/// Analytic energy at `steps` evenly spaced widths across `width_range`.
pub fn energy_curve(
    width_range: (f64, f64),
    steps: usize,
    level: u32,
) -> Result<EnergyCurve, InvalidParameter> {
    let (min, max) = width_range;
    InvalidParameter::check_scan_range(min, max)?;
    InvalidParameter::check_resolution(steps)?;
    InvalidParameter::check_level(level)?;

    let points = linspace(min, max, steps)
        .into_iter()
        .map(|width| EnergyPoint { width, energy: level_energy(width, level) })
        .collect();
    Ok(EnergyCurve { level, points })
}

/// Integrate sampled values over their grid with the trapezoidal rule.
pub fn trapezoid(values: &[f64], grid: &SampleGrid) -> Result<f64, InvalidParameter> {
    InvalidParameter::check_aligned(values.len(), grid.len())?;
    Ok(grid
        .as_slice()
        .windows(2)
        .zip(values.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum())
}

/// ∫|ψ|² dx over the well; 1 for a properly normalized eigenstate.
pub fn normalization(
    prob: &ProbabilityCurve,
    grid: &SampleGrid,
) -> Result<f64, InvalidParameter> {
    trapezoid(prob.as_slice(), grid)
}

/// Number of interior zeros of ψ_n.
pub fn node_count(level: u32) -> u32 {
    level.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_parameters() {
        assert!(WellParameters::new(1.0, 1).is_ok());
        assert!(WellParameters::new(0.1, 10).is_ok());

        assert_eq!(WellParameters::new(0.0, 1), Err(InvalidParameter::Width(0.0)));
        assert_eq!(WellParameters::new(1.0, 0), Err(InvalidParameter::Level(0)));
        assert!(WellParameters::new(f64::NAN, 1).is_err());
        assert!(WellParameters::new(f64::INFINITY, 1).is_err());
    }

    #[test]
    fn test_ground_state_energy_one_nm() {
        let e1 = analytic_energy(1.0, 1).unwrap();
        assert!((e1 - 0.376).abs() / 0.376 < 0.01, "got {e1}");
    }

    #[test]
    fn test_energy_scales_with_level_and_width() {
        let e1 = analytic_energy(2.0, 1).unwrap();
        let e3 = analytic_energy(2.0, 3).unwrap();
        assert!((e3 / e1 - 9.0).abs() < 1e-9);

        let wide = analytic_energy(4.0, 1).unwrap();
        assert!((e1 / wide - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_monotonic() {
        for &width in &[0.1, 0.5, 1.0, 3.3, 10.0] {
            let mut prev = 0.0;
            for n in 1..=10 {
                let en = analytic_energy(width, n).unwrap();
                assert!(en > 0.0);
                assert!(en > prev);
                prev = en;
            }
        }
        for n in 1..=5 {
            let mut prev = f64::INFINITY;
            for i in 1..=100 {
                let en = analytic_energy(i as f64 * 0.1, n).unwrap();
                assert!(en < prev);
                prev = en;
            }
        }
    }

    #[test]
    fn test_invalid_energy_inputs() {
        assert_eq!(analytic_energy(-1.0, 1), Err(InvalidParameter::Width(-1.0)));
        assert_eq!(analytic_energy(1.0, 0), Err(InvalidParameter::Level(0)));
    }

    #[test]
    fn test_generate_grid() {
        let grid = generate_grid(1.0, 500).unwrap();
        assert_eq!(grid.len(), 500);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[499], 1.0);

        let odd = generate_grid(0.7, 3).unwrap();
        assert_eq!(odd.as_slice(), &[0.0, 0.35, 0.7]);

        let spacing = grid[1] - grid[0];
        for pair in grid.as_slice().windows(2) {
            assert!((pair[1] - pair[0] - spacing).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_grid() {
        assert_eq!(generate_grid(1.0, 1), Err(InvalidParameter::Resolution(1)));
        assert_eq!(generate_grid(1.0, 0), Err(InvalidParameter::Resolution(0)));
        assert!(generate_grid(-2.0, 500).is_err());
    }

    #[test]
    fn test_waveform_boundaries() {
        for &width in &[0.1, 1.0, 4.2, 10.0] {
            for n in 1..=10 {
                let params = WellParameters::new(width, n).unwrap();
                let grid = generate_grid(width, 1000).unwrap();
                let psi = waveform(&grid, params).unwrap();
                assert_eq!(psi.len(), grid.len());
                assert!(psi[0].abs() < 1e-9);
                assert!(psi[psi.len() - 1].abs() < 1e-9, "psi(L) = {}", psi[psi.len() - 1]);
            }
        }
    }

    #[test]
    fn test_waveform_peak() {
        let params = WellParameters::new(2.0, 1).unwrap();
        let grid = generate_grid(2.0, 3).unwrap();
        let psi = waveform(&grid, params).unwrap();
        assert!((psi[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_probability_is_square() {
        let params = WellParameters::new(1.5, 4).unwrap();
        let (_, psi, prob) = params.sample(777).unwrap();
        assert_eq!(prob.len(), psi.len());
        for i in 0..psi.len() {
            assert_eq!(prob[i], psi[i] * psi[i]);
            assert!(prob[i] >= 0.0);
        }
    }

    #[test]
    fn test_normalization() {
        for n in 1..=5 {
            let params = WellParameters::new(3.0, n).unwrap();
            let (grid, _, prob) = params.sample(2000).unwrap();
            assert!((normalization(&prob, &grid).unwrap() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_trapezoid_linear() {
        let grid = generate_grid(2.0, 11).unwrap();
        let ys: Vec<f64> = grid.iter().map(|x| 3.0 * x).collect();
        assert!((trapezoid(&ys, &grid).unwrap() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_energy_curve() {
        let curve = energy_curve((0.1, 5.0), 300, 1).unwrap();
        assert_eq!(curve.len(), 300);
        assert_eq!(curve.points[0].width, 0.1);
        assert_eq!(curve.points[299].width, 5.0);
        for pair in curve.points.windows(2) {
            assert!(pair[1].width > pair[0].width);
            assert!(pair[1].energy <= pair[0].energy);
        }
        assert_eq!(curve.points[0].energy, analytic_energy(0.1, 1).unwrap());
    }

    #[test]
    fn test_invalid_energy_curve() {
        assert_eq!(energy_curve((0.0, 5.0), 300, 1), Err(InvalidParameter::ScanRange(0.0, 5.0)));
        assert!(energy_curve((5.0, 1.0), 300, 1).is_err());
        assert_eq!(energy_curve((0.1, 5.0), 1, 1), Err(InvalidParameter::Resolution(1)));
        assert_eq!(energy_curve((0.1, 5.0), 10, 0), Err(InvalidParameter::Level(0)));
    }

    #[test]
    fn test_waveform_rejects_foreign_grid() {
        let grid = generate_grid(1.5, 3).unwrap();
        let params = WellParameters::new(1.0, 1).unwrap();
        assert_eq!(
            waveform(&grid, params),
            Err(InvalidParameter::GridWidth { grid: 1.5, well: 1.0 })
        );
        assert_eq!(grid.width(), 1.5);
    }

    #[test]
    fn test_trapezoid_misaligned() {
        let grid = generate_grid(1.0, 3).unwrap();
        assert_eq!(trapezoid(&[1.0, 2.0], &grid), Err(InvalidParameter::Misaligned(2, 3)));

        let (_, _, prob) = WellParameters::new(1.0, 1).unwrap().sample(10).unwrap();
        assert!(normalization(&prob, &grid).is_err());
    }

    #[test]
    fn test_node_count() {
        assert_eq!(node_count(1), 0);
        assert_eq!(node_count(4), 3);
    }

    #[test]
    fn test_repeatable() {
        let params = WellParameters::new(2.5, 3).unwrap();
        assert_eq!(params.sample(500).unwrap(), params.sample(500).unwrap());
        assert_eq!(
            analytic_energy(2.5, 3).unwrap().to_bits(),
            analytic_energy(2.5, 3).unwrap().to_bits()
        );
        assert_eq!(energy_curve((0.1, 5.0), 50, 2), energy_curve((0.1, 5.0), 50, 2));
    }
}
