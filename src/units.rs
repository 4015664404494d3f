#![allow(non_upper_case_globals)]

//! Physical constants and the unit conversions used by the well formulas.
//!
//! Lengths enter the crate in nanometers and energies leave it in
//! electron-volts; everything in between is SI.

/// reduced Planck constant (J s)
pub const hbar: f64 = 1.0545718e-34;

/// electron mass (kg)
pub const me: f64 = 9.10938356e-31;

/// elementary charge (J eV^-1)
pub const e: f64 = 1.60218e-19;

/// meters per nanometer
pub const NM: f64 = 1e-9;

/// Convert a length in nanometers to meters.
pub fn nm_to_m(x: f64) -> f64 {
    x * NM
}

/// Convert an energy in joules to electron-volts.
pub fn joule_to_ev(energy: f64) -> f64 {
    energy / e
}
