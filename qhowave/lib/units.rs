#![allow(non_upper_case_globals)]

//! Physical constants and the parameters of a single harmonic trap.
//!
//! Concrete physical constants are taken from NIST.

use std::f64::consts::{ PI, TAU };
use serde::{ Deserialize, Serialize };
use crate::error::ConfigError;

/// Planck constant (kg m^2 s^-1)
pub const h: f64 = 6.62607015e-34;
//             +/- 0 (exact)

/// reduced Planck constant (kg m^2 s^-1)
pub const hbar: f64 = h / 2.0 / PI;
//                +/- 0 (exact)

/// electron mass (kg)
pub const me: f64 = 9.1093837015e-31;
//              +/- 0.0000000028e-31

/// unified atomic mass unit (kg)
pub const mu: f64 = 1.66053906660e-27;
//              +/- 0.00000000050e-27

/// Mass, angular frequency, and reduced Planck constant of a one-dimensional
/// harmonic oscillator, `V(x) = m ω² x² / 2`.
///
/// All three must share a single unit system. The default is the natural
/// system `m = ω = ħ = 1`, where lengths are measured in units of the ground
/// state width `sqrt(ħ / m ω)` and times in units of `1 / ω`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Oscillator {
    /// Particle mass.
    pub mass: f64,
    /// Angular trap frequency.
    pub omega: f64,
    /// Reduced Planck constant in the chosen unit system.
    pub hbar: f64,
}

impl Default for Oscillator {
    fn default() -> Self { Self::natural() }
}

impl Oscillator {
    /// `m = ω = ħ = 1`.
    pub fn natural() -> Self {
        Self { mass: 1.0, omega: 1.0, hbar: 1.0 }
    }

    /// Construct from a mass (kg) and angular frequency (s^-1) in
    /// meters/kilograms/seconds (MKS) units.
    ///
    /// Positions are then in meters and times in seconds, so a spatial grid
    /// must span a few multiples of [`Self::length_scale`] to be useful.
    pub fn from_mks(mass: f64, omega: f64) -> Self {
        Self { mass, omega, hbar }
    }

    /// Check that all constants are finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_constant("mass", self.mass)?;
        ConfigError::check_constant("omega", self.omega)?;
        ConfigError::check_constant("hbar", self.hbar)?;
        Ok(())
    }

    /// Inverse length scale `α = sqrt(m ω / ħ)`.
    pub fn alpha(&self) -> f64 {
        (self.mass * self.omega / self.hbar).sqrt()
    }

    /// Ground state width `1 / α`.
    pub fn length_scale(&self) -> f64 { self.alpha().recip() }

    /// `(m ω / π ħ)^(1/4)`, the `n`-independent part of the normalization
    /// constant.
    pub fn prefactor(&self) -> f64 {
        (self.mass * self.omega / (PI * self.hbar)).powf(0.25)
    }

    /// Energy of the `n`-th eigenstate, `ħ ω (n + 1/2)`.
    pub fn energy(&self, n: usize) -> f64 {
        self.hbar * self.omega * (n as f64 + 0.5)
    }

    /// Period of the phase factor of the `n`-th eigenstate,
    /// `2π / ((n + 1/2) ω)`.
    pub fn phase_period(&self, n: usize) -> f64 {
        TAU / ((n as f64 + 0.5) * self.omega)
    }

    /// Potential energy at position `x`.
    pub fn potential(&self, x: f64) -> f64 {
        0.5 * self.mass * self.omega.powi(2) * x.powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_units_are_unit_scaled() {
        let osc = Oscillator::natural();
        assert_eq!(osc.alpha(), 1.0);
        assert_eq!(osc.energy(0), 0.5);
        assert_eq!(osc.potential(2.0), 2.0);
        assert!((osc.prefactor() - PI.powf(-0.25)).abs() < 1e-15);
    }

    #[test]
    fn mks_length_scale() {
        // ¹⁷¹Yb in a 30 kHz trap
        let osc = Oscillator::from_mks(171.0 * mu, TAU * 30e3);
        let expected = (hbar / osc.mass / osc.omega).sqrt();
        assert!((osc.length_scale() - expected).abs() / expected < 1e-12);
        assert!(osc.validate().is_ok());
    }

    #[test]
    fn rejects_nonpositive_constants() {
        let osc = Oscillator { mass: 0.0, ..Oscillator::natural() };
        assert!(matches!(osc.validate(), Err(ConfigError::BadConstant("mass", _))));
        let osc = Oscillator { hbar: f64::NAN, ..Oscillator::natural() };
        assert!(matches!(osc.validate(), Err(ConfigError::BadConstant("hbar", _))));
    }
}
