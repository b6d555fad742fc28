//! Evaluation of harmonic oscillator eigenstates, `ψₙ(x, t) = φₙ(x) e^(-iEₙt/ħ)`.
//!
//! The spatial part is
//! ```text
//! φₙ(x) = Cₙ Hₙ(α x) exp(-α² x² / 2)
//!
//! α  = sqrt(m ω / ħ)
//! Cₙ = (m ω / π ħ)^(1/4) / sqrt(2ⁿ n!)
//! ```
//! and is real; all time dependence lives in a unit-modulus phase factor.

use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ LengthError, QhoError },
    grid::SpatialGrid,
    hermite,
    units::Oscillator,
    utils::{ argmax, trapz },
};

pub type QResult<T> = Result<T, QhoError>;

/// Time-independent spatial part `φₙ(x)` of an eigenstate over a grid.
pub type StationaryFactor = nd::Array1<f64>;

/// One frame of plot-ready data.
///
/// All arrays have the length of the grid they were computed over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Quantum number.
    pub n: usize,
    /// Time.
    pub t: f64,
    /// Sample positions.
    pub x: nd::Array1<f64>,
    /// `Re ψ`
    pub real: nd::Array1<f64>,
    /// `Im ψ`
    pub imag: nd::Array1<f64>,
    /// `|ψ|²`
    pub probability: nd::Array1<f64>,
    /// Trap potential `m ω² x² / 2`.
    pub potential: nd::Array1<f64>,
}

impl Sample {
    /// Number of positions.
    pub fn len(&self) -> usize { self.x.len() }

    pub fn is_empty(&self) -> bool { self.x.is_empty() }

    /// Trapezoidal integral of the probability density.
    ///
    /// *Panics if the sample has fewer than 2 points*.
    pub fn norm(&self) -> f64 {
        let dx = self.x[1] - self.x[0];
        trapz(&self.probability, dx)
    }

    /// Position and value of the largest probability density.
    pub fn peak(&self) -> Option<(f64, f64)> {
        argmax(&self.probability).map(|(k, p)| (self.x[k], p))
    }

    /// Human-readable state description, e.g. `"Quantum number n=0\nTime: 0.0"`.
    pub fn label(&self) -> String {
        format!("Quantum number n={}\nTime: {:.1}", self.n, self.t)
    }
}

/// Pure evaluator for a fixed oscillator.
///
/// Holds no mutable state and is safe to share between threads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Evaluator {
    osc: Oscillator,
}

impl Evaluator {
    pub fn new(osc: Oscillator) -> Self { Self { osc } }

    pub fn oscillator(&self) -> &Oscillator { &self.osc }

    /// Full normalization constant `Cₙ`.
    ///
    /// Fails with [`QhoError::NumericOverflow`] if `2ⁿ n!` or `Cₙ` leave the
    /// range of finite, non-zero doubles.
    pub fn normalization(&self, n: usize) -> QResult<f64> {
        hermite::norm_factor(n)
            .map(|c| self.osc.prefactor() * c)
            .filter(|c| c.is_finite() && *c > 0.0)
            .ok_or(QhoError::NumericOverflow { n })
    }

    /// Compute `φₙ` over a grid.
    pub fn stationary(&self, grid: &SpatialGrid, n: usize)
        -> QResult<StationaryFactor>
    {
        let cn = self.normalization(n)?;
        let alpha = self.osc.alpha();
        let series = hermite::unit_series(n);
        let phi: StationaryFactor
            = grid.x().mapv(|xk| {
                let ax = alpha * xk;
                cn * hermite::hermval(ax, &series) * (-ax * ax / 2.0).exp()
            });
        phi.iter().all(|pk| pk.is_finite())
            .then_some(phi)
            .ok_or(QhoError::NumericOverflow { n })
    }

    /// Phase factor `exp(-i (n + 1/2) ω t)`.
    pub fn phase(&self, n: usize, t: f64) -> C64 {
        C64::cis(-(n as f64 + 0.5) * self.osc.omega * t)
    }

    /// Assemble a [`Sample`] from a precomputed stationary factor.
    ///
    /// Fails if `phi` was not computed over `grid` or if the phase at `t` is
    /// not finite.
    pub fn sample(
        &self,
        grid: &SpatialGrid,
        phi: &StationaryFactor,
        n: usize,
        t: f64,
    ) -> QResult<Sample>
    {
        LengthError::check(grid.len(), phi.len())?;
        let z = self.phase(n, t);
        z.is_finite().then_some(()).ok_or(QhoError::InvalidTime(t))?;
        let mut real: nd::Array1<f64> = nd::Array1::zeros(phi.len());
        let mut imag: nd::Array1<f64> = nd::Array1::zeros(phi.len());
        nd::Zip::from(&mut real).and(&mut imag).and(phi)
            .for_each(|re, im, pk| {
                let psi = z * *pk;
                *re = psi.re;
                *im = psi.im;
            });
        Ok(Sample {
            n,
            t,
            x: grid.x().clone(),
            real,
            imag,
            probability: phi.mapv(|pk| pk * pk),
            potential: grid.x().mapv(|xk| self.osc.potential(xk)),
        })
    }

    /// Compute `ψₙ(x, t)` over a grid without any caching.
    pub fn evaluate(&self, grid: &SpatialGrid, n: usize, t: f64)
        -> QResult<Sample>
    {
        let phi = self.stationary(grid, n)?;
        self.sample(grid, &phi, n, t)
    }
}
