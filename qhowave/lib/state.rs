//! Current viewing parameters.

use crate::{ error::QhoError, wavefunction::QResult };

/// The quantum number and time being displayed, plus the multiplier applied to
/// each clock step.
///
/// Only ever accessed behind the scheduler's lock; every successful mutation
/// bumps [`Self::generation`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuantumState {
    n: usize,
    t: f64,
    speed: f64,
    generation: u64,
}

/// Consistent copy of the parts of a [`QuantumState`] that determine a
/// sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub n: usize,
    pub t: f64,
    pub generation: u64,
}

impl QuantumState {
    pub fn new(n: usize, t: f64, speed: f64) -> Self {
        Self { n, t, speed, generation: 0 }
    }

    pub fn n(&self) -> usize { self.n }

    pub fn t(&self) -> f64 { self.t }

    pub fn speed(&self) -> f64 { self.speed }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { n: self.n, t: self.t, generation: self.generation }
    }

    pub(crate) fn set_n(&mut self, n: usize) {
        self.n = n;
        self.generation += 1;
    }

    pub(crate) fn set_t(&mut self, t: f64) -> QResult<()> {
        QhoError::check_finite(t)?;
        self.t = t;
        self.generation += 1;
        Ok(())
    }

    pub(crate) fn set_speed(&mut self, speed: f64) -> QResult<()> {
        QhoError::check_finite(speed)?;
        self.speed = speed;
        Ok(())
    }

    /// Advance time by `step * speed`, reducing modulo `wrap` if given.
    ///
    /// Leaves the state untouched if the new time is not finite.
    pub(crate) fn advance(&mut self, step: f64, wrap: Option<f64>)
        -> QResult<()>
    {
        let t = self.t + step * self.speed;
        let t = match wrap {
            Some(w) if w > 0.0 => t.rem_euclid(w),
            _ => t,
        };
        QhoError::check_finite(t)?;
        self.t = t;
        self.generation += 1;
        Ok(())
    }
}

impl Default for QuantumState {
    fn default() -> Self { Self::new(0, 0.0, 1.0) }
}
