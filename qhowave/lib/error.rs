//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check(na: usize, nb: usize) -> Result<(), Self> {
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned from a [`Renderer`][crate::render::Renderer] that cannot accept
/// a sample.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The publish target is not ready, e.g. the display has not been
    /// initialized yet or has already been torn down.
    #[error("render target unavailable: {0}")]
    Unavailable(String),
}

/// Returned from the evaluation pipeline and its input controls.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum QhoError {
    /// Returned when a requested quantum number exceeds the configured
    /// maximum.
    #[error("quantum number must be at most {max}; got {n}")]
    InvalidQuantumNumber { n: usize, max: usize },

    /// Returned when the normalization constant or the Hermite polynomial
    /// evaluates to a non-finite value.
    #[error("wavefunction evaluation overflowed for n = {n}")]
    NumericOverflow { n: usize },

    /// Returned when a time or speed control receives a non-finite value.
    #[error("time controls must be finite; got {0}")]
    InvalidTime(f64),

    /// Returned when the renderer rejected a completed sample.
    #[error("render port unavailable: {0}")]
    RenderPortUnavailable(#[from] RenderError),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),
}

impl QhoError {
    pub(crate) fn check_quantum_number(n: usize, max: usize)
        -> Result<(), Self>
    {
        (n <= max).then_some(()).ok_or(Self::InvalidQuantumNumber { n, max })
    }

    pub(crate) fn check_finite(t: f64) -> Result<(), Self> {
        t.is_finite().then_some(()).ok_or(Self::InvalidTime(t))
    }
}

/// Returned when a configuration cannot be loaded or fails validation.
///
/// These are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a spatial domain is empty, reversed, or non-finite.
    #[error("spatial domain must satisfy min < max with finite bounds; got [{0}, {1}]")]
    BadDomain(f64, f64),

    /// Returned when a grid has fewer than 2 points.
    #[error("grid must have at least 2 points; got {0}")]
    BadPointCount(usize),

    /// Returned when a physical constant is non-positive or non-finite.
    #[error("physical constant `{0}` must be finite and greater than 0; got {1}")]
    BadConstant(&'static str, f64),

    /// Returned when the clock period is zero.
    #[error("clock period must be greater than 0 ms")]
    BadPeriod,

    /// Returned when a clock parameter is non-finite or out of range.
    #[error("clock parameter `{0}` is out of range; got {1}")]
    BadClock(&'static str, f64),

    /// Returned when the cache capacity is zero.
    #[error("cache capacity must be greater than 0")]
    BadCapacity,

    /// Returned when the configured maximum quantum number cannot be
    /// normalized in double precision.
    #[error("maximum quantum number {0} overflows the normalization constant")]
    MaxQuantumNumber(usize),

    /// Returned when the grid is too narrow or too coarse to hold a permitted
    /// eigenstate, i.e. its sampled norm misses 1 by more than
    /// [`NORM_TOLERANCE`][crate::config::NORM_TOLERANCE].
    #[error("grid cannot represent quantum number {n}: sampled norm is {norm}")]
    GridTooNarrow { n: usize, norm: f64 },

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing a configuration file failed.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn check_domain(min: f64, max: f64) -> Result<(), Self> {
        (min.is_finite() && max.is_finite() && min < max)
            .then_some(())
            .ok_or(Self::BadDomain(min, max))
    }

    pub(crate) fn check_points(points: usize) -> Result<(), Self> {
        (points >= 2).then_some(()).ok_or(Self::BadPointCount(points))
    }

    pub(crate) fn check_constant(name: &'static str, val: f64)
        -> Result<(), Self>
    {
        (val.is_finite() && val > 0.0)
            .then_some(())
            .ok_or(Self::BadConstant(name, val))
    }
}
