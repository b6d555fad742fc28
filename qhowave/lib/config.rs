//! Startup configuration.
//!
//! Everything here is fixed once the pipeline is built. Configurations are
//! usually read from a TOML file whose tables mirror the structs below; any
//! omitted table or key takes its default:
//! ```toml
//! [oscillator]
//! mass = 1.0
//! omega = 1.0
//! hbar = 1.0
//!
//! [grid]
//! min = -5.0
//! max = 5.0
//! points = 1000
//!
//! [clock]
//! enabled = true
//! period_ms = 50
//! step = 0.01
//! speed = 50.0
//!
//! [limits]
//! max_quantum_number = 9
//!
//! [cache]
//! capacity = 10
//! ```

use std::{ fs, num::NonZeroUsize, path::Path, time::Duration };
use serde::{ Deserialize, Serialize };
use crate::{
    error::ConfigError,
    grid::{ GridSpec, SpatialGrid },
    units::Oscillator,
    utils::wf_norm,
    wavefunction::Evaluator,
};

/// Default upper bound on the quantum number.
///
/// The outermost classical turning point, `sqrt(2n + 1) / α`, of every
/// permitted state lies inside the default grid.
pub const DEF_MAX_QUANTUM_NUMBER: usize = 9;

/// Largest accepted deviation from 1 of the trapezoidal norm of any permitted
/// eigenstate over the configured grid.
pub const NORM_TOLERANCE: f64 = 5e-3;

/// Autonomous clock settings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Whether the clock runs at all.
    pub enabled: bool,
    /// Time between ticks in milliseconds.
    pub period_ms: u64,
    /// Time advanced per tick at unit speed.
    pub step: f64,
    /// Initial speed multiplier.
    pub speed: f64,
    /// If set, time restarts from zero after reaching this value.
    pub wrap: Option<f64>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period_ms: 50,
            step: 0.01,
            speed: 50.0,
            wrap: None,
        }
    }
}

impl ClockConfig {
    pub fn period(&self) -> Duration { Duration::from_millis(self.period_ms) }

    pub fn validate(&self) -> Result<(), ConfigError> {
        (self.period_ms > 0).then_some(()).ok_or(ConfigError::BadPeriod)?;
        self.step.is_finite().then_some(())
            .ok_or(ConfigError::BadClock("step", self.step))?;
        self.speed.is_finite().then_some(())
            .ok_or(ConfigError::BadClock("speed", self.speed))?;
        if let Some(w) = self.wrap {
            (w.is_finite() && w > 0.0).then_some(())
                .ok_or(ConfigError::BadClock("wrap", w))?;
        }
        Ok(())
    }
}

/// Bounds on externally supplied input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest quantum number accepted from the selection control.
    pub max_quantum_number: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_quantum_number: DEF_MAX_QUANTUM_NUMBER }
    }
}

/// Stationary-factor cache settings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of stored factors; defaults to one per legal quantum
    /// number.
    pub capacity: Option<usize>,
}

/// Full startup configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oscillator: Oscillator,
    pub grid: GridSpec,
    pub clock: ClockConfig,
    pub limits: Limits,
    pub cache: CacheConfig,
}

impl Config {
    /// Parse from TOML text and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and validate.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let config = Self::from_toml_str(&fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Cache capacity after applying the default.
    pub fn cache_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        let cap = self.cache.capacity
            .unwrap_or(self.limits.max_quantum_number.saturating_add(1));
        NonZeroUsize::new(cap).ok_or(ConfigError::BadCapacity)
    }

    /// Check every section, including that every permitted quantum number
    /// can be evaluated over the configured grid and samples to a norm within
    /// [`NORM_TOLERANCE`] of 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.oscillator.validate()?;
        self.grid.validate()?;
        self.clock.validate()?;
        self.cache_capacity()?;
        let max = self.limits.max_quantum_number;
        let grid = SpatialGrid::new(self.grid)?;
        let ev = Evaluator::new(self.oscillator);
        ev.stationary(&grid, max)
            .map_err(|_| ConfigError::MaxQuantumNumber(max))?;
        for n in 0..=max {
            let phi = ev.stationary(&grid, n)
                .map_err(|_| ConfigError::MaxQuantumNumber(max))?;
            let norm = wf_norm(&phi, grid.dx());
            ((norm - 1.0).abs() <= NORM_TOLERANCE).then_some(())
                .ok_or(ConfigError::GridTooNarrow { n, norm })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_capacity().unwrap().get(), 10);
        assert_eq!(config.clock.period(), Duration::from_millis(50));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [grid]
            points = 200

            [limits]
            max_quantum_number = 9

            [clock]
            wrap = 100.0
            "#,
        ).unwrap();
        assert_eq!(config.grid, GridSpec { min: -5.0, max: 5.0, points: 200 });
        assert_eq!(config.limits.max_quantum_number, 9);
        assert_eq!(config.cache_capacity().unwrap().get(), 10);
        assert_eq!(config.clock.wrap, Some(100.0));
        assert_eq!(config.oscillator, Oscillator::natural());
    }

    #[test]
    fn wider_grid_admits_more_states() {
        let config = Config::from_toml_str(
            r#"
            [grid]
            min = -10.0
            max = 10.0
            points = 2000

            [limits]
            max_quantum_number = 30
            "#,
        ).unwrap();
        assert_eq!(config.cache_capacity().unwrap().get(), 31);
        let coarse = "[grid]\npoints = 8\n[limits]\nmax_quantum_number = 0";
        assert!(matches!(
            Config::from_toml_str(coarse),
            Err(ConfigError::GridTooNarrow { n: 0, .. }),
        ));
    }

    #[test]
    fn invalid_sections_are_fatal() {
        assert!(matches!(
            Config::from_toml_str("[grid]\nmin = 1.0\nmax = -1.0"),
            Err(ConfigError::BadDomain(..)),
        ));
        assert!(matches!(
            Config::from_toml_str("[grid]\npoints = 1"),
            Err(ConfigError::BadPointCount(1)),
        ));
        assert!(matches!(
            Config::from_toml_str("[clock]\nperiod_ms = 0"),
            Err(ConfigError::BadPeriod),
        ));
        assert!(matches!(
            Config::from_toml_str("[cache]\ncapacity = 0"),
            Err(ConfigError::BadCapacity),
        ));
        assert!(matches!(
            Config::from_toml_str("[oscillator]\nomega = -1.0"),
            Err(ConfigError::BadConstant("omega", _)),
        ));
        assert!(matches!(
            Config::from_toml_str("[limits]\nmax_quantum_number = 170"),
            Err(ConfigError::MaxQuantumNumber(170)),
        ));
        assert!(matches!(
            Config::from_toml_str("[limits]\nmax_quantum_number = 20"),
            Err(ConfigError::GridTooNarrow { n, .. }) if n > 9 && n <= 20,
        ));
        assert!(matches!(
            Config::from_toml_str("[grid\n"),
            Err(ConfigError::Toml(_)),
        ));
    }
}
