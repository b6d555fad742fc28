//! Immutable, evenly spaced sample positions.

use std::sync::{
    Arc,
    atomic::{ AtomicU64, Ordering },
};
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::error::ConfigError;

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [`SpatialGrid`].
///
/// Two grids built from the same bounds are still distinct; clones of a grid
/// share its identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(u64);

/// Bounds and resolution of a [`SpatialGrid`], as read from configuration.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Leftmost sample position.
    pub min: f64,
    /// Rightmost sample position.
    pub max: f64,
    /// Number of sample positions, including both endpoints.
    pub points: usize,
}

impl Default for GridSpec {
    fn default() -> Self { Self { min: -5.0, max: 5.0, points: 1000 } }
}

impl GridSpec {
    /// Check that the bounds are finite and ordered and that there are at
    /// least two points.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_domain(self.min, self.max)?;
        ConfigError::check_points(self.points)?;
        Ok(())
    }
}

/// Ordered sequence of `points` evenly spaced positions in `[min, max]`.
///
/// Cheap to clone.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    id: GridId,
    spec: GridSpec,
    x: Arc<nd::Array1<f64>>,
}

impl SpatialGrid {
    /// Build a grid, failing if `spec` does not validate.
    pub fn new(spec: GridSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        let x = nd::Array1::linspace(spec.min, spec.max, spec.points);
        let id = GridId(NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed));
        Ok(Self { id, spec, x: Arc::new(x) })
    }

    /// Shorthand for [`Self::new`].
    pub fn linspace(min: f64, max: f64, points: usize)
        -> Result<Self, ConfigError>
    {
        Self::new(GridSpec { min, max, points })
    }

    pub fn id(&self) -> GridId { self.id }

    pub fn spec(&self) -> GridSpec { self.spec }

    /// Sample positions.
    pub fn x(&self) -> &nd::Array1<f64> { &self.x }

    pub fn len(&self) -> usize { self.x.len() }

    /// Always `false`; grids hold at least two points.
    pub fn is_empty(&self) -> bool { self.x.is_empty() }

    /// Spacing between adjacent positions.
    pub fn dx(&self) -> f64 {
        (self.spec.max - self.spec.min) / (self.spec.points - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_spacing() {
        let grid = SpatialGrid::linspace(-5.0, 5.0, 11).unwrap();
        assert_eq!(grid.len(), 11);
        assert_eq!(grid.x()[0], -5.0);
        assert_eq!(grid.x()[10], 5.0);
        assert!((grid.dx() - 1.0).abs() < 1e-15);
        assert!((grid.x()[1] - grid.x()[0] - grid.dx()).abs() < 1e-12);
    }

    #[test]
    fn identity_is_per_construction() {
        let a = SpatialGrid::linspace(0.0, 1.0, 3).unwrap();
        let b = SpatialGrid::linspace(0.0, 1.0, 3).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(matches!(
            SpatialGrid::linspace(1.0, 1.0, 10),
            Err(ConfigError::BadDomain(..)),
        ));
        assert!(matches!(
            SpatialGrid::linspace(1.0, -1.0, 10),
            Err(ConfigError::BadDomain(..)),
        ));
        assert!(matches!(
            SpatialGrid::linspace(f64::NEG_INFINITY, 1.0, 10),
            Err(ConfigError::BadDomain(..)),
        ));
        assert!(matches!(
            SpatialGrid::linspace(-1.0, 1.0, 1),
            Err(ConfigError::BadPointCount(1)),
        ));
    }
}
