//! Miscellaneous tools for working with sampled wavefunctions.

use ndarray as nd;
use num_traits::Float;
use crate::{ Arr1, error::LengthError };

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &Arr1<S>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Float,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    let inner = y.iter().skip(1).take(n - 2)
        .fold(A::zero(), |acc, yk| acc + *yk);
    (dx / two) * (y[0] + two * inner + y[n - 1])
}

/// Calculate the norm of a real-valued wavefunction, i.e. the integral of its
/// square.
///
/// *Panics if `q` has length less than 2*.
pub fn wf_norm<S>(q: &Arr1<S>, dx: f64) -> f64
where S: nd::Data<Elem = f64>
{
    trapz(&q.mapv(|qk| qk * qk), dx)
}

/// Calculate the inner product of two real-valued wavefunctions sampled over
/// the same grid.
///
/// *Panics if either array has length less than 2*.
pub fn wf_dot<S, T>(q: &Arr1<S>, p: &Arr1<T>, dx: f64)
    -> Result<f64, LengthError>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    LengthError::check(q.len(), p.len())?;
    let prod: nd::Array1<f64>
        = nd::Zip::from(q).and(p).map_collect(|qk, pk| qk * pk);
    Ok(trapz(&prod, dx))
}

/// Index and value of the largest element, ignoring NaNs.
///
/// Returns `None` for an empty array.
pub fn argmax<S>(y: &Arr1<S>) -> Option<(usize, f64)>
where S: nd::Data<Elem = f64>
{
    y.iter().copied().enumerate()
        .filter(|(_, yk)| !yk.is_nan())
        .fold(None, |acc, (k, yk)| {
            match acc {
                Some((_, ymax)) if ymax >= yk => acc,
                _ => Some((k, yk)),
            }
        })
}
