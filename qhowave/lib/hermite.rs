//! Physicists' Hermite polynomials and the factorial-based normalization of
//! harmonic oscillator eigenstates.

use num_traits::Float;

/// Evaluate the Hermite series `Σₖ c[k] Hₖ(x)` at `x`.
///
/// Uses Clenshaw's backward recurrence for the physicists' polynomials,
/// `Hₖ₊₁(x) = 2x Hₖ(x) - 2k Hₖ₋₁(x)`, so no individual `Hₖ` is ever formed
/// explicitly. An empty series evaluates to zero.
pub fn hermval<F>(x: F, c: &[F]) -> F
where F: Float
{
    let two = F::one() + F::one();
    let x2 = two * x;
    match c.len() {
        0 => F::zero(),
        1 => c[0],
        2 => c[0] + c[1] * x2,
        len => {
            let mut nd = F::from(len).unwrap_or_else(F::infinity);
            let mut c0 = c[len - 2];
            let mut c1 = c[len - 1];
            for &ck in c[..len - 2].iter().rev() {
                let tmp = c0;
                nd = nd - F::one();
                c0 = ck - c1 * (two * (nd - F::one()));
                c1 = tmp + c1 * x2;
            }
            c0 + c1 * x2
        }
    }
}

/// Coefficients `[0, ..., 0, 1]` of length `n + 1` selecting `Hₙ` alone from
/// a Hermite series.
pub fn unit_series(n: usize) -> Vec<f64> {
    let mut c = vec![0.0; n + 1];
    c[n] = 1.0;
    c
}

/// Evaluate `Hₙ(x)`.
pub fn hermite(n: usize, x: f64) -> f64 {
    hermval(x, &unit_series(n))
}

/// Largest `n` for which `n!` is finite in double precision.
pub const MAX_FINITE_FACTORIAL: usize = 170;

/// `n!` in double precision; infinite for `n > 170`.
pub fn factorial(n: usize) -> f64 {
    if n > MAX_FINITE_FACTORIAL { return f64::INFINITY; }
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// `1 / sqrt(2ⁿ n!)`, the `n`-dependent part of the eigenstate normalization.
///
/// Returns `None` if the computation leaves the range of finite, non-zero
/// doubles.
pub fn norm_factor(n: usize) -> Option<f64> {
    if n > MAX_FINITE_FACTORIAL { return None; }
    let denom = 2.0_f64.powi(i32::try_from(n).ok()?) * factorial(n);
    let c = denom.sqrt().recip();
    (denom.is_finite() && c.is_finite() && c > 0.0).then_some(c)
}
