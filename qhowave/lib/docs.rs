//! Theoretical background.
//!
//! # Contents
//! - [Eigenstates](#eigenstates)
//! - [Hermite series](#hermite-series)
//! - [Normalization and overflow](#normalization-and-overflow)
//! - [Time dependence](#time-dependence)
//! - [Units](#units)
//!
//! # Eigenstates
//! The one-dimensional harmonic oscillator has Hamiltonian
//! ```text
//!       ħ²  ∂²     1
//! H = - --- --- + --- m ω² x²
//!       2 m ∂x²    2
//! ```
//! whose bound eigenstates are indexed by a non-negative integer *n* with
//! energies *E*ₙ = *ħω*(*n* + 1/2). In position space,
//! ```text
//! φₙ(x) = Cₙ Hₙ(α x) exp(-α² x² / 2)
//!
//! α  = sqrt(m ω / ħ)
//! Cₙ = (m ω / π ħ)^(1/4) / sqrt(2ⁿ n!)
//! ```
//! where *H*ₙ is the *n*-th physicists' Hermite polynomial. The φₙ are real,
//! have exactly *n* nodes, and form an orthonormal set; on a finite grid the
//! trapezoidal norms and overlaps approach 1 and 0, respectively, as long as
//! the grid extends well past the classical turning points ±sqrt(2 *n* + 1) /
//! α.
//!
//! # Hermite series
//! *H*ₙ is never expanded into monomials. Instead, the series
//! ```text
//! f(x) = Σₖ c[k] Hₖ(x)
//! ```
//! is summed from the highest degree down with Clenshaw's algorithm, using
//! the three-term recurrence
//! ```text
//! Hₖ₊₁(x) = 2 x Hₖ(x) - 2 k Hₖ₋₁(x)
//! ```
//! and *H*ₙ alone is selected by the coefficients `[0, ..., 0, 1]`. This avoids
//! the catastrophic cancellation between large alternating monomial
//! coefficients that an explicit expansion suffers for moderate *n*.
//!
//! # Normalization and overflow
//! Both 2ⁿ and *n*! grow quickly enough that their product leaves the range
//! of a double at *n* = 151 (and *n*! alone at *n* = 171). Far from the
//! origin, *H*ₙ(α*x*) ~ (2α*x*)ⁿ can also overflow before the Gaussian factor
//! brings the product back down, which produces `inf · 0 = NaN`. Either case
//! is reported as [`NumericOverflow`][crate::error::QhoError::NumericOverflow]
//! rather than passed on as a sample, and configurations whose maximum
//! quantum number would hit it over their grid are rejected at startup.
//!
//! # Time dependence
//! A pure eigenstate evolves only by a global phase,
//! ```text
//! ψₙ(x, t) = φₙ(x) exp(-i (n + 1/2) ω t)
//! ```
//! so that
//! ```text
//! Re ψₙ = φₙ cos((n + 1/2) ω t)
//! Im ψₙ = -φₙ sin((n + 1/2) ω t)
//! |ψₙ|² = φₙ²
//! ```
//! The probability density is time-independent, and the real and imaginary
//! parts are periodic in *t* with period 2π / ((*n* + 1/2) ω). Because φₙ
//! depends only on *n* and the grid, it is computed once per quantum number
//! and cached; every later frame costs one complex scalar and a pass over the
//! grid.
//!
//! # Units
//! Mass, frequency, and *ħ* may be given in any consistent unit system. With
//! the default *m* = *ω* = *ħ* = 1, positions are in units of the ground state
//! width sqrt(*ħ* / *mω*), times in units of 1 / *ω*, and the ground state
//! density peaks at 1 / sqrt(π) ≈ 0.564. For SI values, see
//! [`Oscillator::from_mks`][crate::units::Oscillator::from_mks]; the grid must
//! then be given in meters.
