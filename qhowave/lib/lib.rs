//! Time-dependent quantum harmonic oscillator eigenstates, evaluated over a
//! spatial grid and republished as plot-ready samples whenever the quantum
//! number, the time, or a clock tick changes.
//!
//! Pipeline:
//! - [`wavefunction::Evaluator`] computes `ψₙ(x, t)` from Hermite polynomials
//!   and factorial normalization, failing loudly on overflow;
//! - [`cache::SampleCache`] memoizes the time-independent part per quantum
//!   number and grid;
//! - [`scheduler::UpdateScheduler`] coalesces selection, time-control, and
//!   [`clock`] triggers into evaluate→publish cycles, delivered to a
//!   [`render::Renderer`].
//!
//! See [`docs`] for theoretical background.
//!
//! # Example
//! ```
//! use qhowave::{ config::Config, render::Mailbox, scheduler::UpdateScheduler };
//!
//! let mailbox = Mailbox::new();
//! let mut sched = UpdateScheduler::new(Config::default(), mailbox.clone())
//!     .unwrap();
//! let controls = sched.controls();
//! controls.select_quantum_number(3).unwrap();
//! controls.set_time(1.0).unwrap();
//! sched.run_pending().unwrap();
//! let sample = mailbox.take().unwrap();
//! assert_eq!((sample.n, sample.t), (3, 1.0));
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod hermite;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod units;
pub mod utils;
pub mod wavefunction;

pub mod docs;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
