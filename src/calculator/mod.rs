//! calculator — the likelihood-calculator seam and its default backend.
//!
//! Purpose
//! -------
//! Bundle everything between the retry orchestrator and the numerics: the
//! [`LikelihoodCalculator`] trait with its result carriers ([`traits`]), the
//! process-wide minimizer defaults and their scoped sentry ([`minimizer`]),
//! and the default `argmin`-backed implementation ([`profile`]) with its
//! bound transforms ([`transform`]) and NLL adapter ([`adapter`]).
//!
//! Key behaviors
//! -------------
//! - The orchestrator only ever talks to [`LikelihoodCalculator`]; scripted
//!   stubs and alternative backends plug in at that seam.
//! - [`MinimizerSentry`] makes a run's solver selection scoped: the default
//!   calculator reads the process-wide triple at every solve, and the sentry
//!   guarantees the previous triple returns on every exit path.
//! - [`ProfileCalculator`] maps bounded parameters into unconstrained
//!   coordinates, minimizes with L-BFGS, and derives interval edges,
//!   significance, and fit diagnostics from profiled NLL values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Calculators never mutate the workspace; any `Err` they return is a
//!   failed trial, not a fatal condition.
//! - The minimizer defaults are the only process-wide mutable state in this
//!   layer; access is serialized behind a mutex.
//!
//! Testing notes
//! -------------
//! - Each submodule unit-tests its own behavior; the default calculator is
//!   pinned against analytic Gaussian-mean results. Orchestrator-facing
//!   behavior is exercised by the integration suites with scripted stubs.

pub mod adapter;
pub mod errors;
pub mod minimizer;
pub mod profile;
pub mod traits;
pub mod transform;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{CalcError, CalcResult};
pub use self::minimizer::{current_defaults, MinimizerDefaults, MinimizerSentry};
pub use self::profile::ProfileCalculator;
pub use self::traits::{
    CovQuality, FitOutcome, HypoTestOutcome, LikelihoodCalculator, LikelihoodInterval,
};
