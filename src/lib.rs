//! proflik — robust profile-likelihood upper limits and significance estimation.
//!
//! Purpose
//! -------
//! Drive a likelihood-maximization procedure over a parameterized statistical
//! model and robustly recover either a confidence-interval upper edge or a
//! discovery significance, even when the underlying numerical minimizer is
//! unreliable. The crate retries with perturbed starting conditions, widens
//! the search range adaptively, and applies a median/outlier consensus rule
//! across repeated trials before accepting an answer.
//!
//! Key behaviors
//! -------------
//! - Orchestrate bounded retry loops with randomized restarts and optional
//!   pre-fit quality gating (`limits::ProfileLikelihood`).
//! - Delegate all likelihood maximization to a pluggable calculator seam
//!   (`calculator::traits::LikelihoodCalculator`); the default implementation
//!   (`calculator::profile::ProfileCalculator`) profiles the negative
//!   log-likelihood with `argmin` L-BFGS.
//! - Scope process-wide minimizer defaults with
//!   `calculator::minimizer::MinimizerSentry` so one run's solver
//!   configuration never leaks into the next.
//! - Represent the statistical model as a `model::workspace::Workspace` of
//!   named parameters, densities, nuisance sets, and named snapshots.
//!
//! Invariants & assumptions
//! ------------------------
//! - The parameter-of-interest upper bound only ever grows within a single
//!   interval search and is restored via the `"clean"` snapshot before every
//!   new trial.
//! - All shared mutable state (minimizer defaults, workspace parameter
//!   values) is single-writer within one `run` call; callers must not share a
//!   workspace across concurrent runs.
//! - Library code reports failures through typed errors and `Option` results;
//!   it never panics on invalid input.
//!
//! Conventions
//! -----------
//! - The parameter of interest is conventionally the signal-strength
//!   parameter `r`; the clean snapshot is named `"clean"`; the nuisance set
//!   and signal density are designated explicitly on the workspace.
//! - Calculator failures (non-convergence, degenerate results) abandon the
//!   current trial and retry; only exhausting the trial budget or the outlier
//!   cap surfaces as an unsuccessful run.
//!
//! Downstream usage
//! ----------------
//! - Build a [`model::workspace::Workspace`] with the parameter of interest,
//!   nuisance parameters, densities, and a `"clean"` snapshot; build a
//!   [`limits::options::ProfileLikelihoodOptions`]; then run
//!   [`limits::ProfileLikelihood::run`] against a [`model::dataset::Dataset`].
//! - Custom calculators (e.g. test stubs or alternative backends) implement
//!   [`calculator::traits::LikelihoodCalculator`].
//!
//! Testing notes
//! -------------
//! - Orchestration properties (consensus boundaries, range-doubling caps,
//!   signed-zero significance handling, sentry restoration) are covered by
//!   integration tests with scripted stub calculators.
//! - The default calculator is validated against analytic Gaussian-mean
//!   results and a small counting experiment.

pub mod calculator;
pub mod diagnostics;
pub mod limits;
pub mod model;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use proflik::prelude::*;
//
// to import the main crate surface in a single line.

pub mod prelude {
    pub use crate::calculator::{
        minimizer::MinimizerSentry,
        profile::ProfileCalculator,
        traits::{
            CovQuality, FitOutcome, HypoTestOutcome, LikelihoodCalculator, LikelihoodInterval,
        },
    };
    pub use crate::limits::{
        errors::{LimitError, LimitResult},
        options::{Mode, ProfileLikelihoodOptions},
        ProfileLikelihood,
    };
    pub use crate::model::{
        counting::{Channel, CountingPdf},
        dataset::Dataset,
        errors::{ModelError, ModelResult},
        params::RealVar,
        pdf::{GaussianPrior, NuisancePrior, ParamValues, Pdf},
        workspace::{Workspace, CLEAN_SNAPSHOT},
    };
}
