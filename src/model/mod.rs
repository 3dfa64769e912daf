//! model — parameters, datasets, densities, and the mutable workspace.
//!
//! Purpose
//! -------
//! Provide the statistical-model layer the limit-setting core operates on:
//! validated named parameters ([`RealVar`]), observed data ([`Dataset`]),
//! density and prior seams ([`Pdf`], [`NuisancePrior`]), a concrete counting
//! density ([`CountingPdf`]), and the [`Workspace`] that ties them together
//! with named snapshots.
//!
//! Key behaviors
//! -------------
//! - Collect parameter and data containers with validated construction in
//!   [`params`] and [`dataset`]; invalid inputs surface as [`ModelError`]
//!   values, never panics.
//! - Expose the density seams in [`pdf`]: any type implementing [`Pdf`] can
//!   be registered with a workspace and minimized by a calculator, and any
//!   [`NuisancePrior`] can supply randomized restart points.
//! - Ship a Poisson counting density with log-normal systematics in
//!   [`counting`], the canonical model for the crate's tests and demos.
//! - Centralize model-level errors in [`errors`] (`ModelError` and the
//!   `ModelResult` alias).
//!
//! Invariants & assumptions
//! ------------------------
//! - Every [`RealVar`] satisfies `min < max` and `min <= value <= max` with
//!   finite bounds; value assignments clamp rather than fail.
//! - Workspace snapshots capture value *and* bounds, so range mutations from
//!   one trial never leak into the next once the clean snapshot is reloaded.
//! - Densities are pure functions of a [`ParamValues`] assignment and a
//!   dataset; they perform no I/O and mutate nothing.
//!
//! Conventions
//! -----------
//! - The pristine pre-run parameter state is saved under [`CLEAN_SNAPSHOT`]
//!   (`"clean"`); the orchestrator reloads it before every trial.
//! - Densities compute `-ln L` up to additive constants independent of the
//!   parameters; only differences and profiles of the NLL are meaningful.
//!
//! Downstream usage
//! ----------------
//! - Build a [`Workspace`], register parameters and a density, designate the
//!   parameter of interest and nuisances, save [`CLEAN_SNAPSHOT`], and hand
//!   the workspace to `limits::ProfileLikelihood::run`.
//!
//! Testing notes
//! -------------
//! - Each submodule unit-tests its own validation and evaluation semantics;
//!   cross-module behavior (snapshot reloads across trials, density
//!   minimization) is exercised by the calculator and integration tests.

pub mod counting;
pub mod dataset;
pub mod errors;
pub mod params;
pub mod pdf;
pub mod workspace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::counting::{Channel, CountingPdf};
pub use self::dataset::Dataset;
pub use self::errors::{ModelError, ModelResult};
pub use self::params::{RealVar, VarState};
pub use self::pdf::{GaussianPrior, NuisancePrior, ParamValues, Pdf};
pub use self::workspace::{Workspace, CLEAN_SNAPSHOT};
