//! limits — robust-retry orchestration of upper limits and significance.
//!
//! Purpose
//! -------
//! House the estimation entry point and everything around it: the trial
//! orchestrator ([`profile_likelihood`]), its validated configuration
//! ([`options`]), the pure consensus rule ([`consensus`]), and the
//! orchestrator-level error surface ([`errors`]).
//!
//! Key behaviors
//! -------------
//! - [`ProfileLikelihood::run`] loops over trials: clean-snapshot reload,
//!   randomized restart, optional pre-fit gate, mode-specific estimation,
//!   and the median/outlier consensus over accumulated results.
//! - Upper-limit trials double the parameter-of-interest bound when the
//!   interval edge crowds it, capped at twenty times the original bound.
//! - Significance trials discard degenerate negative-zero results and
//!   non-finite values.
//!
//! Invariants & assumptions
//! ------------------------
//! - The workspace carries a `"clean"` snapshot; every trial starts from it.
//! - `Ok(None)` is the only way a run ends without an answer; errors mean
//!   the caller misconfigured the run or the model.
//!
//! Testing notes
//! -------------
//! - The consensus rule is unit-tested in isolation; the orchestration
//!   properties are covered by integration suites driving scripted stub
//!   calculators.

pub mod consensus;
pub mod errors;
pub mod options;
pub mod profile_likelihood;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::consensus::Consensus;
pub use self::errors::{LimitError, LimitResult};
pub use self::options::{Mode, ProfileLikelihoodOptions};
pub use self::profile_likelihood::ProfileLikelihood;
