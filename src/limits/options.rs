//! Validated configuration for the retry orchestrator.
//!
//! Purpose
//! -------
//! Hold every knob of a [`ProfileLikelihood`](crate::limits::ProfileLikelihood)
//! run: the minimizer selection the sentry installs, the confidence level,
//! the trial budget and consensus thresholds, the pre-fit gate, the run mode,
//! verbosity, and an optional RNG seed. Construction is plain; `validate`
//! runs before the first trial and reports configuration mistakes as typed
//! errors.
//!
//! Key behaviors
//! -------------
//! - Defaults mirror the single-trial convention: one try, no pre-fit, upper
//!   limit at 95% CL, tolerance `1e-3`.
//! - `validate` checks ranges and the internal consistency of the trial
//!   budget (`max_tries >= tries`), so a run can assume well-formed options.
//!
//! Conventions
//! -----------
//! - The minimizer specification is `"type"` or `"type,algo"`, e.g.
//!   `"LBFGS"` or `"LBFGS,HagerZhang"`; full parsing happens in the sentry.
//! - `verbosity < 0` silences the whole run; `<= 1` silences per-trial
//!   calculator chatter; `>= 2` keeps pre-fit diagnostics audible.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the default values and each validation rule.
use crate::limits::errors::{LimitError, LimitResult};

/// What the run estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Upper edge of the confidence interval of the parameter of interest.
    UpperLimit,
    /// Discovery significance against a zero-signal null.
    Significance,
}

/// Configuration of one orchestrated run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLikelihoodOptions {
    /// Minimizer specification installed by the sentry, `"type"` or
    /// `"type,algo"`.
    pub minimizer_algo: String,
    /// Minimizer tolerance installed by the sentry; also the EDM threshold
    /// of the pre-fit gate.
    pub minimizer_tolerance: f64,
    /// Confidence level of the interval in upper-limit mode.
    pub confidence_level: f64,
    /// Number of successful trials required before consensus is evaluated;
    /// `1` accepts the first success immediately.
    pub tries: u32,
    /// Total trial budget, counting failed trials.
    pub max_tries: u32,
    /// Largest relative deviation from the median still counted as an
    /// inlier.
    pub max_rel_deviation: f64,
    /// Largest tolerated outlier fraction for acceptance.
    pub max_outlier_fraction: f64,
    /// Outlier count above which the run is abandoned outright.
    pub max_outliers: u32,
    /// Gate each trial on an unconditional fit of full covariance quality
    /// and small EDM.
    pub pre_fit: bool,
    /// Upper limit or significance.
    pub mode: Mode,
    /// Diagnostic verbosity tier.
    pub verbosity: i32,
    /// RNG seed for reproducible randomized restarts.
    pub seed: Option<u64>,
}

impl Default for ProfileLikelihoodOptions {
    fn default() -> Self {
        ProfileLikelihoodOptions {
            minimizer_algo: "LBFGS".to_string(),
            minimizer_tolerance: 1e-3,
            confidence_level: 0.95,
            tries: 1,
            max_tries: 1,
            max_rel_deviation: 0.05,
            max_outlier_fraction: 0.25,
            max_outliers: 3,
            pre_fit: false,
            mode: Mode::UpperLimit,
            verbosity: 0,
            seed: None,
        }
    }
}

impl ProfileLikelihoodOptions {
    /// Check every option against its allowed range.
    ///
    /// # Errors
    /// - [`LimitError::InvalidOption`] for out-of-range numeric options.
    /// - [`LimitError::InvalidTrialBudget`] for an inconsistent trial
    ///   budget.
    pub fn validate(&self) -> LimitResult<()> {
        if self.minimizer_algo.trim().is_empty() {
            return Err(LimitError::InvalidOption {
                name: "minimizer_algo",
                value: f64::NAN,
                reason: "Minimizer specification must be non-empty.",
            });
        }
        if !self.minimizer_tolerance.is_finite() || self.minimizer_tolerance <= 0.0 {
            return Err(LimitError::InvalidOption {
                name: "minimizer_tolerance",
                value: self.minimizer_tolerance,
                reason: "Tolerance must be finite and positive.",
            });
        }
        if !self.confidence_level.is_finite()
            || self.confidence_level <= 0.0
            || self.confidence_level >= 1.0
        {
            return Err(LimitError::InvalidOption {
                name: "confidence_level",
                value: self.confidence_level,
                reason: "Must lie strictly between 0 and 1.",
            });
        }
        if self.tries == 0 || self.max_tries == 0 {
            return Err(LimitError::InvalidTrialBudget {
                tries: self.tries,
                max_tries: self.max_tries,
                reason: "tries and max_tries must be at least 1.",
            });
        }
        if self.max_tries < self.tries {
            return Err(LimitError::InvalidTrialBudget {
                tries: self.tries,
                max_tries: self.max_tries,
                reason: "max_tries must be at least tries.",
            });
        }
        if !self.max_rel_deviation.is_finite() || self.max_rel_deviation < 0.0 {
            return Err(LimitError::InvalidOption {
                name: "max_rel_deviation",
                value: self.max_rel_deviation,
                reason: "Must be finite and non-negative.",
            });
        }
        if !self.max_outlier_fraction.is_finite()
            || !(0.0..=1.0).contains(&self.max_outlier_fraction)
        {
            return Err(LimitError::InvalidOption {
                name: "max_outlier_fraction",
                value: self.max_outlier_fraction,
                reason: "Must lie in [0, 1].",
            });
        }
        Ok(())
    }
}
