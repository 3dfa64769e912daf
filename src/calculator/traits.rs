//! The external-calculator seam the orchestrator drives.
//!
//! Purpose
//! -------
//! Define [`LikelihoodCalculator`], the trait boundary between the retry
//! orchestration in `limits` and whatever actually maximizes the likelihood,
//! together with the small result carriers the orchestrator inspects:
//! [`LikelihoodInterval`], [`HypoTestOutcome`], and [`FitOutcome`] with its
//! [`CovQuality`] tiers.
//!
//! Key behaviors
//! -------------
//! - `interval` produces the confidence interval of the parameter of interest
//!   at a given confidence level; the orchestrator reads the upper edge.
//! - `hypo_test` tests the parameter of interest against a null value and
//!   reports a one-sided significance, with signed zero distinguishing a
//!   genuine zero from a degenerate failure.
//! - `fit` performs an unconditional fit and reports covariance quality and
//!   the estimated distance to the minimum, used by the pre-fit gate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Calculators read the workspace (parameter values and bounds) but never
//!   mutate it; all cross-trial mutation belongs to the orchestrator.
//! - Any `Err` from a calculator is treated as a failed trial and retried; it
//!   never aborts the run.
//!
//! Conventions
//! -----------
//! - Significance is encoded in the sign bit at zero: `+0.0` is a genuine
//!   zero result (fitted signal at or below the null), `-0.0` marks a
//!   degenerate evaluation the orchestrator must discard.
//!
//! Testing notes
//! -------------
//! - Scripted stub calculators in the integration tests implement this trait
//!   to exercise the orchestrator without any numerics.
use crate::calculator::errors::CalcResult;
use crate::model::{dataset::Dataset, workspace::Workspace};

/// Quality tiers of the covariance estimate from an unconditional fit,
/// ordered from worst to best. Only [`CovQuality::FullAccurate`] passes the
/// pre-fit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CovQuality {
    /// No covariance estimate was produced.
    NotAvailable,
    /// The fit converged but the covariance was not computed.
    NotCalculated,
    /// The covariance was approximated and may be unreliable.
    Approximate,
    /// The covariance matrix had to be forced positive definite.
    ForcedPosDef,
    /// A full, accurate covariance matrix is available.
    FullAccurate,
}

/// Confidence interval of the parameter of interest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodInterval {
    /// Lower interval edge.
    pub lower: f64,
    /// Upper interval edge. An edge at the parameter's current upper bound
    /// means the true edge was not bracketed within the allowed range.
    pub upper: f64,
}

/// Outcome of a hypothesis test of the parameter of interest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypoTestOutcome {
    /// One-sided significance in Gaussian sigmas. `+0.0` is a genuine zero;
    /// `-0.0` marks a degenerate evaluation.
    pub significance: f64,
}

impl HypoTestOutcome {
    /// Whether the significance is the negative-zero degenerate marker.
    pub fn is_degenerate_zero(&self) -> bool {
        self.significance == 0.0 && self.significance.is_sign_negative()
    }
}

/// Outcome of an unconditional fit, as consumed by the pre-fit gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOutcome {
    /// Minimum negative log-likelihood found.
    pub nll: f64,
    /// Fitted value of the parameter of interest.
    pub poi_value: f64,
    /// Quality tier of the covariance estimate.
    pub cov_quality: CovQuality,
    /// Estimated distance to the minimum, `0.5 * g^T H^{-1} g`.
    pub edm: f64,
}

/// A likelihood calculator the retry orchestrator can drive.
///
/// Implementations take `&mut self` so stateful backends (iteration caches,
/// scripted test stubs) fit the seam without interior mutability.
pub trait LikelihoodCalculator {
    /// Confidence interval of the parameter of interest at confidence level
    /// `cl`, profiling out the nuisance parameters.
    fn interval(&mut self, ws: &Workspace, data: &Dataset, cl: f64) -> CalcResult<LikelihoodInterval>;

    /// One-sided hypothesis test of the parameter of interest against
    /// `null_value` (zero for discovery significance).
    fn hypo_test(
        &mut self, ws: &Workspace, data: &Dataset, null_value: f64,
    ) -> CalcResult<HypoTestOutcome>;

    /// Unconditional fit of all floating parameters, reporting covariance
    /// quality and the estimated distance to the minimum.
    fn fit(&mut self, ws: &Workspace, data: &Dataset) -> CalcResult<FitOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the signed-zero convention and the quality-tier
    // ordering; calculator behavior is tested with the implementations.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Pin the signed-zero convention: `-0.0` is degenerate, `+0.0` is not.
    //
    // Given
    // -----
    // - Outcomes carrying `-0.0` and `+0.0`.
    //
    // Expect
    // ------
    // - Only the negative zero reports degenerate.
    fn signed_zero_distinguishes_degenerate() {
        assert!(HypoTestOutcome { significance: -0.0 }.is_degenerate_zero());
        assert!(!HypoTestOutcome { significance: 0.0 }.is_degenerate_zero());
        assert!(!HypoTestOutcome { significance: 3.2 }.is_degenerate_zero());
    }

    #[test]
    // Purpose
    // -------
    // Verify that `FullAccurate` compares above every other tier, since the
    // pre-fit gate relies on the ordering.
    //
    // Given
    // -----
    // - All tiers below `FullAccurate`.
    //
    // Expect
    // ------
    // - Each compares strictly less than `FullAccurate`.
    fn full_accurate_is_top_tier() {
        for tier in [
            CovQuality::NotAvailable,
            CovQuality::NotCalculated,
            CovQuality::Approximate,
            CovQuality::ForcedPosDef,
        ] {
            assert!(tier < CovQuality::FullAccurate);
        }
    }
}
