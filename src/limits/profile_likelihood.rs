//! The retry orchestrator: randomized restarts, consensus, range doubling.
//!
//! Purpose
//! -------
//! Drive a [`LikelihoodCalculator`] to a stable upper limit or significance.
//! Each trial reloads the clean snapshot, optionally perturbs the starting
//! point, optionally gates on an unconditional fit, and runs the mode's
//! estimation; results are accumulated and judged by the consensus rule
//! until an answer is accepted, the run is abandoned, or the trial budget is
//! exhausted.
//!
//! Key behaviors
//! -------------
//! - The minimizer sentry is held for the whole `run` call, so the
//!   configured solver selection applies to every trial and the previous
//!   process-wide defaults come back afterwards on every exit path.
//! - Calculator errors, degenerate results, and pre-fit rejections consume
//!   trial budget but never results or outlier budget; only the consensus
//!   verdict or budget exhaustion ends the run without an answer.
//! - In upper-limit mode an interval edge crowding the parameter bound
//!   doubles the bound and retries inside the same trial, up to twenty times
//!   the original bound; the bound never crosses that cap.
//!
//! Invariants & assumptions
//! ------------------------
//! - The workspace carries a `"clean"` snapshot saved after model building;
//!   a missing snapshot is a caller mistake and surfaces as an error.
//! - `Ok(None)` always means "no confident answer", never an internal
//!   fault; typed errors are reserved for caller mistakes.
//!
//! Testing notes
//! -------------
//! - The orchestration properties are covered by integration tests with
//!   scripted stub calculators; this module's unit tests stay small and
//!   cover construction validation.
use crate::calculator::{
    minimizer::MinimizerSentry,
    traits::{CovQuality, LikelihoodCalculator},
};
use crate::diagnostics::{self, SilenceSentry};
use crate::limits::{
    consensus::{self, Consensus},
    errors::LimitResult,
    options::{Mode, ProfileLikelihoodOptions},
};
use crate::model::{dataset::Dataset, workspace::Workspace, CLEAN_SNAPSHOT};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Widened parameter bounds may grow to at most this multiple of the
/// original bound during one interval search.
const MAX_RANGE_GROWTH: f64 = 20.0;

/// An interval edge at or above this fraction of the current bound is
/// treated as crowding the bound.
const CROWDING_FRACTION: f64 = 0.75;

/// ProfileLikelihood — the robust-retry estimation entry point.
///
/// Purpose
/// -------
/// Own the validated options, the calculator, and the restart RNG, and
/// expose [`ProfileLikelihood::run`] as the single entry point.
///
/// Key behaviors
/// -------------
/// - `tries == 1` accepts the first successful trial immediately; larger
///   quorums go through the median/outlier consensus.
/// - The RNG is seeded from the options when a seed is given, so randomized
///   restarts are reproducible in tests.
pub struct ProfileLikelihood<C: LikelihoodCalculator> {
    options: ProfileLikelihoodOptions,
    calc: C,
    rng: StdRng,
}

impl<C: LikelihoodCalculator> ProfileLikelihood<C> {
    /// Construct an orchestrator over validated options and a calculator.
    ///
    /// # Errors
    /// - Any validation error from
    ///   [`ProfileLikelihoodOptions::validate`].
    pub fn new(options: ProfileLikelihoodOptions, calc: C) -> LimitResult<Self> {
        options.validate()?;
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(ProfileLikelihood { options, calc, rng })
    }

    pub fn options(&self) -> &ProfileLikelihoodOptions {
        &self.options
    }

    /// Run the configured estimation to a stable answer.
    ///
    /// Returns `Ok(Some(value))` on an accepted result, `Ok(None)` when the
    /// trial budget is exhausted or the consensus rule abandons the run.
    ///
    /// # Errors
    /// - Caller mistakes only: invalid minimizer specification, missing
    ///   clean snapshot, unknown parameter names.
    pub fn run(&mut self, ws: &mut Workspace, data: &Dataset) -> LimitResult<Option<f64>> {
        let _sentry =
            MinimizerSentry::new(&self.options.minimizer_algo, self.options.minimizer_tolerance)?;
        let _quiet = SilenceSentry::new(self.options.verbosity < 0);

        let mut results: Vec<f64> = Vec::new();
        for trial in 0..self.options.max_tries {
            ws.load_snapshot(CLEAN_SNAPSHOT)?;
            if trial > 0 {
                self.randomize_start(ws)?;
            }
            if self.options.pre_fit && !self.pre_fit_ok(ws, data) {
                continue;
            }

            let value = match self.options.mode {
                Mode::UpperLimit => self.run_limit(ws, data)?,
                Mode::Significance => self.run_significance(ws, data)?,
            };
            let value = match value {
                Some(v) => v,
                None => continue,
            };

            if self.options.tries == 1 {
                return Ok(Some(value));
            }
            results.push(value);
            if (results.len() as u32) < self.options.tries {
                continue;
            }
            match consensus::evaluate(
                &results,
                self.options.max_rel_deviation,
                self.options.max_outlier_fraction,
                self.options.max_outliers,
            ) {
                Consensus::Accept { value } => return Ok(Some(value)),
                Consensus::Abandon => {
                    diagnostics::emit(&format!(
                        "Too many outliers among {} results; giving up.",
                        results.len()
                    ));
                    return Ok(None);
                }
                Consensus::Continue => {}
            }
        }
        Ok(None)
    }

    /// Perturb the starting point for a retry: rescale the span above the
    /// lower bound so the bound becomes `min + span * (0.5 + U)`, place the
    /// value `(0.1 + 0.5 U)` of the way across the new span, and apply one
    /// draw from the nuisance prior when the model declares nuisances.
    ///
    /// Rescaling the span rather than the bound itself keeps the drawn
    /// bound above a positive lower bound.
    fn randomize_start(&mut self, ws: &mut Workspace) -> LimitResult<()> {
        let poi = ws.poi()?;
        let (poi_min, span) = (poi.min(), poi.max() - poi.min());
        let new_max = poi_min + span * (0.5 + self.rng.gen::<f64>());
        ws.poi_mut()?.set_max(new_max)?;
        let new_val = poi_min + (0.1 + 0.5 * self.rng.gen::<f64>()) * (new_max - poi_min);
        ws.poi_mut()?.set_val(new_val)?;

        if ws.has_nuisances() {
            if let Some(draw) = ws.sample_nuisance_prior(&mut self.rng) {
                for (name, value) in draw {
                    ws.var_mut(&name)?.set_val(value)?;
                }
            }
        }
        Ok(())
    }

    /// Gate a trial on an unconditional fit: full covariance quality and
    /// EDM within the minimizer tolerance.
    fn pre_fit_ok(&mut self, ws: &Workspace, data: &Dataset) -> bool {
        let _quiet = SilenceSentry::new(self.options.verbosity < 2);
        match self.calc.fit(ws, data) {
            Ok(fit) => {
                let ok = fit.cov_quality == CovQuality::FullAccurate
                    && fit.edm <= self.options.minimizer_tolerance;
                if !ok {
                    diagnostics::emit(&format!(
                        "Pre-fit rejected: covariance quality {:?}, edm {}.",
                        fit.cov_quality, fit.edm
                    ));
                }
                ok
            }
            Err(err) => {
                diagnostics::emit_err(&format!("Pre-fit failed: {err}."));
                false
            }
        }
    }

    /// One upper-limit trial, including the range-doubling search.
    ///
    /// `Ok(None)` marks a failed trial; `Err` only caller mistakes.
    fn run_limit(&mut self, ws: &mut Workspace, data: &Dataset) -> LimitResult<Option<f64>> {
        let _quiet = SilenceSentry::new(self.options.verbosity <= 1);
        let original_max = ws.poi()?.max();
        loop {
            let interval = match self.calc.interval(ws, data, self.options.confidence_level) {
                Ok(interval) => interval,
                Err(err) => {
                    diagnostics::emit_err(&format!("Interval calculation failed: {err}."));
                    return Ok(None);
                }
            };
            let poi = ws.poi()?;
            let upper = interval.upper;

            if upper == poi.min() {
                diagnostics::emit(
                    "Limit sits at the lower bound of the parameter of interest; trying again.",
                );
                return Ok(None);
            }
            if upper >= CROWDING_FRACTION * poi.max() {
                let cur_max = poi.max();
                if cur_max * 2.0 > MAX_RANGE_GROWTH * original_max {
                    diagnostics::emit(&format!(
                        "Limit {upper} still crowds the bound at {cur_max}; giving up on this trial."
                    ));
                    return Ok(None);
                }
                diagnostics::emit(&format!(
                    "Limit {upper} is too close to the bound {cur_max}; doubling the range."
                ));
                ws.poi_mut()?.set_max(cur_max * 2.0)?;
                continue;
            }
            return Ok(Some(upper));
        }
    }

    /// One significance trial.
    ///
    /// `Ok(None)` marks a failed trial; `Err` only caller mistakes.
    fn run_significance(&mut self, ws: &Workspace, data: &Dataset) -> LimitResult<Option<f64>> {
        let _quiet = SilenceSentry::new(self.options.verbosity <= 1);
        let outcome = match self.calc.hypo_test(ws, data, 0.0) {
            Ok(outcome) => outcome,
            Err(err) => {
                diagnostics::emit_err(&format!("Hypothesis test failed: {err}."));
                return Ok(None);
            }
        };
        if outcome.is_degenerate_zero() {
            diagnostics::emit("Degenerate zero significance; trying again.");
            return Ok(None);
        }
        if !outcome.significance.is_finite() {
            diagnostics::emit_err(&format!(
                "Non-finite significance {}; trying again.",
                outcome.significance
            ));
            return Ok(None);
        }
        Ok(Some(outcome.significance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{
        errors::CalcResult,
        traits::{FitOutcome, HypoTestOutcome, LikelihoodInterval},
    };
    use crate::limits::errors::LimitError;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover construction validation only; the orchestration
    // properties live in the integration suites with scripted calculators.
    // -------------------------------------------------------------------------

    struct NeverCalled;

    impl LikelihoodCalculator for NeverCalled {
        fn interval(
            &mut self, _: &Workspace, _: &Dataset, _: f64,
        ) -> CalcResult<LikelihoodInterval> {
            unreachable!("calculator must not be invoked");
        }
        fn hypo_test(&mut self, _: &Workspace, _: &Dataset, _: f64) -> CalcResult<HypoTestOutcome> {
            unreachable!("calculator must not be invoked");
        }
        fn fit(&mut self, _: &Workspace, _: &Dataset) -> CalcResult<FitOutcome> {
            unreachable!("calculator must not be invoked");
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that construction validates the options before anything runs.
    //
    // Given
    // -----
    // - Options with an inverted trial budget.
    //
    // Expect
    // ------
    // - `new` fails with `InvalidTrialBudget`; the calculator is never
    //   touched.
    fn new_rejects_invalid_options() {
        let options =
            ProfileLikelihoodOptions { tries: 4, max_tries: 2, ..Default::default() };

        let err = ProfileLikelihood::new(options, NeverCalled).err().expect("must fail");

        assert!(matches!(err, LimitError::InvalidTrialBudget { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Ensure valid options construct and are exposed unchanged.
    //
    // Given
    // -----
    // - Default options with a fixed seed.
    //
    // Expect
    // ------
    // - Construction succeeds and `options()` returns the configuration.
    fn new_accepts_valid_options() {
        let options = ProfileLikelihoodOptions { seed: Some(11), ..Default::default() };

        let pl = ProfileLikelihood::new(options.clone(), NeverCalled).expect("must construct");

        assert_eq!(pl.options(), &options);
    }
}
