//! End-to-end runs of `ProfileLikelihood` over the real L-BFGS-backed
//! calculator: analytic Gaussian-mean checks and counting-experiment limits
//! with and without systematics.
//!
//! These runs install minimizer sentries and touch the process-wide
//! defaults, so every test serializes behind a local mutex.
use proflik::calculator::profile::ProfileCalculator;
use proflik::limits::{
    options::{Mode, ProfileLikelihoodOptions},
    ProfileLikelihood,
};
use proflik::model::{
    counting::{Channel, CountingPdf},
    dataset::Dataset,
    errors::ModelResult,
    params::RealVar,
    pdf::{GaussianPrior, ParamValues, Pdf},
    workspace::{Workspace, CLEAN_SNAPSHOT},
};
use std::sync::Mutex;

static LOCK: Mutex<()> = Mutex::new(());

/// Gaussian measurement of the signal strength with unit sigma:
/// `nll = 0.5 * (r - x)^2` for the single observed entry `x`.
struct GaussianMeanPdf;

impl Pdf for GaussianMeanPdf {
    fn nll(&self, values: &ParamValues, data: &Dataset) -> ModelResult<f64> {
        let r = values.get("r")?;
        let x = data.entries()[0];
        Ok(0.5 * (r - x) * (r - x))
    }
}

fn gaussian_workspace() -> Workspace {
    let mut ws = Workspace::new("r");
    ws.add_var(RealVar::new("r", 1.0, 0.0, 20.0).unwrap()).unwrap();
    ws.add_pdf("model_s", Box::new(GaussianMeanPdf)).unwrap();
    ws.set_signal_pdf("model_s").unwrap();
    ws.save_snapshot(CLEAN_SNAPSHOT);
    ws
}

fn counting_workspace(background_kappa: Option<f64>) -> Workspace {
    let mut ws = Workspace::new("r");
    ws.add_var(RealVar::new("r", 1.0, 0.0, 20.0).unwrap()).unwrap();
    let mut channel = Channel::new(3.0, 2.0);
    if let Some(kappa) = background_kappa {
        ws.add_var(RealVar::new("theta_0", 0.0, -5.0, 5.0).unwrap()).unwrap();
        channel.background_systs.push(("theta_0".to_string(), kappa));
    }
    ws.add_pdf("model_s", Box::new(CountingPdf::new("r", vec![channel]))).unwrap();
    ws.set_signal_pdf("model_s").unwrap();
    if background_kappa.is_some() {
        ws.set_nuisances(&["theta_0"]).unwrap();
        ws.set_nuisance_prior(Box::new(GaussianPrior::standard(&["theta_0"]).unwrap()));
    }
    ws.save_snapshot(CLEAN_SNAPSHOT);
    ws
}

fn options(mode: Mode) -> ProfileLikelihoodOptions {
    ProfileLikelihoodOptions { mode, seed: Some(7), verbosity: -1, ..Default::default() }
}

// Purpose: the full pipeline reproduces the analytic Gaussian 95% CL upper
// edge `x + 1.95996` through the orchestrator, sentry and all.
#[test]
fn gaussian_upper_limit_matches_analytic_value() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut pl =
        ProfileLikelihood::new(options(Mode::UpperLimit), ProfileCalculator::new()).unwrap();
    let mut ws = gaussian_workspace();
    let data = Dataset::new(vec![4.0]).unwrap();

    let limit = pl.run(&mut ws, &data).unwrap().expect("run should produce a limit");

    assert!((limit - 5.95996).abs() < 0.02, "limit = {limit}");
}

// Purpose: the full pipeline reproduces the analytic Gaussian significance
// `sqrt(q0) = x`.
#[test]
fn gaussian_significance_matches_analytic_value() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut pl =
        ProfileLikelihood::new(options(Mode::Significance), ProfileCalculator::new()).unwrap();
    let mut ws = gaussian_workspace();
    let data = Dataset::new(vec![3.0]).unwrap();

    let significance = pl.run(&mut ws, &data).unwrap().expect("run should produce a value");

    assert!((significance - 3.0).abs() < 0.02, "significance = {significance}");
}

// Purpose: a plain counting experiment yields the textbook profile upper
// limit (`q(r)` crossing the 1-dof 95% quantile at `r ~ 2.43` for `s = 3`,
// `b = 2`, `n = 4`).
#[test]
fn counting_upper_limit_without_systematics() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut pl =
        ProfileLikelihood::new(options(Mode::UpperLimit), ProfileCalculator::new()).unwrap();
    let mut ws = counting_workspace(None);
    let data = Dataset::new(vec![4.0]).unwrap();

    let limit = pl.run(&mut ws, &data).unwrap().expect("run should produce a limit");

    assert!((limit - 2.43).abs() < 0.05, "limit = {limit}");
}

// Purpose: adding a 20% background systematic loosens the limit but keeps
// the end-to-end run (profiled nuisance, pre-fit gate, compound minimizer
// specification) successful.
#[test]
fn counting_upper_limit_with_systematic_and_pre_fit() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let opts = ProfileLikelihoodOptions {
        pre_fit: true,
        minimizer_algo: "LBFGS,HagerZhang".to_string(),
        minimizer_tolerance: 1e-2,
        ..options(Mode::UpperLimit)
    };
    let mut pl = ProfileLikelihood::new(opts, ProfileCalculator::new()).unwrap();
    let mut ws = counting_workspace(Some(1.2));
    let data = Dataset::new(vec![4.0]).unwrap();

    let limit = pl.run(&mut ws, &data).unwrap().expect("run should produce a limit");

    assert!(limit > 2.35, "systematic should not tighten the limit: {limit}");
    assert!(limit < 4.0, "limit should stay in a plausible range: {limit}");
}

// Purpose: a multi-trial consensus run over the real calculator converges,
// since repeated trials of a deterministic model agree to within the
// deviation threshold.
#[test]
fn multi_trial_consensus_converges_on_real_calculator() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let opts = ProfileLikelihoodOptions {
        tries: 3,
        max_tries: 10,
        ..options(Mode::UpperLimit)
    };
    let mut pl = ProfileLikelihood::new(opts, ProfileCalculator::new()).unwrap();
    let mut ws = gaussian_workspace();
    let data = Dataset::new(vec![4.0]).unwrap();

    let limit = pl.run(&mut ws, &data).unwrap().expect("consensus should be reached");

    assert!((limit - 5.95996).abs() < 0.05, "limit = {limit}");
}
