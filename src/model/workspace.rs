//! Workspace — named parameters, densities, nuisance sets, and snapshots.
//!
//! Purpose
//! -------
//! Hold the statistical model the limit-setting core consumes: a mapping from
//! parameter name to [`RealVar`], named densities, a designated parameter of
//! interest and signal density, the nuisance-parameter set with its optional
//! prior, and named snapshots of all parameter states. The orchestrator
//! mutates parameters in place across trials and reloads the `"clean"`
//! snapshot before each one.
//!
//! Key behaviors
//! -------------
//! - Register parameters and densities by name, rejecting duplicates.
//! - Save and load named snapshots capturing value *and* bounds of every
//!   parameter, so range-doubling from a previous trial never leaks into the
//!   next.
//! - Designate the nuisance set and an optional sampleable prior; expose one
//!   prior draw for randomized restarts.
//! - Produce a detached [`ParamValues`] assignment of all current values for
//!   density evaluation.
//!
//! Invariants & assumptions
//! ------------------------
//! - The parameter of interest and every designated nuisance exist in the
//!   parameter map before they are designated.
//! - Snapshots restore exactly what they captured; parameters added after a
//!   snapshot was taken are left untouched by `load_snapshot`.
//! - The workspace is single-writer: one run call at a time.
//!
//! Conventions
//! -----------
//! - The pristine pre-run state is saved under [`CLEAN_SNAPSHOT`] (`"clean"`).
//! - The signal-plus-background density is conventionally registered as
//!   `"model_s"` and designated via [`Workspace::set_signal_pdf`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover registration errors, snapshot round-trips including
//!   bounds, nuisance designation validation, and prior sampling plumbing.
use crate::model::{
    errors::{ModelError, ModelResult},
    params::{RealVar, VarState},
    pdf::{NuisancePrior, ParamValues, Pdf},
};
use rand::RngCore;
use std::collections::BTreeMap;

/// Name of the snapshot holding the pristine pre-run parameter state.
pub const CLEAN_SNAPSHOT: &str = "clean";

/// Workspace — the mutable statistical model shared across trials.
///
/// See the module docs for the full contract. Constructed empty around a
/// parameter-of-interest name; parameters, densities, nuisances, and the
/// prior are registered afterwards, and a [`CLEAN_SNAPSHOT`] is saved once
/// the model is fully built.
pub struct Workspace {
    poi: String,
    vars: BTreeMap<String, RealVar>,
    pdfs: BTreeMap<String, Box<dyn Pdf>>,
    signal_pdf: Option<String>,
    nuisances: Vec<String>,
    nuisance_prior: Option<Box<dyn NuisancePrior>>,
    snapshots: BTreeMap<String, BTreeMap<String, VarState>>,
}

impl Workspace {
    /// Construct an empty workspace whose parameter of interest is `poi`.
    ///
    /// The parameter itself must still be registered via [`Workspace::add_var`].
    pub fn new(poi: &str) -> Self {
        Workspace {
            poi: poi.to_string(),
            vars: BTreeMap::new(),
            pdfs: BTreeMap::new(),
            signal_pdf: None,
            nuisances: Vec::new(),
            nuisance_prior: None,
            snapshots: BTreeMap::new(),
        }
    }

    // ---- Parameters --------------------------------------------------------

    /// Register a parameter.
    ///
    /// # Errors
    /// - [`ModelError::DuplicateParameter`] when the name is taken.
    pub fn add_var(&mut self, var: RealVar) -> ModelResult<()> {
        let name = var.name().to_string();
        if self.vars.contains_key(&name) {
            return Err(ModelError::DuplicateParameter { name });
        }
        self.vars.insert(name, var);
        Ok(())
    }

    /// Look up a parameter by name.
    pub fn var(&self, name: &str) -> ModelResult<&RealVar> {
        self.vars
            .get(name)
            .ok_or_else(|| ModelError::UnknownParameter { name: name.to_string() })
    }

    /// Look up a parameter by name for mutation.
    pub fn var_mut(&mut self, name: &str) -> ModelResult<&mut RealVar> {
        self.vars
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownParameter { name: name.to_string() })
    }

    pub fn poi_name(&self) -> &str {
        &self.poi
    }

    /// The parameter of interest.
    pub fn poi(&self) -> ModelResult<&RealVar> {
        self.vars
            .get(&self.poi)
            .ok_or_else(|| ModelError::UnknownParameter { name: self.poi.clone() })
    }

    /// The parameter of interest, for mutation.
    pub fn poi_mut(&mut self) -> ModelResult<&mut RealVar> {
        let name = self.poi.clone();
        self.var_mut(&name)
    }

    /// Names of the parameters a calculator should float: the parameter of
    /// interest followed by the designated nuisances.
    pub fn floating_params(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.nuisances.len());
        names.push(self.poi.clone());
        names.extend(self.nuisances.iter().cloned());
        names
    }

    /// Detached assignment of every parameter's current value.
    pub fn param_values(&self) -> ParamValues {
        let mut values = ParamValues::new();
        for (name, var) in &self.vars {
            values.set(name, var.value());
        }
        values
    }

    // ---- Densities ---------------------------------------------------------

    /// Register a density under a name.
    ///
    /// # Errors
    /// - [`ModelError::DuplicatePdf`] when the name is taken.
    pub fn add_pdf(&mut self, name: &str, pdf: Box<dyn Pdf>) -> ModelResult<()> {
        if self.pdfs.contains_key(name) {
            return Err(ModelError::DuplicatePdf { name: name.to_string() });
        }
        self.pdfs.insert(name.to_string(), pdf);
        Ok(())
    }

    /// Look up a density by name.
    pub fn pdf(&self, name: &str) -> ModelResult<&dyn Pdf> {
        self.pdfs
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| ModelError::UnknownPdf { name: name.to_string() })
    }

    /// Designate a registered density as the signal-plus-background density.
    ///
    /// # Errors
    /// - [`ModelError::UnknownPdf`] when no density with this name exists.
    pub fn set_signal_pdf(&mut self, name: &str) -> ModelResult<()> {
        if !self.pdfs.contains_key(name) {
            return Err(ModelError::UnknownPdf { name: name.to_string() });
        }
        self.signal_pdf = Some(name.to_string());
        Ok(())
    }

    /// The designated signal-plus-background density.
    ///
    /// # Errors
    /// - [`ModelError::MissingSignalPdf`] when none has been designated.
    pub fn signal_pdf(&self) -> ModelResult<&dyn Pdf> {
        let name = self.signal_pdf.as_deref().ok_or(ModelError::MissingSignalPdf)?;
        self.pdf(name)
    }

    // ---- Nuisances ---------------------------------------------------------

    /// Designate the nuisance-parameter set.
    ///
    /// # Errors
    /// - [`ModelError::UnknownParameter`] when any name is not registered.
    pub fn set_nuisances(&mut self, names: &[&str]) -> ModelResult<()> {
        for &name in names {
            if !self.vars.contains_key(name) {
                return Err(ModelError::UnknownParameter { name: name.to_string() });
            }
        }
        self.nuisances = names.iter().map(|s| s.to_string()).collect();
        Ok(())
    }

    pub fn nuisances(&self) -> &[String] {
        &self.nuisances
    }

    pub fn has_nuisances(&self) -> bool {
        !self.nuisances.is_empty()
    }

    /// Attach a sampleable prior over the nuisance parameters.
    pub fn set_nuisance_prior(&mut self, prior: Box<dyn NuisancePrior>) {
        self.nuisance_prior = Some(prior);
    }

    /// One draw from the nuisance prior, or `None` when no prior is attached.
    pub fn sample_nuisance_prior(&self, rng: &mut dyn RngCore) -> Option<Vec<(String, f64)>> {
        self.nuisance_prior.as_ref().map(|prior| prior.sample(rng))
    }

    // ---- Snapshots ---------------------------------------------------------

    /// Save the value and bounds of every parameter under `name`,
    /// overwriting any snapshot with the same name.
    pub fn save_snapshot(&mut self, name: &str) {
        let states: BTreeMap<String, VarState> =
            self.vars.iter().map(|(n, v)| (n.clone(), v.state())).collect();
        self.snapshots.insert(name.to_string(), states);
    }

    /// Restore every parameter captured by the snapshot `name`.
    ///
    /// Parameters registered after the snapshot was saved are left
    /// untouched.
    ///
    /// # Errors
    /// - [`ModelError::UnknownSnapshot`] when no snapshot with this name
    ///   exists.
    pub fn load_snapshot(&mut self, name: &str) -> ModelResult<()> {
        let states = self
            .snapshots
            .get(name)
            .ok_or_else(|| ModelError::UnknownSnapshot { name: name.to_string() })?
            .clone();
        for (param, state) in states {
            if let Some(var) = self.vars.get_mut(&param) {
                var.restore(state);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        counting::{Channel, CountingPdf},
        pdf::GaussianPrior,
    };
    use rand::{rngs::StdRng, SeedableRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Registration and lookup errors for parameters and densities.
    // - Snapshot round-trips restoring both value and bounds.
    // - Nuisance designation validation and prior sampling plumbing.
    //
    // They intentionally DO NOT cover:
    // - Density evaluation semantics (counting-model tests) or orchestration
    //   of snapshot reloads across trials (integration tests).
    // -------------------------------------------------------------------------

    fn workspace_with_poi() -> Workspace {
        let mut ws = Workspace::new("r");
        ws.add_var(RealVar::new("r", 1.0, 0.0, 20.0).unwrap()).unwrap();
        ws
    }

    #[test]
    // Purpose
    // -------
    // Verify duplicate registration and unknown lookups fail with typed
    // errors, and that the poi accessor resolves the designated parameter.
    //
    // Given
    // -----
    // - A workspace with parameter `r` registered once.
    //
    // Expect
    // ------
    // - Re-adding `r` fails with `DuplicateParameter`; looking up `x` fails
    //   with `UnknownParameter`; `poi()` returns `r`.
    fn registration_and_lookup_errors() {
        let mut ws = workspace_with_poi();

        let dup = ws.add_var(RealVar::new("r", 0.0, 0.0, 1.0).unwrap()).unwrap_err();
        assert!(matches!(dup, ModelError::DuplicateParameter { .. }));

        assert!(matches!(ws.var("x").unwrap_err(), ModelError::UnknownParameter { .. }));
        assert_eq!(ws.poi().unwrap().name(), "r");
    }

    #[test]
    // Purpose
    // -------
    // Ensure snapshots capture and restore value *and* bounds, so a widened
    // search range from one trial does not leak into the next.
    //
    // Given
    // -----
    // - A clean snapshot taken at `r = 1.0`, max `20.0`; the parameter is
    //   then perturbed and its range doubled twice.
    //
    // Expect
    // ------
    // - After `load_snapshot`, value and max are back at `1.0` and `20.0`.
    fn snapshot_restores_value_and_bounds() {
        let mut ws = workspace_with_poi();
        ws.save_snapshot(CLEAN_SNAPSHOT);

        ws.poi_mut().unwrap().set_max(80.0).unwrap();
        ws.poi_mut().unwrap().set_val(61.0).unwrap();

        ws.load_snapshot(CLEAN_SNAPSHOT).unwrap();
        let poi = ws.poi().unwrap();
        assert_eq!(poi.value(), 1.0);
        assert_eq!(poi.max(), 20.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify loading a snapshot that was never saved fails with a typed
    // error.
    //
    // Given
    // -----
    // - A workspace with no snapshots.
    //
    // Expect
    // ------
    // - `load_snapshot("clean")` fails with `UnknownSnapshot`.
    fn load_snapshot_unknown_name_fails() {
        let mut ws = workspace_with_poi();

        assert!(matches!(
            ws.load_snapshot(CLEAN_SNAPSHOT).unwrap_err(),
            ModelError::UnknownSnapshot { .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // Ensure nuisance designation validates names and that prior sampling
    // returns `None` without a prior and a full draw with one.
    //
    // Given
    // -----
    // - Parameters `r` and `theta_0`; a standard-normal prior over
    //   `theta_0`.
    //
    // Expect
    // ------
    // - Designating `["ghost"]` fails; designating `["theta_0"]` succeeds;
    //   sampling yields one `(name, value)` pair after the prior is set.
    fn nuisance_designation_and_prior_sampling() {
        let mut ws = workspace_with_poi();
        ws.add_var(RealVar::new("theta_0", 0.0, -5.0, 5.0).unwrap()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(matches!(
            ws.set_nuisances(&["ghost"]).unwrap_err(),
            ModelError::UnknownParameter { .. }
        ));
        ws.set_nuisances(&["theta_0"]).unwrap();
        assert!(ws.has_nuisances());
        assert!(ws.sample_nuisance_prior(&mut rng).is_none());

        ws.set_nuisance_prior(Box::new(GaussianPrior::standard(&["theta_0"]).unwrap()));
        let draw = ws.sample_nuisance_prior(&mut rng).expect("prior should sample");
        assert_eq!(draw.len(), 1);
        assert_eq!(draw[0].0, "theta_0");
    }

    #[test]
    // Purpose
    // -------
    // Verify density registration, signal designation, and the
    // `floating_params` ordering (poi first, then nuisances).
    //
    // Given
    // -----
    // - A counting density registered as `model_s` and nuisance `theta_0`.
    //
    // Expect
    // ------
    // - `signal_pdf()` fails before designation and resolves afterwards;
    //   `floating_params` is `["r", "theta_0"]`.
    fn signal_pdf_designation_and_floating_params() {
        let mut ws = workspace_with_poi();
        ws.add_var(RealVar::new("theta_0", 0.0, -5.0, 5.0).unwrap()).unwrap();
        ws.set_nuisances(&["theta_0"]).unwrap();
        ws.add_pdf("model_s", Box::new(CountingPdf::new("r", vec![Channel::new(3.0, 2.0)])))
            .unwrap();

        assert!(matches!(ws.signal_pdf(), Err(ModelError::MissingSignalPdf)));
        ws.set_signal_pdf("model_s").unwrap();
        assert!(ws.signal_pdf().is_ok());

        assert_eq!(ws.floating_params(), vec!["r".to_string(), "theta_0".to_string()]);
    }
}
