//! Density and prior seams consumed by the likelihood calculator.
//!
//! Purpose
//! -------
//! Define the two traits the limit-setting core needs from a statistical
//! model — a negative-log-likelihood evaluation ([`Pdf`]) and a sampleable
//! nuisance prior ([`NuisancePrior`]) — together with [`ParamValues`], the
//! detached name-to-value assignment densities are evaluated against.
//!
//! Key behaviors
//! -------------
//! - [`Pdf::nll`] evaluates `-ln L` for a full parameter assignment and a
//!   dataset; calculators vary candidate assignments without mutating the
//!   workspace.
//! - [`NuisancePrior::sample`] produces one draw of nuisance-parameter
//!   values; the orchestrator applies it as a randomized starting point.
//! - [`GaussianPrior`] implements independent Gaussian draws per nuisance,
//!   matching the unit-Gaussian constraint convention of the counting
//!   models.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `ParamValues` assignment contains every parameter the density reads;
//!   missing names surface as [`ModelError::UnknownParameter`].
//! - Densities are pure: same assignment and data, same value; no I/O.
//! - Prior draws are in the prior's own units; callers clamp into parameter
//!   bounds on assignment.
//!
//! Testing notes
//! -------------
//! - `ParamValues` lookup/overlay behavior and `GaussianPrior` construction
//!   validation are unit-tested here; the statistical behavior of concrete
//!   densities is tested with the counting model.
use crate::model::{
    errors::{ModelError, ModelResult},
    dataset::Dataset,
};
use rand::{distributions::Distribution, RngCore};
use statrs::distribution::Normal;
use std::collections::BTreeMap;

/// A detached parameter assignment: name → value.
///
/// Calculators copy the workspace values into a `ParamValues`, overlay the
/// coordinates being varied, and evaluate densities against the result. The
/// map is ordered so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamValues(BTreeMap<String, f64>);

impl ParamValues {
    pub fn new() -> Self {
        ParamValues(BTreeMap::new())
    }

    /// Value of a named parameter.
    ///
    /// # Errors
    /// - [`ModelError::UnknownParameter`] when the name is absent.
    pub fn get(&self, name: &str) -> ModelResult<f64> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownParameter { name: name.to_string() })
    }

    /// Insert or overwrite a parameter value.
    pub fn set(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A probability density evaluated as a negative log-likelihood.
///
/// Implementations must be pure and must not mutate shared state; the
/// calculator evaluates them many times per minimization.
pub trait Pdf {
    /// Negative log-likelihood `-ln L(values | data)`, up to an additive
    /// constant that does not depend on the parameters.
    ///
    /// # Errors
    /// - [`ModelError::UnknownParameter`] when a required parameter is
    ///   missing from `values`.
    /// - [`ModelError::DatasetShapeMismatch`] when the data does not match
    ///   the density's channel structure.
    /// - [`ModelError::InvalidLikelihoodInput`] when a likelihood term is
    ///   out of domain (e.g. a non-positive expected yield).
    fn nll(&self, values: &ParamValues, data: &Dataset) -> ModelResult<f64>;
}

/// A prior density over the nuisance parameters that can produce one
/// sampled parameter set, used to randomize restart points.
pub trait NuisancePrior {
    /// Draw one `(name, value)` set from the prior.
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<(String, f64)>;
}

/// GaussianPrior — independent Gaussian draws per nuisance parameter.
///
/// Purpose
/// -------
/// Model the common constraint convention where each nuisance parameter
/// carries an independent Gaussian prior (typically standard normal for
/// log-normal systematics expressed as `kappa^theta`).
///
/// Invariants
/// ----------
/// - Every term has a finite mean and a finite, strictly positive sigma.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianPrior {
    terms: Vec<(String, Normal)>,
}

impl GaussianPrior {
    /// Construct a prior from `(name, mean, sigma)` terms.
    ///
    /// # Errors
    /// - [`ModelError::InvalidPriorSigma`] for non-finite or non-positive
    ///   sigmas, or a non-finite mean.
    pub fn new(terms: &[(&str, f64, f64)]) -> ModelResult<Self> {
        let mut built = Vec::with_capacity(terms.len());
        for &(name, mean, sigma) in terms {
            if !mean.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
                return Err(ModelError::InvalidPriorSigma { name: name.to_string(), sigma });
            }
            let normal = Normal::new(mean, sigma).map_err(|_| ModelError::InvalidPriorSigma {
                name: name.to_string(),
                sigma,
            })?;
            built.push((name.to_string(), normal));
        }
        Ok(GaussianPrior { terms: built })
    }

    /// Standard-normal prior over the given nuisance names.
    pub fn standard(names: &[&str]) -> ModelResult<Self> {
        let terms: Vec<(&str, f64, f64)> = names.iter().map(|&n| (n, 0.0, 1.0)).collect();
        GaussianPrior::new(&terms)
    }
}

impl NuisancePrior for GaussianPrior {
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<(String, f64)> {
        self.terms.iter().map(|(name, normal)| (name.clone(), normal.sample(rng))).collect()
    }
}
