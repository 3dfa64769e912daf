//! Calculator-level error types and result alias.
//!
//! Purpose
//! -------
//! Normalize everything that can go wrong inside a likelihood calculator
//! (backend solver failures, out-of-domain likelihood evaluations, malformed
//! minimizer specifications, model lookups) into a single enum so the
//! orchestrator can treat any `Err` as a failed trial and retry.
//!
//! Conventions
//! -----------
//! - `reason` fields are `&'static str` because they describe fixed rule
//!   violations, not runtime data.
//! - Backend solver errors are captured as text; the orchestrator never
//!   inspects them beyond logging.
use crate::model::errors::ModelError;
use std::error::Error;
use std::fmt;

/// Result alias for calculator operations.
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors produced while fitting, profiling, or testing a likelihood.
#[derive(Debug)]
pub enum CalcError {
    /// The negative log-likelihood evaluated to a non-finite value at a
    /// point the solver needed.
    NonFiniteNll { value: f64 },

    /// The backend solver reported an error or terminated abnormally.
    SolverFailed { text: String },

    /// The solver finished without producing a best parameter vector.
    MissingOptimum,

    /// A minimizer specification string could not be parsed or named an
    /// unknown minimizer or algorithm.
    InvalidMinimizerSpec { spec: String, reason: &'static str },

    /// An interval or test was requested at an invalid confidence level or
    /// null value.
    InvalidRequest { value: f64, reason: &'static str },

    /// A model-layer error (unknown parameter, bad dataset shape, domain
    /// violation) surfaced during evaluation.
    Model(ModelError),
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::NonFiniteNll { value } => {
                write!(f, "Negative log-likelihood evaluated to a non-finite value: {value}.")
            }
            CalcError::SolverFailed { text } => {
                write!(f, "Backend solver failed: {text}.")
            }
            CalcError::MissingOptimum => {
                write!(f, "Solver terminated without a best parameter vector.")
            }
            CalcError::InvalidMinimizerSpec { spec, reason } => {
                write!(f, "Invalid minimizer specification '{spec}': {reason}")
            }
            CalcError::InvalidRequest { value, reason } => {
                write!(f, "Invalid calculator request (value {value}): {reason}")
            }
            CalcError::Model(err) => write!(f, "Model error: {err}"),
        }
    }
}

impl Error for CalcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CalcError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for CalcError {
    fn from(err: ModelError) -> Self {
        CalcError::Model(err)
    }
}

impl From<argmin::core::Error> for CalcError {
    fn from(err: argmin::core::Error) -> Self {
        CalcError::SolverFailed { text: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover Display formatting and the ModelError conversion;
    // solver-error conversion is exercised where solvers actually run.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Pin the Display text of the variants the orchestrator logs most.
    //
    // Given
    // -----
    // - A `NonFiniteNll` and an `InvalidMinimizerSpec` value.
    //
    // Expect
    // ------
    // - Messages contain the offending value and specification.
    fn display_mentions_offending_input() {
        let nll = CalcError::NonFiniteNll { value: f64::NAN };
        assert!(nll.to_string().contains("non-finite"));

        let spec = CalcError::InvalidMinimizerSpec {
            spec: "LBFGS,Wolfe,extra".to_string(),
            reason: "Expected 'type' or 'type,algo'.",
        };
        assert!(spec.to_string().contains("LBFGS,Wolfe,extra"));
    }

    #[test]
    // Purpose
    // -------
    // Verify that model errors convert into the `Model` variant and keep
    // their source chain.
    //
    // Given
    // -----
    // - A `ModelError::MissingSignalPdf`.
    //
    // Expect
    // ------
    // - `From` wraps it and `source()` exposes the inner error.
    fn model_error_converts_and_chains() {
        let err: CalcError = ModelError::MissingSignalPdf.into();

        assert!(matches!(err, CalcError::Model(ModelError::MissingSignalPdf)));
        assert!(err.source().is_some());
    }
}
