//! Orchestrator-level error types and result alias.
//!
//! Purpose
//! -------
//! Collect the errors that can cross the `run` entry point: invalid
//! configuration caught up front, and caller mistakes surfacing from the
//! model or calculator layers (unknown parameter or snapshot names, invalid
//! minimizer specifications). Calculator failures inside a trial never
//! appear here; the orchestrator absorbs them and retries.
use crate::calculator::errors::CalcError;
use crate::model::errors::ModelError;
use std::error::Error;
use std::fmt;

/// Result alias for orchestrator operations.
pub type LimitResult<T> = Result<T, LimitError>;

/// Errors crossing the orchestrator's public surface.
#[derive(Debug)]
pub enum LimitError {
    /// A numeric option was out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    /// Trial counts were inconsistent (for instance a consensus quorum
    /// larger than the trial budget).
    InvalidTrialBudget { tries: u32, max_tries: u32, reason: &'static str },

    /// A model-layer caller mistake (unknown parameter, missing snapshot).
    Model(ModelError),

    /// A calculator-layer caller mistake (invalid minimizer specification).
    Calc(CalcError),
}

impl fmt::Display for LimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option '{name}' = {value}: {reason}")
            }
            LimitError::InvalidTrialBudget { tries, max_tries, reason } => {
                write!(f, "Invalid trial budget (tries = {tries}, max_tries = {max_tries}): {reason}")
            }
            LimitError::Model(err) => write!(f, "Model error: {err}"),
            LimitError::Calc(err) => write!(f, "Calculator error: {err}"),
        }
    }
}

impl Error for LimitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LimitError::Model(err) => Some(err),
            LimitError::Calc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for LimitError {
    fn from(err: ModelError) -> Self {
        LimitError::Model(err)
    }
}

impl From<CalcError> for LimitError {
    fn from(err: CalcError) -> Self {
        LimitError::Calc(err)
    }
}
