//! Errors for the statistical-model layer (parameters, densities, snapshots).
//!
//! This module defines [`ModelError`], used across the workspace, parameter,
//! and density code. All variants carry enough context to name the offending
//! object; library code never panics on invalid model input.
//!
//! ## Conventions
//! - Lookups by name fail with `Unknown*` variants rather than panicking.
//! - Bounds must satisfy `min < max` and be finite; values are clamped into
//!   bounds on assignment, never rejected.
//! - Density evaluations report non-finite likelihood terms through
//!   [`ModelError::InvalidLikelihoodInput`].

/// Crate-wide result alias for model operations that may produce [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;

/// Unified error type for the model layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Name lookups ----
    /// No parameter with this name exists in the workspace.
    UnknownParameter { name: String },

    /// No density with this name exists in the workspace.
    UnknownPdf { name: String },

    /// No snapshot with this name has been saved.
    UnknownSnapshot { name: String },

    /// A parameter with this name already exists.
    DuplicateParameter { name: String },

    /// A density with this name already exists.
    DuplicatePdf { name: String },

    // ---- Parameter validation ----
    /// Bounds must be finite with `min < max`.
    InvalidBounds { name: String, min: f64, max: f64, reason: &'static str },

    // ---- Densities and data ----
    /// Dataset must contain at least one entry.
    EmptyDataset,

    /// Dataset shape does not match the density (e.g. channel count).
    DatasetShapeMismatch { expected: usize, found: usize },

    /// A likelihood term evaluated to a non-finite or out-of-domain value.
    InvalidLikelihoodInput { value: f64, reason: &'static str },

    /// Gaussian prior widths must be finite and strictly positive.
    InvalidPriorSigma { name: String, sigma: f64 },

    // ---- Workspace wiring ----
    /// The workspace has no density designated as the signal density.
    MissingSignalPdf,
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::UnknownParameter { name } => {
                write!(f, "Unknown parameter '{name}'")
            }
            ModelError::UnknownPdf { name } => {
                write!(f, "Unknown density '{name}'")
            }
            ModelError::UnknownSnapshot { name } => {
                write!(f, "Unknown snapshot '{name}'")
            }
            ModelError::DuplicateParameter { name } => {
                write!(f, "Parameter '{name}' already exists")
            }
            ModelError::DuplicatePdf { name } => {
                write!(f, "Density '{name}' already exists")
            }
            ModelError::InvalidBounds { name, min, max, reason } => {
                write!(f, "Invalid bounds [{min}, {max}] for parameter '{name}': {reason}")
            }
            ModelError::EmptyDataset => {
                write!(f, "Dataset must contain at least one entry")
            }
            ModelError::DatasetShapeMismatch { expected, found } => {
                write!(f, "Dataset shape mismatch: expected {expected} entries, found {found}")
            }
            ModelError::InvalidLikelihoodInput { value, reason } => {
                write!(f, "Invalid likelihood input {value}: {reason}")
            }
            ModelError::InvalidPriorSigma { name, sigma } => {
                write!(f, "Invalid prior width {sigma} for '{name}': must be finite and positive")
            }
            ModelError::MissingSignalPdf => {
                write!(f, "No signal density designated on the workspace")
            }
        }
    }
}
