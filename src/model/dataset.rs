//! Observed data passed by reference into the calculator.
//!
//! The limit-setting core treats a [`Dataset`] as opaque: it is handed to the
//! external likelihood calculator unchanged. For the counting models shipped
//! with this crate an entry is the observed event count of one channel.
use crate::model::errors::{ModelError, ModelResult};

/// Immutable observed data: one `f64` entry per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    entries: Vec<f64>,
}

impl Dataset {
    /// Construct a dataset from per-channel entries.
    ///
    /// # Errors
    /// - [`ModelError::EmptyDataset`] when `entries` is empty.
    /// - [`ModelError::InvalidLikelihoodInput`] for non-finite or negative
    ///   entries (event counts cannot be negative).
    pub fn new(entries: Vec<f64>) -> ModelResult<Self> {
        if entries.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        for &n in &entries {
            if !n.is_finite() || n < 0.0 {
                return Err(ModelError::InvalidLikelihoodInput {
                    value: n,
                    reason: "Observed counts must be finite and non-negative.",
                });
            }
        }
        Ok(Dataset { entries })
    }

    pub fn entries(&self) -> &[f64] {
        &self.entries
    }

    pub fn n_entries(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover construction validation only; how datasets are
    // consumed is exercised by the density and calculator tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that valid entries construct and are returned unchanged.
    //
    // Given
    // -----
    // - Entries `[3.0, 0.0, 7.0]`.
    //
    // Expect
    // ------
    // - Construction succeeds; `entries` and `n_entries` match the input.
    fn dataset_new_accepts_valid_counts() {
        let data = Dataset::new(vec![3.0, 0.0, 7.0]).expect("valid counts should construct");

        assert_eq!(data.n_entries(), 3);
        assert_eq!(data.entries(), &[3.0, 0.0, 7.0]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that empty, negative, and non-finite inputs are rejected.
    //
    // Given
    // -----
    // - An empty vector, a negative count, and a NaN count.
    //
    // Expect
    // ------
    // - `EmptyDataset` for the empty input and `InvalidLikelihoodInput` for
    //   the other two.
    fn dataset_new_rejects_bad_counts() {
        assert!(matches!(Dataset::new(vec![]).unwrap_err(), ModelError::EmptyDataset));
        assert!(matches!(
            Dataset::new(vec![-1.0]).unwrap_err(),
            ModelError::InvalidLikelihoodInput { .. }
        ));
        assert!(matches!(
            Dataset::new(vec![f64::NAN]).unwrap_err(),
            ModelError::InvalidLikelihoodInput { .. }
        ));
    }
}
