//! Named model parameters with validated bounds.
//!
//! Purpose
//! -------
//! Provide the parameter object the limit-setting core mutates across trials:
//! a named real value with a finite allowed range. The orchestrator perturbs
//! values and widens ranges between trials; the interval solver doubles the
//! upper bound while searching for the interval edge.
//!
//! Key behaviors
//! -------------
//! - Construct [`RealVar`] values that enforce finite bounds with `min < max`.
//! - Clamp value assignments into the current range instead of rejecting
//!   them, so randomized restarts cannot produce out-of-range states.
//! - Reject bound updates that would invert or degenerate the range via
//!   typed errors rather than panicking.
//!
//! Invariants & assumptions
//! ------------------------
//! - `min < max` holds for every constructed or mutated `RealVar`.
//! - `min <= value <= max` holds after every mutation.
//! - Bounds are finite; infinite ranges are expressed by choosing a large
//!   finite `max`, which the range-doubling search can widen further.
//!
//! Testing notes
//! -------------
//! - Unit tests cover constructor validation, value clamping, and bound
//!   update rejection. Snapshot/restore behavior lives with the workspace.
use crate::model::errors::{ModelError, ModelResult};

/// Plain value-plus-bounds snapshot of a parameter, used by workspace
/// snapshots and by calculators that need a detached copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarState {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// RealVar — a named parameter with a value and a validated range.
///
/// Purpose
/// -------
/// Represent one mutable model parameter (the parameter of interest or a
/// nuisance parameter). Value assignments clamp into the current range;
/// range updates are validated.
///
/// Invariants
/// ----------
/// - `min < max`, both finite.
/// - `min <= value <= max`.
#[derive(Debug, Clone, PartialEq)]
pub struct RealVar {
    name: String,
    value: f64,
    min: f64,
    max: f64,
}

impl RealVar {
    /// Construct a validated parameter.
    ///
    /// # Rules
    /// - `min` and `max` must be finite with `min < max`.
    /// - `value` must be finite; it is clamped into `[min, max]`.
    ///
    /// # Errors
    /// - [`ModelError::InvalidBounds`] for non-finite or inverted bounds, or
    ///   a non-finite initial value.
    pub fn new(name: &str, value: f64, min: f64, max: f64) -> ModelResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ModelError::InvalidBounds {
                name: name.to_string(),
                min,
                max,
                reason: "Bounds must be finite.",
            });
        }
        if min >= max {
            return Err(ModelError::InvalidBounds {
                name: name.to_string(),
                min,
                max,
                reason: "Bounds must satisfy min < max.",
            });
        }
        if !value.is_finite() {
            return Err(ModelError::InvalidBounds {
                name: name.to_string(),
                min,
                max,
                reason: "Initial value must be finite.",
            });
        }
        Ok(RealVar { name: name.to_string(), value: value.clamp(min, max), min, max })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Current value and bounds as a detached [`VarState`].
    pub fn state(&self) -> VarState {
        VarState { value: self.value, min: self.min, max: self.max }
    }

    /// Restore value and bounds from a snapshot state.
    ///
    /// The state is trusted to originate from a previously valid `RealVar`,
    /// so no revalidation is performed.
    pub fn restore(&mut self, state: VarState) {
        self.value = state.value;
        self.min = state.min;
        self.max = state.max;
    }

    /// Assign a value, clamping into the current range.
    ///
    /// Non-finite inputs are rejected; in-range and out-of-range finite
    /// inputs always succeed (the latter land on the nearest bound).
    pub fn set_val(&mut self, value: f64) -> ModelResult<()> {
        if !value.is_finite() {
            return Err(ModelError::InvalidBounds {
                name: self.name.clone(),
                min: self.min,
                max: self.max,
                reason: "Assigned value must be finite.",
            });
        }
        self.value = value.clamp(self.min, self.max);
        Ok(())
    }

    /// Raise or lower the upper bound; the value is re-clamped.
    ///
    /// # Errors
    /// - [`ModelError::InvalidBounds`] when `max` is non-finite or `<= min`.
    pub fn set_max(&mut self, max: f64) -> ModelResult<()> {
        if !max.is_finite() || max <= self.min {
            return Err(ModelError::InvalidBounds {
                name: self.name.clone(),
                min: self.min,
                max,
                reason: "Upper bound must be finite and greater than the lower bound.",
            });
        }
        self.max = max;
        self.value = self.value.clamp(self.min, self.max);
        Ok(())
    }

    /// Raise or lower the lower bound; the value is re-clamped.
    ///
    /// # Errors
    /// - [`ModelError::InvalidBounds`] when `min` is non-finite or `>= max`.
    pub fn set_min(&mut self, min: f64) -> ModelResult<()> {
        if !min.is_finite() || min >= self.max {
            return Err(ModelError::InvalidBounds {
                name: self.name.clone(),
                min,
                max: self.max,
                reason: "Lower bound must be finite and less than the upper bound.",
            });
        }
        self.min = min;
        self.value = self.value.clamp(self.min, self.max);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Constructor validation for bounds and initial values.
    // - Clamping semantics of `set_val` and re-clamping on bound updates.
    // - Rejection of degenerate bound updates.
    //
    // They intentionally DO NOT cover:
    // - Snapshot save/load round-trips, which are workspace-level behavior.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `RealVar::new` accepts a well-formed parameter and stores
    // the provided value and bounds.
    //
    // Given
    // -----
    // - `value = 1.0`, bounds `[0, 20]`.
    //
    // Expect
    // ------
    // - Construction succeeds and accessors return the inputs unchanged.
    fn realvar_new_accepts_valid_input() {
        let r = RealVar::new("r", 1.0, 0.0, 20.0).expect("valid parameter should construct");

        assert_eq!(r.name(), "r");
        assert_eq!(r.value(), 1.0);
        assert_eq!(r.min(), 0.0);
        assert_eq!(r.max(), 20.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that inverted and non-finite bounds are rejected.
    //
    // Given
    // -----
    // - Bounds `[5, 5]` and `[0, +inf]`.
    //
    // Expect
    // ------
    // - Both constructions fail with `ModelError::InvalidBounds`.
    fn realvar_new_rejects_bad_bounds() {
        let inverted = RealVar::new("r", 1.0, 5.0, 5.0).unwrap_err();
        let infinite = RealVar::new("r", 1.0, 0.0, f64::INFINITY).unwrap_err();

        assert!(matches!(inverted, ModelError::InvalidBounds { .. }));
        assert!(matches!(infinite, ModelError::InvalidBounds { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `set_val` clamps out-of-range values onto the nearest
    // bound instead of failing.
    //
    // Given
    // -----
    // - A parameter with bounds `[0, 10]`.
    //
    // Expect
    // ------
    // - Assigning `25.0` lands on `10.0`; assigning `-3.0` lands on `0.0`.
    fn set_val_clamps_into_range() {
        let mut r = RealVar::new("r", 1.0, 0.0, 10.0).unwrap();

        r.set_val(25.0).unwrap();
        assert_eq!(r.value(), 10.0);

        r.set_val(-3.0).unwrap();
        assert_eq!(r.value(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that shrinking the range re-clamps the value and that a bound
    // update crossing the opposite bound is rejected.
    //
    // Given
    // -----
    // - A parameter at `8.0` with bounds `[0, 10]`.
    //
    // Expect
    // ------
    // - `set_max(5.0)` succeeds and the value becomes `5.0`.
    // - `set_max(-1.0)` fails with `InvalidBounds`.
    fn set_max_reclamps_and_validates() {
        let mut r = RealVar::new("r", 8.0, 0.0, 10.0).unwrap();

        r.set_max(5.0).unwrap();
        assert_eq!(r.value(), 5.0);
        assert_eq!(r.max(), 5.0);

        let err = r.set_max(-1.0).unwrap_err();
        assert!(matches!(err, ModelError::InvalidBounds { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `state`/`restore` round-trip value and bounds exactly.
    //
    // Given
    // -----
    // - A parameter whose value and upper bound are mutated after the state
    //   is captured.
    //
    // Expect
    // ------
    // - `restore` brings back the captured value, min, and max.
    fn state_restore_round_trips() {
        let mut r = RealVar::new("r", 1.0, 0.0, 20.0).unwrap();
        let saved = r.state();

        r.set_max(40.0).unwrap();
        r.set_val(33.0).unwrap();
        r.restore(saved);

        assert_eq!(r.value(), 1.0);
        assert_eq!(r.min(), 0.0);
        assert_eq!(r.max(), 20.0);
    }
}
