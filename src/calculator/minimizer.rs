//! Process-wide minimizer defaults and the scoped sentry that edits them.
//!
//! Purpose
//! -------
//! Hold the default minimizer selection (type, optional line-search
//! algorithm, tolerance) that calculators read when they build a solver, and
//! provide [`MinimizerSentry`], a guard that installs a caller-supplied
//! selection for the duration of one run and restores the previous defaults
//! afterwards, including on early returns and panics.
//!
//! Key behaviors
//! -------------
//! - Parse `"type"` or `"type,algo"` specification strings; anything with
//!   more than one comma is rejected before any global state is touched.
//! - Override the default tolerance only when the requested tolerance is
//!   finite and strictly positive; otherwise the previous tolerance stays.
//! - Restore exactly the captured backup on `restore` or drop, whichever
//!   comes first; the second call is a no-op.
//!
//! Invariants & assumptions
//! ------------------------
//! - The defaults are process-wide; concurrent runs that install different
//!   sentries race by construction and are a caller error. Tests serialize
//!   access behind a lock.
//!
//! Conventions
//! -----------
//! - The crate ships L-BFGS-backed calculators, so the initial default type
//!   is `"LBFGS"` with the backend's default line search and a tolerance of
//!   `1e-2`, mirroring the loose-by-default convention of minimizer stacks
//!   where callers tighten per run.
//!
//! Testing notes
//! -------------
//! - Tests mutate the shared defaults and therefore serialize behind a
//!   static lock; each test restores the state it found.
use crate::calculator::errors::{CalcError, CalcResult};
use std::sync::{Mutex, OnceLock};

/// The process-wide minimizer selection calculators read at solve time.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerDefaults {
    /// Minimizer family, e.g. `"LBFGS"`.
    pub minimizer_type: String,
    /// Optional algorithm refinement, e.g. a line-search name.
    pub algo: Option<String>,
    /// Convergence tolerance handed to the solver.
    pub tolerance: f64,
}

impl Default for MinimizerDefaults {
    fn default() -> Self {
        MinimizerDefaults { minimizer_type: "LBFGS".to_string(), algo: None, tolerance: 1e-2 }
    }
}

fn defaults_lock() -> &'static Mutex<MinimizerDefaults> {
    static DEFAULTS: OnceLock<Mutex<MinimizerDefaults>> = OnceLock::new();
    DEFAULTS.get_or_init(|| Mutex::new(MinimizerDefaults::default()))
}

/// Snapshot of the current process-wide defaults.
pub fn current_defaults() -> MinimizerDefaults {
    defaults_lock().lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// MinimizerSentry — scoped override of the process-wide minimizer defaults.
///
/// Purpose
/// -------
/// Install a run's minimizer selection on construction and guarantee the
/// previous defaults come back when the run ends, whether it returns a
/// value, an error, or unwinds.
///
/// Key behaviors
/// -------------
/// - `new` parses the specification, captures a backup, then installs the
///   requested type/algo and (when positive and finite) tolerance.
/// - `restore` puts the backup back and is idempotent; `Drop` calls it.
///
/// Invariants
/// ----------
/// - After `restore` (explicit or via drop) the defaults equal the backup
///   captured at construction, regardless of intervening edits.
#[derive(Debug)]
pub struct MinimizerSentry {
    backup: MinimizerDefaults,
    restored: bool,
}

impl MinimizerSentry {
    /// Install `spec` (`"type"` or `"type,algo"`) and `tolerance` as the
    /// process-wide defaults, capturing the previous defaults for restore.
    ///
    /// A non-positive or non-finite `tolerance` leaves the previous
    /// tolerance in place.
    ///
    /// # Errors
    /// - [`CalcError::InvalidMinimizerSpec`] for an empty specification or
    ///   one with more than one comma.
    pub fn new(spec: &str, tolerance: f64) -> CalcResult<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(CalcError::InvalidMinimizerSpec {
                spec: spec.to_string(),
                reason: "Specification must name a minimizer type.",
            });
        }
        let mut parts = trimmed.splitn(3, ',');
        let minimizer_type = parts.next().unwrap_or_default().trim();
        let algo = parts.next().map(|s| s.trim());
        if parts.next().is_some() {
            return Err(CalcError::InvalidMinimizerSpec {
                spec: spec.to_string(),
                reason: "Expected 'type' or 'type,algo'.",
            });
        }
        if minimizer_type.is_empty() || algo.is_some_and(|a| a.is_empty()) {
            return Err(CalcError::InvalidMinimizerSpec {
                spec: spec.to_string(),
                reason: "Minimizer type and algorithm must be non-empty.",
            });
        }

        let mut guard = defaults_lock().lock().unwrap_or_else(|e| e.into_inner());
        let backup = guard.clone();
        guard.minimizer_type = minimizer_type.to_string();
        guard.algo = algo.map(|a| a.to_string());
        if tolerance.is_finite() && tolerance > 0.0 {
            guard.tolerance = tolerance;
        }
        Ok(MinimizerSentry { backup, restored: false })
    }

    /// Put the captured defaults back. Idempotent.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        *defaults_lock().lock().unwrap_or_else(|e| e.into_inner()) = self.backup.clone();
        self.restored = true;
    }
}

impl Drop for MinimizerSentry {
    fn drop(&mut self) {
        self.restore();
    }
}
