//! Suppressible diagnostic output for the limit-setting pipeline.
//!
//! Purpose
//! -------
//! Provide verbosity-tiered diagnostic text on stdout/stderr that can be
//! muted for the duration of a scope. The numerical backends invoked during
//! limit setting are chatty; the orchestrator silences them around solver
//! calls and restores output on every exit path, including early returns.
//!
//! Key behaviors
//! -------------
//! - Track a process-wide suppression depth; output is muted while the depth
//!   is non-zero, so sentries nest correctly.
//! - [`SilenceSentry`] raises the depth on construction (when active) and
//!   lowers it on drop; [`SilenceSentry::release`] restores output early,
//!   mirroring explicit un-silencing before a final report.
//! - [`emit`] and [`emit_err`] write a line to stdout/stderr unless muted.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every depth increment is paired with exactly one decrement; `release`
//!   is idempotent and `Drop` never double-decrements.
//! - Suppression is process-wide by design: the external solver consults no
//!   per-call verbosity, so the only way to mute it is globally. Concurrent
//!   runs that want independent verbosity must serialize (see crate docs).
//!
//! Testing notes
//! -------------
//! - Unit tests cover depth nesting, idempotent release, and restoration on
//!   drop. Output content itself is not captured; only the muted flag is
//!   asserted.
use std::sync::atomic::{AtomicUsize, Ordering};

static SILENCE_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Whether diagnostic output is currently muted.
pub fn is_silenced() -> bool {
    SILENCE_DEPTH.load(Ordering::SeqCst) > 0
}

/// Write a diagnostic line to stdout unless output is muted.
pub fn emit(msg: &str) {
    if !is_silenced() {
        println!("{msg}");
    }
}

/// Write a diagnostic line to stderr unless output is muted.
pub fn emit_err(msg: &str) {
    if !is_silenced() {
        eprintln!("{msg}");
    }
}

/// SilenceSentry — scoped suppression of diagnostic output.
///
/// Purpose
/// -------
/// Mute [`emit`]/[`emit_err`] (and anything else consulting
/// [`is_silenced`]) for the lifetime of the sentry. Construction with
/// `active = false` is a no-op, which lets call sites express
/// verbosity-threshold decisions directly:
///
/// ```rust
/// # use proflik::diagnostics::SilenceSentry;
/// let verbosity = 0;
/// let _quiet = SilenceSentry::new(verbosity <= 1);
/// ```
///
/// Invariants
/// ----------
/// - The suppression depth raised by an active sentry is lowered exactly
///   once, either by [`SilenceSentry::release`] or by `Drop`.
#[derive(Debug)]
pub struct SilenceSentry {
    active: bool,
    released: bool,
}

impl SilenceSentry {
    /// Construct a sentry; raises the suppression depth when `active`.
    pub fn new(active: bool) -> Self {
        if active {
            SILENCE_DEPTH.fetch_add(1, Ordering::SeqCst);
        }
        SilenceSentry { active, released: false }
    }

    /// Restore output before the sentry goes out of scope.
    ///
    /// Idempotent: further calls (and the eventual drop) do nothing.
    pub fn release(&mut self) {
        if self.active && !self.released {
            SILENCE_DEPTH.fetch_sub(1, Ordering::SeqCst);
            self.released = true;
        }
    }
}

impl Drop for SilenceSentry {
    fn drop(&mut self) {
        self.release();
    }
}
