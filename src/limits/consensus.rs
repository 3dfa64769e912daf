//! Median/outlier consensus over accumulated trial results.
//!
//! Purpose
//! -------
//! Decide, from the scalar results of repeated trials, whether the run has
//! converged on a stable answer, should be abandoned as hopelessly unstable,
//! or needs more trials. Pure functions over a slice; no orchestration state.
//!
//! Key behaviors
//! -------------
//! - The reference point is the median of the sorted results; for an even
//!   count the lower-middle element is used.
//! - A result is an inlier when its relative deviation from the median is at
//!   most `max_rel_deviation`; a result exactly equal to the median is an
//!   inlier even when the median is zero.
//! - Accept when the outlier count is within `max_outlier_fraction` of the
//!   sample; the accepted value is the most recent result. Abandon when the
//!   outlier count strictly exceeds `max_outliers`. Otherwise keep trying.
//!
//! Invariants & assumptions
//! ------------------------
//! - The caller only evaluates once the required quorum of results exists;
//!   this module never sees an empty slice from the orchestrator.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the boundary scenarios: constant results with a zero
//!   deviation threshold, a single far outlier, and an outlier count exactly
//!   at the abandonment threshold.

/// Verdict of one consensus evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Consensus {
    /// Enough agreement; the run's answer is the most recent result.
    Accept { value: f64 },
    /// Too many outliers; abandon the run.
    Abandon,
    /// No verdict yet; run another trial.
    Continue,
}

/// Evaluate the consensus rule over the accumulated results.
///
/// Returns [`Consensus::Continue`] for an empty slice.
pub fn evaluate(
    results: &[f64], max_rel_deviation: f64, max_outlier_fraction: f64, max_outliers: u32,
) -> Consensus {
    if results.is_empty() {
        return Consensus::Continue;
    }
    let median = median_of(results);
    let outliers = results.iter().filter(|&&v| !is_inlier(v, median, max_rel_deviation)).count();

    if outliers as f64 <= max_outlier_fraction * results.len() as f64 {
        return Consensus::Accept { value: results[results.len() - 1] };
    }
    if outliers as u32 > max_outliers {
        return Consensus::Abandon;
    }
    Consensus::Continue
}

/// Median of the values; the lower-middle element for an even count.
fn median_of(results: &[f64]) -> f64 {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        sorted[n / 2 - 1]
    }
}

fn is_inlier(value: f64, median: f64, max_rel_deviation: f64) -> bool {
    let diff = if value == median {
        0.0
    } else if median != 0.0 {
        ((value - median) / median).abs()
    } else {
        f64::INFINITY
    };
    diff <= max_rel_deviation
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Median selection for odd and even counts.
    // - The inclusive inlier rule at a zero deviation threshold.
    // - Acceptance, abandonment, and the exactly-at-threshold continue case.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Pin the median convention: middle element for odd counts, the
    // lower-middle element for even counts.
    //
    // Given
    // -----
    // - `[10, 50, 60]` and `[10, 50, 60, 70]`.
    //
    // Expect
    // ------
    // - Medians 50 and 50.
    fn median_uses_lower_middle_for_even_counts() {
        assert_eq!(median_of(&[60.0, 10.0, 50.0]), 50.0);
        assert_eq!(median_of(&[70.0, 10.0, 60.0, 50.0]), 50.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that identical results pass even at a zero deviation
    // threshold, including an all-zero sample.
    //
    // Given
    // -----
    // - `[7, 7, 7]` and `[0, 0, 0]` with `max_rel_deviation = 0`.
    //
    // Expect
    // ------
    // - Both accept, returning the most recent value.
    fn identical_results_accept_at_zero_threshold() {
        assert_eq!(evaluate(&[7.0, 7.0, 7.0], 0.0, 0.25, 3), Consensus::Accept { value: 7.0 });
        assert_eq!(evaluate(&[0.0, 0.0, 0.0], 0.0, 0.25, 3), Consensus::Accept { value: 0.0 });
    }

    #[test]
    // Purpose
    // -------
    // Verify acceptance with one far outlier inside the tolerated
    // fraction; the accepted value is the most recent result, outlier or
    // not.
    //
    // Given
    // -----
    // - `[10, 10.4, 9.8, 50]` with 5% deviation and 25% outlier fraction.
    //
    // Expect
    // ------
    // - One outlier out of four is tolerated; the answer is `50`.
    fn single_outlier_within_fraction_accepts_latest() {
        let verdict = evaluate(&[10.0, 10.4, 9.8, 50.0], 0.05, 0.25, 3);

        assert_eq!(verdict, Consensus::Accept { value: 50.0 });
    }

    #[test]
    // Purpose
    // -------
    // Pin the abandonment boundary: an outlier count exactly at
    // `max_outliers` continues, one above abandons.
    //
    // Given
    // -----
    // - `[10, 50, 60, 70]`: median 50, three outliers.
    //
    // Expect
    // ------
    // - `max_outliers = 3` continues; `max_outliers = 2` abandons.
    fn abandonment_threshold_is_strictly_greater() {
        let results = [10.0, 50.0, 60.0, 70.0];

        assert_eq!(evaluate(&results, 0.05, 0.25, 3), Consensus::Continue);
        assert_eq!(evaluate(&results, 0.05, 0.25, 2), Consensus::Abandon);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a nonzero median with scattered values classifies by
    // relative deviation, not absolute distance.
    //
    // Given
    // -----
    // - `[100, 104, 96, 97, 103]` with 5% deviation: all within 5% of the
    //   median 100.
    //
    // Expect
    // ------
    // - Accept with the most recent value `103`.
    fn relative_deviation_classifies_inliers() {
        let verdict = evaluate(&[100.0, 104.0, 96.0, 97.0, 103.0], 0.05, 0.25, 3);

        assert_eq!(verdict, Consensus::Accept { value: 103.0 });
    }
}
