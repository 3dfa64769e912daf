//! Bound transforms between model space and the optimizer's space.
//!
//! The L-BFGS backend works in an unconstrained space, while model parameters
//! carry finite bounds. Each floating parameter gets a [`BoundTransform`]
//! mapping an internal coordinate `u` in R to the external bounded value and
//! back. The sigmoid map keeps every internal point strictly inside the
//! bounds, so the solver can never step outside the allowed range.
/// Margin keeping `to_internal` away from the exact bound, where the logit
/// diverges.
const EDGE_MARGIN: f64 = 1e-12;

/// Map between a bounded external parameter and an unconstrained internal
/// coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundTransform {
    /// No transform; internal and external coordinates coincide.
    Identity,
    /// Two-sided sigmoid map onto the open interval `(min, max)`.
    Finite { min: f64, max: f64 },
}

impl BoundTransform {
    /// Transform for a parameter with the given bounds. Model parameters
    /// always carry finite bounds, so this is the `Finite` map.
    pub fn for_bounds(min: f64, max: f64) -> Self {
        BoundTransform::Finite { min, max }
    }

    /// External (bounded) value at internal coordinate `u`.
    pub fn to_external(&self, u: f64) -> f64 {
        match *self {
            BoundTransform::Identity => u,
            BoundTransform::Finite { min, max } => min + (max - min) * sigmoid(u),
        }
    }

    /// Internal coordinate whose external image is `x`. Values at or beyond
    /// a bound are nudged inside by a tiny margin before the logit.
    pub fn to_internal(&self, x: f64) -> f64 {
        match *self {
            BoundTransform::Identity => x,
            BoundTransform::Finite { min, max } => {
                let frac = ((x - min) / (max - min)).clamp(EDGE_MARGIN, 1.0 - EDGE_MARGIN);
                (frac / (1.0 - frac)).ln()
            }
        }
    }
}

fn sigmoid(u: f64) -> f64 {
    // Evaluate via the non-overflowing branch for large |u|.
    if u >= 0.0 {
        1.0 / (1.0 + (-u).exp())
    } else {
        let e = u.exp();
        e / (1.0 + e)
    }
}
