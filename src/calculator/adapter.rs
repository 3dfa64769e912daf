//! Adapter that exposes a workspace NLL as an `argmin` problem.
//!
//! The solver works on an internal unconstrained vector over the floating
//! parameters; every evaluation maps that vector through the per-parameter
//! [`BoundTransform`]s, overlays the result on the workspace's frozen base
//! assignment, and evaluates the density. Gradients are finite differences of
//! the cost: central first, retrying with forward differences when a cost
//! evaluation inside the stencil failed or produced non-finite entries.
use std::cell::RefCell;

use crate::calculator::{
    errors::{CalcError, CalcResult},
    transform::BoundTransform,
};
use crate::model::{
    dataset::Dataset,
    pdf::{ParamValues, Pdf},
    workspace::Workspace,
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use ndarray::Array1;

/// Internal parameter vector over the floating coordinates.
pub type Point = Array1<f64>;
/// Gradient of the cost with respect to the internal coordinates.
pub type Grad = Array1<f64>;

/// Bridges a workspace density to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns the NLL at the externalized point.
/// - `Gradient::gradient` finite-differences the cost (central, with a
///   forward-difference fallback on evaluation failures).
#[derive(Clone)]
pub struct NllProblem<'a> {
    pdf: &'a dyn Pdf,
    data: &'a Dataset,
    base: ParamValues,
    floating: Vec<(String, BoundTransform)>,
}

impl<'a> NllProblem<'a> {
    /// Build a problem over the workspace's signal density, floating the
    /// named parameters and freezing everything else at its current value.
    ///
    /// # Errors
    /// - [`CalcError::Model`] when the signal density is not designated or a
    ///   floating name is unknown.
    pub fn new(ws: &'a Workspace, data: &'a Dataset, floating: &[String]) -> CalcResult<Self> {
        let pdf = ws.signal_pdf()?;
        let base = ws.param_values();
        let mut with_transforms = Vec::with_capacity(floating.len());
        for name in floating {
            let var = ws.var(name)?;
            with_transforms.push((name.clone(), BoundTransform::for_bounds(var.min(), var.max())));
        }
        Ok(NllProblem { pdf, data, base, floating: with_transforms })
    }

    /// Freeze a parameter at `value`: it leaves the floating set and the
    /// base assignment carries the fixed value. Used for profiled fits with
    /// the parameter of interest pinned.
    pub fn fix(&mut self, name: &str, value: f64) {
        self.base.set(name, value);
        self.floating.retain(|(n, _)| n != name);
    }

    /// Number of floating coordinates.
    pub fn dim(&self) -> usize {
        self.floating.len()
    }

    /// Internal coordinates of the workspace's current values for the
    /// floating parameters.
    ///
    /// # Errors
    /// - [`CalcError::Model`] when a floating name is missing from the
    ///   workspace.
    pub fn initial_point(&self, ws: &Workspace) -> CalcResult<Point> {
        let mut point = Vec::with_capacity(self.floating.len());
        for (name, transform) in &self.floating {
            point.push(transform.to_internal(ws.var(name)?.value()));
        }
        Ok(Array1::from(point))
    }

    /// Full external parameter assignment at an internal point.
    pub fn external_values(&self, point: &Point) -> ParamValues {
        let mut values = self.base.clone();
        for ((name, transform), &u) in self.floating.iter().zip(point.iter()) {
            values.set(name, transform.to_external(u));
        }
        values
    }

    /// NLL at an internal point, rejecting non-finite values.
    ///
    /// # Errors
    /// - [`CalcError::Model`] from the density evaluation.
    /// - [`CalcError::NonFiniteNll`] when the value is NaN or infinite.
    pub fn nll_at(&self, point: &Point) -> CalcResult<f64> {
        let values = self.external_values(point);
        let nll = self.pdf.nll(&values, self.data)?;
        if !nll.is_finite() {
            return Err(CalcError::NonFiniteNll { value: nll });
        }
        Ok(nll)
    }
}

impl CostFunction for NllProblem<'_> {
    type Param = Point;
    type Output = f64;

    fn cost(&self, point: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.nll_at(point)?)
    }
}

impl Gradient for NllProblem<'_> {
    type Param = Point;
    type Gradient = Grad;

    /// Finite-difference gradient of the cost at `point`.
    ///
    /// Central differences first; when a cost evaluation inside the stencil
    /// fails (captured via `closure_err`, the FD closure cannot return
    /// `Result`) or the result has non-finite entries, retry once with
    /// forward differences.
    ///
    /// # Errors
    /// - Any error raised by cost evaluations performed during the FD pass.
    /// - [`CalcError::NonFiniteNll`] when even the forward-difference
    ///   gradient carries non-finite entries.
    fn gradient(&self, point: &Self::Param) -> Result<Self::Gradient, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |p: &Point| -> f64 {
            match self.cost(p) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };

        let grad = point.central_diff(&cost_func);
        if closure_err.borrow().is_some() || !all_finite(&grad) {
            return run_fd_diff(point, &cost_func, &closure_err);
        }
        Ok(grad)
    }
}

fn all_finite(grad: &Grad) -> bool {
    grad.iter().all(|g| g.is_finite())
}

/// Forward-difference gradient of `func` at `point`, with error capture.
///
/// Clears `closure_err`, runs `forward_diff`, surfaces any captured cost
/// error, and rejects non-finite gradient entries.
fn run_fd_diff<G: Fn(&Point) -> f64>(
    point: &Point, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let grad = point.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    if !all_finite(&grad) {
        return Err(CalcError::NonFiniteNll { value: f64::NAN }.into());
    }
    Ok(grad)
}
