//! Lateral shape of the lane in the local frame

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CubicSpline, CurveError, CurveFit, LinearFit};
use crate::window::Window;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The lane centre as a function `local_y = f(local_x)` over a window.
#[derive(Debug, Clone)]
pub enum LateralCurve {
    /// Interpolating spline, used whenever the window is well formed.
    Spline(CubicSpline),

    /// Least squares line, used when the window cannot be interpolated.
    Straight(LinearFit),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LateralCurve {
    /// Fit a spline through the window's local points.
    ///
    /// The window must have strictly increasing local x, see [`Window::check_increasing`].
    pub fn fit(window: &Window) -> Result<Self, CurveError> {
        CubicSpline::new(&window.xs(), &window.ys()).map(LateralCurve::Spline)
    }

    /// Fit a straight line through the window's local points.
    pub fn fit_straight(window: &Window) -> Result<Self, CurveError> {
        LinearFit::new(&window.xs(), &window.ys()).map(LateralCurve::Straight)
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, LateralCurve::Straight(_))
    }
}

impl CurveFit for LateralCurve {
    fn eval(&self, x: f64) -> f64 {
        match self {
            LateralCurve::Spline(s) => s.eval(x),
            LateralCurve::Straight(l) => l.eval(x),
        }
    }

    fn domain(&self) -> (f64, f64) {
        match self {
            LateralCurve::Spline(s) => s.domain(),
            LateralCurve::Straight(l) => l.domain(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
