//! # Curve fitting
//!
//! The planner uses fitted curves in two places: the lateral shape of the lane in the local frame
//! and the per-step distance increments of the speed profile. Both go through the [`CurveFit`]
//! trait so the interpolation method can be swapped without touching trajectory generation.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

mod cubic_spline;
mod lateral;
mod linear_fit;
mod monotone_cubic;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cubic_spline::CubicSpline;
pub use lateral::LateralCurve;
pub use linear_fit::LinearFit;
pub use monotone_cubic::MonotoneCubic;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A one dimensional curve `y = f(x)` fitted over a set of samples.
pub trait CurveFit {
    /// Evaluate the curve at `x`.
    ///
    /// Outside of the fitted domain the value is an extrapolation whose quality depends on the
    /// implementation.
    fn eval(&self, x: f64) -> f64;

    /// The `(min, max)` range of `x` covered by the fitted samples.
    fn domain(&self) -> (f64, f64);

    /// Returns true if `x` is inside the fitted domain.
    fn in_domain(&self, x: f64) -> bool {
        let (min, max) = self.domain();
        x >= min && x <= max
    }

    /// Evaluate the curve at `x`, failing if `x` is outside the fitted domain.
    fn eval_checked(&self, x: f64) -> Result<f64, CurveError> {
        if self.in_domain(x) {
            Ok(self.eval(x))
        } else {
            let (min, max) = self.domain();
            Err(CurveError::OutOfDomain { x, min, max })
        }
    }
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while fitting or evaluating curves.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("At least {required} samples are required, found {found}")]
    TooFewPoints { required: usize, found: usize },

    #[error("Found {x_len} x samples but {y_len} y samples")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Sample {index} is not finite")]
    NonFinite { index: usize },

    #[error("x samples must be strictly increasing, sample {index} is not")]
    NotStrictlyIncreasing { index: usize },

    #[error("x = {x} is outside the fitted domain [{min}, {max}]")]
    OutOfDomain { x: f64, min: f64, max: f64 },
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check the samples are usable for interpolation.
///
/// `strictly_increasing` should be set by interpolating fits, which cannot handle repeated or
/// reversed `x` values.
pub(crate) fn validate_samples(
    xs: &[f64],
    ys: &[f64],
    min_points: usize,
    strictly_increasing: bool,
) -> Result<(), CurveError> {
    if xs.len() != ys.len() {
        return Err(CurveError::LengthMismatch {
            x_len: xs.len(),
            y_len: ys.len(),
        });
    }

    if xs.len() < min_points {
        return Err(CurveError::TooFewPoints {
            required: min_points,
            found: xs.len(),
        });
    }

    for (i, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
        if !(x.is_finite() && y.is_finite()) {
            return Err(CurveError::NonFinite { index: i });
        }
    }

    if strictly_increasing {
        if let Some(i) = first_non_increasing(xs) {
            return Err(CurveError::NotStrictlyIncreasing { index: i });
        }
    }

    Ok(())
}

/// Index of the first sample which is not greater than its predecessor.
pub fn first_non_increasing(xs: &[f64]) -> Option<usize> {
    xs.windows(2).position(|w| w[1] <= w[0]).map(|i| i + 1)
}

/// Index of the segment `[xs[i], xs[i + 1]]` containing `x`, clamped to the valid segments.
///
/// `xs` must be strictly increasing with at least two elements.
pub(crate) fn segment_index(xs: &[f64], x: f64) -> usize {
    let last_seg = xs.len() - 2;

    match xs.iter().rposition(|&xi| xi <= x) {
        Some(i) => i.min(last_seg),
        None => 0,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_samples() {
        assert_eq!(validate_samples(&[0.0, 1.0], &[0.0, 1.0], 2, true), Ok(()));
        assert_eq!(
            validate_samples(&[0.0, 1.0], &[0.0], 2, true),
            Err(CurveError::LengthMismatch { x_len: 2, y_len: 1 })
        );
        assert_eq!(
            validate_samples(&[0.0], &[0.0], 2, true),
            Err(CurveError::TooFewPoints {
                required: 2,
                found: 1
            })
        );
        assert_eq!(
            validate_samples(&[0.0, std::f64::NAN], &[0.0, 1.0], 2, true),
            Err(CurveError::NonFinite { index: 1 })
        );
        assert_eq!(
            validate_samples(&[0.0, 2.0, 2.0], &[0.0, 1.0, 2.0], 2, true),
            Err(CurveError::NotStrictlyIncreasing { index: 2 })
        );
        assert_eq!(
            validate_samples(&[0.0, 2.0, 2.0], &[0.0, 1.0, 2.0], 2, false),
            Ok(())
        );
    }

    #[test]
    fn test_segment_index() {
        let xs = [0.0, 1.0, 3.0, 6.0];
        assert_eq!(segment_index(&xs, -1.0), 0);
        assert_eq!(segment_index(&xs, 0.0), 0);
        assert_eq!(segment_index(&xs, 2.0), 1);
        assert_eq!(segment_index(&xs, 3.0), 2);
        assert_eq!(segment_index(&xs, 6.0), 2);
        assert_eq!(segment_index(&xs, 10.0), 2);
    }
}
