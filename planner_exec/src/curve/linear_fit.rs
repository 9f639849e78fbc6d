//! Least squares straight line fit

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{validate_samples, CurveError, CurveFit};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Least squares line `y = slope * x + intercept`.
///
/// Unlike the interpolating fits this accepts unordered and repeated `x` samples, which makes it
/// the fallback for sample sets the splines cannot handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    min_x: f64,
    max_x: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LinearFit {
    pub const MIN_POINTS: usize = 1;

    /// Fit the line. If all `x` are equal the line is horizontal through the mean of `y`.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, CurveError> {
        validate_samples(xs, ys, Self::MIN_POINTS, false)?;

        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let (sxx, sxy) = xs
            .iter()
            .zip(ys.iter())
            .fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
                let dx = x - mean_x;
                (sxx + dx * dx, sxy + dx * (y - mean_y))
            });

        let slope = if sxx > std::f64::EPSILON { sxy / sxx } else { 0.0 };

        let min_x = xs.iter().cloned().fold(std::f64::INFINITY, f64::min);
        let max_x = xs.iter().cloned().fold(std::f64::NEG_INFINITY, f64::max);

        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
            min_x,
            max_x,
        })
    }
}

impl CurveFit for LinearFit {
    fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    fn domain(&self) -> (f64, f64) {
        (self.min_x, self.max_x)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line() {
        let fit = LinearFit::new(&[3.0, -1.0, 0.0, 5.0], &[7.0, -1.0, 1.0, 11.0]).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        assert_eq!(fit.domain(), (-1.0, 5.0));
    }

    #[test]
    fn test_noisy_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [6.1, 5.9, 6.1, 5.9];
        let fit = LinearFit::new(&xs, &ys).unwrap();

        assert_relative_eq!(fit.eval(1.5), 6.0, epsilon = 1e-12);
        assert!(fit.slope.abs() < 0.1);
    }

    #[test]
    fn test_vertical_samples() {
        let fit = LinearFit::new(&[2.0, 2.0, 2.0], &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_relative_eq!(fit.eval(100.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            LinearFit::new(&[], &[]),
            Err(CurveError::TooFewPoints { .. })
        ));
    }
}
