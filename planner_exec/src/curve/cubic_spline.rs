//! Natural cubic spline interpolation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{segment_index, validate_samples, CurveError, CurveFit};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A natural cubic spline (zero second derivative at both ends).
///
/// Passes exactly through every sample. Outside the sampled domain the spline is extended linearly
/// using the end slopes, which keeps extrapolation well behaved for short overruns.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,

    /// Second derivative at each knot.
    m: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CubicSpline {
    /// Minimum number of samples needed to build a spline.
    pub const MIN_POINTS: usize = 2;

    /// Fit a spline through the given samples.
    ///
    /// `xs` must be strictly increasing.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, CurveError> {
        validate_samples(xs, ys, Self::MIN_POINTS, true)?;

        let n = xs.len();
        let mut m = vec![0.0; n];

        // Interior knots form a tridiagonal system, solved with the Thomas algorithm.
        if n > 2 {
            let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
            let size = n - 2;

            let mut diag = vec![0.0; size];
            let mut upper = vec![0.0; size];
            let mut rhs = vec![0.0; size];

            for k in 0..size {
                let i = k + 1;
                diag[k] = 2.0 * (h[i - 1] + h[i]);
                upper[k] = h[i];
                rhs[k] =
                    6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
            }

            // Forward sweep, the sub diagonal entry for row k is h[k].
            for k in 1..size {
                let w = h[k] / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }

            // Back substitution
            m[size] = rhs[size - 1] / diag[size - 1];
            for k in (0..size - 1).rev() {
                m[k + 1] = (rhs[k] - upper[k] * m[k + 2]) / diag[k];
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// First derivative at `x`, using the end slopes outside the domain.
    pub fn slope(&self, x: f64) -> f64 {
        let (min, max) = self.domain();
        let x = x.max(min).min(max);
        let i = segment_index(&self.xs, x);
        let (b, c, d) = self.coeffs(i);
        let t = x - self.xs[i];

        b + 2.0 * c * t + 3.0 * d * t * t
    }

    /// Polynomial coefficients `(b, c, d)` of segment `i`, such that
    /// `y = ys[i] + b t + c t^2 + d t^3` with `t = x - xs[i]`.
    fn coeffs(&self, i: usize) -> (f64, f64, f64) {
        let h = self.xs[i + 1] - self.xs[i];
        let b = (self.ys[i + 1] - self.ys[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        let c = self.m[i] / 2.0;
        let d = (self.m[i + 1] - self.m[i]) / (6.0 * h);

        (b, c, d)
    }
}

impl CurveFit for CubicSpline {
    fn eval(&self, x: f64) -> f64 {
        let (min, max) = self.domain();

        if x < min {
            return self.ys[0] + self.slope(min) * (x - min);
        }
        if x > max {
            return self.ys[self.ys.len() - 1] + self.slope(max) * (x - max);
        }

        let i = segment_index(&self.xs, x);
        let (b, c, d) = self.coeffs(i);
        let t = x - self.xs[i];

        self.ys[i] + t * (b + t * (c + t * d))
    }

    fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
