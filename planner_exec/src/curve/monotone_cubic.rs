//! Monotone piecewise cubic Hermite interpolation (Fritsch-Carlson)

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{segment_index, validate_samples, CurveError, CurveFit};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Piecewise cubic Hermite interpolant whose tangents are limited so that monotone data stays
/// monotone, with no overshoot between samples.
///
/// Outside the sampled domain the curve holds the end values.
#[derive(Debug, Clone)]
pub struct MonotoneCubic {
    xs: Vec<f64>,
    ys: Vec<f64>,

    /// Tangent at each knot.
    tangents: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonotoneCubic {
    pub const MIN_POINTS: usize = 2;

    /// Fit the interpolant. `xs` must be strictly increasing.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, CurveError> {
        validate_samples(xs, ys, Self::MIN_POINTS, true)?;

        let n = xs.len();

        let secants: Vec<f64> = xs
            .windows(2)
            .zip(ys.windows(2))
            .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
            .collect();

        let mut tangents = vec![0.0; n];
        tangents[0] = secants[0];
        tangents[n - 1] = secants[n - 2];

        for i in 1..n - 1 {
            tangents[i] = if secants[i - 1] * secants[i] <= 0.0 {
                0.0
            } else {
                (secants[i - 1] + secants[i]) / 2.0
            };
        }

        // Limit tangents so each segment stays monotone
        for i in 0..n - 1 {
            if secants[i] == 0.0 {
                tangents[i] = 0.0;
                tangents[i + 1] = 0.0;
                continue;
            }

            let alpha = tangents[i] / secants[i];
            let beta = tangents[i + 1] / secants[i];
            let norm_sq = alpha * alpha + beta * beta;

            if norm_sq > 9.0 {
                let tau = 3.0 / norm_sq.sqrt();
                tangents[i] = tau * alpha * secants[i];
                tangents[i + 1] = tau * beta * secants[i];
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            tangents,
        })
    }
}

impl CurveFit for MonotoneCubic {
    fn eval(&self, x: f64) -> f64 {
        let (min, max) = self.domain();

        if x <= min {
            return self.ys[0];
        }
        if x >= max {
            return self.ys[self.ys.len() - 1];
        }

        let i = segment_index(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        // Hermite basis
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[i]
            + h10 * h * self.tangents[i]
            + h01 * self.ys[i + 1]
            + h11 * h * self.tangents[i + 1]
    }

    fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
