//! Speed profile
//!
//! The profile maps a step index to the distance travelled during that step. It is fitted through
//! a small set of anchor points, each a fraction of the per-step cap, so the vehicle accelerates
//! smoothly from rest and then holds the cap.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::curve::{CurveError, CurveFit, MonotoneCubic};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Conversion from miles per hour to meters per second.
pub const MPH_TO_MS: f64 = 0.44704;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed profile parameters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpeedProfileParams {
    /// Top speed, kept just under the road's speed limit.
    ///
    /// Units: miles/hour
    pub top_speed_mph: f64,

    /// Step indices of the profile anchors, strictly increasing
    pub anchor_steps: Vec<f64>,

    /// Fraction of the per-step cap at each anchor, non-decreasing, ending at 1
    pub anchor_fractions: Vec<f64>,
}

/// Per-step distance increments, rebuilt for every planning cycle.
#[derive(Debug, Clone)]
pub struct SpeedProfile {
    curve: MonotoneCubic,

    /// Units: meters
    max_dist_inc_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SpeedProfileError {
    #[error("Invalid top speed {0} mph, must be positive")]
    InvalidTopSpeed(f64),

    #[error("Invalid tick duration {0} s, must be positive")]
    InvalidTick(f64),

    #[error("Invalid profile anchors: {0}")]
    InvalidAnchors(String),

    #[error("Could not fit the profile: {0}")]
    FitError(#[from] CurveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SpeedProfileParams {
    fn default() -> Self {
        Self {
            top_speed_mph: 49.75,
            anchor_steps: vec![-1.0, 6.0, 12.0, 25.0, 50.0, 100.0],
            anchor_fractions: vec![0.01, 0.1, 0.3, 0.6, 0.9, 1.0],
        }
    }
}

impl SpeedProfileParams {
    /// Maximum distance travelled in one tick at top speed.
    ///
    /// Units: meters
    pub fn max_dist_inc_m(&self, tick_s: f64) -> f64 {
        self.top_speed_mph * MPH_TO_MS * tick_s
    }

    fn validate(&self, tick_s: f64) -> Result<(), SpeedProfileError> {
        if !(self.top_speed_mph.is_finite() && self.top_speed_mph > 0.0) {
            return Err(SpeedProfileError::InvalidTopSpeed(self.top_speed_mph));
        }

        if !(tick_s.is_finite() && tick_s > 0.0) {
            return Err(SpeedProfileError::InvalidTick(tick_s));
        }

        if self.anchor_steps.len() != self.anchor_fractions.len() {
            return Err(SpeedProfileError::InvalidAnchors(format!(
                "{} steps but {} fractions",
                self.anchor_steps.len(),
                self.anchor_fractions.len()
            )));
        }

        if self.anchor_steps.len() < MonotoneCubic::MIN_POINTS {
            return Err(SpeedProfileError::InvalidAnchors(format!(
                "at least {} anchors are required",
                MonotoneCubic::MIN_POINTS
            )));
        }

        if self
            .anchor_fractions
            .iter()
            .any(|f| !(f.is_finite() && *f >= 0.0 && *f <= 1.0))
        {
            return Err(SpeedProfileError::InvalidAnchors(
                "fractions must be in the range [0, 1]".into(),
            ));
        }

        if self.anchor_fractions.windows(2).any(|w| w[1] < w[0]) {
            return Err(SpeedProfileError::InvalidAnchors(
                "fractions must be non-decreasing".into(),
            ));
        }

        // Guarantees the profile settles on the cap
        if self.anchor_fractions.last() != Some(&1.0) {
            return Err(SpeedProfileError::InvalidAnchors(
                "the last fraction must be 1.0".into(),
            ));
        }

        Ok(())
    }
}

impl SpeedProfile {
    /// Build the profile from the parameters and the tick duration.
    pub fn new(params: &SpeedProfileParams, tick_s: f64) -> Result<Self, SpeedProfileError> {
        params.validate(tick_s)?;

        let max_dist_inc_m = params.max_dist_inc_m(tick_s);

        let dist_incs: Vec<f64> = params
            .anchor_fractions
            .iter()
            .map(|f| f * max_dist_inc_m)
            .collect();

        let curve = MonotoneCubic::new(&params.anchor_steps, &dist_incs)?;

        Ok(Self {
            curve,
            max_dist_inc_m,
        })
    }

    /// Distance travelled during the given step.
    ///
    /// Units: meters
    pub fn dist_inc_m(&self, step: usize) -> f64 {
        clamp(&self.curve.eval(step as f64), &0.0, &self.max_dist_inc_m)
    }

    /// The per-step cap.
    ///
    /// Units: meters
    pub fn max_dist_inc_m(&self) -> f64 {
        self.max_dist_inc_m
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cap() {
        let params = SpeedProfileParams::default();
        assert_abs_diff_eq!(params.max_dist_inc_m(0.02), 0.444_804_8, epsilon = 1e-9);
    }

    #[test]
    fn test_profile_is_monotone_and_capped() {
        let profile = SpeedProfile::new(&SpeedProfileParams::default(), 0.02).unwrap();
        let cap = profile.max_dist_inc_m();

        let mut prev = 0.0;
        for step in 0..300 {
            let inc = profile.dist_inc_m(step);
            assert!(inc >= prev, "step {} decreased: {} < {}", step, inc, prev);
            assert!(inc <= cap);
            prev = inc;
        }

        // Holds the cap past the last anchor
        assert_eq!(profile.dist_inc_m(100), cap);
        assert_eq!(profile.dist_inc_m(1000), cap);
    }

    #[test]
    fn test_profile_hits_anchors() {
        let profile = SpeedProfile::new(&SpeedProfileParams::default(), 0.02).unwrap();
        let cap = profile.max_dist_inc_m();

        assert_abs_diff_eq!(profile.dist_inc_m(6), 0.1 * cap, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.dist_inc_m(12), 0.3 * cap, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.dist_inc_m(25), 0.6 * cap, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.dist_inc_m(50), 0.9 * cap, epsilon = 1e-12);

        // Starts slow but moving
        assert!(profile.dist_inc_m(0) > 0.01 * cap);
        assert!(profile.dist_inc_m(0) < 0.1 * cap);
    }

    #[test]
    fn test_invalid_anchors() {
        let mut params = SpeedProfileParams::default();
        params.anchor_fractions = vec![0.01, 0.1, 0.3, 0.2, 0.9, 1.0];
        assert!(matches!(
            SpeedProfile::new(&params, 0.02),
            Err(SpeedProfileError::InvalidAnchors(_))
        ));

        let mut params = SpeedProfileParams::default();
        params.anchor_fractions = vec![0.01, 0.1, 0.3, 0.6, 0.9, 0.95];
        assert!(matches!(
            SpeedProfile::new(&params, 0.02),
            Err(SpeedProfileError::InvalidAnchors(_))
        ));

        let mut params = SpeedProfileParams::default();
        params.anchor_steps = vec![-1.0, 6.0, 6.0, 25.0, 50.0, 100.0];
        assert!(matches!(
            SpeedProfile::new(&params, 0.02),
            Err(SpeedProfileError::FitError(CurveError::NotStrictlyIncreasing { .. }))
        ));

        let mut params = SpeedProfileParams::default();
        params.top_speed_mph = 0.0;
        assert!(matches!(
            SpeedProfile::new(&params, 0.02),
            Err(SpeedProfileError::InvalidTopSpeed(_))
        ));
    }
}
