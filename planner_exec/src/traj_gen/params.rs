//! Trajectory generation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{speed_profile::SpeedProfileParams, TrajGenError};
use crate::{
    frame::lane_offset,
    window::{DEFAULT_WINDOW_BACK, DEFAULT_WINDOW_FORWARD},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory generation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrajGenParams {
    /// Number of points in each issued trajectory
    pub num_steps: usize,

    /// Time between consecutive trajectory points.
    ///
    /// Units: seconds
    pub tick_s: f64,

    /// Width of a single lane.
    ///
    /// Units: meters
    pub lane_width_m: f64,

    /// Lane to drive in.
    ///
    /// Lanes on the positive side of the centreline count outwards from 0, lanes on the negative
    /// side count outwards from -1.
    pub lane: i32,

    /// Number of waypoints behind the next waypoint included in the fit window
    pub window_back: usize,

    /// Number of waypoints from the next waypoint onwards included in the fit window
    pub window_forward: usize,

    /// Speed profile parameters
    pub speed: SpeedProfileParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrajGenParams {
    fn default() -> Self {
        Self {
            num_steps: 50,
            tick_s: 0.02,
            lane_width_m: 4.0,
            lane: 1,
            window_back: DEFAULT_WINDOW_BACK,
            window_forward: DEFAULT_WINDOW_FORWARD,
            speed: SpeedProfileParams::default(),
        }
    }
}

impl TrajGenParams {
    /// Lateral offset of the target lane's centre.
    ///
    /// Units: meters
    pub fn lane_offset_m(&self) -> f64 {
        lane_offset(self.lane, self.lane_width_m)
    }

    /// The soft time budget of one planning cycle.
    ///
    /// The simulator consumes one point per tick and asks for a new trajectory at the same
    /// cadence, so a cycle taking longer than one tick delays the next reply.
    ///
    /// Units: seconds
    pub fn cycle_budget_s(&self) -> f64 {
        self.tick_s
    }

    /// Check the parameters are usable.
    ///
    /// The speed profile anchors are checked when the profile is built.
    pub fn validate(&self) -> Result<(), TrajGenError> {
        if self.num_steps == 0 {
            return Err(TrajGenError::InvalidParams(
                "num_steps must be at least 1".into(),
            ));
        }

        if !(self.tick_s.is_finite() && self.tick_s > 0.0) {
            return Err(TrajGenError::InvalidParams(format!(
                "tick_s must be positive, found {}",
                self.tick_s
            )));
        }

        if !(self.lane_width_m.is_finite() && self.lane_width_m > 0.0) {
            return Err(TrajGenError::InvalidParams(format!(
                "lane_width_m must be positive, found {}",
                self.lane_width_m
            )));
        }

        // The spline needs at least two points
        if self.window_back + self.window_forward < 2 {
            return Err(TrajGenError::InvalidParams(format!(
                "The window must contain at least 2 waypoints, found {}",
                self.window_back + self.window_forward
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
