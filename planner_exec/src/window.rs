//! # Window selection
//!
//! Picks the run of waypoints around the next waypoint, shifts them onto the lane centre and
//! expresses them in the local frame of an anchor pose, ready for fitting the lateral curve.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use crate::{
    curve::first_non_increasing,
    frame::{self, Pose},
    map::WaypointMap,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of waypoints taken behind the next waypoint.
pub const DEFAULT_WINDOW_BACK: usize = 5;

/// Default number of waypoints taken from the next waypoint onwards.
pub const DEFAULT_WINDOW_FORWARD: usize = 20;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A window of lane centre waypoints around an anchor pose.
#[derive(Debug, Clone)]
pub struct Window {
    /// The pose the local frame is anchored on.
    pub anchor: Pose,

    /// Index of the next waypoint ahead of the anchor.
    pub next_index: usize,

    /// Map indices of the selected waypoints, already wrapped onto the map.
    pub indices: Vec<usize>,

    /// Lane centre positions.
    ///
    /// Units: meters,
    /// Frame: Map
    pub points_m_map: Vec<Vector2<f64>>,

    /// Lane centre positions.
    ///
    /// Units: meters,
    /// Frame: Local to `anchor`
    pub points_m_loc: Vec<Vector2<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WindowError {
    #[error(
        "Window is degenerate: local x of point {index} (waypoint {waypoint}) is {x_m} m, which \
         does not increase on the previous point ({prev_x_m} m)"
    )]
    Degenerate {
        index: usize,
        waypoint: usize,
        x_m: f64,
        prev_x_m: f64,
    },

    #[error("Window is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Window {
    /// Select the window for the given anchor pose.
    ///
    /// The window covers waypoint indices `[next - back, next + forward)` wrapped onto the map,
    /// each offset by `lane_d_m` along its normal. The anchor may be the vehicle pose or the end
    /// of the previous trajectory.
    pub fn select(
        map: &WaypointMap,
        anchor: &Pose,
        lane_d_m: f64,
        back: usize,
        forward: usize,
    ) -> Self {
        let next_index = frame::next_waypoint(&anchor.position_m_map, anchor.heading_rad, map);

        let start = next_index as isize - back as isize;
        let end = next_index as isize + forward as isize;

        let indices: Vec<usize> = (start..end).map(|i| map.wrap_index(i)).collect();

        let points_m_map: Vec<Vector2<f64>> = indices
            .iter()
            .map(|&i| map.get(i as isize).offset_position(lane_d_m))
            .collect();

        let points_m_loc = points_m_map
            .iter()
            .map(|p| frame::to_local(p, anchor))
            .collect();

        Self {
            anchor: *anchor,
            next_index,
            indices,
            points_m_map,
            points_m_loc,
        }
    }

    pub fn len(&self) -> usize {
        self.points_m_loc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m_loc.is_empty()
    }

    /// Local x coordinates, in window order.
    pub fn xs(&self) -> Vec<f64> {
        self.points_m_loc.iter().map(|p| p[0]).collect()
    }

    /// Local y coordinates, in window order.
    pub fn ys(&self) -> Vec<f64> {
        self.points_m_loc.iter().map(|p| p[1]).collect()
    }

    /// Check local x is strictly increasing along the window, which curve fitting requires.
    ///
    /// Fails when the window doubles back on itself relative to the anchor heading, such as a
    /// hairpin inside the window or a window that wraps over the ends of a short map.
    pub fn check_increasing(&self) -> Result<(), WindowError> {
        if self.is_empty() {
            return Err(WindowError::Empty);
        }

        let xs = self.xs();

        match first_non_increasing(&xs) {
            Some(i) => Err(WindowError::Degenerate {
                index: i,
                waypoint: self.indices[i],
                x_m: xs[i],
                prev_x_m: xs[i - 1],
            }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
