//! # Waypoint Map
//!
//! The waypoint map is the sampled centreline of the track. It is a closed loop: the waypoint
//! after the last one is the first, and the arc length `s` wraps back to zero at `max_s`.
//!
//! The map is loaded once at startup and never modified afterwards. Components which need it hold
//! an `Arc<WaypointMap>` or borrow it.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Loading maps from the persisted waypoint format
mod load;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use util::maths::wrap_index;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default reference point used to resolve the sign of Frenet `d`. The point lies inside the
/// default highway track, positions closer to it than their centreline projection have negative
/// `d`.
pub const DEFAULT_INTERIOR_REF_M_MAP: [f64; 2] = [1000.0, 2000.0];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single sampled point on the track centreline.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Index of the waypoint in the map.
    pub index: usize,

    /// Position of the waypoint.
    ///
    /// Units: meters,
    /// Frame: Map
    pub position_m_map: Vector2<f64>,

    /// Cumulative arc length from the start of the track.
    ///
    /// Units: meters
    pub s_m: f64,

    /// Unit normal pointing laterally away from the track centre.
    ///
    /// Frame: Map
    pub normal: Vector2<f64>,
}

/// The closed, ordered sequence of waypoints describing the track.
#[derive(Debug, Clone)]
pub struct WaypointMap {
    waypoints: Vec<Waypoint>,

    /// Arc length at which the track wraps back to zero.
    max_s_m: f64,

    /// Off-track reference point used for the Frenet `d` sign heuristic.
    interior_ref_m_map: Vector2<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while building or loading a map.
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error("Cannot open the map file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot parse line {line} of the map: {reason}")]
    ParseError { line: usize, reason: String },

    #[error("The map does not contain any waypoints")]
    Empty,

    #[error("The maximum s value must be positive and finite, found {0}")]
    InvalidMaxS(f64),

    #[error("Waypoint {index} has s = {s_m} which is less than the previous waypoint's s")]
    DecreasingS { index: usize, s_m: f64 },

    #[error("Waypoint {index} has s = {s_m} which is not less than max_s = {max_s_m}")]
    SBeyondMax { index: usize, s_m: f64, max_s_m: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Waypoint {
    /// Create a new waypoint. The index is assigned when the waypoint is added to a map.
    pub fn new(x_m: f64, y_m: f64, s_m: f64, dx: f64, dy: f64) -> Self {
        Self {
            index: 0,
            position_m_map: Vector2::new(x_m, y_m),
            s_m,
            normal: Vector2::new(dx, dy),
        }
    }

    /// Position offset along the waypoint's normal by `d_m`.
    pub fn offset_position(&self, d_m: f64) -> Vector2<f64> {
        self.position_m_map + d_m * self.normal
    }
}

impl WaypointMap {
    /// Build a new map from an ordered list of waypoints.
    ///
    /// The waypoints are re-indexed in order. The map must not be empty, `s` must be
    /// non-decreasing and every `s` must be less than `max_s_m`.
    pub fn new(mut waypoints: Vec<Waypoint>, max_s_m: f64) -> Result<Self, MapLoadError> {
        if !(max_s_m.is_finite() && max_s_m > 0.0) {
            return Err(MapLoadError::InvalidMaxS(max_s_m));
        }

        if waypoints.is_empty() {
            return Err(MapLoadError::Empty);
        }

        let mut prev_s_m = std::f64::NEG_INFINITY;
        for (i, wp) in waypoints.iter_mut().enumerate() {
            wp.index = i;

            if wp.s_m < prev_s_m {
                return Err(MapLoadError::DecreasingS {
                    index: i,
                    s_m: wp.s_m,
                });
            }
            if wp.s_m >= max_s_m {
                return Err(MapLoadError::SBeyondMax {
                    index: i,
                    s_m: wp.s_m,
                    max_s_m,
                });
            }

            prev_s_m = wp.s_m;
        }

        Ok(Self {
            waypoints,
            max_s_m,
            interior_ref_m_map: Vector2::new(
                DEFAULT_INTERIOR_REF_M_MAP[0],
                DEFAULT_INTERIOR_REF_M_MAP[1],
            ),
        })
    }

    /// Set the reference point used to resolve the sign of Frenet `d`.
    pub fn with_interior_ref(mut self, interior_ref_m_map: Vector2<f64>) -> Self {
        self.interior_ref_m_map = interior_ref_m_map;
        self
    }

    /// Number of waypoints in the map. Always at least one.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false, an empty map cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Get the waypoint at the given signed index, wrapping around the loop.
    pub fn get(&self, index: isize) -> &Waypoint {
        &self.waypoints[self.wrap_index(index)]
    }

    /// Wrap a signed index onto the loop of waypoints.
    pub fn wrap_index(&self, index: isize) -> usize {
        wrap_index(index, self.waypoints.len())
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn max_s_m(&self) -> f64 {
        self.max_s_m
    }

    pub fn interior_ref_m_map(&self) -> Vector2<f64> {
        self.interior_ref_m_map
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
