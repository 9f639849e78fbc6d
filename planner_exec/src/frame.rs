//! # Frame transformations
//!
//! Three frames are used by the planner:
//!
//! - Map frame: the fixed frame of the waypoint map and the simulator.
//! - Local frame: translated to an origin pose and rotated by its heading, so that local X points
//!   forwards and local Y points to the left.
//! - Frenet frame: arc length `s` along the track centreline and signed lateral offset `d`.
//!
//! Map/local conversions are exact inverses of each other. Cartesian/Frenet conversions are only
//! approximate inverses since the centreline is a polyline.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Isometry2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::map::WaypointMap;
use util::maths::{get_ang_dist_pi, rem_euclid};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Heading error above which the closest waypoint is considered to be behind the vehicle.
pub const BEHIND_THRESHOLD_RAD: f64 = std::f64::consts::FRAC_PI_4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and heading in the map frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Units: meters,
    /// Frame: Map
    pub position_m_map: Vector2<f64>,

    /// Angle to the positive map X axis, anticlockwise positive.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// A position in the Frenet frame of the track centreline.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frenet {
    /// Arc length along the centreline, in the range [0, max_s).
    ///
    /// Units: meters
    pub s_m: f64,

    /// Signed lateral offset from the centreline, positive away from the track interior.
    ///
    /// Units: meters
    pub d_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by frame conversions.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Query s = {s_m} m is outside the track range [0, {max_s_m})")]
    SOutOfDomain { s_m: f64, max_s_m: f64 },

    #[error("The map segment between waypoints {prev} and {next} has zero length")]
    DegenerateSegment { prev: usize, next: usize },

    #[error("Cannot convert a non-finite position ({0}, {1})")]
    NonFinite(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m_map: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// The rigid transform which takes local points into the map frame.
    pub fn isometry(&self) -> Isometry2<f64> {
        Isometry2::new(self.position_m_map, self.heading_rad)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a map frame point into the local frame of `origin`.
///
/// Translates by `-origin.position` then rotates by `-origin.heading`.
pub fn to_local(point_m_map: &Vector2<f64>, origin: &Pose) -> Vector2<f64> {
    origin
        .isometry()
        .inverse_transform_point(&Point2::from(*point_m_map))
        .coords
}

/// Convert a point in the local frame of `origin` into the map frame.
///
/// Rotates by `+origin.heading` then translates by `+origin.position`.
pub fn to_global(point_m_loc: &Vector2<f64>, origin: &Pose) -> Vector2<f64> {
    origin
        .isometry()
        .transform_point(&Point2::from(*point_m_loc))
        .coords
}

/// Index of the waypoint closest to the position.
///
/// Ties are broken by the lowest index.
pub fn closest_waypoint(position_m_map: &Vector2<f64>, map: &WaypointMap) -> usize {
    let mut closest_index = 0;
    let mut closest_dist_m = std::f64::INFINITY;

    for wp in map.waypoints() {
        let dist_m = (wp.position_m_map - position_m_map).norm();
        if dist_m < closest_dist_m {
            closest_dist_m = dist_m;
            closest_index = wp.index;
        }
    }

    closest_index
}

/// Index of the next waypoint ahead of the vehicle.
///
/// This is the closest waypoint, unless the bearing to it differs from the heading by more than
/// 45 degrees, in which case it's behind us and the following waypoint is used.
pub fn next_waypoint(position_m_map: &Vector2<f64>, heading_rad: f64, map: &WaypointMap) -> usize {
    let closest = closest_waypoint(position_m_map, map);

    let to_wp = map.get(closest as isize).position_m_map - position_m_map;
    let bearing_rad = to_wp[1].atan2(to_wp[0]);

    if get_ang_dist_pi(heading_rad, bearing_rad).abs() > BEHIND_THRESHOLD_RAD {
        map.wrap_index(closest as isize + 1)
    } else {
        closest
    }
}

/// Convert a map frame position into Frenet coordinates.
///
/// The position is projected onto the segment joining the next waypoint and its predecessor. The
/// sign of `d` comes from the map's interior reference point: if the position is no further from
/// it than its projection, `d` is negative. This heuristic only holds on tracks where the
/// reference point is inside every bend.
pub fn to_frenet(
    position_m_map: &Vector2<f64>,
    heading_rad: f64,
    map: &WaypointMap,
) -> Result<Frenet, FrameError> {
    if !(position_m_map[0].is_finite() && position_m_map[1].is_finite()) {
        return Err(FrameError::NonFinite(position_m_map[0], position_m_map[1]));
    }

    let next = next_waypoint(position_m_map, heading_rad, map);
    let prev = map.wrap_index(next as isize - 1);

    let prev_m_map = map.get(prev as isize).position_m_map;
    let seg = map.get(next as isize).position_m_map - prev_m_map;
    let seg_norm_sq = seg.norm_squared();

    if seg_norm_sq <= std::f64::EPSILON {
        return Err(FrameError::DegenerateSegment { prev, next });
    }

    // Everything below is relative to the previous waypoint
    let pos = position_m_map - prev_m_map;
    let proj = (pos.dot(&seg) / seg_norm_sq) * seg;

    let mut d_m = (pos - proj).norm();

    let interior_ref = map.interior_ref_m_map() - prev_m_map;
    if (interior_ref - pos).norm() <= (interior_ref - proj).norm() {
        d_m *= -1.0;
    }

    // Accumulate segment lengths up to the previous waypoint
    let waypoints = map.waypoints();
    let mut s_m: f64 = waypoints[..=prev]
        .windows(2)
        .map(|w| (w[1].position_m_map - w[0].position_m_map).norm())
        .sum();
    s_m += proj.norm();

    Ok(Frenet {
        s_m: rem_euclid(s_m, map.max_s_m()),
        d_m,
    })
}

/// Convert Frenet coordinates into a map frame position.
///
/// `s_m` must be in the range [0, max_s). Use [`to_cartesian_clamped`] when the value may have
/// drifted outside it.
pub fn to_cartesian(s_m: f64, d_m: f64, map: &WaypointMap) -> Result<Vector2<f64>, FrameError> {
    let max_s_m = map.max_s_m();

    if !(s_m.is_finite() && s_m >= 0.0 && s_m < max_s_m) {
        return Err(FrameError::SOutOfDomain { s_m, max_s_m });
    }

    // Last waypoint with s <= query. If the query is before the first waypoint the segment
    // crossing the end of the track is used instead.
    let prev = match map.waypoints().iter().rposition(|wp| wp.s_m <= s_m) {
        Some(i) => i,
        None => map.len() - 1,
    };
    let next = map.wrap_index(prev as isize + 1);

    let prev_wp = map.get(prev as isize);
    let seg = map.get(next as isize).position_m_map - prev_wp.position_m_map;

    if seg.norm_squared() <= std::f64::EPSILON {
        return Err(FrameError::DegenerateSegment { prev, next });
    }

    let heading_rad = seg[1].atan2(seg[0]);

    // Distance along the segment, accounting for the wrap
    let seg_s_m = rem_euclid(s_m - prev_wp.s_m, max_s_m);

    let seg_point = prev_wp.position_m_map
        + seg_s_m * Vector2::new(heading_rad.cos(), heading_rad.sin());

    // Positive d is to the right of the direction of travel
    let perp_heading_rad = heading_rad - std::f64::consts::FRAC_PI_2;

    Ok(seg_point + d_m * Vector2::new(perp_heading_rad.cos(), perp_heading_rad.sin()))
}

/// Convert Frenet coordinates into a map frame position, wrapping `s_m` onto the track first.
///
/// An out of range `s_m` is a logic error at the call site, so debug builds will panic on it.
pub fn to_cartesian_clamped(
    s_m: f64,
    d_m: f64,
    map: &WaypointMap,
) -> Result<Vector2<f64>, FrameError> {
    debug_assert!(
        s_m.is_finite() && s_m >= 0.0 && s_m < map.max_s_m(),
        "Frenet s = {} is outside the track range [0, {})",
        s_m,
        map.max_s_m()
    );

    let mut wrapped_s_m = rem_euclid(s_m, map.max_s_m());

    // rem_euclid can round up to max_s for tiny negative values
    if wrapped_s_m >= map.max_s_m() {
        wrapped_s_m = 0.0;
    }

    to_cartesian(wrapped_s_m, d_m, map)
}

/// Signed lateral offset of the centre of the given lane.
///
/// Lane 0 is the first lane on the positive side of the centreline, lane -1 the first on the
/// negative side.
pub fn lane_offset(lane: i32, lane_width_m: f64) -> f64 {
    lane_width_m / 2.0 + lane_width_m * lane as f64
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
