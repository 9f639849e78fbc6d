//! # Planner library.
//!
//! This library allows other crates in the workspace, as well as the tests and benchmarks, to
//! access the items defined inside the planner crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Frame transformations - map/local and Cartesian/Frenet conversions
pub mod frame;

/// Waypoint map - the closed loop of track centreline waypoints
pub mod map;

/// Window selection - picks the waypoints around a pose and centres them on the lane
pub mod window;

/// Curve fitting - splines used for the lateral shape and the speed profile
pub mod curve;

/// Trajectory generation - builds the trajectory issued each planning cycle
pub mod traj_gen;

/// Executable parameters
pub mod params;
