//! # Trajectory generation module
//!
//! Trajectory generation produces, once per planning cycle, the sequence of map frame points the
//! vehicle should visit at each of the next `num_steps` ticks.
//!
//! Each cycle is anchored on a pose. On a cold start (no leftover trajectory) this is the vehicle's
//! own pose. Otherwise it's the last point of the leftover trajectory, with the heading taken
//! from the bearing between the last two leftover points, so the new trajectory carries on from
//! where the old one ends.
//!
//! Around the anchor a window of lane centre waypoints is selected and fitted with a lateral curve
//! in the anchor's local frame. A speed profile then gives the distance travelled in each step,
//! ramping smoothly up to the speed cap. Stepping along local X by those distances and looking up
//! local Y on the lateral curve gives the trajectory, which is transformed back into the map
//! frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod speed_profile;
pub mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::TrajGenParams;
pub use speed_profile::{SpeedProfile, SpeedProfileError, SpeedProfileParams};
pub use state::*;
