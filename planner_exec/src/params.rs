//! # Planner executable parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;
use std::path::Path;

use crate::{
    map::{MapLoadError, WaypointMap, DEFAULT_INTERIOR_REF_M_MAP},
    traj_gen::TrajGenParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the planner executable
#[derive(Deserialize, Debug, Clone)]
pub struct PlannerExecParams {
    /// The waypoint map
    pub map: MapParams,

    /// Trajectory generation
    pub traj_gen: TrajGenParams,
}

/// Parameters describing the waypoint map
#[derive(Deserialize, Debug, Clone)]
pub struct MapParams {
    /// Path to the map file, relative to the software root
    pub file: String,

    /// Length of the track, the point at which `s` wraps back to zero.
    ///
    /// Units: meters
    pub max_s_m: f64,

    /// A point inside the track used to resolve the sign of Frenet `d`.
    ///
    /// Units: meters,
    /// Frame: Map
    #[serde(default = "default_interior_ref")]
    pub interior_ref_m: [f64; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MapParams {
    /// Load the map described by these parameters from under `root`.
    pub fn load_map<P: AsRef<Path>>(&self, root: P) -> Result<WaypointMap, MapLoadError> {
        let map = WaypointMap::load(root.as_ref().join(&self.file), self.max_s_m)?;

        Ok(map.with_interior_ref(Vector2::new(
            self.interior_ref_m[0],
            self.interior_ref_m[1],
        )))
    }
}

fn default_interior_ref() -> [f64; 2] {
    DEFAULT_INTERIOR_REF_M_MAP
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialise() {
        let params: PlannerExecParams = util::params::from_str(
            r#"
            [map]
            file = "data/highway_map.csv"
            max_s_m = 6945.554

            [traj_gen]
            num_steps = 50
            tick_s = 0.02
            lane_width_m = 4.0
            lane = 1
            window_back = 5
            window_forward = 20

            [traj_gen.speed]
            top_speed_mph = 49.75
            anchor_steps = [-1.0, 6.0, 12.0, 25.0, 50.0, 100.0]
            anchor_fractions = [0.01, 0.1, 0.3, 0.6, 0.9, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(params.map.interior_ref_m, DEFAULT_INTERIOR_REF_M_MAP);
        assert_eq!(params.traj_gen, TrajGenParams::default());
    }
}
