//! Telemetry and control message definitions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TelemetryError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Telemetry sent by the simulator once per planning cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    /// Vehicle position in the map frame.
    ///
    /// Units: meters
    pub x: f64,
    pub y: f64,

    /// Vehicle Frenet coordinates as reported by the simulator.
    ///
    /// Units: meters
    pub s: f64,
    pub d: f64,

    /// Vehicle heading.
    ///
    /// Units: degrees
    pub yaw: f64,

    /// Vehicle speed.
    ///
    /// Units: miles/hour
    pub speed: f64,

    /// Points of the previously issued trajectory that the vehicle has not yet reached.
    pub previous_path_x: Vec<f64>,
    pub previous_path_y: Vec<f64>,

    /// Frenet coordinates of the last point of the previous path.
    pub end_path_s: f64,
    pub end_path_d: f64,

    /// Other vehicles on the same side of the road. Not used by the planner.
    #[serde(default)]
    pub sensor_fusion: Value,
}

/// Trajectory sent to the simulator, the vehicle visits one point per tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub next_x: Vec<f64>,
    pub next_y: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Telemetry {
    /// Get the leftover previous path as a list of `(x, y)` pairs.
    pub fn previous_path(&self) -> Result<Vec<(f64, f64)>, TelemetryError> {
        if self.previous_path_x.len() != self.previous_path_y.len() {
            return Err(TelemetryError::PathLengthMismatch {
                x_len: self.previous_path_x.len(),
                y_len: self.previous_path_y.len(),
            });
        }

        Ok(self
            .previous_path_x
            .iter()
            .copied()
            .zip(self.previous_path_y.iter().copied())
            .collect())
    }
}

impl Control {
    /// Build a control message from a sequence of `(x, y)` points.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (next_x, next_y) = points.into_iter().unzip();
        Self { next_x, next_y }
    }

    /// Number of points in the trajectory.
    pub fn len(&self) -> usize {
        self.next_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_x.is_empty()
    }

    /// Serialise into a `control` event frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        Ok(format!("42[\"control\",{}]", serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_control_frame() {
        let ctrl = Control::from_points(vec![(1.0, 2.0), (3.0, 4.5)]);
        assert_eq!(ctrl.len(), 2);
        assert_eq!(
            ctrl.to_frame().unwrap(),
            "42[\"control\",{\"next_x\":[1.0,3.0],\"next_y\":[2.0,4.5]}]"
        );
    }

    #[test]
    fn test_previous_path_mismatch() {
        let telem: Telemetry = serde_json::from_str(
            r#"{"x":0,"y":0,"s":0,"d":0,"yaw":0,"speed":0,
                "previous_path_x":[1.0,2.0],"previous_path_y":[1.0],
                "end_path_s":0,"end_path_d":0}"#,
        )
        .unwrap();

        assert!(telem.sensor_fusion.is_null());
        match telem.previous_path() {
            Err(TelemetryError::PathLengthMismatch { x_len, y_len }) => {
                assert_eq!((x_len, y_len), (2, 1))
            }
            r => panic!("Expected a length mismatch, got {:?}", r),
        }
    }
}
