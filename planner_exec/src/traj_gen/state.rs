//! Trajectory generation module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::{
    params::TrajGenParams,
    speed_profile::{SpeedProfile, SpeedProfileError},
};
use crate::{
    curve::{CurveError, CurveFit, LateralCurve},
    frame::{self, Frenet, Pose},
    map::WaypointMap,
    window::Window,
};
use comms_if::sim::{Control, Telemetry, TelemetryError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory generator.
///
/// Holds the shared map and the parameters, everything else is rebuilt in each call to
/// [`TrajGen::proc`].
pub struct TrajGen {
    params: TrajGenParams,

    map: Arc<WaypointMap>,

    report: StatusReport,
}

/// The vehicle's state as seen by the planner at the start of a cycle.
#[derive(Debug, Clone, Default)]
pub struct VehicleState {
    /// Vehicle pose in the map frame
    pub pose: Pose,

    /// Units: miles/hour
    pub speed_mph: f64,

    /// Points of the previous trajectory the vehicle has not yet reached, earliest first.
    ///
    /// Units: meters,
    /// Frame: Map
    pub prev_path_m_map: Vec<Vector2<f64>>,

    /// Frenet position as reported by the simulator, if known.
    pub reported_frenet: Option<Frenet>,
}

/// A trajectory to be followed, one point per tick, earliest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Units: meters,
    /// Frame: Map
    pub points_m_map: Vec<Vector2<f64>>,
}

/// The status report containing various flags and monitoring quantities.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// How the cycle was anchored
    pub init_mode: InitMode,

    /// Index of the next waypoint ahead of the anchor
    pub next_waypoint: usize,

    /// Anchor pose of the cycle.
    ///
    /// Units: meters, radians
    pub anchor_x_m: f64,
    pub anchor_y_m: f64,
    pub anchor_heading_rad: f64,

    /// If true the window could not be interpolated and a straight line was used instead
    pub degenerate_window: bool,

    /// If true at least one step was looked up outside the lateral curve's fitted domain
    pub lateral_out_of_domain: bool,

    /// Vehicle Frenet position computed from the map.
    ///
    /// Units: meters
    pub veh_s_m: f64,
    pub veh_d_m: f64,

    /// Distance between the vehicle and the Cartesian position of its computed Frenet
    /// coordinates.
    ///
    /// Units: meters
    pub frenet_residual_m: f64,

    /// Number of points in the issued trajectory
    pub num_points: usize,

    /// If true generation failed and the leftover trajectory was issued instead
    pub cycle_failed: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a planning cycle is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InitMode {
    /// No usable leftover trajectory, anchored on the vehicle pose
    ColdStart,

    /// Anchored on the end of the leftover trajectory
    Continue,
}

/// Potential errors that can occur during trajectory generation.
#[derive(Debug, thiserror::Error)]
pub enum TrajGenError {
    #[error("Invalid trajectory generation parameters: {0}")]
    InvalidParams(String),

    #[error("Could not build the speed profile: {0}")]
    SpeedProfileError(#[from] SpeedProfileError),

    #[error("Could not fit the lateral curve: {0}")]
    LateralFitError(#[from] CurveError),

    #[error("The vehicle state is not finite: {0:?}")]
    NonFiniteState(Pose),

    #[error("Generated a non-finite point at step {0}")]
    NonFinitePoint(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            init_mode: InitMode::ColdStart,
            next_waypoint: 0,
            anchor_x_m: 0.0,
            anchor_y_m: 0.0,
            anchor_heading_rad: 0.0,
            degenerate_window: false,
            lateral_out_of_domain: false,
            veh_s_m: std::f64::NAN,
            veh_d_m: std::f64::NAN,
            frenet_residual_m: std::f64::NAN,
            num_points: 0,
            cycle_failed: false,
        }
    }
}

impl VehicleState {
    /// Build the state from a telemetry message.
    ///
    /// The telemetry heading is in degrees, the state's is in radians.
    pub fn from_telemetry(telem: &Telemetry) -> Result<Self, TelemetryError> {
        let prev_path_m_map = telem
            .previous_path()?
            .into_iter()
            .map(|(x, y)| Vector2::new(x, y))
            .collect();

        Ok(Self {
            pose: Pose::new(telem.x, telem.y, telem.yaw.to_radians()),
            speed_mph: telem.speed,
            prev_path_m_map,
            reported_frenet: Some(Frenet {
                s_m: telem.s,
                d_m: telem.d,
            }),
        })
    }
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points_m_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m_map.is_empty()
    }

    /// Convert into the control message sent to the simulator.
    pub fn to_control(&self) -> Control {
        Control::from_points(self.points_m_map.iter().map(|p| (p[0], p[1])))
    }
}

impl TrajGen {
    /// Create a new trajectory generator working on the given map.
    pub fn new(params: TrajGenParams, map: Arc<WaypointMap>) -> Result<Self, TrajGenError> {
        params.validate()?;

        // Catch bad profile parameters at startup rather than on the first cycle
        SpeedProfile::new(&params.speed, params.tick_s)?;

        Ok(Self {
            params,
            map,
            report: StatusReport::default(),
        })
    }

    pub fn params(&self) -> &TrajGenParams {
        &self.params
    }

    pub fn map(&self) -> &WaypointMap {
        &self.map
    }

    /// Process one planning cycle.
    ///
    /// Processing involves:
    ///  1. Choosing the anchor pose, either the vehicle or the end of the leftover trajectory.
    ///  1. Selecting the lane centre window around the anchor and fitting the lateral curve.
    ///  1. Building the speed profile.
    ///  1. Stepping along the lateral curve by the profile's increments and transforming each
    ///     step back into the map frame.
    pub fn proc(
        &mut self,
        state: &VehicleState,
    ) -> Result<(Trajectory, StatusReport), TrajGenError> {
        // Setup cycle data
        self.report = StatusReport::default();

        let pos = state.pose.position_m_map;
        if !(pos[0].is_finite() && pos[1].is_finite() && state.pose.heading_rad.is_finite()) {
            return Err(TrajGenError::NonFiniteState(state.pose));
        }

        self.frenet_diagnostics(state);

        let (anchor, init_mode) = self.select_anchor(state);
        self.report.init_mode = init_mode;
        self.report.anchor_x_m = anchor.position_m_map[0];
        self.report.anchor_y_m = anchor.position_m_map[1];
        self.report.anchor_heading_rad = anchor.heading_rad;

        // Lateral curve
        let window = Window::select(
            &self.map,
            &anchor,
            self.params.lane_offset_m(),
            self.params.window_back,
            self.params.window_forward,
        );
        self.report.next_waypoint = window.next_index;

        debug!(
            "{:?} from ({:.3}, {:.3}) heading {:.4} rad, next waypoint {}",
            init_mode,
            anchor.position_m_map[0],
            anchor.position_m_map[1],
            anchor.heading_rad,
            window.next_index
        );

        let curve = match window.check_increasing() {
            Ok(()) => LateralCurve::fit(&window)?,
            Err(e) => {
                warn!("{}, falling back to a straight line fit", e);
                self.report.degenerate_window = true;
                LateralCurve::fit_straight(&window)?
            }
        };

        // Profiles are rebuilt each cycle
        let profile = SpeedProfile::new(&self.params.speed, self.params.tick_s)?;

        // Step along the curve. Longitudinal progress is accumulated in the anchor frame without
        // re-rotating per step, scaled by the cosine of the anchor heading. This is only
        // approximately right for small heading changes over the trajectory.
        let heading_scale = anchor.heading_rad.cos();
        let mut x_m_loc = 0.0;
        let mut points_m_map = Vec::with_capacity(self.params.num_steps);

        for step in 0..self.params.num_steps {
            let dist_inc_m = profile.dist_inc_m(step);
            x_m_loc += dist_inc_m * heading_scale;

            if !curve.in_domain(x_m_loc) && !self.report.lateral_out_of_domain {
                let (min, max) = curve.domain();
                warn!(
                    "Step {} looks up local x = {:.3} m outside the lateral curve domain \
                     [{:.3}, {:.3}]",
                    step, x_m_loc, min, max
                );
                self.report.lateral_out_of_domain = true;
            }

            let y_m_loc = curve.eval(x_m_loc);
            let point_m_map = frame::to_global(&Vector2::new(x_m_loc, y_m_loc), &anchor);

            if !(point_m_map[0].is_finite() && point_m_map[1].is_finite()) {
                return Err(TrajGenError::NonFinitePoint(step));
            }

            trace!(
                "Step {}: inc {:.4} m, local ({:.3}, {:.3}), map ({:.3}, {:.3})",
                step,
                dist_inc_m,
                x_m_loc,
                y_m_loc,
                point_m_map[0],
                point_m_map[1]
            );

            points_m_map.push(point_m_map);
        }

        self.report.num_points = points_m_map.len();

        Ok((Trajectory { points_m_map }, self.report))
    }

    /// Process one planning cycle, issuing the fallback trajectory if generation fails.
    ///
    /// The report of a failed cycle keeps whatever was filled in before the failure and is
    /// marked with `cycle_failed`.
    pub fn proc_or_fallback(&mut self, state: &VehicleState) -> (Trajectory, StatusReport) {
        match self.proc(state) {
            Ok(out) => out,
            Err(e) => {
                warn!(
                    "Trajectory generation failed, reissuing {} leftover points: {}",
                    state.prev_path_m_map.len(),
                    e
                );

                let traj = Self::fallback_trajectory(state);
                self.report.cycle_failed = true;
                self.report.num_points = traj.len();

                (traj, self.report)
            }
        }
    }

    /// The trajectory to issue when a cycle fails: the leftover tail as it stands, which is empty
    /// if there is none.
    pub fn fallback_trajectory(state: &VehicleState) -> Trajectory {
        Trajectory {
            points_m_map: state.prev_path_m_map.clone(),
        }
    }

    /// Pick the pose the cycle is anchored on.
    ///
    /// With at least two leftover points the anchor is the last of them, heading along the
    /// bearing from the second to last. Otherwise it's the vehicle pose.
    pub fn select_anchor(&self, state: &VehicleState) -> (Pose, InitMode) {
        let path = &state.prev_path_m_map;

        if path.len() < 2 {
            return (state.pose, InitMode::ColdStart);
        }

        let last = path[path.len() - 1];
        let second_last = path[path.len() - 2];
        let diff = last - second_last;

        let heading_rad = if diff.norm_squared() > std::f64::EPSILON {
            diff[1].atan2(diff[0])
        } else {
            warn!(
                "Last two leftover points coincide at ({:.3}, {:.3}), using the vehicle heading",
                last[0], last[1]
            );
            state.pose.heading_rad
        };

        (
            Pose {
                position_m_map: last,
                heading_rad,
            },
            InitMode::Continue,
        )
    }

    /// Compute the vehicle's Frenet position and how well it converts back.
    fn frenet_diagnostics(&mut self, state: &VehicleState) {
        let pos = state.pose.position_m_map;

        let frenet = match frame::to_frenet(&pos, state.pose.heading_rad, &self.map) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not compute the vehicle's Frenet position: {}", e);
                return;
            }
        };

        self.report.veh_s_m = frenet.s_m;
        self.report.veh_d_m = frenet.d_m;

        match frame::to_cartesian_clamped(frenet.s_m, frenet.d_m, &self.map) {
            Ok(p) => self.report.frenet_residual_m = (p - pos).norm(),
            Err(e) => warn!("Could not convert the vehicle's Frenet position back: {}", e),
        }

        match state.reported_frenet {
            Some(reported) => debug!(
                "Vehicle Frenet s = {:.3} m, d = {:.3} m (reported s = {:.3} m, d = {:.3} m)",
                frenet.s_m, frenet.d_m, reported.s_m, reported.d_m
            ),
            None => debug!(
                "Vehicle Frenet s = {:.3} m, d = {:.3} m",
                frenet.s_m, frenet.d_m
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::Waypoint;
    use approx::assert_abs_diff_eq;

    fn straight_map(num_points: usize) -> Arc<WaypointMap> {
        let wps = (0..num_points)
            .map(|i| Waypoint::new(10.0 * i as f64, 0.0, 10.0 * i as f64, 0.0, 1.0))
            .collect();
        Arc::new(WaypointMap::new(wps, 10.0 * num_points as f64).unwrap())
    }

    fn telemetry_json(prev_x: &str, prev_y: &str) -> String {
        format!(
            r#"{{"x":10.0,"y":6.0,"s":10.0,"d":6.0,"yaw":90.0,"speed":12.5,
                "previous_path_x":{},"previous_path_y":{},
                "end_path_s":0.0,"end_path_d":0.0,"sensor_fusion":[]}}"#,
            prev_x, prev_y
        )
    }

    #[test]
    fn test_state_from_telemetry() {
        let telem: Telemetry =
            serde_json::from_str(&telemetry_json("[1.0, 2.0]", "[3.0, 4.0]")).unwrap();
        let state = VehicleState::from_telemetry(&telem).unwrap();

        assert_abs_diff_eq!(
            state.pose.heading_rad,
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
        assert_eq!(state.prev_path_m_map.len(), 2);
        assert_eq!(state.prev_path_m_map[1], Vector2::new(2.0, 4.0));
        assert_eq!(state.reported_frenet.unwrap().d_m, 6.0);

        let telem: Telemetry =
            serde_json::from_str(&telemetry_json("[1.0, 2.0]", "[3.0]")).unwrap();
        assert!(matches!(
            VehicleState::from_telemetry(&telem),
            Err(TelemetryError::PathLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_select_anchor() {
        let traj_gen = TrajGen::new(TrajGenParams::default(), straight_map(40)).unwrap();

        let mut state = VehicleState {
            pose: Pose::new(3.0, 4.0, 0.5),
            ..Default::default()
        };

        // No leftover, or a single leftover point, anchors on the vehicle
        assert_eq!(
            traj_gen.select_anchor(&state),
            (state.pose, InitMode::ColdStart)
        );
        state.prev_path_m_map = vec![Vector2::new(10.0, 6.0)];
        assert_eq!(traj_gen.select_anchor(&state).1, InitMode::ColdStart);

        // Bearing between the last two
        state.prev_path_m_map = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 6.0),
            Vector2::new(10.0, 7.0),
        ];
        let (anchor, mode) = traj_gen.select_anchor(&state);
        assert_eq!(mode, InitMode::Continue);
        assert_eq!(anchor.position_m_map, Vector2::new(10.0, 7.0));
        assert_abs_diff_eq!(anchor.heading_rad, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);

        // Coincident points keep the vehicle heading
        state.prev_path_m_map = vec![Vector2::new(10.0, 6.0), Vector2::new(10.0, 6.0)];
        let (anchor, mode) = traj_gen.select_anchor(&state);
        assert_eq!(mode, InitMode::Continue);
        assert_eq!(anchor.heading_rad, 0.5);
    }

    #[test]
    fn test_proc_on_long_straight() {
        let mut traj_gen = TrajGen::new(TrajGenParams::default(), straight_map(40)).unwrap();
        let state = VehicleState {
            pose: Pose::new(101.0, 6.0, 0.0),
            ..Default::default()
        };

        let (traj, report) = traj_gen.proc(&state).unwrap();

        assert_eq!(traj.len(), 50);
        assert_eq!(report.num_points, 50);
        assert_eq!(report.init_mode, InitMode::ColdStart);
        assert!(!report.degenerate_window);
        assert!(!report.lateral_out_of_domain);
        assert!(!report.cycle_failed);
        assert_eq!(report.next_waypoint, 11);

        for w in traj.points_m_map.windows(2) {
            assert!(w[1][0] > w[0][0]);
        }
        for p in traj.points_m_map.iter() {
            assert_abs_diff_eq!(p[1], 6.0, epsilon = 1e-9);
        }

        // Frenet diagnostics: 6 m left of a +X centreline with the interior reference above it
        // puts the vehicle on the interior side
        assert_abs_diff_eq!(report.veh_s_m, 101.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.veh_d_m, -6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_proc_outside_lateral_domain() {
        // Two waypoints ahead only, the first steps fall behind the window
        let params = TrajGenParams {
            window_back: 0,
            window_forward: 2,
            ..Default::default()
        };
        let mut traj_gen = TrajGen::new(params, straight_map(40)).unwrap();
        let state = VehicleState {
            pose: Pose::new(101.0, 6.0, 0.0),
            ..Default::default()
        };

        let (traj, report) = traj_gen.proc(&state).unwrap();

        assert!(report.lateral_out_of_domain);
        assert!(!report.degenerate_window);
        assert_eq!(traj.len(), 50);
        assert_eq!(report.num_points, 50);

        for p in traj.points_m_map.iter() {
            assert!(p[0].is_finite() && p[1].is_finite());
            assert_abs_diff_eq!(p[1], 6.0, epsilon = 1e-9);
        }
        for w in traj.points_m_map.windows(2) {
            assert!(w[1][0] > w[0][0]);
        }
    }

    #[test]
    fn test_proc_or_fallback() {
        let mut traj_gen = TrajGen::new(TrajGenParams::default(), straight_map(40)).unwrap();

        let mut state = VehicleState {
            pose: Pose::new(101.0, 6.0, 0.0),
            ..Default::default()
        };
        let (traj, report) = traj_gen.proc_or_fallback(&state);
        assert_eq!(traj.len(), 50);
        assert!(!report.cycle_failed);

        // A failed cycle reissues the leftover and still produces a report
        state.pose = Pose::new(std::f64::NAN, 6.0, 0.0);
        state.prev_path_m_map = vec![Vector2::new(102.0, 6.0), Vector2::new(103.0, 6.0)];
        let (traj, report) = traj_gen.proc_or_fallback(&state);
        assert_eq!(traj.points_m_map, state.prev_path_m_map);
        assert!(report.cycle_failed);
        assert_eq!(report.num_points, 2);
    }

    #[test]
    fn test_fallback_trajectory() {
        let mut state = VehicleState::default();
        assert!(TrajGen::fallback_trajectory(&state).is_empty());

        state.prev_path_m_map = vec![Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0)];
        let traj = TrajGen::fallback_trajectory(&state);
        assert_eq!(traj.points_m_map, state.prev_path_m_map);
        assert_eq!(traj.to_control().next_y, vec![2.0, 4.0]);
    }

    #[test]
    fn test_non_finite_state() {
        let mut traj_gen = TrajGen::new(TrajGenParams::default(), straight_map(40)).unwrap();
        let state = VehicleState {
            pose: Pose::new(std::f64::NAN, 6.0, 0.0),
            ..Default::default()
        };
        assert!(matches!(
            traj_gen.proc(&state),
            Err(TrajGenError::NonFiniteState(_))
        ));
    }
}
