//! # Trajectory generation scenarios
//!
//! End to end planning cycles on small synthetic tracks.

use std::{f64::consts::TAU, sync::Arc};

use approx::assert_abs_diff_eq;
use nalgebra::Vector2;

use planner_lib::{
    frame::Pose,
    map::{Waypoint, WaypointMap},
    traj_gen::{InitMode, SpeedProfile, TrajGen, TrajGenParams, VehicleState},
};

// ---------------------------------------------------------------------------
// HELPERS
// ---------------------------------------------------------------------------

/// 10 waypoints 10 m apart along the X axis, normals pointing +Y.
fn straight_ten_map() -> Arc<WaypointMap> {
    let wps = (0..10)
        .map(|i| Waypoint::new(10.0 * i as f64, 0.0, 10.0 * i as f64, 0.0, 1.0))
        .collect();

    Arc::new(WaypointMap::new(wps, 100.0).unwrap())
}

/// Anticlockwise circular track about the origin, starting at the bottom so the first waypoint
/// heads along +X. Normals point outwards.
fn circle_map(radius_m: f64, num_points: usize) -> Arc<WaypointMap> {
    let chord_m = 2.0 * radius_m * (TAU / (2.0 * num_points as f64)).sin();

    let wps = (0..num_points)
        .map(|i| {
            let theta = -TAU / 4.0 + TAU * i as f64 / num_points as f64;
            Waypoint::new(
                radius_m * theta.cos(),
                radius_m * theta.sin(),
                chord_m * i as f64,
                theta.cos(),
                theta.sin(),
            )
        })
        .collect();

    Arc::new(
        WaypointMap::new(wps, chord_m * num_points as f64)
            .unwrap()
            .with_interior_ref(Vector2::new(0.0, 0.0)),
    )
}

fn first_step_m() -> f64 {
    let params = TrajGenParams::default();
    SpeedProfile::new(&params.speed, params.tick_s)
        .unwrap()
        .dist_inc_m(0)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[test]
fn test_straight_track_cold_start() {
    let mut traj_gen = TrajGen::new(TrajGenParams::default(), straight_ten_map()).unwrap();

    let state = VehicleState {
        pose: Pose::new(0.0, 0.0, 0.0),
        ..Default::default()
    };

    let (traj, report) = traj_gen.proc(&state).unwrap();

    assert_eq!(traj.len(), 50);
    assert_eq!(report.init_mode, InitMode::ColdStart);

    // The 25 point window wraps around the 10 point map so it is fitted with a straight line
    assert!(report.degenerate_window);

    for p in traj.points_m_map.iter() {
        assert_abs_diff_eq!(p[1], 6.0, epsilon = 1e-6);
    }
    for w in traj.points_m_map.windows(2) {
        assert!(w[1][0] > w[0][0]);
    }

    assert_abs_diff_eq!(traj.points_m_map[0][0], first_step_m(), epsilon = 1e-9);

    let control = traj.to_control();
    assert_eq!(control.next_x.len(), 50);
    assert_eq!(control.next_y.len(), 50);
}

#[test]
fn test_straight_track_continuation() {
    let mut traj_gen = TrajGen::new(TrajGenParams::default(), straight_ten_map()).unwrap();

    let state = VehicleState {
        pose: Pose::new(9.0, 6.0, 0.0),
        prev_path_m_map: vec![Vector2::new(10.0, 6.0), Vector2::new(11.0, 6.0)],
        ..Default::default()
    };

    let (traj, report) = traj_gen.proc(&state).unwrap();

    assert_eq!(report.init_mode, InitMode::Continue);
    assert_eq!(report.anchor_heading_rad, 0.0);
    assert_eq!(report.anchor_x_m, 11.0);
    assert_eq!(report.anchor_y_m, 6.0);

    assert_eq!(traj.len(), 50);
    assert_abs_diff_eq!(traj.points_m_map[0][0], 11.0 + first_step_m(), epsilon = 1e-9);
    for p in traj.points_m_map.iter() {
        assert_abs_diff_eq!(p[1], 6.0, epsilon = 1e-6);
    }
}

#[test]
fn test_circular_track_wraps() {
    let radius_m = 500.0;
    let num_points = 180;
    let map = circle_map(radius_m, num_points);
    let mut traj_gen = TrajGen::new(TrajGenParams::default(), map.clone()).unwrap();

    // Just before the end of the track, on the lane, heading anticlockwise
    let theta = -TAU / 4.0 - 0.5 * TAU / num_points as f64;
    let state = VehicleState {
        pose: Pose::new(506.0 * theta.cos(), 506.0 * theta.sin(), theta + TAU / 4.0),
        ..Default::default()
    };

    let (traj, report) = traj_gen.proc(&state).unwrap();

    assert_eq!(report.init_mode, InitMode::ColdStart);
    assert_eq!(report.next_waypoint, 0);
    assert!(!report.degenerate_window);
    assert!(!report.lateral_out_of_domain);
    assert!(report.veh_s_m >= 0.0 && report.veh_s_m < map.max_s_m());
    assert_abs_diff_eq!(report.veh_d_m, 6.0, epsilon = 0.1);
    assert_eq!(traj.len(), 50);

    for p in traj.points_m_map.iter() {
        assert_abs_diff_eq!(p.norm(), 506.0, epsilon = 0.01);
    }

    // Vehicle consumes five points, the rest are returned as leftover
    let consumed = 5;
    let pose_dir = traj.points_m_map[consumed - 1] - traj.points_m_map[consumed - 2];
    let state = VehicleState {
        pose: Pose {
            position_m_map: traj.points_m_map[consumed - 1],
            heading_rad: pose_dir[1].atan2(pose_dir[0]),
        },
        prev_path_m_map: traj.points_m_map[consumed..].to_vec(),
        ..Default::default()
    };

    let (next_traj, report) = traj_gen.proc(&state).unwrap();

    assert_eq!(report.init_mode, InitMode::Continue);
    assert_eq!(next_traj.len(), 50);

    // Carries on from the end of the leftover
    let last = traj.points_m_map[traj.len() - 1];
    let gap_m = (next_traj.points_m_map[0] - last).norm();
    assert!(gap_m > 0.0 && gap_m < 2.0 * first_step_m());

    for p in next_traj.points_m_map.iter() {
        assert_abs_diff_eq!(p.norm(), 506.0, epsilon = 0.01);
    }
}
