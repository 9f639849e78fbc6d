//! Main planner executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the waypoint map
//!     - Main loop, once per simulator frame:
//!         - Decode the frame
//!         - Trajectory generation
//!         - Reply to the simulator
//!         - Archive the status report
//!
//! Frames are read one per line from stdin and replies are written one per line to stdout. All
//! logging goes to stderr and the session log file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::{
    io::{self, BufRead, Write},
    sync::Arc,
    time::Instant,
};

// Internal
use comms_if::sim::{parse_frame, Control, SimEvent, MANUAL_FRAME};
use planner_lib::{
    params::PlannerExecParams,
    traj_gen::{TrajGen, VehicleState},
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("planner_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Lane Planner Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: PlannerExecParams =
        util::params::load("planner_exec.toml").wrap_err("Could not load planner params")?;

    info!("Exec parameters loaded");
    debug!("{:#?}", params);

    // ---- LOAD MAP ----

    let sw_root = host::get_sw_root().wrap_err("Could not get the software root")?;

    let map = params
        .map
        .load_map(&sw_root)
        .wrap_err_with(|| format!("Failed to load the waypoint map \"{}\"", params.map.file))?;

    info!(
        "Loaded {} waypoints, track length {} m",
        map.len(),
        map.max_s_m()
    );

    // ---- INITIALISE MODULES ----

    let mut traj_gen = TrajGen::new(params.traj_gen.clone(), Arc::new(map))
        .wrap_err("Failed to initialise TrajGen")?;

    let mut status_archiver = Archiver::from_path(&session, "traj_gen/status_report.csv")
        .wrap_err("Failed to initialise the status report archive")?;

    let cycle_budget_s = params.traj_gen.cycle_budget_s();

    info!("Initialisation complete, waiting for frames\n");

    // ---- MAIN LOOP ----

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut num_cycles: u64 = 0;

    for line in stdin.lock().lines() {
        let line = line.wrap_err("Failed to read a frame from stdin")?;

        let cycle_start_instant = Instant::now();

        let reply = match parse_frame(&line) {
            Ok(SimEvent::Telemetry(telem)) => {
                num_cycles += 1;

                match VehicleState::from_telemetry(&telem) {
                    Ok(state) => {
                        let (traj, report) = traj_gen.proc_or_fallback(&state);

                        if let Err(e) = status_archiver.serialise(report) {
                            warn!("Could not archive the status report: {}", e);
                        }

                        Some(traj.to_control())
                    }
                    Err(e) => {
                        warn!("Rejected telemetry: {}", e);
                        Some(Control::default())
                    }
                }
            }
            Ok(SimEvent::NoData) => {
                debug!("Frame without data, switching the simulator to manual");
                writeln!(out, "{}", MANUAL_FRAME).wrap_err("Failed to write to stdout")?;
                None
            }
            Ok(SimEvent::Other(event)) => {
                debug!("Ignoring \"{}\" event", event);
                None
            }
            Ok(SimEvent::Ignored) => None,
            Err(e) => {
                warn!("Could not decode frame: {}", e);
                Some(Control::default())
            }
        };

        if let Some(control) = reply {
            match control.to_frame() {
                Ok(frame) => writeln!(out, "{}", frame).wrap_err("Failed to write to stdout")?,
                Err(e) => error!("Could not serialise the control message: {}", e),
            }
        }

        out.flush().wrap_err("Failed to flush stdout")?;

        // Soft deadline of one tick, the rate at which the simulator asks for new trajectories
        let cycle_dur_s = cycle_start_instant.elapsed().as_secs_f64();
        if cycle_dur_s > cycle_budget_s {
            warn!(
                "Cycle overran: took {:.3} s, budget is {:.3} s",
                cycle_dur_s, cycle_budget_s
            );
        }
    }

    info!("End of input after {} planning cycles", num_cycles);

    Ok(())
}
