//! Main seek executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Start the command publish thread
//!     - Main loop:
//!         - Frame acquisition (freshest frame only, backlog dropped)
//!         - Seek processing (one SeekMgr cycle per frame)
//!         - Command latching
//!         - Telemetry
//!
//! The command publish thread emits the latched command on its own fixed period. It shares
//! nothing with the main loop but the latch itself, so a slow or failed detection cycle never
//! delays or drops a publish tick - the motion subsystem just keeps being told the last good
//! command.
//!
//! # Modules
//!
//! All cyclic modules (currently only `seek_mgr`) shall provide a public struct implementing the
//! `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::NetParams;
use seek_lib::{
    cam_client::CamClient,
    cmd_server::{CmdLatch, CmdServer},
    data_store::DataStore,
    params::SeekExecParams,
    seek_mgr::InputData,
    tm_server::TmServer,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("seek_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Vulcan Seek Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: SeekExecParams =
        util::params::load("seek_exec.toml").wrap_err("Could not load exec params")?;

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.seek_mgr
        .init("seek_mgr.toml", &session)
        .wrap_err("Failed to initialise SeekMgr")?;
    info!("SeekMgr init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut cam_client = {
        let c = CamClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise CamClient")?;
        info!("CamClient initialised");
        c
    };

    let cmd_server = {
        let s = CmdServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise CmdServer")?;
        info!("CmdServer initialised");
        s
    };

    let mut tm_server = {
        let s = TmServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise TmServer")?;
        info!("TmServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- START COMMAND PUBLISHING ----

    let cmd_latch = CmdLatch::new();

    // The handle is kept but never joined, the thread runs until the process exits
    let _cmd_publish_handle =
        cmd_server.start(cmd_latch.clone(), exec_params.cmd_publish_period_s);

    info!(
        "Command publishing started, period {} s\n",
        exec_params.cmd_publish_period_s
    );

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz);

        // ---- FRAME ACQUISITION ----

        match cam_client.recieve_frame() {
            Ok(Some(image)) => {
                ds.seek_mgr_input = Some(InputData { image });
                ds.num_consec_frame_errors = 0;
            }
            Ok(None) => (),
            Err(e) => {
                ds.num_consec_frame_errors += 1;
                warn!("Could not get frame from the camera: {}", e);
            }
        }

        // ---- SEEK PROCESSING ----

        // One detection cycle per recieved frame. A failed cycle holds the previously latched
        // command rather than stopping the robot or crashing.
        if let Some(ref input) = ds.seek_mgr_input {
            match ds.seek_mgr.proc(input) {
                Ok((output, report)) => {
                    ds.seek_mgr_output = output;
                    ds.seek_mgr_status_rpt = report;

                    // Latch the new command for the publish thread
                    cmd_latch.set(output);
                }
                Err(e) => warn!("Error during SeekMgr processing: {}", e),
            }

            // ---- TELEMETRY ----

            match tm_server.send(&ds) {
                Ok(_) => (),
                Err(e) => warn!("TmServer error: {}", e),
            };
        }

        // Periodic status line
        if ds.is_1_hz_cycle {
            info!(
                "[{:?}] speed: {:.2} m/s, turn: {:.2} rad/s",
                ds.seek_mgr_status_rpt.mode,
                ds.seek_mgr_output.linear.x,
                ds.seek_mgr_output.angular.z
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}
