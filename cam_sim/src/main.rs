//! # Camera Simulator Executable
//!
//! This executable publishes synthetic nav camera frames containing a moving fire-coloured blob.
//! It stands in for the real camera feed so the full seek loop can be run end to end on a desk:
//! point `seek_exec` at the same `cam_endpoint` and watch the commands it publishes.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod params;
mod scene;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use chrono::Utc;
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

use comms_if::{
    eqpt::cam::NavImage,
    net::{zmq, MonitoredSocket, NetParams, SocketOptions},
};
use params::CamSimParams;
use scene::Scene;
use util::{
    logger::{logger_init, LevelFilter},
    session::{self, Session},
};

// -----------------------------------------------------------------------------------------------
// MAIN
// -----------------------------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("cam_sim", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Vulcan Camera Simulator\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let sim_params: CamSimParams =
        util::params::load("cam_sim.toml").wrap_err("Could not load sim params")?;

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Parameters loaded");

    // ---- INIT FRAME SERVER ----

    let zmq_ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        block_on_first_connect: false,
        bind: true,
        linger: 1,
        send_timeout: 10,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&zmq_ctx, zmq::PUB, socket_options, &net_params.cam_endpoint)
        .wrap_err("Failed to initialise the frame socket")?;

    info!("Frame server initialised");

    // ---- INIT SCENE ----

    let scene = Scene::new(&sim_params);

    info!("Scene initialised");

    // ---- MAIN LOOP ----

    info!("Begining frame loop\n");

    let mut num_frames: u64 = 0;

    loop {
        // Get frame start time
        let frame_start_instant = Instant::now();

        // Render the scene at the current sim time
        let image = NavImage {
            timestamp: Utc::now(),
            image: scene.render(session::get_elapsed_seconds()),
        };

        // Serialise and publish the frame
        match serde_json::to_string(&image.to_frame()) {
            Ok(frame_str) => match socket.send(&frame_str, 0) {
                Ok(_) => {
                    num_frames += 1;

                    if num_frames % 100 == 0 {
                        info!("{} frames published", num_frames);
                    }
                }
                Err(e) => warn!("Could not publish frame: {}", e),
            },
            Err(e) => warn!("Could not serialise frame: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let frame_dur = Instant::now() - frame_start_instant;

        match Duration::from_secs_f64(sim_params.frame_period_s).checked_sub(frame_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Frame render overran by {:.06} s",
                frame_dur.as_secs_f64() - sim_params.frame_period_s
            ),
        }
    }
}
