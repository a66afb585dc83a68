//! # Velocity Command Server
//!
//! The command server publishes the most recently latched velocity command to the motion
//! subsystem on a fixed period, independently of the detection path. The two paths share nothing
//! but the [`CmdLatch`]: detection replaces the whole command under the latch's lock, the publish
//! thread reads a copy under the same lock, so no half-written command is ever observable and
//! neither path waits on the other.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use comms_if::{
    eqpt::motion::Twist,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Shared latch holding the most recently computed velocity command.
///
/// Cheap to clone - clones share the same underlying command.
#[derive(Clone)]
pub struct CmdLatch(Arc<Mutex<Twist>>);

/// Velocity command server
pub struct CmdServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdLatch {
    /// Create a new latch holding an all-zero (stop) command, so that the publish path has
    /// something safe to emit before the first detection cycle completes.
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Twist::zero())))
    }

    /// Latch a new command, replacing the previous one in a single step.
    pub fn set(&self, cmd: Twist) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = cmd;
    }

    /// Get a copy of the latched command.
    pub fn get(&self) -> Twist {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdServerError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.cmd_vel_endpoint)
            .map_err(CmdServerError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Publish the given command.
    pub fn send(&mut self, cmd: &Twist) -> Result<(), CmdServerError> {
        // Serialize the command
        let cmd_str = serde_json::to_string(cmd).map_err(CmdServerError::SerializationError)?;

        // Send it
        self.socket
            .send(&cmd_str, 0)
            .map_err(CmdServerError::SendError)
    }

    /// Start the fixed-period publish thread, consuming the server.
    ///
    /// Every `period_s` seconds the thread publishes whatever command is currently latched. It
    /// never skips a tick and never waits for a new detection cycle - if detection stalls the
    /// last command simply keeps being repeated. The thread runs until the process exits.
    pub fn start(mut self, latch: CmdLatch, period_s: f64) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let period = Duration::from_secs_f64(period_s);

            loop {
                let tick_start = Instant::now();

                let cmd = latch.get();

                if let Err(e) = self.send(&cmd) {
                    warn!("Could not publish velocity command: {}", e);
                }

                // Hold the period even if the send ran long
                match period.checked_sub(tick_start.elapsed()) {
                    Some(remaining) => thread::sleep(remaining),
                    None => warn!("Command publish tick overran"),
                }
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_latch_round_trip() {
        let latch = CmdLatch::new();

        assert_eq!(latch.get(), Twist::zero());

        let cmd = Twist::from_speed_turn(0.25, -0.8);
        latch.set(cmd);

        // All clones observe the full replacement
        let clone = latch.clone();
        assert_eq!(clone.get(), cmd);
    }
}
