//! # Camera Client
//!
//! The camera client subscribes to the frame stream published by the camera (or the camera
//! simulator) and hands the freshest frame to the detection path.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use comms_if::{
    eqpt::cam::{CamError, NavFrame, NavImage},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The camera client
pub struct CamClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CamClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the camera server")]
    NotConnected,

    #[error("Could not recieve a message from the camera server: {0}")]
    RecvError(zmq::Error),

    #[error("Could not deserialize the recieved frame: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The recieved frame could not be decoded: {0}")]
    FrameDecodeError(CamError),

    #[error("The camera server sent a message which was not valid UTF-8")]
    NonUtf8Message,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamClient {
    /// Create a new instance of the camera client.
    ///
    /// Blocks until the camera server is reachable - the rover cannot do anything useful without
    /// its frame stream.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CamClientError> {
        // Create the socket options
        let socket_options = SocketOptions {
            subscribe: Some(vec![]),
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.cam_endpoint)
            .map_err(CamClientError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Recieve the most recent frame published by the camera, or `None` if no new frame has
    /// arrived since the last call.
    ///
    /// Any backlog which built up while the previous detection cycle was running is drained and
    /// dropped - the controller is purely reactive, so only the freshest frame is decoded.
    pub fn recieve_frame(&mut self) -> Result<Option<NavImage>, CamClientError> {
        // If not connected return an error
        if !self.socket.connected() {
            return Err(CamClientError::NotConnected);
        }

        // Drain the queue, keeping only the newest message
        let mut latest: Option<String> = None;

        loop {
            match self.socket.recv_string(zmq::DONTWAIT) {
                Ok(Ok(s)) => latest = Some(s),
                Ok(Err(_)) => return Err(CamClientError::NonUtf8Message),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => return Err(CamClientError::RecvError(e)),
            }
        }

        let frame_str = match latest {
            Some(s) => s,
            None => return Ok(None),
        };

        // Deserialize the frame and decode it into an image
        let frame: NavFrame =
            serde_json::from_str(&frame_str).map_err(CamClientError::DeserializeError)?;

        match NavImage::try_from(frame) {
            Ok(image) => Ok(Some(image)),
            Err(e) => Err(CamClientError::FrameDecodeError(e)),
        }
    }
}
