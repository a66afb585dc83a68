//! # Camera Simulator Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CamSimParams {
    /// Period between published frames.
    ///
    /// Units: seconds
    pub frame_period_s: f64,

    /// Width of the published frames.
    ///
    /// Units: pixels
    pub frame_width: u32,

    /// Height of the published frames.
    ///
    /// Units: pixels
    pub frame_height: u32,

    /// Radius of the fire blob.
    ///
    /// Units: pixels
    pub blob_radius_px: f64,

    /// Rate at which the blob circles the frame centre.
    ///
    /// Units: radians/second
    pub blob_orbit_rate_rads: f64,

    /// Mean distance of the blob from the frame centre.
    ///
    /// Units: pixels
    pub blob_orbit_radius_px: f64,

    /// Amplitude of the slow radial oscillation. Large enough values take the blob out of frame
    /// entirely, exercising the lost-target behaviour downstream.
    ///
    /// Units: pixels
    pub blob_radial_amplitude_px: f64,

    /// Rate of the radial oscillation.
    ///
    /// Units: radians/second
    pub blob_radial_rate_rads: f64,

    /// Background colour of the scene as `[r, g, b]`.
    pub background_rgb: [u8; 3],
}
