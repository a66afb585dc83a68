//! Parameters structure for SeekMgr

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::fire_detect;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the seek manager and all of its modes.
#[derive(Debug, Clone, Deserialize)]
pub struct SeekMgrParams {
    // ---- SEARCH ----
    /// Distance to the target above which the robot keeps approaching rather than settling into
    /// an orbit.
    ///
    /// Units: pixels
    pub detection_threshold_px: f64,

    // ---- CIRCLE ----
    /// Distance to the target above which an orbit is abandoned and search resumed.
    ///
    /// Units: pixels
    pub orbit_exit_distance_px: f64,

    /// Distance substituted when the target is lost while orbiting.
    ///
    /// Deliberately "far" (beyond the orbit exit distance) so a lost target forces the robot back
    /// to search, unlike the at-centre fallback used while searching.
    ///
    /// Units: pixels
    pub lost_target_dist_px: f64,

    /// Number of publish ticks spent turning on the spot when entering an orbit.
    pub turn_ticks: u32,

    /// Maximum number of ticks a single orbit may last before search is forced, so the target is
    /// periodically re-acquired.
    pub max_orbit_ticks: u32,

    // ---- CONTROLLERS ----
    /// Approach speed controller (target distance to forward speed).
    pub vel_ctrl: PCtrlParams,

    /// Heading controller (heading error to turn rate).
    pub ang_ctrl: PCtrlParams,

    /// Orbit standoff controller (target distance to turn rate). Its setpoint is the orbit
    /// standoff distance.
    pub orbit_ctrl: PCtrlParams,

    // ---- DETECTION ----
    /// Fire detection parameters.
    pub fire_detect: fire_detect::Params,
}

/// Parameters for a single proportional controller.
#[derive(Debug, Clone, Deserialize)]
pub struct PCtrlParams {
    /// Proportional gain
    pub k_p: f64,

    /// Target value of the measured quantity
    pub setpoint: f64,

    /// Lowest output the controller may demand
    pub min_output: f64,

    /// Highest output the controller may demand
    pub max_output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SeekMgrParams {
    fn default() -> Self {
        Self {
            detection_threshold_px: 100.0,
            orbit_exit_distance_px: 200.0,
            lost_target_dist_px: 500.0,
            turn_ticks: 5,
            max_orbit_ticks: 100,
            vel_ctrl: PCtrlParams {
                k_p: -0.01,
                setpoint: 100.0,
                min_output: -0.5,
                max_output: 0.5,
            },
            ang_ctrl: PCtrlParams {
                k_p: 0.02,
                setpoint: 0.0,
                min_output: -1.0,
                max_output: 1.0,
            },
            orbit_ctrl: PCtrlParams {
                k_p: 0.1,
                setpoint: 100.0,
                min_output: -0.5,
                max_output: 0.5,
            },
            fire_detect: fire_detect::Params::default(),
        }
    }
}
