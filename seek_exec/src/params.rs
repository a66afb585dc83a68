//! # Seek Executable Parameters
//!
//! This module provide parameters for the seek executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SeekExecParams {
    /// Target period of one main loop cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Period of the velocity command publish tick.
    ///
    /// The orbit entry turn is open loop and counted in publish ticks, so changing this changes
    /// how far the robot turns when settling into an orbit.
    ///
    /// Units: seconds
    pub cmd_publish_period_s: f64,
}
