//! # Motion Subsystem Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A three component vector used within [`Twist`].
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A six degree of freedom velocity command sent to the motion subsystem.
///
/// Only `linear.x` (forward speed) and `angular.z` (turn rate, right hand rule about the robot's
/// upwards axis, so positive turns left) are ever driven by the seek controller. The remaining
/// four components exist for wire compatibility with the full 6-DOF command shape consumed by the
/// differential drive and must always be zero.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Twist {
    /// Linear velocity demand, `x` forwards.
    pub linear: Vector3,

    /// Angular velocity demand, `z` about the upwards axis.
    pub angular: Vector3,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Twist {
    /// An all-zero command, demanding that the robot stop.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a command from a forward speed and a turn rate, all other components zero.
    pub fn from_speed_turn(speed: f64, turn: f64) -> Self {
        Self {
            linear: Vector3 {
                x: speed,
                y: 0.0,
                z: 0.0,
            },
            angular: Vector3 {
                x: 0.0,
                y: 0.0,
                z: turn,
            },
        }
    }
}
