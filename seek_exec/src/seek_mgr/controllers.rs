//! # Seek controllers module
//!
//! This module provides the proportional controllers used by SeekMgr to convert detected target
//! geometry into speed and turn demands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::params::{PCtrlParams, SeekMgrParams};
use super::SeekMgrError;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A proportional controller with a saturated output.
///
/// Deliberately proportional-only: there is no integral or derivative memory, so the output
/// depends on nothing but the current measurement. This accepts a steady-state offset in
/// exchange for simplicity and freedom from integral windup.
#[derive(Debug, Serialize, Clone, Default)]
pub struct PCtrl {
    /// Proportional gain
    k_p: f64,

    /// Target value of the measured quantity
    setpoint: f64,

    /// Lowest output the controller may demand
    min_output: f64,

    /// Highest output the controller may demand
    max_output: f64,
}

/// The seek controllers
#[derive(Debug, Serialize, Clone, Default)]
pub struct SeekControllers {
    /// Approach speed controller, driven by the pixel distance to the target
    pub vel_ctrl: PCtrl,

    /// Heading controller, driven by the angle between the robot's forward vector and the target
    pub ang_ctrl: PCtrl,

    /// Orbit standoff controller, driven by the pixel distance to the target while circling. Its
    /// setpoint is the standoff distance.
    pub orbit_ctrl: PCtrl,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PCtrl {
    /// Create a new controller from the given parameters.
    ///
    /// An inverted clamp range (`min_output > max_output`) is a configuration error and is
    /// rejected here, at init, rather than surfacing as nonsense demands mid-run.
    pub fn new(name: &'static str, params: &PCtrlParams) -> Result<Self, SeekMgrError> {
        if params.min_output > params.max_output {
            return Err(SeekMgrError::InvalidClampRange {
                name,
                min: params.min_output,
                max: params.max_output,
            });
        }

        Ok(Self {
            k_p: params.k_p,
            setpoint: params.setpoint,
            min_output: params.min_output,
            max_output: params.max_output,
        })
    }

    /// Get the value of the controller for the given measurement.
    ///
    /// The error convention is `setpoint - measured`: with a positive gain a measurement above
    /// the setpoint produces a negative demand. The output is recomputed fresh from the current
    /// measurement alone and clamped into the configured range.
    pub fn get(&self, measured: f64) -> f64 {
        let out = self.k_p * (self.setpoint - measured);

        clamp(&out, &self.min_output, &self.max_output)
    }
}

impl SeekControllers {
    /// Create a new instance of the controllers from the parameters
    pub fn new(params: &SeekMgrParams) -> Result<Self, SeekMgrError> {
        Ok(Self {
            vel_ctrl: PCtrl::new("vel_ctrl", &params.vel_ctrl)?,
            ang_ctrl: PCtrl::new("ang_ctrl", &params.ang_ctrl)?,
            orbit_ctrl: PCtrl::new("orbit_ctrl", &params.orbit_ctrl)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctrl(k_p: f64, setpoint: f64, min: f64, max: f64) -> PCtrl {
        PCtrl::new(
            "test",
            &PCtrlParams {
                k_p,
                setpoint,
                min_output: min,
                max_output: max,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_output_always_within_clamp_range() {
        let ranges = [(-0.5, 0.5), (-1.0, 1.0), (0.0, 0.25), (-2.0, -1.0)];
        let inputs = [-1e6, -500.0, -0.05, 0.0, 0.05, 100.0, 500.0, 1e6];

        for &(min, max) in ranges.iter() {
            for &gain in [-0.01, 0.02, 0.1, 10.0].iter() {
                let ctrl = ctrl(gain, 100.0, min, max);

                for &input in inputs.iter() {
                    let out = ctrl.get(input);
                    assert!(
                        out >= min && out <= max,
                        "output {} outside [{}, {}] for input {}",
                        out,
                        min,
                        max,
                        input
                    );
                }
            }
        }
    }

    #[test]
    fn test_velocity_loop_demands() {
        // The approach speed loop: negative gain, setpoint at the standoff distance
        let vel = ctrl(-0.01, 100.0, -0.5, 0.5);

        // At the setpoint no demand
        assert_eq!(vel.get(100.0), 0.0);

        // Beyond the setpoint the demand is forwards, saturating as distance grows
        assert!((vel.get(150.0) - 0.5).abs() < 1e-12);
        assert_eq!(vel.get(500.0), 0.5);

        // Inside the setpoint the demand is backwards
        assert_eq!(vel.get(50.0), -0.5);
    }

    #[test]
    fn test_angular_loop_demands() {
        let ang = ctrl(0.02, 0.0, -1.0, 1.0);

        // Aligned with the target, no turn
        assert_eq!(ang.get(0.0), 0.0);

        // The degenerate 90 degree angle from a lost target saturates the demand
        assert_eq!(ang.get(90.0), -1.0);

        // A target slightly left of forward turns gently left
        assert!((ang.get(-10.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_clamp_range_rejected() {
        let result = PCtrl::new(
            "vel_ctrl",
            &PCtrlParams {
                k_p: -0.01,
                setpoint: 100.0,
                min_output: 0.5,
                max_output: -0.5,
            },
        );

        assert!(matches!(
            result,
            Err(SeekMgrError::InvalidClampRange { name: "vel_ctrl", .. })
        ));
    }
}
