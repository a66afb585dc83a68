//! # SeekMgr module
//!
//! This module implements the [`SeekMgr`] state machine, which is responsible for moving the
//! robot relative to the fire. The state machine is broken down into two modes:
//!
//! - `Search` - detect the fire, turn towards it, and approach until within the detection
//!   threshold.
//! - `Circle` - orbit the fire at the standoff distance, periodically breaking off to re-acquire
//!   it.
//!
//! The manager runs one cycle per incoming camera frame and produces the velocity command to
//! latch for the publish path. Detector "no target" results are not errors - each mode
//! substitutes its own fallback geometry - and there is no fatal path inside the loop: a cycle
//! that does fail (malformed frame) leaves the previous command latched.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod circle;
mod controllers;
mod params;
mod search;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::fmt::Display;
use std::time::Instant;

use log::info;
use nalgebra::Point2;
use serde::Serialize;

// Internal
pub use circle::Circle;
pub use controllers::{PCtrl, SeekControllers};
pub use params::{PCtrlParams, SeekMgrParams};
pub use search::Search;

use crate::fire_detect::{FireDetect, FireDetectError};
use comms_if::eqpt::{cam::NavImage, motion::Twist};
use util::{module::State, session::Session};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The robot's fixed forward vector in image coordinates ("up" the image).
pub const ROB_FORWARD_PX: [f64; 2] = [0.0, -100.0];

/// Turn demand magnitude below which the robot counts as aligned with the target.
pub const TURN_DEADBAND: f64 = 0.05;

/// Open-loop turn rate commanded while entering an orbit.
///
/// Units: radians/second
pub const TURN_IN_PLACE_RATE: f64 = 1.0;

/// Forward speed held while orbiting.
///
/// Units: meters/second
pub const ORBIT_SPEED: f64 = 0.1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Seek manager state machine.
#[derive(Default)]
pub struct SeekMgr {
    pub(crate) params: SeekMgrParams,

    ctrls: SeekControllers,

    detect: FireDetect,

    /// The currently active mode. Exactly one mode is active at any time.
    pub(crate) mode: SeekMode,

    /// The most recently computed command.
    output: Twist,
}

/// Input data to the seek manager: the frame to process this cycle.
pub struct InputData {
    pub image: NavImage,
}

/// Status report for SeekMgr processing.
#[derive(Clone, Debug, Serialize)]
pub struct StatusReport {
    /// Mode at the end of the cycle
    pub mode: SeekModeKind,

    /// Detected target pixel, if detection ran this cycle
    pub target_px: Option<[f64; 2]>,

    /// Distance from the reference point to the target (or the substituted fallback distance)
    pub target_dist_px: Option<f64>,

    /// Heading error to the target, if computed this cycle
    pub heading_err_deg: Option<f64>,

    /// Commanded forward speed
    pub speed_dem: f64,

    /// Commanded turn rate
    pub turn_dem: f64,

    /// Orbit tick counter, if in Circle mode this cycle
    pub circle_tick_count: Option<u32>,

    /// Wall time spent in this detection cycle, milliseconds
    pub proc_time_ms: f64,
}

/// Output of a mode's step function.
pub(crate) struct StepOutput {
    /// Command to latch this cycle
    pub cmd: Twist,

    /// Transition to perform after this step, if any
    pub transition: Option<Transition>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the seek manager.
#[derive(Debug, thiserror::Error)]
pub enum SeekMgrError {
    #[error("Failed to load SeekMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid clamp range for the {name} controller: min ({min}) is greater than max \
        ({max})")]
    InvalidClampRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Error in fire detection: {0}")]
    FireDetectError(FireDetectError),
}

/// The modes of the seek manager.
#[derive(Debug)]
pub enum SeekMode {
    Search(Search),
    Circle(Circle),
}

/// Discriminant of [`SeekMode`], used in status reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeekModeKind {
    Search,
    Circle,
}

/// Transitions that a mode can request at the end of its step function.
#[derive(Debug)]
pub(crate) enum Transition {
    ToSearch,
    ToCircle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SeekMgr {
    /// Build a manager from already-loaded parameters.
    ///
    /// Fails if any controller clamp range is inverted or the detection parameters are invalid.
    pub fn with_params(params: SeekMgrParams) -> Result<Self, SeekMgrError> {
        let ctrls = SeekControllers::new(&params)?;
        let detect = FireDetect::new(params.fire_detect.clone())
            .map_err(SeekMgrError::FireDetectError)?;

        Ok(Self {
            params,
            ctrls,
            detect,
            mode: SeekMode::default(),
            output: Twist::zero(),
        })
    }
}

impl State for SeekMgr {
    type InitData = &'static str;
    type InitError = SeekMgrError;

    type InputData = InputData;
    type OutputData = Twist;
    type StatusReport = StatusReport;
    type ProcError = SeekMgrError;

    /// Initialise the SeekMgr module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), SeekMgrError> {
        let params: SeekMgrParams =
            util::params::load(init_data).map_err(SeekMgrError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        Ok(())
    }

    /// Perform one detection cycle on the given frame.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let cycle_start = Instant::now();

        let mut report = StatusReport::default();

        // The reference point sits at the centre of the frame
        let image = &input_data.image.image;
        let ref_point = Point2::new(image.width() as f64 / 2.0, image.height() as f64 / 2.0);

        // Step the active mode
        let step = match self.mode {
            SeekMode::Search(ref mut search) => search.step(
                &self.params,
                &self.ctrls,
                &self.detect,
                image,
                &ref_point,
                &mut report,
            )?,
            SeekMode::Circle(ref mut circle) => circle.step(
                &self.params,
                &self.ctrls,
                &self.detect,
                image,
                &ref_point,
                &mut report,
            )?,
        };

        // Perform any transition requested by the mode. Modes are rebuilt on entry, so their
        // internal counters always start reset.
        if let Some(transition) = step.transition {
            self.mode = match transition {
                Transition::ToSearch => SeekMode::Search(Search::new()),
                Transition::ToCircle => SeekMode::Circle(Circle::new()),
            };

            info!("SeekMgr mode change to: {}", self.mode);
        }

        self.output = step.cmd;

        report.mode = self.mode.kind();
        report.proc_time_ms = cycle_start.elapsed().as_secs_f64() * 1000.0;

        Ok((self.output, report))
    }
}

impl SeekMode {
    pub fn kind(&self) -> SeekModeKind {
        match self {
            SeekMode::Search(_) => SeekModeKind::Search,
            SeekMode::Circle(_) => SeekModeKind::Circle,
        }
    }
}

impl Default for SeekMode {
    fn default() -> Self {
        SeekMode::Search(Search::new())
    }
}

impl Display for SeekMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeekMode::Search(_) => write!(f, "SeekMode::Search"),
            SeekMode::Circle(_) => write!(f, "SeekMode::Circle"),
        }
    }
}

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            mode: SeekModeKind::Search,
            target_px: None,
            target_dist_px: None,
            heading_err_deg: None,
            speed_dem: 0.0,
            turn_dem: 0.0,
            circle_tick_count: None,
            proc_time_ms: 0.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use image::{Rgb, RgbImage};

    /// A colour inside the default fire hue band
    const FIRE: Rgb<u8> = Rgb([255u8, 128, 0]);

    /// Build a 640x480 black frame, optionally with a 5x5 fire blob centred on the given pixel.
    ///
    /// The reference point of such a frame is (320, 240).
    fn frame_with_blob(blob: Option<(u32, u32)>) -> InputData {
        let mut image = RgbImage::new(640, 480);

        if let Some((cx, cy)) = blob {
            for y in (cy - 2)..=(cy + 2) {
                for x in (cx - 2)..=(cx + 2) {
                    image.put_pixel(x, y, FIRE);
                }
            }
        }

        InputData {
            image: NavImage {
                timestamp: Utc::now(),
                image,
            },
        }
    }

    fn mgr() -> SeekMgr {
        SeekMgr::with_params(SeekMgrParams::default()).unwrap()
    }

    #[test]
    fn test_search_holds_while_target_far() {
        let mut mgr = mgr();

        // Blob 150 px above the frame centre, nearest pixel 148 px out - beyond the threshold
        let input = frame_with_blob(Some((320, 90)));

        for _ in 0..10 {
            let (cmd, report) = mgr.proc(&input).unwrap();

            assert!(matches!(mgr.mode, SeekMode::Search(_)));
            assert_eq!(report.mode, SeekModeKind::Search);

            // Still approaching: forwards speed, no turn for a dead-ahead target
            assert!(cmd.linear.x > 0.0);
            assert_eq!(cmd.angular.z, 0.0);
        }
    }

    #[test]
    fn test_search_to_circle_when_close_and_aligned() {
        let mut mgr = mgr();

        // Blob 90 px above centre: nearest pixel 88 px out, inside the threshold, dead ahead
        let input = frame_with_blob(Some((320, 150)));

        let (cmd, report) = mgr.proc(&input).unwrap();

        match mgr.mode {
            SeekMode::Circle(ref circle) => {
                assert_eq!(circle.tick_count, 0);
                assert!(circle.turn_in_place);
            }
            _ => panic!("expected Circle mode"),
        }
        assert_eq!(report.mode, SeekModeKind::Circle);

        // The transition cycle emits no speed, only the settled turn
        assert_eq!(cmd.linear.x, 0.0);
    }

    #[test]
    fn test_search_spins_when_no_target() {
        let mut mgr = mgr();
        let input = frame_with_blob(None);

        let (cmd, _) = mgr.proc(&input).unwrap();

        assert!(matches!(mgr.mode, SeekMode::Search(_)));

        // At-centre fallback: zero distance, degenerate 90 degree angle, saturated scan turn
        assert_eq!(cmd, Twist::from_speed_turn(0.0, -1.0));
    }

    #[test]
    fn test_circle_turn_in_place_phase_ends() {
        let mut mgr = mgr();
        mgr.mode = SeekMode::Circle(Circle::new());

        let input = frame_with_blob(Some((320, 150)));

        // Ticks 0 to 5 command the fixed in-place turn and skip detection
        for _ in 0..6 {
            let (cmd, report) = mgr.proc(&input).unwrap();
            assert_eq!(cmd, Twist::from_speed_turn(0.0, TURN_IN_PLACE_RATE));
            assert_eq!(report.target_px, None);
        }

        // From tick 6 the in-place branch is no longer taken and the orbit creep begins
        let (cmd, report) = mgr.proc(&input).unwrap();
        assert_eq!(cmd.linear.x, ORBIT_SPEED);
        assert!(report.target_dist_px.is_some());

        // Standoff controller against an 88 px measurement saturates to the clamp
        assert_eq!(cmd.angular.z, 0.5);
    }

    #[test]
    fn test_orbit_bounded_at_max_ticks() {
        let mut mgr = mgr();
        mgr.mode = SeekMode::Circle(Circle::new());

        let input = frame_with_blob(Some((320, 150)));

        // 100 ticks stay in the orbit
        for _ in 0..100 {
            mgr.proc(&input).unwrap();
            assert!(matches!(mgr.mode, SeekMode::Circle(_)));
        }

        // The 101st tick forces search
        let (_, report) = mgr.proc(&input).unwrap();
        assert!(matches!(mgr.mode, SeekMode::Search(_)));
        assert_eq!(report.circle_tick_count, Some(101));

        // Re-entering the orbit starts with the counter and turn-in-place flag reset
        mgr.proc(&input).unwrap();
        match mgr.mode {
            SeekMode::Circle(ref circle) => {
                assert_eq!(circle.tick_count, 0);
                assert!(circle.turn_in_place);
            }
            _ => panic!("expected Circle mode"),
        }
    }

    #[test]
    fn test_lost_target_in_circle_forces_search() {
        let mut mgr = mgr();
        mgr.mode = SeekMode::Circle(Circle {
            tick_count: 10,
            turn_in_place: false,
        });

        let input = frame_with_blob(None);

        let (cmd, report) = mgr.proc(&input).unwrap();

        // The sentinel reads as beyond the exit distance, forcing search
        assert!(matches!(mgr.mode, SeekMode::Search(_)));
        assert_eq!(report.target_dist_px, Some(500.0));
        assert_eq!(cmd, Twist::from_speed_turn(0.1, 0.0));
    }

    #[test]
    fn test_empty_frame_fails_cycle_only() {
        let mut mgr = mgr();

        let (cmd, _) = mgr.proc(&frame_with_blob(Some((320, 90)))).unwrap();

        let empty = InputData {
            image: NavImage {
                timestamp: Utc::now(),
                image: RgbImage::new(0, 0),
            },
        };

        assert!(mgr.proc(&empty).is_err());

        // The failed cycle leaves the previous command and mode untouched
        assert_eq!(mgr.output, cmd);
        assert!(matches!(mgr.mode, SeekMode::Search(_)));
    }

    #[test]
    fn test_invalid_clamp_config_rejected_at_init() {
        let mut params = SeekMgrParams::default();
        params.orbit_ctrl.min_output = 1.0;
        params.orbit_ctrl.max_output = -1.0;

        assert!(matches!(
            SeekMgr::with_params(params),
            Err(SeekMgrError::InvalidClampRange { .. })
        ));
    }
}
