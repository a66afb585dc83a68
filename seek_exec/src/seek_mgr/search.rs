//! # [`SeekMode::Search`] implementation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::RgbImage;
use nalgebra::{Point2, Vector2};

use super::{
    SeekControllers, SeekMgrError, SeekMgrParams, StatusReport, StepOutput, Transition,
    ROB_FORWARD_PX, TURN_DEADBAND,
};
use crate::fire_detect::FireDetect;
use comms_if::eqpt::motion::Twist;
use util::maths;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Search mode of the SeekMgr.
///
/// Detects the fire, turns the robot towards it, and approaches until the target sits within the
/// detection threshold.
///
/// Possible transitions:
/// - Circle, once the target is within the detection threshold and the turn demand has settled
#[derive(Debug)]
pub struct Search;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Search {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn step(
        &mut self,
        params: &SeekMgrParams,
        ctrls: &SeekControllers,
        detect: &FireDetect,
        image: &RgbImage,
        ref_point: &Point2<f64>,
        report: &mut StatusReport,
    ) -> Result<StepOutput, SeekMgrError> {
        // Nearest fire pixel, falling back to the reference point itself (zero distance) when
        // nothing is found. The degenerate angle below then saturates the turn demand, spinning
        // the robot on the spot to scan for the target.
        let target = match detect
            .detect(image, ref_point)
            .map_err(SeekMgrError::FireDetectError)?
        {
            Some(p) => p,
            None => *ref_point,
        };

        // Vector from the robot's reference point to the target, and the robot's fixed forward
        // vector in image coordinates
        let rob_obj = target - ref_point;
        let rob_for = Vector2::from(ROB_FORWARD_PX);

        let dist_px = rob_obj.norm();
        let heading_err_deg = maths::angle_between_deg(&rob_obj, &rob_for);

        let turn = ctrls.ang_ctrl.get(heading_err_deg);
        let mut speed = 0.0;
        let mut transition = None;

        if dist_px > params.detection_threshold_px {
            // Still too far out, keep approaching
            speed = ctrls.vel_ctrl.get(dist_px);
        } else if turn.abs() < TURN_DEADBAND {
            // Within the standoff and settled on the target, begin the orbit
            transition = Some(Transition::ToCircle);
        }
        // Otherwise hold position and keep fine-aligning before entering the orbit

        report.target_px = Some([target.x, target.y]);
        report.target_dist_px = Some(dist_px);
        report.heading_err_deg = Some(heading_err_deg);
        report.speed_dem = speed;
        report.turn_dem = turn;

        Ok(StepOutput {
            cmd: Twist::from_speed_turn(speed, turn),
            transition,
        })
    }
}
