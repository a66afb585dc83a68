//! # [`SeekMode::Circle`] implementation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::RgbImage;
use nalgebra::Point2;

use super::{
    SeekControllers, SeekMgrError, SeekMgrParams, StatusReport, StepOutput, Transition,
    ORBIT_SPEED, TURN_IN_PLACE_RATE,
};
use crate::fire_detect::FireDetect;
use comms_if::eqpt::motion::Twist;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Circle mode of the SeekMgr.
///
/// Orbits the fire at the standoff distance. Entry starts with an open-loop turn on the spot,
/// counted in ticks against the fixed publish period rather than sensed, after which the
/// standoff controller holds the orbit radius. The orbit is bounded: once `max_orbit_ticks`
/// ticks have elapsed search is forced, so the target is re-acquired periodically.
///
/// Possible transitions:
/// - Search, when the target is lost or drifts outside the orbit exit distance
/// - Search, when the orbit duration bound expires
#[derive(Debug)]
pub struct Circle {
    /// Number of ticks spent in this orbit so far
    pub(crate) tick_count: u32,

    /// True while the entry turn-on-the-spot is still being commanded
    pub(crate) turn_in_place: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Circle {
    /// Create a fresh orbit. Both the tick counter and the turn-in-place flag start reset, so
    /// every entry into Circle behaves the same.
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            turn_in_place: true,
        }
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
        // The entry turn is over once enough publish ticks have elapsed
        if self.tick_count > params.turn_ticks {
            self.turn_in_place = false;
        }

        let mut transition = None;

        let cmd = if self.turn_in_place {
            // Detection is skipped entirely while turning on the spot
            Twist::from_speed_turn(0.0, TURN_IN_PLACE_RATE)
        } else {
            // Nearest fire pixel. A lost target reads as "far" here, unlike search's at-centre
            // fallback, so the exit branch below fires and the robot goes looking again.
            let (target, dist_px) = match detect
                .detect(image, ref_point)
                .map_err(SeekMgrError::FireDetectError)?
            {
                Some(p) => (p, (p - ref_point).norm()),
                None => (*ref_point, params.lost_target_dist_px),
            };

            report.target_px = Some([target.x, target.y]);
            report.target_dist_px = Some(dist_px);

            if dist_px > params.orbit_exit_distance_px {
                // Target has drifted too far out, resume a forward creep while search takes over
                transition = Some(Transition::ToSearch);
                Twist::from_speed_turn(ORBIT_SPEED, 0.0)
            } else {
                // Hold the standoff distance while creeping forwards around the target
                let turn = ctrls.orbit_ctrl.get(dist_px);
                Twist::from_speed_turn(ORBIT_SPEED, turn)
            }
        };

        self.tick_count += 1;

        // Bounded orbit duration, always break off and re-acquire eventually
        if self.tick_count > params.max_orbit_ticks {
            transition = Some(Transition::ToSearch);
        }

        report.speed_dem = cmd.linear.x;
        report.turn_dem = cmd.angular.z;
        report.circle_tick_count = Some(self.tick_count);

        Ok(StepOutput { cmd, transition })
    }
}
