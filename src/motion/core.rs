// Motion primitives for the differential drive base.
//
// Three blocking controllers: straight legs and in-place turns dead-reckon
// on encoder counts, heading correction closes the loop on the external
// positioning service. Only one primitive runs at a time; every exit path,
// success or error, leaves both wheels commanded to zero.

use tracing::{debug, info};

use crate::config::DriveConfig;
use crate::error::MotionError;
use crate::hal::{DriveActuator, EncoderSource, HeadingSource, Wheel};
use crate::messages::{MotionRequest, TurnDirection};

use super::angles::{heading_error, normalize_deg};
use super::pacer::Pacer;

/// The locomotion core: owns the base hardware, the heading source, and the
/// robot's calibration.
pub struct MotionCore<B, H> {
    base: B,
    heading: H,
    cfg: DriveConfig,
}

impl<B, H> MotionCore<B, H>
where
    B: DriveActuator + EncoderSource,
    H: HeadingSource,
{
    pub fn new(base: B, heading: H, cfg: DriveConfig) -> Self {
        Self { base, heading, cfg }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.cfg
    }

    /// Dispatch a maneuver request, converting inches/degrees to encoder
    /// counts and filling in configured default powers.
    pub fn execute(&mut self, request: &MotionRequest) -> Result<(), MotionError> {
        match *request {
            MotionRequest::Move { inches, power } => {
                let power = power.unwrap_or(self.cfg.drive_power).abs().copysign(inches);
                let counts = self.cfg.counts_for_inches(inches);
                self.move_straight(power, counts)
            }
            MotionRequest::Turn {
                degrees,
                direction,
                power,
            } => {
                let power = power.unwrap_or(self.cfg.slow_power()).abs();
                let counts = self.cfg.counts_for_degrees(degrees);
                self.turn(direction, power, counts)
            }
            MotionRequest::FaceHeading { target_deg } => self.correct_heading(target_deg),
            MotionRequest::Stop => self.base.stop_all(),
        }
    }

    /// Drive both wheels at `power` until the average encoder count reaches
    /// `target_counts`, then stop. Negative power drives backward.
    pub fn move_straight(&mut self, power: f32, target_counts: i32) -> Result<(), MotionError> {
        info!(power, target_counts, "move straight");
        self.encoder_leg(power, power, target_counts)
    }

    /// Turn in place until the average encoder count reaches `target_counts`,
    /// then stop. The wheels run at opposite signs; which wheel goes forward
    /// is selected by `direction`.
    pub fn turn(
        &mut self,
        direction: TurnDirection,
        power: f32,
        target_counts: i32,
    ) -> Result<(), MotionError> {
        info!(?direction, power, target_counts, "turn");
        let (left, right) = turn_powers(direction, power);
        self.encoder_leg(left, right, target_counts)
    }

    /// Rotate under heading feedback until the measured heading is within
    /// the configured tolerance of `target_deg`, then stop. Runs at the
    /// fixed correction power, re-sampling the heading every tick.
    pub fn correct_heading(&mut self, target_deg: f32) -> Result<(), MotionError> {
        if !target_deg.is_finite() {
            return Err(MotionError::OutOfRange {
                what: "target heading",
                value: target_deg,
            });
        }
        let target = normalize_deg(target_deg);
        info!(target, "correct heading");
        let run = self.seek_heading(target);
        let stop = self.base.stop_all();
        run.and(stop)
    }

    /// Stop both wheels immediately
    pub fn stop(&mut self) -> Result<(), MotionError> {
        self.base.stop_all()
    }

    fn encoder_leg(&mut self, left: f32, right: f32, target_counts: i32) -> Result<(), MotionError> {
        check_power(left)?;
        check_power(right)?;
        if target_counts < 0 {
            return Err(MotionError::OutOfRange {
                what: "target counts",
                value: target_counts as f32,
            });
        }
        if target_counts == 0 {
            debug!("zero-count leg, nothing to drive");
            return Ok(());
        }
        let run = self.drive_until(left, right, target_counts as u32);
        let stop = self.base.stop_all();
        run.and(stop)
    }

    fn drive_until(&mut self, left: f32, right: f32, target: u32) -> Result<(), MotionError> {
        self.base.reset()?;
        self.base.set_power(Wheel::Left, left)?;
        self.base.set_power(Wheel::Right, right)?;

        let pacer = Pacer::new(self.cfg.sample_period(), Some(self.cfg.maneuver_timeout()));
        loop {
            let (l, r) = self.base.counts()?;
            if (l as u64 + r as u64) / 2 >= target as u64 {
                debug!(left = l, right = r, target, "encoder target reached");
                return Ok(());
            }
            if pacer.expired() {
                return Err(MotionError::SensorTimeout {
                    sensor: "encoder",
                    waited: pacer.elapsed(),
                });
            }
            pacer.pause();
        }
    }

    fn seek_heading(&mut self, target: f32) -> Result<(), MotionError> {
        let pacer = Pacer::new(self.cfg.sample_period(), Some(self.cfg.maneuver_timeout()));
        loop {
            let current = self.heading.heading()?;
            let error = heading_error(current, target);
            if error.abs() <= self.cfg.heading_tolerance_deg {
                debug!(current, target, "heading within tolerance");
                return Ok(());
            }
            if pacer.expired() {
                return Err(MotionError::SensorTimeout {
                    sensor: "heading",
                    waited: pacer.elapsed(),
                });
            }
            // positive error: heading must increase, passing through the
            // 360 -> 0 seam when that is the short way around
            let direction = if error > 0.0 {
                TurnDirection::Left
            } else {
                TurnDirection::Right
            };
            let (left, right) = turn_powers(direction, self.cfg.turn_power);
            self.base.set_power(Wheel::Left, left)?;
            self.base.set_power(Wheel::Right, right)?;
            pacer.pause();
        }
    }
}

/// Left/right wheel powers for an in-place turn
fn turn_powers(direction: TurnDirection, power: f32) -> (f32, f32) {
    match direction {
        TurnDirection::Left => (-power, power),
        TurnDirection::Right => (power, -power),
    }
}

fn check_power(percent: f32) -> Result<(), MotionError> {
    if !percent.is_finite() || !(-100.0..=100.0).contains(&percent) {
        return Err(MotionError::OutOfRange {
            what: "power percent",
            value: percent,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBase;

    fn test_config() -> DriveConfig {
        DriveConfig {
            sample_period_ms: 0,
            ..DriveConfig::default()
        }
    }

    fn sim_core(base: SimBase) -> MotionCore<SimBase, SimBase> {
        let heading = base.clone();
        MotionCore::new(base, heading, test_config())
    }

    /// Replay the command log and check that at no point both wheels held
    /// nonzero power of the same sign.
    fn assert_never_same_sign(log: &[(Wheel, f32)]) {
        let (mut left, mut right) = (0.0f32, 0.0f32);
        for &(wheel, power) in log {
            match wheel {
                Wheel::Left => left = power,
                Wheel::Right => right = power,
            }
            assert!(
                !(left * right > 0.0),
                "both wheels driven the same way: left={left}, right={right}"
            );
        }
    }

    #[test]
    fn test_move_straight_reaches_target_and_stops() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.move_straight(60.0, 48).unwrap();

        assert_eq!(observer.powers(), (0.0, 0.0));
        // counts survive until the next maneuver resets them
        let (l, r) = {
            let mut enc = observer.clone();
            enc.counts().unwrap()
        };
        assert!((l as u64 + r as u64) / 2 >= 48);
    }

    #[test]
    fn test_move_backward_counts_still_advance() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.move_straight(-60.0, 20).unwrap();

        assert_eq!(observer.powers(), (0.0, 0.0));
        // both wheels were commanded negative while driving
        let driving: Vec<f32> = observer
            .command_log()
            .iter()
            .map(|&(_, p)| p)
            .filter(|&p| p != 0.0)
            .collect();
        assert!(!driving.is_empty());
        assert!(driving.iter().all(|&p| p == -60.0));
    }

    #[test]
    fn test_zero_target_issues_no_power_command() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.move_straight(60.0, 0).unwrap();

        assert!(
            observer.command_log().iter().all(|&(_, p)| p == 0.0),
            "zero-count move must not drive the wheels"
        );
    }

    #[test]
    fn test_out_of_range_power_rejected_before_hardware() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        let err = core.move_straight(150.0, 100).unwrap_err();
        assert!(err.is_rejection());
        assert!(observer.command_log().is_empty());

        let err = core.move_straight(60.0, -5).unwrap_err();
        assert!(err.is_rejection());
        assert!(observer.command_log().is_empty());
    }

    #[test]
    fn test_turn_wheels_oppose_and_stop() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.turn(TurnDirection::Right, 35.0, 105).unwrap();

        assert_eq!(observer.powers(), (0.0, 0.0));
        assert_never_same_sign(&observer.command_log());
    }

    #[test]
    fn test_stalled_encoder_times_out_with_wheels_stopped() {
        let base = SimBase::with_rates(0.0, 0.0);
        let observer = base.clone();
        let heading = base.clone();
        let cfg = DriveConfig {
            sample_period_ms: 0,
            maneuver_timeout_ms: 20,
            ..DriveConfig::default()
        };
        let mut core = MotionCore::new(base, heading, cfg);

        let err = core.move_straight(60.0, 100).unwrap_err();
        assert!(matches!(
            err,
            MotionError::SensorTimeout {
                sensor: "encoder",
                ..
            }
        ));
        assert_eq!(observer.powers(), (0.0, 0.0));
    }

    #[test]
    fn test_correct_heading_converges_from_zero_to_ninety() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.correct_heading(90.0).unwrap();

        let final_heading = observer.heading_now();
        assert!(
            (final_heading - 90.0).abs() <= 2.0,
            "stopped at {final_heading}"
        );
        assert_eq!(observer.powers(), (0.0, 0.0));
    }

    #[test]
    fn test_correct_heading_is_idempotent() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.correct_heading(90.0).unwrap();
        let settled = observer.heading_now();
        observer.clear_log();

        core.correct_heading(90.0).unwrap();

        assert_eq!(observer.heading_now(), settled);
        assert!(
            observer.command_log().iter().all(|&(_, p)| p == 0.0),
            "already-satisfied correction must not rotate"
        );
    }

    #[test]
    fn test_correct_heading_through_wrap_seam() {
        let base = SimBase::new();
        base.set_heading(355.0);
        let observer = base.clone();
        let mut core = sim_core(base);

        core.correct_heading(5.0).unwrap();

        let final_heading = observer.heading_now();
        let delta = crate::motion::angles::shortest_arc_delta(final_heading, 5.0);
        assert!(delta <= 2.0, "stopped at {final_heading}");
        // 10 degrees at half a degree per tick: far fewer commands than the
        // 350-degree long way would need
        let steps = observer
            .command_log()
            .iter()
            .filter(|&&(_, p)| p != 0.0)
            .count();
        assert!(steps < 100, "took {steps} drive commands");
    }

    #[test]
    fn test_correct_heading_takes_short_arc_from_200_to_10() {
        let base = SimBase::new();
        base.set_heading(200.0);
        let observer = base.clone();
        let mut core = sim_core(base);

        core.correct_heading(10.0).unwrap();

        // shortest arc is 170 degrees upward through 360, not 190 downward:
        // the very first drive commands must rotate counter-clockwise
        let log = observer.command_log();
        let first_left = log.iter().find(|&&(w, p)| w == Wheel::Left && p != 0.0);
        let first_right = log.iter().find(|&&(w, p)| w == Wheel::Right && p != 0.0);
        assert!(matches!(first_left, Some(&(_, p)) if p < 0.0));
        assert!(matches!(first_right, Some(&(_, p)) if p > 0.0));

        let final_heading = observer.heading_now();
        let delta = crate::motion::angles::shortest_arc_delta(final_heading, 10.0);
        assert!(delta <= 2.0, "stopped at {final_heading}");
    }

    #[test]
    fn test_execute_converts_calibration_units() {
        let base = SimBase::new();
        let observer = base.clone();
        let mut core = sim_core(base);

        core.execute(&MotionRequest::Move {
            inches: -2.0,
            power: None,
        })
        .unwrap();

        // default drive power, backward because inches is negative
        let driving: Vec<f32> = observer
            .command_log()
            .iter()
            .map(|&(_, p)| p)
            .filter(|&p| p != 0.0)
            .collect();
        assert!(driving.iter().all(|&p| p == -60.0));
        assert_eq!(observer.powers(), (0.0, 0.0));
    }

    #[test]
    fn test_dead_heading_sensor_times_out() {
        let base = SimBase::with_rates(5.0, 0.0);
        let observer = base.clone();
        let heading = base.clone();
        let cfg = DriveConfig {
            sample_period_ms: 0,
            maneuver_timeout_ms: 20,
            ..DriveConfig::default()
        };
        let mut core = MotionCore::new(base, heading, cfg);

        let err = core.correct_heading(90.0).unwrap_err();
        assert!(matches!(
            err,
            MotionError::SensorTimeout {
                sensor: "heading",
                ..
            }
        ));
        assert_eq!(observer.powers(), (0.0, 0.0));
    }
}
