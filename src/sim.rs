// Simulated drive base.
//
// Stands in for the motor board and the positioning service when motors are
// disabled in config, and gives the motion tests deterministic hardware:
// encoder counts and heading advance by a fixed amount per sensor poll,
// proportional to the currently applied wheel powers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::MotionError;
use crate::hal::{DriveActuator, EncoderSource, HeadingSource, Wheel};

/// Pulses accumulated per `counts()` poll at full power
const DEFAULT_COUNTS_PER_POLL: f32 = 5.0;
/// Heading change per `heading()` poll at full differential power
const DEFAULT_DEGREES_PER_POLL: f32 = 1.0;

#[derive(Debug)]
struct SimState {
    left_power: f32,
    right_power: f32,
    left_counts: f32,
    right_counts: f32,
    heading_deg: f32,
    counts_per_poll: f32,
    degrees_per_poll: f32,
    log: Vec<(Wheel, f32)>,
}

/// Simulated differential base implementing all three hardware capabilities.
///
/// Clones share state, so one handle can be driven by the motion core while
/// another observes it (or serves as the heading source).
#[derive(Debug, Clone)]
pub struct SimBase {
    state: Arc<Mutex<SimState>>,
}

impl SimBase {
    pub fn new() -> Self {
        Self::with_rates(DEFAULT_COUNTS_PER_POLL, DEFAULT_DEGREES_PER_POLL)
    }

    /// A base with custom per-poll rates. Zero rates model a stalled wheel
    /// or a dead sensor.
    pub fn with_rates(counts_per_poll: f32, degrees_per_poll: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                left_power: 0.0,
                right_power: 0.0,
                left_counts: 0.0,
                right_counts: 0.0,
                heading_deg: 0.0,
                counts_per_poll,
                degrees_per_poll,
                log: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Place the base at an absolute heading
    pub fn set_heading(&self, deg: f32) {
        self.lock().heading_deg = deg.rem_euclid(360.0);
    }

    /// Current heading without advancing the simulation
    pub fn heading_now(&self) -> f32 {
        self.lock().heading_deg
    }

    /// Currently applied powers as `(left, right)`
    pub fn powers(&self) -> (f32, f32) {
        let s = self.lock();
        (s.left_power, s.right_power)
    }

    /// Every `set_power` call observed so far, in order
    pub fn command_log(&self) -> Vec<(Wheel, f32)> {
        self.lock().log.clone()
    }

    pub fn clear_log(&self) {
        self.lock().log.clear();
    }
}

impl Default for SimBase {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveActuator for SimBase {
    fn set_power(&mut self, wheel: Wheel, percent: f32) -> Result<(), MotionError> {
        let mut s = self.lock();
        match wheel {
            Wheel::Left => s.left_power = percent,
            Wheel::Right => s.right_power = percent,
        }
        s.log.push((wheel, percent));
        Ok(())
    }
}

impl EncoderSource for SimBase {
    fn reset(&mut self) -> Result<(), MotionError> {
        let mut s = self.lock();
        s.left_counts = 0.0;
        s.right_counts = 0.0;
        Ok(())
    }

    fn counts(&mut self) -> Result<(u32, u32), MotionError> {
        let mut s = self.lock();
        // pulses accumulate with the magnitude of the power; the counter
        // never runs backward
        let rate = s.counts_per_poll / 100.0;
        s.left_counts += s.left_power.abs() * rate;
        s.right_counts += s.right_power.abs() * rate;
        Ok((s.left_counts as u32, s.right_counts as u32))
    }
}

impl HeadingSource for SimBase {
    fn heading(&mut self) -> Result<f32, MotionError> {
        let mut s = self.lock();
        // differential power rotates the base; equal powers hold heading
        let step = (s.right_power - s.left_power) / 200.0 * s.degrees_per_poll;
        s.heading_deg = (s.heading_deg + step).rem_euclid(360.0);
        Ok(s.heading_deg)
    }
}
