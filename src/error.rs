// Error taxonomy for motion primitives.
//
// The original firmware had no error signaling at all: bad inputs were
// applied as-is and dead sensors hung the robot forever. Here every
// maneuver either completes, is rejected up front, or aborts with the
// wheels stopped and a reportable error.

use std::time::Duration;

/// Errors produced by the motion core and its hardware capabilities
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    /// Caller supplied a value outside the accepted range. Rejected before
    /// any hardware command is issued.
    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: f32 },

    /// A sensor did not update or the maneuver did not converge within the
    /// expected interval. The maneuver is aborted with the wheels stopped.
    #[error("{sensor} did not update within {waited:?}")]
    SensorTimeout {
        sensor: &'static str,
        waited: Duration,
    },

    /// A power command could not be applied to a wheel motor.
    #[error("actuator fault: {0}")]
    ActuatorFault(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MotionError {
    /// True for errors caught by input validation, before any hardware
    /// command was issued.
    pub fn is_rejection(&self) -> bool {
        matches!(self, MotionError::OutOfRange { .. })
    }
}
