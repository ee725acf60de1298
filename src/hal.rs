// Hardware capability traits for the locomotion core.
//
// The motors, encoders, and heading service are bound once at startup and
// passed into the motion primitives as explicit interfaces, so hardware can
// be swapped for the simulated base in tests and in motor-disabled runs.

use crate::error::MotionError;

/// One side of the differential drive base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

/// Applies a signed power level, as a percentage of maximum, to each wheel
/// motor independently.
///
/// Power sign selects direction, magnitude selects speed. Implementations
/// may assume the percentage is within [-100, 100]; the motion core
/// validates caller input before commanding hardware.
pub trait DriveActuator {
    fn set_power(&mut self, wheel: Wheel, percent: f32) -> Result<(), MotionError>;

    fn stop(&mut self, wheel: Wheel) -> Result<(), MotionError> {
        self.set_power(wheel, 0.0)
    }

    fn stop_all(&mut self) -> Result<(), MotionError> {
        self.stop(Wheel::Left)?;
        self.stop(Wheel::Right)
    }
}

/// Accumulated wheel-encoder pulse counts since the last reset.
///
/// Counts are monotonically non-decreasing between resets, even when a wheel
/// is driven backward: direction is carried by the caller's interpretation,
/// not by the counter.
pub trait EncoderSource {
    /// Zero both wheel counts
    fn reset(&mut self) -> Result<(), MotionError>;

    /// Current accumulated pulses as `(left, right)`
    fn counts(&mut self) -> Result<(u32, u32), MotionError>;
}

/// Absolute heading in degrees [0, 360) from the external positioning
/// service.
///
/// Every call returns the freshest available sample; implementations must
/// fail with [`MotionError::SensorTimeout`] rather than hand back data older
/// than their staleness window.
pub trait HeadingSource {
    fn heading(&mut self) -> Result<f32, MotionError>;
}
