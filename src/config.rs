// Topics, calibration constants, motor configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Zenoh topics
pub const TOPIC_CMD_MOTION: &str = "diffbot/cmd/motion"; // maneuver requests
pub const TOPIC_REPORT: &str = "diffbot/state/maneuver"; // per-maneuver reports
pub const TOPIC_HEALTH: &str = "diffbot/state/health"; // health status
pub const TOPIC_HEADING: &str = "diffbot/rps/heading"; // positioning service feed

/// Calibration and runtime configuration for the drive base.
///
/// These are measured constants for one physical robot (wheel size, gearing,
/// encoder resolution); the core consumes them but never derives them.
/// Loadable from a JSON file, with in-code defaults for the reference robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Nominal drive power for straight legs, percent
    pub drive_power: f32,
    /// Subtracted from the nominal power for precision maneuvers
    pub slow_offset: f32,
    /// Fixed power used by heading correction, percent
    pub turn_power: f32,
    /// Encoder pulses per inch of wheel travel
    pub counts_per_inch: f32,
    /// Encoder pulses per degree of base rotation
    pub counts_per_degree: f32,
    /// Heading correction exits within this many degrees of the target
    pub heading_tolerance_deg: f32,
    /// Delay between control-loop polls, milliseconds
    pub sample_period_ms: u64,
    /// Deadline for a single maneuver before it aborts with a timeout
    pub maneuver_timeout_ms: u64,
    /// A heading sample older than this is treated as a dead sensor
    pub heading_stale_ms: u64,
    /// Serial port for the motor controller board
    pub motor_port: String,
    /// Bus device IDs as [left, right]
    pub motor_ids: [u8; 2],
    /// Drive real hardware; false runs the simulated base instead
    pub motor_enabled: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            drive_power: 60.0,
            slow_offset: 25.0,
            turn_power: 50.0,
            counts_per_inch: 3.704,
            counts_per_degree: 2.33,
            heading_tolerance_deg: 2.0,
            sample_period_ms: 10,
            maneuver_timeout_ms: 15_000,
            heading_stale_ms: 500,
            motor_port: "/dev/ttyUSB0".to_string(),
            motor_ids: [1, 2],
            motor_enabled: true,
        }
    }
}

/// Failure to load a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DriveConfig {
    /// Load configuration from a JSON file. Missing fields fall back to the
    /// defaults for the reference robot.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Drive power for precision maneuvers
    pub fn slow_power(&self) -> f32 {
        self.drive_power - self.slow_offset
    }

    /// Encoder counts for a distance in inches (magnitude)
    pub fn counts_for_inches(&self, inches: f32) -> i32 {
        (self.counts_per_inch * inches.abs()).round() as i32
    }

    /// Encoder counts for a rotation in degrees (magnitude)
    pub fn counts_for_degrees(&self, degrees: f32) -> i32 {
        (self.counts_per_degree * degrees.abs()).round() as i32
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn maneuver_timeout(&self) -> Duration {
        Duration::from_millis(self.maneuver_timeout_ms)
    }

    pub fn heading_stale_after(&self) -> Duration {
        Duration::from_millis(self.heading_stale_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_helpers() {
        let cfg = DriveConfig::default();
        // 3.704 counts/inch, rounded to whole pulses
        assert_eq!(cfg.counts_for_inches(1.0), 4);
        assert_eq!(cfg.counts_for_inches(13.0), 48);
        // sign of the distance never leaks into the count
        assert_eq!(cfg.counts_for_inches(-13.0), 48);
        assert_eq!(cfg.counts_for_degrees(90.0), 210);
        assert_eq!(cfg.slow_power(), 35.0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg: DriveConfig =
            serde_json::from_str(r#"{ "drive_power": 45.0, "motor_enabled": false }"#).unwrap();
        assert_eq!(cfg.drive_power, 45.0);
        assert!(!cfg.motor_enabled);
        assert_eq!(cfg.counts_per_inch, 3.704);
        assert_eq!(cfg.motor_ids, [1, 2]);
    }
}
