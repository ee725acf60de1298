// Wire types for the runtime

use serde::{Deserialize, Serialize};

/// Rotation sense for a dead-reckoned turn.
///
/// `Left` drives the right wheel forward and the left wheel backward; the
/// physical rotation that produces depends on wheel placement and is fixed
/// by calibration, not by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Maneuver request from task scripts/teleop -> runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionRequest {
    /// Drive straight for a distance. Negative inches drive backward.
    /// `power` overrides the configured nominal drive power.
    Move {
        inches: f32,
        #[serde(default)]
        power: Option<f32>,
    },
    /// Turn in place by a dead-reckoned angle. `power` overrides the
    /// configured slow power.
    Turn {
        degrees: f32,
        direction: TurnDirection,
        #[serde(default)]
        power: Option<f32>,
    },
    /// Rotate under heading feedback until facing `target_deg`
    FaceHeading { target_deg: f32 },
    /// Stop both wheels
    Stop,
}

/// Heading sample published by the external positioning service
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeadingFix {
    /// Absolute heading in degrees, wrapping at 360
    pub heading_deg: f32,
}

/// Outcome of a single maneuver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ManeuverOutcome {
    Completed,
    /// Input validation failed; no hardware command was issued
    Rejected { reason: String },
    /// The maneuver started but aborted; wheels were stopped
    Failed { reason: String },
}

/// Report published after every maneuver, runtime -> observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManeuverReport {
    pub seq: u64,
    pub request: MotionRequest,
    pub outcome: ManeuverOutcome,
    pub elapsed_ms: u64,
}

/// Health status published by the runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Idle,
    Executing,
    Faulted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let json = r#"{ "kind": "move", "inches": 13.0 }"#;
        let req: MotionRequest = serde_json::from_str(json).unwrap();
        match req {
            MotionRequest::Move { inches, power } => {
                assert_eq!(inches, 13.0);
                assert!(power.is_none());
            }
            other => panic!("unexpected request: {:?}", other),
        }

        let json = r#"{ "kind": "turn", "degrees": 90.0, "direction": "left" }"#;
        let req: MotionRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req,
            MotionRequest::Turn {
                direction: TurnDirection::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_outcome_roundtrip() {
        let report = ManeuverReport {
            seq: 3,
            request: MotionRequest::FaceHeading { target_deg: 90.0 },
            outcome: ManeuverOutcome::Completed,
            elapsed_ms: 420,
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: ManeuverReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outcome, ManeuverOutcome::Completed);
        assert_eq!(back.seq, 3);
    }
}
