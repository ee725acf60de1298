// Locomotion runtime for a small differential-drive robot.
//
// Converts high-level motion requests (move N inches, turn D degrees, face
// heading H) into timed motor commands: dead-reckoned legs on wheel-encoder
// counts, drift correction against an external absolute-heading service.
// Task sequencing and mechanism choreography live outside this crate and
// consume it through the motion primitives or the Zenoh command interface.

pub mod config;
pub mod error;
pub mod hal;
pub mod heading;
pub mod messages;
pub mod motion;
pub mod motor;
pub mod runtime;
pub mod sim;

pub use config::DriveConfig;
pub use error::MotionError;
pub use hal::{DriveActuator, EncoderSource, HeadingSource, Wheel};
pub use messages::{MotionRequest, TurnDirection};
pub use motion::MotionCore;
