// Motion control core
//
// Provides:
// - Blocking motion primitives (straight legs, in-place turns, heading
//   correction) over the hardware capability traits
// - The pacer that bounds every control loop with a sampling period and a
//   deadline
// - Wraparound-safe heading arithmetic

pub mod angles;
mod core;
mod pacer;

pub use self::core::MotionCore;
pub use pacer::Pacer;
