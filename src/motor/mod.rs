// Motor back end for the differential drive base
//
// Provides:
// - The serial packet protocol spoken by the dual-channel drive board
// - BaseDriver, the hardware implementation of the drive and encoder
//   capabilities

pub mod bus;
mod driver;

pub use bus::{BusError, DriveBus, Register};
pub use driver::BaseDriver;
