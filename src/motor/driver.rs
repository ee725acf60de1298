// Hardware drive base over the serial motor-controller board.
//
// Layers the locomotion capability traits on top of the bus protocol so the
// motion core never sees packets or registers.

use tracing::{debug, info, warn};

use super::bus::{BusError, DriveBus, Register};
use crate::config::DriveConfig;
use crate::error::MotionError;
use crate::hal::{DriveActuator, EncoderSource, Wheel};

/// Hardware implementation of the drive and encoder capabilities
pub struct BaseDriver {
    bus: DriveBus,
    ids: [u8; 2], // [left, right]
}

impl BaseDriver {
    /// Open the board named in the config and verify both wheel channels
    /// respond.
    pub fn open(cfg: &DriveConfig) -> Result<Self, BusError> {
        info!("opening drive board on {}", cfg.motor_port);
        let bus = DriveBus::open(&cfg.motor_port)?;
        let mut driver = Self {
            bus,
            ids: cfg.motor_ids,
        };
        driver.initialize()?;
        Ok(driver)
    }

    /// Ping both channels and enable their outputs
    fn initialize(&mut self) -> Result<(), BusError> {
        info!("initializing wheel channels {:?}", self.ids);

        for &id in &self.ids {
            match self.bus.ping(id) {
                Ok(true) => debug!("wheel channel {} responding", id),
                Ok(false) => {
                    warn!("wheel channel {} not responding to ping", id);
                    return Err(BusError::Timeout { id });
                }
                Err(e) => return Err(e),
            }
        }

        for &id in &self.ids {
            self.bus.enable_drive(id)?;
        }

        info!("drive board ready");
        Ok(())
    }

    fn channel(&self, wheel: Wheel) -> u8 {
        match wheel {
            Wheel::Left => self.ids[0],
            Wheel::Right => self.ids[1],
        }
    }
}

impl DriveActuator for BaseDriver {
    fn set_power(&mut self, wheel: Wheel, percent: f32) -> Result<(), MotionError> {
        // callers validate range; the cast clamp is a board-protocol
        // requirement, not an API contract
        let raw = percent.round().clamp(-100.0, 100.0) as i8;
        self.bus
            .set_goal_power(self.channel(wheel), raw)
            .map_err(|e| MotionError::ActuatorFault(Box::new(e)))
    }

    fn stop_all(&mut self) -> Result<(), MotionError> {
        let data = [(self.ids[0], 0i8), (self.ids[1], 0i8)];
        self.bus
            .sync_write_i8(Register::GoalPower, &data)
            .map_err(|e| MotionError::ActuatorFault(Box::new(e)))
    }
}

impl EncoderSource for BaseDriver {
    fn reset(&mut self) -> Result<(), MotionError> {
        for &id in &self.ids {
            self.bus.reset_count(id).map_err(map_sensor_err)?;
        }
        Ok(())
    }

    fn counts(&mut self) -> Result<(u32, u32), MotionError> {
        let left = self.bus.encoder_count(self.ids[0]).map_err(map_sensor_err)?;
        let right = self.bus.encoder_count(self.ids[1]).map_err(map_sensor_err)?;
        Ok((left, right))
    }
}

fn map_sensor_err(e: BusError) -> MotionError {
    match e {
        BusError::Timeout { .. } => MotionError::SensorTimeout {
            sensor: "encoder",
            waited: std::time::Duration::from_millis(super::bus::DEFAULT_TIMEOUT_MS),
        },
        other => MotionError::ActuatorFault(Box::new(other)),
    }
}

impl Drop for BaseDriver {
    fn drop(&mut self) {
        // stop the wheels when the driver goes away (safety measure)
        if let Err(e) = self.stop_all() {
            warn!("failed to stop wheels on drop: {}", e);
        }
    }
}
