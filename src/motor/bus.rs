// Serial protocol for the dual-channel gearmotor controller board.
//
// Each wheel is a bus device with its own ID. Packet format:
// [0xAA, 0x55, ID, Length, Instruction, Params..., Checksum]
// where Length counts instruction + params + checksum and Checksum is the
// XOR of every byte after the header. Responses carry a status byte before
// the parameters; nonzero status is a device fault.

use serialport::{self, SerialPort};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

/// Default serial configuration for the drive board
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Packet header bytes
const HEADER: [u8; 2] = [0xAA, 0x55];

/// Instruction set
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Instruction {
    Ping = 0x01,
    Read = 0x02,
    Write = 0x03,
    SyncWrite = 0x83,
}

/// Register map for the drive board
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Register {
    // EEPROM area
    ModelNumber = 0x00, // 2 bytes, read-only
    Id = 0x02,          // 1 byte

    // RAM area
    DriveEnable = 0x10,  // 1 byte: 0=coast, 1=driven
    GoalPower = 0x11,    // 1 byte: signed percent, -100..100
    EncoderCount = 0x20, // 4 bytes, read-only, cumulative pulses
    CountReset = 0x24,   // write 1 to zero the pulse counter
}

/// Error types for drive-board communication
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid response from device {id}: {reason}")]
    InvalidResponse { id: u8, reason: String },

    #[error("checksum mismatch for device {id}")]
    ChecksumMismatch { id: u8 },

    #[error("device {id} reported fault status 0x{status:02X}")]
    DeviceFault { id: u8, status: u8 },

    #[error("timeout waiting for response from device {id}")]
    Timeout { id: u8 },
}

pub type Result<T> = std::result::Result<T, BusError>;

/// Serial bus shared by the wheel motor channels
pub struct DriveBus {
    port: Box<dyn SerialPort>,
}

impl DriveBus {
    /// Open a connection to the drive board
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with a custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    /// XOR checksum over everything after the header
    fn checksum(data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, &b| acc ^ b)
    }

    /// Frame a packet with header and checksum
    fn build_packet(id: u8, instruction: Instruction, params: &[u8]) -> Vec<u8> {
        let length = (params.len() + 2) as u8; // instruction + params + checksum
        let mut packet = Vec::with_capacity(6 + params.len());

        packet.extend_from_slice(&HEADER);
        packet.push(id);
        packet.push(length);
        packet.push(instruction as u8);
        packet.extend_from_slice(params);

        let body = &packet[2..]; // id, length, instruction, params
        packet.push(Self::checksum(body));

        packet
    }

    fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.port.write_all(packet)?;
        self.port.flush()?;
        Ok(())
    }

    /// Read and validate one response packet, returning its parameters
    fn read_response(&mut self, expected_id: u8) -> Result<Vec<u8>> {
        let mut header = [0u8; 2];
        self.port.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                BusError::Timeout { id: expected_id }
            } else {
                BusError::Io(e)
            }
        })?;

        if header != HEADER {
            return Err(BusError::InvalidResponse {
                id: expected_id,
                reason: format!("bad header: {:02X?}", header),
            });
        }

        let mut id_length = [0u8; 2];
        self.port.read_exact(&mut id_length)?;
        let id = id_length[0];
        let length = id_length[1] as usize;

        if id != expected_id {
            return Err(BusError::InvalidResponse {
                id: expected_id,
                reason: format!("id mismatch: expected {expected_id}, got {id}"),
            });
        }
        if length < 2 {
            return Err(BusError::InvalidResponse {
                id,
                reason: format!("short response: length {length}"),
            });
        }

        // status + params + checksum = length bytes
        let mut rest = vec![0u8; length];
        self.port.read_exact(&mut rest)?;

        let mut body = vec![id, length as u8];
        body.extend_from_slice(&rest[..rest.len() - 1]);
        let expected = Self::checksum(&body);
        let received = rest[rest.len() - 1];
        if expected != received {
            return Err(BusError::ChecksumMismatch { id });
        }

        let status = rest[0];
        if status != 0 {
            return Err(BusError::DeviceFault { id, status });
        }

        Ok(rest[1..rest.len() - 1].to_vec())
    }

    /// Check whether a device answers on the bus
    pub fn ping(&mut self, id: u8) -> Result<bool> {
        let packet = Self::build_packet(id, Instruction::Ping, &[]);
        self.send_packet(&packet)?;

        match self.read_response(id) {
            Ok(_) => Ok(true),
            Err(BusError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Write a single byte to a register
    pub fn write_u8(&mut self, id: u8, register: Register, value: u8) -> Result<()> {
        let params = [register as u8, value];
        let packet = Self::build_packet(id, Instruction::Write, &params);
        debug!("write u8 to device {}: reg={:?}, value={}", id, register, value);
        self.send_packet(&packet)?;

        let _ = self.read_response(id)?;
        Ok(())
    }

    /// Write a signed byte (two's complement) to a register
    pub fn write_i8(&mut self, id: u8, register: Register, value: i8) -> Result<()> {
        self.write_u8(id, register, value as u8)
    }

    /// Read a single byte from a register
    pub fn read_u8(&mut self, id: u8, register: Register) -> Result<u8> {
        let params = [register as u8, 1]; // address, length
        let packet = Self::build_packet(id, Instruction::Read, &params);
        self.send_packet(&packet)?;

        let response = self.read_response(id)?;
        match response.first() {
            Some(&b) => Ok(b),
            None => Err(BusError::InvalidResponse {
                id,
                reason: "empty response".to_string(),
            }),
        }
    }

    /// Read two bytes (little-endian) from a register
    pub fn read_u16(&mut self, id: u8, register: Register) -> Result<u16> {
        let params = [register as u8, 2];
        let packet = Self::build_packet(id, Instruction::Read, &params);
        self.send_packet(&packet)?;

        let response = self.read_response(id)?;
        if response.len() < 2 {
            return Err(BusError::InvalidResponse {
                id,
                reason: format!("expected 2 bytes, got {}", response.len()),
            });
        }
        Ok(u16::from_le_bytes([response[0], response[1]]))
    }

    /// Read four bytes (little-endian) from a register
    pub fn read_u32(&mut self, id: u8, register: Register) -> Result<u32> {
        let params = [register as u8, 4];
        let packet = Self::build_packet(id, Instruction::Read, &params);
        self.send_packet(&packet)?;

        let response = self.read_response(id)?;
        if response.len() < 4 {
            return Err(BusError::InvalidResponse {
                id,
                reason: format!("expected 4 bytes, got {}", response.len()),
            });
        }
        Ok(u32::from_le_bytes([
            response[0],
            response[1],
            response[2],
            response[3],
        ]))
    }

    /// Sync write: set the same register on several devices in one packet.
    /// Sync writes are broadcast and produce no response.
    pub fn sync_write_i8(&mut self, register: Register, data: &[(u8, i8)]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        // [start_addr, bytes_per_device, id1, value1, id2, value2, ...]
        let mut params = vec![register as u8, 1u8];
        for &(id, value) in data {
            params.push(id);
            params.push(value as u8);
        }

        let packet = Self::build_packet(0xFE, Instruction::SyncWrite, &params);
        debug!("sync write to {} devices: reg={:?}", data.len(), register);
        self.send_packet(&packet)
    }

    // === High-level convenience methods ===

    /// Enable the H-bridge output for a channel
    pub fn enable_drive(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::DriveEnable, 1)
    }

    /// Disable the H-bridge output, letting the wheel coast
    pub fn disable_drive(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::DriveEnable, 0)
    }

    /// Command a signed power percentage on a channel
    pub fn set_goal_power(&mut self, id: u8, percent: i8) -> Result<()> {
        self.write_i8(id, Register::GoalPower, percent)
    }

    /// Read the cumulative encoder pulse count for a channel
    pub fn encoder_count(&mut self, id: u8) -> Result<u32> {
        self.read_u32(id, Register::EncoderCount)
    }

    /// Zero the encoder pulse counter for a channel
    pub fn reset_count(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::CountReset, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_xor_of_body() {
        // id=1, length=4, WRITE, addr=0x11, value=60
        let data = [1u8, 4, 0x03, 0x11, 60];
        // 1 ^ 4 ^ 3 ^ 17 ^ 60 = 43
        assert_eq!(DriveBus::checksum(&data), 43);
    }

    #[test]
    fn test_build_ping_packet() {
        let packet = DriveBus::build_packet(2, Instruction::Ping, &[]);
        // header (2) + id (1) + length (1) + instruction (1) + checksum (1)
        assert_eq!(packet.len(), 6);
        assert_eq!(&packet[..2], &HEADER);
        assert_eq!(packet[2], 2); // id
        assert_eq!(packet[3], 2); // instruction + checksum
        assert_eq!(packet[4], 0x01);
        assert_eq!(packet[5], DriveBus::checksum(&packet[2..5]));
    }

    #[test]
    fn test_build_power_write_packet() {
        let packet = DriveBus::build_packet(1, Instruction::Write, &[Register::GoalPower as u8, (-60i8) as u8]);
        assert_eq!(packet[3], 4); // instruction + addr + value + checksum
        assert_eq!(packet[4], 0x03);
        assert_eq!(packet[5], 0x11);
        assert_eq!(packet[6] as i8, -60);
    }

    #[test]
    fn test_signed_byte_cast_roundtrip() {
        for value in [-100i8, -1, 0, 1, 100] {
            assert_eq!((value as u8) as i8, value);
        }
    }
}
