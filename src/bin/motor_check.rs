// Drive-board diagnostic: READ-ONLY check of the serial connection.
//
// Pings both wheel channels and dumps their registers without commanding
// any movement. Run this before trusting the runtime with a new wiring
// setup.
//
// Usage: cargo run --bin motor_check -- [port]

use diffbot_runtime::config::DriveConfig;
use diffbot_runtime::motor::{DriveBus, Register};

const WHEEL_NAMES: [&str; 2] = ["Left", "Right"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let cfg = DriveConfig::default();
    let port = std::env::args().nth(1).unwrap_or(cfg.motor_port);

    println!("Drive-board diagnostic (read-only, no movement)");
    println!("Serial port: {}", port);
    println!("Expected wheel channels: {:?}", cfg.motor_ids);
    println!();

    println!("Step 1: opening serial port...");
    let mut bus = match DriveBus::open(&port) {
        Ok(bus) => {
            println!("  ok");
            bus
        }
        Err(e) => {
            println!("  failed: {}", e);
            println!();
            println!("Check the port path, the USB cable, and device permissions.");
            return Err(e.into());
        }
    };
    println!();

    println!("Step 2: pinging wheel channels...");
    let mut all_found = true;
    for (name, &id) in WHEEL_NAMES.iter().zip(&cfg.motor_ids) {
        match bus.ping(id) {
            Ok(true) => println!("  {} (id {}): responding", name, id),
            Ok(false) => {
                println!("  {} (id {}): NO RESPONSE", name, id);
                all_found = false;
            }
            Err(e) => {
                println!("  {} (id {}): error: {}", name, id, e);
                all_found = false;
            }
        }
    }
    println!();

    if !all_found {
        println!("Not all channels responded; check board power and channel IDs.");
    }

    println!("Step 3: reading registers...");
    for (name, &id) in WHEEL_NAMES.iter().zip(&cfg.motor_ids) {
        println!("  === {} wheel (id {}) ===", name, id);

        match bus.read_u16(id, Register::ModelNumber) {
            Ok(model) => println!("    Model:         0x{:04X}", model),
            Err(e) => println!("    Model:         error: {}", e),
        }

        match bus.read_u8(id, Register::DriveEnable) {
            Ok(val) => {
                let state = if val == 1 { "DRIVEN" } else { "coast" };
                println!("    Drive enable:  {} ({})", val, state);
            }
            Err(e) => println!("    Drive enable:  error: {}", e),
        }

        match bus.read_u8(id, Register::GoalPower) {
            Ok(raw) => println!("    Goal power:    {}%", raw as i8),
            Err(e) => println!("    Goal power:    error: {}", e),
        }

        match bus.encoder_count(id) {
            Ok(count) => println!("    Encoder count: {}", count),
            Err(e) => println!("    Encoder count: error: {}", e),
        }

        println!();
    }

    println!("Diagnostic complete.");
    println!("If both channels responded with goal power 0, the runtime is safe to start.");

    Ok(())
}
