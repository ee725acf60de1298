// One-shot maneuver CLI: publish a motion request and wait for the report.
//
// Usage:
//   cargo run --bin maneuver -- move 13.0
//   cargo run --bin maneuver -- turn 90 left
//   cargo run --bin maneuver -- face 270
//   cargo run --bin maneuver -- stop

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use diffbot_runtime::config::{TOPIC_CMD_MOTION, TOPIC_REPORT};
use diffbot_runtime::messages::{ManeuverReport, MotionRequest, TurnDirection};

#[derive(Parser)]
#[command(about = "Send one maneuver to the locomotion runtime")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Seconds to wait for the maneuver report
    #[arg(long, default_value_t = 30)]
    wait: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Drive straight; negative inches drive backward
    Move {
        inches: f32,
        /// Override the configured drive power, percent
        #[arg(long)]
        power: Option<f32>,
    },
    /// Turn in place by a dead-reckoned angle
    Turn {
        degrees: f32,
        #[arg(value_parser = parse_direction)]
        direction: TurnDirection,
        #[arg(long)]
        power: Option<f32>,
    },
    /// Rotate under heading feedback until facing the target
    Face { target_deg: f32 },
    /// Stop both wheels
    Stop,
}

fn parse_direction(s: &str) -> Result<TurnDirection, String> {
    match s {
        "left" => Ok(TurnDirection::Left),
        "right" => Ok(TurnDirection::Right),
        other => Err(format!("expected 'left' or 'right', got '{other}'")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let request = match args.command {
        Command::Move { inches, power } => MotionRequest::Move { inches, power },
        Command::Turn {
            degrees,
            direction,
            power,
        } => MotionRequest::Turn {
            degrees,
            direction,
            power,
        },
        Command::Face { target_deg } => MotionRequest::FaceHeading { target_deg },
        Command::Stop => MotionRequest::Stop,
    };

    info!("opening zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    // subscribe before publishing so the report cannot slip past us
    let reports = session.declare_subscriber(TOPIC_REPORT).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_MOTION).await?;

    info!("sending: {:?}", request);
    publisher.put(serde_json::to_string(&request)?).await?;

    match tokio::time::timeout(Duration::from_secs(args.wait), reports.recv_async()).await {
        Ok(Ok(sample)) => {
            let report: ManeuverReport = serde_json::from_slice(&sample.payload().to_bytes())?;
            println!(
                "seq {} finished in {} ms: {:?}",
                report.seq, report.elapsed_ms, report.outcome
            );
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            println!("no report within {} s (is the runtime up?)", args.wait);
        }
    }

    Ok(())
}
