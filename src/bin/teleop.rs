// Keyboard teleop: W/S drive, A/D turn, 0-3 face a cardinal heading,
// R/F step size, Q quit. Each keypress publishes one maneuver request;
// the runtime executes them in order.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tracing::info;

use diffbot_runtime::config::TOPIC_CMD_MOTION;
use diffbot_runtime::messages::{MotionRequest, TurnDirection};

const MOVE_STEPS: [f32; 3] = [2.0, 6.0, 12.0]; // inches
const TURN_STEPS: [f32; 3] = [15.0, 45.0, 90.0]; // degrees

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("opening zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_MOTION).await?;

    info!("controls: W/S=drive, A/D=turn, 0-3=face N*90°, R/F=step size, SPACE=stop, Q=quit");
    print_step(0);

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut step_idx: usize = 0;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press && kind != KeyEventKind::Repeat {
            continue;
        }

        let request = match code {
            KeyCode::Char('w') => Some(MotionRequest::Move {
                inches: MOVE_STEPS[step_idx],
                power: None,
            }),
            KeyCode::Char('s') => Some(MotionRequest::Move {
                inches: -MOVE_STEPS[step_idx],
                power: None,
            }),
            KeyCode::Char('a') => Some(MotionRequest::Turn {
                degrees: TURN_STEPS[step_idx],
                direction: TurnDirection::Left,
                power: None,
            }),
            KeyCode::Char('d') => Some(MotionRequest::Turn {
                degrees: TURN_STEPS[step_idx],
                direction: TurnDirection::Right,
                power: None,
            }),
            KeyCode::Char(c @ '0'..='3') => Some(MotionRequest::FaceHeading {
                target_deg: (c as u8 - b'0') as f32 * 90.0,
            }),
            KeyCode::Char(' ') => Some(MotionRequest::Stop),

            KeyCode::Char('r') => {
                step_idx = (step_idx + 1).min(2);
                print_step(step_idx);
                None
            }
            KeyCode::Char('f') => {
                step_idx = step_idx.saturating_sub(1);
                print_step(step_idx);
                None
            }

            KeyCode::Char('q') | KeyCode::Esc => break,

            _ => None,
        };

        if let Some(request) = request {
            info!("sending: {:?}", request);
            publisher.put(serde_json::to_string(&request)?).await?;
        }
    }

    Ok(())
}

fn print_step(idx: usize) {
    info!(
        "step size: {} in / {}°",
        MOVE_STEPS[idx], TURN_STEPS[idx]
    );
}
