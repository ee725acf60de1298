// Maneuver execution loop.
//
// Subscribes to motion requests over Zenoh and executes them one at a time
// to completion; the calling layer's mutual exclusion is preserved by never
// starting a maneuver before the previous one has finished. Each maneuver
// runs on a blocking worker so the heading subscription keeps receiving
// fixes while the wheels are in motion. After every maneuver a report and a
// health state are published.

use std::time::Instant;

use tokio::task;
use tracing::{info, warn};

use crate::config::{
    DriveConfig, TOPIC_CMD_MOTION, TOPIC_HEADING, TOPIC_HEALTH, TOPIC_REPORT,
};
use crate::hal::{DriveActuator, EncoderSource, HeadingSource};
use crate::heading::ZenohHeading;
use crate::messages::{ManeuverOutcome, ManeuverReport, MotionRequest, RuntimeHealth};
use crate::motion::MotionCore;
use crate::motor::BaseDriver;
use crate::sim::SimBase;

type RunResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub async fn run(cfg: DriveConfig) -> RunResult {
    info!("opening zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    let heading =
        ZenohHeading::subscribe(&session, TOPIC_HEADING, cfg.heading_stale_after()).await?;

    if cfg.motor_enabled {
        let base = BaseDriver::open(&cfg)?;
        serve(session, MotionCore::new(base, heading, cfg)).await
    } else {
        info!("motors disabled, running the simulated base");
        let base = SimBase::new();
        serve(session, MotionCore::new(base, heading, cfg)).await
    }
}

async fn serve<B, H>(session: zenoh::Session, core: MotionCore<B, H>) -> RunResult
where
    B: DriveActuator + EncoderSource + Send + 'static,
    H: HeadingSource + Send + 'static,
{
    let subscriber = session.declare_subscriber(TOPIC_CMD_MOTION).await?;
    let pub_report = session.declare_publisher(TOPIC_REPORT).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    info!("listening on: {}", TOPIC_CMD_MOTION);
    info!("publishing to: {}, {}", TOPIC_REPORT, TOPIC_HEALTH);
    publish_health(&pub_health, RuntimeHealth::Idle).await?;

    let mut core = core;
    let mut seq: u64 = 0;

    while let Ok(sample) = subscriber.recv_async().await {
        let payload = sample.payload().to_bytes();
        let request: MotionRequest = match serde_json::from_slice(&payload) {
            Ok(req) => req,
            Err(e) => {
                warn!("failed to parse motion request: {}", e);
                continue;
            }
        };

        seq += 1;
        info!(seq, "executing: {:?}", request);
        publish_health(&pub_health, RuntimeHealth::Executing).await?;

        let started = Instant::now();
        let exec_request = request.clone();
        let (returned, result) = task::spawn_blocking(move || {
            let mut core = core;
            let result = core.execute(&exec_request);
            (core, result)
        })
        .await?;
        core = returned;

        let (outcome, health) = match result {
            Ok(()) => (ManeuverOutcome::Completed, RuntimeHealth::Idle),
            Err(e) if e.is_rejection() => {
                warn!(seq, "rejected: {}", e);
                (
                    ManeuverOutcome::Rejected {
                        reason: e.to_string(),
                    },
                    RuntimeHealth::Idle,
                )
            }
            Err(e) => {
                warn!(seq, "failed: {}", e);
                (
                    ManeuverOutcome::Failed {
                        reason: e.to_string(),
                    },
                    RuntimeHealth::Faulted,
                )
            }
        };

        let report = ManeuverReport {
            seq,
            request,
            outcome,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        pub_report.put(serde_json::to_string(&report)?).await?;
        publish_health(&pub_health, health).await?;
    }

    Ok(())
}

async fn publish_health(
    publisher: &zenoh::pubsub::Publisher<'_>,
    health: RuntimeHealth,
) -> RunResult {
    publisher.put(serde_json::to_string(&health)?).await?;
    Ok(())
}
