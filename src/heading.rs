// Heading feed from the external positioning service.
//
// The service publishes absolute-heading fixes over Zenoh. A background
// task keeps only the newest fix and its arrival time; the blocking
// HeadingSource view hands that sample to the control loop, or fails with
// a timeout once the feed goes stale. Stale data is never reused for a
// correction decision.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::MotionError;
use crate::hal::HeadingSource;
use crate::messages::HeadingFix;
use crate::motion::angles::normalize_deg;

#[derive(Debug, Clone, Copy)]
struct Sample {
    heading_deg: f32,
    at: Instant,
}

/// Zenoh-backed implementation of the heading capability
#[derive(Clone)]
pub struct ZenohHeading {
    latest: Arc<Mutex<Option<Sample>>>,
    stale_after: Duration,
}

impl ZenohHeading {
    /// Subscribe to the positioning feed on `key` and start retaining the
    /// newest fix.
    pub async fn subscribe(
        session: &zenoh::Session,
        key: &str,
        stale_after: Duration,
    ) -> zenoh::Result<Self> {
        let subscriber = session.declare_subscriber(key.to_string()).await?;
        let latest: Arc<Mutex<Option<Sample>>> = Arc::new(Mutex::new(None));
        let store = latest.clone();

        tokio::spawn(async move {
            while let Ok(sample) = subscriber.recv_async().await {
                let payload = sample.payload().to_bytes();
                match serde_json::from_slice::<HeadingFix>(&payload) {
                    Ok(fix) => {
                        let heading_deg = normalize_deg(fix.heading_deg);
                        debug!(heading_deg, "heading fix");
                        *lock(&store) = Some(Sample {
                            heading_deg,
                            at: Instant::now(),
                        });
                    }
                    Err(e) => {
                        warn!("failed to parse heading fix: {}", e);
                    }
                }
            }
        });

        Ok(Self {
            latest,
            stale_after,
        })
    }
}

fn lock(cell: &Mutex<Option<Sample>>) -> MutexGuard<'_, Option<Sample>> {
    cell.lock().unwrap_or_else(|e| e.into_inner())
}

impl HeadingSource for ZenohHeading {
    fn heading(&mut self) -> Result<f32, MotionError> {
        match *lock(&self.latest) {
            Some(sample) if sample.at.elapsed() <= self.stale_after => Ok(sample.heading_deg),
            _ => Err(MotionError::SensorTimeout {
                sensor: "heading",
                waited: self.stale_after,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with(sample: Option<Sample>, stale_after: Duration) -> ZenohHeading {
        ZenohHeading {
            latest: Arc::new(Mutex::new(sample)),
            stale_after,
        }
    }

    #[test]
    fn test_no_fix_yet_is_a_timeout() {
        let mut source = source_with(None, Duration::from_millis(250));
        assert!(matches!(
            source.heading(),
            Err(MotionError::SensorTimeout { .. })
        ));
    }

    #[test]
    fn test_fresh_fix_is_returned() {
        let mut source = source_with(
            Some(Sample {
                heading_deg: 123.0,
                at: Instant::now(),
            }),
            Duration::from_secs(1),
        );
        assert_eq!(source.heading().unwrap(), 123.0);
    }

    #[test]
    fn test_stale_fix_is_refused() {
        let mut source = source_with(
            Some(Sample {
                heading_deg: 123.0,
                at: Instant::now() - Duration::from_millis(50),
            }),
            Duration::from_millis(10),
        );
        assert!(matches!(
            source.heading(),
            Err(MotionError::SensorTimeout {
                sensor: "heading",
                ..
            })
        ));
    }
}
