// Polling-interval + deadline control loop support.
//
// The original firmware busy-waited on its completion conditions with no way
// out; a Pacer makes the sampling period explicit configuration and turns a
// dead sensor into an observable timeout instead of a hang.

use std::thread;
use std::time::{Duration, Instant};

/// Paces a blocking control loop: one `sleep` per step, plus an optional
/// deadline after which the loop should abort.
#[derive(Debug)]
pub struct Pacer {
    period: Duration,
    started: Instant,
    deadline: Option<Instant>,
}

impl Pacer {
    pub fn new(period: Duration, timeout: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            period,
            started,
            deadline: timeout.map(|t| started + t),
        }
    }

    /// True once the deadline has passed. A pacer without a deadline never
    /// expires.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time since the loop started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Sleep one sampling period. A zero period yields no delay, which
    /// tests use to converge immediately.
    pub fn pause(&self) {
        if !self.period.is_zero() {
            thread::sleep(self.period);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deadline_never_expires() {
        let pacer = Pacer::new(Duration::ZERO, None);
        for _ in 0..100 {
            pacer.pause();
            assert!(!pacer.expired());
        }
    }

    #[test]
    fn test_deadline_expires() {
        let pacer = Pacer::new(Duration::ZERO, Some(Duration::from_millis(5)));
        assert!(!pacer.expired());
        thread::sleep(Duration::from_millis(10));
        assert!(pacer.expired());
    }
}
