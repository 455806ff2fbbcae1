use std::time::{Duration, Instant};

pub const REPORT_INTERVAL: Duration = Duration::from_secs(3);

/// Lets a report through at most once per interval.
pub struct ReportThrottle {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl ReportThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_sent {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Runs `send` when the interval has elapsed. The attempt counts as a send
    /// whatever `send` returns.
    pub fn run_if_due<T>(&mut self, now: Instant, send: impl FnOnce() -> T) -> Option<T> {
        if !self.is_due(now) {
            return None;
        }
        let res = send();
        self.last_sent = Some(now);

        Some(res)
    }
}

impl Default for ReportThrottle {
    fn default() -> Self {
        Self::new(REPORT_INTERVAL)
    }
}
