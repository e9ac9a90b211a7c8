//! Submission throttle
//!
//! Explicit rate-limit state for a single ingestion caller. Each live socket
//! session owns one, so pose detectors streaming at frame rate are reduced to
//! one submission per interval without any shared counter.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SubmitThrottle {
    min_interval: Duration,
    last_allowed: Option<Instant>,
    suppressed: u64,
}

impl SubmitThrottle {
    /// `min_interval` of zero disables throttling
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_allowed: None,
            suppressed: 0,
        }
    }

    /// Whether a submission at `now` may go through. Records it if so.
    pub fn allow(&mut self, now: Instant) -> bool {
        let allowed = match self.last_allowed {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        };

        if allowed {
            self.last_allowed = Some(now);
        } else {
            self.suppressed += 1;
        }
        allowed
    }

    /// Submissions refused so far
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}
