use crate::robots::RobotsRules;
use std::time::{Duration, Instant};

/// Tracks the state of one origin during crawling
///
/// Holds what politeness and robots checks need: when the next request slot
/// opens and the cached robots.txt rules.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests reserved against this origin
    pub request_count: u32,

    /// Start time of the most recently reserved request slot
    pub last_request_time: Option<Instant>,

    /// robots.txt rules, fetched once per crawl
    pub robots: Option<RobotsRules>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, interval: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let ready_at = last + interval;
        if ready_at > now {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Reserves the next request slot and returns how long to wait for it
    ///
    /// Slots are spaced at least `interval` apart even when several workers
    /// reserve at once; each caller sleeps for the returned duration outside
    /// any lock.
    pub fn reserve_slot(&mut self, interval: Duration, now: Instant) -> Duration {
        let wait = self
            .time_until_next_request(interval, now)
            .unwrap_or(Duration::ZERO);
        self.last_request_time = Some(now + wait);
        self.request_count += 1;
        wait
    }

    /// Effective politeness interval: the larger of the configured interval and
    /// the robots.txt crawl delay
    pub fn effective_interval(&self, configured: Duration) -> Duration {
        let robots_delay = self
            .robots
            .as_ref()
            .and_then(RobotsRules::crawl_delay)
            .map(Duration::from_secs_f64)
            .unwrap_or(Duration::ZERO);

        std::cmp::max(configured, robots_delay)
    }
}
