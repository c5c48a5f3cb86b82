use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

/// Callers tracked before idle entries are swept.
const MAX_TRACKED_CALLERS: usize = 10_000;

/// Per-caller sliding-window request counter.
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        SlidingWindowLimiter {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `caller`; false when it is over the limit.
    pub fn check(&self, caller: &str) -> bool {
        self.check_at(caller, Instant::now())
    }

    fn check_at(&self, caller: &str, now: Instant) -> bool {
        let mut hits = self
            .hits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if hits.len() >= MAX_TRACKED_CALLERS && !hits.contains_key(caller) {
            let before = hits.len();
            let window = self.window;
            hits.retain(|_, times| {
                times.retain(|t| now.duration_since(*t) < window);
                !times.is_empty()
            });
            warn!("Rate limiter swept {} idle callers", before - hits.len());
        }

        let times = hits.entry(caller.to_string()).or_default();
        while let Some(oldest) = times.front() {
            if now.duration_since(*oldest) >= self.window {
                times.pop_front();
            } else {
                break;
            }
        }

        if times.len() >= self.limit {
            return false;
        }
        times.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_each_caller_separately() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("alice", now));
        assert!(limiter.check_at("alice", now));
        assert!(!limiter.check_at("alice", now));
        assert!(limiter.check_at("bob", now));
    }

    #[test]
    fn window_slides() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("alice", start));
        assert!(limiter.check_at("alice", start + Duration::from_secs(30)));
        assert!(!limiter.check_at("alice", start + Duration::from_secs(59)));
        // The first hit has left the window; the second has not.
        assert!(limiter.check_at("alice", start + Duration::from_secs(60)));
        assert!(!limiter.check_at("alice", start + Duration::from_secs(61)));
        assert!(limiter.check_at("alice", start + Duration::from_secs(90)));
    }

    #[test]
    fn rejected_requests_do_not_extend_the_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.check_at("carol", start));
        assert!(!limiter.check_at("carol", start + Duration::from_secs(9)));
        assert!(limiter.check_at("carol", start + Duration::from_secs(10)));
    }
}
