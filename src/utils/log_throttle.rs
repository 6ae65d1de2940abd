use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started_at: Instant,
    suppressed: u64,
}

/// Rate limits repeated log lines per key, counting what it swallowed.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        LogThrottle {
            interval,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// `Some(suppressed_count)` when a line for `key` should be logged now,
    /// `None` when it falls inside the current window and is counted instead.
    pub fn should_emit(&self, key: &str) -> Option<u64> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let Some(window) = windows.get_mut(key) else {
            windows.insert(
                key.to_string(),
                Window {
                    started_at: now,
                    suppressed: 0,
                },
            );
            return Some(0);
        };

        if now.duration_since(window.started_at) < self.interval {
            window.suppressed += 1;
            return None;
        }

        let suppressed = std::mem::take(&mut window.suppressed);
        window.started_at = now;
        Some(suppressed)
    }
}

#[cfg(test)]
mod tests {
    use super::LogThrottle;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn emits_then_suppresses_then_reports_count() {
        let throttle = LogThrottle::new(Duration::from_millis(20));

        assert_eq!(throttle.should_emit("forced_logout"), Some(0));
        assert_eq!(throttle.should_emit("forced_logout"), None);
        assert_eq!(throttle.should_emit("forced_logout"), None);

        sleep(Duration::from_millis(30));
        assert_eq!(throttle.should_emit("forced_logout"), Some(2));
    }

    #[test]
    fn keys_have_independent_windows() {
        let throttle = LogThrottle::new(Duration::from_secs(60));

        assert_eq!(throttle.should_emit("a"), Some(0));
        assert_eq!(throttle.should_emit("b"), Some(0));
        assert_eq!(throttle.should_emit("a"), None);
    }
}
