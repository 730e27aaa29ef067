use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_FAILURES: usize = 5;
const WINDOW: Duration = Duration::from_secs(900); // 15 minutes

/// Per-IP failed-login throttle, shared across workers.
#[derive(Clone)]
pub struct LoginThrottle {
    failures: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
    max_failures: usize,
    window: Duration,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::with_limits(MAX_FAILURES, WINDOW)
    }
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_failures: usize, window: Duration) -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window,
        }
    }

    /// True once `ip` has used up its failures inside the window.
    /// Stale entries for `ip` are dropped on the way.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let Some(cutoff) = Instant::now().checked_sub(self.window) else {
            return map.get(&ip).is_some_and(|t| t.len() >= self.max_failures);
        };
        let blocked = match map.get_mut(&ip) {
            Some(timestamps) => {
                timestamps.retain(|t| *t > cutoff);
                timestamps.len() >= self.max_failures
            }
            None => return false,
        };
        if map.get(&ip).is_some_and(Vec::is_empty) {
            map.remove(&ip);
        }
        blocked
    }

    /// Record a failed login for `ip`. Every address whose failures have
    /// all left the window is forgotten, so the map only holds addresses
    /// with recent failures.
    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        if let Some(cutoff) = now.checked_sub(self.window) {
            map.retain(|_, timestamps| {
                timestamps.retain(|t| *t > cutoff);
                !timestamps.is_empty()
            });
        }
        map.entry(ip).or_default().push(now);
    }

    #[cfg(test)]
    fn tracked_ips(&self) -> usize {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Forget `ip` after a successful login.
    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_blocks_after_limit_and_clears() {
        let throttle = LoginThrottle::with_limits(3, Duration::from_secs(60));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        for _ in 0..2 {
            throttle.record_failure(ip);
        }
        assert!(!throttle.is_blocked(ip));
        throttle.record_failure(ip);
        assert!(throttle.is_blocked(ip));
        assert!(!throttle.is_blocked(other));

        throttle.clear(ip);
        assert!(!throttle.is_blocked(ip));
    }

    #[test]
    fn test_old_failures_expire() {
        let throttle = LoginThrottle::with_limits(1, Duration::from_millis(20));
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        throttle.record_failure(ip);
        assert!(throttle.is_blocked(ip));
        std::thread::sleep(Duration::from_millis(40));
        assert!(!throttle.is_blocked(ip));
        assert_eq!(throttle.tracked_ips(), 0);
    }

    #[test]
    fn test_stale_addresses_are_forgotten() {
        let throttle = LoginThrottle::with_limits(5, Duration::from_millis(200));
        for n in 0..=255u8 {
            throttle.record_failure(IpAddr::V4(Ipv4Addr::new(192, 0, 2, n)));
        }
        assert_eq!(throttle.tracked_ips(), 256);

        std::thread::sleep(Duration::from_millis(300));
        let last = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7));
        throttle.record_failure(last);
        assert_eq!(throttle.tracked_ips(), 1);
        assert!(!throttle.is_blocked(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))));
    }

    #[test]
    fn test_recent_failures_survive_pruning() {
        let throttle = LoginThrottle::with_limits(2, Duration::from_secs(60));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        throttle.record_failure(ip);
        throttle.record_failure(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        throttle.record_failure(ip);
        assert_eq!(throttle.tracked_ips(), 2);
        assert!(throttle.is_blocked(ip));
    }
}
