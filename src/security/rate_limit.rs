//! Sliding-window request tracking per client and route.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Routes tracked independently per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Download,
    Raw,
}

/// One recorded request.
#[derive(Debug, Clone, Copy)]
struct Event {
    at: Instant,
    route: Route,
}

/// Tracks request events per client address over a trailing window and
/// answers "is this client over the limit" queries.
///
/// One mutex guards the whole map; append, prune, and count happen in a
/// single critical section so concurrent requests for the same client
/// never lose events. State is memory-resident only and resets with the
/// process.
pub struct RateTracker {
    window: Duration,
    clients: Mutex<HashMap<IpAddr, Vec<Event>>>,
}

impl RateTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record the current request for `client`/`route` and report whether
    /// the window now holds more than `limit` events for that route.
    ///
    /// Fail-open: if the lock is poisoned the request is served
    /// unthrottled rather than refused.
    pub fn should_throttle(&self, client: IpAddr, route: Route, limit: u32) -> bool {
        let now = Instant::now();
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::error!("Rate tracker lock poisoned, serving unthrottled");
                return false;
            }
        };
        let log = clients.entry(client).or_default();
        log.push(Event { at: now, route });
        let window = self.window;
        log.retain(|e| now.duration_since(e.at) < window);
        let count = log.iter().filter(|e| e.route == route).count() as u32;
        count > limit
    }

    /// Drop client keys whose logs are empty after pruning. Called
    /// periodically so long uptimes with high client churn do not grow
    /// the map without bound.
    pub fn sweep(&self) {
        let now = Instant::now();
        let Ok(mut clients) = self.clients.lock() else {
            return;
        };
        let window = self.window;
        clients.retain(|_, log| {
            log.retain(|e| now.duration_since(e.at) < window);
            !log.is_empty()
        });
    }

    /// Number of client keys currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn client(n: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, n))
    }

    #[test]
    fn throttles_only_past_the_limit() {
        let tracker = RateTracker::new(Duration::from_secs(300));
        for _ in 0..5 {
            assert!(!tracker.should_throttle(client(1), Route::Download, 5));
        }
        assert!(tracker.should_throttle(client(1), Route::Download, 5));
    }

    #[test]
    fn routes_are_tracked_independently() {
        let tracker = RateTracker::new(Duration::from_secs(300));
        for _ in 0..5 {
            tracker.should_throttle(client(1), Route::Download, 5);
        }
        assert!(tracker.should_throttle(client(1), Route::Download, 5));
        // Raw route for the same client starts from zero.
        assert!(!tracker.should_throttle(client(1), Route::Raw, 30));
    }

    #[test]
    fn clients_are_tracked_independently() {
        let tracker = RateTracker::new(Duration::from_secs(300));
        for _ in 0..6 {
            tracker.should_throttle(client(1), Route::Download, 5);
        }
        assert!(!tracker.should_throttle(client(2), Route::Download, 5));
    }

    #[test]
    fn events_expire_out_of_the_window() {
        let tracker = RateTracker::new(Duration::from_millis(50));
        for _ in 0..6 {
            tracker.should_throttle(client(1), Route::Download, 5);
        }
        assert!(tracker.should_throttle(client(1), Route::Download, 5));
        std::thread::sleep(Duration::from_millis(60));
        // Window has rolled past every earlier event.
        assert!(!tracker.should_throttle(client(1), Route::Download, 5));
    }

    #[test]
    fn sweep_drops_idle_client_keys() {
        let tracker = RateTracker::new(Duration::from_millis(20));
        tracker.should_throttle(client(1), Route::Download, 5);
        tracker.should_throttle(client(2), Route::Raw, 30);
        assert_eq!(tracker.tracked_clients(), 2);

        std::thread::sleep(Duration::from_millis(30));
        tracker.sweep();
        assert_eq!(tracker.tracked_clients(), 0);
    }

    #[test]
    fn poisoned_lock_serves_unthrottled() {
        let tracker = std::sync::Arc::new(RateTracker::new(Duration::from_secs(300)));
        let poisoner = tracker.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.clients.lock().unwrap();
            panic!("poison the tracker lock");
        })
        .join();

        // Tracking is broken, so serving must not be: never throttled,
        // even far past the limit.
        for _ in 0..10 {
            assert!(!tracker.should_throttle(client(1), Route::Download, 2));
        }
        assert_eq!(tracker.tracked_clients(), 0);
    }

    #[test]
    fn concurrent_same_client_requests_lose_no_events() {
        let tracker = std::sync::Arc::new(RateTracker::new(Duration::from_secs(300)));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = tracker.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    tracker.should_throttle(client(1), Route::Raw, 1000);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // 200 recorded events: the 201st call pushes past limit 200.
        assert!(tracker.should_throttle(client(1), Route::Raw, 200));
    }
}
