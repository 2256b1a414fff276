use crate::config::constants::time::{NANOSECONDS_PER_MILLISECOND, NANOSECONDS_PER_SECOND};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    fn now_nanos(&self) -> u64;
    fn now_micros(&self) -> u64 {
        self.now_nanos() / 1000
    }
    fn now_millis(&self) -> u64 {
        self.now_nanos() / NANOSECONDS_PER_MILLISECOND
    }
}

/// Monotonic clock measured from provider creation
pub struct MonotonicTimeProvider {
    origin: Instant,
}

impl MonotonicTimeProvider {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MonotonicTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Mock time provider for deterministic testing
pub struct MockTimeProvider {
    current_time: AtomicU64,
}

impl MockTimeProvider {
    pub fn new(initial_time_nanos: u64) -> Self {
        Self {
            current_time: AtomicU64::new(initial_time_nanos),
        }
    }

    pub fn advance_by(&self, nanos: u64) {
        self.current_time.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance_by(millis * NANOSECONDS_PER_MILLISECOND);
    }

    pub fn set_time(&self, nanos: u64) {
        self.current_time.store(nanos, Ordering::Relaxed);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.current_time.load(Ordering::Relaxed)
    }
}

/// Deadline pacing for the external sampling loop
///
/// `poll` answers whether a tick is due and then moves the deadline forward by
/// exactly one interval, so a late loop catches up one tick per poll instead of
/// skipping samples.
#[derive(Debug, Clone)]
pub struct TickPacer {
    interval_nanos: u64,
    next_deadline_nanos: u64,
}

impl TickPacer {
    /// Pacer for a processing rate, first tick due at `start_nanos`
    pub fn new(rate_hz: u32, start_nanos: u64) -> Self {
        Self {
            interval_nanos: NANOSECONDS_PER_SECOND / rate_hz.max(1) as u64,
            next_deadline_nanos: start_nanos,
        }
    }

    pub fn interval_nanos(&self) -> u64 {
        self.interval_nanos
    }

    pub fn next_deadline_nanos(&self) -> u64 {
        self.next_deadline_nanos
    }

    /// Returns true when a tick is due at `now_nanos`
    pub fn poll(&mut self, now_nanos: u64) -> bool {
        if now_nanos < self.next_deadline_nanos {
            return false;
        }
        self.next_deadline_nanos += self.interval_nanos;
        true
    }

    /// Number of ticks the loop is behind at `now_nanos`, without consuming them
    pub fn backlog(&self, now_nanos: u64) -> u64 {
        if now_nanos < self.next_deadline_nanos {
            return 0;
        }
        (now_nanos - self.next_deadline_nanos) / self.interval_nanos + 1
    }

    /// Rebase on a new rate, keeping the pending deadline
    pub fn set_rate(&mut self, rate_hz: u32) {
        self.interval_nanos = NANOSECONDS_PER_SECOND / rate_hz.max(1) as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_time_provider() {
        let clock = MockTimeProvider::new(0);
        clock.advance_millis(10);
        assert_eq!(clock.now_millis(), 10);
        assert_eq!(clock.now_micros(), 10_000);

        clock.set_time(5 * NANOSECONDS_PER_SECOND);
        assert_eq!(clock.now_millis(), 5000);
    }

    #[test]
    fn test_monotonic_provider_advances() {
        let clock = MonotonicTimeProvider::new();
        let a = clock.now_nanos();
        let b = clock.now_nanos();
        assert!(b >= a);
    }

    #[test]
    fn test_pacer_waits_for_deadline() {
        let mut pacer = TickPacer::new(100, 1_000);
        assert!(!pacer.poll(999));
        assert!(pacer.poll(1_000));
        assert!(!pacer.poll(1_000 + 9_999_999));
        assert!(pacer.poll(1_000 + 10_000_000));
    }

    #[test]
    fn test_pacer_catches_up_one_tick_per_poll() {
        let mut pacer = TickPacer::new(100, 0);
        let late = 35_000_000; // 3.5 intervals late
        assert_eq!(pacer.backlog(late), 4);

        let mut due = 0;
        while pacer.poll(late) {
            due += 1;
        }
        assert_eq!(due, 4);
        assert_eq!(pacer.backlog(late), 0);
        assert_eq!(pacer.next_deadline_nanos(), 40_000_000);
    }

    #[test]
    fn test_pacer_zero_rate_is_clamped() {
        let pacer = TickPacer::new(0, 0);
        assert_eq!(pacer.interval_nanos(), NANOSECONDS_PER_SECOND);
    }
}
