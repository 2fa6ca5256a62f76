//! Timing utilities
//!
//! The client runs two independent periodic activities while playing: the
//! media-poll tick and the feedback-report tick. Both are driven by this
//! cooperative timer rather than a per-event thread.

use std::time::{Duration, Instant};

/// Timer for periodic operations
///
/// `try_fire` is polled from the scheduler loop; the timer never wakes
/// anything by itself.
pub struct Timer {
    interval: Duration,
    last_fire: Instant,
}

impl Timer {
    /// Create a new timer with the given interval, due immediately on the
    /// first poll
    pub fn new(interval: Duration) -> Self {
        Timer {
            interval,
            last_fire: Instant::now() - interval,
        }
    }

    /// Create a timer that first fires one full interval from now
    pub fn new_delayed(interval: Duration) -> Self {
        Timer {
            interval,
            last_fire: Instant::now(),
        }
    }

    /// Check if the timer has expired
    pub fn expired(&self) -> bool {
        self.last_fire.elapsed() >= self.interval
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.last_fire = Instant::now();
    }

    /// Get time until next expiration
    pub fn time_until_expiration(&self) -> Duration {
        let elapsed = self.last_fire.elapsed();
        if elapsed >= self.interval {
            Duration::ZERO
        } else {
            self.interval - elapsed
        }
    }

    /// Fire the timer if expired, returning true if it fired
    pub fn try_fire(&mut self) -> bool {
        if self.expired() {
            self.reset();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_timer_fires_immediately() {
        let mut timer = Timer::new(Duration::from_millis(10));
        assert!(timer.try_fire());
        assert!(!timer.try_fire());
    }

    #[test]
    fn test_delayed_timer_waits_one_interval() {
        let mut timer = Timer::new_delayed(Duration::from_millis(10));
        assert!(!timer.try_fire());

        thread::sleep(Duration::from_millis(11));
        assert!(timer.try_fire());
    }

    #[test]
    fn test_timer_rearms_after_fire() {
        let mut timer = Timer::new(Duration::from_millis(10));
        assert!(timer.try_fire());

        thread::sleep(Duration::from_millis(11));
        assert!(timer.expired());
        assert!(timer.try_fire());
        assert!(!timer.expired());
    }

    #[test]
    fn test_time_until_expiration() {
        let mut timer = Timer::new(Duration::from_millis(50));
        timer.reset();
        let remaining = timer.time_until_expiration();
        assert!(remaining > Duration::ZERO);
        assert!(remaining <= Duration::from_millis(50));
    }
}
