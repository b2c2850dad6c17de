//! Per-obstacle announcement cooldown tracker

use crate::types::Position;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Throttle that prevents announcement spam by enforcing a per-obstacle
/// cooldown, keyed by (name, position).
///
/// The map accumulates one entry per distinct obstacle; growth is bounded
/// in practice by the small obstacle vocabulary and the engine clears it on
/// stop. Timestamps are injected by the caller so the window is testable
/// without sleeping.
pub struct AnnouncementThrottle {
    cooldown: Duration,
    last_announced: HashMap<(String, Position), Instant>,
}

impl AnnouncementThrottle {
    /// Create a new throttle with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_announced: HashMap::new(),
        }
    }

    /// Check whether this obstacle may be announced at `now`.
    ///
    /// Returns true if it was never announced, or the cooldown has expired.
    pub fn is_due(&self, name: &str, position: Position, now: Instant) -> bool {
        match self.last_announced.get(&(name.to_string(), position)) {
            None => true,
            Some(last) => now.duration_since(*last) >= self.cooldown,
        }
    }

    /// Record that the obstacle was announced at `now`.
    pub fn record(&mut self, name: &str, position: Position, now: Instant) {
        self.last_announced
            .insert((name.to_string(), position), now);
    }

    /// Forget all announcement history (engine stop).
    pub fn clear(&mut self) {
        self.last_announced.clear();
    }

    /// Number of tracked obstacles.
    pub fn len(&self) -> usize {
        self.last_announced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_announced.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_first_announcement() {
        let throttle = AnnouncementThrottle::new(Duration::from_secs(5));
        assert!(throttle.is_due("chair", Position::Left, Instant::now()));
    }

    #[test]
    fn suppresses_repeat_within_cooldown() {
        let mut throttle = AnnouncementThrottle::new(Duration::from_secs(5));
        let t0 = Instant::now();
        throttle.record("chair", Position::Left, t0);
        assert!(!throttle.is_due("chair", Position::Left, t0 + Duration::from_secs(3)));
    }

    #[test]
    fn allows_after_cooldown_expires() {
        let mut throttle = AnnouncementThrottle::new(Duration::from_secs(5));
        let t0 = Instant::now();
        throttle.record("chair", Position::Left, t0);
        assert!(throttle.is_due("chair", Position::Left, t0 + Duration::from_secs(6)));
    }

    #[test]
    fn same_name_different_position_is_distinct() {
        let mut throttle = AnnouncementThrottle::new(Duration::from_secs(5));
        let t0 = Instant::now();
        throttle.record("chair", Position::Left, t0);
        assert!(throttle.is_due("chair", Position::Right, t0));
    }

    #[test]
    fn clear_forgets_history() {
        let mut throttle = AnnouncementThrottle::new(Duration::from_secs(5));
        let t0 = Instant::now();
        throttle.record("chair", Position::Left, t0);
        assert_eq!(throttle.len(), 1);

        throttle.clear();
        assert!(throttle.is_empty());
        assert!(throttle.is_due("chair", Position::Left, t0));
    }
}
