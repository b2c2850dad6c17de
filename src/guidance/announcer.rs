//! Announcement & haptic pipeline: one snapshot in, at most one spoken
//! string and one vibration pattern out.
//!
//! ## Two-tier design
//!
//! Critical hazards bypass all cooldown logic and always produce the full
//! multi-obstacle announcement — a dangerous hazard is never silenced by
//! deduplication. Routine obstacles are cooldown-gated per (name, position)
//! so a bench five meters away is not repeated every tick.

use super::haptics;
use super::throttle::AnnouncementThrottle;
use crate::types::{DetectionSnapshot, Obstacle, PathStatus};
use std::time::{Duration, Instant};
use tracing::debug;

/// Max obstacles spoken in a routine (non-critical) announcement.
const ROUTINE_ANNOUNCEMENT_LIMIT: usize = 2;

/// Output of one pipeline pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    /// Text for the speech collaborator, if anything is worth saying
    pub spoken: Option<String>,
    /// Vibration pattern for the haptic collaborator
    pub haptic: Option<Vec<u64>>,
}

/// Stateful announcement pipeline. Owns the cooldown map exclusively.
pub struct Announcer {
    throttle: AnnouncementThrottle,
}

impl Announcer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            throttle: AnnouncementThrottle::new(cooldown),
        }
    }

    /// Forget all cooldown history (engine stop).
    pub fn clear_history(&mut self) {
        self.throttle.clear();
    }

    /// Process one snapshot.
    ///
    /// `prev_status` is the previous snapshot's path status, used to speak
    /// "path clear" guidance only on the transition into Clear rather than
    /// every tick.
    pub fn process(
        &mut self,
        snapshot: &DetectionSnapshot,
        prev_status: Option<PathStatus>,
        now: Instant,
    ) -> TickOutput {
        // Tier 1: critical hazards skip deduplication entirely.
        if snapshot.has_critical() {
            debug!(
                obstacles = snapshot.obstacles.len(),
                "Critical hazard — bypassing cooldown"
            );
            return TickOutput {
                spoken: Some(snapshot.full_announcement()),
                haptic: Some(haptics::CRITICAL_PATTERN.to_vec()),
            };
        }

        // Tier 2: obstacles never announced, or last announced before the
        // cooldown window.
        let new_obstacles: Vec<&Obstacle> = snapshot
            .obstacles
            .iter()
            .filter(|o| self.throttle.is_due(&o.name, o.position, now))
            .collect();

        if new_obstacles.is_empty() {
            // Nothing new: speak the guidance once when the path clears,
            // stay silent otherwise.
            if snapshot.path_status == PathStatus::Clear && prev_status != Some(PathStatus::Clear)
            {
                return TickOutput {
                    spoken: Some(snapshot.guidance_text.clone()),
                    haptic: None,
                };
            }
            return TickOutput::default();
        }

        // Haptic follows the most urgent obstacle of the FULL list, not
        // just the new ones.
        let haptic = snapshot
            .most_urgent()
            .map(|o| haptics::encode(o.distance_meters))
            .filter(|pattern| !pattern.is_empty());

        let mut by_priority = new_obstacles.clone();
        by_priority.sort_by_key(|o| o.priority());
        let spoken = by_priority
            .iter()
            .take(ROUTINE_ANNOUNCEMENT_LIMIT)
            .map(|o| o.announcement())
            .collect::<Vec<_>>()
            .join(". ");

        // Every new obstacle enters the cooldown window, spoken or not.
        for obstacle in &new_obstacles {
            self.throttle.record(&obstacle.name, obstacle.position, now);
        }

        TickOutput {
            spoken: Some(spoken),
            haptic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, Urgency};

    const COOLDOWN: Duration = Duration::from_secs(5);

    fn obstacle(name: &str, position: Position, distance: f64, urgency: Urgency) -> Obstacle {
        Obstacle {
            name: name.to_string(),
            position,
            distance_meters: distance,
            urgency,
        }
    }

    fn caution(obstacles: Vec<Obstacle>) -> DetectionSnapshot {
        DetectionSnapshot::new(obstacles, PathStatus::Caution, "Proceed slowly.".to_string())
    }

    fn clear() -> DetectionSnapshot {
        DetectionSnapshot::new(Vec::new(), PathStatus::Clear, "Path is clear.".to_string())
    }

    #[test]
    fn first_sighting_is_announced() {
        let mut announcer = Announcer::new(COOLDOWN);
        let snap = caution(vec![obstacle("chair", Position::Left, 2.5, Urgency::Medium)]);

        let out = announcer.process(&snap, None, Instant::now());
        assert_eq!(
            out.spoken.as_deref(),
            Some("chair on your left, about 3 meters")
        );
        assert_eq!(out.haptic, Some(vec![50]));
    }

    #[test]
    fn repeat_within_cooldown_is_suppressed() {
        let mut announcer = Announcer::new(COOLDOWN);
        let snap = caution(vec![obstacle("chair", Position::Left, 2.5, Urgency::Medium)]);
        let t0 = Instant::now();

        let first = announcer.process(&snap, None, t0);
        assert!(first.spoken.is_some());

        let second = announcer.process(&snap, Some(PathStatus::Caution), t0 + Duration::from_secs(3));
        assert_eq!(second, TickOutput::default());

        let third = announcer.process(&snap, Some(PathStatus::Caution), t0 + Duration::from_secs(6));
        assert!(third.spoken.is_some());
    }

    #[test]
    fn critical_bypasses_cooldown_entirely() {
        let mut announcer = Announcer::new(COOLDOWN);
        let snap = DetectionSnapshot::new(
            vec![obstacle("table", Position::Center, 1.0, Urgency::Critical)],
            PathStatus::Blocked,
            "Stop, go left.".to_string(),
        );
        let t0 = Instant::now();

        let first = announcer.process(&snap, None, t0);
        let second = announcer.process(&snap, Some(PathStatus::Blocked), t0 + Duration::from_secs(1));

        for out in [&first, &second] {
            let spoken = out.spoken.as_deref().unwrap();
            assert!(spoken.contains("table ahead of you"));
            assert!(spoken.ends_with("Stop, go left."));
            assert_eq!(out.haptic.as_deref(), Some(&haptics::CRITICAL_PATTERN[..]));
        }
    }

    #[test]
    fn clear_path_is_spoken_once() {
        let mut announcer = Announcer::new(COOLDOWN);
        let t0 = Instant::now();

        let first = announcer.process(&clear(), Some(PathStatus::Caution), t0);
        assert_eq!(first.spoken.as_deref(), Some("Path is clear."));
        assert!(first.haptic.is_none());

        let second = announcer.process(&clear(), Some(PathStatus::Clear), t0 + Duration::from_secs(2));
        assert_eq!(second, TickOutput::default());
    }

    #[test]
    fn silent_when_nothing_new_and_path_not_clear() {
        let mut announcer = Announcer::new(COOLDOWN);
        let snap = DetectionSnapshot::new(
            Vec::new(),
            PathStatus::Caution,
            "Proceed slowly.".to_string(),
        );
        let out = announcer.process(&snap, Some(PathStatus::Caution), Instant::now());
        assert_eq!(out, TickOutput::default());
    }

    #[test]
    fn haptic_follows_most_urgent_of_full_list() {
        let mut announcer = Announcer::new(COOLDOWN);
        let t0 = Instant::now();

        // First pass announces the close high-urgency chair.
        let snap1 = caution(vec![obstacle("chair", Position::Left, 0.5, Urgency::High)]);
        announcer.process(&snap1, None, t0);

        // One second later a far bench appears. Only the bench is new, but
        // the haptic encodes the chair's distance.
        let snap2 = caution(vec![
            obstacle("chair", Position::Left, 0.5, Urgency::High),
            obstacle("bench", Position::Right, 3.0, Urgency::Low),
        ]);
        let out = announcer.process(&snap2, Some(PathStatus::Caution), t0 + Duration::from_secs(1));

        let spoken = out.spoken.unwrap();
        assert!(spoken.contains("bench"));
        assert!(!spoken.contains("chair"));
        assert_eq!(out.haptic.as_deref(), Some(&haptics::CRITICAL_PATTERN[..]));
    }

    #[test]
    fn routine_announcement_caps_at_two_obstacles() {
        let mut announcer = Announcer::new(COOLDOWN);
        let snap = caution(vec![
            obstacle("bench", Position::Right, 3.0, Urgency::Low),
            obstacle("door", Position::Center, 2.0, Urgency::High),
            obstacle("chair", Position::Left, 2.5, Urgency::Medium),
        ]);

        let out = announcer.process(&snap, None, Instant::now());
        let spoken = out.spoken.unwrap();

        // Two highest-priority obstacles spoken; the low-urgency bench is not.
        assert!(spoken.contains("door"));
        assert!(spoken.contains("chair"));
        assert!(!spoken.contains("bench"));
    }

    #[test]
    fn unspoken_new_obstacles_still_enter_cooldown() {
        let mut announcer = Announcer::new(COOLDOWN);
        let t0 = Instant::now();
        let snap = caution(vec![
            obstacle("bench", Position::Right, 3.0, Urgency::Low),
            obstacle("door", Position::Center, 2.0, Urgency::High),
            obstacle("chair", Position::Left, 2.5, Urgency::Medium),
        ]);
        announcer.process(&snap, None, t0);

        // The bench was recorded even though it was not spoken.
        let again = caution(vec![obstacle("bench", Position::Right, 3.0, Urgency::Low)]);
        let out = announcer.process(&again, Some(PathStatus::Caution), t0 + Duration::from_secs(1));
        assert_eq!(out, TickOutput::default());
    }

    #[test]
    fn parsed_critical_reply_announces_everything_immediately() {
        use crate::perception::parser;
        use crate::types::SensitivityLevel;

        let raw = "PATH_STATUS: caution\nOBSTACLES:\n- chair|2.5|left|medium\n- table|1.0|center|critical\nGUIDANCE: Stop, go left.";
        let snap = parser::parse(raw, SensitivityLevel::Medium);
        assert!(snap.has_critical());

        let mut announcer = Announcer::new(COOLDOWN);
        let out = announcer.process(&snap, None, Instant::now());

        let spoken = out.spoken.unwrap();
        assert!(spoken.starts_with("table ahead of you, about 1 meter"));
        assert!(spoken.contains("chair on your left"));
        assert!(spoken.ends_with("Stop, go left."));
        assert_eq!(out.haptic.as_deref(), Some(&haptics::CRITICAL_PATTERN[..]));
    }

    #[test]
    fn no_haptic_when_most_urgent_is_out_of_range() {
        let mut announcer = Announcer::new(COOLDOWN);
        let snap = caution(vec![obstacle("sign", Position::Right, 4.0, Urgency::Low)]);

        let out = announcer.process(&snap, None, Instant::now());
        assert!(out.spoken.is_some());
        assert!(out.haptic.is_none());
    }
}
