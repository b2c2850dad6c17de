//! DetectionSnapshot: the full result of one analysis tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Obstacle, Urgency};

/// Obstacles included in the spoken full announcement.
const FULL_ANNOUNCEMENT_LIMIT: usize = 3;

// ============================================================================
// Path Status
// ============================================================================

/// Overall walkability of the path ahead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    Clear,
    Caution,
    Blocked,
    #[default]
    Unknown,
}

impl PathStatus {
    /// Parse from a wire field (lower-cased). Anything unrecognized is Unknown.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "clear" => PathStatus::Clear,
            "caution" => PathStatus::Caution,
            "blocked" => PathStatus::Blocked,
            _ => PathStatus::Unknown,
        }
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStatus::Clear => write!(f, "clear"),
            PathStatus::Caution => write!(f, "caution"),
            PathStatus::Blocked => write!(f, "blocked"),
            PathStatus::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Detection Snapshot
// ============================================================================

/// The full result of one analysis pass.
///
/// Created fresh on every tick and replaced wholesale, never mutated. The
/// previous snapshot is retained by the engine only as "last known" state
/// for repeat-on-demand and observer display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSnapshot {
    /// Detected obstacles in parser emission order (not priority order)
    pub obstacles: Vec<Obstacle>,
    /// Overall path walkability
    pub path_status: PathStatus,
    /// One short natural-language instruction from the vision service
    pub guidance_text: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl DetectionSnapshot {
    pub fn new(obstacles: Vec<Obstacle>, path_status: PathStatus, guidance_text: String) -> Self {
        Self {
            obstacles,
            path_status,
            guidance_text,
            timestamp: Utc::now(),
        }
    }

    /// True when the path is clear.
    pub fn is_safe(&self) -> bool {
        self.path_status == PathStatus::Clear
    }

    /// True when any obstacle is critical-urgency.
    pub fn has_critical(&self) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.urgency == Urgency::Critical)
    }

    /// The obstacle with the lowest priority value. Ties break on first
    /// occurrence in parser emission order.
    pub fn most_urgent(&self) -> Option<&Obstacle> {
        self.obstacles.iter().min_by_key(|o| o.priority())
    }

    /// Obstacles in stable ascending priority order.
    pub fn sorted_by_priority(&self) -> Vec<Obstacle> {
        let mut sorted = self.obstacles.clone();
        sorted.sort_by_key(|o| o.priority());
        sorted
    }

    /// Spoken summary: up to three highest-priority obstacle announcements
    /// followed by the guidance text.
    pub fn full_announcement(&self) -> String {
        let mut parts: Vec<String> = self
            .sorted_by_priority()
            .iter()
            .take(FULL_ANNOUNCEMENT_LIMIT)
            .map(Obstacle::announcement)
            .collect();
        if !self.guidance_text.is_empty() {
            parts.push(self.guidance_text.clone());
        }
        parts.join(". ")
    }
}
