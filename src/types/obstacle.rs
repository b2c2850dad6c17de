//! Obstacle value types: Position, Urgency, Obstacle

use serde::{Deserialize, Serialize};

// ============================================================================
// Position
// ============================================================================

/// Lateral placement of an obstacle relative to the walking direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
}

impl Position {
    /// Spoken phrase used in announcements.
    pub fn phrase(&self) -> &'static str {
        match self {
            Position::Left => "on your left",
            Position::Center => "ahead of you",
            Position::Right => "on your right",
        }
    }

    /// Parse from a wire field. Unknown values fall back to Center —
    /// a mislocated obstacle is safer than a dropped one.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "left" => Position::Left,
            "right" => Position::Right,
            _ => Position::Center,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Left => write!(f, "left"),
            Position::Center => write!(f, "center"),
            Position::Right => write!(f, "right"),
        }
    }
}

// ============================================================================
// Urgency
// ============================================================================

/// Qualitative hazard tier, driving both speech priority and haptic intensity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Numeric priority, lower = more urgent. Always derived from the tier,
    /// never stored independently.
    pub fn priority(&self) -> u8 {
        match self {
            Urgency::Critical => 0,
            Urgency::High => 1,
            Urgency::Medium => 2,
            Urgency::Low => 3,
        }
    }

    /// Parse from a wire field. Unknown values fall back to Medium.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => Urgency::Critical,
            "high" => Urgency::High,
            "low" => Urgency::Low,
            _ => Urgency::Medium,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Critical => write!(f, "critical"),
            Urgency::High => write!(f, "high"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::Low => write!(f, "low"),
        }
    }
}

// ============================================================================
// Obstacle
// ============================================================================

/// One detected hazard in a single frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obstacle {
    /// Free-text label from the vision service (e.g. "chair")
    pub name: String,
    /// Lateral placement in the frame
    pub position: Position,
    /// Estimated distance in meters, non-negative
    pub distance_meters: f64,
    /// Hazard tier
    pub urgency: Urgency,
}

impl Obstacle {
    /// Numeric priority of this obstacle (pure function of urgency).
    pub fn priority(&self) -> u8 {
        self.urgency.priority()
    }

    /// Human-readable distance bucket.
    pub fn distance_text(&self) -> String {
        if self.distance_meters < 1.0 {
            return "less than 1 meter".to_string();
        }
        let n = (self.distance_meters.round() as u64).max(1);
        if n == 1 {
            "about 1 meter".to_string()
        } else {
            format!("about {} meters", n)
        }
    }

    /// Spoken announcement for this obstacle.
    pub fn announcement(&self) -> String {
        format!(
            "{} {}, {}",
            self.name,
            self.position.phrase(),
            self.distance_text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle(distance: f64) -> Obstacle {
        Obstacle {
            name: "chair".to_string(),
            position: Position::Left,
            distance_meters: distance,
            urgency: Urgency::Medium,
        }
    }

    #[test]
    fn priority_is_pure_function_of_urgency() {
        assert_eq!(Urgency::Critical.priority(), 0);
        assert_eq!(Urgency::High.priority(), 1);
        assert_eq!(Urgency::Medium.priority(), 2);
        assert_eq!(Urgency::Low.priority(), 3);
    }

    #[test]
    fn distance_text_buckets() {
        assert_eq!(obstacle(0.4).distance_text(), "less than 1 meter");
        assert_eq!(obstacle(0.99).distance_text(), "less than 1 meter");
        assert_eq!(obstacle(1.0).distance_text(), "about 1 meter");
        assert_eq!(obstacle(1.2).distance_text(), "about 1 meter");
        assert_eq!(obstacle(2.4).distance_text(), "about 2 meters");
        assert_eq!(obstacle(6.0).distance_text(), "about 6 meters");
    }

    #[test]
    fn announcement_includes_position_phrase_and_distance() {
        let o = obstacle(2.5);
        assert_eq!(o.announcement(), "chair on your left, about 3 meters");
    }

    #[test]
    fn unknown_position_and_urgency_fall_back() {
        assert_eq!(Position::parse("behind??"), Position::Center);
        assert_eq!(Urgency::parse("extreme"), Urgency::Medium);
    }

    #[test]
    fn wire_fields_parse_case_insensitively() {
        assert_eq!(Position::parse(" LEFT "), Position::Left);
        assert_eq!(Urgency::parse("Critical"), Urgency::Critical);
    }
}
