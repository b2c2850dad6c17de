//! Vision reply parser.
//!
//! The description service answers in a small line-oriented protocol, not
//! JSON:
//!
//! ```text
//! PATH_STATUS: caution
//! OBSTACLES:
//! - chair|2.5|left|medium
//! - table|1.0|center|critical
//! GUIDANCE: Stop, go left.
//! ```
//!
//! Because the reply is model output, parsing never fails: malformed
//! records are skipped, unrecognized lines are ignored, and a completely
//! unusable reply degrades to an Unknown-status snapshot with a generic
//! guidance string.

use crate::types::{DetectionSnapshot, Obstacle, PathStatus, Position, SensitivityLevel, Urgency};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Guidance spoken when the reply carries no usable GUIDANCE line.
pub const FALLBACK_GUIDANCE: &str = "Unable to read the path. Please try again.";

/// Distance assumed when the distance field has no numeric content.
const DEFAULT_DISTANCE_METERS: f64 = 5.0;

fn distance_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("static distance regex"))
}

/// Parse a raw vision reply into a snapshot, dropping obstacles beyond the
/// active sensitivity cutoff.
pub fn parse(raw: &str, sensitivity: SensitivityLevel) -> DetectionSnapshot {
    let mut path_status = PathStatus::Unknown;
    let mut guidance: Option<String> = None;
    let mut obstacles: Vec<Obstacle> = Vec::new();
    let mut in_obstacles = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("PATH_STATUS:") {
            path_status = PathStatus::parse(rest);
            in_obstacles = false;
        } else if let Some(rest) = line.strip_prefix("GUIDANCE:") {
            let text = rest.trim();
            if !text.is_empty() {
                guidance = Some(text.to_string());
            }
            in_obstacles = false;
        } else if let Some(rest) = line.strip_prefix("OBSTACLES:") {
            // An inline "none" closes the section with zero obstacles.
            in_obstacles = !rest.to_lowercase().contains("none");
        } else if in_obstacles && line.starts_with('-') {
            match parse_record(&line[1..]) {
                Some(obstacle) => obstacles.push(obstacle),
                None => debug!(line = %line, "Skipping malformed obstacle record"),
            }
        }
        // Anything else is ignored.
    }

    let obstacles = filter_by_sensitivity(obstacles, sensitivity);

    DetectionSnapshot::new(
        obstacles,
        path_status,
        guidance.unwrap_or_else(|| FALLBACK_GUIDANCE.to_string()),
    )
}

/// Drop obstacles farther than the sensitivity cutoff.
///
/// The parser applies this as part of its single pass; it is exposed
/// separately for callers that re-filter an existing obstacle list.
pub fn filter_by_sensitivity(
    obstacles: Vec<Obstacle>,
    sensitivity: SensitivityLevel,
) -> Vec<Obstacle> {
    let cutoff = sensitivity.max_distance_meters();
    obstacles
        .into_iter()
        .filter(|o| o.distance_meters <= cutoff)
        .collect()
}

/// Parse one `name|distance|position|urgency` record (text after the `-`).
///
/// Returns None when the record does not split into exactly four fields or
/// the name is empty.
fn parse_record(s: &str) -> Option<Obstacle> {
    let fields: Vec<&str> = s.split('|').map(str::trim).collect();
    if fields.len() != 4 {
        return None;
    }
    let name = fields[0];
    if name.is_empty() {
        return None;
    }

    Some(Obstacle {
        name: name.to_string(),
        distance_meters: extract_distance(fields[1]),
        position: Position::parse(fields[2]),
        urgency: Urgency::parse(fields[3]),
    })
}

/// First run of digits-and-dot in the field; 5.0 when absent or unparsable.
fn extract_distance(field: &str) -> f64 {
    distance_regex()
        .find(field)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(DEFAULT_DISTANCE_METERS)
}
