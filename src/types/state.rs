//! Engine operating state and user-facing sensitivity levels

use serde::{Deserialize, Serialize};

// ============================================================================
// Engine State
// ============================================================================

/// Operating state of the guidance engine.
///
/// Transitions: Idle → Active → {Paused ⇄ Active} → Idle. Stop always
/// returns to Idle from any running state. The mid-analysis condition is a
/// guard flag on the engine, not a state of its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum EngineState {
    #[default]
    Idle,
    Active,
    Paused,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Idle => write!(f, "Idle"),
            EngineState::Active => write!(f, "Active"),
            EngineState::Paused => write!(f, "Paused"),
        }
    }
}

// ============================================================================
// Sensitivity Level
// ============================================================================

/// User-configurable maximum distance at which obstacles are reported at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl SensitivityLevel {
    /// Obstacles farther than this are dropped before announcement.
    pub fn max_distance_meters(&self) -> f64 {
        match self {
            SensitivityLevel::Low => 2.0,
            SensitivityLevel::Medium => 4.0,
            SensitivityLevel::High => 10.0,
        }
    }
}

/// Parses the CLI/config level names, case-insensitively.
impl std::str::FromStr for SensitivityLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(SensitivityLevel::Low),
            "medium" | "med" => Ok(SensitivityLevel::Medium),
            "high" => Ok(SensitivityLevel::High),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensitivityLevel::Low => write!(f, "low"),
            SensitivityLevel::Medium => write!(f, "medium"),
            SensitivityLevel::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_cutoffs() {
        assert_eq!(SensitivityLevel::Low.max_distance_meters(), 2.0);
        assert_eq!(SensitivityLevel::Medium.max_distance_meters(), 4.0);
        assert_eq!(SensitivityLevel::High.max_distance_meters(), 10.0);
    }

    #[test]
    fn sensitivity_parses_from_level_names() {
        assert_eq!("HIGH".parse(), Ok(SensitivityLevel::High));
        assert_eq!("med".parse(), Ok(SensitivityLevel::Medium));
        assert_eq!(" low ".parse(), Ok(SensitivityLevel::Low));
        assert_eq!("extreme".parse::<SensitivityLevel>(), Err(()));
    }
}
