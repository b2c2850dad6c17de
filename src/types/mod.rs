//! Core value types: obstacles, detection snapshots, engine state

mod obstacle;
mod snapshot;
mod state;

pub use obstacle::{Obstacle, Position, Urgency};
pub use snapshot::{DetectionSnapshot, PathStatus};
pub use state::{EngineState, SensitivityLevel};
