//! Sightline: walking-guidance intelligence for visually-impaired pedestrians.
//!
//! A timer-driven engine samples a forward-facing camera, sends frames to an
//! external vision-language description service, parses the free-text reply
//! into a structured obstacle snapshot, and turns that snapshot into
//! time-gated spoken and haptic guidance.
//!
//! ## Architecture
//!
//! - **Types**: immutable obstacle / snapshot value types
//! - **Perception**: frame acquisition and the tolerant reply parser
//! - **Guidance Engine**: operating state machine and the capture/analyze loop
//! - **Announcement Pipeline**: cooldown-gated speech and haptic selection

pub mod config;
pub mod guidance;
pub mod output;
pub mod perception;
pub mod types;

// Re-export configuration
pub use config::GuidanceConfig;

// Re-export commonly used types
pub use types::{
    DetectionSnapshot, EngineState, Obstacle, PathStatus, Position, SensitivityLevel, Urgency,
};

// Re-export the engine and its observer surface
pub use guidance::{EngineEvent, EngineStats, GuidanceEngine, GuidanceError};

// Re-export the announcement pipeline pieces
pub use guidance::announcer::{Announcer, TickOutput};
pub use guidance::haptics;
pub use guidance::throttle::AnnouncementThrottle;

// Re-export collaborator interfaces and stock implementations
pub use output::{ConsoleHaptics, ConsoleSpeech, HapticOutput, SpeechOutput};
pub use perception::{
    parser, Frame, FrameSource, HttpVisionClient, ScriptedVisionClient, SimulatedCamera,
    VisionQueryClient,
};
