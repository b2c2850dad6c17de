//! Named defaults for every tunable value.
//!
//! Each constant backs a `#[serde(default)]` field so behavior is identical
//! whether or not a config file is present.

/// Time between analysis ticks (milliseconds).
pub const ANALYSIS_INTERVAL_MS: u64 = 1500;

/// Minimum time between repeated announcements of the same obstacle at the
/// same position (seconds).
pub const ANNOUNCEMENT_COOLDOWN_SECS: u64 = 5;

/// Default sensitivity level name.
pub const SENSITIVITY: &str = "medium";

/// Vision bridge request timeout (seconds).
pub const VISION_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Prompt sent with every frame. Pins the reply to the line protocol the
/// parser understands.
pub const VISION_PROMPT: &str = "You are guiding a blind pedestrian. Describe the walkable path \
in the image. Answer in exactly this format:\n\
PATH_STATUS: clear|caution|blocked\n\
OBSTACLES: none, or one line per obstacle as - name|distance in meters|left/center/right|critical/high/medium/low\n\
GUIDANCE: one short walking instruction";

/// Capacity of the engine's observer event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;
