//! Camera frame handle and source abstraction.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;

/// One captured camera frame.
///
/// Frames are scoped to a single tick: captured, handed to the vision
/// client, and dropped as soon as the call returns. Holding a frame across
/// ticks is a bug.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Capture time
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            captured_at: Utc::now(),
        }
    }
}

/// Trait abstracting where frames come from.
///
/// The real implementation wraps the platform camera driver; tests and the
/// simulation mode supply synthetic sources.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Cheap readiness probe used by `start()`. A source that cannot
    /// deliver frames must fail here so the engine can refuse to start.
    async fn ensure_ready(&self) -> Result<()>;

    /// Capture a single frame. May fail transiently (device busy).
    async fn capture_frame(&self) -> Result<Frame>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}

// ============================================================================
// Simulated Camera
// ============================================================================

/// Default payload size for simulated frames.
const SIMULATED_FRAME_LEN: usize = 64;

/// Synthetic camera used by `--simulate` and tests. Produces small random
/// payloads so no two frames compare equal.
pub struct SimulatedCamera {
    frame_len: usize,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self {
            frame_len: SIMULATED_FRAME_LEN,
        }
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for SimulatedCamera {
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn capture_frame(&self) -> Result<Frame> {
        let mut data = vec![0u8; self.frame_len];
        rand::thread_rng().fill_bytes(&mut data);
        Ok(Frame::new(data))
    }

    fn source_name(&self) -> &str {
        "simulated-camera"
    }
}
