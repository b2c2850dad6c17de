//! Speech and haptic output collaborators.
//!
//! Both sinks are fire-and-forget from the engine's perspective: no return
//! value is consumed and no failure propagates back into the tick.

use tracing::info;

/// Text-to-speech sink.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

/// Vibration sink. Patterns are pulse durations in milliseconds,
/// alternating vibrate/pause.
pub trait HapticOutput: Send + Sync {
    fn vibrate(&self, pattern: &[u64]);
}

/// Logs spoken output — stands in for the platform TTS layer in the CLI.
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) {
        info!(target: "sightline::speech", "🔊 {}", text);
    }
}

/// Logs vibration patterns — stands in for the platform haptic driver.
pub struct ConsoleHaptics;

impl HapticOutput for ConsoleHaptics {
    fn vibrate(&self, pattern: &[u64]) {
        if pattern.is_empty() {
            return;
        }
        info!(target: "sightline::haptics", "📳 vibrate {:?} ms", pattern);
    }
}
