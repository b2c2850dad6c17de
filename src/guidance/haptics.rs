//! Distance-to-vibration encoding.
//!
//! Patterns are pulse durations in milliseconds, alternating
//! vibrate/pause. The encoder is applied to the most urgent obstacle's
//! distance, never an average.

/// Fixed pattern for snapshots containing a critical hazard.
pub const CRITICAL_PATTERN: [u64; 5] = [200, 50, 200, 50, 200];

/// Short confirmation pulse for start/resume transitions.
pub const CONFIRM_PATTERN: [u64; 1] = [80];

/// Light pulse for pause/stop transitions.
pub const LIGHT_PATTERN: [u64; 1] = [40];

/// Map obstacle distance to a vibration pattern.
pub fn encode(distance_meters: f64) -> Vec<u64> {
    if distance_meters < 1.0 {
        CRITICAL_PATTERN.to_vec()
    } else if distance_meters < 2.0 {
        vec![100, 100, 100]
    } else if distance_meters < 4.0 {
        vec![50]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_deterministic_at_band_edges() {
        assert_eq!(encode(0.0), vec![200, 50, 200, 50, 200]);
        assert_eq!(encode(0.9), vec![200, 50, 200, 50, 200]);
        assert_eq!(encode(1.0), vec![100, 100, 100]);
        assert_eq!(encode(1.9), vec![100, 100, 100]);
        assert_eq!(encode(2.0), vec![50]);
        assert_eq!(encode(3.9), vec![50]);
        assert_eq!(encode(4.0), Vec::<u64>::new());
        assert_eq!(encode(10.0), Vec::<u64>::new());
    }
}
