// Consumer-facing signal types
//
// The engine publishes two continuous values (amplitude and speech
// probability) and one discrete event stream (beats). These types are the
// entire read-only surface the UI layer sees; engine-internal state is
// never exposed for mutation.

use serde::{Deserialize, Serialize};

/// A detected beat pulse. Carries no payload; the moment of delivery is
/// the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatEvent;

/// Point-in-time snapshot of the continuous signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// Last published RMS loudness in [0, 1]
    pub amplitude: f32,
    /// Smoothed speech-vs-music likelihood in [0, 1]
    pub speech_probability: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_to_silence() {
        let snapshot = SignalSnapshot::default();
        assert_eq!(snapshot.amplitude, 0.0);
        assert_eq!(snapshot.speech_probability, 0.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = SignalSnapshot {
            amplitude: 0.5,
            speech_probability: 0.25,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SignalSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
