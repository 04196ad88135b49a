// BeatDetector - spectral-flux onset detection
//
// Algorithm, per tick:
// 1. flux = sum of bin magnitudes (total spectral energy)
// 2. d_flux = (flux - last_flux) / (flux + epsilon), a relative rise so the
//    trigger level is self-normalizing across quiet and loud passages
// 3. A beat fires when d_flux exceeds the rise threshold AND the refractory
//    window since the previous beat has elapsed. The refractory period
//    models the perceptual limit on distinguishable pulses and suppresses
//    chatter on sustained loud passages.
//
// last_flux is overwritten unconditionally every tick, whether or not a
// beat fires.

use std::time::{Duration, Instant};

use crate::config::BeatConfig;

/// Epsilon in the flux ratio denominator, guarding the all-silent case.
const FLUX_EPSILON: f64 = 1e-6;

/// Spectral-flux beat detector with a fixed refractory window.
///
/// Stateful across ticks; the engine serializes calls behind its spectral
/// lock. Time is injected per call so tests can drive the refractory
/// window deterministically.
pub struct BeatDetector {
    rise_threshold: f64,
    refractory: Duration,
    last_flux: f64,
    last_beat: Option<Instant>,
}

impl BeatDetector {
    pub fn new(config: &BeatConfig) -> Self {
        Self {
            rise_threshold: f64::from(config.flux_rise_threshold),
            refractory: Duration::from_millis(config.refractory_ms),
            last_flux: 0.0,
            last_beat: None,
        }
    }

    /// Process one tick of bin magnitudes.
    ///
    /// Returns `true` when a beat fires. A detector that has never fired
    /// treats the refractory window as already elapsed, so a fresh session
    /// may fire on its first energetic tick.
    pub fn process(&mut self, magnitudes: &[f64], now: Instant) -> bool {
        let flux: f64 = magnitudes.iter().sum();
        let d_flux = (flux - self.last_flux) / (flux + FLUX_EPSILON);
        self.last_flux = flux;

        if d_flux <= self.rise_threshold {
            return false;
        }

        let refractory_elapsed = match self.last_beat {
            Some(last) => now.saturating_duration_since(last) > self.refractory,
            None => true,
        };

        if refractory_elapsed {
            self.last_beat = Some(now);
            true
        } else {
            false
        }
    }

    /// The flux retained from the previous tick (delta baseline).
    pub fn last_flux(&self) -> f64 {
        self.last_flux
    }

    /// Reset flux baseline and beat-timing history to defaults.
    pub fn reset(&mut self) {
        self.last_flux = 0.0;
        self.last_beat = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> BeatDetector {
        BeatDetector::new(&BeatConfig::default())
    }

    fn uniform(level: f64, bins: usize) -> Vec<f64> {
        vec![level; bins]
    }

    #[test]
    fn test_first_energetic_tick_fires() {
        let mut det = detector();
        // Fresh baseline is zero, so any energy is a full relative jump
        assert!(det.process(&uniform(10.0, 16), Instant::now()));
    }

    #[test]
    fn test_rise_above_threshold_fires_once() {
        let mut det = detector();
        let t0 = Instant::now();
        det.process(&uniform(10.0, 16), t0);

        // 10 -> 20 doubles the flux: d_flux = 0.5 > 0.08
        let t1 = t0 + Duration::from_millis(200);
        assert!(det.process(&uniform(20.0, 16), t1));

        // Constant flux afterwards: d_flux = 0, no beat
        let t2 = t1 + Duration::from_millis(200);
        assert!(!det.process(&uniform(20.0, 16), t2));
    }

    #[test]
    fn test_small_rise_does_not_fire() {
        let mut det = detector();
        let t0 = Instant::now();
        det.process(&uniform(100.0, 16), t0);

        // 100 -> 104: d_flux ~ 0.038, below the 0.08 threshold
        let t1 = t0 + Duration::from_millis(200);
        assert!(!det.process(&uniform(104.0, 16), t1));
    }

    #[test]
    fn test_falling_flux_never_fires() {
        let mut det = detector();
        let t0 = Instant::now();
        det.process(&uniform(50.0, 16), t0);
        assert!(!det.process(&uniform(10.0, 16), t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_refractory_window_suppresses_chatter() {
        let mut det = detector();
        let t0 = Instant::now();
        assert!(det.process(&uniform(10.0, 16), t0));

        // Keep doubling flux every 50ms: d_flux stays at 0.5 but the
        // refractory window (140ms) gates the pulses
        let mut level = 10.0;
        let mut fired = Vec::new();
        for tick in 1..=6 {
            level *= 2.0;
            let now = t0 + Duration::from_millis(50 * tick);
            if det.process(&uniform(level, 16), now) {
                fired.push(50 * tick);
            }
        }
        // Only the 150ms and 300ms ticks clear the 140ms window
        assert_eq!(fired, vec![150, 300]);
    }

    #[test]
    fn test_last_flux_updated_even_without_beat() {
        let mut det = detector();
        let t0 = Instant::now();
        det.process(&uniform(10.0, 16), t0);
        // Falling tick fires nothing but still replaces the baseline
        det.process(&uniform(4.0, 16), t0 + Duration::from_millis(10));
        assert!((det.last_flux() - 4.0 * 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut det = detector();
        let t0 = Instant::now();
        det.process(&uniform(10.0, 16), t0);
        det.reset();
        assert_eq!(det.last_flux(), 0.0);
        // Beat-timing history cleared: fires immediately despite the recent beat
        assert!(det.process(&uniform(10.0, 16), t0 + Duration::from_millis(1)));
    }

    #[test]
    fn test_silence_does_not_fire() {
        // Epsilon-only magnitudes: the flux-ratio denominator epsilon keeps
        // d_flux well below the threshold
        let mut det = detector();
        let magnitudes = uniform(crate::analysis::MAGNITUDE_EPSILON, 16);
        assert!(!det.process(&magnitudes, Instant::now()));
    }
}
