// SpeechEstimator - spectral-flatness speech/music heuristic
//
// Spectral flatness is the ratio of the geometric mean to the arithmetic
// mean of the magnitude spectrum: near 1 for noise-like/broadband frames,
// near 0 for tonal/peaked frames. Voiced speech tends to be more tonal at
// any instant than dense multi-instrument music, so the instantaneous
// speech-likeness score is 1 - flatness.
//
// This is a deliberately crude closed-form proxy, not a validated
// classifier; the published value is only meant to bias light timing.
// A single-pole exponential smoother damps frame-to-frame jitter so the
// UI-facing signal moves smoothly instead of flickering every tick.

use crate::config::SpeechConfig;

/// Exponentially smoothed speech-vs-music likelihood in [0, 1].
pub struct SpeechEstimator {
    weight: f64,
    probability: f64,
}

impl SpeechEstimator {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            weight: f64::from(config.smoothing_weight),
            probability: 0.0,
        }
    }

    /// Fold one tick of bin magnitudes into the smoothed likelihood and
    /// return the updated value.
    ///
    /// Magnitudes must already carry the positive epsilon applied by
    /// [`crate::analysis::magnitudes`], so the logarithm never sees zero.
    /// An empty spectrum carries no information and leaves the value
    /// unchanged.
    pub fn update(&mut self, magnitudes: &[f64]) -> f32 {
        if magnitudes.is_empty() {
            return self.probability();
        }

        let n = magnitudes.len() as f64;
        let log_mean = magnitudes.iter().map(|m| m.ln()).sum::<f64>() / n;
        let arith_mean = magnitudes.iter().sum::<f64>() / n;
        let flatness = log_mean.exp() / arith_mean;

        let speechness = (1.0 - flatness).clamp(0.0, 1.0);
        self.probability = (1.0 - self.weight) * self.probability + self.weight * speechness;
        self.probability()
    }

    /// Current smoothed likelihood.
    pub fn probability(&self) -> f32 {
        (self.probability as f32).clamp(0.0, 1.0)
    }

    /// Reset the smoothed likelihood to its default of 0.
    pub fn reset(&mut self) {
        self.probability = 0.0;
    }
}
