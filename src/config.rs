//! Configuration for tuning the feature extraction heuristics
//!
//! The beat trigger ratio, refractory period, and smoothing weight are
//! empirically chosen tuning parameters, not correctness constraints, so
//! they load from a JSON file at runtime for fast iteration without
//! recompilation. Missing or malformed files fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub beat: BeatConfig,
    pub speech: SpeechConfig,
}

/// Onset/beat detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatConfig {
    /// Relative spectral-flux rise that triggers a beat (0.08 = an 8%
    /// jump in total spectral energy)
    pub flux_rise_threshold: f32,
    /// Minimum spacing between two beats in milliseconds
    pub refractory_ms: u64,
    /// Broadcast buffer for pending beat events; excess events are dropped
    /// rather than blocking the capture thread
    pub event_buffer: usize,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            flux_rise_threshold: 0.08,
            refractory_ms: 140,
            event_buffer: 8,
        }
    }
}

/// Speech-likelihood smoothing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Weight of the current tick in the exponential smoother; 0.2 gives
    /// roughly a half-second settling time at typical capture rates
    pub smoothing_weight: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            smoothing_weight: 0.2,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            beat: BeatConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file is missing or invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
