// Lightshow Audio - real-time audio feature extraction engine
// Turns live capture callbacks into loudness, beat, and speech-likelihood signals

// Module declarations
pub mod analysis;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;

// Re-exports for convenience
pub use api::{BeatEvent, SignalSnapshot};
pub use config::EngineConfig;
pub use engine::core::FeatureEngine;
pub use engine::source::{CaptureSource, SessionHandle, TimeSource};
pub use error::CaptureError;
