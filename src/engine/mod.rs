//! Engine core: session lifecycle, ingestion entry points, and signal
//! publishing.

pub mod core;
pub mod source;

pub use self::core::FeatureEngine;
pub use self::source::{
    CaptureSource, ManualTimeSource, SessionHandle, StubCaptureSource, SystemTimeSource,
    TimeSource,
};
