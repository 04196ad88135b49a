//! Capture-source and time-source abstractions.
//!
//! The capture source owns the audio session: it decides capture size and
//! rate and delivers waveform/spectrum buffers to the engine's ingestion
//! entry points on its own delivery thread. The engine only borrows the
//! session handle; `open`/`close` acquire and release whatever platform
//! resources the source needs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::CaptureError;

/// Opaque identifier for a live capture session.
///
/// Zero and negative values mirror the platform's "bad session" sentinels
/// and are treated as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(i32);

impl SessionHandle {
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i32 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

/// Trait implemented by capture-source integrations.
///
/// `open` binds the given session and must fail with a [`CaptureError`]
/// when the source refuses; `close` releases capture resources and must be
/// safe to call when nothing is open.
pub trait CaptureSource: Send + Sync {
    fn open(&self, handle: SessionHandle) -> Result<(), CaptureError>;
    fn close(&self);
}

/// Monotonic time source used for beat refractory timing.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default time source backed by `Instant::now`.
#[derive(Default)]
pub struct SystemTimeSource {
    _unit: (),
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced time source for deterministic tests and harness runs.
pub struct ManualTimeSource {
    start: Instant,
    offset_ms: AtomicU64,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.start + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// In-memory capture source for tests and the diagnostics CLI.
///
/// Tracks open/close calls and can be told to refuse the next bind to
/// exercise the attach failure path.
pub struct StubCaptureSource {
    open: AtomicBool,
    refuse_next: AtomicBool,
}

impl StubCaptureSource {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
            refuse_next: AtomicBool::new(false),
        }
    }

    /// Make the next `open` call fail with `BindFailed`.
    pub fn refuse_next_open(&self) {
        self.refuse_next.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Default for StubCaptureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for StubCaptureSource {
    fn open(&self, handle: SessionHandle) -> Result<(), CaptureError> {
        if self.refuse_next.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::BindFailed {
                reason: format!("stub refused session {}", handle.raw()),
            });
        }
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}
