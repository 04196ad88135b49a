//! FeatureEngine: session lifecycle, per-tick ingestion, and signal
//! publishing.
//!
//! The engine is driven entirely by capture callbacks; it spawns no
//! polling loop. The amplitude path is lock-free (stateless per tick, one
//! atomic publish), while the spectral path serializes its flux/beat/speech
//! state behind a single mutex. An attached flag plus an in-flight counter
//! guarantee that a callback racing `detach` can never publish after
//! `detach` returns.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::analysis::{self, BeatDetector, SpeechEstimator};
use crate::api::{BeatEvent, SignalSnapshot};
use crate::config::EngineConfig;
use crate::engine::source::{CaptureSource, SessionHandle, TimeSource};
use crate::error::CaptureError;

/// Upper bound on yield iterations while waiting for admitted callbacks to
/// drain during detach. Ticks are bounded computations, so this is only a
/// guard against a wedged delivery thread.
const DRAIN_SPIN_LIMIT: u32 = 10_000;

/// State shared by the two spectral consumers, mutated under one lock.
struct SpectralState {
    detector: BeatDetector,
    speech: SpeechEstimator,
    /// Scratch magnitudes, reused across ticks; reallocates only when the
    /// capture size changes.
    magnitudes: Vec<f64>,
}

/// Real-time feature extraction engine.
///
/// Binds to a live capture session via [`attach`](Self::attach), receives
/// waveform and spectrum buffers through the two ingestion entry points,
/// and publishes three signals: RMS `amplitude`, a smoothed
/// `speech_probability`, and a broadcast stream of [`BeatEvent`]s.
pub struct FeatureEngine {
    source: Arc<dyn CaptureSource>,
    time: Arc<dyn TimeSource>,
    /// Serializes attach/detach; holds the bound handle while attached.
    lifecycle: Mutex<Option<SessionHandle>>,
    attached: AtomicBool,
    inflight: AtomicU32,
    amplitude_bits: AtomicU32,
    speech_bits: AtomicU32,
    spectral: Mutex<SpectralState>,
    beat_tx: broadcast::Sender<BeatEvent>,
}

impl FeatureEngine {
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn CaptureSource>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let (beat_tx, _) = broadcast::channel(config.beat.event_buffer.max(1));

        Self {
            source,
            time,
            lifecycle: Mutex::new(None),
            attached: AtomicBool::new(false),
            inflight: AtomicU32::new(0),
            amplitude_bits: AtomicU32::new(0.0f32.to_bits()),
            speech_bits: AtomicU32::new(0.0f32.to_bits()),
            spectral: Mutex::new(SpectralState {
                detector: BeatDetector::new(&config.beat),
                speech: SpeechEstimator::new(&config.speech),
                magnitudes: Vec::new(),
            }),
            beat_tx,
        }
    }

    // ========================================================================
    // SESSION LIFECYCLE
    // ========================================================================

    /// Bind the engine to a live capture session.
    ///
    /// Any previous session is fully detached first, so no analysis state
    /// leaks across sessions. A zero or negative handle is a defined no-op
    /// that leaves the engine detached. A capture source that refuses to
    /// bind surfaces as a [`CaptureError`] and also leaves the engine
    /// detached.
    pub fn attach(&self, handle: SessionHandle) -> Result<(), CaptureError> {
        let mut session = self.lock_lifecycle();
        self.detach_locked(&mut session);

        if !handle.is_valid() {
            log::warn!(
                "[FeatureEngine] Ignoring invalid session handle {}",
                handle.raw()
            );
            return Ok(());
        }

        self.source.open(handle)?;
        *session = Some(handle);
        self.attached.store(true, Ordering::SeqCst);
        log::info!("[FeatureEngine] Attached to session {}", handle.raw());
        Ok(())
    }

    /// Stop capture delivery and reset all engine state to defaults.
    ///
    /// Idempotent; safe during teardown. After this returns, the published
    /// signals cannot change and no beats fire until the next
    /// [`attach`](Self::attach).
    pub fn detach(&self) {
        let mut session = self.lock_lifecycle();
        self.detach_locked(&mut session);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Handle of the currently bound session, if any.
    pub fn session(&self) -> Option<SessionHandle> {
        *self.lock_lifecycle()
    }

    fn lock_lifecycle(&self) -> std::sync::MutexGuard<'_, Option<SessionHandle>> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn detach_locked(&self, session: &mut Option<SessionHandle>) {
        let previous = session.take();
        self.attached.store(false, Ordering::SeqCst);
        self.drain_inflight();

        {
            let mut spectral = self
                .spectral
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            spectral.detector.reset();
            spectral.speech.reset();
        }
        self.amplitude_bits.store(0.0f32.to_bits(), Ordering::SeqCst);
        self.speech_bits.store(0.0f32.to_bits(), Ordering::SeqCst);

        if let Some(handle) = previous {
            self.source.close();
            log::info!("[FeatureEngine] Detached from session {}", handle.raw());
        }
    }

    /// Wait for callbacks admitted before detach to finish. Bounded: each
    /// tick is a fixed amount of synchronous computation.
    fn drain_inflight(&self) {
        let mut spins = 0u32;
        while self.inflight.load(Ordering::Acquire) > 0 {
            std::thread::yield_now();
            spins += 1;
            if spins > DRAIN_SPIN_LIMIT {
                log::warn!("[FeatureEngine] Gave up waiting for in-flight callbacks");
                break;
            }
        }
    }

    // ========================================================================
    // INGESTION ENTRY POINTS (called from the capture delivery thread)
    // ========================================================================

    /// Amplitude stage: one waveform buffer of unsigned 8-bit samples.
    ///
    /// Stateless per tick, so this path takes no lock; it only performs an
    /// atomic publish of an independent value. An empty buffer is treated
    /// as silence.
    pub fn ingest_waveform(&self, data: &[u8], sampling_rate: u32) {
        if !self.attached.load(Ordering::Acquire) {
            return;
        }
        self.inflight.fetch_add(1, Ordering::AcqRel);
        // Re-check after registering in-flight: a detach that slipped in
        // between the gate and the increment must see this tick as stale.
        if self.attached.load(Ordering::Acquire) {
            let amplitude = analysis::rms_amplitude(data);
            self.amplitude_bits
                .store(amplitude.to_bits(), Ordering::Release);
            log::trace!(
                "[FeatureEngine] amplitude={:.3} rate={}",
                amplitude,
                sampling_rate
            );
        }
        self.inflight.fetch_sub(1, Ordering::Release);
    }

    /// Spectral stage: one buffer of interleaved signed 8-bit (re, im)
    /// pairs.
    ///
    /// Decodes bin magnitudes once and feeds both the beat detector and the
    /// speech estimator from the same pass. A buffer with no complete bin
    /// carries no information and updates nothing.
    pub fn ingest_spectrum(&self, data: &[u8], sampling_rate: u32) {
        if !self.attached.load(Ordering::Acquire) {
            return;
        }
        self.inflight.fetch_add(1, Ordering::AcqRel);
        if self.attached.load(Ordering::Acquire) && data.len() >= 2 {
            let now = self.time.now();
            let mut spectral = self
                .spectral
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let state = &mut *spectral;

            analysis::magnitudes(data, &mut state.magnitudes);
            let beat = state.detector.process(&state.magnitudes, now);
            let speech = state.speech.update(&state.magnitudes);

            self.speech_bits.store(speech.to_bits(), Ordering::Release);
            if beat {
                // Fire-and-forget: with no subscriber listening the event
                // is simply not observed; lagged subscribers drop the
                // oldest pending events instead of blocking this thread.
                let _ = self.beat_tx.send(BeatEvent);
                log::debug!(
                    "[FeatureEngine] beat fired, flux={:.1} rate={}",
                    state.detector.last_flux(),
                    sampling_rate
                );
            }
        }
        self.inflight.fetch_sub(1, Ordering::Release);
    }

    // ========================================================================
    // PUBLISHED SIGNALS
    // ========================================================================

    /// Last published RMS loudness in [0, 1].
    pub fn amplitude(&self) -> f32 {
        f32::from_bits(self.amplitude_bits.load(Ordering::Acquire))
    }

    /// Current smoothed speech-vs-music likelihood in [0, 1].
    pub fn speech_probability(&self) -> f32 {
        f32::from_bits(self.speech_bits.load(Ordering::Acquire))
    }

    /// Snapshot of both continuous signals.
    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            amplitude: self.amplitude(),
            speech_probability: self.speech_probability(),
        }
    }

    /// Subscribe to beat pulses. Each subscriber holds a small bounded
    /// buffer; a subscriber that falls behind loses the oldest events.
    pub fn subscribe_beats(&self) -> broadcast::Receiver<BeatEvent> {
        self.beat_tx.subscribe()
    }

    /// Async adapter over [`subscribe_beats`](Self::subscribe_beats); lag
    /// surfaces as silently dropped events, never as blocking.
    pub fn beat_stream(&self) -> impl Stream<Item = BeatEvent> + Unpin {
        BroadcastStream::new(self.beat_tx.subscribe()).filter_map(|event| event.ok())
    }
}

impl Drop for FeatureEngine {
    fn drop(&mut self) {
        self.detach();
    }
}
