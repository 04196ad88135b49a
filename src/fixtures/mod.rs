//! Synthetic capture-tick fixtures.
//!
//! Deterministic waveform and spectrum buffers in the exact byte encodings
//! the capture source delivers: unsigned 8-bit samples centered on 128 for
//! waveforms, interleaved signed 8-bit (re, im) pairs for spectra. Used by
//! the test suites and the `lsa-diag` harness; no fixture touches the
//! engine's real-time path.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::{num_complex::Complex, FftPlanner};

/// All-midpoint waveform: digital silence.
pub fn waveform_silence(len: usize) -> Vec<u8> {
    vec![128; len]
}

/// Full-scale alternating square wave, the loudest encodable buffer.
pub fn waveform_square(len: usize) -> Vec<u8> {
    (0..len).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect()
}

/// Sine waveform with the given number of whole cycles, scaled by
/// `amplitude` in [0, 1] around the 128 midpoint.
pub fn waveform_sine(len: usize, cycles: f32, amplitude: f32) -> Vec<u8> {
    let amplitude = amplitude.clamp(0.0, 1.0);
    (0..len)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * cycles * i as f32 / len as f32;
            let sample = 128.0 + 127.0 * amplitude * phase.sin();
            sample.round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// Seeded uniform-noise waveform.
pub fn waveform_noise(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..=255)).collect()
}

/// Spectrum with every bin at (level, 0); perfectly flat magnitudes.
pub fn spectrum_uniform(bins: usize, level: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(bins * 2);
    for _ in 0..bins {
        buf.push(level);
        buf.push(0);
    }
    buf
}

/// Spectrum with one dominant bin and a near-silent remainder; maximally
/// tonal.
pub fn spectrum_peaked(bins: usize, peak_bin: usize, peak: u8) -> Vec<u8> {
    let mut buf = vec![0u8; bins * 2];
    if peak_bin < bins {
        buf[peak_bin * 2] = peak.min(127);
    }
    buf
}

/// Seeded broadband-noise spectrum; magnitudes vary but stay noise-like.
pub fn spectrum_noise(bins: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buf = Vec::with_capacity(bins * 2);
    for _ in 0..bins {
        let component: i8 = rng.gen_range(20..=60);
        buf.push(component as u8);
        buf.push(rng.gen_range(-30..=30i8) as u8);
    }
    buf
}

/// Compute a real FFT of centered waveform samples and quantize the
/// positive-frequency half to interleaved signed bytes.
///
/// This reproduces the shape of a capture tick end to end: generate a tone
/// with [`waveform_sine`], push it through here, and feed the result to
/// the engine's spectrum entry point.
pub fn spectrum_from_waveform(waveform: &[u8]) -> Vec<u8> {
    if waveform.is_empty() {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f32>> = waveform
        .iter()
        .map(|&s| Complex::new(f32::from(s) - 128.0, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    let half = &buffer[..buffer.len() / 2];
    let peak = half
        .iter()
        .map(|c| c.re.abs().max(c.im.abs()))
        .fold(0.0f32, f32::max);
    let scale = if peak > 0.0 { 127.0 / peak } else { 0.0 };

    let mut out = Vec::with_capacity(half.len() * 2);
    for c in half {
        out.push((c.re * scale).round().clamp(-127.0, 127.0) as i8 as u8);
        out.push((c.im * scale).round().clamp(-127.0, 127.0) as i8 as u8);
    }
    out
}
