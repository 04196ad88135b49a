// Analysis stages for the feature extraction engine
//
// The engine runs two stages per capture tick:
// - Amplitude stage: per-tick RMS over the waveform buffer (stateless)
// - Spectral stage: magnitude spectrum feeding onset detection and the
//   speech-likelihood estimator (stateful across ticks)
//
// Both spectral consumers share one magnitude pass over the buffer, so the
// spectrum bytes are only decoded once per tick.

pub mod amplitude;
pub mod onset;
pub mod speech;

pub use amplitude::rms_amplitude;
pub use onset::BeatDetector;
pub use speech::SpeechEstimator;

/// Epsilon added to every bin magnitude so the flatness logarithm never
/// sees a zero value.
pub const MAGNITUDE_EPSILON: f64 = 1e-9;

/// Decode an interleaved (re, im) signed-byte spectrum buffer into bin
/// magnitudes.
///
/// Each byte is reinterpreted as `i8`, matching the 8-bit FFT encoding the
/// capture source delivers. A trailing odd byte is ignored. The output
/// buffer is reused across ticks; it only reallocates if the capture size
/// changes.
///
/// # Example
/// ```
/// use lightshow_audio::analysis::magnitudes;
///
/// let mut out = Vec::new();
/// magnitudes(&[3u8, 4u8], &mut out);
/// assert_eq!(out.len(), 1);
/// assert!((out[0] - 5.0).abs() < 1e-6);
/// ```
pub fn magnitudes(spectrum: &[u8], out: &mut Vec<f64>) {
    let bins = spectrum.len() / 2;
    out.clear();
    out.reserve(bins);

    for pair in spectrum.chunks_exact(2) {
        let re = pair[0] as i8 as f64;
        let im = pair[1] as i8 as f64;
        out.push((re * re + im * im).sqrt() + MAGNITUDE_EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitudes_decodes_signed_pairs() {
        let mut out = Vec::new();
        // 0xFD = -3, 0xFC = -4 as i8; magnitude is 5 either way
        magnitudes(&[3, 4, 0xFD, 0xFC], &mut out);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 5.0).abs() < 1e-6);
        assert!((out[1] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitudes_ignores_trailing_byte() {
        let mut out = Vec::new();
        magnitudes(&[1, 0, 7], &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_magnitudes_never_zero() {
        let mut out = Vec::new();
        magnitudes(&[0, 0, 0, 0], &mut out);
        assert!(out.iter().all(|&m| m > 0.0), "epsilon must keep bins positive");
    }

    #[test]
    fn test_magnitudes_reuses_buffer() {
        let mut out = Vec::with_capacity(4);
        magnitudes(&[1, 0, 2, 0, 3, 0, 4, 0], &mut out);
        let ptr = out.as_ptr();
        magnitudes(&[5, 0, 6, 0], &mut out);
        assert_eq!(out.as_ptr(), ptr, "same capture size must not reallocate");
    }
}
