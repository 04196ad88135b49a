// Amplitude stage - per-tick RMS loudness
//
// The waveform buffer carries unsigned 8-bit samples centered on 128.
// Each sample is treated as a signed deviation from that midpoint, and the
// root-mean-square of the deviations is normalized by the maximum possible
// deviation (128) to land nominally in [0, 1].
//
// This stage is a pure per-tick transform with no memory across calls, so
// it is safe to run concurrently with the spectral stage.

/// Compute the normalized RMS amplitude of one waveform buffer.
///
/// An empty buffer is treated as silence and yields `0.0`. The result is
/// clamped to `[0, 1]` to absorb encoding edge cases.
///
/// # Example
/// ```
/// use lightshow_audio::analysis::rms_amplitude;
///
/// assert_eq!(rms_amplitude(&[128u8; 512]), 0.0);
/// assert!(rms_amplitude(&[0, 255, 0, 255]) > 0.99);
/// ```
pub fn rms_amplitude(waveform: &[u8]) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f64;
    for &sample in waveform {
        let deviation = f64::from(sample) - 128.0;
        sum += deviation * deviation;
    }

    let rms = (sum / waveform.len() as f64).sqrt() / 128.0;
    (rms as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_zero() {
        assert_eq!(rms_amplitude(&[128u8; 1024]), 0.0);
    }

    #[test]
    fn test_empty_buffer_is_zero() {
        assert_eq!(rms_amplitude(&[]), 0.0);
    }

    #[test]
    fn test_full_scale_square_near_max() {
        // Alternating 0/255 deviates by 128 and 127, so the normalized RMS
        // sits just below 1.0
        let wave: Vec<u8> = (0..512).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        let amp = rms_amplitude(&wave);
        assert!(amp > 0.99, "full-scale square should be near 1.0, got {}", amp);
        assert!(amp <= 1.0);
    }

    #[test]
    fn test_amplitude_always_in_unit_range() {
        let buffers: Vec<Vec<u8>> = vec![
            vec![0; 64],
            vec![255; 64],
            (0..=255).collect(),
            vec![128, 129, 127, 128],
        ];
        for buf in buffers {
            let amp = rms_amplitude(&buf);
            assert!((0.0..=1.0).contains(&amp), "amplitude {} out of range", amp);
        }
    }

    #[test]
    fn test_louder_signal_has_higher_amplitude() {
        let quiet: Vec<u8> = (0..256).map(|i| if i % 2 == 0 { 120 } else { 136 }).collect();
        let loud: Vec<u8> = (0..256).map(|i| if i % 2 == 0 { 64 } else { 192 }).collect();
        assert!(rms_amplitude(&loud) > rms_amplitude(&quiet));
    }
}
