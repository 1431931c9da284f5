//! Conversion between 16-bit PCM and normalized f32 samples.
//!
//! Both directions scale by 32768. Decoding divides, encoding multiplies,
//! clamps to the i16 range and truncates toward zero, so an
//! i16 -> f32 -> i16 round trip is exact.

use super::error::ResampleError;
use super::format::SAMPLE_BYTES;

const SCALE: f32 = 32768.0;

/// Normalizes one sample to [-1.0, 1.0).
#[inline]
pub fn sample_to_float(sample: i16) -> f32 {
    sample as f32 / SCALE
}

/// Scales one normalized sample back to i16, clamping and truncating.
/// NaN becomes 0.
#[inline]
pub fn float_to_sample(value: f32) -> i16 {
    (value * SCALE).clamp(-32768.0, 32767.0) as i16
}

/// Converts i16 samples to f32 samples normalized to [-1.0, 1.0).
pub fn int_to_float(samples: &[i16]) -> Vec<f32> {
    samples.iter().copied().map(sample_to_float).collect()
}

/// Converts normalized f32 samples back to i16.
///
/// Values outside [-1.0, 1.0) are clamped, never wrapped. NaN becomes 0.
pub fn float_to_int(samples: &[f32]) -> Vec<i16> {
    samples.iter().copied().map(float_to_sample).collect()
}

/// Splits little-endian PCM16 bytes into samples.
///
/// Returns [`ResampleError::InvalidInput`] if the length is odd.
pub fn bytes_to_samples(audio: &[u8]) -> Result<Vec<i16>, ResampleError> {
    ensure_aligned(audio)?;
    Ok(audio
        .chunks_exact(SAMPLE_BYTES)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect())
}

/// Packs samples into little-endian PCM16 bytes.
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * SAMPLE_BYTES);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Decodes PCM16 LE bytes straight to normalized f32 samples.
pub fn decode(audio: &[u8]) -> Result<Vec<f32>, ResampleError> {
    ensure_aligned(audio)?;
    Ok(audio
        .chunks_exact(SAMPLE_BYTES)
        .map(|b| sample_to_float(i16::from_le_bytes([b[0], b[1]])))
        .collect())
}

/// Encodes normalized f32 samples to PCM16 LE bytes.
pub fn encode(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * SAMPLE_BYTES);
    for &s in samples {
        data.extend_from_slice(&float_to_sample(s).to_le_bytes());
    }
    data
}

pub(crate) fn ensure_aligned(audio: &[u8]) -> Result<(), ResampleError> {
    if audio.len() % SAMPLE_BYTES != 0 {
        return Err(ResampleError::odd_length(audio.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_to_float_basic() {
        let result = int_to_float(&[0, 16384, -16384, i16::MIN, i16::MAX]);
        assert_eq!(result[0], 0.0);
        assert_eq!(result[1], 0.5);
        assert_eq!(result[2], -0.5);
        assert_eq!(result[3], -1.0);
        assert!((result[4] - (32767.0 / 32768.0)).abs() < 1e-6);
    }

    #[test]
    fn test_float_to_int_clamps() {
        let result = float_to_int(&[1.0, 2.5, -1.0, -3.0, 0.0]);
        assert_eq!(result, vec![32767, 32767, -32768, -32768, 0]);
    }

    #[test]
    fn test_float_to_int_nan() {
        assert_eq!(float_to_int(&[f32::NAN]), vec![0]);
    }

    #[test]
    fn test_float_to_int_truncates() {
        // 1.5 steps truncate to 1
        let v = 1.5 / 32768.0;
        assert_eq!(float_to_int(&[v, -v]), vec![1, -1]);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let samples: Vec<i16> = (i16::MIN..=i16::MAX).step_by(7).chain([i16::MAX]).collect();
        let back = float_to_int(&int_to_float(&samples));
        assert_eq!(back, samples);
    }

    #[test]
    fn test_bytes_to_samples() {
        let samples = bytes_to_samples(&[0xe8, 0x03, 0x18, 0xfc]).unwrap();
        assert_eq!(samples, vec![1000, -1000]);
    }

    #[test]
    fn test_bytes_to_samples_odd_length() {
        let err = bytes_to_samples(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidInput(_)));
    }

    #[test]
    fn test_samples_to_bytes() {
        assert_eq!(samples_to_bytes(&[1000, -1000]), vec![0xe8, 0x03, 0x18, 0xfc]);
        assert!(samples_to_bytes(&[]).is_empty());
    }

    #[test]
    fn test_decode_encode() {
        let bytes = samples_to_bytes(&[0, 1, -1, 12345, -32768, 32767]);
        let floats = decode(&bytes).unwrap();
        assert_eq!(floats.len(), 6);
        assert_eq!(encode(&floats), bytes);
    }

    #[test]
    fn test_slice_and_byte_paths_agree() {
        let values = [0.0, 0.49999, -0.75, 1.2, -1.7, f32::NAN, 3.0e-5];
        let via_ints = samples_to_bytes(&float_to_int(&values));
        assert_eq!(encode(&values), via_ints);

        let pcm = [i16::MIN, -3, 0, 7, i16::MAX];
        let decoded = decode(&samples_to_bytes(&pcm)).unwrap();
        assert_eq!(decoded, int_to_float(&pcm));
        for (&p, &f) in pcm.iter().zip(&decoded) {
            assert_eq!(float_to_sample(f), p);
            assert_eq!(sample_to_float(p), f);
        }
    }

    #[test]
    fn test_decode_odd_length() {
        assert!(matches!(decode(&[1]), Err(ResampleError::InvalidInput(_))));
        assert!(decode(&[]).unwrap().is_empty());
    }
}
