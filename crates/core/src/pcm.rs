//! Conversion of raw PCM16 speech payloads into playable sample buffers.

use std::time::Duration;

/// Sample rate of the speech endpoint's PCM16 output.
pub const TTS_SAMPLE_RATE: u32 = 24000;
/// The speech endpoint always returns mono audio.
pub const TTS_CHANNELS: u16 = 1;

/// Normalized, de-interleaved audio ready to hand to an output device.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudioBuffer {
    pub sample_rate: u32,
    pub channel_count: u16,
    /// One vector of samples per channel, each `frame_count()` long.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudioBuffer {
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / f64::from(self.sample_rate))
    }

    /// Re-interleaves the channels (frame-major), the layout output devices expect.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Decodes little-endian signed 16-bit interleaved PCM.
///
/// A dangling odd byte and any trailing partial frame are dropped. Each sample
/// `s` becomes `s / 32768.0`, so values lie in `[-1.0, 1.0)`.
///
/// A `channel_count` of zero is treated as mono.
pub fn decode(bytes: &[u8], sample_rate: u32, channel_count: u16) -> DecodedAudioBuffer {
    let channel_count = channel_count.max(1);
    let stride = usize::from(channel_count);

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    let frame_count = samples.len() / stride;

    let channels = (0..stride)
        .map(|channel| {
            (0..frame_count)
                .map(|frame| f32::from(samples[frame * stride + channel]) / 32768.0)
                .collect()
        })
        .collect();

    DecodedAudioBuffer {
        sample_rate,
        channel_count,
        channels,
    }
}

/// Encodes normalized samples back to little-endian PCM16 bytes.
pub fn encode_i16_le(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&sample| {
            let v = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            v.to_le_bytes()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_decode_known_values() {
        // 16384 -> 0.5, -32768 -> -1.0, 32767 -> just under 1.0
        let bytes = [0x00, 0x40, 0x00, 0x80, 0xff, 0x7f];
        let buffer = decode(&bytes, TTS_SAMPLE_RATE, TTS_CHANNELS);

        assert_eq!(buffer.sample_rate, 24000);
        assert_eq!(buffer.channel_count, 1);
        assert_eq!(buffer.frame_count(), 3);
        assert_abs_diff_eq!(buffer.channels[0][0], 0.5);
        assert_abs_diff_eq!(buffer.channels[0][1], -1.0);
        assert_abs_diff_eq!(buffer.channels[0][2], 32767.0 / 32768.0);
    }

    #[test]
    fn test_every_sample_maps_into_unit_range() {
        let bytes: Vec<u8> = (i16::MIN..=i16::MAX).flat_map(i16::to_le_bytes).collect();
        let buffer = decode(&bytes, TTS_SAMPLE_RATE, 1);

        assert_eq!(buffer.frame_count(), 65536);
        for (sample, s) in buffer.channels[0].iter().zip(i16::MIN..=i16::MAX) {
            assert_eq!(*sample, f32::from(s) / 32768.0);
            assert!((-1.0..1.0).contains(sample));
        }
    }

    #[test]
    fn test_odd_length_drops_last_byte() {
        let even = [0x00, 0x40, 0x10, 0x00];
        let mut odd = even.to_vec();
        odd.push(0x7f);

        assert_eq!(decode(&odd, TTS_SAMPLE_RATE, 1), decode(&even, TTS_SAMPLE_RATE, 1));
        assert_eq!(decode(&[0x12], TTS_SAMPLE_RATE, 1).frame_count(), 0);
    }

    #[test]
    fn test_reencoding_round_trips_within_one_lsb() {
        let original: Vec<i16> = vec![0, 1, -1, 1000, -2000, i16::MAX, i16::MIN, 12345];
        let bytes: Vec<u8> = original.iter().flat_map(|s| s.to_le_bytes()).collect();

        let buffer = decode(&bytes, TTS_SAMPLE_RATE, 1);
        let reencoded = encode_i16_le(&buffer.channels[0]);

        for (a, b) in bytes.chunks_exact(2).zip(reencoded.chunks_exact(2)) {
            let a = i16::from_le_bytes([a[0], a[1]]);
            let b = i16::from_le_bytes([b[0], b[1]]);
            assert!((i32::from(a) - i32::from(b)).abs() <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn test_stereo_deinterleaving() {
        // Frames: (L=16384, R=-16384), (L=0, R=8192), then a partial frame.
        let samples: [i16; 5] = [16384, -16384, 0, 8192, 1];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let buffer = decode(&bytes, 48000, 2);

        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channels[0], vec![0.5, 0.0]);
        assert_eq!(buffer.channels[1], vec![-0.5, 0.25]);
        assert_eq!(buffer.interleaved(), vec![0.5, -0.5, 0.0, 0.25]);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode(&bytes, 24000, 1), decode(&bytes, 24000, 1));
    }

    #[test]
    fn test_duration() {
        let bytes = vec![0u8; 48000];
        let buffer = decode(&bytes, TTS_SAMPLE_RATE, 1);
        assert_eq!(buffer.duration(), Duration::from_secs(1));
        assert_eq!(decode(&[], TTS_SAMPLE_RATE, 1).duration(), Duration::ZERO);
    }
}
