//! WAV encoder — turns a stereo f32 buffer into a 16-bit PCM WAV byte buffer.

use crate::error::AudioError;

/// Size of the canonical RIFF/WAVE header written by [`encode_wav`].
pub const HEADER_LEN: usize = 44;

/// Most frames per channel a WAV file can hold: the data chunk plus the
/// 36 header bytes counted by the RIFF size must fit in a `u32`.
pub const MAX_FRAMES: u64 = (u32::MAX as u64 - 36) / 4;

const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;

/// Borrowed view of a stereo buffer, one slice per channel.
#[derive(Debug, Clone, Copy)]
pub struct StereoBuffer<'a> {
    pub left: &'a [f32],
    pub right: &'a [f32],
    pub sample_rate: u32,
}

impl<'a> StereoBuffer<'a> {
    pub fn new(left: &'a [f32], right: &'a [f32], sample_rate: u32) -> Self {
        StereoBuffer {
            left,
            right,
            sample_rate,
        }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn encode(&self) -> Result<Vec<u8>, AudioError> {
        encode_wav(self.left, self.right, self.sample_rate)
    }
}

/// Convert a float sample to 16-bit PCM.
///
/// -1.0 maps to -32767, not -32768: the scale is symmetric.
pub fn quantize(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    (clamped * 32767.0).round() as i16
}

/// Encode two equal-length channels to a WAV byte buffer (16-bit stereo PCM,
/// samples interleaved L, R, L, R, ...).
pub fn encode_wav(left: &[f32], right: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    if left.len() != right.len() {
        return Err(AudioError::ChannelMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate { rate: sample_rate });
    }

    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or(AudioError::InvalidSampleRate { rate: sample_rate })?;
    let data_size = left
        .len()
        .checked_mul(block_align as usize)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or(AudioError::TooLong {
            frames: left.len() as u64,
        })?;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for (&l, &r) in left.iter().zip(right) {
        buf.extend_from_slice(&quantize(l).to_le_bytes());
        buf.extend_from_slice(&quantize(r).to_le_bytes());
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_at(wav: &[u8], index: usize) -> i16 {
        let i = HEADER_LEN + index * 2;
        i16::from_le_bytes([wav[i], wav[i + 1]])
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode_wav(&[0.0; 10], &[0.0; 10], 44100).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let riff_size = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]);
        assert_eq!(riff_size as usize, wav.len() - 8);

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);

        let byte_rate = u32::from_le_bytes([wav[28], wav[29], wav[30], wav[31]]);
        assert_eq!(byte_rate, 44100 * 4);
    }

    #[test]
    fn wav_size_correct() {
        for frames in [0usize, 1, 7, 1000] {
            let left = vec![0.25; frames];
            let right = vec![-0.25; frames];
            let wav = encode_wav(&left, &right, 22050).unwrap();
            assert_eq!(wav.len(), 44 + 4 * frames);
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(data_size as usize, 4 * frames);
        }
    }

    #[test]
    fn header_decodes_with_hound() {
        let wav = encode_wav(&[0.5, -0.5, 0.0], &[0.1, 0.2, 0.3], 48000).unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).expect("hound should accept the header");
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.duration(), 3);
    }

    #[test]
    fn samples_are_interleaved() {
        let wav = encode_wav(&[1.0, 0.0], &[-1.0, 0.5], 8000).unwrap();
        assert_eq!(sample_at(&wav, 0), 32767);
        assert_eq!(sample_at(&wav, 1), -32767);
        assert_eq!(sample_at(&wav, 2), 0);
        assert_eq!(sample_at(&wav, 3), 16384);
    }

    #[test]
    fn out_of_range_samples_clamp() {
        assert_eq!(quantize(2.0), quantize(1.0));
        assert_eq!(quantize(2.0), 32767);
        assert_eq!(quantize(-5.0), quantize(-1.0));
        assert_eq!(quantize(-5.0), -32767);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn mismatched_channels_rejected() {
        let err = encode_wav(&[0.0; 3], &[0.0; 2], 44100).unwrap_err();
        assert_eq!(err, AudioError::ChannelMismatch { left: 3, right: 2 });
        assert!(err.is_invalid_input());
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let err = encode_wav(&[], &[], 0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn stereo_buffer_view_encodes() {
        let left = [0.0f32; 4];
        let right = [0.0f32; 4];
        let view = StereoBuffer::new(&left, &right, 4);
        assert_eq!(view.frames(), 4);
        assert_eq!(view.encode().unwrap().len(), 60);
    }
}
