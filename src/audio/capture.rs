//! Fixed-window capture of a stereo stream into a WAV recording.
//!
//! Chunks are pushed as the audio callback delivers them; a timer calls
//! [`Capture::timeout`] when the window elapses. Whichever fills or fires
//! first finalizes, and every later trigger is a no-op.

use tracing::{debug, info};

use super::wav::{encode_wav, MAX_FRAMES};
use crate::error::AudioError;
use crate::presenter::Presenter;

/// File name offered for download.
pub const OUTPUT_FILE_NAME: &str = "rnbo_output.wav";
/// MIME type of the recording.
pub const OUTPUT_MIME: &str = "audio/wav";
/// Default capture window in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Capture window settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub duration_secs: u32,
}

impl CaptureConfig {
    pub fn new(sample_rate: u32, duration_secs: u32) -> Self {
        CaptureConfig {
            sample_rate,
            duration_secs,
        }
    }

    /// Frames per channel the window holds. Windows too long to encode as
    /// a single WAV are rejected up front.
    pub fn capacity(&self) -> Result<usize, AudioError> {
        let frames = u64::from(self.sample_rate) * u64::from(self.duration_secs);
        if frames > MAX_FRAMES {
            return Err(AudioError::TooLong { frames });
        }
        usize::try_from(frames).map_err(|_| AudioError::TooLong { frames })
    }
}

/// An encoded recording, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub wav: Vec<u8>,
    pub frames: usize,
    pub sample_rate: u32,
}

impl Recording {
    pub fn file_name(&self) -> &'static str {
        OUTPUT_FILE_NAME
    }

    pub fn mime_type(&self) -> &'static str {
        OUTPUT_MIME
    }

    /// Length of the recording in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    /// Hand the file to the presenter's download surface.
    pub fn offer_to<P: Presenter + ?Sized>(&self, presenter: &mut P) {
        presenter.offer_download(OUTPUT_FILE_NAME, OUTPUT_MIME, &self.wav);
    }

    /// Write the WAV into `dir` under [`OUTPUT_FILE_NAME`].
    pub fn save(&self, dir: &std::path::Path) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join(OUTPUT_FILE_NAME);
        std::fs::write(&path, &self.wav)?;
        Ok(path)
    }
}

/// Preallocated stereo capture buffer with a one-shot finalize guard.
#[derive(Debug)]
pub struct Capture {
    left: Vec<f32>,
    right: Vec<f32>,
    cursor: usize,
    sample_rate: u32,
    remaining_secs: u32,
    finalized: bool,
}

impl Capture {
    pub fn new(config: CaptureConfig) -> Result<Self, AudioError> {
        if config.sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate {
                rate: config.sample_rate,
            });
        }
        if config.duration_secs == 0 {
            return Err(AudioError::InvalidDuration {
                secs: config.duration_secs,
            });
        }
        let capacity = config.capacity()?;
        debug!(capacity, sample_rate = config.sample_rate, "capture armed");
        Ok(Capture {
            left: vec![0.0; capacity],
            right: vec![0.0; capacity],
            cursor: 0,
            sample_rate: config.sample_rate,
            remaining_secs: config.duration_secs,
            finalized: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.left.len()
    }

    /// Frames written so far.
    pub fn written(&self) -> usize {
        self.cursor
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Whole seconds left on the countdown.
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Advance the once-per-second countdown and return the new value.
    pub fn tick(&mut self) -> u32 {
        if !self.finalized {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
        }
        self.remaining_secs
    }

    /// [`tick`](Self::tick) and show the result.
    pub fn tick_and_show<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> u32 {
        let remaining = self.tick();
        presenter.show_countdown(remaining);
        remaining
    }

    /// Append one chunk. Returns the recording when this chunk fills the
    /// buffer; chunks arriving after finalize are ignored.
    pub fn push(&mut self, left: &[f32], right: &[f32]) -> Result<Option<Recording>, AudioError> {
        if self.finalized {
            return Ok(None);
        }
        if left.len() != right.len() {
            return Err(AudioError::ChannelMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        let n = left.len().min(self.capacity() - self.cursor);
        let end = self.cursor + n;
        self.left[self.cursor..end].copy_from_slice(&left[..n]);
        self.right[self.cursor..end].copy_from_slice(&right[..n]);
        self.cursor = end;

        if self.cursor == self.capacity() {
            if n < left.len() {
                debug!(dropped = left.len() - n, "chunk truncated at capacity");
            }
            return self.finalize();
        }
        Ok(None)
    }

    /// Timer path: the capture window has elapsed.
    pub fn timeout(&mut self) -> Result<Option<Recording>, AudioError> {
        if !self.finalized {
            debug!(written = self.cursor, "capture window elapsed");
        }
        self.finalize()
    }

    /// Truncate to the frames written and encode. Only the first call
    /// produces a recording.
    pub fn finalize(&mut self) -> Result<Option<Recording>, AudioError> {
        if self.finalized {
            return Ok(None);
        }
        self.finalized = true;
        self.remaining_secs = 0;

        let frames = self.cursor;
        self.left.truncate(frames);
        self.right.truncate(frames);
        let wav = encode_wav(&self.left, &self.right, self.sample_rate)?;
        info!(frames, bytes = wav.len(), "recording finalized");

        Ok(Some(Recording {
            wav,
            frames,
            sample_rate: self.sample_rate,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(rate: u32, secs: u32) -> Capture {
        Capture::new(CaptureConfig::new(rate, secs)).unwrap()
    }

    #[test]
    fn fills_exactly_with_two_chunks() {
        let mut cap = capture(4, 1);
        assert_eq!(cap.capacity(), 4);

        assert!(cap.push(&[0.1, 0.2], &[0.3, 0.4]).unwrap().is_none());
        let rec = cap.push(&[0.5, 0.6], &[0.7, 0.8]).unwrap().expect("buffer full");

        assert_eq!(rec.frames, 4);
        assert_eq!(rec.wav.len(), 60);
        assert_eq!(rec.file_name(), "rnbo_output.wav");
        assert_eq!(rec.mime_type(), "audio/wav");
        assert!(cap.is_finalized());
    }

    #[test]
    fn timeout_truncates_to_written_frames() {
        let mut cap = capture(4, 1);
        cap.push(&[0.1], &[0.1]).unwrap();
        let rec = cap.timeout().unwrap().expect("timeout finalizes");
        assert_eq!(rec.frames, 1);
        assert_eq!(rec.wav.len(), 44 + 4);
    }

    #[test]
    fn finalizes_only_once() {
        let mut cap = capture(4, 1);
        cap.push(&[0.0; 2], &[0.0; 2]).unwrap();
        let first = cap.push(&[0.0; 2], &[0.0; 2]).unwrap();
        let second = cap.timeout().unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let mut cap = capture(4, 1);
        let first = cap.timeout().unwrap();
        let second = cap.push(&[0.0; 4], &[0.0; 4]).unwrap();
        let third = cap.finalize().unwrap();
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(third.is_none());
    }

    #[test]
    fn oversized_chunk_is_truncated() {
        let mut cap = capture(2, 1);
        let rec = cap.push(&[0.1, 0.2, 0.3], &[0.1, 0.2, 0.3]).unwrap().unwrap();
        assert_eq!(rec.frames, 2);
        assert_eq!(cap.written(), 2);
    }

    #[test]
    fn mismatched_chunk_rejected_without_advancing() {
        let mut cap = capture(4, 1);
        let err = cap.push(&[0.0; 2], &[0.0; 1]).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(cap.written(), 0);
        assert!(!cap.is_finalized());
    }

    #[test]
    fn empty_capture_still_encodes() {
        let mut cap = capture(8000, 1);
        let rec = cap.timeout().unwrap().unwrap();
        assert_eq!(rec.frames, 0);
        assert_eq!(rec.wav.len(), 44);
    }

    #[test]
    fn countdown_ticks_and_saturates() {
        let mut cap = capture(4, 2);
        assert_eq!(cap.remaining_secs(), 2);
        assert_eq!(cap.tick(), 1);
        assert_eq!(cap.tick(), 0);
        assert_eq!(cap.tick(), 0);
    }

    #[test]
    fn countdown_zeroed_on_finalize() {
        let mut cap = capture(4, 60);
        cap.finalize().unwrap();
        assert_eq!(cap.remaining_secs(), 0);
        assert_eq!(cap.tick(), 0);
    }

    #[test]
    fn presenter_sees_countdown_and_download() {
        use crate::presenter::TextPresenter;

        let mut view = TextPresenter::default();
        let mut cap = capture(4, 3);
        assert_eq!(cap.tick_and_show(&mut view), 2);
        assert_eq!(view.countdown, Some(2));

        let rec = cap.push(&[0.0; 12], &[0.0; 12]).unwrap().unwrap();
        rec.offer_to(&mut view);
        assert_eq!(
            view.downloads,
            vec![("rnbo_output.wav".to_string(), "audio/wav".to_string(), 92)]
        );
        assert_eq!(cap.tick_and_show(&mut view), 0);
        assert_eq!(view.countdown, Some(0));
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(Capture::new(CaptureConfig::new(0, 60)).unwrap_err().is_invalid_input());
        assert!(Capture::new(CaptureConfig::new(44100, 0)).unwrap_err().is_invalid_input());
    }

    #[test]
    fn window_longer_than_a_wav_rejected() {
        let err = Capture::new(CaptureConfig::new(4_000_000_000, 4_000_000_000)).unwrap_err();
        assert_eq!(err, AudioError::TooLong { frames: 16_000_000_000_000_000_000 });

        let err = Capture::new(CaptureConfig::new(1, 1_100_000_000)).unwrap_err();
        assert_eq!(err, AudioError::TooLong { frames: 1_100_000_000 });
        assert!(!err.is_invalid_input());

        assert_eq!(CaptureConfig::new(1, MAX_FRAMES as u32).capacity(), Ok(MAX_FRAMES as usize));
        assert!(CaptureConfig::new(1, MAX_FRAMES as u32 + 1).capacity().is_err());
    }

    #[test]
    fn recording_saves_to_disk() {
        let mut cap = capture(4, 1);
        let rec = cap.timeout().unwrap().unwrap();
        let dir = std::env::temp_dir().join(format!("rnbo_host_save_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = rec.save(&dir).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), rec.wav);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
