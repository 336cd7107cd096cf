//! Async driver for [`Capture`]: races incoming chunks against the capture
//! window and publishes the countdown once per second.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::capture::{Capture, Recording};
use crate::error::AudioError;

/// One block of stereo audio as delivered by the audio callback.
#[derive(Debug, Clone, Default)]
pub struct AudioChunk {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl AudioChunk {
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        AudioChunk { left, right }
    }
}

/// Run `capture` until the buffer fills, the window elapses, or the chunk
/// source closes. Remaining seconds are sent on `progress` every second.
///
/// Chunks with mismatched channels are dropped with a warning and recording
/// carries on.
pub async fn record(
    capture: Capture,
    chunks: mpsc::Receiver<AudioChunk>,
    progress: watch::Sender<u32>,
) -> Result<Recording, AudioError> {
    let deadline = Instant::now() + Duration::from_secs(capture.remaining_secs() as u64);
    record_until(capture, chunks, progress, deadline).await
}

/// [`record`] against an explicit end of window. If the deadline and a
/// filling chunk are ready together, the deadline wins.
pub async fn record_until(
    mut capture: Capture,
    mut chunks: mpsc::Receiver<AudioChunk>,
    progress: watch::Sender<u32>,
    deadline: Instant,
) -> Result<Recording, AudioError> {
    let deadline = time::sleep_until(deadline);
    tokio::pin!(deadline);

    let mut ticker = time::interval_at(Instant::now() + Duration::from_secs(1), Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Nobody listening is fine.
    let _ = progress.send(capture.remaining_secs());

    loop {
        tokio::select! {
            biased;
            _ = &mut deadline => {
                if let Some(rec) = capture.timeout()? {
                    let _ = progress.send(0);
                    return Ok(rec);
                }
                return Err(AudioError::AlreadyFinalized);
            }
            chunk = chunks.recv() => match chunk {
                Some(chunk) => match capture.push(&chunk.left, &chunk.right) {
                    Ok(Some(rec)) => {
                        let _ = progress.send(0);
                        return Ok(rec);
                    }
                    Ok(None) => {}
                    Err(e) if e.is_invalid_input() => {
                        warn!(error = %e, "dropping malformed chunk");
                    }
                    Err(e) => return Err(e),
                },
                None => {
                    debug!(written = capture.written(), "chunk source closed, finalizing early");
                    let _ = progress.send(0);
                    return capture.finalize()?.ok_or(AudioError::AlreadyFinalized);
                }
            },
            _ = ticker.tick() => {
                let remaining = capture.tick();
                debug!(remaining, "capture countdown");
                let _ = progress.send(remaining);
            }
        }
    }
}
