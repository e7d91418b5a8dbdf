//! Synchronization bridge between the audio callback and the render loop.
//!
//! The only mutable state shared by the two threads is [`PlaybackPosition`].
//! The writer replaces it in O(1) under the lock; readers take a snapshot
//! and copy magnitudes from the immutable frame sequence after releasing it,
//! so the audio thread never waits on a magnitude copy or a draw call.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::audio::frames::SpectralFrameSequence;

/// Consistent view of playback progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackPosition {
    /// Samples emitted to the device since start
    pub cursor: u64,
    /// Frame matching `cursor`; `None` only when no frames were produced
    pub frame_index: Option<usize>,
    /// True once the cursor has passed the last recorded sample
    pub finished: bool,
}

pub struct FrameExchange {
    frames: Arc<SpectralFrameSequence>,
    total_samples: u64,
    state: Mutex<PlaybackPosition>,
}

impl FrameExchange {
    pub fn new(frames: Arc<SpectralFrameSequence>, total_samples: usize) -> Self {
        let initial = PlaybackPosition {
            cursor: 0,
            frame_index: frames.frame_index_for(0),
            finished: total_samples == 0,
        };
        Self {
            frames,
            total_samples: total_samples as u64,
            state: Mutex::new(initial),
        }
    }

    #[cfg(test)]
    pub fn frames(&self) -> &Arc<SpectralFrameSequence> {
        &self.frames
    }

    /// Length of the buffer readers should pass to [`copy_current_frame`](Self::copy_current_frame)
    pub fn frame_len(&self) -> usize {
        self.frames.bins()
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Writer side. Called once per audio callback with the updated cursor.
    #[inline]
    pub fn publish(&self, cursor: u64) {
        let next = PlaybackPosition {
            cursor,
            frame_index: self.frames.frame_index_for(cursor),
            finished: cursor >= self.total_samples,
        };
        *self.state.lock() = next;
    }

    pub fn position(&self) -> PlaybackPosition {
        *self.state.lock()
    }

    /// Copy the current frame's magnitudes into `out` and return the position
    /// they belong to. Entries of `out` beyond the frame length are zeroed, as
    /// is the whole buffer when there is no frame to show.
    pub fn copy_current_frame(&self, out: &mut [f32]) -> PlaybackPosition {
        let position = self.position();

        match position.frame_index.and_then(|i| self.frames.get(i)) {
            Some(frame) => {
                let magnitudes = frame.magnitudes();
                let n = magnitudes.len().min(out.len());
                out[..n].copy_from_slice(&magnitudes[..n]);
                out[n..].fill(0.0);
            }
            None => out.fill(0.0),
        }

        position
    }
}
