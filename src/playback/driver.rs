use std::sync::Arc;

use super::exchange::FrameExchange;
use crate::audio::decode::AudioSamples;
use crate::error::ConfigError;

/// Audio callback target. Owned by the device thread once playback starts.
///
/// Each fill writes `volume * sample` while the cursor is inside the
/// recording and silence afterwards, then publishes the new cursor to the
/// exchange exactly once. The fill paths never allocate, block on I/O or log.
pub struct PlaybackDriver {
    audio: Arc<AudioSamples>,
    exchange: Arc<FrameExchange>,
    volume: f32,
    cursor: u64,
}

impl PlaybackDriver {
    pub fn new(
        audio: Arc<AudioSamples>,
        exchange: Arc<FrameExchange>,
        volume: f32,
    ) -> Result<Self, ConfigError> {
        let volume = validate_volume(volume)?;
        Ok(Self {
            audio,
            exchange,
            volume,
            cursor: 0,
        })
    }

    #[cfg(test)]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Fill a mono output buffer, one recording sample per slot.
    pub fn fill(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.next_sample();
        }
        self.exchange.publish(self.cursor);
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    /// of a frame. The cursor advances once per frame.
    pub fn fill_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels <= 1 {
            self.fill(out);
            return;
        }
        for frame in out.chunks_mut(channels) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
        self.exchange.publish(self.cursor);
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let sample = usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.audio.samples.get(i))
            .map_or(0.0, |&s| s * self.volume);
        self.cursor = self.cursor.saturating_add(1);
        sample
    }
}

pub fn validate_volume(volume: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err(ConfigError::InvalidVolume(volume))
    }
}
