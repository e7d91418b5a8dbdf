use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::AudioSamples;
use super::frames::{SpectralFrame, SpectralFrameSequence};
use super::window::WindowKind;
use crate::error::ConfigError;

/// Validated STFT parameters. Only obtainable through [`WindowSpec::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    frame_size: usize,
    hop_size: usize,
    window: WindowKind,
}

impl WindowSpec {
    pub fn new(frame_size: usize, hop_size: usize, window: WindowKind) -> Result<Self, ConfigError> {
        if frame_size == 0 || frame_size % 2 == 1 {
            return Err(ConfigError::InvalidFrameSize(frame_size));
        }
        if hop_size >= frame_size {
            return Err(ConfigError::InvalidHopSize {
                hop: hop_size,
                frame_size,
            });
        }
        Ok(Self {
            frame_size,
            hop_size,
            window,
        })
    }

    /// Parses the window name as well, so every startup check fails the same way
    pub fn parse(frame_size: usize, hop_size: usize, window: &str) -> Result<Self, ConfigError> {
        let window = window.parse::<WindowKind>()?;
        Self::new(frame_size, hop_size, window)
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn window(&self) -> WindowKind {
        self.window
    }

    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Number of hop positions `h` with `h * hop < total_samples`.
    /// A hop of 0 analyses the whole signal as a single frame.
    pub fn frame_count(&self, total_samples: usize) -> usize {
        if self.hop_size == 0 {
            1
        } else {
            total_samples.div_ceil(self.hop_size)
        }
    }
}

/// Compute the magnitude STFT of the whole recording.
pub fn analyze(audio: &AudioSamples, spec: &WindowSpec) -> SpectralFrameSequence {
    let samples = &audio.samples;
    let frame_size = spec.frame_size;
    let hop = spec.hop_size;
    let bins = spec.bins();
    let total_frames = spec.frame_count(samples.len());

    log::info!(
        "Analyzing {} frames (fft size {}, hop {}, {} window)...",
        total_frames,
        frame_size,
        hop,
        spec.window
    );

    let weights = spec.window.weights(frame_size);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let scratch_len = fft.get_inplace_scratch_len();

    let frames: Vec<SpectralFrame> = (0..total_frames)
        .into_par_iter()
        .map_init(
            || {
                (
                    vec![Complex::new(0.0f32, 0.0); frame_size],
                    vec![Complex::new(0.0f32, 0.0); scratch_len],
                )
            },
            |(buffer, scratch), h| {
                let start = h * hop;
                let end = (start + frame_size).min(samples.len());
                let available = end.saturating_sub(start);

                // Zero-pad past the end of the recording
                for (i, slot) in buffer.iter_mut().enumerate() {
                    let s = if i < available { samples[start + i] } else { 0.0 };
                    *slot = Complex::new(s * weights[i], 0.0);
                }

                fft.process_with_scratch(buffer, scratch);

                // Bins above N/2 mirror the lower half for real input
                let magnitudes = buffer[..bins].iter().map(|c| c.norm()).collect();
                SpectralFrame::new(magnitudes)
            },
        )
        .collect();

    let sequence = SpectralFrameSequence::new(frames, frame_size, hop, audio.sample_rate);

    log::info!(
        "Analysis complete: {} frames x {} bins, {:.1}s of audio, last frame at {:.2}s",
        sequence.len(),
        bins,
        audio.duration_secs(),
        sequence.last_index().map_or(0.0, |i| sequence.frame_start_seconds(i))
    );

    sequence
}
