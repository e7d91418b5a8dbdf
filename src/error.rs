//! Error types for the spectral playback pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Rejected startup configuration. Detected before any analysis runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fft size must be an even number greater than 0 (got {0})")]
    InvalidFrameSize(usize),

    #[error("hop size must be less than fft size (got hop {hop}, fft size {frame_size})")]
    InvalidHopSize { hop: usize, frame_size: usize },

    #[error("fft window type must be 'rectangle' or 'hanning' (got '{0}')")]
    UnknownWindow(String),

    #[error("volume must be within 0.0..=1.0 (got {0})")]
    InvalidVolume(f32),

    #[error("render rate must be greater than 0 fps (got {0})")]
    InvalidFps(u32),

    #[error("linger must be a finite, non-negative number of seconds (got {0})")]
    InvalidLinger(f32),
}

/// Pipeline error type
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid frame size, hop size, window kind or gain
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The audio file could not be opened or decoded
    #[error("Failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// The output device could not be opened or the callback not registered
    #[error("Audio device error: {0}")]
    Device(String),
}

impl PipelineError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PipelineError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
