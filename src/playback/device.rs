//! Audio output device management

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::Arc;

use super::driver::PlaybackDriver;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

/// Get list of available output devices
pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    let devices = host
        .output_devices()
        .map_err(|e| PipelineError::Device(format!("Failed to enumerate devices: {}", e)))?;

    let mut result = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            result.push(AudioDeviceInfo {
                is_default: Some(&name) == default_name.as_ref(),
                name,
            });
        }
    }

    Ok(result)
}

/// Get output device by name, or the default device if name is None
pub fn get_output_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match name {
        Some(device_name) => {
            let devices = host
                .output_devices()
                .map_err(|e| PipelineError::Device(format!("Failed to enumerate devices: {}", e)))?;

            for device in devices {
                if device.name().map_or(false, |n| n == device_name) {
                    return Ok(device);
                }
            }
            Err(PipelineError::Device(format!("Device '{}' not found", device_name)))
        }
        None => host
            .default_output_device()
            .ok_or_else(|| PipelineError::Device("No default output device found".to_string())),
    }
}

/// Pick a stream config running at the recording's sample rate when the
/// device supports it, falling back to the device default.
pub fn get_playback_config(device: &cpal::Device, sample_rate: u32) -> Result<cpal::StreamConfig> {
    let supported_configs = device
        .supported_output_configs()
        .map_err(|e| PipelineError::Device(format!("Failed to get supported configs: {}", e)))?;

    for range in supported_configs {
        if range.sample_format() != cpal::SampleFormat::F32 {
            continue;
        }
        if sample_rate >= range.min_sample_rate().0 && sample_rate <= range.max_sample_rate().0 {
            let config = range.with_sample_rate(cpal::SampleRate(sample_rate)).config();
            return Ok(cpal::StreamConfig {
                channels: config.channels.min(2),
                sample_rate: config.sample_rate,
                buffer_size: cpal::BufferSize::Default,
            });
        }
    }

    let default_config = device
        .default_output_config()
        .map_err(|e| PipelineError::Device(format!("Failed to get default config: {}", e)))?;

    log::warn!(
        "Device does not support {}Hz, using {}Hz; playback speed will differ from the recording",
        sample_rate,
        default_config.sample_rate().0
    );

    Ok(cpal::StreamConfig {
        channels: default_config.channels().min(2),
        sample_rate: default_config.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    })
}

/// First error reported by the stream after it started playing.
///
/// Shared between the stream's error callback and whoever waits on playback.
#[derive(Debug, Clone, Default)]
pub struct StreamFault {
    error: Arc<Mutex<Option<String>>>,
}

impl StreamFault {
    /// Record `message` unless an earlier fault is already stored
    pub fn raise(&self, message: impl ToString) {
        let mut error = self.error.lock();
        if error.is_none() {
            *error = Some(message.to_string());
        }
    }

    pub fn check(&self) -> Result<()> {
        match self.error.lock().as_ref() {
            Some(message) => Err(PipelineError::Device(message.clone())),
            None => Ok(()),
        }
    }
}

/// A registered output stream driving a [`PlaybackDriver`].
///
/// The driver lives inside the stream callback; dropping the session
/// unregisters the callback before the shared sample and frame data can be
/// released.
pub struct PlaybackSession {
    stream: cpal::Stream,
    config: cpal::StreamConfig,
    device_name: String,
    fault: StreamFault,
}

impl PlaybackSession {
    pub fn start(device_name: Option<&str>, sample_rate: u32, mut driver: PlaybackDriver) -> Result<Self> {
        let device = get_output_device(device_name)?;
        let config = get_playback_config(&device, sample_rate)?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let channels = config.channels as usize;

        log::info!(
            "Audio: {} @ {}Hz, {} channel(s), volume {:.2}",
            name,
            config.sample_rate.0,
            channels,
            driver.volume()
        );

        let fault = StreamFault::default();
        let on_error = fault.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    driver.fill_interleaved(data, channels);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                    on_error.raise(format!("Audio stream failed: {}", err));
                },
                None,
            )
            .map_err(|e| PipelineError::Device(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| PipelineError::Device(format!("Failed to start audio stream: {}", e)))?;

        Ok(Self {
            stream,
            config,
            device_name: name,
            fault,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Raised when the stream reports an error after starting
    pub fn fault(&self) -> &StreamFault {
        &self.fault
    }

    /// Pause and drop the stream. No callback runs after this returns.
    pub fn stop(self) {
        if let Err(e) = self.stream.pause() {
            log::warn!("Failed to pause audio stream: {}", e);
        }
        drop(self.stream);
        log::info!("Playback stopped on {}", self.device_name);
    }
}
