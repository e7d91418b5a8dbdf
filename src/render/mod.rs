pub mod terminal;

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::error::ConfigError;
use crate::playback::device::StreamFault;
use crate::playback::exchange::{FrameExchange, PlaybackPosition};

/// Consumer of the current spectral frame, drawn once per display tick.
pub trait Renderer {
    /// `magnitudes` has exactly `frame_size / 2 + 1` entries.
    fn draw(&mut self, magnitudes: &[f32], position: &PlaybackPosition) -> Result<()>;

    fn finish(&mut self) {}
}

#[derive(Debug, Clone, Copy)]
pub struct RenderLoopOptions {
    pub fps: u32,
    /// End the loop once the cursor reaches this many samples; `None` runs forever
    pub stop_after: Option<u64>,
}

impl RenderLoopOptions {
    pub fn new(fps: u32, stop_after: Option<u64>) -> Result<Self, ConfigError> {
        if fps == 0 {
            return Err(ConfigError::InvalidFps(fps));
        }
        Ok(Self { fps, stop_after })
    }

    fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}

pub fn validate_linger(seconds: f32) -> Result<f32, ConfigError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(ConfigError::InvalidLinger(seconds))
    }
}

/// Cursor at which the loop ends: the whole recording plus `linger` seconds
/// at the device rate, saturating at `u64::MAX`.
pub fn stop_after_samples(total_samples: u64, linger: f32, sample_rate: u32) -> u64 {
    // `as` saturates for floats that overflow u64
    let linger_samples = (linger as f64 * sample_rate as f64) as u64;
    total_samples.saturating_add(linger_samples)
}

/// Drive `renderer` at a fixed cadence until the stop condition is met.
/// Returns the number of frames drawn.
///
/// A fault raised by the audio stream ends the loop with a device error,
/// since the cursor will never reach `stop_after` once the callback stops.
pub fn run_render_loop<R: Renderer>(
    exchange: &FrameExchange,
    renderer: &mut R,
    fault: &StreamFault,
    options: RenderLoopOptions,
) -> Result<u64> {
    let tick = options.tick();
    let mut magnitudes = vec![0.0f32; exchange.frame_len()];
    let mut drawn = 0u64;
    let mut next_tick = Instant::now();

    loop {
        let position = exchange.copy_current_frame(&mut magnitudes);
        renderer.draw(&magnitudes, &position)?;
        drawn += 1;

        if options.stop_after.is_some_and(|limit| position.cursor >= limit) {
            break;
        }
        if let Err(e) = fault.check() {
            renderer.finish();
            return Err(e.into());
        }

        next_tick += tick;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            // Fell behind; drop the missed ticks instead of bursting
            next_tick = now;
        }
    }

    renderer.finish();
    log::debug!("Render loop finished after {} frames", drawn);
    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::frames::{SpectralFrame, SpectralFrameSequence};
    use crate::error::PipelineError;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingRenderer {
        lengths: Vec<usize>,
        positions: Vec<PlaybackPosition>,
        finished: bool,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, magnitudes: &[f32], position: &PlaybackPosition) -> Result<()> {
            self.lengths.push(magnitudes.len());
            self.positions.push(*position);
            Ok(())
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    fn exchange() -> FrameExchange {
        let frames = (0..8).map(|i| SpectralFrame::new(vec![i as f32; 9])).collect();
        FrameExchange::new(Arc::new(SpectralFrameSequence::new(frames, 16, 8, 8000)), 64)
    }

    #[test]
    fn rejects_zero_fps() {
        assert_eq!(
            RenderLoopOptions::new(0, None).unwrap_err(),
            ConfigError::InvalidFps(0)
        );
    }

    #[test]
    fn linger_must_be_finite_and_non_negative() {
        assert_eq!(validate_linger(2.5), Ok(2.5));
        assert_eq!(validate_linger(0.0), Ok(0.0));
        assert_eq!(validate_linger(-1.0), Err(ConfigError::InvalidLinger(-1.0)));
        assert!(validate_linger(f32::INFINITY).is_err());
        assert!(validate_linger(f32::NAN).is_err());
    }

    #[test]
    fn stop_point_saturates_instead_of_wrapping() {
        assert_eq!(stop_after_samples(44_100, 1.0, 44_100), 88_200);
        assert_eq!(stop_after_samples(10, 0.0, 48_000), 10);
        assert_eq!(stop_after_samples(u64::MAX - 5, 1.0, 192_000), u64::MAX);
        assert_eq!(stop_after_samples(1, 1.0e30, 48_000), u64::MAX);
    }

    #[test]
    fn stops_once_cursor_reaches_limit() {
        let ex = exchange();
        ex.publish(64);
        let mut renderer = RecordingRenderer::default();
        let options = RenderLoopOptions::new(1000, Some(64)).unwrap();

        let drawn = run_render_loop(&ex, &mut renderer, &StreamFault::default(), options).unwrap();
        assert_eq!(drawn, 1);
        assert!(renderer.finished);
        assert_eq!(renderer.positions[0].frame_index, Some(7));
    }

    #[test]
    fn draws_full_frames_while_playback_advances() {
        let ex = exchange();
        let mut renderer = RecordingRenderer::default();
        let options = RenderLoopOptions::new(500, Some(64)).unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for cursor in (0..=64).step_by(4) {
                    ex.publish(cursor);
                    std::thread::sleep(Duration::from_millis(2));
                }
            });
            run_render_loop(&ex, &mut renderer, &StreamFault::default(), options).unwrap();
        });

        assert!(!renderer.lengths.is_empty());
        assert!(renderer.lengths.iter().all(|&n| n == 9));
        let cursors: Vec<u64> = renderer.positions.iter().map(|p| p.cursor).collect();
        assert!(cursors.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*cursors.last().unwrap(), 64);
    }

    #[test]
    fn renderer_errors_end_the_loop() {
        struct Failing;
        impl Renderer for Failing {
            fn draw(&mut self, _: &[f32], _: &PlaybackPosition) -> Result<()> {
                anyhow::bail!("surface lost")
            }
        }
        let ex = exchange();
        let options = RenderLoopOptions::new(60, None).unwrap();
        assert!(run_render_loop(&ex, &mut Failing, &StreamFault::default(), options).is_err());
    }

    #[test]
    fn stream_fault_ends_a_stalled_loop() {
        let ex = exchange();
        // The callback stopped short of the stop point and never advances again
        ex.publish(32);
        let fault = StreamFault::default();
        let mut renderer = RecordingRenderer::default();
        let options = RenderLoopOptions::new(500, Some(72)).unwrap();

        let err = std::thread::scope(|s| {
            let raiser = fault.clone();
            s.spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                raiser.raise("device unplugged");
            });
            run_render_loop(&ex, &mut renderer, &fault, options).unwrap_err()
        });

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Device(msg)) if msg.contains("device unplugged")
        ));
        assert!(renderer.finished);
        assert!(renderer.positions.iter().all(|p| p.cursor == 32));
    }
}
