mod audio;
mod cli;
mod config;
mod error;
mod playback;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use audio::analysis::{analyze, WindowSpec};
use cli::Cli;
use playback::device::{list_output_devices, PlaybackSession};
use playback::driver::{validate_volume, PlaybackDriver};
use playback::exchange::FrameExchange;
use render::terminal::TerminalRenderer;
use render::{run_render_loop, stop_after_samples, validate_linger, RenderLoopOptions};

const SPECTRUM_COLUMNS: usize = 48;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect specplay.toml / user config
    if let Some(path) = config::find_config_path(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            config::merge_into(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.list_devices {
        println!("Output devices:");
        for device in list_output_devices()? {
            let marker = if device.is_default { " (default)" } else { "" };
            println!("  {}{}", device.name, marker);
        }
        return Ok(());
    }

    // Reject bad settings before touching the file
    let spec = WindowSpec::parse(cli.fft_size, cli.hop_size, &cli.window)?;
    let volume = validate_volume(cli.volume)?;
    let linger = validate_linger(cli.linger)?;
    let mut render_options = RenderLoopOptions::new(cli.fps, None)?;

    let input = cli.input.as_ref().context("Input audio file is required")?;

    log::info!(
        "Displaying FFT of {} with size {}, hop {}, and window type {}",
        input.display(),
        spec.frame_size(),
        spec.hop_size(),
        spec.window()
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio = Arc::new(audio::decode::decode_audio(input)?);

    // 2. Analyze once; the sequence is read-only from here on
    let frames = Arc::new(analyze(&audio, &spec));
    let peak = frames.peak_magnitude();
    let exchange = Arc::new(FrameExchange::new(Arc::clone(&frames), audio.len()));

    // 3. Register the audio callback
    let driver = PlaybackDriver::new(Arc::clone(&audio), Arc::clone(&exchange), volume)?;
    let session = PlaybackSession::start(cli.device.as_deref(), audio.sample_rate, driver)
        .context("Failed to start playback")?;

    // 4. Render until the recording (plus linger) has played
    render_options.stop_after = Some(stop_after_samples(
        exchange.total_samples(),
        linger,
        session.sample_rate(),
    ));

    let mut renderer = TerminalRenderer::new(exchange.total_samples(), SPECTRUM_COLUMNS, peak)?;
    let result = run_render_loop(&exchange, &mut renderer, session.fault(), render_options);

    // 5. Unregister the callback before the shared buffers go away
    session.stop();
    let drawn = result?;

    log::info!("Done! Rendered {} frames", drawn);
    Ok(())
}
