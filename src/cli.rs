use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "specplay", about = "Plays an audio file while displaying its short-time Fourier transform")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// FFT frame size in samples (even, > 0)
    #[arg(long, default_value_t = 1024)]
    pub fft_size: usize,

    /// Samples between consecutive frames (0 analyses the whole file as one frame)
    #[arg(long, default_value_t = 0)]
    pub hop_size: usize,

    /// FFT window type: rectangle or hanning
    #[arg(long, default_value = "rectangle")]
    pub window: String,

    /// Playback gain (0.0-1.0)
    #[arg(long, default_value_t = 0.4)]
    pub volume: f32,

    /// Display refresh rate
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Seconds to keep displaying the final frame after the recording ends
    #[arg(long, default_value_t = 1.0)]
    pub linger: f32,

    /// Output device name (default device if omitted)
    #[arg(short, long)]
    pub device: Option<String>,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Config file (defaults to ./specplay.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
