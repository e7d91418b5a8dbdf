use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    #[serde(default)]
    pub hop_size: usize,
    #[serde(default = "default_window")]
    pub window: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_linger")]
    pub linger: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            hop_size: 0,
            window: default_window(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            device: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            linger: default_linger(),
        }
    }
}

fn default_frame_size() -> usize { 1024 }
fn default_window() -> String { "rectangle".into() }
fn default_volume() -> f32 { 0.4 }
fn default_fps() -> u32 { 30 }
fn default_linger() -> f32 { 1.0 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Explicit path, else ./specplay.toml, else the user config directories
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("specplay.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("specplay").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("specplay").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Config values apply only where the CLI is still at its default
pub fn merge_into(cli: &mut Cli, cfg: Config) {
    if cli.fft_size == 1024 { cli.fft_size = cfg.analysis.frame_size; }
    if cli.hop_size == 0 { cli.hop_size = cfg.analysis.hop_size; }
    if cli.window == "rectangle" { cli.window = cfg.analysis.window; }
    if cli.volume == 0.4 { cli.volume = cfg.playback.volume; }
    if cli.device.is_none() { cli.device = cfg.playback.device; }
    if cli.fps == 30 { cli.fps = cfg.render.fps; }
    if cli.linger == 1.0 { cli.linger = cfg.render.linger; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.analysis.frame_size, 1024);
        assert_eq!(cfg.analysis.hop_size, 0);
        assert_eq!(cfg.analysis.window, "rectangle");
        assert_eq!(cfg.playback.volume, 0.4);
        assert_eq!(cfg.render.fps, 30);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [analysis]
            hop_size = 256
            window = "hanning"

            [playback]
            device = "Speakers"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.analysis.frame_size, 1024);
        assert_eq!(cfg.analysis.hop_size, 256);
        assert_eq!(cfg.analysis.window, "hanning");
        assert_eq!(cfg.playback.volume, 0.4);
        assert_eq!(cfg.playback.device.as_deref(), Some("Speakers"));
        assert_eq!(cfg.render.linger, 1.0);
    }

    #[test]
    fn cli_values_win_over_config() {
        let mut cli = Cli::try_parse_from(["specplay", "--fft-size", "512", "a.wav"]).unwrap();
        let cfg: Config = toml::from_str(
            r#"
            [analysis]
            frame_size = 4096
            hop_size = 128
            [render]
            fps = 60
            "#,
        )
        .unwrap();
        merge_into(&mut cli, cfg);
        assert_eq!(cli.fft_size, 512);
        assert_eq!(cli.hop_size, 128);
        assert_eq!(cli.fps, 60);
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specplay.toml");
        std::fs::write(&path, "[playback]\nvolume = 0.8\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.playback.volume, 0.8);

        std::fs::write(&path, "[playback\n").unwrap();
        assert!(load_config(&path).is_none());
    }
}
