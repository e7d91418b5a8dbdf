use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use super::Renderer;
use crate::playback::exchange::PlaybackPosition;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Draws playback progress with a spectrum sparkline on the terminal
pub struct TerminalRenderer {
    bar: ProgressBar,
    columns: usize,
    peak: f32,
    line: String,
}

impl TerminalRenderer {
    pub fn new(total_samples: u64, columns: usize, peak_magnitude: f32) -> Result<Self> {
        let bar = ProgressBar::new(total_samples);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:30.cyan/blue} {percent:>3}% {msg}")?
                .progress_chars("=>-"),
        );
        Ok(Self {
            bar,
            columns: columns.max(1),
            peak: peak_magnitude,
            line: String::with_capacity(columns * 3),
        })
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, magnitudes: &[f32], position: &PlaybackPosition) -> Result<()> {
        sparkline(magnitudes, self.columns, self.peak, &mut self.line);
        if position.finished {
            self.line.push_str(" [end]");
        }
        self.bar.set_position(position.cursor.min(self.bar.length().unwrap_or(u64::MAX)));
        self.bar.set_message(self.line.clone());
        Ok(())
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

/// Group `magnitudes` into `columns` buckets and render each bucket's maximum
/// as a block character, square-root scaled against `peak`.
fn sparkline(magnitudes: &[f32], columns: usize, peak: f32, out: &mut String) {
    out.clear();
    if magnitudes.is_empty() {
        return;
    }
    let columns = columns.min(magnitudes.len());
    let peak = peak.max(1e-10);

    for c in 0..columns {
        let start = c * magnitudes.len() / columns;
        let end = ((c + 1) * magnitudes.len() / columns).max(start + 1);
        let value = magnitudes[start..end].iter().copied().fold(0.0f32, f32::max);
        let level = (value / peak).clamp(0.0, 1.0).sqrt();
        let idx = ((level * (LEVELS.len() - 1) as f32).round() as usize).min(LEVELS.len() - 1);
        out.push(LEVELS[idx]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_has_one_char_per_column() {
        let mags: Vec<f32> = (0..513).map(|i| i as f32).collect();
        let mut line = String::new();
        sparkline(&mags, 48, 512.0, &mut line);
        assert_eq!(line.chars().count(), 48);
        assert_eq!(line.chars().last(), Some('█'));
    }

    #[test]
    fn silence_draws_lowest_level() {
        let mut line = String::new();
        sparkline(&[0.0; 9], 4, 0.0, &mut line);
        assert_eq!(line, "▁▁▁▁");
    }

    #[test]
    fn fewer_bins_than_columns() {
        let mut line = String::new();
        sparkline(&[1.0, 0.0], 10, 1.0, &mut line);
        assert_eq!(line, "█▁");
    }

    #[test]
    fn draw_tracks_cursor() {
        let mut renderer = TerminalRenderer::new(100, 8, 1.0).unwrap();
        renderer.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        let position = PlaybackPosition {
            cursor: 250,
            frame_index: Some(3),
            finished: true,
        };
        renderer.draw(&[0.5; 5], &position).unwrap();
        assert_eq!(renderer.bar.position(), 100);
        assert!(renderer.line.ends_with(" [end]"));
        renderer.finish();
    }
}
