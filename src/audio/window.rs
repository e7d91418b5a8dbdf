use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Per-sample weighting applied to a frame before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    #[default]
    Rectangle,
    Hanning,
}

impl WindowKind {
    pub fn weights(self, size: usize) -> Vec<f32> {
        match self {
            WindowKind::Rectangle => vec![1.0; size],
            WindowKind::Hanning => hann_window(size),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindowKind::Rectangle => "rectangle",
            WindowKind::Hanning => "hanning",
        }
    }
}

impl FromStr for WindowKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(WindowKind::Rectangle),
            "hanning" => Ok(WindowKind::Hanning),
            other => Err(ConfigError::UnknownWindow(other.to_string())),
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rectangle_is_all_ones() {
        let w = WindowKind::Rectangle.weights(16);
        assert_eq!(w.len(), 16);
        assert!(w.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn hann_edges_and_centre() {
        let size = 1025;
        let w = WindowKind::Hanning.weights(size);
        assert_eq!(w.len(), size);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[size - 1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[size / 2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn hann_is_symmetric() {
        let w = WindowKind::Hanning.weights(64);
        for i in 0..32 {
            assert_abs_diff_eq!(w[i], w[63 - i], epsilon = 1e-5);
        }
    }

    #[test]
    fn parses_command_line_names() {
        assert_eq!("rectangle".parse::<WindowKind>(), Ok(WindowKind::Rectangle));
        assert_eq!("hanning".parse::<WindowKind>(), Ok(WindowKind::Hanning));
        assert_eq!(
            "hamming".parse::<WindowKind>(),
            Err(ConfigError::UnknownWindow("hamming".into()))
        );
        assert!("Hanning".parse::<WindowKind>().is_err());
    }
}
