/// Magnitude spectrum of one analysis frame (non-negative frequency bins, low to high)
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralFrame {
    magnitudes: Vec<f32>,
}

impl SpectralFrame {
    pub fn new(magnitudes: Vec<f32>) -> Self {
        Self { magnitudes }
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }
}

/// Chronologically ordered frames covering a whole recording.
///
/// Built once by the analyzer and never mutated afterwards, so it is shared
/// between the audio callback and the render loop behind an `Arc` without
/// further locking.
#[derive(Clone, Debug)]
pub struct SpectralFrameSequence {
    frames: Vec<SpectralFrame>,
    frame_size: usize,
    hop_size: usize,
    sample_rate: u32,
}

impl SpectralFrameSequence {
    pub fn new(frames: Vec<SpectralFrame>, frame_size: usize, hop_size: usize, sample_rate: u32) -> Self {
        Self {
            frames,
            frame_size,
            hop_size,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Magnitude values per frame: `frame_size / 2 + 1`
    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    pub fn get(&self, index: usize) -> Option<&SpectralFrame> {
        self.frames.get(index)
    }

    #[cfg(test)]
    pub fn iter(&self) -> std::slice::Iter<'_, SpectralFrame> {
        self.frames.iter()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    /// Frame shown when `cursor` samples have been played:
    /// `min(cursor / hop, last_index)`. With hop 0 there is a single frame.
    pub fn frame_index_for(&self, cursor: u64) -> Option<usize> {
        let last = self.last_index()?;
        if self.hop_size == 0 {
            return Some(0);
        }
        let index = cursor / self.hop_size as u64;
        Some(usize::try_from(index).map_or(last, |i| i.min(last)))
    }

    /// Start time of frame `index` in seconds
    pub fn frame_start_seconds(&self, index: usize) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop_size) as f32 / self.sample_rate as f32
    }

    /// Largest magnitude across every frame, used to normalise displays
    pub fn peak_magnitude(&self) -> f32 {
        self.frames
            .iter()
            .flat_map(|f| f.magnitudes.iter().copied())
            .fold(0.0f32, f32::max)
    }
}
