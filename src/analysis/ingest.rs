//! Sample ingest: channel reduction and the analysis window arena.

/// Averages interleaved stereo frames into mono samples.
///
/// A trailing unpaired sample is ignored.
pub fn stereo_to_mono(samples: &[f32]) -> impl Iterator<Item = f32> + '_ {
    samples
        .chunks_exact(2)
        .map(|frame| (frame[0] + frame[1]) * 0.5)
}

/// Fixed-capacity mono sample buffer with a write cursor.
///
/// Allocated once. Writes past capacity are dropped until
/// [`advance_half`](Self::advance_half) reclaims space.
#[derive(Debug)]
pub struct AnalysisWindow {
    samples: Vec<f32>,
    pos: usize,
}

impl AnalysisWindow {
    /// Creates an empty window of `size` samples. `size` must be even.
    pub fn new(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
            pos: 0,
        }
    }

    /// Appends a sample if there is room. Returns whether it was stored.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        match self.samples.get_mut(self.pos) {
            Some(slot) => {
                *slot = sample;
                self.pos += 1;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.pos == self.samples.len()
    }

    /// Number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// The full window contents, including stale samples past the cursor.
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Multiplies every sample in place by the matching coefficient.
    ///
    /// The windowed samples are what [`advance_half`](Self::advance_half)
    /// carries into the next window.
    pub fn apply_window(&mut self, coefficients: &[f32]) {
        debug_assert_eq!(coefficients.len(), self.samples.len());
        for (sample, &coeff) in self.samples.iter_mut().zip(coefficients) {
            *sample *= coeff;
        }
    }

    /// Moves the second half of the window to the front and places the
    /// cursor at the midpoint, giving 50% overlap with the next window.
    pub fn advance_half(&mut self) {
        let half = self.samples.len() / 2;
        self.samples.copy_within(half.., 0);
        self.pos = half;
    }
}
