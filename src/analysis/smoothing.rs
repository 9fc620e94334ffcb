//! Exponential smoothing of band levels across transforms.

/// Blended levels below this are stored as exactly zero.
const SILENCE_FLOOR: f32 = 1.0e-6;

/// Per-band exponential moving average.
///
/// `level = level * factor + raw * (1 - factor)`, except that a blended level
/// below `SILENCE_FLOOR` (1e-6) is stored as 0. This departs from the plain
/// formula: for `factor > 0.5` the smallest subnormal `f32` is a fixed point of
/// `x * factor`, so the plain average of silence never reaches zero. The
/// smoothed state is the band output exposed by the analyzer.
#[derive(Debug, Clone)]
pub struct Smoother {
    factor: f32,
    levels: Vec<f32>,
}

impl Smoother {
    pub fn new(num_bands: usize, factor: f32) -> Self {
        Self {
            factor,
            levels: vec![0.0; num_bands],
        }
    }

    /// Blends a fresh set of raw levels into the running state.
    pub fn update(&mut self, raw: &[f32]) {
        let keep = self.factor;
        let take = 1.0 - self.factor;

        for (level, &value) in self.levels.iter_mut().zip(raw.iter()) {
            let blended = *level * keep + value * take;
            *level = if blended < SILENCE_FLOOR { 0.0 } else { blended };
        }
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

}
