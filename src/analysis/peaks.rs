//! Peak hold with linear, frame-clocked decay.

/// Per-tick decay that empties a full peak in `fall_time` seconds when
/// [`PeakTracker::advance`] runs `frame_rate` times per second.
pub fn decay_per_tick(fall_time: f32, frame_rate: f32) -> f32 {
    1.0 / (fall_time * frame_rate)
}

/// Tracks the highest recent level per band.
///
/// Peaks rise instantly to the current level and otherwise fall by a fixed
/// amount per render tick, independent of how often transforms run.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    peaks: Vec<f32>,
}

impl PeakTracker {
    pub fn new(num_bands: usize) -> Self {
        Self {
            peaks: vec![0.0; num_bands],
        }
    }

    /// Advances every peak by one render tick against the current levels.
    pub fn advance(&mut self, levels: &[f32], decay: f32) {
        for (peak, &level) in self.peaks.iter_mut().zip(levels.iter()) {
            if level > *peak {
                *peak = level;
            } else {
                *peak = (*peak - decay).max(0.0);
            }
        }
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }
}
