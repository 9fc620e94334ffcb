//! Logarithmic band mapping.
//!
//! Spectrum bins are grouped into bands whose edges are evenly spaced on a
//! log10 frequency axis. Each band's mean magnitude is normalized, optionally
//! weighted, converted to dB and scaled into `[0, 1]`.

use std::ops::RangeInclusive;

use rustfft::num_complex::Complex;

use super::config::SpectralConfig;

/// Fixed gain applied before dB conversion.
const SENSITIVITY: f32 = 2.0;

/// Offset that keeps `log10` finite on silent input.
const DB_EPSILON: f32 = 1e-9;

/// Simplified A-weighting style curve boosting higher frequencies.
///
/// Rises linearly from 1.0 at 20Hz to 1.5 at 1kHz, then adds 0.8 per octave.
pub fn frequency_weight(freq: f32) -> f32 {
    if freq < 1000.0 {
        1.0 + (freq - 20.0) / 1000.0 * 0.5
    } else {
        1.5 + (freq / 1000.0).log2() * 0.8
    }
}

/// Frequency and bin span of a single band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandRange {
    /// Lower edge in Hz
    pub freq_low: f32,
    /// Upper edge in Hz
    pub freq_high: f32,
    /// Inclusive bin span, `None` when no bin maps to this band
    pub bins: Option<RangeInclusive<usize>>,
    /// Multiplier applied to the band magnitude
    pub weight: f32,
}

impl BandRange {
    /// Geometric mean of the band edges.
    pub fn center_freq(&self) -> f32 {
        (self.freq_low * self.freq_high).sqrt()
    }
}

/// Converts a spectrum into per-band normalized levels.
///
/// The band layout is computed once from the config; mapping a spectrum only
/// walks the precomputed bin ranges.
#[derive(Debug)]
pub struct BandMapper {
    bands: Vec<BandRange>,
    fft_size: usize,
    min_db: f32,
    max_db: f32,
    noise_threshold: f32,
}

impl BandMapper {
    pub fn new(config: &SpectralConfig) -> Self {
        let log_min = config.min_freq.log10();
        let log_max = config.max_freq.log10();
        let log_step = (log_max - log_min) / config.num_bands as f32;
        // The Nyquist bin is excluded from averaging.
        let last_bin = config.fft_size / 2 - 1;

        let bands = (0..config.num_bands)
            .map(|band| {
                let freq_low = 10f32.powf(log_min + band as f32 * log_step);
                let freq_high = 10f32.powf(log_min + (band + 1) as f32 * log_step);

                let bin_low = freq_to_bin(freq_low, config.fft_size, config.sample_rate);
                let bin_high =
                    freq_to_bin(freq_high, config.fft_size, config.sample_rate).min(last_bin);
                let bins = (bin_low <= bin_high).then_some(bin_low..=bin_high);

                let mut range = BandRange {
                    freq_low,
                    freq_high,
                    bins,
                    weight: 1.0,
                };
                if config.freq_weighting {
                    range.weight = frequency_weight(range.center_freq());
                }
                range
            })
            .collect();

        Self {
            bands,
            fft_size: config.fft_size,
            min_db: config.min_db,
            max_db: config.max_db,
            noise_threshold: config.noise_threshold,
        }
    }

    pub fn bands(&self) -> &[BandRange] {
        &self.bands
    }

    /// Writes one level per band into `levels`.
    ///
    /// Every slot is reset to 0 first, so a band without bins reports 0.
    pub fn map_into(&self, spectrum: &[Complex<f32>], levels: &mut [f32]) {
        levels.fill(0.0);

        for (band, level) in self.bands.iter().zip(levels.iter_mut()) {
            let Some(bins) = band.bins.clone() else {
                continue;
            };
            let Some(slice) = spectrum.get(bins) else {
                continue;
            };
            if slice.is_empty() {
                continue;
            }

            let sum: f32 = slice.iter().map(|c| c.norm()).sum();
            let average = sum / slice.len() as f32;
            *level = self.normalize(average, band.weight);
        }
    }

    /// Maps a mean bin magnitude to a gated level in `[0, 1]`.
    pub fn normalize(&self, magnitude: f32, weight: f32) -> f32 {
        let amplitude = magnitude / (self.fft_size as f32 * 0.5) * weight;
        let db = 20.0 * (amplitude * SENSITIVITY + DB_EPSILON).log10();

        let normalized = ((db - self.min_db) / (self.max_db - self.min_db)).clamp(0.0, 1.0);
        if normalized < self.noise_threshold {
            0.0
        } else {
            normalized
        }
    }
}

/// Truncating frequency-to-bin conversion.
fn freq_to_bin(freq: f32, fft_size: usize, sample_rate: u32) -> usize {
    (freq * fft_size as f32 / sample_rate as f32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_bands: usize, fft_size: usize) -> SpectralConfig {
        SpectralConfig {
            fft_size,
            num_bands,
            freq_weighting: false,
            noise_threshold: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_weight_curve() {
        assert!((frequency_weight(20.0) - 1.0).abs() < 1e-6);
        assert!((frequency_weight(1000.0) - 1.5).abs() < 1e-6);
        assert!((frequency_weight(2000.0) - 2.3).abs() < 1e-5);
        assert!((frequency_weight(520.0) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_band_edges_are_ascending_and_contiguous() {
        let mapper = BandMapper::new(&config(32, 8192));
        let bands = mapper.bands();

        assert_eq!(bands.len(), 32);
        assert!((bands[0].freq_low - 20.0).abs() < 1e-3);
        assert!((bands[31].freq_high - 20000.0).abs() / 20000.0 < 1e-4);
        for pair in bands.windows(2) {
            assert!(pair[0].freq_low < pair[1].freq_low);
            assert_eq!(pair[0].freq_high, pair[1].freq_low);
        }
    }

    #[test]
    fn test_bins_clipped_below_nyquist() {
        let mapper = BandMapper::new(&SpectralConfig {
            fft_size: 8,
            num_bands: 1,
            ..config(1, 8)
        });
        assert_eq!(mapper.bands()[0].bins, Some(0..=3));
    }

    #[test]
    fn test_narrow_low_bands_share_bins() {
        // 256-point FFT at 48kHz has 187.5Hz bins, so the lowest bands all
        // land on the DC bin while the top band is clipped to the last bin.
        let mapper = BandMapper::new(&SpectralConfig {
            sample_rate: 48000,
            max_freq: 23900.0,
            ..config(64, 256)
        });
        let bands = mapper.bands();
        assert_eq!(bands[0].bins, Some(0..=0));
        assert_eq!(bands[1].bins, Some(0..=0));
        assert_eq!(bands[63].bins.as_ref().map(|b| *b.end()), Some(127));

        let spectrum = vec![Complex::new(1.0, 0.0); 129];
        let mut levels = vec![0.5; 64];
        mapper.map_into(&spectrum, &mut levels);
        assert!(levels.iter().all(|l| (0.0..=1.0).contains(l)));
        assert_eq!(levels[0], levels[1]);
    }

    #[test]
    fn test_empty_band_reports_zero() {
        let mapper = BandMapper::new(&SpectralConfig {
            fft_size: 8,
            max_freq: 23900.0,
            ..config(1, 8)
        });
        let band = BandRange {
            bins: None,
            ..mapper.bands()[0].clone()
        };
        let mapper = BandMapper {
            bands: vec![band],
            ..mapper
        };
        let spectrum = vec![Complex::new(4.0, 0.0); 5];
        let mut levels = vec![0.7];
        mapper.map_into(&spectrum, &mut levels);
        assert_eq!(levels, vec![0.0]);
    }

    #[test]
    fn test_normalize_maps_db_window() {
        let mapper = BandMapper::new(&config(1, 8));
        // fft_size 8: amplitude = m / 4 * 2 = m / 2
        assert_eq!(mapper.normalize(0.0, 1.0), 0.0);
        assert!((mapper.normalize(2.0, 1.0) - 1.0).abs() < 1e-6);
        // -40dB sits halfway through a -80..0 window
        assert!((mapper.normalize(0.02, 1.0) - 0.5).abs() < 1e-3);
        assert_eq!(mapper.normalize(1000.0, 1.0), 1.0);
    }

    #[test]
    fn test_noise_gate_forces_zero() {
        let mapper = BandMapper::new(&SpectralConfig {
            noise_threshold: 0.6,
            ..config(1, 8)
        });
        assert_eq!(mapper.normalize(0.02, 1.0), 0.0);
        assert!(mapper.normalize(0.2, 1.0) > 0.6);
    }

    #[test]
    fn test_weighting_raises_level() {
        let flat = BandMapper::new(&config(8, 4096));
        let weighted = BandMapper::new(&SpectralConfig {
            freq_weighting: true,
            ..config(8, 4096)
        });
        let last = weighted.bands().len() - 1;
        assert!(weighted.bands()[last].weight > 1.5);
        assert!(
            weighted.normalize(1.0, weighted.bands()[last].weight)
                > flat.normalize(1.0, flat.bands()[last].weight)
        );
    }
}
