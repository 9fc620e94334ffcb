//! The analyzer pipeline and its thread-shared handle.
//!
//! [`SpectrumAnalyzer`] owns every buffer of the pipeline and is driven from a
//! single thread at a time. [`SharedAnalyzer`] wraps it in one mutex so the
//! audio callback and the render loop can both reach it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::bands::{BandMapper, BandRange};
use super::config::SpectralConfig;
use super::diagnostics::{AnalysisStats, Diagnostics, DiagnosticsHook};
use super::error::ConfigError;
use super::ingest::{stereo_to_mono, AnalysisWindow};
use super::peaks::PeakTracker;
use super::smoothing::Smoother;
use super::transform::WindowedTransform;

/// Real-time spectrum analyzer.
///
/// Every buffer is allocated in [`new`](Self::new); processing samples and
/// advancing peaks never allocate.
#[derive(Debug)]
pub struct SpectrumAnalyzer {
    config: SpectralConfig,
    window: AnalysisWindow,
    transform: WindowedTransform,
    mapper: BandMapper,
    raw_levels: Vec<f32>,
    smoother: Smoother,
    peaks: PeakTracker,
    diagnostics: Diagnostics,
}

impl SpectrumAnalyzer {
    /// Validates `config` and allocates the pipeline.
    ///
    /// # Errors
    /// - If any parameter in `config` is out of range
    pub fn new(config: SpectralConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            window: AnalysisWindow::new(config.fft_size),
            transform: WindowedTransform::new(config.fft_size),
            mapper: BandMapper::new(&config),
            raw_levels: vec![0.0; config.num_bands],
            smoother: Smoother::new(config.num_bands, config.smoothing_factor),
            peaks: PeakTracker::new(config.num_bands),
            diagnostics: Diagnostics::default(),
            config,
        })
    }

    /// Ingests interleaved stereo samples, running a transform each time the
    /// window fills. A trailing unpaired sample is ignored.
    pub fn process(&mut self, samples: &[f32]) {
        for sample in stereo_to_mono(samples) {
            self.push_sample(sample);
        }
    }

    /// Ingests samples that are already mono.
    pub fn process_mono(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push_sample(sample);
        }
    }

    /// Advances peak hold by one render tick.
    pub fn advance_peaks(&mut self, decay_per_tick: f32) {
        self.peaks.advance(self.smoother.levels(), decay_per_tick);
    }

    /// Smoothed band levels, ascending in frequency.
    pub fn bands(&self) -> &[f32] {
        self.smoother.levels()
    }

    /// Peak levels, index-aligned with [`bands`](Self::bands).
    pub fn peaks(&self) -> &[f32] {
        self.peaks.peaks()
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Frequency and bin span of every band.
    pub fn band_layout(&self) -> &[BandRange] {
        self.mapper.bands()
    }

    /// Samples waiting in the analysis window.
    pub fn buffered(&self) -> usize {
        self.window.len()
    }

    pub fn stats(&self) -> AnalysisStats {
        self.diagnostics.stats()
    }

    /// Installs a hook called every `interval` transforms. An interval of 0
    /// removes any installed hook.
    pub fn set_diagnostics(&mut self, interval: u64, hook: DiagnosticsHook) {
        self.diagnostics.set_hook(interval, hook);
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear_hook();
    }

    #[inline]
    fn push_sample(&mut self, sample: f32) {
        self.window.push(sample);
        self.diagnostics.observe_sample(sample);

        if self.window.is_full() {
            self.analyze_window();
        }
    }

    fn analyze_window(&mut self) {
        self.window.apply_window(self.transform.coefficients());
        let spectrum = self.transform.execute(self.window.as_slice());
        self.mapper.map_into(spectrum, &mut self.raw_levels);
        self.smoother.update(&self.raw_levels);
        self.window.advance_half();

        self.diagnostics.record_transform(self.smoother.levels());
    }
}

/// Bands and peaks captured together under one lock acquisition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumSnapshot {
    pub bands: Vec<f32>,
    pub peaks: Vec<f32>,
}

/// Cloneable, lock-guarded handle to a [`SpectrumAnalyzer`].
///
/// All access goes through a single mutex. Read methods copy out of the
/// analyzer, so callers never hold references into its storage.
#[derive(Debug, Clone)]
pub struct SharedAnalyzer {
    inner: Arc<Mutex<SpectrumAnalyzer>>,
}

impl SharedAnalyzer {
    /// Validates `config` and wraps a new analyzer.
    ///
    /// # Errors
    /// - If any parameter in `config` is out of range
    pub fn new(config: SpectralConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_analyzer(SpectrumAnalyzer::new(config)?))
    }

    pub fn from_analyzer(analyzer: SpectrumAnalyzer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(analyzer)),
        }
    }

    /// See [`SpectrumAnalyzer::process`].
    pub fn process(&self, samples: &[f32]) {
        self.lock().process(samples);
    }

    /// See [`SpectrumAnalyzer::process_mono`].
    pub fn process_mono(&self, samples: &[f32]) {
        self.lock().process_mono(samples);
    }

    /// See [`SpectrumAnalyzer::advance_peaks`].
    pub fn advance_peaks(&self, decay_per_tick: f32) {
        self.lock().advance_peaks(decay_per_tick);
    }

    pub fn current_bands(&self) -> Vec<f32> {
        self.lock().bands().to_vec()
    }

    pub fn current_peaks(&self) -> Vec<f32> {
        self.lock().peaks().to_vec()
    }

    pub fn snapshot(&self) -> SpectrumSnapshot {
        let mut snapshot = SpectrumSnapshot::default();
        self.snapshot_into(&mut snapshot);
        snapshot
    }

    /// Copies bands and peaks into `snapshot`, reusing its allocations.
    pub fn snapshot_into(&self, snapshot: &mut SpectrumSnapshot) {
        let analyzer = self.lock();
        snapshot.bands.clear();
        snapshot.bands.extend_from_slice(analyzer.bands());
        snapshot.peaks.clear();
        snapshot.peaks.extend_from_slice(analyzer.peaks());
    }

    /// Runs `f` with exclusive access to the analyzer.
    pub fn with<R>(&self, f: impl FnOnce(&mut SpectrumAnalyzer) -> R) -> R {
        f(&mut self.lock())
    }

    // A panic elsewhere must not take the audio callback down with it.
    fn lock(&self) -> MutexGuard<'_, SpectrumAnalyzer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
