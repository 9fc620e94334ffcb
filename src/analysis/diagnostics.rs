//! Optional periodic diagnostics for the analyzer.

/// Counters accumulated by the analyzer between hook invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisStats {
    /// Transforms run since construction
    pub transforms: u64,
    /// Largest absolute mono sample since the last report
    pub max_sample: f32,
    /// Largest smoothed band level since the last report
    pub max_band: f32,
}

/// Callback receiving [`AnalysisStats`].
///
/// Runs on the audio thread while the analyzer lock is held, so it should
/// only record or hand off the numbers.
pub type DiagnosticsHook = Box<dyn FnMut(&AnalysisStats) + Send>;

/// Accumulates stats and fires the hook every `interval` transforms.
#[derive(Default)]
pub(crate) struct Diagnostics {
    stats: AnalysisStats,
    interval: u64,
    hook: Option<DiagnosticsHook>,
}

impl Diagnostics {
    pub(crate) fn set_hook(&mut self, interval: u64, hook: DiagnosticsHook) {
        if interval == 0 {
            self.hook = None;
            return;
        }
        self.interval = interval;
        self.hook = Some(hook);
    }

    pub(crate) fn clear_hook(&mut self) {
        self.hook = None;
    }

    #[inline]
    pub(crate) fn observe_sample(&mut self, sample: f32) {
        self.stats.max_sample = self.stats.max_sample.max(sample.abs());
    }

    pub(crate) fn record_transform(&mut self, levels: &[f32]) {
        self.stats.transforms += 1;
        let loudest = levels.iter().copied().fold(0.0f32, f32::max);
        self.stats.max_band = self.stats.max_band.max(loudest);

        if let Some(hook) = self.hook.as_mut() {
            if self.stats.transforms % self.interval == 0 {
                hook(&self.stats);
                self.stats.max_sample = 0.0;
                self.stats.max_band = 0.0;
            }
        }
    }

    pub(crate) fn stats(&self) -> AnalysisStats {
        self.stats
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("stats", &self.stats)
            .field("interval", &self.interval)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
