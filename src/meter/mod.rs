//! The render loop.
//!
//! Ticks at the configured frame rate, advances peak decay, copies the current
//! levels out of the shared analyzer and hands them to a [`FrameSink`].

pub mod ui;
pub mod widget;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::analysis::{AnalysisStats, DiagnosticsHook, SharedAnalyzer, SpectrumSnapshot};

pub use ui::{command_for_key, MeterCommand, MeterInfo, MeterTui};
pub use widget::SpectrumWidget;

/// Something that can show frames and report user commands.
pub trait FrameSink {
    /// Returns the next pending command without blocking.
    fn poll_command(&mut self) -> anyhow::Result<MeterCommand>;

    /// Shows one frame.
    fn draw(&mut self, snapshot: &SpectrumSnapshot, show_peaks: bool) -> anyhow::Result<()>;
}

impl FrameSink for MeterTui {
    fn poll_command(&mut self) -> anyhow::Result<MeterCommand> {
        self.handle_input()
    }

    fn draw(&mut self, snapshot: &SpectrumSnapshot, show_peaks: bool) -> anyhow::Result<()> {
        MeterTui::draw(self, snapshot, show_peaks)
    }
}

/// Render loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSettings {
    pub frame_rate: u32,
    pub peak_fall_time: f32,
    pub show_peaks: bool,
}

impl MeterSettings {
    fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterExit {
    /// The user pressed a quit key
    UserQuit,
    /// The shutdown flag was raised
    Shutdown,
}

/// Peak decay for `elapsed` wall-clock time.
///
/// At the nominal cadence this equals `1 / (fall_time * frame_rate)`; longer
/// gaps between frames decay proportionally more so the fall time holds when
/// ticks are skipped.
pub fn peak_decay(elapsed: Duration, fall_time: f32) -> f32 {
    elapsed.as_secs_f32() / fall_time
}

/// Analyzer hook that publishes stats, and the receiving end for the render loop.
///
/// The hook only stores the latest value; formatting and logging happen on
/// the render side.
pub fn stats_channel() -> (DiagnosticsHook, watch::Receiver<AnalysisStats>) {
    let (tx, rx) = watch::channel(AnalysisStats::default());
    let hook: DiagnosticsHook = Box::new(move |stats: &AnalysisStats| {
        tx.send_replace(*stats);
    });
    (hook, rx)
}

/// Stats published since the last call, if any.
fn latest_stats(rx: &mut watch::Receiver<AnalysisStats>) -> Option<AnalysisStats> {
    match rx.has_changed() {
        Ok(true) => Some(*rx.borrow_and_update()),
        _ => None,
    }
}

/// Runs the meter until the user quits or `shutdown` is raised.
///
/// Analyzer stats arriving on `diagnostics` are logged at debug level.
///
/// # Errors
/// - If reading input or drawing a frame fails
pub async fn run_meter<S: FrameSink>(
    analyzer: &SharedAnalyzer,
    sink: &mut S,
    settings: MeterSettings,
    shutdown: &AtomicBool,
    mut diagnostics: Option<watch::Receiver<AnalysisStats>>,
) -> anyhow::Result<MeterExit> {
    let period = settings.frame_period();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut show_peaks = settings.show_peaks;
    let mut snapshot = SpectrumSnapshot::default();
    let mut last_frame = Instant::now();
    let mut frame_count = 0u64;

    tracing::debug!(
        "Entering render loop at {}fps (peak fall time {}s)",
        settings.frame_rate,
        settings.peak_fall_time
    );

    loop {
        ticker.tick().await;

        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("Shutdown signal received");
            return Ok(MeterExit::Shutdown);
        }

        match sink.poll_command()? {
            MeterCommand::Quit => return Ok(MeterExit::UserQuit),
            MeterCommand::TogglePeaks => {
                show_peaks = !show_peaks;
                tracing::debug!("Peak caps {}", if show_peaks { "shown" } else { "hidden" });
            }
            MeterCommand::Continue => {}
        }

        let now = Instant::now();
        let decay = peak_decay(now - last_frame, settings.peak_fall_time);
        last_frame = now;

        analyzer.advance_peaks(decay);
        analyzer.snapshot_into(&mut snapshot);
        sink.draw(&snapshot, show_peaks)?;

        if let Some(stats) = diagnostics.as_mut().and_then(latest_stats) {
            tracing::debug!(
                "Analyzer: {} transforms, max sample {:.3}, max band {:.3}",
                stats.transforms,
                stats.max_sample,
                stats.max_band
            );
        }

        frame_count += 1;
        if frame_count.is_multiple_of(u64::from(settings.frame_rate.max(1)) * 10) {
            let loudest = snapshot.bands.iter().copied().fold(0.0f32, f32::max);
            tracing::debug!("Rendered {} frames, loudest band {:.3}", frame_count, loudest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SpectralConfig;

    /// Records frames and replays a scripted list of commands.
    struct ScriptedSink {
        commands: Vec<MeterCommand>,
        frames: Vec<(SpectrumSnapshot, bool)>,
    }

    impl ScriptedSink {
        fn new(mut commands: Vec<MeterCommand>) -> Self {
            commands.reverse();
            Self {
                commands,
                frames: Vec::new(),
            }
        }
    }

    impl FrameSink for ScriptedSink {
        fn poll_command(&mut self) -> anyhow::Result<MeterCommand> {
            Ok(self.commands.pop().unwrap_or(MeterCommand::Quit))
        }

        fn draw(&mut self, snapshot: &SpectrumSnapshot, show_peaks: bool) -> anyhow::Result<()> {
            self.frames.push((snapshot.clone(), show_peaks));
            Ok(())
        }
    }

    fn analyzer() -> SharedAnalyzer {
        SharedAnalyzer::new(SpectralConfig {
            fft_size: 1024,
            num_bands: 8,
            ..Default::default()
        })
        .unwrap()
    }

    fn settings() -> MeterSettings {
        MeterSettings {
            frame_rate: 1000,
            peak_fall_time: 1.5,
            show_peaks: true,
        }
    }

    #[test]
    fn test_peak_decay_matches_tick_rate() {
        let decay = peak_decay(Duration::from_secs_f32(1.0 / 60.0), 1.5);
        let expected = crate::analysis::decay_per_tick(1.5, 60.0);
        assert!((decay - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_draws_until_quit() {
        let analyzer = analyzer();
        let mut sink = ScriptedSink::new(vec![MeterCommand::Continue; 4]);
        let shutdown = AtomicBool::new(false);

        let exit = run_meter(&analyzer, &mut sink, settings(), &shutdown, None)
            .await
            .unwrap();

        assert_eq!(exit, MeterExit::UserQuit);
        assert_eq!(sink.frames.len(), 4);
        for (snapshot, show_peaks) in &sink.frames {
            assert_eq!(snapshot.bands.len(), 8);
            assert_eq!(snapshot.peaks.len(), 8);
            assert!(*show_peaks);
        }
    }

    #[tokio::test]
    async fn test_toggle_peaks() {
        let analyzer = analyzer();
        let mut sink = ScriptedSink::new(vec![
            MeterCommand::TogglePeaks,
            MeterCommand::Continue,
            MeterCommand::TogglePeaks,
        ]);
        let shutdown = AtomicBool::new(false);

        run_meter(&analyzer, &mut sink, settings(), &shutdown, None)
            .await
            .unwrap();

        let shown: Vec<bool> = sink.frames.iter().map(|(_, show)| *show).collect();
        assert_eq!(shown, vec![false, false, true]);
    }

    #[tokio::test]
    async fn test_shutdown_flag_stops_loop() {
        let analyzer = analyzer();
        let mut sink = ScriptedSink::new(vec![MeterCommand::Continue; 100]);
        let shutdown = AtomicBool::new(true);

        let exit = run_meter(&analyzer, &mut sink, settings(), &shutdown, None)
            .await
            .unwrap();

        assert_eq!(exit, MeterExit::Shutdown);
        assert!(sink.frames.is_empty());
    }

    #[tokio::test]
    async fn test_peaks_fall_between_frames() {
        let analyzer = analyzer();
        let tone: Vec<f32> = (0..4096)
            .flat_map(|i| {
                let s = (i as f32 * 0.3).sin() * 0.8;
                [s, s]
            })
            .collect();
        analyzer.process(&tone);
        analyzer.advance_peaks(0.0);
        let start = analyzer.current_peaks();

        // Silence the levels so only decay acts on the peaks.
        analyzer.process(&vec![0.0f32; 200_000]);

        let mut sink = ScriptedSink::new(vec![MeterCommand::Continue; 5]);
        let shutdown = AtomicBool::new(false);
        run_meter(&analyzer, &mut sink, settings(), &shutdown, None)
            .await
            .unwrap();

        let (last, _) = sink.frames.last().unwrap();
        assert!(start.iter().any(|&p| p > 0.0));
        for (before, after) in start.iter().zip(&last.peaks) {
            assert!(after <= before);
            assert!(*after >= 0.0);
        }
    }

    #[test]
    fn test_latest_stats_reports_each_update_once() {
        let (tx, mut rx) = watch::channel(AnalysisStats::default());
        assert_eq!(latest_stats(&mut rx), None);

        tx.send_replace(AnalysisStats {
            transforms: 10,
            ..Default::default()
        });
        assert_eq!(latest_stats(&mut rx).map(|s| s.transforms), Some(10));
        assert_eq!(latest_stats(&mut rx), None);
    }

    #[tokio::test]
    async fn test_stats_reach_render_loop() {
        let analyzer = analyzer();
        let (hook, rx) = stats_channel();
        analyzer.with(|a| a.set_diagnostics(1, hook));
        analyzer.process(&vec![0.25f32; 2 * 2048]);

        let mut peek = rx.clone();
        let stats = latest_stats(&mut peek).unwrap();
        assert_eq!(stats.transforms, analyzer.with(|a| a.stats().transforms));

        let mut sink = ScriptedSink::new(vec![MeterCommand::Continue; 2]);
        let shutdown = AtomicBool::new(false);
        let exit = run_meter(&analyzer, &mut sink, settings(), &shutdown, Some(rx))
            .await
            .unwrap();
        assert_eq!(exit, MeterExit::UserQuit);
        assert_eq!(sink.frames.len(), 2);
    }
}
