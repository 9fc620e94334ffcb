//! Live spectrum meter.
//!
//! Opens the capture device, builds an analyzer for the rate the device runs at
//! and drives the render loop until the user quits or SIGINT/SIGTERM arrives.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::anyhow;

use crate::analysis::SharedAnalyzer;
use crate::capture::AudioCapture;
use crate::config::PipeSpectrumConfig;
use crate::meter::{run_meter, stats_channel, MeterExit, MeterInfo, MeterSettings, MeterTui};

/// Runs the spectrum meter.
///
/// # Errors
/// - If the configuration cannot be loaded or is invalid
/// - If the audio device cannot be opened or started
/// - If the terminal cannot be initialized or drawn to
pub async fn handle_run(config_path: Option<&Path>) -> Result<(), anyhow::Error> {
    tracing::info!("=== pipespectrum started ===");

    let config_data = PipeSpectrumConfig::load(config_path)?;
    config_data
        .validate()
        .map_err(|e| anyhow!("Configuration error: {e}"))?;

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, fft_size={}, bands={}, frame_rate={}",
        config_data.audio.device,
        config_data.spectrum.sample_rate,
        config_data.spectrum.fft_size,
        config_data.spectrum.bands,
        config_data.render.frame_rate
    );

    let mut capture = AudioCapture::open(
        &config_data.audio.device,
        config_data.spectrum.sample_rate,
        config_data.audio.buffer_size,
    )?;

    let analysis_config = config_data
        .spectrum
        .analysis_config(capture.sample_rate())
        .map_err(|e| anyhow!("Configuration error: {e}"))?;
    let fft_size = analysis_config.fft_size;
    let analyzer = SharedAnalyzer::new(analysis_config)?;

    let diagnostics = if config_data.render.diagnostics_interval > 0 {
        let (hook, stats) = stats_channel();
        analyzer.with(|a| a.set_diagnostics(config_data.render.diagnostics_interval, hook));
        Some(stats)
    } else {
        None
    };

    capture.start(analyzer.clone())?;

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;
    }

    let info = MeterInfo {
        device_name: capture.device_name().to_string(),
        sample_rate: capture.sample_rate(),
        fft_size,
        bands: config_data.spectrum.bands,
        frame_rate: config_data.render.frame_rate,
    };
    let settings = MeterSettings {
        frame_rate: config_data.render.frame_rate,
        peak_fall_time: config_data.spectrum.peak_fall_time,
        show_peaks: config_data.spectrum.peak_hold_enabled,
    };

    let mut tui = MeterTui::new(config_data.visualization.clone(), info)
        .map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    let result = run_meter(&analyzer, &mut tui, settings, &shutdown, diagnostics).await;

    // Restore the terminal before reporting any render error.
    let cleanup = tui.cleanup();
    capture.stop();

    let exit = result?;
    cleanup.map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    match exit {
        MeterExit::UserQuit => tracing::info!("Meter closed by user"),
        MeterExit::Shutdown => tracing::info!("Meter stopped by signal"),
    }
    tracing::info!("=== pipespectrum exited successfully ===");
    Ok(())
}
