use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use pipespectrum::analysis::{decay_per_tick, SharedAnalyzer, SpectralConfig, SpectrumSnapshot};

fn config() -> SpectralConfig {
    SpectralConfig {
        fft_size: 1024,
        num_bands: 24,
        ..Default::default()
    }
}

fn chirp(frames: usize, offset: usize) -> Vec<f32> {
    (0..frames)
        .flat_map(|i| {
            let t = (i + offset) as f32 / 48_000.0;
            let left = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.6;
            let right = (2.0 * std::f32::consts::PI * 3_000.0 * t).sin() * 0.3;
            [left, right]
        })
        .collect()
}

fn assert_in_range(snapshot: &SpectrumSnapshot, bands: usize) {
    assert_eq!(snapshot.bands.len(), bands);
    assert_eq!(snapshot.peaks.len(), bands);
    for value in snapshot.bands.iter().chain(&snapshot.peaks) {
        assert!((0.0..=1.0).contains(value), "out of range: {value}");
    }
}

#[test]
fn concurrent_producer_ticker_and_readers() {
    let analyzer = SharedAnalyzer::new(config()).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let analyzer = analyzer.clone();
        thread::spawn(move || {
            for block in 0..200 {
                analyzer.process(&chirp(256, block * 256));
            }
        })
    };

    let ticker = {
        let analyzer = analyzer.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let decay = decay_per_tick(1.5, 60.0);
            while !done.load(Ordering::Relaxed) {
                analyzer.advance_peaks(decay);
                thread::yield_now();
            }
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let analyzer = analyzer.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut snapshot = SpectrumSnapshot::default();
                let mut reads = 0u32;
                while !done.load(Ordering::Relaxed) || reads == 0 {
                    analyzer.snapshot_into(&mut snapshot);
                    assert_in_range(&snapshot, 24);
                    reads += 1;
                    thread::yield_now();
                }
            })
        })
        .collect();

    producer.join().unwrap();
    done.store(true, Ordering::Relaxed);
    ticker.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let snapshot = analyzer.snapshot();
    assert_in_range(&snapshot, 24);
    assert!(snapshot.bands.iter().any(|&b| b > 0.0));
    analyzer.advance_peaks(0.0);
    let snapshot = analyzer.snapshot();
    for (band, peak) in snapshot.bands.iter().zip(&snapshot.peaks) {
        assert!(peak >= band);
    }
}

#[test]
fn readers_get_copies() {
    let analyzer = SharedAnalyzer::new(config()).unwrap();
    analyzer.process(&chirp(4096, 0));
    analyzer.advance_peaks(0.0);

    let before = analyzer.current_peaks();
    let bands = analyzer.current_bands();
    analyzer.advance_peaks(1.0);

    // A full-scale decay empties every peak that is not being pushed up,
    // while the copies taken earlier keep their values.
    assert!(before.iter().any(|&p| p > 0.0));
    assert!(analyzer.current_peaks().iter().all(|&p| p == 0.0));
    assert_eq!(bands, analyzer.current_bands());
}

#[test]
fn silence_after_signal_returns_to_zero() {
    let analyzer = SharedAnalyzer::new(config()).unwrap();
    analyzer.process(&chirp(4096, 0));
    assert!(analyzer.current_bands().iter().any(|&b| b > 0.0));

    analyzer.process(&vec![0.0f32; 2 * 48_000]);
    assert!(analyzer.current_bands().iter().all(|&b| b == 0.0));

    for _ in 0..200 {
        analyzer.advance_peaks(decay_per_tick(1.5, 60.0));
    }
    assert!(analyzer.current_peaks().iter().all(|&p| p == 0.0));
}
