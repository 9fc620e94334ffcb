//! Windowed forward transform over the analysis window.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Symmetric Hann window of `size` coefficients.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f32;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos()))
        .collect()
}

/// Real-to-complex transform with a plan built once, plus the Hann
/// coefficients for its size.
///
/// The input buffer, scratch space and FFT plan are allocated at
/// construction, so [`execute`](Self::execute) never allocates.
pub struct WindowedTransform {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl WindowedTransform {
    pub fn new(fft_size: usize) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            window: hann_window(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Number of non-redundant output bins (`fft_size / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.fft_size() / 2 + 1
    }

    /// Hann coefficients, one per input sample.
    pub fn coefficients(&self) -> &[f32] {
        &self.window
    }

    /// Transforms already-windowed `input`, returning the non-redundant half
    /// of the spectrum. `input` must be exactly `fft_size` samples.
    pub fn execute(&mut self, input: &[f32]) -> &[Complex<f32>] {
        debug_assert_eq!(input.len(), self.window.len());

        for (slot, &sample) in self.buffer.iter_mut().zip(input.iter()) {
            *slot = Complex::new(sample, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let bins = self.num_bins();
        &self.buffer[..bins]
    }
}

impl std::fmt::Debug for WindowedTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowedTransform")
            .field("fft_size", &self.fft_size())
            .finish()
    }
}
