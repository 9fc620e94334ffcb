//! Audio capture feeding the analyzer.
//!
//! Opens a cpal input stream in `f32` and hands every callback buffer straight
//! to a [`SharedAnalyzer`]. Stereo streams are passed interleaved; mono streams
//! skip the downmix.

pub mod devices;

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{
    BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedBufferSize,
    SupportedStreamConfig, SupportedStreamConfigRange,
};

use crate::analysis::SharedAnalyzer;

pub use devices::{find_device, list_input_devices, suppress_alsa_warnings, DeviceInfo};

/// Channel layouts the analyzer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn from_channels(channels: u16) -> Option<Self> {
        match channels {
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            _ => None,
        }
    }

    pub fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Picks an `f32` stream config at `sample_rate`, preferring stereo over mono.
pub fn select_stream_config<I>(ranges: I, sample_rate: u32) -> Option<SupportedStreamConfig>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let rate = SampleRate(sample_rate);
    ranges
        .into_iter()
        .filter(|range| range.sample_format() == SampleFormat::F32)
        .filter(|range| ChannelLayout::from_channels(range.channels()).is_some())
        .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
        .max_by_key(|range| range.channels())
        .map(|range| range.with_sample_rate(rate))
}

/// Uses a fixed callback size when the device supports `frames`.
fn buffer_size_for(supported: &SupportedBufferSize, frames: u32) -> BufferSize {
    match supported {
        SupportedBufferSize::Range { min, max } if frames > 0 && (*min..=*max).contains(&frames) => {
            BufferSize::Fixed(frames)
        }
        _ => BufferSize::Default,
    }
}

/// Live input stream delivering samples to an analyzer.
pub struct AudioCapture {
    device: cpal::Device,
    device_name: String,
    config: StreamConfig,
    layout: ChannelLayout,
    stream: Option<cpal::Stream>,
}

impl AudioCapture {
    /// Resolves the device and negotiates a stream format.
    ///
    /// The stream is not started; call [`start`](Self::start) once the
    /// analyzer for [`sample_rate`](Self::sample_rate) exists.
    ///
    /// # Errors
    /// - If the device cannot be found
    /// - If the device offers no mono or stereo `f32` input
    pub fn open(device_spec: &str, sample_rate: u32, buffer_size: u32) -> Result<Self> {
        let (device, supported) = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            let device = find_device(&host, device_spec)?;

            let ranges = device
                .supported_input_configs()
                .map_err(|e| anyhow!("Failed to query input configs: {e}"))?;
            if let Some(config) = select_stream_config(ranges, sample_rate) {
                return Ok((device, config));
            }

            let fallback = device.default_input_config()?;
            if fallback.sample_format() != SampleFormat::F32
                || ChannelLayout::from_channels(fallback.channels()).is_none()
            {
                return Err(anyhow!(
                    "Device offers no mono or stereo f32 input (default is {} channels, {})",
                    fallback.channels(),
                    fallback.sample_format()
                ));
            }
            tracing::warn!(
                "Requested sample rate {}Hz not supported. Capturing at device rate {}Hz.",
                sample_rate,
                fallback.sample_rate().0
            );
            Ok((device, fallback))
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        let layout = ChannelLayout::from_channels(supported.channels())
            .ok_or_else(|| anyhow!("Unsupported channel count {}", supported.channels()))?;

        let config = StreamConfig {
            channels: layout.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: buffer_size_for(supported.buffer_size(), buffer_size),
        };

        tracing::info!("Capture device: {}", device_name);
        tracing::debug!(
            "Stream configuration: {}Hz, {} channels, buffer {:?}",
            config.sample_rate.0,
            config.channels,
            config.buffer_size
        );

        Ok(Self {
            device,
            device_name,
            config,
            layout,
            stream: None,
        })
    }

    /// Builds and starts the input stream.
    ///
    /// # Errors
    /// - If the stream cannot be built or started
    pub fn start(&mut self, analyzer: SharedAnalyzer) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let layout = self.layout;
        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| match layout {
                ChannelLayout::Stereo => analyzer.process(data),
                ChannelLayout::Mono => analyzer.process_mono(data),
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::info!("Audio capture started");
        Ok(())
    }

    /// Stops capture by dropping the stream.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!("Audio capture stopped");
        }
    }

    /// Negotiated sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
