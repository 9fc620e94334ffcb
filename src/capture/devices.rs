//! Input device lookup.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// An input device as shown by `pipespectrum list-devices`.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    /// Default (sample rate, channels), if the device reports one
    pub default_config: Option<(u32, u16)>,
}

/// Resolves an input device by "default", numeric index, or exact name.
///
/// # Errors
/// - If no default device exists
/// - If the index is out of range or no device has the given name
pub fn find_device(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    if device_spec == "default" {
        return host
            .default_input_device()
            .ok_or_else(|| anyhow!("No audio input device available"));
    }

    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();
        let count = devices.len();

        return devices.into_iter().nth(index).ok_or_else(|| {
            anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            )
        });
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if device.name().is_ok_and(|name| name == device_spec) {
            return Ok(device);
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'pipespectrum list-devices' to see available devices."
    ))
}

/// Lists input devices on the default host, skipping any whose name cannot be read.
///
/// # Errors
/// - If the host cannot enumerate devices
pub fn list_input_devices() -> Result<Vec<DeviceInfo>> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?;

        let infos = devices
            .filter_map(|device| device.name().ok().map(|name| (device, name)))
            .enumerate()
            .map(|(index, (device, name))| {
                let default_config = device
                    .default_input_config()
                    .ok()
                    .map(|config| (config.sample_rate().0, config.channels()));
                DeviceInfo {
                    index,
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                    default_config,
                }
            })
            .collect();

        Ok(infos)
    })
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
