//! Output device enumeration.

use crate::Result;
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

/// Get device name using the cpal 0.17 description API.
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub default_channels: u16,
    /// Whether this is the system default output.
    pub is_default: bool,
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (default_sample_rate, default_channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((48000, 2));
    Some(AudioDevice {
        is_default: default_name == Some(name.as_str()),
        name,
        default_sample_rate,
        default_channels,
    })
}

/// List output devices on the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let devices = host
        .output_devices()
        .map_err(|e| crate::Error::Stream(e.to_string()))?
        .filter_map(|device| describe(&device, default_name.as_deref()))
        .collect::<Vec<_>>();

    tracing::debug!(count = devices.len(), "enumerated output devices");
    Ok(devices)
}

/// The default output device on the default host.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let mut device = describe(&d, None)?;
        device.is_default = true;
        Some(device)
    }))
}
