//! cpal-based output backend.
//!
//! [`CpalBackend`] is the backend used by the `pitchpot` binary. It wraps the
//! platform's default cpal host (ALSA on a Raspberry Pi).

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle,
};
use crate::devices::device_name;
use crate::{AudioDevice, Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// cpal-based audio backend.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Find an output device whose name contains `name`, or the default.
    fn find_output_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        let Some(search) = name else {
            return self.host.default_output_device().ok_or(Error::NoDevice);
        };

        let search_lower = search.to_lowercase();
        let devices = self
            .host
            .output_devices()
            .map_err(|e| Error::Stream(e.to_string()))?;

        for device in devices {
            if let Ok(dev_name) = device_name(&device)
                && dev_name.to_lowercase().contains(search_lower.as_str())
            {
                return Ok(device);
            }
        }
        Err(Error::DeviceNotFound(format!(
            "no output device matching '{search}'"
        )))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalBackend")
            .field("host", &self.host.id().name())
            .finish()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        crate::devices::list_devices()
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        crate::devices::default_output_device()
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_output_device(config.device_name.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| String::from("<unnamed>"));

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}
