//! Output backend abstraction.
//!
//! [`AudioBackend`] keeps the session logic independent of cpal so that a
//! session can be driven by a deterministic backend in tests. Callbacks are
//! boxed closures, which keeps the trait object-safe.
//!
//! ```text
//! SynthSession ──uses──▶ AudioBackend ──▶ CpalBackend (ALSA, CoreAudio, WASAPI)
//!                                     └─▶ test backends
//! ```

use crate::{AudioDevice, Result};

/// Requested output stream parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendStreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Interleaved output channels.
    pub channels: u16,
    /// Device name filter (partial, case-insensitive). System default if `None`.
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            channels: 1,
            device_name: None,
        }
    }
}

impl From<&pitchpot_config::AudioConfig> for BackendStreamConfig {
    fn from(audio: &pitchpot_config::AudioConfig) -> Self {
        Self {
            sample_rate: audio.sample_rate,
            buffer_size: audio.buffer_size,
            channels: audio.channels,
            device_name: audio.device.clone(),
        }
    }
}

/// Type-erased running stream.
///
/// Output continues while the handle exists; dropping it stops playback.
/// Some platform streams cannot leave the thread that built them, so the
/// handle is not `Send`.
pub struct StreamHandle {
    _inner: Box<dyn std::any::Any>,
}

impl StreamHandle {
    /// Wraps a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Fills one interleaved output buffer.
///
/// Runs on the real-time audio thread: no allocation, locks or I/O.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Receives stream faults reported by the backend, as text.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// An audio output API.
pub trait AudioBackend {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Enumerates output-capable devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The system default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Opens and starts an output stream that pulls samples from `callback`.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;
}
