//! Audio output layer for pitchpot.
//!
//! This crate provides:
//!
//! - **Output backends**: [`AudioBackend`] with the cpal implementation [`CpalBackend`]
//! - **Live sessions**: [`SynthSession`] wires a control input, the sampler
//!   thread and the oscillator into a running output stream
//! - **Offline rendering**: [`render_offline`] runs the same pipeline in
//!   simulated time and returns the samples
//! - **WAV output**: [`write_wav`] and [`read_wav`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pitchpot_config::SynthConfig;
//! use pitchpot_io::{CpalBackend, SynthSession};
//! use pitchpot_platform::SweepInput;
//!
//! let config = SynthConfig::default();
//! let session = SynthSession::start(&CpalBackend::new(), Box::new(SweepInput::new(400)), &config)?;
//! std::thread::sleep(std::time::Duration::from_secs(5));
//! let summary = session.stop(std::time::Duration::from_millis(100));
//! ```

pub mod backend;
pub mod cpal_backend;
mod devices;
mod offline;
mod session;
mod wav;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_output_device, list_devices};
pub use offline::{OfflineRender, render_offline};
pub use session::{SessionSummary, SynthSession, sampler_settings};
pub use wav::{WavSpec, read_wav, write_wav};

use pitchpot_config::ValidationError;
use pitchpot_platform::ControlError;

/// Error types for audio output and session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio output device available on the system.
    #[error("No audio output device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0} (run `pitchpot devices` to list outputs)")]
    DeviceNotFound(String),

    /// The control input could not be set up.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// The configuration cannot drive a session.
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
