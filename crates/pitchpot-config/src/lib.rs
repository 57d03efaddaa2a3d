//! Configuration for the pitchpot synth.
//!
//! A single TOML document describes the output stream, the converter and the
//! tone ranges. It is read once at startup; nothing reloads it at runtime.
//!
//! # Features
//!
//! - **SynthConfig**: `[audio]`, `[control]` and `[tone]` tables, all defaulted
//! - **Validation**: every violation reported in one pass
//! - **Paths**: platform-specific user config location
//!
//! # Example
//!
//! ```rust,no_run
//! use pitchpot_config::{SynthConfig, paths};
//!
//! let (config, source) = SynthConfig::discover(None).unwrap();
//! config.validate().unwrap();
//! if source.is_none() {
//!     config.save(paths::default_config_path()).unwrap();
//! }
//! ```
//!
//! A complete file with the defaults:
//!
//! ```toml
//! [audio]
//! sample_rate = 44100
//! buffer_size = 512
//! table_size = 4096
//! channels = 1
//!
//! [control]
//! poll_hz = 100.0
//! frequency_channel = 5
//! amplitude_channel = 6
//! max_code = 1023
//! spi_device = "/dev/spidev0.0"
//! spi_speed_hz = 1350000
//!
//! [tone]
//! freq_min = 100.0
//! freq_max = 2000.0
//! amp_max = 0.8
//! smoothing_tau_s = 0.02
//! initial_frequency = 440.0
//! initial_amplitude = 0.2
//! smoothing_interval = "nominal"
//! ```

mod error;
mod synth;

/// Platform-specific configuration paths.
pub mod paths;

/// Configuration validation.
pub mod validation;

pub use error::ConfigError;
pub use synth::{AudioConfig, ControlConfig, SmoothingMode, SynthConfig, ToneConfig};
pub use validation::{ValidationError, ValidationResult, validate_config, violations};

// Re-export path helpers at the crate root.
pub use paths::{default_config_path, ensure_user_config_dir, user_config_dir};
