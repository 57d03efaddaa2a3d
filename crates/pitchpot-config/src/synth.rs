//! The `SynthConfig` document.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pitchpot_core::{ControlMapping, ControlRange, SmoothedParameters};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::paths;
use crate::validation::{self, ValidationError};

/// Complete process configuration.
///
/// Every field has a default, so an empty file (or a file that sets only a
/// few keys) is valid TOML for this type.
///
/// # Example
///
/// ```rust
/// use pitchpot_config::SynthConfig;
///
/// let config = SynthConfig::from_toml(
///     r#"
///     [tone]
///     freq_max = 1500.0
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.tone.freq_max, 1500.0);
/// assert_eq!(config.audio.sample_rate, 44100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SynthConfig {
    /// Output stream settings.
    pub audio: AudioConfig,
    /// Converter and sampler settings.
    pub control: ControlConfig,
    /// Parameter ranges and smoothing.
    pub tone: ToneConfig,
}

/// `[audio]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per audio callback.
    pub buffer_size: u32,
    /// Sine table length.
    pub table_size: usize,
    /// Output channels; the mono signal is copied to each.
    pub channels: u16,
    /// Output device name (partial, case-insensitive). Default device if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            table_size: 4096,
            channels: 1,
            device: None,
        }
    }
}

/// `[control]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Sampler ticks per second.
    pub poll_hz: f32,
    /// Converter channel of the frequency knob.
    pub frequency_channel: u8,
    /// Converter channel of the amplitude knob.
    pub amplitude_channel: u8,
    /// Full-scale converter code.
    pub max_code: u16,
    /// spidev node of the converter.
    pub spi_device: String,
    /// SPI clock in Hz.
    pub spi_speed_hz: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_hz: 100.0,
            frequency_channel: 5,
            amplitude_channel: 6,
            max_code: 1023,
            spi_device: String::from("/dev/spidev0.0"),
            spi_speed_hz: 1_350_000,
        }
    }
}

/// How the smoothing coefficient follows tick timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMode {
    /// Coefficient fixed from `poll_hz`.
    #[default]
    Nominal,
    /// Coefficient recomputed from measured tick spacing.
    Measured,
}

/// `[tone]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Frequency at code 0, in Hz.
    pub freq_min: f32,
    /// Frequency at full scale, in Hz.
    pub freq_max: f32,
    /// Amplitude at full scale.
    pub amp_max: f32,
    /// Smoothing time constant in seconds. 0 disables smoothing.
    pub smoothing_tau_s: f32,
    /// Frequency before the first publication.
    pub initial_frequency: f32,
    /// Amplitude before the first publication.
    pub initial_amplitude: f32,
    /// Coefficient update policy.
    pub smoothing_interval: SmoothingMode,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            freq_min: 100.0,
            freq_max: 2000.0,
            amp_max: 0.8,
            smoothing_tau_s: 0.02,
            initial_frequency: 440.0,
            initial_amplitude: 0.2,
            smoothing_interval: SmoothingMode::Nominal,
        }
    }
}

impl SynthConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config: SynthConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolves the configuration for this run.
    ///
    /// Loads `explicit` if given (it must exist), else the user config file if
    /// present, else the defaults. Returns the path that was loaded, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let user = paths::default_config_path();
        if user.is_file() {
            return Ok((Self::load(&user)?, Some(user)));
        }
        Ok((Self::default(), None))
    }

    /// Checks every constraint and reports all violations at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_config(self)
    }

    /// Code-to-unit mapping for both knobs.
    pub fn mapping(&self) -> ControlMapping {
        ControlMapping::new(
            ControlRange::new(self.tone.freq_min, self.tone.freq_max)
                .with_max_code(self.control.max_code),
            ControlRange::new(0.0, self.tone.amp_max).with_max_code(self.control.max_code),
        )
    }

    /// Snapshot the render path sees before the first publication.
    pub fn initial_parameters(&self) -> SmoothedParameters {
        SmoothedParameters::new(self.tone.initial_frequency, self.tone.initial_amplitude)
    }

    /// Nominal sampler period.
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.control.poll_hz)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(1))
    }

    /// Audio callback period for the configured buffer size.
    pub fn buffer_period(&self) -> Duration {
        if self.audio.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(
            f64::from(self.audio.buffer_size) / f64::from(self.audio.sample_rate),
        )
    }
}
