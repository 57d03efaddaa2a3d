//! Configuration validation.
//!
//! Parsing only checks types; this module checks that the values describe a
//! runnable synth. Every violation is collected so `pitchpot config check`
//! can report them all in one pass.
//!
//! # Example
//!
//! ```rust
//! use pitchpot_config::{SynthConfig, ValidationError};
//!
//! let mut config = SynthConfig::default();
//! config.tone.freq_min = 3000.0;
//! config.control.amplitude_channel = 9;
//!
//! match config.validate() {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

use pitchpot_core::MAX_CONTROL_CODE;

use crate::SynthConfig;

/// Number of converter channels.
const CHANNEL_COUNT: u8 = 8;

/// Slowest accepted sampler rate. Ten seconds between ticks.
const MIN_POLL_HZ: f64 = 0.1;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A rate, size or count must be greater than zero.
    #[error("'{field}' must be positive, got {value}")]
    NotPositive {
        /// Dotted key of the field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A value lies outside its allowed interval.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted key of the field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// The frequency range is empty or inverted.
    #[error("frequency range is empty: freq_min {min} must be below freq_max {max}")]
    EmptyRange {
        /// Configured minimum.
        min: f32,
        /// Configured maximum.
        max: f32,
    },

    /// The top of the frequency range would alias.
    #[error("freq_max {freq_max} Hz is not below the Nyquist frequency {nyquist} Hz")]
    AboveNyquist {
        /// Configured maximum.
        freq_max: f32,
        /// Half the sample rate.
        nyquist: f32,
    },

    /// A converter channel does not exist.
    #[error("'{field}' channel {channel} does not exist (valid: 0-7)")]
    InvalidChannel {
        /// Dotted key of the field.
        field: &'static str,
        /// The rejected channel.
        channel: u8,
    },

    /// Both knobs are assigned to one channel.
    #[error("frequency and amplitude both read channel {channel}")]
    DuplicateChannel {
        /// The shared channel.
        channel: u8,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Flattens into a list of individual errors.
    pub fn into_vec(self) -> Vec<ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors,
            other => vec![other],
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Returns every constraint `config` violates, in declaration order.
pub fn violations(config: &SynthConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let audio = &config.audio;
    let control = &config.control;
    let tone = &config.tone;

    positive(&mut errors, "audio.sample_rate", f64::from(audio.sample_rate));
    positive(&mut errors, "audio.buffer_size", f64::from(audio.buffer_size));
    positive(&mut errors, "audio.table_size", audio.table_size as f64);
    positive(&mut errors, "audio.channels", f64::from(audio.channels));
    if audio.sample_rate > 0 {
        in_range(
            &mut errors,
            "control.poll_hz",
            f64::from(control.poll_hz),
            MIN_POLL_HZ,
            f64::from(audio.sample_rate),
        );
    }
    in_range(
        &mut errors,
        "control.max_code",
        f64::from(control.max_code),
        1.0,
        f64::from(MAX_CONTROL_CODE),
    );
    positive(&mut errors, "control.spi_speed_hz", f64::from(control.spi_speed_hz));

    for (field, channel) in [
        ("control.frequency_channel", control.frequency_channel),
        ("control.amplitude_channel", control.amplitude_channel),
    ] {
        if channel >= CHANNEL_COUNT {
            errors.push(ValidationError::InvalidChannel { field, channel });
        }
    }
    if control.frequency_channel == control.amplitude_channel {
        errors.push(ValidationError::DuplicateChannel {
            channel: control.frequency_channel,
        });
    }

    in_range(
        &mut errors,
        "tone.freq_min",
        f64::from(tone.freq_min),
        0.0,
        f64::from(f32::MAX),
    );
    if tone.freq_min.is_nan() || tone.freq_max.is_nan() || tone.freq_min >= tone.freq_max {
        errors.push(ValidationError::EmptyRange {
            min: tone.freq_min,
            max: tone.freq_max,
        });
    }
    if audio.sample_rate > 0 {
        let nyquist = audio.sample_rate as f32 / 2.0;
        if tone.freq_max.is_nan() || tone.freq_max >= nyquist {
            errors.push(ValidationError::AboveNyquist {
                freq_max: tone.freq_max,
                nyquist,
            });
        }
    }

    if !(0.0..=1.0).contains(&tone.amp_max) || tone.amp_max == 0.0 {
        errors.push(ValidationError::OutOfRange {
            field: "tone.amp_max",
            value: f64::from(tone.amp_max),
            min: 0.0,
            max: 1.0,
        });
    }
    in_range(
        &mut errors,
        "tone.smoothing_tau_s",
        f64::from(tone.smoothing_tau_s),
        0.0,
        60.0,
    );
    in_range(
        &mut errors,
        "tone.initial_frequency",
        f64::from(tone.initial_frequency),
        f64::from(tone.freq_min),
        f64::from(tone.freq_max),
    );
    in_range(
        &mut errors,
        "tone.initial_amplitude",
        f64::from(tone.initial_amplitude),
        0.0,
        f64::from(tone.amp_max),
    );

    errors
}

/// Validates `config`, folding several violations into
/// [`ValidationError::Multiple`].
pub fn validate_config(config: &SynthConfig) -> ValidationResult<()> {
    let mut errors = violations(config);
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn positive(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ValidationError::NotPositive { field, value });
    }
}

fn in_range(errors: &mut Vec<ValidationError>, field: &'static str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_violations() {
        assert!(violations(&SynthConfig::default()).is_empty());
    }

    #[test]
    fn single_violation_is_not_wrapped() {
        let mut config = SynthConfig::default();
        config.audio.buffer_size = 0;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::NotPositive {
                field: "audio.buffer_size",
                value: 0.0
            })
        );
    }

    #[test]
    fn inverted_range_is_reported() {
        let mut config = SynthConfig::default();
        config.tone.freq_min = 2000.0;
        config.tone.freq_max = 100.0;
        config.tone.initial_frequency = 500.0;
        let errors = violations(&config);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyRange { .. })));
    }

    #[test]
    fn nyquist_limit_follows_sample_rate() {
        let mut config = SynthConfig::default();
        config.audio.sample_rate = 4000;
        assert!(
            violations(&config)
                .iter()
                .any(|e| matches!(e, ValidationError::AboveNyquist { nyquist, .. } if *nyquist == 2000.0))
        );
    }

    #[test]
    fn channels_must_exist_and_differ() {
        let mut config = SynthConfig::default();
        config.control.amplitude_channel = 5;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::DuplicateChannel { channel: 5 })
        );

        config.control.amplitude_channel = 8;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::InvalidChannel {
                field: "control.amplitude_channel",
                channel: 8
            })
        );
    }

    #[test]
    fn nan_values_are_rejected() {
        let mut config = SynthConfig::default();
        config.tone.amp_max = f32::NAN;
        config.control.poll_hz = f32::NAN;
        let errors = violations(&config);
        assert!(errors.len() >= 2, "{errors:?}");
    }

    #[test]
    fn poll_rate_must_be_usable() {
        let mut config = SynthConfig::default();
        config.control.poll_hz = 1e-20;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::OutOfRange { field: "control.poll_hz", .. })
        ));

        config.control.poll_hz = 0.0;
        assert!(validate_config(&config).is_err());

        config.control.poll_hz = 96_000.0;
        assert!(validate_config(&config).is_err());

        config.control.poll_hz = 0.1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn max_code_stays_within_converter_range() {
        let mut config = SynthConfig::default();
        for bad in [0u16, 1024, 2047] {
            config.control.max_code = bad;
            assert_eq!(
                validate_config(&config),
                Err(ValidationError::OutOfRange {
                    field: "control.max_code",
                    value: f64::from(bad),
                    min: 1.0,
                    max: 1023.0
                })
            );
        }
        config.control.max_code = 255;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_tau_is_allowed() {
        let mut config = SynthConfig::default();
        config.tone.smoothing_tau_s = 0.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn multiple_flattens() {
        let err = ValidationError::Multiple(vec![
            ValidationError::DuplicateChannel { channel: 1 },
            ValidationError::DuplicateChannel { channel: 2 },
        ]);
        assert_eq!(err.into_vec().len(), 2);
    }
}
