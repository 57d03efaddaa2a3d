//! Shared helpers for the commands.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use pitchpot_config::SynthConfig;
use pitchpot_platform::{ChannelId, ConstantInput, ControlError, ControlInput, SweepInput};

/// How long the sampler gets to finish its current tick at shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// How often the main thread checks for Ctrl+C and stream faults.
pub const SUPERVISE_INTERVAL: Duration = Duration::from_millis(200);

/// Where control codes come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// MCP3008 on the configured spidev node
    Spi,
    /// Slow triangle sweep of both knobs
    Sim,
    /// Fixed codes from --freq-code / --amp-code
    Fixed,
}

/// Options shared by every command that builds a control input.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Frequency knob code for `--input fixed` (0-1023)
    #[arg(long, default_value_t = 512)]
    pub freq_code: u16,

    /// Amplitude knob code for `--input fixed` (0-1023)
    #[arg(long, default_value_t = 256)]
    pub amp_code: u16,

    /// Sweep length in sampler ticks for `--input sim`
    #[arg(long, default_value_t = 800)]
    pub sweep_ticks: u32,
}

/// Command-line overrides of the `[audio]` table.
#[derive(Args, Debug, Default)]
pub struct AudioOverrides {
    /// Output device (partial name, see `pitchpot devices`)
    #[arg(long)]
    pub device: Option<String>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Buffer size in frames
    #[arg(long)]
    pub buffer_size: Option<u32>,

    /// Output channels (the signal is copied to each)
    #[arg(long)]
    pub channels: Option<u16>,
}

impl AudioOverrides {
    /// Writes the given overrides into `config`.
    pub fn apply(&self, config: &mut SynthConfig) {
        if let Some(device) = &self.device {
            config.audio.device = Some(device.clone());
        }
        if let Some(rate) = self.sample_rate {
            config.audio.sample_rate = rate;
        }
        if let Some(size) = self.buffer_size {
            config.audio.buffer_size = size;
        }
        if let Some(channels) = self.channels {
            config.audio.channels = channels;
        }
    }
}

/// Loads the configuration for this run.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SynthConfig> {
    let (config, source) = SynthConfig::discover(path).context("failed to load configuration")?;
    match source {
        Some(path) => tracing::info!(path = %path.display(), "configuration loaded"),
        None => tracing::debug!("no configuration file, using defaults"),
    }
    Ok(config)
}

/// Builds the requested control input.
pub fn open_input(
    kind: InputKind,
    args: &InputArgs,
    config: &SynthConfig,
) -> anyhow::Result<Box<dyn ControlInput>> {
    let input: Box<dyn ControlInput> = match kind {
        InputKind::Spi => pitchpot_platform::open_mcp3008(
            &config.control.spi_device,
            config.control.spi_speed_hz,
        )
        .map_err(with_hint)?,
        InputKind::Sim => Box::new(SweepInput::new(args.sweep_ticks)),
        InputKind::Fixed => {
            let channel = |index: u8| {
                ChannelId::new(index).with_context(|| format!("channel {index} does not exist"))
            };
            Box::new(
                ConstantInput::new()
                    .with_code(channel(config.control.frequency_channel)?, args.freq_code)
                    .with_code(channel(config.control.amplitude_channel)?, args.amp_code),
            )
        }
    };
    tracing::debug!(input = %input.describe(), "control input ready");
    Ok(input)
}

/// Attaches operator guidance to a control setup error.
pub fn with_hint(err: ControlError) -> anyhow::Error {
    match err.hint() {
        Some(hint) => anyhow::anyhow!("{err}\nhint: {hint}"),
        None => anyhow::Error::new(err),
    }
}

/// Maps a session setup error, keeping control-input guidance.
pub fn session_error(err: pitchpot_io::Error) -> anyhow::Error {
    match err {
        pitchpot_io::Error::Control(inner) => with_hint(inner),
        other => anyhow::Error::new(other).context("failed to start audio"),
    }
}

/// Installs a Ctrl+C handler and returns the flag it clears.
pub fn install_ctrlc() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut config = SynthConfig::default();
        AudioOverrides {
            sample_rate: Some(48000),
            channels: Some(2),
            ..AudioOverrides::default()
        }
        .apply(&mut config);
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.channels, 2);
        assert_eq!(config.audio.buffer_size, 512);
        assert!(config.audio.device.is_none());
    }

    #[test]
    fn fixed_input_reads_configured_channels() {
        let config = SynthConfig::default();
        let args = InputArgs {
            freq_code: 700,
            amp_code: 100,
            sweep_ticks: 800,
        };
        let mut input = open_input(InputKind::Fixed, &args, &config).unwrap();
        assert_eq!(input.read_channel(ChannelId::CH5).unwrap(), 700);
        assert_eq!(input.read_channel(ChannelId::CH6).unwrap(), 100);
    }

    #[test]
    fn hint_is_appended() {
        let err = with_hint(ControlError::Unsupported("no SPI in this build".into()));
        let msg = err.to_string();
        assert!(msg.starts_with("no SPI in this build"));
        assert!(msg.contains("--input sim"));
    }
}
