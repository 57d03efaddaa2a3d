//! Offline render to WAV.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use pitchpot_io::render_offline;

use super::common::{InputArgs, InputKind, load_config, open_input};

/// Inputs usable without hardware.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum RenderInput {
    /// Slow triangle sweep of both knobs
    Sim,
    /// Fixed codes from --freq-code / --amp-code
    Fixed,
}

impl From<RenderInput> for InputKind {
    fn from(input: RenderInput) -> Self {
        match input {
            RenderInput::Sim => InputKind::Sim,
            RenderInput::Fixed => InputKind::Fixed,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "5.0")]
    seconds: f32,

    /// Control input source
    #[arg(long, value_enum, default_value_t = RenderInput::Sim)]
    input: RenderInput,

    #[command(flatten)]
    input_args: InputArgs,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,
}

pub fn run(args: RenderArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        anyhow::bail!("--seconds must be a non-negative number, got {}", args.seconds);
    }

    let mut config = load_config(config_path)?;
    if let Some(rate) = args.sample_rate {
        config.audio.sample_rate = rate;
    }

    let input = open_input(args.input.into(), &args.input_args, &config)?;
    let render = render_offline(input, &config, Duration::from_secs_f32(args.seconds))
        .context("render failed")?;
    render
        .write_wav(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Rendered {:.2} s at {} Hz to {}",
        render.duration().as_secs_f64(),
        render.sample_rate,
        args.output.display()
    );
    println!(
        "  Sampler: {} ticks, {} published, {} skipped",
        render.stats.ticks, render.stats.published, render.stats.skipped
    );
    println!(
        "  Final: {:.1} Hz, amplitude {:.3} (peak {:.3})",
        render.final_parameters.frequency_hz,
        render.final_parameters.amplitude,
        render.peak()
    );
    Ok(())
}
