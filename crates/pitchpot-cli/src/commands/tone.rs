//! Fixed tone for checking the audio path without the converter.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use pitchpot_core::SmoothedParameters;
use pitchpot_io::{CpalBackend, SynthSession};

use super::common::{
    AudioOverrides, SHUTDOWN_GRACE, SUPERVISE_INTERVAL, install_ctrlc, load_config, session_error,
};
use super::run::print_summary;

#[derive(Args)]
pub struct ToneArgs {
    /// Frequency in Hz
    #[arg(long, default_value = "440.0")]
    frequency: f32,

    /// Amplitude (0.0-1.0)
    #[arg(long, default_value = "0.3")]
    amplitude: f32,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    seconds: Option<f32>,

    #[command(flatten)]
    audio: AudioOverrides,
}

pub fn run(args: ToneArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.audio.apply(&mut config);

    let tone = SmoothedParameters::new(args.frequency, args.amplitude);
    let backend = CpalBackend::new();
    let mut session = SynthSession::start_tone(&backend, &config, tone).map_err(session_error)?;

    println!(
        "Playing {} Hz at amplitude {} ({} Hz, {} frames)",
        args.frequency, args.amplitude, config.audio.sample_rate, config.audio.buffer_size
    );
    println!("Listen for clicks or crackle. Press Ctrl+C to stop...\n");

    let limit = args
        .seconds
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(Duration::from_secs_f32);
    let running = install_ctrlc()?;
    let started = Instant::now();

    let mut result = Ok(());
    while running.load(Ordering::SeqCst) && limit.is_none_or(|l| started.elapsed() < l) {
        std::thread::sleep(SUPERVISE_INTERVAL);
        if let Err(e) = session.check() {
            result = Err(e).context("audio output failed");
            break;
        }
    }

    let summary = session.stop(SHUTDOWN_GRACE);
    print_summary(&summary);
    result
}
