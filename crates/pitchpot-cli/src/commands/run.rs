//! The synth itself: knobs in, sine out, until Ctrl+C.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::Args;
use pitchpot_io::{CpalBackend, SessionSummary, SynthSession};

use super::common::{
    AudioOverrides, InputArgs, InputKind, SHUTDOWN_GRACE, SUPERVISE_INTERVAL, install_ctrlc,
    load_config, open_input, session_error,
};

#[derive(Args)]
pub struct RunArgs {
    /// Control input source
    #[arg(long, value_enum, default_value_t = InputKind::Spi)]
    input: InputKind,

    #[command(flatten)]
    input_args: InputArgs,

    #[command(flatten)]
    audio: AudioOverrides,
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.audio.apply(&mut config);
    config.validate().context("invalid configuration")?;

    // Open the converter before the stream so a missing SPI device fails fast.
    let input = open_input(args.input, &args.input_args, &config)?;
    let backend = CpalBackend::new();
    let mut session = SynthSession::start(&backend, input, &config).map_err(session_error)?;

    println!("pitchpot running");
    println!("  Input:       {:?}", args.input);
    println!(
        "  Frequency:   CH{} -> {}-{} Hz",
        config.control.frequency_channel, config.tone.freq_min, config.tone.freq_max
    );
    println!(
        "  Amplitude:   CH{} -> 0-{}",
        config.control.amplitude_channel, config.tone.amp_max
    );
    println!(
        "  Audio:       {} Hz, {} frames, {} channel(s)",
        config.audio.sample_rate, config.audio.buffer_size, config.audio.channels
    );
    println!("\nPress Ctrl+C to stop...\n");

    let running = install_ctrlc()?;
    let result = supervise(&mut session, &running);
    let summary = session.stop(SHUTDOWN_GRACE);
    print_summary(&summary);
    result
}

/// Blocks until Ctrl+C or a stream fault.
pub fn supervise(session: &mut SynthSession, running: &Arc<AtomicBool>) -> anyhow::Result<()> {
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(SUPERVISE_INTERVAL);
        session.check().context("audio output failed")?;
    }
    Ok(())
}

pub fn print_summary(summary: &SessionSummary) {
    println!("Stopped after {:.1} s", summary.uptime.as_secs_f64());
    if let Some(stats) = summary.sampler {
        println!(
            "  Sampler: {} ticks, {} published, {} skipped",
            stats.ticks, stats.published, stats.skipped
        );
    }
    if summary.faults > 0 {
        println!("  Stream faults: {}", summary.faults);
    }
}
