//! pitchpot - a sine synthesizer played with two knobs on an MCP3008.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pitchpot")]
#[command(author, version, about = "Knob-controlled wavetable sine synthesizer", long_about = None)]
struct Cli {
    /// Configuration file (default: the user config file, if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play, with frequency and amplitude read from the knobs
    Run(commands::run::RunArgs),

    /// Play a constant tone to check the audio path
    Tone(commands::tone::ToneArgs),

    /// Render the synth offline to a WAV file
    Render(commands::render::RenderArgs),

    /// List audio output devices
    Devices,

    /// Show, create or check the configuration file
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => commands::run::run(args, config),
        Commands::Tone(args) => commands::tone::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Devices => commands::devices::run(),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
