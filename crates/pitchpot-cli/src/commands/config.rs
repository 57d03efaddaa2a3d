//! Configuration file management.

use std::path::Path;

use anyhow::Context;
use clap::{Args, Subcommand};
use pitchpot_config::{SynthConfig, default_config_path, violations};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write a configuration file with every default spelled out
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration and list every problem
    Check,

    /// Print the path of the user configuration file
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let (config, source) =
                SynthConfig::discover(config_path).context("failed to load configuration")?;
            match source {
                Some(path) => println!("# loaded from {}", path.display()),
                None => println!("# built-in defaults"),
            }
            print!("{}", config.to_toml()?);
        }

        ConfigCommand::Init { force } => {
            let path = config_path.map_or_else(default_config_path, Path::to_path_buf);
            init(&path, force)?;
            println!("Wrote default configuration to {}", path.display());
        }

        ConfigCommand::Check => {
            let (config, source) =
                SynthConfig::discover(config_path).context("failed to load configuration")?;
            let label = source.as_deref().map_or_else(
                || String::from("built-in defaults"),
                |p| p.display().to_string(),
            );
            let errors = violations(&config);
            if errors.is_empty() {
                println!("{label}: OK");
                return Ok(());
            }
            eprintln!("{label}: {} problem(s)", errors.len());
            for error in &errors {
                eprintln!("  - {error}");
            }
            anyhow::bail!("configuration is invalid");
        }

        ConfigCommand::Path => {
            println!("{}", default_config_path().display());
        }
    }
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    SynthConfig::default()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
