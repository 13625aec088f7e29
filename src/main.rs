//! asrc-verify CLI
//!
//! Command-line interface for the sample-rate converter validation harness.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use asrc_verify::cli::commands::{self, AnalyzeOptions};
use asrc_verify::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("ASRC Verify v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("ASRC Verify v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Sweep {
            config,
            output,
            wav,
        } => commands::sweep(&config, output.as_deref(), wav)
            .with_context(|| format!("sweep failed for {}", config.display())),
        Commands::Analyze {
            file,
            tone_bin,
            fft,
            window,
            skip,
            dump,
            rate,
        } => {
            let options = AnalyzeOptions {
                tone_bin,
                fft,
                window,
                skip,
                dump: dump.as_deref(),
                rate,
            };
            commands::analyze(&file, &options)
                .with_context(|| format!("analysis failed for {}", file.display()))
        }
        Commands::InitConfig { path } => Ok(commands::init_config(&path)?),
        Commands::Rates => Ok(commands::list_rates()?),
    }
}
