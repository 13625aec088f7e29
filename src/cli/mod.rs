//! CLI Module
//!
//! Command-line interface for the converter validation harness.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analysis::WindowKind;

/// ASRC verification - sweep reference models and report SNR, THD and MIPS
#[derive(Parser, Debug)]
#[command(name = "asrc-verify")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full rate/deviation sweep and write the report
    #[command(name = "sweep")]
    Sweep {
        /// Configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export generated inputs as WAV files
        #[arg(long)]
        wav: bool,
    },

    /// Measure SNR and THD of one converter output file
    #[command(name = "analyze")]
    Analyze {
        /// Sample file (one sample per line, Q1.31 or decimal)
        file: PathBuf,

        /// Expected bin of the test tone
        #[arg(short, long)]
        tone_bin: usize,

        /// Transform size
        #[arg(short, long, default_value_t = 1024)]
        fft: usize,

        /// Analysis window: rectangular, hann or blackman-harris
        #[arg(short, long, default_value_t = WindowKind::Rectangular)]
        window: WindowKind,

        /// Samples to skip before the analysed block
        #[arg(short, long, default_value_t = 0)]
        skip: usize,

        /// Write the half spectrum as CSV
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Output sample rate used for the frequency column of the dump
        #[arg(long, default_value_t = 48_000)]
        rate: u32,
    },

    /// Write the default configuration
    #[command(name = "init-config")]
    InitConfig {
        /// Path for the new configuration file
        path: PathBuf,
    },

    /// List supported sample rates
    #[command(name = "rates")]
    Rates,
}
