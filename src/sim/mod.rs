//! Reference Simulator
//!
//! Runs converter input vectors through a golden reference model and
//! collects its output files and log. Models are external programs driven
//! through [`CommandSimulator`]; anything else can implement [`Simulator`].

mod command;
mod scrape;

use std::path::PathBuf;

use crate::error::Result;
use crate::signal::SampleRate;

pub use command::{CommandSimulator, ModelConfig, RatePair};
pub use scrape::{scrape_mips, MipsReport, ScrapeKeys};

/// One simulator invocation
#[derive(Debug, Clone)]
pub struct SimJob {
    /// Input sample file per channel
    pub inputs: Vec<PathBuf>,
    /// Where the model should write each channel's output
    pub outputs: Vec<PathBuf>,
    /// Captured stdout/stderr of the model
    pub log_path: PathBuf,
    pub ip_rate: SampleRate,
    pub op_rate: SampleRate,
    /// Output frequency deviation applied by the converter
    pub fdev: f64,
    /// Input frames per channel
    pub frames: usize,
}

/// Result of one simulator invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SimOutcome {
    Completed {
        /// Output file per channel the model produced
        outputs: Vec<PathBuf>,
        log: String,
    },
    /// The model has no converter for this rate pair
    Unsupported { reason: String },
}

/// A golden reference model
pub trait Simulator: Send + Sync {
    /// Model name used in file names and reports
    fn name(&self) -> &str;

    /// Number of channels the model converts (1 or 2)
    fn channels(&self) -> usize;

    /// Run one job
    ///
    /// Rate pairs the model does not support are reported as
    /// [`SimOutcome::Unsupported`]; errors are reserved for failures of the
    /// harness itself (missing program, missing output files).
    fn run(&self, job: &SimJob) -> Result<SimOutcome>;
}
