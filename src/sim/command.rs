//! External-program simulator

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{SimJob, SimOutcome, Simulator};
use crate::error::{AsrcError, Result};

/// An input/output rate pair in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePair {
    pub ip: u32,
    pub op: u32,
}

/// How to launch one reference model
///
/// `args` are templates; these placeholders are substituted per job:
/// `{in0} {in1} {out0} {out1} {log} {ip_rate} {op_rate} {ip_index}
/// {op_index} {fdev} {frames}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    /// Channels the model converts
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Restrict the model to these rate pairs; `None` means try every pair
    #[serde(default)]
    pub supported: Option<Vec<RatePair>>,
}

fn default_channels() -> usize {
    2
}

/// Runs a reference model as a child process
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    config: ModelConfig,
}

impl CommandSimulator {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn supports(&self, job: &SimJob) -> bool {
        match &self.config.supported {
            Some(pairs) => pairs
                .iter()
                .any(|p| p.ip == job.ip_rate.hz() && p.op == job.op_rate.hz()),
            None => true,
        }
    }

    /// Expand the argument templates for a job
    pub fn expand_args(&self, job: &SimJob) -> Vec<String> {
        let path_arg = |paths: &[PathBuf], index: usize| {
            paths
                .get(index)
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        let substitutions = [
            ("{in0}", path_arg(&job.inputs, 0)),
            ("{in1}", path_arg(&job.inputs, 1)),
            ("{out0}", path_arg(&job.outputs, 0)),
            ("{out1}", path_arg(&job.outputs, 1)),
            ("{log}", job.log_path.display().to_string()),
            ("{ip_rate}", job.ip_rate.hz().to_string()),
            ("{op_rate}", job.op_rate.hz().to_string()),
            ("{ip_index}", job.ip_rate.index().to_string()),
            ("{op_index}", job.op_rate.index().to_string()),
            ("{fdev}", format!("{:.6}", job.fdev)),
            ("{frames}", job.frames.to_string()),
        ];

        self.config
            .args
            .iter()
            .map(|template| {
                substitutions
                    .iter()
                    .fold(template.clone(), |arg, (key, value)| arg.replace(key, value))
            })
            .collect()
    }
}

impl Simulator for CommandSimulator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn channels(&self) -> usize {
        self.config.channels
    }

    fn run(&self, job: &SimJob) -> Result<SimOutcome> {
        if !self.supports(job) {
            return Ok(SimOutcome::Unsupported {
                reason: format!(
                    "{} has no converter for {} -> {} Hz",
                    self.config.name, job.ip_rate, job.op_rate
                ),
            });
        }

        let args = self.expand_args(job);
        debug!(
            "[SIM] {} {} {}",
            self.config.name,
            self.config.program.display(),
            args.join(" ")
        );

        let output = Command::new(&self.config.program)
            .args(&args)
            .output()
            .map_err(|e| AsrcError::SimulatorLaunch {
                program: self.config.program.display().to_string(),
                source: e,
            })?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        write_log(&job.log_path, &log)?;

        if !output.status.success() {
            warn!(
                "[SIM] {} exited with {} for {} -> {} Hz",
                self.config.name, output.status, job.ip_rate, job.op_rate
            );
            return Ok(SimOutcome::Unsupported {
                reason: format!("{} exited with {}", self.config.name, output.status),
            });
        }

        let outputs: Vec<PathBuf> = job
            .outputs
            .iter()
            .take(self.config.channels)
            .cloned()
            .collect();
        if let Some(missing) = outputs.iter().find(|p| !p.exists()) {
            return Err(AsrcError::SimulatorOutputMissing {
                path: missing.clone(),
            });
        }

        Ok(SimOutcome::Completed { outputs, log })
    }
}

fn write_log(path: &Path, log: &str) -> Result<()> {
    fs::write(path, log).map_err(|e| AsrcError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    })
}
