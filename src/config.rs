//! Evaluation configuration
//!
//! Everything the sweep needs is carried here and passed in explicitly.
//! Stored as JSON; missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalyzerConfig, BandSettings, WindowKind};
use crate::error::{AsrcError, Result};
use crate::signal::{all_rates, SampleRate, SignalPlan};
use crate::sim::{ModelConfig, ScrapeKeys};

/// Complete configuration for one evaluation sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Output transform size
    pub fft_points: usize,
    /// Output samples skipped before the analysed block
    pub settle_samples: usize,
    /// Input sample-rate error factor applied when synthesizing tones
    pub ferr: f64,
    /// Output frequency deviations to sweep
    pub fdevs: Vec<f64>,
    /// Rates swept for both input and output
    pub rates: Vec<SampleRate>,
    /// Requested output tone bin per channel
    pub tone_bins: Vec<usize>,
    pub window: WindowKind,
    pub bands: BandSettings,
    /// Reference models run at every sweep point
    pub models: Vec<ModelConfig>,
    pub scrape_keys: ScrapeKeys,
    pub output_dir: PathBuf,
    /// Also write each generated input as a WAV file
    pub export_wav: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        let fft_points = 1024;
        Self {
            fft_points,
            settle_samples: fft_points,
            ferr: 1.0,
            fdevs: vec![0.9999, 1.0, 1.0001],
            rates: all_rates(),
            tone_bins: vec![fft_points / 5, fft_points / 6],
            window: WindowKind::Rectangular,
            bands: BandSettings::default(),
            models: Vec::new(),
            scrape_keys: ScrapeKeys::default(),
            output_dir: PathBuf::from("output"),
            export_wav: false,
        }
    }
}

impl EvalConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AsrcError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: EvalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| AsrcError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Reject configurations that cannot produce a meaningful sweep
    pub fn validate(&self) -> Result<()> {
        if self.fft_points == 0 || !self.fft_points.is_power_of_two() {
            return Err(AsrcError::InvalidTransformSize {
                size: self.fft_points,
            });
        }
        self.bands.validate(self.fft_points)?;
        if self.fdevs.is_empty() || self.rates.is_empty() {
            return Err(AsrcError::config("sweep has no frequency deviations or rates"));
        }
        if let Some(fdev) = self.fdevs.iter().find(|f| !f.is_finite() || **f <= 0.0) {
            return Err(AsrcError::config(format!("invalid frequency deviation {}", fdev)));
        }
        if !self.ferr.is_finite() || self.ferr <= 0.0 {
            return Err(AsrcError::config(format!("invalid rate error {}", self.ferr)));
        }
        if self.tone_bins.is_empty() || self.tone_bins.len() > 2 {
            return Err(AsrcError::config("one or two channel tone bins are required"));
        }
        let nyquist = self.fft_points / 2;
        if let Some(&bin) = self.tone_bins.iter().find(|&&b| b == 0 || b >= nyquist) {
            return Err(AsrcError::InvalidToneBin {
                bin,
                len: self.fft_points,
            });
        }
        if let Some(model) = self
            .models
            .iter()
            .find(|m| m.channels == 0 || m.channels > self.tone_bins.len())
        {
            return Err(AsrcError::config(format!(
                "model '{}' converts {} channels but {} tones are configured",
                model.name,
                model.channels,
                self.tone_bins.len()
            )));
        }
        for pair in self.models.iter().flat_map(|m| m.supported.iter().flatten()) {
            SampleRate::from_hz(pair.ip)?;
            SampleRate::from_hz(pair.op)?;
        }
        Ok(())
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            transform_size: self.fft_points,
            window: self.window,
            bands: self.bands,
        }
    }

    pub fn signal_plan(&self) -> SignalPlan {
        SignalPlan {
            fft_points: self.fft_points,
            settle_samples: self.settle_samples,
            ferr: self.ferr,
            tone_bins: self.tone_bins.clone(),
        }
    }
}
