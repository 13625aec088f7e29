//! Configured analyzer with a cached FFT plan

use std::fmt;
use std::sync::Arc;

use num_traits::ToPrimitive;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use super::metrics::{calc_snr_with, calc_thd_with, BandSettings, QualityMetrics};
use super::spectrum::{transform, validate_transform_size, Spectrum};
use super::window::WindowKind;
use crate::error::Result;

/// Analyzer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Samples consumed per spectrum (power of two)
    pub transform_size: usize,
    pub window: WindowKind,
    pub bands: BandSettings,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            transform_size: 1024,
            window: WindowKind::Rectangular,
            bands: BandSettings::default(),
        }
    }
}

/// Computes spectra and quality metrics for a fixed configuration
///
/// The FFT plan and window coefficients are prepared once; every call is
/// otherwise a pure function of its arguments, so one analyzer can be shared
/// across threads.
pub struct SignalQualityAnalyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f64>>,
    coefficients: Vec<f64>,
    coherent_gain: f64,
}

impl SignalQualityAnalyzer {
    /// Create an analyzer
    ///
    /// # Errors
    /// * `InvalidTransformSize` - if the transform size is not a power of two
    /// * `InvalidConfig` - if the band settings do not fit the transform
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        validate_transform_size(config.transform_size)?;
        config.bands.validate(config.transform_size)?;

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(config.transform_size);

        Ok(Self {
            coefficients: config.window.coefficients(config.transform_size),
            coherent_gain: config.window.coherent_gain(config.transform_size),
            config,
            fft,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn transform_size(&self) -> usize {
        self.config.transform_size
    }

    /// Magnitude spectrum of the first `transform_size` samples
    pub fn compute_spectrum<T: ToPrimitive + Copy>(&self, samples: &[T]) -> Result<Spectrum> {
        transform(samples, self.fft.as_ref(), &self.coefficients, self.coherent_gain)
    }

    pub fn calc_snr(&self, spectrum: &Spectrum, tone_bin: usize) -> Result<f64> {
        calc_snr_with(spectrum, tone_bin, &self.config.bands)
    }

    pub fn calc_thd(&self, spectrum: &Spectrum, tone_bin: usize) -> Result<f64> {
        calc_thd_with(spectrum, tone_bin, &self.config.bands)
    }

    /// Spectrum plus SNR/THD in one call
    pub fn analyze<T: ToPrimitive + Copy>(
        &self,
        samples: &[T],
        tone_bin: usize,
    ) -> Result<(Spectrum, QualityMetrics)> {
        let spectrum = self.compute_spectrum(samples)?;
        let metrics = QualityMetrics::measure(&spectrum, tone_bin, &self.config.bands)?;
        Ok((spectrum, metrics))
    }
}

impl fmt::Debug for SignalQualityAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalQualityAnalyzer")
            .field("config", &self.config)
            .field("coherent_gain", &self.coherent_gain)
            .finish()
    }
}
