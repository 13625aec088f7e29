//! Signal Quality Analysis
//!
//! Frequency-domain quality metrics for converter output:
//! - Magnitude spectrum (FFT, optional window)
//! - SNR relative to a known tone bin
//! - THD from the harmonics of that tone
//!
//! Every metric is a pure function of its inputs. Degenerate inputs
//! (noise-free tones, spectra too short to hold a harmonic) produce the
//! sentinel values [`SNR_CEILING_DB`] and [`THD_FLOOR_DB`] rather than errors.

mod analyzer;
mod metrics;
mod spectrum;
mod window;

pub use analyzer::{AnalyzerConfig, SignalQualityAnalyzer};
pub use metrics::{
    calc_snr, calc_snr_with, calc_thd, calc_thd_with, BandSettings, QualityMetrics, DB_LIMIT,
    SNR_CEILING_DB, THD_FLOOR_DB,
};
pub use spectrum::{compute_spectrum, Spectrum};
pub use window::WindowKind;
