//! Magnitude spectrum computation

use num_traits::ToPrimitive;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::window::WindowKind;
use crate::error::{AsrcError, Result};

/// Floor used when converting a zero magnitude to dB
const MIN_MAGNITUDE_DB: f64 = -300.0;

/// Magnitude spectrum of one transform block
///
/// Holds all `transform_size` bins (index 0 is DC). For real input the upper
/// half mirrors the lower half; metrics only look at bins `0..=nyquist_bin()`.
/// Magnitudes are normalised so a full-scale sine centred on a bin reads 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Wrap precomputed magnitudes
    pub fn from_magnitudes(magnitudes: Vec<f64>) -> Self {
        Self { magnitudes }
    }

    /// Number of bins (equals the transform size)
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Index of the Nyquist bin
    pub fn nyquist_bin(&self) -> usize {
        self.magnitudes.len() / 2
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Power (magnitude squared) of one bin; zero outside the spectrum
    pub fn power(&self, bin: usize) -> f64 {
        self.magnitudes.get(bin).map(|m| m * m).unwrap_or(0.0)
    }

    /// Non-redundant half `0..=nyquist` in dB, for plotting dumps
    pub fn half_db(&self) -> Vec<f64> {
        if self.magnitudes.is_empty() {
            return Vec::new();
        }
        self.magnitudes[..=self.nyquist_bin()]
            .iter()
            .map(|&m| {
                if m > 0.0 {
                    (20.0 * m.log10()).max(MIN_MAGNITUDE_DB)
                } else {
                    MIN_MAGNITUDE_DB
                }
            })
            .collect()
    }
}

/// Compute the magnitude spectrum of the first `transform_size` samples
///
/// # Errors
/// * `InvalidTransformSize` - if `transform_size` is zero or not a power of two
/// * `InsufficientSamples` - if fewer than `transform_size` samples are supplied
pub fn compute_spectrum<T: ToPrimitive + Copy>(
    samples: &[T],
    transform_size: usize,
    window: Option<WindowKind>,
) -> Result<Spectrum> {
    validate_transform_size(transform_size)?;

    let window = window.unwrap_or_default();
    let coefficients = window.coefficients(transform_size);
    let gain = window.coherent_gain(transform_size);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(transform_size);

    transform(samples, fft.as_ref(), &coefficients, gain)
}

pub(crate) fn validate_transform_size(transform_size: usize) -> Result<()> {
    if transform_size == 0 || !transform_size.is_power_of_two() {
        return Err(AsrcError::InvalidTransformSize {
            size: transform_size,
        });
    }
    Ok(())
}

/// Window, transform and normalise one block using a prepared plan
pub(crate) fn transform<T: ToPrimitive + Copy>(
    samples: &[T],
    fft: &dyn Fft<f64>,
    coefficients: &[f64],
    coherent_gain: f64,
) -> Result<Spectrum> {
    let n = fft.len();
    if samples.len() < n {
        return Err(AsrcError::InsufficientSamples {
            required: n,
            actual: samples.len(),
        });
    }

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .take(n)
        .zip(coefficients.iter())
        .map(|(s, w)| Complex::new(s.to_f64().unwrap_or(0.0) * w, 0.0))
        .collect();

    fft.process(&mut buffer);

    let scale = 2.0 / (n as f64 * coherent_gain);
    let magnitudes = buffer.iter().map(|c| c.norm() * scale).collect();

    Ok(Spectrum::from_magnitudes(magnitudes))
}
