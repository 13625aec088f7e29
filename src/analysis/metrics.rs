//! SNR and THD extraction relative to a known tone bin
//!
//! Conventions:
//! - Only the non-redundant half `0..=N/2` is measured; a tone bin in the
//!   upper half is folded onto its mirror `N - bin`.
//! - Signal (and each harmonic) is the power summed over `bin ± signal_half_width`.
//! - Noise is every bin in `1..=N/2` outside `tone ± guard_half_width`. DC is
//!   never noise.
//! - Harmonic orders `2..=harmonic_count + 1`. Harmonics above Nyquist are
//!   excluded, not folded.
//! - Results are clamped to `±DB_LIMIT`.

use serde::{Deserialize, Serialize};

use super::spectrum::Spectrum;
use crate::error::{AsrcError, Result};

/// Magnitude of the dB range reported by the metrics
pub const DB_LIMIT: f64 = 200.0;

/// SNR reported when the noise power is zero
pub const SNR_CEILING_DB: f64 = DB_LIMIT;

/// THD reported when no harmonic content is found
pub const THD_FLOOR_DB: f64 = -DB_LIMIT;

/// Bin neighbourhoods used by the metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandSettings {
    /// Bins either side of a tone counted as that tone's power
    pub signal_half_width: usize,
    /// Bins either side of the tone excluded from the noise sum
    pub guard_half_width: usize,
    /// Number of harmonics above the fundamental to sum
    pub harmonic_count: usize,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            signal_half_width: 1,
            guard_half_width: 2,
            harmonic_count: 5,
        }
    }
}

impl BandSettings {
    /// Upper bound on `harmonic_count`
    pub const MAX_HARMONICS: usize = 64;

    /// Check the settings against a transform size
    ///
    /// # Errors
    /// * `InvalidConfig` - if a half width reaches Nyquist or the harmonic
    ///   count is zero or above [`Self::MAX_HARMONICS`]
    pub fn validate(&self, transform_size: usize) -> Result<()> {
        let nyquist = transform_size / 2;
        if self.signal_half_width >= nyquist || self.guard_half_width >= nyquist {
            return Err(AsrcError::config(format!(
                "band half widths ({}, {}) must be below the Nyquist bin {}",
                self.signal_half_width, self.guard_half_width, nyquist
            )));
        }
        if self.harmonic_count == 0 || self.harmonic_count > Self::MAX_HARMONICS {
            return Err(AsrcError::config(format!(
                "harmonic count {} must be in 1..={}",
                self.harmonic_count,
                Self::MAX_HARMONICS
            )));
        }
        Ok(())
    }
}

/// SNR and THD of one converter output channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub snr_db: f64,
    pub thd_db: f64,
}

impl QualityMetrics {
    /// Measure both metrics from one spectrum
    pub fn measure(spectrum: &Spectrum, tone_bin: usize, bands: &BandSettings) -> Result<Self> {
        Ok(Self {
            snr_db: calc_snr_with(spectrum, tone_bin, bands)?,
            thd_db: calc_thd_with(spectrum, tone_bin, bands)?,
        })
    }

    /// Plot annotation text
    pub fn annotation(&self) -> String {
        format!("SNR:{:.1}dB\nTHD:{:.1}dB\n", self.snr_db, self.thd_db)
    }

    pub fn snr_is_clamped(&self) -> bool {
        self.snr_db >= SNR_CEILING_DB
    }

    pub fn thd_is_floor(&self) -> bool {
        self.thd_db <= THD_FLOOR_DB
    }
}

/// SNR in dB with the default band settings
pub fn calc_snr(spectrum: &Spectrum, tone_bin: usize) -> Result<f64> {
    calc_snr_with(spectrum, tone_bin, &BandSettings::default())
}

/// THD in dB with the default band settings
pub fn calc_thd(spectrum: &Spectrum, tone_bin: usize) -> Result<f64> {
    calc_thd_with(spectrum, tone_bin, &BandSettings::default())
}

/// SNR in dB
///
/// Zero noise power yields [`SNR_CEILING_DB`]. A spectrum with no power at
/// the tone yields `-DB_LIMIT`.
///
/// # Errors
/// * `InvalidToneBin` - if `tone_bin` is outside the spectrum
pub fn calc_snr_with(spectrum: &Spectrum, tone_bin: usize, bands: &BandSettings) -> Result<f64> {
    let tone = folded_tone_bin(spectrum, tone_bin)?;
    let nyquist = spectrum.nyquist_bin();

    let signal_power = band_power(spectrum, tone, bands.signal_half_width);

    let guard = bands.guard_half_width.max(bands.signal_half_width);
    let noise_power: f64 = (1..=nyquist)
        .filter(|&bin| bin.abs_diff(tone) > guard)
        .map(|bin| spectrum.power(bin))
        .sum();

    if signal_power <= 0.0 {
        return Ok(-DB_LIMIT);
    }
    if noise_power <= 0.0 {
        return Ok(SNR_CEILING_DB);
    }

    Ok(to_db(signal_power / noise_power))
}

/// THD in dB
///
/// Returns [`THD_FLOOR_DB`] when no harmonic lies at or below Nyquist, or
/// when the harmonics carry no power.
///
/// # Errors
/// * `InvalidToneBin` - if `tone_bin` is outside the spectrum
pub fn calc_thd_with(spectrum: &Spectrum, tone_bin: usize, bands: &BandSettings) -> Result<f64> {
    let tone = folded_tone_bin(spectrum, tone_bin)?;
    let nyquist = spectrum.nyquist_bin();

    if tone == 0 {
        return Ok(THD_FLOOR_DB);
    }

    let fundamental_power = band_power(spectrum, tone, bands.signal_half_width);

    // Each bin is counted at most once, and never if it belongs to the fundamental
    let mut claimed = vec![false; nyquist + 1];
    for bin in band(tone, bands.signal_half_width, nyquist) {
        claimed[bin] = true;
    }

    let mut harmonic_power = 0.0;
    let mut harmonics_in_range = 0;
    for order in 2..=bands.harmonic_count.saturating_add(1) {
        let center = tone.saturating_mul(order);
        if center > nyquist {
            break;
        }
        harmonics_in_range += 1;
        for bin in band(center, bands.signal_half_width, nyquist) {
            if !claimed[bin] {
                claimed[bin] = true;
                harmonic_power += spectrum.power(bin);
            }
        }
    }

    if harmonics_in_range == 0 || harmonic_power <= 0.0 {
        return Ok(THD_FLOOR_DB);
    }
    if fundamental_power <= 0.0 {
        return Ok(DB_LIMIT);
    }

    Ok(to_db(harmonic_power / fundamental_power))
}

fn folded_tone_bin(spectrum: &Spectrum, tone_bin: usize) -> Result<usize> {
    let len = spectrum.len();
    if tone_bin >= len {
        return Err(AsrcError::InvalidToneBin { bin: tone_bin, len });
    }
    if tone_bin > spectrum.nyquist_bin() {
        Ok(len - tone_bin)
    } else {
        Ok(tone_bin)
    }
}

/// Bins `center ± half_width` clipped to `[1, nyquist]`; DC only for a DC tone
fn band(center: usize, half_width: usize, nyquist: usize) -> std::ops::RangeInclusive<usize> {
    let lo = if center == 0 {
        0
    } else {
        center.saturating_sub(half_width).max(1)
    };
    let hi = center.saturating_add(half_width).min(nyquist);
    lo..=hi
}

fn band_power(spectrum: &Spectrum, center: usize, half_width: usize) -> f64 {
    band(center, half_width, spectrum.nyquist_bin())
        .map(|bin| spectrum.power(bin))
        .sum()
}

fn to_db(ratio: f64) -> f64 {
    (10.0 * ratio.log10()).clamp(-DB_LIMIT, DB_LIMIT)
}
