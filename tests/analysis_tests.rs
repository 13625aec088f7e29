//! Signal Quality Analysis Tests
//!
//! Spectrum, SNR and THD behaviour on synthetic converter output.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use asrc_verify::analysis::{
    calc_snr, calc_thd, compute_spectrum, AnalyzerConfig, SignalQualityAnalyzer, WindowKind,
    SNR_CEILING_DB, THD_FLOOR_DB,
};
use asrc_verify::AsrcError;

/// Helper to create a sine at an exact bin of an `n`-point transform
fn bin_tone(bin: usize, n: usize, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * bin as f64 * i as f64 / n as f64).sin())
        .collect()
}

/// Zero-mean white Gaussian noise
fn gaussian_noise(rng: &mut StdRng, len: usize, sigma: f64) -> Vec<f64> {
    let normal = Normal::new(0.0, sigma).unwrap();
    (0..len).map(|_| normal.sample(rng)).collect()
}

fn with_noise(signal: &[f64], noise: &[f64]) -> Vec<f64> {
    signal.iter().zip(noise).map(|(s, n)| s + n).collect()
}

// === Reference Scenarios ===

#[test]
fn test_bin_205_pure_tone_hits_sentinels() {
    let samples = bin_tone(205, 1024, 1.0);
    let spectrum = compute_spectrum(&samples, 1024, None).unwrap();

    assert_eq!(calc_snr(&spectrum, 205).unwrap(), SNR_CEILING_DB);
    assert_eq!(calc_thd(&spectrum, 205).unwrap(), THD_FLOOR_DB);
}

#[test]
fn test_tone_bin_out_of_range() {
    let spectrum = compute_spectrum(&bin_tone(205, 1024, 1.0), 1024, None).unwrap();
    let err = calc_snr(&spectrum, 2000).unwrap_err();
    assert!(matches!(err, AsrcError::InvalidToneBin { bin: 2000, len: 1024 }));
    assert!(err.is_config_error());
}

#[test]
fn test_too_few_samples() {
    let err = compute_spectrum(&vec![0.0f64; 500], 1024, None).unwrap_err();
    assert!(matches!(
        err,
        AsrcError::InsufficientSamples {
            required: 1024,
            actual: 500
        }
    ));
}

// === Known Distortion ===

#[test]
fn test_thd_of_known_second_harmonic() {
    // -60 dB second harmonic
    let fundamental = bin_tone(100, 1024, 1.0);
    let harmonic = bin_tone(200, 1024, 0.001);
    let samples = with_noise(&fundamental, &harmonic);

    let spectrum = compute_spectrum(&samples, 1024, None).unwrap();
    assert_relative_eq!(calc_thd(&spectrum, 100).unwrap(), -60.0, epsilon = 1e-6);
}

#[test]
fn test_snr_of_white_noise_matches_theory() {
    // Sine power 0.5, noise power sigma^2; the measured band is 1..=N/2 minus
    // the guard band, which holds nearly all of the noise.
    let sigma = 0.01;
    let mut rng = StdRng::seed_from_u64(7);
    let noise = gaussian_noise(&mut rng, 4096, sigma);
    let samples = with_noise(&bin_tone(512, 4096, 1.0), &noise);

    let spectrum = compute_spectrum(&samples, 4096, None).unwrap();
    let expected = 10.0 * (0.5f64 / (sigma * sigma)).log10();
    let snr = calc_snr(&spectrum, 512).unwrap();
    assert!(
        (snr - expected).abs() < 1.0,
        "Expected ~{:.1} dB, got {:.1} dB",
        expected,
        snr
    );
}

#[test]
fn test_windowed_analysis_of_off_bin_tone() {
    let samples: Vec<f64> = (0..4096)
        .map(|i| (2.0 * PI * 300.37 * i as f64 / 4096.0).sin())
        .collect();

    let analyzer = SignalQualityAnalyzer::new(AnalyzerConfig {
        transform_size: 4096,
        window: WindowKind::BlackmanHarris,
        bands: asrc_verify::analysis::BandSettings {
            signal_half_width: 4,
            guard_half_width: 5,
            harmonic_count: 5,
        },
    })
    .unwrap();
    let (_, metrics) = analyzer.analyze(&samples, 300).unwrap();
    assert!(metrics.snr_db > 70.0, "SNR only {:.1} dB", metrics.snr_db);
}

// === Properties ===

proptest! {
    /// Property: output length depends only on the transform size
    #[test]
    fn spectrum_length_is_transform_size(
        exponent in 3u32..12,
        extra in 0usize..64,
        value in -1.0f64..1.0,
    ) {
        let n = 1usize << exponent;
        let samples = vec![value; n + extra];
        let spectrum = compute_spectrum(&samples, n, Some(WindowKind::Hann)).unwrap();
        prop_assert_eq!(spectrum.len(), n);
    }

    /// Property: scaling samples by k scales every magnitude by k
    #[test]
    fn spectrum_scales_with_amplitude(
        samples in prop::collection::vec(-1.0f64..1.0, 256),
        k in 0.01f64..100.0,
    ) {
        let scaled: Vec<f64> = samples.iter().map(|s| s * k).collect();
        let base = compute_spectrum(&samples, 256, None).unwrap();
        let big = compute_spectrum(&scaled, 256, None).unwrap();

        for (a, b) in base.magnitudes().iter().zip(big.magnitudes()) {
            prop_assert!((a * k - b).abs() <= 1e-9 * (1.0 + b.abs()));
        }
    }

    /// Property: more noise means lower SNR
    #[test]
    fn snr_decreases_with_noise_variance(
        seed in any::<u64>(),
        bin in 20usize..480,
        sigma in 1e-5f64..1e-2,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tone = bin_tone(bin, 1024, 1.0);

        let snrs: Vec<f64> = [1.0, 2.0, 4.0]
            .iter()
            .map(|scale| {
                let noise = gaussian_noise(&mut rng, 1024, sigma * scale);
                let spectrum = compute_spectrum(&with_noise(&tone, &noise), 1024, None).unwrap();
                calc_snr(&spectrum, bin).unwrap()
            })
            .collect();

        prop_assert!(snrs[0] > snrs[1], "SNR {:?}", snrs);
        prop_assert!(snrs[1] > snrs[2], "SNR {:?}", snrs);
    }

    /// Property: a pure fundamental has no measurable harmonic distortion
    #[test]
    fn pure_tone_thd_is_floor(
        bin in 1usize..500,
        amplitude in 0.01f64..1.0,
    ) {
        let spectrum = compute_spectrum(&bin_tone(bin, 1024, amplitude), 1024, None).unwrap();
        prop_assert_eq!(calc_thd(&spectrum, bin).unwrap(), THD_FLOOR_DB);
    }
}
