//! Analysis windows applied before the FFT

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// 4-term Blackman-Harris coefficients (-92 dB sidelobes)
const BH_A0: f64 = 0.35875;
const BH_A1: f64 = 0.48829;
const BH_A2: f64 = 0.14128;
const BH_A3: f64 = 0.01168;

/// Window applied to the time-domain block before transforming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    /// No windowing. Exact for tones that land on a bin centre.
    #[default]
    Rectangular,
    Hann,
    BlackmanHarris,
}

impl WindowKind {
    /// Periodic window coefficients of length `n`
    pub fn coefficients(self, n: usize) -> Vec<f64> {
        let n_f = n as f64;
        (0..n)
            .map(|i| {
                let x = 2.0 * PI * i as f64 / n_f;
                match self {
                    WindowKind::Rectangular => 1.0,
                    WindowKind::Hann => 0.5 - 0.5 * x.cos(),
                    WindowKind::BlackmanHarris => {
                        BH_A0 - BH_A1 * x.cos() + BH_A2 * (2.0 * x).cos()
                            - BH_A3 * (3.0 * x).cos()
                    }
                }
            })
            .collect()
    }

    /// Mean of the coefficients; divides out the window's amplitude loss
    pub fn coherent_gain(self, n: usize) -> f64 {
        if n == 0 {
            return 1.0;
        }
        self.coefficients(n).iter().sum::<f64>() / n as f64
    }

    pub fn name(self) -> &'static str {
        match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Hann => "hann",
            WindowKind::BlackmanHarris => "blackman-harris",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Ok(WindowKind::Rectangular),
            "hann" | "hanning" => Ok(WindowKind::Hann),
            "blackman-harris" | "blackmanharris" | "bh" => Ok(WindowKind::BlackmanHarris),
            other => Err(format!(
                "unknown window '{}' (expected rectangular, hann or blackman-harris)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_is_flat() {
        let w = WindowKind::Rectangular.coefficients(64);
        assert_eq!(w.len(), 64);
        assert!(w.iter().all(|&c| c == 1.0));
        assert_relative_eq!(WindowKind::Rectangular.coherent_gain(64), 1.0);
    }

    #[test]
    fn test_hann_shape() {
        let w = WindowKind::Hann.coefficients(8);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[4], 1.0, epsilon = 1e-12);
        assert_relative_eq!(WindowKind::Hann.coherent_gain(1024), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_blackman_harris_gain() {
        assert_relative_eq!(
            WindowKind::BlackmanHarris.coherent_gain(1024),
            BH_A0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("hann".parse::<WindowKind>(), Ok(WindowKind::Hann));
        assert_eq!("none".parse::<WindowKind>(), Ok(WindowKind::Rectangular));
        assert_eq!(
            "Blackman-Harris".parse::<WindowKind>(),
            Ok(WindowKind::BlackmanHarris)
        );
        assert!("kaiser".parse::<WindowKind>().is_err());
        assert_eq!(WindowKind::BlackmanHarris.to_string(), "blackman-harris");
    }
}
