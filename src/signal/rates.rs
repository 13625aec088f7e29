//! Supported converter sample rates

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AsrcError, Result};

/// One of the sample rates supported by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SampleRate {
    #[serde(rename = "44100")]
    Hz44100,
    #[serde(rename = "48000")]
    Hz48000,
    #[serde(rename = "88200")]
    Hz88200,
    #[serde(rename = "96000")]
    Hz96000,
    #[serde(rename = "176400")]
    Hz176400,
    #[serde(rename = "192000")]
    Hz192000,
}

const ALL_RATES: [SampleRate; 6] = [
    SampleRate::Hz44100,
    SampleRate::Hz48000,
    SampleRate::Hz88200,
    SampleRate::Hz96000,
    SampleRate::Hz176400,
    SampleRate::Hz192000,
];

/// All supported rates, lowest first
pub fn all_rates() -> Vec<SampleRate> {
    ALL_RATES.to_vec()
}

impl SampleRate {
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
            SampleRate::Hz88200 => 88_200,
            SampleRate::Hz96000 => 96_000,
            SampleRate::Hz176400 => 176_400,
            SampleRate::Hz192000 => 192_000,
        }
    }

    /// Position in the rate table; the simulator identifies rates this way
    pub fn index(self) -> usize {
        ALL_RATES
            .iter()
            .position(|&r| r == self)
            .unwrap_or_default()
    }

    /// Look up a rate by its frequency in Hz
    pub fn from_hz(hz: u32) -> Result<Self> {
        ALL_RATES
            .iter()
            .copied()
            .find(|r| r.hz() == hz)
            .ok_or(AsrcError::UnsupportedRate { rate: hz })
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_lookup() {
        for rate in all_rates() {
            assert_eq!(SampleRate::from_hz(rate.hz()).unwrap(), rate);
        }
        assert_eq!(SampleRate::Hz96000.index(), 3);
    }

    #[test]
    fn test_unsupported_rate() {
        assert!(matches!(
            SampleRate::from_hz(22_050),
            Err(AsrcError::UnsupportedRate { rate: 22_050 })
        ));
    }

    #[test]
    fn test_serde_as_hz_string() {
        let json = serde_json::to_string(&SampleRate::Hz48000).unwrap();
        assert_eq!(json, "\"48000\"");
        let back: SampleRate = serde_json::from_str("\"176400\"").unwrap();
        assert_eq!(back, SampleRate::Hz176400);
    }
}
