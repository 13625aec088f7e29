//! MIPS counters scraped from simulator logs

use serde::{Deserialize, Serialize};

/// Log line markers preceding each MIPS figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeKeys {
    pub total: String,
    pub ch0: String,
    pub ch1: String,
}

impl Default for ScrapeKeys {
    fn default() -> Self {
        Self {
            total: "Total MIPS".to_string(),
            ch0: "Channel 0 MIPS".to_string(),
            ch1: "Channel 1 MIPS".to_string(),
        }
    }
}

/// Performance figures reported by one simulator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MipsReport {
    pub total: Option<f64>,
    pub ch0: Option<f64>,
    pub ch1: Option<f64>,
}

/// Extract MIPS figures from a simulator log
///
/// For each key the last line containing it wins, and the first number
/// after the key is taken. A missing total is derived from the two channel
/// figures when both are present.
pub fn scrape_mips(log: &str, keys: &ScrapeKeys) -> MipsReport {
    let ch0 = find_value(log, &keys.ch0);
    let ch1 = find_value(log, &keys.ch1);
    let total = find_value(log, &keys.total).or(match (ch0, ch1) {
        (Some(a), Some(b)) => Some(a + b),
        _ => None,
    });

    MipsReport { total, ch0, ch1 }
}

fn find_value(log: &str, key: &str) -> Option<f64> {
    if key.is_empty() {
        return None;
    }
    log.lines()
        .rev()
        .filter_map(|line| line.find(key).map(|pos| &line[pos + key.len()..]))
        .find_map(first_number)
}

fn first_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let digit_at = |i: usize| bytes.get(i).map_or(false, u8::is_ascii_digit);

    // A sign or point only starts a number when a digit follows
    let start = (0..bytes.len()).find(|&i| match bytes[i] {
        b'0'..=b'9' => true,
        b'.' => digit_at(i + 1),
        b'-' | b'+' => digit_at(i + 1) || (bytes.get(i + 1) == Some(&b'.') && digit_at(i + 2)),
        _ => false,
    })?;

    let mut end = start + 1;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    // Exponent only when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_digits = if matches!(bytes.get(end + 1), Some(b'-' | b'+')) {
            end + 2
        } else {
            end + 1
        };
        if digit_at(exp_digits) {
            end = exp_digits;
            while digit_at(end) {
                end += 1;
            }
        }
    }

    text[start..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Running ASRC ip=44100 op=48000
Channel 0 MIPS: 21.5
Channel 1 MIPS: 20.25
Total MIPS: 41.75
";

    #[test]
    fn test_scrape_all_fields() {
        let report = scrape_mips(LOG, &ScrapeKeys::default());
        assert_eq!(report.ch0, Some(21.5));
        assert_eq!(report.ch1, Some(20.25));
        assert_eq!(report.total, Some(41.75));
    }

    #[test]
    fn test_total_derived_from_channels() {
        let log = "Channel 0 MIPS = 10\nChannel 1 MIPS = 12.5\n";
        let report = scrape_mips(log, &ScrapeKeys::default());
        assert_eq!(report.total, Some(22.5));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let log = "Total MIPS: 1.0\nwarmup done\nTotal MIPS: 3.5 (peak)\n";
        let report = scrape_mips(log, &ScrapeKeys::default());
        assert_eq!(report.total, Some(3.5));
        assert_eq!(report.ch0, None);
    }

    #[test]
    fn test_missing_values() {
        let report = scrape_mips("no counters here", &ScrapeKeys::default());
        assert_eq!(report, MipsReport::default());
    }

    #[test]
    fn test_custom_keys() {
        let keys = ScrapeKeys {
            total: "MHz:".to_string(),
            ..ScrapeKeys::default()
        };
        let report = scrape_mips("Core MHz: 62 (of 100)", &keys);
        assert_eq!(report.total, Some(62.0));
    }

    #[test]
    fn test_first_number_edge_cases() {
        assert_eq!(first_number(": -4.5e1 mips"), Some(-45.0));
        assert_eq!(first_number(": n/a"), None);
        assert_eq!(first_number(": - 12"), Some(12.0));
        assert_eq!(first_number("12each"), Some(12.0));
        assert_eq!(first_number("= .5e-1"), Some(0.05));
    }

    #[test]
    fn test_last_line_wins_with_loose_formatting() {
        let log = "Total MIPS: 4.0\nTotal MIPS: - 12\nTotal MIPS 7each\n";
        let report = scrape_mips(log, &ScrapeKeys::default());
        assert_eq!(report.total, Some(7.0));

        let log = "Total MIPS: 4.0\nTotal MIPS: - 12\n";
        assert_eq!(scrape_mips(log, &ScrapeKeys::default()).total, Some(12.0));
    }
}
