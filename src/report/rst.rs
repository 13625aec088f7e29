//! reStructuredText report builder

use std::fs;
use std::path::Path;

use super::record::RunRecord;
use crate::error::{AsrcError, Result};

/// Underline characters for header levels 1..=4
const HEADER_CHARS: [char; 4] = ['=', '-', '~', '^'];

/// Incrementally built RST document
#[derive(Debug, Clone, Default)]
pub struct RstDocument {
    body: String,
}

impl RstDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section header; levels past 4 reuse the deepest underline
    pub fn add_header(&mut self, title: &str, level: usize) {
        let index = level.clamp(1, HEADER_CHARS.len()) - 1;
        let underline: String = std::iter::repeat(HEADER_CHARS[index])
            .take(title.chars().count())
            .collect();
        self.body.push_str(&format!("{}\n{}\n\n", title, underline));
    }

    pub fn add_text(&mut self, text: &str) {
        self.body.push_str(text);
        self.body.push_str("\n\n");
    }

    /// Bulleted list, one item per entry
    pub fn add_list<S: AsRef<str>>(&mut self, items: &[S]) {
        if items.is_empty() {
            return;
        }
        for item in items {
            self.body.push_str(&format!("- {}\n", item.as_ref()));
        }
        self.body.push('\n');
    }

    /// Table of run results
    pub fn add_results_table(&mut self, records: &[RunRecord]) {
        if records.is_empty() {
            return;
        }

        let header = [
            "Model", "Input Fs", "Output Fs", "fDev", "Channel", "SNR (dB)", "THD (dB)", "MIPS",
        ];
        let mut rows = vec![header.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        rows.extend(records.iter().map(|r| {
            vec![
                r.model.clone(),
                r.ip_rate.to_string(),
                r.op_rate.to_string(),
                format!("{:.6}", r.fdev),
                r.channel.to_string(),
                if r.metrics.snr_is_clamped() {
                    format!(">={:.1}", r.metrics.snr_db)
                } else {
                    format!("{:.1}", r.metrics.snr_db)
                },
                if r.metrics.thd_is_floor() {
                    format!("<={:.1}", r.metrics.thd_db)
                } else {
                    format!("{:.1}", r.metrics.thd_db)
                },
                r.mips
                    .total
                    .map(|m| format!("{:.1}", m))
                    .unwrap_or_else(|| "-".to_string()),
            ]
        }));

        self.body.push_str(".. list-table::\n   :header-rows: 1\n\n");
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                let marker = if i == 0 { "   * - " } else { "     - " };
                self.body.push_str(marker);
                self.body.push_str(cell);
                self.body.push('\n');
            }
        }
        self.body.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.body).map_err(|e| AsrcError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QualityMetrics;
    use crate::sim::MipsReport;

    #[test]
    fn test_header_levels() {
        let mut doc = RstDocument::new();
        doc.add_header("Performance", 1);
        doc.add_header("Output Fs : 48,000Hz", 4);
        doc.add_header("Deep", 9);

        let text = doc.as_str();
        assert!(text.starts_with("Performance\n===========\n\n"));
        assert!(text.contains("Output Fs : 48,000Hz\n^^^^^^^^^^^^^^^^^^^^\n"));
        assert!(text.contains("Deep\n^^^^\n"));
    }

    #[test]
    fn test_results_table() {
        let mut doc = RstDocument::new();
        doc.add_results_table(&[RunRecord {
            model: "asrc".to_string(),
            ip_rate: 44_100,
            op_rate: 48_000,
            fdev: 0.9999,
            channel: 1,
            tone_bin: 170,
            metrics: QualityMetrics {
                snr_db: 135.26,
                thd_db: -140.0,
            },
            mips: MipsReport::default(),
            log_file: String::new(),
        }]);

        let text = doc.as_str();
        assert!(text.starts_with(".. list-table::\n   :header-rows: 1\n\n   * - Model\n"));
        assert!(text.contains("   * - asrc\n     - 44100\n     - 48000\n     - 0.999900\n"));
        assert!(text.contains("     - 135.3\n     - -140.0\n     - -\n"));
    }

    #[test]
    fn test_clamped_metrics_are_marked() {
        let mut doc = RstDocument::new();
        doc.add_results_table(&[RunRecord {
            model: "ideal".to_string(),
            ip_rate: 48_000,
            op_rate: 48_000,
            fdev: 1.0,
            channel: 0,
            tone_bin: 204,
            metrics: QualityMetrics {
                snr_db: 200.0,
                thd_db: -200.0,
            },
            mips: MipsReport::default(),
            log_file: String::new(),
        }]);
        assert!(doc.as_str().contains("     - >=200.0\n     - <=-200.0\n"));
    }

    #[test]
    fn test_empty_inputs_add_nothing() {
        let mut doc = RstDocument::new();
        doc.add_results_table(&[]);
        doc.add_list::<&str>(&[]);
        assert!(doc.as_str().is_empty());
    }

    #[test]
    fn test_list_and_text() {
        let mut doc = RstDocument::new();
        doc.add_text("No SRC available for this scenario.");
        doc.add_list(&["a.csv", "b.csv"]);
        assert_eq!(
            doc.as_str(),
            "No SRC available for this scenario.\n\n- a.csv\n- b.csv\n\n"
        );
    }
}
