//! Result records and their CSV/JSON forms

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{QualityMetrics, Spectrum};
use crate::error::{AsrcError, Result};
use crate::sim::MipsReport;

const CSV_HEADER: &str =
    "model,ip_rate,op_rate,fdev,channel,tone_bin,snr_db,thd_db,total_mips,ch0_mips,ch1_mips,log";

/// Outcome of one simulator run for one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub model: String,
    pub ip_rate: u32,
    pub op_rate: u32,
    pub fdev: f64,
    pub channel: usize,
    pub tone_bin: usize,
    pub metrics: QualityMetrics,
    pub mips: MipsReport,
    /// Simulator log file the MIPS figures came from
    pub log_file: String,
}

impl RunRecord {
    /// Plot annotation: SNR/THD plus MIPS when the log reported it
    pub fn annotation(&self) -> String {
        let mut text = self.metrics.annotation();
        if let Some(total) = self.mips.total {
            text.push_str(&format!("MIPS:{:.1}\n", total));
        }
        text
    }

    fn csv_row(&self) -> String {
        let mips = |v: Option<f64>| v.map(|m| format!("{:.2}", m)).unwrap_or_default();
        [
            csv_field(&self.model),
            self.ip_rate.to_string(),
            self.op_rate.to_string(),
            format!("{:.6}", self.fdev),
            self.channel.to_string(),
            self.tone_bin.to_string(),
            format!("{:.2}", self.metrics.snr_db),
            format!("{:.2}", self.metrics.thd_db),
            mips(self.mips.total),
            mips(self.mips.ch0),
            mips(self.mips.ch1),
            csv_field(&self.log_file),
        ]
        .join(",")
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Every record produced by one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultLog {
    pub sweep_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub records: Vec<RunRecord>,
}

impl ResultLog {
    pub fn new(sweep_id: Uuid) -> Self {
        Self {
            sweep_id,
            started_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = RunRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lowest SNR across all records, for a one-line verdict
    pub fn worst_snr(&self) -> Option<&RunRecord> {
        self.records
            .iter()
            .min_by(|a, b| a.metrics.snr_db.total_cmp(&b.metrics.snr_db))
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let write_err = |e| AsrcError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        };
        let file = fs::File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", CSV_HEADER).map_err(write_err)?;
        for record in &self.records {
            writeln!(writer, "{}", record.csv_row()).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;
        Ok(())
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| AsrcError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AsrcError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Write the non-redundant half of a spectrum as `bin,frequency_hz,magnitude_db`
pub fn write_spectrum_dump(path: &Path, spectrum: &Spectrum, sample_rate: u32) -> Result<()> {
    let write_err = |e| AsrcError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    };
    let file = fs::File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    let bin_hz = sample_rate as f64 / spectrum.len().max(1) as f64;
    writeln!(writer, "bin,frequency_hz,magnitude_db").map_err(write_err)?;
    for (bin, db) in spectrum.half_db().iter().enumerate() {
        writeln!(writer, "{},{:.3},{:.3}", bin, bin as f64 * bin_hz, db).map_err(write_err)?;
    }
    writer.flush().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(snr_db: f64) -> RunRecord {
        RunRecord {
            model: "asrc".to_string(),
            ip_rate: 44_100,
            op_rate: 48_000,
            fdev: 1.0,
            channel: 0,
            tone_bin: 204,
            metrics: QualityMetrics {
                snr_db,
                thd_db: -120.0,
            },
            mips: MipsReport {
                total: Some(41.5),
                ch0: Some(20.0),
                ch1: None,
            },
            log_file: "logs/asrc, run 1.log".to_string(),
        }
    }

    #[test]
    fn test_csv_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut log = ResultLog::new(Uuid::new_v4());
        log.extend(vec![record(130.0)]);
        log.save_csv(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "asrc,44100,48000,1.000000,0,204,130.00,-120.00,41.50,20.00,,\"logs/asrc, run 1.log\""
        );
    }

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        let mut log = ResultLog::new(Uuid::new_v4());
        log.extend(vec![record(130.0), record(90.0)]);
        log.save_json(&path).unwrap();

        let loaded = ResultLog::load_json(&path).unwrap();
        assert_eq!(loaded.sweep_id, log.sweep_id);
        assert_eq!(loaded.records, log.records);
    }

    #[test]
    fn test_worst_snr() {
        let mut log = ResultLog::new(Uuid::new_v4());
        assert!(log.worst_snr().is_none());
        log.extend(vec![record(130.0), record(90.0), record(110.0)]);
        assert_eq!(log.worst_snr().unwrap().metrics.snr_db, 90.0);
    }

    #[test]
    fn test_annotation_includes_mips() {
        assert_eq!(
            record(130.0).annotation(),
            "SNR:130.0dB\nTHD:-120.0dB\nMIPS:41.5\n"
        );
    }

    #[test]
    fn test_spectrum_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spectrum.csv");
        let spectrum = Spectrum::from_magnitudes(vec![0.0, 1.0, 0.0, 1.0]);
        write_spectrum_dump(&path, &spectrum, 48_000).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "1,12000.000,0.000");
    }
}
