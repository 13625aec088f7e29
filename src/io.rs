//! Sample file I/O
//!
//! The reference simulator exchanges samples as plain text, one sample per
//! line in Q1.31 fixed point. Decimal values (containing `.` or an exponent)
//! are also accepted on read and taken as floating-point samples.
//!
//! Generated input vectors are recorded in a JSON manifest with a SHA-256
//! checksum so a report can be traced back to the exact stimulus.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AsrcError, Result};

const Q31_SCALE: f64 = 2_147_483_648.0;

/// Convert a float sample to Q1.31, saturating at full scale
pub fn to_q31(sample: f64) -> i32 {
    (sample * Q31_SCALE).round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Convert a Q1.31 integer to a float sample
pub fn from_q31(value: i64) -> f64 {
    value as f64 / Q31_SCALE
}

/// Write samples as Q1.31 integers, one per line
pub fn write_sample_file(path: &Path, samples: &[f64]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| AsrcError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    for &sample in samples {
        writeln!(writer, "{}", to_q31(sample)).map_err(|e| AsrcError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    writer.flush().map_err(|e| AsrcError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Read a sample file written by the simulator
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Errors
/// * `FileReadError` - if the file cannot be opened or read
/// * `MalformedSampleFile` - if a line is not a number
pub fn read_sample_file(path: &Path) -> Result<Vec<f64>> {
    let file = fs::File::open(path).map_err(|e| AsrcError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut samples = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| AsrcError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let sample = parse_sample(trimmed).ok_or_else(|| AsrcError::MalformedSampleFile {
            path: path.to_path_buf(),
            line: index + 1,
            content: trimmed.to_string(),
        })?;
        samples.push(sample);
    }

    Ok(samples)
}

fn parse_sample(text: &str) -> Option<f64> {
    if text.contains(&['.', 'e', 'E'][..]) {
        text.parse::<f64>().ok()
    } else {
        text.parse::<i64>().ok().map(from_q31)
    }
}

/// Write channels as an interleaved 32-bit float WAV
pub fn export_wav(path: &Path, channels: &[Vec<f64>], sample_rate: u32) -> Result<()> {
    if channels.is_empty() {
        return Err(AsrcError::config("cannot export a WAV with no channels"));
    }

    let spec = WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;

    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    for frame in 0..frames {
        for channel in channels {
            writer.write_sample(channel[frame] as f32)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// SHA-256 checksum of a file as lowercase hex
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| AsrcError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.finalize();
    Ok(format!("{:x}", hash))
}

/// Metadata for one generated input vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFileInfo {
    pub sample_rate: u32,
    pub frames: usize,
    pub sha256: String,
}

/// Manifest of every input vector written during a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorManifest {
    pub sweep_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Map of file name to file info
    pub files: BTreeMap<String, VectorFileInfo>,
}

impl VectorManifest {
    pub fn new(sweep_id: Uuid) -> Self {
        Self {
            sweep_id,
            created_at: Utc::now(),
            files: BTreeMap::new(),
        }
    }

    /// Record a written vector, checksumming it from disk
    pub fn record(&mut self, path: &Path, sample_rate: u32, frames: usize) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let info = VectorFileInfo {
            sample_rate,
            frames,
            sha256: file_checksum(path)?,
        };
        self.files.insert(name, info);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| AsrcError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AsrcError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
