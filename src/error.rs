//! Error handling for asrc-verify
//!
//! Analysis errors indicate a misconfigured test and are never retried.
//! Degenerate numeric results (zero noise, no harmonics in range) are not
//! errors; see [`crate::analysis`] for the sentinel values.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for asrc-verify operations
pub type Result<T> = std::result::Result<T, AsrcError>;

/// Main error type for asrc-verify operations
#[derive(Error, Debug)]
pub enum AsrcError {
    // Analysis Errors
    #[error("Insufficient samples: transform needs {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Invalid tone bin {bin} for spectrum of length {len}")]
    InvalidToneBin { bin: usize, len: usize },

    #[error("Invalid transform size {size} (must be a non-zero power of two)")]
    InvalidTransformSize { size: usize },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Unsupported sample rate: {rate} Hz")]
    UnsupportedRate { rate: u32 },

    // Simulator Errors
    #[error("Failed to launch simulator '{program}': {source}")]
    SimulatorLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulator output missing: {path}")]
    SimulatorOutputMissing { path: PathBuf },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed sample file {path} at line {line}: {content}")]
    MalformedSampleFile {
        path: PathBuf,
        line: usize,
        content: String,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AsrcError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AsrcError::InsufficientSamples { .. } => "INSUFFICIENT_SAMPLES",
            AsrcError::InvalidToneBin { .. } => "INVALID_TONE_BIN",
            AsrcError::InvalidTransformSize { .. } => "INVALID_TRANSFORM_SIZE",
            AsrcError::InvalidConfig { .. } => "INVALID_CONFIG",
            AsrcError::UnsupportedRate { .. } => "UNSUPPORTED_RATE",
            AsrcError::SimulatorLaunch { .. } => "SIMULATOR_LAUNCH",
            AsrcError::SimulatorOutputMissing { .. } => "SIMULATOR_OUTPUT_MISSING",
            AsrcError::FileReadError { .. } => "FILE_READ_ERROR",
            AsrcError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            AsrcError::MalformedSampleFile { .. } => "MALFORMED_SAMPLE_FILE",
            AsrcError::Io(_) => "IO_ERROR",
            AsrcError::Wav(_) => "WAV_ERROR",
            AsrcError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error means the test itself is misconfigured
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AsrcError::InsufficientSamples { .. }
                | AsrcError::InvalidToneBin { .. }
                | AsrcError::InvalidTransformSize { .. }
                | AsrcError::InvalidConfig { .. }
                | AsrcError::UnsupportedRate { .. }
        )
    }

    /// Shorthand for an [`AsrcError::InvalidConfig`]
    pub fn config(reason: impl Into<String>) -> Self {
        AsrcError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AsrcError::InvalidToneBin { bin: 2000, len: 1024 };
        assert_eq!(err.error_code(), "INVALID_TONE_BIN");

        let err = AsrcError::InsufficientSamples {
            required: 1024,
            actual: 500,
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_SAMPLES");
    }

    #[test]
    fn test_config_errors() {
        assert!(AsrcError::InvalidToneBin { bin: 1, len: 1 }.is_config_error());
        assert!(AsrcError::config("empty sweep").is_config_error());
        assert!(!AsrcError::SimulatorOutputMissing {
            path: PathBuf::from("out.txt")
        }
        .is_config_error());
    }

    #[test]
    fn test_error_messages() {
        let err = AsrcError::InsufficientSamples {
            required: 1024,
            actual: 500,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient samples: transform needs 1024, got 500"
        );
    }
}
