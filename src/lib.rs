//! ASRC Verify - Sample-Rate Converter Validation
//!
//! Validates an asynchronous sample-rate converter against golden reference
//! models:
//! 1. Sweep input/output rates and output frequency deviation
//! 2. Synthesize test tones placed on known output FFT bins
//! 3. Run each reference model and collect its output and log
//! 4. Measure SNR and THD from the output spectrum, scrape MIPS from the log
//! 5. Write CSV/JSON results and an RST report
//!
//! The metric core lives in [`analysis`] and is usable on its own:
//!
//! ```rust
//! use asrc_verify::analysis::{calc_snr, calc_thd, compute_spectrum, SNR_CEILING_DB};
//!
//! let samples: Vec<f64> = (0..1024)
//!     .map(|n| (2.0 * std::f64::consts::PI * 205.0 * n as f64 / 1024.0).sin())
//!     .collect();
//! let spectrum = compute_spectrum(&samples, 1024, None).unwrap();
//! assert_eq!(calc_snr(&spectrum, 205).unwrap(), SNR_CEILING_DB);
//! assert!(calc_thd(&spectrum, 205).unwrap() < -150.0);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod report;
pub mod signal;
pub mod sim;
pub mod sweep;

pub use error::{AsrcError, Result};
