//! Report Generation
//!
//! Turns per-run results into the artefacts a reviewer reads:
//! - `results.csv` / `results.json`: one row per simulator run and channel
//! - `report.rst`: sectioned report with per-point tables and a summary table
//! - spectrum dumps for external plotting

mod record;
mod rst;

pub use record::{write_spectrum_dump, ResultLog, RunRecord};
pub use rst::RstDocument;
