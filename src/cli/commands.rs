//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use crate::analysis::{AnalyzerConfig, SignalQualityAnalyzer, WindowKind};
use crate::config::EvalConfig;
use crate::error::{AsrcError, Result};
use crate::io::read_sample_file;
use crate::report::write_spectrum_dump;
use crate::signal::all_rates;
use crate::sweep::Sweep;

/// Run the sweep described by a configuration file.
pub fn sweep(config_path: &Path, output: Option<&Path>, wav: bool) -> Result<()> {
    info!("Loading configuration: {}", config_path.display());

    let mut config = EvalConfig::load(config_path)?;
    if let Some(dir) = output {
        config.output_dir = dir.to_path_buf();
    }
    config.export_wav |= wav;

    if config.models.is_empty() {
        return Err(AsrcError::config(
            "no reference models configured; add entries under \"models\"",
        ));
    }

    let sweep = Sweep::from_config(config)?;
    let summary = sweep.run()?;

    println!("Sweep {} complete", summary.sweep_id);
    println!("{:-<60}", "");
    println!("Points:          {}", summary.points);
    println!("Results:         {}", summary.records);
    println!("Skipped runs:    {}", summary.skipped);
    if let Some(worst) = summary.worst_snr_db {
        println!("Worst SNR:       {:.1} dB", worst);
    }
    println!("{:-<60}", "");
    println!("Report:  {}", summary.report_path.display());
    println!("CSV:     {}", summary.csv_path.display());
    println!("JSON:    {}", summary.json_path.display());

    Ok(())
}

/// Options for [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyzeOptions<'a> {
    pub tone_bin: usize,
    pub fft: usize,
    pub window: WindowKind,
    pub skip: usize,
    pub dump: Option<&'a Path>,
    pub rate: u32,
}

/// Measure one output file.
pub fn analyze(file: &Path, options: &AnalyzeOptions<'_>) -> Result<()> {
    info!("Analyzing: {}", file.display());

    let samples = read_sample_file(file)?;
    let analyzer = SignalQualityAnalyzer::new(AnalyzerConfig {
        transform_size: options.fft,
        window: options.window,
        ..AnalyzerConfig::default()
    })?;

    let block = samples.get(options.skip..).unwrap_or_default();
    let (spectrum, metrics) = analyzer.analyze(block, options.tone_bin)?;

    println!("File:     {}", file.display());
    println!("Samples:  {} (skipped {})", samples.len(), options.skip);
    println!("FFT:      {} points, {} window", options.fft, options.window);
    println!("Tone bin: {}", options.tone_bin);
    println!("SNR:      {:.1} dB", metrics.snr_db);
    println!("THD:      {:.1} dB", metrics.thd_db);

    if let Some(dump) = options.dump {
        write_spectrum_dump(dump, &spectrum, options.rate)?;
        println!("Spectrum: {}", dump.display());
    }

    Ok(())
}

/// Write the default configuration.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(AsrcError::config(format!(
            "{} already exists; refusing to overwrite",
            path.display()
        )));
    }

    EvalConfig::default().save(path)?;
    println!("Configuration written: {}", path.display());
    Ok(())
}

/// List supported sample rates.
pub fn list_rates() -> Result<()> {
    println!("Supported sample rates:");
    for rate in all_rates() {
        println!("  [{}] {} Hz", rate.index(), rate);
    }
    Ok(())
}
