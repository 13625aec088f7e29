//! Per-point evaluation and the full sweep

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use uuid::Uuid;

use super::plan::{SweepPlan, SweepPoint};
use crate::analysis::SignalQualityAnalyzer;
use crate::config::EvalConfig;
use crate::error::{AsrcError, Result};
use crate::io::{export_wav, read_sample_file, write_sample_file, VectorManifest};
use crate::report::{write_spectrum_dump, ResultLog, RstDocument, RunRecord};
use crate::signal::{SignalPlan, TestSignal};
use crate::sim::{scrape_mips, CommandSimulator, SimJob, SimOutcome, Simulator};

pub const RESULTS_CSV: &str = "results.csv";
pub const RESULTS_JSON: &str = "results.json";
pub const REPORT_RST: &str = "report.rst";
pub const MANIFEST_JSON: &str = "manifest.json";

const NO_RESULTS_TEXT: &str = "No SRC available for this scenario.";

/// Directory layout under the configured output directory
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub root: PathBuf,
    /// Generated input vectors
    pub vectors: PathBuf,
    /// Simulator outputs and logs
    pub sim: PathBuf,
    /// Spectrum dumps for plotting
    pub spectra: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            vectors: root.join("vectors"),
            sim: root.join("sim"),
            spectra: root.join("spectra"),
        }
    }

    /// Create every directory in the layout
    pub fn create(&self) -> Result<()> {
        for dir in [&self.root, &self.vectors, &self.sim, &self.spectra] {
            fs::create_dir_all(dir).map_err(|e| AsrcError::FileWriteError {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Everything one sweep point produced
#[derive(Debug, Clone)]
pub struct PointOutcome {
    pub point: SweepPoint,
    pub records: Vec<RunRecord>,
    /// Input vectors written: path, sample rate, frames
    pub vectors: Vec<(PathBuf, u32, usize)>,
    pub spectrum_files: Vec<PathBuf>,
    /// Tone description per input channel
    pub labels: Vec<String>,
    /// Why a model or channel produced nothing, one entry per skip
    pub skipped: Vec<String>,
}

impl PointOutcome {
    pub fn has_results(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Paths and counts from a completed sweep
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub sweep_id: Uuid,
    pub points: usize,
    pub records: usize,
    pub skipped: usize,
    /// Lowest SNR seen, if anything ran
    pub worst_snr_db: Option<f64>,
    pub report_path: PathBuf,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

/// A configured sweep over reference models
pub struct Sweep {
    config: EvalConfig,
    analyzer: SignalQualityAnalyzer,
    signal_plan: SignalPlan,
    simulators: Vec<Box<dyn Simulator>>,
    layout: OutputLayout,
}

impl Sweep {
    /// Create a sweep with explicit simulators
    pub fn new(config: EvalConfig, simulators: Vec<Box<dyn Simulator>>) -> Result<Self> {
        config.validate()?;
        if let Some(sim) = simulators
            .iter()
            .find(|s| s.channels() == 0 || s.channels() > config.tone_bins.len())
        {
            return Err(AsrcError::config(format!(
                "model '{}' converts {} channels but {} tones are configured",
                sim.name(),
                sim.channels(),
                config.tone_bins.len()
            )));
        }

        Ok(Self {
            analyzer: SignalQualityAnalyzer::new(config.analyzer_config())?,
            signal_plan: config.signal_plan(),
            layout: OutputLayout::new(&config.output_dir),
            simulators,
            config,
        })
    }

    /// Create a sweep running every model in the configuration as a command
    pub fn from_config(config: EvalConfig) -> Result<Self> {
        let simulators = config
            .models
            .iter()
            .cloned()
            .map(|m| Box::new(CommandSimulator::new(m)) as Box<dyn Simulator>)
            .collect();
        Self::new(config, simulators)
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn plan(&self) -> SweepPlan {
        SweepPlan::from_config(&self.config)
    }

    /// Generate, simulate and analyse one point
    ///
    /// Output directories must exist (see [`OutputLayout::create`]).
    pub fn evaluate(&self, point: &SweepPoint) -> Result<PointOutcome> {
        let signal = self.signal_plan.generate(point.ip_rate, point.op_rate);
        let tag = point.tag();

        let mut outcome = PointOutcome {
            point: *point,
            records: Vec::new(),
            vectors: Vec::new(),
            spectrum_files: Vec::new(),
            labels: (0..signal.num_channels()).map(|ch| signal.label(ch)).collect(),
            skipped: Vec::new(),
        };

        let inputs = self.write_inputs(&signal, &tag, &mut outcome)?;

        for sim in &self.simulators {
            let channels = sim.channels();
            let job = SimJob {
                inputs: inputs.iter().take(channels).cloned().collect(),
                outputs: (0..channels)
                    .map(|ch| {
                        self.layout
                            .sim
                            .join(format!("{}_{}_ch{}.txt", sim.name(), tag, ch))
                    })
                    .collect(),
                log_path: self.layout.sim.join(format!("{}_{}.log", sim.name(), tag)),
                ip_rate: point.ip_rate,
                op_rate: point.op_rate,
                fdev: point.fdev,
                frames: signal.num_frames(),
            };

            match sim.run(&job) {
                Ok(SimOutcome::Completed { outputs, log }) => {
                    let mips = scrape_mips(&log, &self.config.scrape_keys);
                    for (channel, output) in outputs.iter().enumerate() {
                        match self.analyse_output(sim.name(), point, &signal, channel, output, &job)
                        {
                            Ok((record, spectrum_path)) => {
                                outcome.spectrum_files.push(spectrum_path);
                                outcome.records.push(RunRecord { mips, ..record });
                            }
                            Err(e) if is_unusable_output(&e) => {
                                warn!("[SWEEP] {} {} ch{}: {}", sim.name(), point, channel, e);
                                outcome
                                    .skipped
                                    .push(format!("{} ch{}: {}", sim.name(), channel, e));
                            }
                            Err(e) => return Err(e),
                        }
                    }
                }
                Ok(SimOutcome::Unsupported { reason }) => {
                    debug!("[SWEEP] {}: {}", point, reason);
                    outcome.skipped.push(reason);
                }
                Err(e) if is_unusable_output(&e) => {
                    warn!("[SWEEP] {} {}: {}", sim.name(), point, e);
                    outcome.skipped.push(format!("{}: {}", sim.name(), e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    fn write_inputs(
        &self,
        signal: &TestSignal,
        tag: &str,
        outcome: &mut PointOutcome,
    ) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::with_capacity(signal.num_channels());
        for (channel, samples) in signal.channels.iter().enumerate() {
            let path = self.layout.vectors.join(format!("in_{}_ch{}.txt", tag, channel));
            write_sample_file(&path, samples)?;
            outcome
                .vectors
                .push((path.clone(), signal.ip_rate.hz(), samples.len()));
            inputs.push(path);
        }

        if self.config.export_wav {
            let path = self.layout.vectors.join(format!("in_{}.wav", tag));
            export_wav(&path, &signal.channels, signal.ip_rate.hz())?;
        }

        Ok(inputs)
    }

    fn analyse_output(
        &self,
        model: &str,
        point: &SweepPoint,
        signal: &TestSignal,
        channel: usize,
        output: &Path,
        job: &SimJob,
    ) -> Result<(RunRecord, PathBuf)> {
        let samples = read_sample_file(output)?;
        let tone = signal
            .tone(channel)
            .ok_or_else(|| AsrcError::config(format!("no tone configured for channel {}", channel)))?;

        // Skip the settling transient, but never below one full block
        let fft = self.analyzer.transform_size();
        let skip = self
            .config
            .settle_samples
            .min(samples.len().saturating_sub(fft));
        if skip < self.config.settle_samples {
            warn!(
                "[SWEEP] {} {} ch{}: only {} output samples, analysing from {}",
                model,
                point,
                channel,
                samples.len(),
                skip
            );
        }

        let (spectrum, metrics) = self.analyzer.analyze(&samples[skip..], tone.output_bin)?;

        let spectrum_path = self.layout.spectra.join(format!(
            "spectrum_{}_{}_ch{}.csv",
            model,
            point.tag(),
            channel
        ));
        write_spectrum_dump(&spectrum_path, &spectrum, point.op_rate.hz())?;

        let record = RunRecord {
            model: model.to_string(),
            ip_rate: point.ip_rate.hz(),
            op_rate: point.op_rate.hz(),
            fdev: point.fdev,
            channel,
            tone_bin: tone.output_bin,
            metrics,
            mips: Default::default(),
            log_file: job.log_path.display().to_string(),
        };
        debug!(
            "[SWEEP] {} {} ch{}: {}",
            model,
            point,
            channel,
            record.annotation().replace('\n', " ")
        );

        Ok((record, spectrum_path))
    }

    /// Run every point and write the report, results and manifest
    pub fn run(&self) -> Result<SweepSummary> {
        self.layout.create()?;

        let sweep_id = Uuid::new_v4();
        let plan = self.plan();
        let mut log = ResultLog::new(sweep_id);
        let mut manifest = VectorManifest::new(sweep_id);
        let mut doc = RstDocument::new();
        let mut skipped = 0;

        doc.add_header("Performance information", 1);
        doc.add_text(&format!(
            "Sweep {} started {}. FFT points: {}, window: {}.",
            sweep_id,
            log.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.config.fft_points,
            self.config.window
        ));
        doc.add_header("Chart data", 2);

        let mut previous: Option<SweepPoint> = None;
        let mut group_has_results = false;

        info!("[SWEEP] {} points, {} models", plan.len(), self.simulators.len());
        for point in plan.points() {
            let new_fdev = previous.map_or(true, |p| p.fdev != point.fdev);
            let new_group = new_fdev || previous.map_or(true, |p| p.op_rate != point.op_rate);

            if new_group {
                if previous.is_some() && !group_has_results {
                    doc.add_text(NO_RESULTS_TEXT);
                }
                if new_fdev {
                    doc.add_header(&format!("Frequency error: {:.6}Hz", point.fdev), 3);
                }
                doc.add_header(
                    &format!("Output Fs : {}Hz", group_thousands(point.op_rate.hz())),
                    4,
                );
                group_has_results = false;
            }

            info!("[SWEEP] {}", point);
            let outcome = self.evaluate(&point)?;

            for (path, rate, frames) in &outcome.vectors {
                manifest.record(path, *rate, *frames)?;
            }
            skipped += outcome.skipped.len();

            if outcome.has_results() {
                group_has_results = true;
                doc.add_text(&format!(
                    "**Input Fs : {}Hz**",
                    group_thousands(point.ip_rate.hz())
                ));
                doc.add_list(&outcome.labels);
                doc.add_results_table(&outcome.records);
                let dumps: Vec<String> = outcome
                    .spectrum_files
                    .iter()
                    .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .collect();
                doc.add_list(&dumps);
            }

            log.extend(outcome.records);
            previous = Some(point);
        }
        if previous.is_some() && !group_has_results {
            doc.add_text(NO_RESULTS_TEXT);
        }

        doc.add_header("Tabulated data", 2);
        doc.add_results_table(&log.records);

        let summary = SweepSummary {
            sweep_id,
            points: plan.len(),
            records: log.len(),
            skipped,
            worst_snr_db: log.worst_snr().map(|r| r.metrics.snr_db),
            report_path: self.layout.root.join(REPORT_RST),
            csv_path: self.layout.root.join(RESULTS_CSV),
            json_path: self.layout.root.join(RESULTS_JSON),
        };

        log.save_csv(&summary.csv_path)?;
        log.save_json(&summary.json_path)?;
        doc.save(&summary.report_path)?;
        manifest.save(&self.layout.root.join(MANIFEST_JSON))?;

        info!(
            "[SWEEP] Done: {} records, {} skipped runs",
            summary.records, summary.skipped
        );
        Ok(summary)
    }
}

/// A model run that finished but left nothing to analyse
fn is_unusable_output(err: &AsrcError) -> bool {
    matches!(
        err,
        AsrcError::SimulatorOutputMissing { .. }
            | AsrcError::InsufficientSamples { .. }
            | AsrcError::MalformedSampleFile { .. }
            | AsrcError::FileReadError { .. }
    )
}

/// Format an integer with comma thousands separators
fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
