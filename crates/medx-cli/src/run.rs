//! The `run` and `check` workflows, independent of argument parsing.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, info_span, trace};

use medx_config::{ProcessorConfig, StrategyKind, load_config, resolve_output_path};
use medx_filter::{PipelineOutcome, run_pipeline};
use medx_ingest::read_record_table;
use medx_output::{WrittenFile, write_csv};

use crate::logging::redact_value;

/// What to run and where.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: PathBuf,
    /// Overrides `configuracion.archivo_entrada`.
    pub input: Option<PathBuf>,
    /// Overrides `configuracion.archivo_salida`.
    pub output: Option<PathBuf>,
    /// Filter and report without writing the output file.
    pub dry_run: bool,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub input: PathBuf,
    /// Destination, written unless the run was a dry run.
    pub output_path: PathBuf,
    pub written: Option<WrittenFile>,
    pub outcome: PipelineOutcome,
    pub unique_patients: usize,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Share of input rows that did not reach the output, in percent.
    pub fn reduction_percent(&self) -> f64 {
        let input = self.outcome.input_rows;
        if input == 0 {
            return 0.0;
        }
        let removed = input.saturating_sub(self.outcome.table.height());
        removed as f64 * 100.0 / input as f64
    }
}

/// Resolved configuration as reported by `medx check`.
#[derive(Debug)]
pub struct CheckReport {
    pub config: ProcessorConfig,
    pub active: StrategyKind,
    pub enabled: Vec<StrategyKind>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Loads the configuration, filters the extract and writes the result.
pub fn run_extract(options: &RunOptions) -> Result<RunReport> {
    let started = Instant::now();
    let config = load_config(&options.config)
        .with_context(|| format!("load configuration {}", options.config.display()))?;

    let input = config.input_path(options.input.as_deref())?;
    let base_output = config.output_path(options.output.as_deref())?;
    let output_path = resolve_output_path(&base_output, config.general.unique_output_name);

    let span = info_span!("run", input = %input.display(), strategy = %config.active_strategy());
    let _guard = span.enter();

    let raw = read_record_table(&input).with_context(|| format!("read {}", input.display()))?;
    let outcome = run_pipeline(raw, &config).context("filter extract")?;

    let patients: BTreeSet<i64> = outcome
        .table
        .patient_ids()
        .context("read patient ids")?
        .into_iter()
        .flatten()
        .collect();
    for patient in &patients {
        trace!(patient = redact_value(&patient.to_string()), "patient kept");
    }
    let dates = outcome.table.visit_dates().context("read visit dates")?;
    let date_span = date_span(dates.into_iter().flatten());

    let written = if options.dry_run {
        info!(path = %output_path.display(), "dry run, output not written");
        None
    } else {
        Some(
            write_csv(&outcome.table, &output_path)
                .with_context(|| format!("write {}", output_path.display()))?,
        )
    };

    Ok(RunReport {
        input,
        output_path,
        written,
        unique_patients: patients.len(),
        date_span,
        outcome,
        elapsed: started.elapsed(),
    })
}

/// Loads and validates a configuration without touching any data.
pub fn check_config(path: &Path) -> Result<CheckReport> {
    let config =
        load_config(path).with_context(|| format!("load configuration {}", path.display()))?;
    Ok(CheckReport {
        active: config.active_strategy(),
        enabled: config.enabled_strategies(),
        input: config.general.input_file.clone(),
        output: config.general.output_file.clone(),
        config,
    })
}

fn date_span(dates: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    dates.fold(None, |span, date| match span {
        None => Some((date, date)),
        Some((first, last)) => Some((first.min(date), last.max(date))),
    })
}
