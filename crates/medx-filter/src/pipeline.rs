//! End-to-end filtering of one extract.
//!
//! Order of operations:
//!
//! 1. diagnosis type gate on the raw table
//! 2. projection onto the configured columns
//! 3. data quality normalization
//! 4. the active strategy
//! 5. final quality pass
//! 6. sort by patient, then visit date when visits matter

use std::collections::BTreeMap;

use tracing::{debug, info};

use medx_config::{ProcessorConfig, StrategyKind};
use medx_model::{RecordTable, columns};

use crate::diagnostics::{StageCount, StrategyDiagnostics};
use crate::error::{FilterError, Result};
use crate::normalizer::{NormalizationReport, NormalizationRules, normalize};
use crate::rows::{keep_values_in, keep_where, require_column};
use crate::strategy::FilterStrategy;

/// Everything a run produced besides the output file.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub table: RecordTable,
    pub input_rows: usize,
    /// Rows left after the diagnosis type gate.
    pub gated_rows: usize,
    pub normalization: NormalizationReport,
    pub strategy: StrategyDiagnostics,
    pub final_pass: Vec<StageCount>,
    pub sorted_by_date: bool,
    /// Null cells per critical column present in the output.
    pub missing_values: BTreeMap<&'static str, usize>,
}

/// Runs the whole pipeline on a freshly loaded table.
pub fn run_pipeline(raw: RecordTable, config: &ProcessorConfig) -> Result<PipelineOutcome> {
    let strategy = FilterStrategy::from_config(config);
    let input_rows = raw.height();
    info!(strategy = %strategy.kind(), rows = input_rows, "pipeline started");

    let mut table = raw;
    gate_diagnosis_type(&mut table, config, strategy.kind())?;
    let gated_rows = table.height();

    let table = select_columns(&table, &config.columns)?;

    let rules = NormalizationRules::from(&config.validations);
    let (table, normalization) = normalize(table, &rules)?;

    let output = strategy.apply(table)?;
    let mut table = output.table;
    let diagnostics = output.diagnostics;

    let final_pass = final_quality_pass(&mut table, config, strategy.kind(), &rules)?;

    let sorted_by_date = table.has_column(columns::VISIT_DATE)
        && (strategy.granularity().is_by_date() || diagnostics.has_added(columns::PRESSURE_TYPE));
    if table.has_column(columns::PATIENT_ID) {
        if sorted_by_date {
            table.sort_by(&[columns::PATIENT_ID, columns::VISIT_DATE])?;
        } else {
            table.sort_by(&[columns::PATIENT_ID])?;
        }
    }

    let missing_values = missing_values(&table)?;
    info!(rows = table.height(), sorted_by_date, "pipeline finished");

    Ok(PipelineOutcome {
        table,
        input_rows,
        gated_rows,
        normalization,
        strategy: diagnostics,
        final_pass,
        sorted_by_date,
        missing_values,
    })
}

/// Applies the diagnosis type allow-list of the run.
///
/// The specific strategy brings its own list; every other run keeps rows equal
/// to `configuracion.tipo_diagnostico`.
fn gate_diagnosis_type(
    table: &mut RecordTable,
    config: &ProcessorConfig,
    kind: StrategyKind,
) -> Result<()> {
    require_column(table, columns::DIAGNOSIS_TYPE)?;
    let before = table.height();
    if kind == StrategyKind::Specific {
        keep_values_in(table, columns::DIAGNOSIS_TYPE, &config.specific.diagnosis_types)?;
    } else {
        let wanted = config.general.diagnosis_type.trim();
        keep_where(table, columns::DIAGNOSIS_TYPE, |value| value == Some(wanted))?;
    }
    info!(before, after = table.height(), "diagnosis type gate");
    Ok(())
}

fn select_columns(table: &RecordTable, wanted: &[String]) -> Result<RecordTable> {
    let missing: Vec<String> = wanted
        .iter()
        .filter(|name| !table.has_column(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(FilterError::MissingColumns { columns: missing });
    }
    Ok(table.select(wanted)?)
}

/// Re-checks the invariants every output row must satisfy.
fn final_quality_pass(
    table: &mut RecordTable,
    config: &ProcessorConfig,
    kind: StrategyKind,
    rules: &NormalizationRules,
) -> Result<Vec<StageCount>> {
    let mut stages = Vec::new();
    let mut record = |stage: &'static str, rows: usize| {
        debug!(stage, rows, "final quality pass");
        stages.push(StageCount { stage, rows });
    };

    if table.has_column(columns::AGE) {
        let mask: Vec<bool> = table
            .f64_values(columns::AGE)?
            .into_iter()
            .map(|age| rules.age_in_range(age))
            .collect();
        table.filter_rows(&mask)?;
        record("age range", table.height());
    }

    if kind == StrategyKind::GenericCodeLab {
        let allowed = config.item_codes.all();
        if !allowed.is_empty() && table.has_column(columns::ITEM_CODE) {
            keep_values_in(table, columns::ITEM_CODE, &allowed)?;
            record("item codes", table.height());
        }
        if !config.lab_values.is_empty() && table.has_column(columns::LAB_VALUE) {
            keep_values_in(table, columns::LAB_VALUE, &config.lab_values)?;
            record("lab values", table.height());
        }
        if table.has_column(columns::DIAGNOSIS_TYPE) {
            let wanted = config.general.diagnosis_type.trim();
            keep_where(table, columns::DIAGNOSIS_TYPE, |value| value == Some(wanted))?;
            record("diagnosis type", table.height());
        }
    }

    if table.has_column(columns::VISIT_DATE) {
        let mask: Vec<bool> = table.visit_dates()?.iter().map(Option::is_some).collect();
        table.filter_rows(&mask)?;
        record("visit date", table.height());
    }

    Ok(stages)
}

fn missing_values(table: &RecordTable) -> Result<BTreeMap<&'static str, usize>> {
    let mut counts = BTreeMap::new();
    for column in columns::CRITICAL {
        if table.has_column(column) {
            let nulls = table
                .string_values(column)?
                .iter()
                .filter(|value| value.is_none())
                .count();
            counts.insert(column, nulls);
        }
    }
    Ok(counts)
}
