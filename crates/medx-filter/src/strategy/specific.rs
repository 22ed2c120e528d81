//! Single item code extract with optional date window and blood pressure
//! classification.

use medx_common::parse_visit_date;
use medx_config::{DateRangeConfig, SpecificFilterConfig};
use medx_model::{RecordTable, columns};

use crate::classify::{PressureOutcome, classify_blood_pressure};
use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;
use crate::rows::{keep_values_in, keep_where};

pub(super) fn apply(
    mut table: RecordTable,
    config: &SpecificFilterConfig,
    diagnostics: &mut StrategyDiagnostics,
) -> Result<RecordTable> {
    // The diagnosis type column may have been projected away after the gate.
    if table.has_column(columns::DIAGNOSIS_TYPE) {
        keep_values_in(&mut table, columns::DIAGNOSIS_TYPE, &config.diagnosis_types)?;
        diagnostics.record_stage("diagnosis type", table.height());
    }

    let code = config.item_code.as_str();
    keep_where(&mut table, columns::ITEM_CODE, |value| value == Some(code))?;
    diagnostics.record_stage("item code", table.height());

    if !config.lab_values.is_empty() {
        keep_values_in(&mut table, columns::LAB_VALUE, &config.lab_values)?;
        diagnostics.record_stage("lab values", table.height());
    }

    if config.date_range.active {
        apply_date_range(&mut table, &config.date_range, diagnostics)?;
    }

    if config.blood_pressure.active {
        match classify_blood_pressure(&table, &config.blood_pressure.allowed_types)? {
            PressureOutcome::Classified(classified) => {
                table = classified;
                diagnostics.add_column(columns::PRESSURE_TYPE);
                let classes = table.value_counts(columns::PRESSURE_CLASS)?;
                diagnostics.record_classification(columns::PRESSURE_CLASS, classes);
                let totals = table.value_counts(columns::PRESSURE_GROUP_TOTAL)?;
                diagnostics.record_classification(columns::PRESSURE_GROUP_TOTAL, totals);
                diagnostics.record_stage("blood pressure", table.height());
            }
            PressureOutcome::Skipped { reason } => {
                diagnostics.warn(format!("clasificacion_presion skipped: {reason}"));
            }
        }
    }

    Ok(table)
}

fn apply_date_range(
    table: &mut RecordTable,
    range: &DateRangeConfig,
    diagnostics: &mut StrategyDiagnostics,
) -> Result<()> {
    let start = range.start.as_deref().and_then(parse_visit_date);
    let end = range.end.as_deref().and_then(parse_visit_date);
    let (Some(start), Some(end)) = (start, end) else {
        diagnostics.warn(format!(
            "rango_fechas skipped: bounds {:?} to {:?} are missing or not dates",
            range.start.as_deref().unwrap_or(""),
            range.end.as_deref().unwrap_or("")
        ));
        return Ok(());
    };
    if !table.has_column(columns::VISIT_DATE) {
        diagnostics.warn(format!(
            "rango_fechas skipped: column '{}' not found",
            columns::VISIT_DATE
        ));
        return Ok(());
    }
    if start > end {
        diagnostics.warn(format!(
            "rango_fechas starts after it ends ({start} > {end}); no rows can match"
        ));
    }

    let mask: Vec<bool> = table
        .visit_dates()?
        .iter()
        .map(|date| date.is_some_and(|date| date >= start && date <= end))
        .collect();
    table.filter_rows(&mask)?;
    diagnostics.record_stage("date range", table.height());
    Ok(())
}
