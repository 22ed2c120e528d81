//! Abdominal perimeter filter.

use medx_config::PerimeterFilterConfig;
use medx_model::{Granularity, GroupingMode, RecordTable, columns};

use crate::classify::add_perimeter_classification;
use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;
use crate::evaluator::{qualifying_groups, resolve_mode, select_rows};
use crate::rows::keep_values_in;

pub(super) fn apply(
    mut table: RecordTable,
    config: &PerimeterFilterConfig,
    diagnostics: &mut StrategyDiagnostics,
) -> Result<RecordTable> {
    let mode = resolve_mode(&config.mode, "filtro_perimetro.modo_filtrado", diagnostics);

    keep_values_in(&mut table, columns::ITEM_CODE, &config.required_codes)?;
    diagnostics.record_stage("required codes", table.height());

    // Visit-level completeness comes first, the mode then applies per patient.
    if config.group_by_date {
        let visits = qualifying_groups(
            &table,
            Granularity::PatientDate,
            &config.required_codes,
            GroupingMode::All,
        )?;
        select_rows(&mut table, Granularity::PatientDate, &visits)?;
        diagnostics.record_stage("complete visits", table.height());
    }

    let patients = qualifying_groups(&table, Granularity::Patient, &config.required_codes, mode)?;
    diagnostics.record_groups(patients.len());
    select_rows(&mut table, Granularity::Patient, &patients)?;
    diagnostics.record_stage("coverage", table.height());

    add_perimeter_classification(&mut table, &config.thresholds)?;
    let classes = table.value_counts(columns::PERIMETER_CLASS)?;
    diagnostics.record_classification(columns::PERIMETER_CLASS, classes);

    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use medx_config::{CodeList, StrategyKind};

    use super::*;

    fn visits() -> RecordTable {
        RecordTable::from_text_columns(&[
            (columns::PATIENT_ID, vec!["1", "1", "2", "2", "3", "3"]),
            (columns::GENDER, vec!["F", "F", "M", "M", "F", "F"]),
            (columns::ITEM_CODE, vec!["Z019", "99209.04", "Z019", "99209.04", "Z019", "E669"]),
            (
                columns::VISIT_DATE,
                vec![
                    "2024-01-10",
                    "2024-01-10",
                    "2024-02-01",
                    "2024-02-02",
                    "2024-03-01",
                    "2024-03-01",
                ],
            ),
            (columns::ABDOMINAL_PERIMETER, vec!["90", "90", "100", "100", "80", "80"]),
        ])
        .unwrap()
    }

    fn config() -> PerimeterFilterConfig {
        PerimeterFilterConfig {
            active: true,
            ..PerimeterFilterConfig::default()
        }
    }

    fn run(config: &PerimeterFilterConfig) -> (RecordTable, StrategyDiagnostics) {
        let mut diagnostics = StrategyDiagnostics::new(StrategyKind::Perimeter);
        let table = apply(visits(), config, &mut diagnostics).unwrap();
        (table, diagnostics)
    }

    #[test]
    fn test_patient_coverage_and_classification() {
        let (table, diagnostics) = run(&config());
        assert_eq!(
            table.patient_ids().unwrap(),
            vec![Some(1), Some(1), Some(2), Some(2)]
        );
        assert_eq!(diagnostics.qualifying_groups, Some(2));
        assert_eq!(
            diagnostics.classifications[columns::PERIMETER_CLASS],
            BTreeMap::from([("ANORMAL".to_string(), 2), ("NORMAL".to_string(), 2)])
        );
    }

    #[test]
    fn test_date_grouping_requires_complete_visit() {
        let mut config = config();
        config.group_by_date = true;
        let (table, _) = run(&config);
        // Patient 2 split its codes over two days.
        assert_eq!(table.patient_ids().unwrap(), vec![Some(1), Some(1)]);
    }

    #[test]
    fn test_any_mode_keeps_partial_patients() {
        let mut config = config();
        config.mode = "cualquiera".to_string();
        let (table, diagnostics) = run(&config);
        assert_eq!(table.height(), 5);
        assert_eq!(diagnostics.qualifying_groups, Some(3));
        assert!(diagnostics.warnings.is_empty());
    }

    #[test]
    fn test_unknown_mode_warns_and_uses_todos() {
        let mut config = config();
        config.mode = "algunos".to_string();
        config.required_codes = CodeList::new(["Z019", "99209.04"]);
        let (table, diagnostics) = run(&config);
        assert_eq!(table.height(), 4);
        assert_eq!(diagnostics.warnings.len(), 1);
    }
}
