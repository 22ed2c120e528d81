//! Clinical assessment filter.

use medx_config::ClinicalAssessmentConfig;
use medx_model::{Granularity, GroupingMode, RecordTable, columns};

use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;
use crate::evaluator::{qualifying_groups, resolve_mode, select_rows};
use crate::rows::{keep_values_in, require_column};

pub(super) fn apply(
    mut table: RecordTable,
    config: &ClinicalAssessmentConfig,
    diagnostics: &mut StrategyDiagnostics,
) -> Result<RecordTable> {
    let mode = resolve_mode(
        &config.mode,
        "filtro_valoracion_clinica.modo_filtrado",
        diagnostics,
    );
    let granularity = Granularity::from_date_switch(config.group_by_date);

    keep_values_in(&mut table, columns::ITEM_CODE, &config.required_codes)?;
    diagnostics.record_stage("required codes", table.height());

    // Only rows of the lab code carry a lab value worth checking.
    if !config.lab_values.is_empty() {
        require_column(&table, columns::LAB_VALUE)?;
        let codes = table.string_values(columns::ITEM_CODE)?;
        let labs = table.string_values(columns::LAB_VALUE)?;
        let mask: Vec<bool> = codes
            .iter()
            .zip(&labs)
            .map(|(code, lab)| {
                code.as_deref() != Some(config.lab_code.as_str())
                    || lab.as_deref().is_some_and(|lab| config.lab_values.contains(lab))
            })
            .collect();
        table.filter_rows(&mask)?;
        diagnostics.record_stage("lab values", table.height());
    }

    if granularity.is_by_date() {
        let visits = qualifying_groups(
            &table,
            Granularity::PatientDate,
            &config.required_codes,
            GroupingMode::All,
        )?;
        select_rows(&mut table, Granularity::PatientDate, &visits)?;
        diagnostics.record_stage("complete visits", table.height());
    }

    let groups = qualifying_groups(&table, granularity, &config.required_codes, mode)?;
    diagnostics.record_groups(groups.len());
    select_rows(&mut table, granularity, &groups)?;
    diagnostics.record_stage("coverage", table.height());

    Ok(table)
}

#[cfg(test)]
mod tests {
    use medx_config::{CodeList, StrategyKind};

    use super::*;

    fn visits() -> RecordTable {
        RecordTable::from_text_columns(&[
            (columns::PATIENT_ID, vec!["1", "1", "2", "2", "3", "3", "3"]),
            (
                columns::ITEM_CODE,
                vec!["Z019", "Z006", "Z019", "Z006", "Z019", "Z006", "E669"],
            ),
            (columns::LAB_VALUE, vec!["", "N", "A", "X", "", "N", "X"]),
            (
                columns::VISIT_DATE,
                vec![
                    "2024-01-10",
                    "2024-01-10",
                    "2024-02-01",
                    "2024-02-01",
                    "2024-03-01",
                    "2024-03-02",
                    "2024-03-02",
                ],
            ),
        ])
        .unwrap()
    }

    fn config() -> ClinicalAssessmentConfig {
        ClinicalAssessmentConfig {
            active: true,
            ..ClinicalAssessmentConfig::default()
        }
    }

    fn run(config: &ClinicalAssessmentConfig) -> RecordTable {
        let mut diagnostics = StrategyDiagnostics::new(StrategyKind::ClinicalAssessment);
        apply(visits(), config, &mut diagnostics).unwrap()
    }

    #[test]
    fn test_required_codes_per_patient() {
        let table = run(&config());
        assert_eq!(
            table.patient_ids().unwrap(),
            vec![Some(1), Some(1), Some(2), Some(2), Some(3), Some(3)]
        );
    }

    #[test]
    fn test_lab_values_only_restrict_lab_code_rows() {
        let mut config = config();
        config.lab_values = CodeList::new(["N", "A"]);
        let table = run(&config);
        // Patient 2 loses its Z006 row ("X") but keeps Z019 ("A" is not checked).
        assert_eq!(
            table.patient_ids().unwrap(),
            vec![Some(1), Some(1), Some(3), Some(3)]
        );
    }

    #[test]
    fn test_date_grouping() {
        let mut config = config();
        config.group_by_date = true;
        let table = run(&config);
        assert_eq!(
            table.patient_ids().unwrap(),
            vec![Some(1), Some(1), Some(2), Some(2)]
        );
    }

    #[test]
    fn test_any_mode_with_date_grouping_still_needs_complete_visits() {
        let mut config = config();
        config.group_by_date = true;
        config.mode = "cualquiera".to_string();
        let table = run(&config);
        assert_eq!(table.height(), 4);
    }
}
