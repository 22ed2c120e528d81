//! Clinical assessment combined with risk factor codes.
//!
//! A group qualifies when it carries at least one required code and at least
//! one risk factor code. The configured mode is validated but does not take
//! part in qualification.

use std::collections::BTreeSet;

use medx_config::ClinicalRiskConfig;
use medx_model::{Granularity, GroupKey, GroupingMode, RecordTable, columns};

use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;
use crate::evaluator::{coverage, has_any, qualifying_groups, resolve_mode, select_rows};
use crate::rows::require_column;

pub(super) fn apply(
    mut table: RecordTable,
    config: &ClinicalRiskConfig,
    diagnostics: &mut StrategyDiagnostics,
) -> Result<RecordTable> {
    resolve_mode(
        &config.mode,
        "filtro_valoracion_clinica_con_riesgo.modo_filtrado",
        diagnostics,
    );
    require_column(&table, columns::ITEM_CODE)?;

    if !config.lab_values.is_empty() {
        require_column(&table, columns::LAB_VALUE)?;
        let codes = table.string_values(columns::ITEM_CODE)?;
        let labs = table.string_values(columns::LAB_VALUE)?;
        let mask: Vec<bool> = codes
            .iter()
            .zip(&labs)
            .map(|(code, lab)| {
                let is_risk = code
                    .as_deref()
                    .is_some_and(|code| config.risk_codes.contains(code));
                !is_risk || lab.as_deref().is_some_and(|lab| config.lab_values.contains(lab))
            })
            .collect();
        table.filter_rows(&mask)?;
        diagnostics.record_stage("risk lab values", table.height());
    }

    let granularity = Granularity::from_date_switch(config.group_by_date);
    let groups: BTreeSet<GroupKey> = if granularity.is_by_date() {
        let required = config.required_codes.to_set();
        let risk = config.risk_codes.to_set();
        let all_codes = config.required_codes.union(&config.risk_codes);
        coverage(&table, granularity, &all_codes)?
            .into_iter()
            .filter(|(_, code_set)| has_any(code_set, &required) && has_any(code_set, &risk))
            .map(|(key, _)| key)
            .collect()
    } else {
        let with_required =
            qualifying_groups(&table, granularity, &config.required_codes, GroupingMode::Any)?;
        let with_risk =
            qualifying_groups(&table, granularity, &config.risk_codes, GroupingMode::Any)?;
        with_required.intersection(&with_risk).copied().collect()
    };
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
            (columns::PATIENT_ID, vec!["1", "1", "2", "3", "3", "3"]),
            (columns::ITEM_CODE, vec!["Z019", "E669", "E65X", "Z019", "E6691", "99199.22"]),
            (columns::LAB_VALUE, vec!["", "TA", "TA", "", "X", "120"]),
            (
                columns::VISIT_DATE,
                vec![
                    "2024-01-10",
                    "2024-01-10",
                    "2024-02-01",
                    "2024-03-01",
                    "2024-03-05",
                    "2024-03-01",
                ],
            ),
        ])
        .unwrap()
    }

    fn config() -> ClinicalRiskConfig {
        ClinicalRiskConfig {
            active: true,
            ..ClinicalRiskConfig::default()
        }
    }

    fn run(config: &ClinicalRiskConfig) -> (RecordTable, StrategyDiagnostics) {
        let mut diagnostics = StrategyDiagnostics::new(StrategyKind::ClinicalAssessmentWithRisk);
        let table = apply(visits(), config, &mut diagnostics).unwrap();
        (table, diagnostics)
    }

    #[test]
    fn test_risk_only_patient_excluded() {
        let (table, diagnostics) = run(&config());
        let patients = table.patient_ids().unwrap();
        assert!(!patients.contains(&Some(2)));
        assert!(patients.contains(&Some(1)));
        assert_eq!(diagnostics.qualifying_groups, Some(2));
    }

    #[test]
    fn test_all_rows_of_qualifying_patients_are_kept() {
        let (table, _) = run(&config());
        assert_eq!(
            table.string_values(columns::ITEM_CODE).unwrap(),
            vec![
                Some("Z019".to_string()),
                Some("E669".to_string()),
                Some("Z019".to_string()),
                Some("E6691".to_string()),
                Some("99199.22".to_string())
            ]
        );
    }

    #[test]
    fn test_lab_values_restrict_risk_rows_only() {
        let mut config = config();
        config.lab_values = CodeList::new(["TA"]);
        let (table, _) = run(&config);
        // Patient 3 loses its only risk row; the 99199.22 row is not a risk row.
        assert_eq!(table.patient_ids().unwrap(), vec![Some(1), Some(1)]);
    }

    #[test]
    fn test_date_grouping_requires_same_visit() {
        let mut config = config();
        config.group_by_date = true;
        let (table, diagnostics) = run(&config);
        assert_eq!(table.patient_ids().unwrap(), vec![Some(1), Some(1)]);
        assert_eq!(diagnostics.qualifying_groups, Some(1));
    }

    #[test]
    fn test_mode_is_validated_only() {
        let mut config = config();
        config.mode = "cualquiera".to_string();
        let (any_table, _) = run(&config);
        config.mode = "ninguno".to_string();
        let (bad_table, diagnostics) = run(&config);
        assert_eq!(any_table.height(), bad_table.height());
        assert_eq!(diagnostics.warnings.len(), 1);
    }
}
