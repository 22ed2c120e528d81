//! Blood pressure classification.
//!
//! Readings of one visit share a patient and a visit date. The reading with
//! the lowest `Id_Correlativo` is systolic and every other reading diastolic.
//! A visit is abnormal when any of its readings is.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use medx_config::CodeList;
use medx_model::{Granularity, GroupKey, PressureClass, PressureType, RecordTable, columns};

use crate::error::Result;

/// Result of the blood pressure sub-filter.
#[derive(Debug)]
pub enum PressureOutcome {
    /// Classification columns added and rows restricted to the allowed types.
    Classified(RecordTable),
    /// The sub-filter could not run; the input table stands.
    Skipped { reason: String },
}

/// Classifies one reading; non-numeric values are normal.
pub fn classify_reading(kind: PressureType, value: Option<f64>) -> PressureClass {
    match value {
        Some(value) if value >= kind.abnormal_threshold() => PressureClass::Anormal,
        _ => PressureClass::Normal,
    }
}

/// Adds `Tipo_Presion`, `Clasificacion_Presion` and `valor_presion_total`,
/// then keeps rows whose type is in `allowed_types`.
pub fn classify_blood_pressure(
    table: &RecordTable,
    allowed_types: &CodeList,
) -> Result<PressureOutcome> {
    for column in [columns::VISIT_DATE, columns::CORRELATION_ID, columns::LAB_VALUE] {
        if !table.has_column(column) {
            return Ok(PressureOutcome::Skipped {
                reason: format!("column '{column}' not found"),
            });
        }
    }

    let keys = table.group_keys(Granularity::PatientDate)?;
    let correlation_ids = table.i64_values(columns::CORRELATION_ID)?;

    let mut first_reading: BTreeMap<GroupKey, Option<i64>> = BTreeMap::new();
    for (key, id) in keys.iter().zip(&correlation_ids) {
        let Some(key) = key else { continue };
        let entry = first_reading.entry(*key).or_insert(None);
        if let Some(id) = id {
            *entry = Some(entry.map_or(*id, |current| current.min(*id)));
        }
    }
    let unnumbered = first_reading.values().filter(|id| id.is_none()).count();
    if unnumbered > 0 {
        return Ok(PressureOutcome::Skipped {
            reason: format!(
                "{unnumbered} visit group(s) have no numeric {}",
                columns::CORRELATION_ID
            ),
        });
    }

    let kinds: Vec<Option<PressureType>> = keys
        .iter()
        .zip(&correlation_ids)
        .map(|(key, id)| {
            let key = key.as_ref()?;
            let first = first_reading.get(key).copied().flatten();
            Some(if id.is_some() && *id == first {
                PressureType::Systolic
            } else {
                PressureType::Diastolic
            })
        })
        .collect();

    let values = table.f64_values(columns::LAB_VALUE)?;
    let classes: Vec<Option<PressureClass>> = kinds
        .iter()
        .zip(values)
        .map(|(kind, value)| kind.map(|kind| classify_reading(kind, value)))
        .collect();

    let abnormal_visits: BTreeSet<GroupKey> = keys
        .iter()
        .zip(&classes)
        .filter_map(|(key, class)| match (key, class) {
            (Some(key), Some(PressureClass::Anormal)) => Some(*key),
            _ => None,
        })
        .collect();
    let totals: Vec<Option<String>> = keys
        .iter()
        .map(|key| {
            key.as_ref().map(|key| {
                if abnormal_visits.contains(key) {
                    PressureClass::Anormal.to_string()
                } else {
                    PressureClass::Normal.to_string()
                }
            })
        })
        .collect();
    debug!(
        visits = first_reading.len(),
        abnormal_visits = abnormal_visits.len(),
        "blood pressure visits classified"
    );

    let mut classified = table.clone();
    classified.set_string_column(
        columns::PRESSURE_TYPE,
        kinds
            .iter()
            .map(|kind| kind.map(|kind| kind.code().to_string()))
            .collect(),
    )?;
    classified.set_string_column(
        columns::PRESSURE_CLASS,
        classes
            .iter()
            .map(|class| class.map(|class| class.to_string()))
            .collect(),
    )?;
    classified.set_string_column(columns::PRESSURE_GROUP_TOTAL, totals)?;

    let mut allowed = BTreeSet::new();
    for code in allowed_types.iter() {
        match PressureType::from_code(code) {
            Some(kind) => {
                allowed.insert(kind);
            }
            None => warn!(code, "ignoring unknown blood pressure type"),
        }
    }
    let mask: Vec<bool> = kinds
        .iter()
        .map(|kind| kind.is_some_and(|kind| allowed.contains(&kind)))
        .collect();
    classified.filter_rows(&mask)?;

    Ok(PressureOutcome::Classified(classified))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(ids: Vec<&str>, values: Vec<&str>, dates: Vec<&str>) -> RecordTable {
        let patients = vec!["7"; ids.len()];
        RecordTable::from_text_columns(&[
            (columns::PATIENT_ID, patients),
            (columns::VISIT_DATE, dates),
            (columns::CORRELATION_ID, ids),
            (columns::LAB_VALUE, values),
        ])
        .unwrap()
    }

    fn both() -> CodeList {
        CodeList::new(["S", "D"])
    }

    fn classified(outcome: PressureOutcome) -> RecordTable {
        match outcome {
            PressureOutcome::Classified(table) => table,
            PressureOutcome::Skipped { reason } => panic!("skipped: {reason}"),
        }
    }

    #[test]
    fn test_classify_reading_thresholds() {
        assert_eq!(classify_reading(PressureType::Systolic, Some(139.0)), PressureClass::Normal);
        assert_eq!(classify_reading(PressureType::Systolic, Some(140.0)), PressureClass::Anormal);
        assert_eq!(classify_reading(PressureType::Diastolic, Some(89.9)), PressureClass::Normal);
        assert_eq!(classify_reading(PressureType::Diastolic, Some(90.0)), PressureClass::Anormal);
        assert_eq!(classify_reading(PressureType::Systolic, None), PressureClass::Normal);
    }

    #[test]
    fn test_first_reading_is_systolic() {
        let table = readings(
            vec!["12", "11", "21"],
            vec!["85", "130", "95"],
            vec!["2024-01-01", "2024-01-01", "2024-02-01"],
        );
        let table = classified(classify_blood_pressure(&table, &both()).unwrap());
        assert_eq!(
            table.string_values(columns::PRESSURE_TYPE).unwrap(),
            vec![Some("D".to_string()), Some("S".to_string()), Some("S".to_string())]
        );
        assert_eq!(
            table.string_values(columns::PRESSURE_CLASS).unwrap(),
            vec![
                Some("NORMAL".to_string()),
                Some("NORMAL".to_string()),
                Some("NORMAL".to_string())
            ]
        );
    }

    #[test]
    fn test_visit_total_is_abnormal_when_any_reading_is() {
        let table = readings(
            vec!["1", "2", "3", "4"],
            vec!["120", "95", "120", "80"],
            vec!["2024-01-01", "2024-01-01", "2024-01-02", "2024-01-02"],
        );
        let table = classified(classify_blood_pressure(&table, &both()).unwrap());
        assert_eq!(
            table.string_values(columns::PRESSURE_GROUP_TOTAL).unwrap(),
            vec![
                Some("ANORMAL".to_string()),
                Some("ANORMAL".to_string()),
                Some("NORMAL".to_string()),
                Some("NORMAL".to_string())
            ]
        );
    }

    #[test]
    fn test_allowed_types_restrict_rows() {
        let table = readings(
            vec!["1", "2"],
            vec!["150", "80"],
            vec!["2024-01-01", "2024-01-01"],
        );
        let outcome = classify_blood_pressure(&table, &CodeList::new(["S"])).unwrap();
        let table = classified(outcome);
        assert_eq!(table.height(), 1);
        assert_eq!(
            table.string_values(columns::PRESSURE_CLASS).unwrap(),
            vec![Some("ANORMAL".to_string())]
        );
    }

    #[test]
    fn test_missing_correlation_column_skips() {
        let table = RecordTable::from_text_columns(&[
            (columns::PATIENT_ID, vec!["1"]),
            (columns::VISIT_DATE, vec!["2024-01-01"]),
            (columns::LAB_VALUE, vec!["120"]),
        ])
        .unwrap();
        let outcome = classify_blood_pressure(&table, &both()).unwrap();
        assert!(matches!(outcome, PressureOutcome::Skipped { .. }));
    }

    #[test]
    fn test_group_without_numeric_id_skips() {
        let table = readings(
            vec!["1", "x", ""],
            vec!["120", "80", "85"],
            vec!["2024-01-01", "2024-01-02", "2024-01-02"],
        );
        let outcome = classify_blood_pressure(&table, &both()).unwrap();
        match outcome {
            PressureOutcome::Skipped { reason } => assert!(reason.starts_with("1 visit group")),
            PressureOutcome::Classified(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_tied_first_readings_are_both_systolic() {
        let table = readings(
            vec!["5", "5", "6"],
            vec!["120", "125", "70"],
            vec!["2024-01-01", "2024-01-01", "2024-01-01"],
        );
        let table = classified(classify_blood_pressure(&table, &both()).unwrap());
        assert_eq!(
            table.value_counts(columns::PRESSURE_TYPE).unwrap(),
            BTreeMap::from([("D".to_string(), 1), ("S".to_string(), 2)])
        );
    }
}
