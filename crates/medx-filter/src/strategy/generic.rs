//! Default filter driven by `codigos_item`, `valores_laboratorio` and
//! `filtrado_codigos`.

use medx_model::{Granularity, GroupingMode, RecordTable, columns};

use super::GenericCodeLab;
use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;
use crate::evaluator::{qualifying_groups, resolve_mode, select_rows};
use crate::rows::keep_values_in;

pub(super) fn apply(
    mut table: RecordTable,
    inputs: &GenericCodeLab<'_>,
    diagnostics: &mut StrategyDiagnostics,
) -> Result<RecordTable> {
    let GenericCodeLab {
        item_codes,
        lab_values,
        mode,
    } = *inputs;

    if item_codes.is_empty() && lab_values.is_empty() {
        diagnostics.record_stage("pass through", table.height());
        return Ok(table);
    }

    let allowed = item_codes.all();
    if !allowed.is_empty() {
        keep_values_in(&mut table, columns::ITEM_CODE, &allowed)?;
        diagnostics.record_stage("item codes", table.height());
    }
    if !lab_values.is_empty() {
        keep_values_in(&mut table, columns::LAB_VALUE, lab_values)?;
        diagnostics.record_stage("lab values", table.height());
    }

    if !item_codes.required.is_empty() {
        let mode = resolve_mode(mode, "filtrado_codigos.modo", diagnostics);
        let mut patients =
            qualifying_groups(&table, Granularity::Patient, &item_codes.required, mode)?;
        if !item_codes.optional.is_empty() {
            let with_optional = qualifying_groups(
                &table,
                Granularity::Patient,
                &item_codes.optional,
                GroupingMode::Any,
            )?;
            patients.retain(|patient| with_optional.contains(patient));
        }
        diagnostics.record_groups(patients.len());
        select_rows(&mut table, Granularity::Patient, &patients)?;
        diagnostics.record_stage("coverage", table.height());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use medx_config::{CodeList, ItemCodes, StrategyKind};

    use super::*;

    fn visits() -> RecordTable {
        RecordTable::from_text_columns(&[
            (columns::PATIENT_ID, vec!["1", "1", "2", "2", "2", "3", "3"]),
            (columns::ITEM_CODE, vec!["A", "B", "A", "B", "C", "A", "X"]),
            (columns::LAB_VALUE, vec!["N", "N", "N", "A", "N", "N", "N"]),
        ])
        .unwrap()
    }

    fn run(item_codes: &ItemCodes, lab_values: &CodeList, mode: &str) -> RecordTable {
        let mut diagnostics = StrategyDiagnostics::new(StrategyKind::GenericCodeLab);
        let inputs = GenericCodeLab {
            item_codes,
            lab_values,
            mode,
        };
        apply(visits(), &inputs, &mut diagnostics).unwrap()
    }

    #[test]
    fn test_required_and_optional_codes() {
        let item_codes = ItemCodes {
            required: CodeList::new(["A", "B"]),
            optional: CodeList::new(["C", "D"]),
        };
        let table = run(&item_codes, &CodeList::default(), "todos");
        // {A,B} lacks an optional code; {A,B,C} qualifies.
        assert_eq!(table.patient_ids().unwrap(), vec![Some(2), Some(2), Some(2)]);
    }

    #[test]
    fn test_any_mode() {
        let item_codes = ItemCodes {
            required: CodeList::new(["A", "B"]),
            optional: CodeList::default(),
        };
        let table = run(&item_codes, &CodeList::default(), "cualquiera");
        // Everyone has A; the X row is outside the allow-list.
        assert_eq!(table.height(), 6);
    }

    #[test]
    fn test_lab_allow_list_runs_before_coverage() {
        let item_codes = ItemCodes {
            required: CodeList::new(["A", "B"]),
            optional: CodeList::default(),
        };
        let table = run(&item_codes, &CodeList::new(["N"]), "todos");
        // Patient 2's B row carries "A" and is dropped before the coverage test.
        assert_eq!(table.patient_ids().unwrap(), vec![Some(1), Some(1)]);
    }

    #[test]
    fn test_optional_codes_only_act_as_allow_list() {
        let item_codes = ItemCodes {
            required: CodeList::default(),
            optional: CodeList::new(["A"]),
        };
        let table = run(&item_codes, &CodeList::default(), "todos");
        assert_eq!(table.patient_ids().unwrap(), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_nothing_configured_passes_through() {
        let table = run(&ItemCodes::default(), &CodeList::default(), "todos");
        assert_eq!(table.height(), 7);
    }
}
