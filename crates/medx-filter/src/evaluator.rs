//! Per-group item code coverage.
//!
//! Every coverage question the strategies ask reduces to the same shape: group
//! the rows by patient (or patient and visit date), collect the distinct codes
//! of each group, and test that set against a code list. Groups are kept in
//! ordered maps so results never depend on row order.

use std::collections::{BTreeMap, BTreeSet};

use medx_config::CodeList;
use medx_model::{Granularity, GroupKey, GroupingMode, RecordTable, columns};

use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;
use crate::rows::require_column;

/// Distinct item codes observed in one group.
pub type CodeSet = BTreeSet<String>;

/// `required ⊆ code_set`.
pub fn has_all(code_set: &CodeSet, required: &CodeSet) -> bool {
    required.is_subset(code_set)
}

/// `code_set ∩ required ≠ ∅`.
pub fn has_any(code_set: &CodeSet, required: &CodeSet) -> bool {
    !code_set.is_disjoint(required)
}

/// Applies the test selected by `mode`.
pub fn satisfies(code_set: &CodeSet, required: &CodeSet, mode: GroupingMode) -> bool {
    match mode {
        GroupingMode::All => has_all(code_set, required),
        GroupingMode::Any => has_any(code_set, required),
    }
}

/// Codes from `codes` observed in each group, in their configured spelling.
///
/// Every group with at least one row appears in the result, possibly with an
/// empty set. Rows without a patient id belong to no group.
pub fn coverage(
    table: &RecordTable,
    granularity: Granularity,
    codes: &CodeList,
) -> Result<BTreeMap<GroupKey, CodeSet>> {
    require_column(table, columns::ITEM_CODE)?;
    let keys = table.group_keys(granularity)?;
    let item_codes = table.string_values(columns::ITEM_CODE)?;

    let mut groups: BTreeMap<GroupKey, CodeSet> = BTreeMap::new();
    for (key, code) in keys.into_iter().zip(item_codes) {
        let Some(key) = key else { continue };
        let set = groups.entry(key).or_default();
        if let Some(matched) = code.as_deref().and_then(|code| codes.matching(code)) {
            set.insert(matched.to_string());
        }
    }
    Ok(groups)
}

/// Groups whose code set passes `mode` against `codes`.
pub fn qualifying_groups(
    table: &RecordTable,
    granularity: Granularity,
    codes: &CodeList,
    mode: GroupingMode,
) -> Result<BTreeSet<GroupKey>> {
    let required = codes.to_set();
    Ok(coverage(table, granularity, codes)?
        .into_iter()
        .filter(|(_, code_set)| satisfies(code_set, &required, mode))
        .map(|(key, _)| key)
        .collect())
}

/// Keeps the rows whose group key is in `groups`.
pub fn select_rows(
    table: &mut RecordTable,
    granularity: Granularity,
    groups: &BTreeSet<GroupKey>,
) -> Result<()> {
    let mask: Vec<bool> = table
        .group_keys(granularity)?
        .iter()
        .map(|key| key.as_ref().is_some_and(|key| groups.contains(key)))
        .collect();
    table.filter_rows(&mask)?;
    Ok(())
}

/// Patient-level keys of a set of groups.
pub fn patients_of(groups: &BTreeSet<GroupKey>) -> BTreeSet<GroupKey> {
    groups
        .iter()
        .map(|key| GroupKey::patient(key.patient_id))
        .collect()
}

/// Parses a configured mode, falling back to `todos` with a warning.
pub fn resolve_mode(raw: &str, setting: &str, diagnostics: &mut StrategyDiagnostics) -> GroupingMode {
    match GroupingMode::parse(raw) {
        Some(mode) => mode,
        None => {
            diagnostics.warn(format!(
                "{setting} '{raw}' is not recognized; using '{}'",
                GroupingMode::All
            ));
            GroupingMode::All
        }
    }
}
