//! Row-level allow-list filters.

use medx_config::CodeList;
use medx_model::RecordTable;

use crate::error::{FilterError, Result};

pub(crate) fn require_column(table: &RecordTable, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(FilterError::MissingColumn {
            column: column.to_string(),
        })
    }
}

/// Keeps rows whose `column` value satisfies `keep`; nulls are passed as `None`.
pub(crate) fn keep_where<F>(table: &mut RecordTable, column: &str, keep: F) -> Result<()>
where
    F: Fn(Option<&str>) -> bool,
{
    require_column(table, column)?;
    let mask: Vec<bool> = table
        .string_values(column)?
        .iter()
        .map(|value| keep(value.as_deref()))
        .collect();
    table.filter_rows(&mask)?;
    Ok(())
}

/// Keeps rows whose `column` value is in `allowed`.
pub(crate) fn keep_values_in(
    table: &mut RecordTable,
    column: &str,
    allowed: &CodeList,
) -> Result<()> {
    keep_where(table, column, |value| value.is_some_and(|v| allowed.contains(v)))
}
