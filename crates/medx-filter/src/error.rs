//! Error types for filtering.

use thiserror::Error;

/// Fatal filtering errors.
///
/// Data problems confined to rows or to an optional sub-filter are not
/// errors; they drop rows or skip the sub-filter with a warning.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A column a filter step depends on is absent.
    #[error("column '{column}' not found in the extract")]
    MissingColumn { column: String },

    /// Configured output columns absent from the extract.
    #[error("configured columns not found in the extract: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for FilterError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for filtering operations.
pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_display() {
        let err = FilterError::MissingColumns {
            columns: vec!["Edad_Reg".to_string(), "Genero".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "configured columns not found in the extract: Edad_Reg, Genero"
        );
    }
}
