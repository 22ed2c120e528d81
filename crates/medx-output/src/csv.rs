//! CSV writing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, SerWriter};
use tempfile::NamedTempFile;
use tracing::info;

use medx_model::RecordTable;

use crate::error::{OutputError, Result};

/// Date format of `Date` columns in the output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Summary of a completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Writes `table` to `path` as UTF-8 CSV with a header row.
///
/// The data goes to a temporary file next to `path` and replaces it only once
/// complete, so a failed run leaves any previous output untouched.
pub fn write_csv(table: &RecordTable, path: &Path) -> Result<WrittenFile> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| OutputError::Io {
        operation: "create directory",
        path: parent.clone(),
        source,
    })?;

    let mut temp = NamedTempFile::new_in(&parent).map_err(|source| OutputError::Io {
        operation: "create temporary file in",
        path: parent.clone(),
        source,
    })?;

    let mut frame = table.frame().clone();
    CsvWriter::new(temp.as_file_mut())
        .include_header(true)
        .with_date_format(Some(DATE_FORMAT.into()))
        .finish(&mut frame)
        .map_err(|err| OutputError::Csv {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let temp_path = temp.path().to_path_buf();
    temp.as_file_mut()
        .flush()
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| OutputError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;

    temp.persist(path)
        .map_err(|err| OutputError::AtomicWriteFailed {
            temp_path,
            target_path: path.to_path_buf(),
            source: err.error,
        })?;

    let written = WrittenFile {
        path: path.to_path_buf(),
        rows: table.height(),
        columns: frame.width(),
    };
    info!(path = %path.display(), rows = written.rows, "output written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

    use super::*;

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/result.csv");
        let table = RecordTable::from_text_columns(&[("Codigo_Item", vec!["Z019"])]).unwrap();

        let written = write_csv(&table, &path).unwrap();

        assert_eq!(written.rows, 1);
        assert_eq!(written.columns, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Codigo_Item\nZ019\n");
    }

    #[test]
    fn test_failed_write_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        fs::write(&path, "previous\n").unwrap();

        let inner = Series::new("".into(), &[1i64, 2]);
        let nested = Series::new("nested".into(), &[inner]).into_column();
        let table = RecordTable::new(DataFrame::new(vec![nested]).unwrap());

        let err = write_csv(&table, &path).unwrap_err();

        assert!(matches!(err, OutputError::Csv { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous\n");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
