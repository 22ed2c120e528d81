//! CSV file reading into record tables.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info, warn};

use medx_model::RecordTable;

use crate::error::{IngestError, Result};

use super::header::{normalize_header, parse_csv_line};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

fn open_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Check file existence and size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Rejects UTF-16 input; UTF-8 with or without BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Reads and checks the header line.
pub fn read_csv_header(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    let bytes = reader
        .read_line(&mut line)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    if bytes == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let columns = parse_csv_line(line.trim_end_matches(['\r', '\n']));
    if columns.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }

    let mut seen = BTreeSet::new();
    for column in &columns {
        if !column.is_empty() && !seen.insert(column.as_str()) {
            return Err(IngestError::DuplicateColumn {
                column: column.clone(),
                path: path.to_path_buf(),
            });
        }
    }

    Ok(columns)
}

/// Validate table shape after loading.
///
/// Checks for:
/// - Empty column names
/// - Warns about tables without rows
/// - Warns about wide tables (>500 columns)
pub fn validate_table_shape(df: &DataFrame, path: &Path) -> Result<()> {
    if df.height() == 0 {
        warn!(path = %path.display(), "extract has a header but no records");
    }

    if df.width() > 500 {
        warn!(
            path = %path.display(),
            columns = df.width(),
            "table has more than 500 columns"
        );
    }

    for name in df.get_column_names() {
        if name.trim().is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

/// Loads a visit extract with every column as text.
///
/// Reading everything as text keeps item codes such as `99209.40` intact;
/// typing is left to the normalizer.
pub fn read_record_table(path: &Path) -> Result<RecordTable> {
    check_file_size(path)?;
    validate_encoding(path)?;
    let header = read_csv_header(path)?;
    debug!(path = %path.display(), columns = header.len(), "header read");

    let parse_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;

    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    for name in names {
        let normalized = normalize_header(&name);
        if normalized != name {
            df.rename(&name, normalized.into())?;
        }
    }

    validate_table_shape(&df, path)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "extract loaded"
    );
    Ok(RecordTable::new(df))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_header_with_bom() {
        let file = create_temp_csv("\u{feff}A, B ,C\r\n1,2,3\r\n");
        assert_eq!(read_csv_header(file.path()).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_read_csv_header_empty_file() {
        let file = create_temp_csv("");
        assert!(matches!(
            read_csv_header(file.path()),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn test_read_csv_header_duplicate() {
        let file = create_temp_csv("A,B,A\n1,2,3\n");
        assert!(matches!(
            read_csv_header(file.path()),
            Err(IngestError::DuplicateColumn { ref column, .. }) if column == "A"
        ));
    }

    #[test]
    fn test_check_file_size_limit() {
        let file = create_temp_csv("A\n1\n");
        assert!(check_file_size_with_limit(file.path(), 1).is_err());
        assert!(check_file_size_with_limit(file.path(), 1024).is_ok());
    }

    #[test]
    fn test_validate_encoding_rejects_utf16() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'A', 0x00]).unwrap();
        assert!(matches!(
            validate_encoding(file.path()),
            Err(IngestError::UnsupportedEncoding { encoding: "UTF-16 LE", .. })
        ));
    }

    #[test]
    fn test_read_record_table_keeps_text() {
        let file = create_temp_csv("Codigo_Item,Edad_Reg\n99209.40,045\nZ019,\n");
        let table = read_record_table(file.path()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.string_values("Codigo_Item").unwrap(),
            vec![Some("99209.40".to_string()), Some("Z019".to_string())]
        );
        assert_eq!(
            table.string_values("Edad_Reg").unwrap(),
            vec![Some("045".to_string()), None]
        );
    }

    #[test]
    fn test_read_record_table_header_only() {
        let file = create_temp_csv("Codigo_Item,Edad_Reg\n");
        let table = read_record_table(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), vec!["Codigo_Item", "Edad_Reg"]);
    }
}
