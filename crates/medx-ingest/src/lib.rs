//! Visit extract ingestion.
//!
//! Loads a CSV export of the visit spreadsheet into a [`medx_model::RecordTable`]
//! with every column kept as text. The file is checked before parsing
//! (existence, size, encoding, header) and the table after (rows, column names).
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use medx_ingest::read_record_table;
//!
//! let table = read_record_table(Path::new("files/atenciones.csv"))?;
//! println!("{} records", table.height());
//! ```

mod csv;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, normalize_header,
    parse_csv_line, read_csv_header, read_record_table, validate_encoding, validate_table_shape,
};
