//! Output writing for filtered visit extracts.

mod csv;
mod error;

pub use csv::{DATE_FORMAT, WrittenFile, write_csv};
pub use error::{OutputError, Result};
