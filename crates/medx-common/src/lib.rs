//! Shared utilities for medx crates.
//!
//! - [`any_to_string`], [`any_to_f64`], [`any_to_i64`]: Polars `AnyValue` conversions
//! - [`parse_f64`], [`parse_integer`]: lenient numeric parsing of text cells
//! - [`parse_visit_date`], [`any_to_date`]: calendar date parsing

mod dates;
mod values;

pub use dates::{any_to_date, date_to_epoch_days, epoch_days_to_date, parse_visit_date};
pub use values::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, parse_f64, parse_i64, parse_integer,
};
