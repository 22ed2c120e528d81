//! Data model for clinical visit extracts.
//!
//! - [`RecordTable`]: a Polars `DataFrame` of visit records with typed accessors
//! - [`columns`]: names of the source and derived columns
//! - [`GroupKey`] / [`Granularity`]: patient or patient+date grouping
//! - [`GroupingMode`]: `todos` / `cualquiera` coverage modes
//! - [`PerimeterClass`], [`PressureType`], [`PressureClass`]: classifier outputs

pub mod columns;
mod classification;
mod group;
mod table;

pub use classification::{PerimeterClass, PressureClass, PressureType};
pub use group::{Granularity, GroupKey, GroupingMode};
pub use table::RecordTable;
