//! Value-to-category classifiers that add derived columns.

mod perimeter;
mod pressure;

pub use perimeter::{add_perimeter_classification, classify_perimeter};
pub use pressure::{PressureOutcome, classify_blood_pressure, classify_reading};
