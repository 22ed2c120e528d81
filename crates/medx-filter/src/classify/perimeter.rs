//! Abdominal perimeter classification.

use medx_config::{PerimeterThresholds, Thresholds};
use medx_model::{PerimeterClass, RecordTable, columns};

use crate::error::Result;

/// Classifies one reading against the gender's thresholds.
///
/// The abnormal rule is evaluated last, so it wins when thresholds overlap.
pub fn classify_perimeter(
    gender: Option<&str>,
    perimeter: Option<f64>,
    thresholds: &PerimeterThresholds,
) -> PerimeterClass {
    let limits: &Thresholds = match gender {
        Some("F") => &thresholds.female,
        Some("M") => &thresholds.male,
        _ => return PerimeterClass::NoClasificado,
    };
    let Some(value) = perimeter else {
        return PerimeterClass::NoClasificado;
    };
    let mut class = PerimeterClass::NoClasificado;
    if value <= limits.normal {
        class = PerimeterClass::Normal;
    }
    if value > limits.abnormal {
        class = PerimeterClass::Anormal;
    }
    class
}

/// Adds the perimeter classification column to every row.
pub fn add_perimeter_classification(
    table: &mut RecordTable,
    thresholds: &PerimeterThresholds,
) -> Result<()> {
    let genders = if table.has_column(columns::GENDER) {
        table.string_values(columns::GENDER)?
    } else {
        vec![None; table.height()]
    };
    let perimeters = if table.has_column(columns::ABDOMINAL_PERIMETER) {
        table.f64_values(columns::ABDOMINAL_PERIMETER)?
    } else {
        vec![None; table.height()]
    };
    let classes: Vec<Option<String>> = genders
        .iter()
        .zip(perimeters)
        .map(|(gender, perimeter)| {
            Some(classify_perimeter(gender.as_deref(), perimeter, thresholds).to_string())
        })
        .collect();
    table.set_string_column(columns::PERIMETER_CLASS, classes)?;
    Ok(())
}
