//! Column names of the visit record table.

/// Patient document number, the patient identifier.
pub const PATIENT_ID: &str = "Numero_Documento_Paciente";
pub const GENDER: &str = "Genero";
pub const AGE: &str = "Edad_Reg";
pub const ITEM_CODE: &str = "Codigo_Item";
pub const DIAGNOSIS_TYPE: &str = "Tipo_Diagnostico";
pub const LAB_VALUE: &str = "Valor_Lab";
pub const VISIT_DATE: &str = "Fecha_Atencion";
pub const ABDOMINAL_PERIMETER: &str = "Perimetro_Abdominal";
/// Per-visit reading sequence number, used to order blood-pressure readings.
pub const CORRELATION_ID: &str = "Id_Correlativo";

/// Columns whose completeness is reported after the final quality pass.
pub const CRITICAL: [&str; 6] = [
    PATIENT_ID,
    GENDER,
    AGE,
    ITEM_CODE,
    DIAGNOSIS_TYPE,
    VISIT_DATE,
];

// Derived columns
pub const PERIMETER_CLASS: &str = "Clasificacion_Perimetro";
pub const PRESSURE_TYPE: &str = "Tipo_Presion";
pub const PRESSURE_CLASS: &str = "Clasificacion_Presion";
pub const PRESSURE_GROUP_TOTAL: &str = "valor_presion_total";
