//! Configuration document types.
//!
//! Keys keep the Spanish names used by the operators' configuration files;
//! every optional block falls back to the documented defaults when absent or
//! partially written.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::codes::{CodeList, CodeValue, code_string};

// =============================================================================
// ROOT
// =============================================================================

/// A fully defaulted processor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessorConfig {
    #[serde(rename = "configuracion")]
    pub general: GeneralSettings,

    /// Columns kept in the output, in order.
    #[serde(rename = "columnas")]
    pub columns: Vec<String>,

    #[serde(rename = "codigos_item", default)]
    pub item_codes: ItemCodes,

    /// Generic lab value allow-list.
    #[serde(rename = "valores_laboratorio", default)]
    pub lab_values: CodeList,

    #[serde(rename = "filtrado_codigos", default)]
    pub code_filtering: CodeFiltering,

    #[serde(rename = "validaciones", default)]
    pub validations: Validations,

    #[serde(rename = "filtro_especifico", default)]
    pub specific: SpecificFilterConfig,

    #[serde(rename = "filtro_perimetro", default)]
    pub perimeter: PerimeterFilterConfig,

    #[serde(rename = "filtro_valoracion_clinica", default)]
    pub clinical_assessment: ClinicalAssessmentConfig,

    #[serde(rename = "filtro_valoracion_clinica_con_riesgo", default)]
    pub clinical_risk: ClinicalRiskConfig,
}

/// The `[configuracion]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Diagnosis type kept when the specific filter is inactive.
    #[serde(rename = "tipo_diagnostico", deserialize_with = "code_string")]
    pub diagnosis_type: String,

    #[serde(rename = "archivo_entrada")]
    pub input_file: Option<PathBuf>,

    #[serde(rename = "archivo_salida")]
    pub output_file: Option<PathBuf>,

    /// Append a timestamp to the output file name.
    #[serde(rename = "generar_nombre_unico")]
    pub unique_output_name: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            diagnosis_type: "D".to_string(),
            input_file: None,
            output_file: None,
            unique_output_name: true,
        }
    }
}

// =============================================================================
// GENERIC CODE / LAB FILTER
// =============================================================================

/// Required and optional item codes of the generic filter.
///
/// Accepts the table form `{ obligatorios = [...], opcionales = [...] }` and
/// the older bare list, which is read as the required codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCodes {
    pub required: CodeList,
    pub optional: CodeList,
}

impl ItemCodes {
    /// Required codes followed by optional codes.
    pub fn all(&self) -> CodeList {
        self.required.union(&self.optional)
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemCodesDocument {
    List(Vec<CodeValue>),
    Table {
        #[serde(rename = "obligatorios", default)]
        required: CodeList,
        #[serde(rename = "opcionales", default)]
        optional: CodeList,
    },
}

impl<'de> Deserialize<'de> for ItemCodes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match ItemCodesDocument::deserialize(deserializer)? {
            ItemCodesDocument::List(values) => Self {
                required: CodeList::from_values(values),
                optional: CodeList::default(),
            },
            ItemCodesDocument::Table { required, optional } => Self { required, optional },
        })
    }
}

/// The `[filtrado_codigos]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodeFiltering {
    #[serde(rename = "modo")]
    pub mode: String,
}

impl Default for CodeFiltering {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
        }
    }
}

const DEFAULT_MODE: &str = "todos";

// =============================================================================
// DATA QUALITY
// =============================================================================

/// The `[validaciones]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Validations {
    #[serde(rename = "edad_minima")]
    pub min_age: i64,

    #[serde(rename = "edad_maxima")]
    pub max_age: i64,

    #[serde(rename = "generos_validos")]
    pub valid_genders: CodeList,
}

impl Default for Validations {
    fn default() -> Self {
        Self {
            min_age: 0,
            max_age: 120,
            valid_genders: CodeList::new(["M", "F"]),
        }
    }
}

// =============================================================================
// SPECIFIC FILTER
// =============================================================================

/// The `[filtro_especifico]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpecificFilterConfig {
    #[serde(rename = "activo")]
    pub active: bool,

    #[serde(rename = "tipo_diagnostico")]
    pub diagnosis_types: CodeList,

    #[serde(rename = "codigo_item_especifico", deserialize_with = "code_string")]
    pub item_code: String,

    #[serde(rename = "valor_lab_especifico")]
    pub lab_values: CodeList,

    #[serde(rename = "rango_fechas")]
    pub date_range: DateRangeConfig,

    #[serde(rename = "clasificacion_presion")]
    pub blood_pressure: BloodPressureConfig,
}

impl Default for SpecificFilterConfig {
    fn default() -> Self {
        Self {
            active: false,
            diagnosis_types: CodeList::new(["D", "R"]),
            item_code: "99199.22".to_string(),
            lab_values: CodeList::new(["N", "A"]),
            date_range: DateRangeConfig::default(),
            blood_pressure: BloodPressureConfig::default(),
        }
    }
}

/// Inclusive visit date window; bounds are parsed when the filter runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DateRangeConfig {
    #[serde(rename = "activo")]
    pub active: bool,

    #[serde(rename = "fecha_inicio")]
    pub start: Option<String>,

    #[serde(rename = "fecha_fin")]
    pub end: Option<String>,
}

/// Blood pressure classification sub-filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BloodPressureConfig {
    #[serde(rename = "activo")]
    pub active: bool,

    /// Reading types kept after classification (`S`, `D`).
    #[serde(rename = "tipos_permitidos")]
    pub allowed_types: CodeList,
}

impl Default for BloodPressureConfig {
    fn default() -> Self {
        Self {
            active: false,
            allowed_types: CodeList::new(["S", "D"]),
        }
    }
}

// =============================================================================
// PERIMETER FILTER
// =============================================================================

/// The `[filtro_perimetro]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerimeterFilterConfig {
    #[serde(rename = "activo")]
    pub active: bool,

    #[serde(rename = "codigos_requeridos")]
    pub required_codes: CodeList,

    #[serde(rename = "clasificacion_perimetro")]
    pub thresholds: PerimeterThresholds,

    #[serde(rename = "modo_filtrado")]
    pub mode: String,

    #[serde(rename = "fecha_atencion_activo")]
    pub group_by_date: bool,
}

impl Default for PerimeterFilterConfig {
    fn default() -> Self {
        Self {
            active: false,
            required_codes: CodeList::new(["Z019", "99209.04"]),
            thresholds: PerimeterThresholds::default(),
            mode: DEFAULT_MODE.to_string(),
            group_by_date: false,
        }
    }
}

/// Abdominal perimeter cut-offs in centimetres.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PerimeterThresholds {
    #[serde(rename = "genero_femenino")]
    pub female: Thresholds,

    #[serde(rename = "genero_masculino")]
    pub male: Thresholds,
}

impl Default for PerimeterThresholds {
    fn default() -> Self {
        Self {
            female: Thresholds {
                normal: 88.0,
                abnormal: 88.0,
            },
            male: Thresholds {
                normal: 102.0,
                abnormal: 102.0,
            },
        }
    }
}

/// `normal`: values at or below are normal. `anormal`: values above are abnormal.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Thresholds {
    pub normal: f64,
    #[serde(rename = "anormal")]
    pub abnormal: f64,
}

// =============================================================================
// CLINICAL ASSESSMENT FILTERS
// =============================================================================

/// The `[filtro_valoracion_clinica]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClinicalAssessmentConfig {
    #[serde(rename = "activo")]
    pub active: bool,

    #[serde(rename = "codigos_requeridos")]
    pub required_codes: CodeList,

    #[serde(rename = "modo_filtrado")]
    pub mode: String,

    /// Allowed lab values for rows carrying `lab_code`.
    #[serde(rename = "valores_laboratorio")]
    pub lab_values: CodeList,

    #[serde(rename = "codigo_valor_lab", deserialize_with = "code_string")]
    pub lab_code: String,

    #[serde(rename = "fecha_atencion_activo")]
    pub group_by_date: bool,
}

impl Default for ClinicalAssessmentConfig {
    fn default() -> Self {
        Self {
            active: false,
            required_codes: CodeList::new(["Z019", "Z006"]),
            mode: DEFAULT_MODE.to_string(),
            lab_values: CodeList::default(),
            lab_code: "Z006".to_string(),
            group_by_date: false,
        }
    }
}

/// The `[filtro_valoracion_clinica_con_riesgo]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClinicalRiskConfig {
    #[serde(rename = "activo")]
    pub active: bool,

    #[serde(rename = "codigos_requeridos")]
    pub required_codes: CodeList,

    #[serde(rename = "codigos_factores_riesgo")]
    pub risk_codes: CodeList,

    #[serde(rename = "modo_filtrado")]
    pub mode: String,

    /// Allowed lab values for risk factor rows.
    #[serde(rename = "valores_laboratorio")]
    pub lab_values: CodeList,

    #[serde(rename = "fecha_atencion_activo")]
    pub group_by_date: bool,
}

impl Default for ClinicalRiskConfig {
    fn default() -> Self {
        Self {
            active: false,
            required_codes: CodeList::new(["Z019"]),
            risk_codes: CodeList::new(["E65X", "E669", "E6691", "E6692", "E6693", "E6690"]),
            mode: DEFAULT_MODE.to_string(),
            lab_values: CodeList::default(),
            group_by_date: false,
        }
    }
}
