//! Loading, validation and strategy selection.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::ProcessorConfig;
use crate::error::{ConfigError, Result};

/// Top-level keys a configuration must define.
pub const REQUIRED_KEYS: [&str; 2] = ["configuracion", "columnas"];

/// Which filter strategy a configuration selects.
///
/// Precedence: specific, perimeter, clinical assessment, clinical assessment
/// with risk factors, then the generic code/lab filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Specific,
    Perimeter,
    ClinicalAssessment,
    ClinicalAssessmentWithRisk,
    GenericCodeLab,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::Perimeter => "perimeter",
            Self::ClinicalAssessment => "clinical assessment",
            Self::ClinicalAssessmentWithRisk => "clinical assessment with risk",
            Self::GenericCodeLab => "generic code/lab",
        }
    }

    /// Configuration block that activates this strategy.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Specific => "filtro_especifico",
            Self::Perimeter => "filtro_perimetro",
            Self::ClinicalAssessment => "filtro_valoracion_clinica",
            Self::ClinicalAssessmentWithRisk => "filtro_valoracion_clinica_con_riesgo",
            Self::GenericCodeLab => "codigos_item",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Loads, defaults and validates a configuration file.
pub fn load_config(path: &Path) -> Result<ProcessorConfig> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, path)?;
    debug!(
        path = %path.display(),
        strategy = %config.active_strategy(),
        columns = config.columns.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Parses configuration text; `origin` is only used in error messages.
pub fn parse_config(contents: &str, origin: &Path) -> Result<ProcessorConfig> {
    let toml_error = |source| ConfigError::Toml {
        path: origin.to_path_buf(),
        source,
    };
    let document: toml::Table = toml::from_str(contents).map_err(toml_error)?;
    for key in REQUIRED_KEYS {
        if !document.contains_key(key) {
            return Err(ConfigError::MissingKey {
                key: key.to_string(),
            });
        }
    }
    let config: ProcessorConfig = toml::Value::Table(document)
        .try_into()
        .map_err(toml_error)?;
    config.validate()?;
    Ok(config)
}

impl ProcessorConfig {
    /// The strategy that runs, by precedence over the active flags.
    pub fn active_strategy(&self) -> StrategyKind {
        if self.specific.active {
            StrategyKind::Specific
        } else if self.perimeter.active {
            StrategyKind::Perimeter
        } else if self.clinical_assessment.active {
            StrategyKind::ClinicalAssessment
        } else if self.clinical_risk.active {
            StrategyKind::ClinicalAssessmentWithRisk
        } else {
            StrategyKind::GenericCodeLab
        }
    }

    /// Strategies whose `activo` flag is set, in precedence order.
    pub fn enabled_strategies(&self) -> Vec<StrategyKind> {
        [
            (self.specific.active, StrategyKind::Specific),
            (self.perimeter.active, StrategyKind::Perimeter),
            (self.clinical_assessment.active, StrategyKind::ClinicalAssessment),
            (self.clinical_risk.active, StrategyKind::ClinicalAssessmentWithRisk),
        ]
        .into_iter()
        .filter_map(|(active, kind)| active.then_some(kind))
        .collect()
    }

    /// Checks the cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(ConfigError::invalid("'columnas' must list at least one column"));
        }
        if let Some(blank) = self.columns.iter().find(|column| column.trim().is_empty()) {
            return Err(ConfigError::invalid(format!(
                "'columnas' contains a blank column name: {blank:?}"
            )));
        }
        let validations = &self.validations;
        if validations.min_age > validations.max_age {
            return Err(ConfigError::invalid(format!(
                "validaciones.edad_minima ({}) is greater than validaciones.edad_maxima ({})",
                validations.min_age, validations.max_age
            )));
        }
        if self.specific.active && self.specific.item_code.is_empty() {
            return Err(ConfigError::invalid(
                "filtro_especifico.codigo_item_especifico must not be empty",
            ));
        }
        if self.perimeter.active && self.perimeter.required_codes.is_empty() {
            return Err(ConfigError::invalid(
                "filtro_perimetro.codigos_requeridos must not be empty",
            ));
        }
        if self.clinical_assessment.active && self.clinical_assessment.required_codes.is_empty() {
            return Err(ConfigError::invalid(
                "filtro_valoracion_clinica.codigos_requeridos must not be empty",
            ));
        }
        if self.clinical_risk.active
            && (self.clinical_risk.required_codes.is_empty()
                || self.clinical_risk.risk_codes.is_empty())
        {
            return Err(ConfigError::invalid(
                "filtro_valoracion_clinica_con_riesgo needs codigos_requeridos and codigos_factores_riesgo",
            ));
        }

        let enabled = self.enabled_strategies();
        if enabled.len() > 1 {
            warn!(
                selected = %self.active_strategy(),
                enabled = enabled.len(),
                "several filters are active; only the highest precedence one runs"
            );
        }
        Ok(())
    }

    /// Input path, preferring an explicit override.
    pub fn input_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.general.input_file.clone())
            .ok_or_else(|| ConfigError::MissingKey {
                key: "configuracion.archivo_entrada".to_string(),
            })
    }

    /// Base output path before unique naming, preferring an explicit override.
    pub fn output_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.general.output_file.clone())
            .ok_or_else(|| ConfigError::MissingKey {
                key: "configuracion.archivo_salida".to_string(),
            })
    }
}
