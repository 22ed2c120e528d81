//! Processor configuration for medx.
//!
//! A configuration is a TOML document with two required top-level keys,
//! `configuracion` and `columnas`. Every filter block is optional and falls
//! back to documented defaults with its `activo` flag off.

mod codes;
mod document;
mod error;
mod load;
mod output;

pub use codes::CodeList;
pub use document::{
    BloodPressureConfig, ClinicalAssessmentConfig, ClinicalRiskConfig, CodeFiltering,
    DateRangeConfig, GeneralSettings, ItemCodes, PerimeterFilterConfig, PerimeterThresholds,
    ProcessorConfig, SpecificFilterConfig, Thresholds, Validations,
};
pub use error::{ConfigError, Result};
pub use load::{REQUIRED_KEYS, StrategyKind, load_config, parse_config};
pub use output::{resolve_output_path, unique_output_path};
