//! Filtering of visit extracts.
//!
//! - [`normalize`]: data quality rules applied before any strategy
//! - [`evaluator`]: per-group item code coverage shared by the strategies
//! - [`FilterStrategy`]: the five mutually exclusive strategies
//! - [`classify_perimeter`] / [`classify_blood_pressure`]: derived columns
//! - [`run_pipeline`]: gate, projection, normalization, strategy, final pass
//!   and ordering in one call

mod classify;
mod diagnostics;
mod error;
pub mod evaluator;
mod normalizer;
mod pipeline;
mod rows;
mod strategy;

pub use classify::{
    PressureOutcome, add_perimeter_classification, classify_blood_pressure, classify_perimeter,
    classify_reading,
};
pub use diagnostics::{StageCount, StrategyDiagnostics};
pub use error::{FilterError, Result};
pub use normalizer::{NormalizationReport, NormalizationRules, StepCount, normalize};
pub use pipeline::{PipelineOutcome, run_pipeline};
pub use strategy::{FilterStrategy, GenericCodeLab, StrategyOutput};
