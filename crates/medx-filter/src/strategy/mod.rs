//! The five mutually exclusive filter strategies.
//!
//! A configuration selects exactly one strategy (see
//! [`ProcessorConfig::active_strategy`]). All strategies share the code
//! coverage evaluator and report what they did through
//! [`StrategyDiagnostics`].

mod clinical;
mod generic;
mod perimeter;
mod risk;
mod specific;

use medx_config::{
    ClinicalAssessmentConfig, ClinicalRiskConfig, CodeList, ItemCodes, PerimeterFilterConfig,
    ProcessorConfig, SpecificFilterConfig, StrategyKind,
};
use medx_model::{Granularity, RecordTable, columns};

use crate::diagnostics::StrategyDiagnostics;
use crate::error::Result;

/// Inputs of the generic code/lab filter, spread over several config blocks.
#[derive(Debug, Clone, Copy)]
pub struct GenericCodeLab<'a> {
    pub item_codes: &'a ItemCodes,
    pub lab_values: &'a CodeList,
    pub mode: &'a str,
}

/// The strategy selected for a run, borrowing its configuration block.
#[derive(Debug, Clone, Copy)]
pub enum FilterStrategy<'a> {
    Specific(&'a SpecificFilterConfig),
    Perimeter(&'a PerimeterFilterConfig),
    ClinicalAssessment(&'a ClinicalAssessmentConfig),
    ClinicalAssessmentWithRisk(&'a ClinicalRiskConfig),
    GenericCodeLab(GenericCodeLab<'a>),
}

/// A strategy's filtered table and what happened on the way.
#[derive(Debug)]
pub struct StrategyOutput {
    pub table: RecordTable,
    pub diagnostics: StrategyDiagnostics,
}

impl<'a> FilterStrategy<'a> {
    /// Selects the strategy by precedence.
    pub fn from_config(config: &'a ProcessorConfig) -> Self {
        match config.active_strategy() {
            StrategyKind::Specific => Self::Specific(&config.specific),
            StrategyKind::Perimeter => Self::Perimeter(&config.perimeter),
            StrategyKind::ClinicalAssessment => {
                Self::ClinicalAssessment(&config.clinical_assessment)
            }
            StrategyKind::ClinicalAssessmentWithRisk => {
                Self::ClinicalAssessmentWithRisk(&config.clinical_risk)
            }
            StrategyKind::GenericCodeLab => Self::GenericCodeLab(GenericCodeLab {
                item_codes: &config.item_codes,
                lab_values: &config.lab_values,
                mode: &config.code_filtering.mode,
            }),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Specific(_) => StrategyKind::Specific,
            Self::Perimeter(_) => StrategyKind::Perimeter,
            Self::ClinicalAssessment(_) => StrategyKind::ClinicalAssessment,
            Self::ClinicalAssessmentWithRisk(_) => StrategyKind::ClinicalAssessmentWithRisk,
            Self::GenericCodeLab(_) => StrategyKind::GenericCodeLab,
        }
    }

    /// Granularity used for coverage tests and row selection.
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Perimeter(config) => Granularity::from_date_switch(config.group_by_date),
            Self::ClinicalAssessment(config) => Granularity::from_date_switch(config.group_by_date),
            Self::ClinicalAssessmentWithRisk(config) => {
                Granularity::from_date_switch(config.group_by_date)
            }
            Self::Specific(_) | Self::GenericCodeLab(_) => Granularity::Patient,
        }
    }

    /// Runs the strategy on a normalized table.
    pub fn apply(&self, table: RecordTable) -> Result<StrategyOutput> {
        let mut diagnostics = StrategyDiagnostics::new(self.kind());
        diagnostics.record_stage("input", table.height());
        let table = match self {
            Self::Specific(config) => specific::apply(table, config, &mut diagnostics)?,
            Self::Perimeter(config) => perimeter::apply(table, config, &mut diagnostics)?,
            Self::ClinicalAssessment(config) => clinical::apply(table, config, &mut diagnostics)?,
            Self::ClinicalAssessmentWithRisk(config) => {
                risk::apply(table, config, &mut diagnostics)?
            }
            Self::GenericCodeLab(inputs) => generic::apply(table, inputs, &mut diagnostics)?,
        };
        if table.has_column(columns::ITEM_CODE) {
            diagnostics.code_distribution = table.value_counts(columns::ITEM_CODE)?;
        }
        Ok(StrategyOutput { table, diagnostics })
    }
}
