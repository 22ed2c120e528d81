//! Row counts and warnings collected while a run progresses.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use medx_config::StrategyKind;

/// Row count after one named stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCount {
    pub stage: &'static str,
    pub rows: usize,
}

/// What a strategy did to the normalized table.
#[derive(Debug, Clone)]
pub struct StrategyDiagnostics {
    pub strategy: StrategyKind,
    pub stages: Vec<StageCount>,
    /// Groups that passed the coverage test, when the strategy groups at all.
    pub qualifying_groups: Option<usize>,
    /// Item code distribution of the strategy output.
    pub code_distribution: BTreeMap<String, usize>,
    /// Distribution of each derived classification column.
    pub classifications: BTreeMap<String, BTreeMap<String, usize>>,
    pub warnings: Vec<String>,
    pub added_columns: Vec<String>,
}

impl StrategyDiagnostics {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            stages: Vec::new(),
            qualifying_groups: None,
            code_distribution: BTreeMap::new(),
            classifications: BTreeMap::new(),
            warnings: Vec::new(),
            added_columns: Vec::new(),
        }
    }

    pub fn record_stage(&mut self, stage: &'static str, rows: usize) {
        info!(strategy = %self.strategy, stage, rows, "filter stage");
        self.stages.push(StageCount { stage, rows });
    }

    pub fn record_groups(&mut self, groups: usize) {
        info!(strategy = %self.strategy, groups, "qualifying groups");
        self.qualifying_groups = Some(groups);
    }

    /// Records a non-fatal problem; the run continues.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(strategy = %self.strategy, "{message}");
        self.warnings.push(message);
    }

    pub fn add_column(&mut self, column: &str) {
        self.added_columns.push(column.to_string());
    }

    pub fn has_added(&self, column: &str) -> bool {
        self.added_columns.iter().any(|added| added == column)
    }

    /// Records a derived classification column and its distribution.
    pub fn record_classification(&mut self, column: &str, counts: BTreeMap<String, usize>) {
        for (class, rows) in &counts {
            debug!(column, class = %class, rows, "classification");
        }
        self.add_column(column);
        self.classifications.insert(column.to_string(), counts);
    }

    /// Rows left after the last recorded stage.
    pub fn final_rows(&self) -> Option<usize> {
        self.stages.last().map(|stage| stage.rows)
    }
}
