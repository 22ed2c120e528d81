//! Data quality normalization.
//!
//! Steps run in a fixed order and each one is skipped when its column is
//! absent:
//!
//! 1. drop rows without a patient id
//! 2. coerce patient ids to integers, dropping failures
//! 3. keep ages inside the configured range
//! 4. keep valid genders
//! 5. parse visit dates, dropping failures
//!
//! Running the normalizer on its own output drops nothing.

use tracing::info;

use medx_config::{CodeList, Validations};
use medx_model::{RecordTable, columns};

use crate::error::Result;

/// Thresholds and allow-lists applied by [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizationRules {
    pub min_age: f64,
    pub max_age: f64,
    pub valid_genders: CodeList,
}

impl Default for NormalizationRules {
    fn default() -> Self {
        Self::from(&Validations::default())
    }
}

impl From<&Validations> for NormalizationRules {
    fn from(validations: &Validations) -> Self {
        Self {
            min_age: validations.min_age as f64,
            max_age: validations.max_age as f64,
            valid_genders: validations.valid_genders.clone(),
        }
    }
}

impl NormalizationRules {
    pub fn age_in_range(&self, age: Option<f64>) -> bool {
        age.is_some_and(|age| age >= self.min_age && age <= self.max_age)
    }
}

/// Row counts around one normalization step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCount {
    pub step: &'static str,
    pub before: usize,
    pub after: usize,
}

impl StepCount {
    pub fn dropped(&self) -> usize {
        self.before - self.after
    }
}

/// Steps that ran, in order.
#[derive(Debug, Clone, Default)]
pub struct NormalizationReport {
    pub steps: Vec<StepCount>,
}

impl NormalizationReport {
    fn record(&mut self, step: &'static str, before: usize, after: usize) {
        info!(step, before, after, dropped = before - after, "normalization step");
        self.steps.push(StepCount {
            step,
            before,
            after,
        });
    }

    pub fn total_dropped(&self) -> usize {
        self.steps.iter().map(StepCount::dropped).sum()
    }
}

/// Applies the data quality rules.
pub fn normalize(
    mut table: RecordTable,
    rules: &NormalizationRules,
) -> Result<(RecordTable, NormalizationReport)> {
    let mut report = NormalizationReport::default();

    if table.has_column(columns::PATIENT_ID) {
        let before = table.height();
        let mask: Vec<bool> = table
            .string_values(columns::PATIENT_ID)?
            .iter()
            .map(Option::is_some)
            .collect();
        table.filter_rows(&mask)?;
        report.record("missing patient id", before, table.height());

        let before = table.height();
        let ids = table.patient_ids()?;
        let mask: Vec<bool> = ids.iter().map(Option::is_some).collect();
        table.set_i64_column(columns::PATIENT_ID, ids)?;
        table.filter_rows(&mask)?;
        report.record("integer patient id", before, table.height());
    }

    if table.has_column(columns::AGE) {
        let before = table.height();
        let mask: Vec<bool> = table
            .f64_values(columns::AGE)?
            .into_iter()
            .map(|age| rules.age_in_range(age))
            .collect();
        table.filter_rows(&mask)?;
        report.record("age range", before, table.height());
    }

    if table.has_column(columns::GENDER) {
        let before = table.height();
        let mask: Vec<bool> = table
            .string_values(columns::GENDER)?
            .iter()
            .map(|gender| {
                gender
                    .as_deref()
                    .is_some_and(|gender| rules.valid_genders.contains(gender))
            })
            .collect();
        table.filter_rows(&mask)?;
        report.record("valid gender", before, table.height());
    }

    if table.has_column(columns::VISIT_DATE) {
        let before = table.height();
        let dates = table.visit_dates()?;
        let mask: Vec<bool> = dates.iter().map(Option::is_some).collect();
        table.set_date_column(columns::VISIT_DATE, &dates)?;
        table.filter_rows(&mask)?;
        report.record("visit date", before, table.height());
    }

    Ok((table, report))
}
