//! DataFrame-backed record table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::{
    AnyValue, BooleanChunked, Column, DataFrame, DataType, IntoColumn, NamedFrom,
    NewChunkedArray, PlSmallStr, PolarsResult, Series, SortMultipleOptions,
};

use medx_common::{any_to_date, any_to_f64, any_to_i64, any_to_string, date_to_epoch_days};

use crate::columns;
use crate::group::{Granularity, GroupKey};

/// Visit records held in a Polars `DataFrame`.
///
/// All row-level work goes through the typed accessors below, which read every
/// cell through the lenient converters in `medx_common`. This keeps the
/// filters independent of whether a column is still raw text or has already
/// been coerced by the normalizer.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    frame: DataFrame,
}

impl RecordTable {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Builds a table of text columns; empty cells become nulls.
    pub fn from_text_columns(columns: &[(&str, Vec<&str>)]) -> PolarsResult<Self> {
        let mut built: Vec<Column> = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            let cells: Vec<Option<&str>> = values
                .iter()
                .map(|value| if value.is_empty() { None } else { Some(*value) })
                .collect();
            built.push(Series::new((*name).into(), cells).into_column());
        }
        Ok(Self::new(DataFrame::new(built)?))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Trimmed text values of a column; nulls and blank cells are `None`.
    pub fn string_values(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let column = self.frame.column(name)?;
        let mut values = Vec::with_capacity(self.height());
        for idx in 0..self.height() {
            let value = any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
            let trimmed = value.trim();
            values.push(if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            });
        }
        Ok(values)
    }

    pub fn f64_values(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let column = self.frame.column(name)?;
        let mut values = Vec::with_capacity(self.height());
        for idx in 0..self.height() {
            values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        Ok(values)
    }

    pub fn i64_values(&self, name: &str) -> PolarsResult<Vec<Option<i64>>> {
        let column = self.frame.column(name)?;
        let mut values = Vec::with_capacity(self.height());
        for idx in 0..self.height() {
            values.push(any_to_i64(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        Ok(values)
    }

    pub fn date_values(&self, name: &str) -> PolarsResult<Vec<Option<NaiveDate>>> {
        let column = self.frame.column(name)?;
        let mut values = Vec::with_capacity(self.height());
        for idx in 0..self.height() {
            values.push(any_to_date(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        Ok(values)
    }

    pub fn patient_ids(&self) -> PolarsResult<Vec<Option<i64>>> {
        self.i64_values(columns::PATIENT_ID)
    }

    /// Visit dates, or all `None` when the table has no visit date column.
    pub fn visit_dates(&self) -> PolarsResult<Vec<Option<NaiveDate>>> {
        if self.has_column(columns::VISIT_DATE) {
            self.date_values(columns::VISIT_DATE)
        } else {
            Ok(vec![None; self.height()])
        }
    }

    /// Group key of every row; rows without a patient id have none.
    pub fn group_keys(&self, granularity: Granularity) -> PolarsResult<Vec<Option<GroupKey>>> {
        let patients = self.patient_ids()?;
        let dates = if granularity.is_by_date() {
            self.visit_dates()?
        } else {
            vec![None; self.height()]
        };
        Ok(patients
            .into_iter()
            .zip(dates)
            .map(|(patient, date)| {
                patient.map(|patient_id| GroupKey::for_row(granularity, patient_id, date))
            })
            .collect())
    }

    /// Row counts per distinct text value of a column, nulls excluded.
    pub fn value_counts(&self, name: &str) -> PolarsResult<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for value in self.string_values(name)?.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Keeps the rows whose mask entry is `true`.
    pub fn filter_rows(&mut self, keep: &[bool]) -> PolarsResult<()> {
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        self.frame = self.frame.filter(&mask)?;
        Ok(())
    }

    pub fn set_string_column(&mut self, name: &str, values: Vec<Option<String>>) -> PolarsResult<()> {
        let series = Series::new(name.into(), values);
        self.frame.with_column(series)?;
        Ok(())
    }

    pub fn set_i64_column(&mut self, name: &str, values: Vec<Option<i64>>) -> PolarsResult<()> {
        let series = Series::new(name.into(), values);
        self.frame.with_column(series)?;
        Ok(())
    }

    pub fn set_date_column(
        &mut self,
        name: &str,
        values: &[Option<NaiveDate>],
    ) -> PolarsResult<()> {
        let days: Vec<Option<i32>> = values
            .iter()
            .map(|value| value.map(date_to_epoch_days))
            .collect();
        let series = Series::new(name.into(), days).cast(&DataType::Date)?;
        self.frame.with_column(series)?;
        Ok(())
    }

    /// Projects the table onto the given columns, in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> PolarsResult<Self> {
        let frame = self
            .frame
            .select(names.iter().map(|name| PlSmallStr::from(name.as_ref())))?;
        Ok(Self::new(frame))
    }

    /// Stable ascending sort by the given columns.
    pub fn sort_by(&mut self, names: &[&str]) -> PolarsResult<()> {
        if names.is_empty() || self.is_empty() {
            return Ok(());
        }
        let by: Vec<PlSmallStr> = names.iter().map(|name| PlSmallStr::from(*name)).collect();
        self.frame = self
            .frame
            .sort(by, SortMultipleOptions::default().with_maintain_order(true))?;
        Ok(())
    }
}

impl From<DataFrame> for RecordTable {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
