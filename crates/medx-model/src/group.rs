//! Grouping keys and coverage modes.

use std::fmt;

use chrono::NaiveDate;

/// Grouping granularity for code coverage tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// One group per patient.
    #[default]
    Patient,
    /// One group per patient and visit date.
    PatientDate,
}

impl Granularity {
    /// Granularity selected by a filter's `fecha_atencion_activo` switch.
    pub fn from_date_switch(by_date: bool) -> Self {
        if by_date {
            Self::PatientDate
        } else {
            Self::Patient
        }
    }

    pub fn is_by_date(self) -> bool {
        matches!(self, Self::PatientDate)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patient => f.write_str("patient"),
            Self::PatientDate => f.write_str("patient+date"),
        }
    }
}

/// Identity of one group of rows.
///
/// `visit_date` is always `None` at [`Granularity::Patient`]. At
/// [`Granularity::PatientDate`] rows without a visit date form their own
/// `(patient, None)` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub patient_id: i64,
    pub visit_date: Option<NaiveDate>,
}

impl GroupKey {
    pub fn patient(patient_id: i64) -> Self {
        Self {
            patient_id,
            visit_date: None,
        }
    }

    pub fn patient_date(patient_id: i64, visit_date: NaiveDate) -> Self {
        Self {
            patient_id,
            visit_date: Some(visit_date),
        }
    }

    /// Key of a row at the given granularity.
    pub fn for_row(
        granularity: Granularity,
        patient_id: i64,
        visit_date: Option<NaiveDate>,
    ) -> Self {
        match granularity {
            Granularity::Patient => Self::patient(patient_id),
            Granularity::PatientDate => Self {
                patient_id,
                visit_date,
            },
        }
    }
}

/// How a group's code set is tested against a required code list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    /// `todos`: every required code must be present.
    #[default]
    All,
    /// `cualquiera`: at least one required code must be present.
    Any,
}

impl GroupingMode {
    /// Parses a configured mode name, matched exactly; `None` otherwise.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todos" => Some(Self::All),
            "cualquiera" => Some(Self::Any),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "todos",
            Self::Any => "cualquiera",
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
