//! Classifier output categories.

use std::fmt;

/// Abdominal perimeter category written to `Clasificacion_Perimetro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PerimeterClass {
    Normal,
    Anormal,
    NoClasificado,
}

impl PerimeterClass {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Anormal, Self::NoClasificado];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Anormal => "ANORMAL",
            Self::NoClasificado => "NO_CLASIFICADO",
        }
    }
}

impl fmt::Display for PerimeterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a reading within a blood-pressure measurement.
///
/// The first reading of a visit (lowest correlation id) is taken as systolic,
/// every later reading as diastolic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PressureType {
    Systolic,
    Diastolic,
}

impl PressureType {
    /// Code used in configuration and output (`S` / `D`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Systolic => "S",
            Self::Diastolic => "D",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Self::Systolic),
            "D" => Some(Self::Diastolic),
            _ => None,
        }
    }

    /// Reading at or above this value is abnormal (mmHg).
    pub fn abnormal_threshold(self) -> f64 {
        match self {
            Self::Systolic => 140.0,
            Self::Diastolic => 90.0,
        }
    }
}

impl fmt::Display for PressureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Blood-pressure reading or visit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PressureClass {
    Normal,
    Anormal,
}

impl PressureClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Anormal => "ANORMAL",
        }
    }
}

impl fmt::Display for PressureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
