//! Code and lab value lists.
//!
//! Item codes such as `Z019` are text, but many are numeric-looking
//! (`99209.04`) and get written unquoted. Both forms are accepted. A cell
//! matches a code when the texts are equal or when both parse as the same
//! number, so an unquoted `99209.40` (read back as `99209.4`) still matches the
//! cell text `99209.40`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum CodeValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl CodeValue {
    fn into_code(self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }
}

/// Deserializes a single code written as a string or a number.
pub(crate) fn code_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    CodeValue::deserialize(deserializer).map(CodeValue::into_code)
}

/// An ordered list of item codes, lab values or other literal tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeList(Vec<String>);

impl CodeList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.matching(code).is_some()
    }

    /// The configured spelling of the code that `code` matches.
    pub fn matching(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        if let Some(exact) = self.0.iter().find(|candidate| candidate.as_str() == code) {
            return Some(exact.as_str());
        }
        let number = numeric(code)?;
        self.0
            .iter()
            .find(|candidate| numeric(candidate) == Some(number))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub(crate) fn from_values(values: Vec<CodeValue>) -> Self {
        Self(values.into_iter().map(CodeValue::into_code).collect())
    }

    /// Distinct codes as an ordered set.
    pub fn to_set(&self) -> BTreeSet<String> {
        self.0.iter().cloned().collect()
    }

    /// Codes of `self` followed by the codes of `other` not already present.
    pub fn union(&self, other: &CodeList) -> CodeList {
        let mut merged = self.0.clone();
        for code in &other.0 {
            if !merged.contains(code) {
                merged.push(code.clone());
            }
        }
        CodeList(merged)
    }
}

fn numeric(code: &str) -> Option<f64> {
    code.parse::<f64>().ok().filter(|value| value.is_finite())
}

impl<'de> Deserialize<'de> for CodeList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<CodeValue>::deserialize(deserializer)?;
        Ok(Self::from_values(values))
    }
}

impl fmt::Display for CodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        codes: CodeList,
        #[serde(deserialize_with = "code_string")]
        single: String,
    }

    #[test]
    fn test_mixed_code_list() {
        let holder: Holder =
            toml::from_str("codes = [\"Z019\", 99209.04, 42, \" E669 \"]\nsingle = 99199.22")
                .unwrap();
        assert_eq!(
            holder.codes.as_slice(),
            &["Z019", "99209.04", "42", "E669"]
        );
        assert_eq!(holder.single, "99199.22");
    }

    #[test]
    fn test_unquoted_code_matches_cell_with_trailing_zero() {
        let holder: Holder = toml::from_str("codes = [99209.40, \"Z019\"]\nsingle = 1").unwrap();
        assert_eq!(holder.codes.as_slice(), &["99209.4", "Z019"]);
        assert_eq!(holder.codes.matching("99209.40"), Some("99209.4"));
        assert_eq!(holder.codes.matching(" Z019 "), Some("Z019"));
        assert!(!holder.codes.contains("99209.41"));
        assert!(!holder.codes.contains("Z01"));
        assert!(!holder.codes.contains("NaN"));
    }

    #[test]
    fn test_union_keeps_order_without_duplicates() {
        let required = CodeList::new(["A", "B"]);
        let optional = CodeList::new(["B", "C"]);
        let merged = required.union(&optional);
        assert_eq!(merged.as_slice(), &["A", "B", "C"]);
        assert_eq!(merged.to_string(), "[A, B, C]");
    }
}
