//! Visit date parsing.

use chrono::{Days, NaiveDate, NaiveDateTime};
use polars::prelude::AnyValue;

use crate::values::any_to_string;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Parses a visit date as written by common spreadsheet exports.
///
/// Accepts ISO dates, slash-separated dates (year-first or day-first) and
/// datetimes, whose time part is discarded. Returns `None` for empty or
/// unrecognized input.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use medx_common::parse_visit_date;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
/// assert_eq!(parse_visit_date("2024-03-09"), expected);
/// assert_eq!(parse_visit_date("09/03/2024"), expected);
/// assert_eq!(parse_visit_date("2024-03-09 08:30:00"), expected);
/// assert_eq!(parse_visit_date("not a date"), None);
/// ```
pub fn parse_visit_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Converts a Polars `Date` value (days since 1970-01-01) to a `NaiveDate`.
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    let offset = Days::new(u64::from(days.unsigned_abs()));
    if days >= 0 {
        epoch().checked_add_days(offset)
    } else {
        epoch().checked_sub_days(offset)
    }
}

/// Converts a `NaiveDate` to days since 1970-01-01, the physical Polars `Date` value.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

/// Reads a date from a typed `Date` cell or a text cell.
pub fn any_to_date(value: AnyValue<'_>) -> Option<NaiveDate> {
    match value {
        AnyValue::Null => None,
        AnyValue::Date(days) => epoch_days_to_date(days),
        other => parse_visit_date(&any_to_string(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_visit_date_formats() {
        assert_eq!(parse_visit_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_visit_date("2024/01/15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_visit_date("15/01/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_visit_date("15-01-2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_visit_date("2024-01-15T10:00:00"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_parse_visit_date_rejects_invalid() {
        assert_eq!(parse_visit_date(""), None);
        assert_eq!(parse_visit_date("2024-02-30"), None);
        assert_eq!(parse_visit_date("ayer"), None);
    }

    #[test]
    fn test_epoch_day_conversion() {
        let date = ymd(2024, 1, 15);
        assert_eq!(date_to_epoch_days(date), 19737);
        assert_eq!(epoch_days_to_date(19737), Some(date));
        assert_eq!(epoch_days_to_date(-1), Some(ymd(1969, 12, 31)));
    }

    #[test]
    fn test_any_to_date() {
        assert_eq!(any_to_date(AnyValue::Null), None);
        assert_eq!(any_to_date(AnyValue::Date(0)), Some(ymd(1970, 1, 1)));
        assert_eq!(
            any_to_date(AnyValue::String("2023-12-31")),
            Some(ymd(2023, 12, 31))
        );
    }
}
