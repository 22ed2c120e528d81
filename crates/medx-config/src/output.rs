//! Output file naming.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Appends `_<YYYYMMDD_HHMMSS>` to the file stem, keeping the extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use chrono::NaiveDate;
/// use medx_config::unique_output_path;
///
/// let at = NaiveDate::from_ymd_opt(2025, 3, 7)
///     .unwrap()
///     .and_hms_opt(14, 5, 9)
///     .unwrap();
/// let path = unique_output_path(Path::new("output/resultado.csv"), at);
/// assert_eq!(path, Path::new("output/resultado_20250307_140509.csv"));
/// ```
pub fn unique_output_path(base: &Path, at: NaiveDateTime) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_{}", at.format(TIMESTAMP_FORMAT));
    if let Some(extension) = base.extension() {
        name.push('.');
        name.push_str(&extension.to_string_lossy());
    }
    base.with_file_name(name)
}

/// Final output path: timestamped from the local clock when `unique` is set.
pub fn resolve_output_path(base: &Path, unique: bool) -> PathBuf {
    if unique {
        unique_output_path(base, Local::now().naive_local())
    } else {
        base.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap()
    }

    #[test]
    fn test_unique_output_path_without_extension() {
        assert_eq!(
            unique_output_path(Path::new("resultado"), at()),
            PathBuf::from("resultado_20241231_235901")
        );
    }

    #[test]
    fn test_resolve_output_path_keeps_base_when_disabled() {
        let base = Path::new("out/data.csv");
        assert_eq!(resolve_output_path(base, false), base);
        let unique = resolve_output_path(base, true);
        assert_ne!(unique, base);
        assert_eq!(unique.parent(), base.parent());
        assert_eq!(unique.extension(), base.extension());
    }
}
