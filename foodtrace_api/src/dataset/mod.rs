//! Crop production dataset
//!
//! The dataset is read once at startup and shared read-only for the
//! lifetime of the process. District names are normalized on load so every
//! lookup can use an exact match.

pub mod store;

pub use store::{DatasetRow, DatasetStore, DistrictAggregate};

use std::path::PathBuf;
use thiserror::Error;

/// Column holding the district name
pub const DISTRICT_COLUMN: &str = "District";
/// Column holding the cultivated area in hectares
pub const AREA_COLUMN: &str = "Area";

/// Cell contents that are read as "no value"
pub(crate) const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Text a missing district cell normalizes to
pub const MISSING_DISTRICT: &str = "NAN";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Normalize a district key: strip surrounding whitespace and upper-case.
///
/// Idempotent, so request paths and stored rows can both go through it.
pub fn normalize_district(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub(crate) fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_district() {
        assert_eq!(normalize_district("  chennai "), "CHENNAI");
        assert_eq!(normalize_district("Tiruvannamalai"), "TIRUVANNAMALAI");
        assert_eq!(normalize_district("\tmadurai\n"), "MADURAI");
        assert_eq!(normalize_district(""), "");
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(""));
        assert!(is_missing("NaN"));
        assert!(is_missing("NULL"));
        assert!(!is_missing("0"));
        assert!(!is_missing("CHENNAI"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "\\PC*") {
            let once = normalize_district(&raw);
            prop_assert_eq!(normalize_district(&once), once.clone());
        }

        #[test]
        fn prop_normalize_ignores_padding(raw in "[a-zA-Z ]{0,24}", pad in "[ \t]{0,4}") {
            let padded = format!("{pad}{raw}{pad}");
            prop_assert_eq!(normalize_district(&padded), normalize_district(&raw));
        }
    }
}
