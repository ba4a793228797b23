use super::{
    is_missing, normalize_district, DatasetError, Result, AREA_COLUMN, DISTRICT_COLUMN,
    MISSING_DISTRICT,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// One dataset record. Only the columns the API reads are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    /// Normalized district name
    pub district: String,
    /// Cultivated area in hectares, `None` when the cell is empty or not numeric
    pub area: Option<f64>,
}

impl DatasetRow {
    pub fn new(district: &str, area: Option<f64>) -> Self {
        Self {
            district: normalize_district(district),
            area,
        }
    }
}

/// Per-district totals, computed on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictAggregate {
    pub district: String,
    /// Summed area truncated to whole hectares
    pub total_area: i64,
    pub records_count: usize,
}

/// In-memory dataset snapshot
#[derive(Debug, Default)]
pub struct DatasetStore {
    rows: Vec<DatasetRow>,
    loaded: bool,
}

impl DatasetStore {
    /// Store with no dataset behind it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a loaded store from rows already in memory
    pub fn from_rows(rows: Vec<DatasetRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| DatasetRow {
                district: normalize_district(&row.district),
                area: row.area,
            })
            .collect();
        Self { rows, loaded: true }
    }

    /// Load the dataset file. A missing file yields the empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Dataset not found at {}", path.display());
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(DatasetError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let store = Self::from_reader(file)?;
        info!(
            "Dataset loaded from {}: {} records",
            path.display(),
            store.record_count()
        );
        Ok(store)
    }

    /// Parse CSV data with a header row containing `District` and `Area`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let district_idx = column(DISTRICT_COLUMN)?;
        let area_idx = column(AREA_COLUMN)?;

        let mut rows = Vec::new();
        let mut unparsed_areas = 0usize;
        for record in csv_reader.records() {
            let record = record?;
            let raw_district = record.get(district_idx).unwrap_or("");
            let district = if is_missing(raw_district) {
                MISSING_DISTRICT.to_string()
            } else {
                normalize_district(raw_district)
            };

            let raw_area = record.get(area_idx).unwrap_or("");
            let area = if is_missing(raw_area) {
                None
            } else {
                match raw_area.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() => Some(value),
                    _ => {
                        unparsed_areas += 1;
                        None
                    }
                }
            };

            rows.push(DatasetRow { district, area });
        }

        if unparsed_areas > 0 {
            warn!("{} dataset rows have a non-numeric Area", unparsed_areas);
        }

        Ok(Self { rows, loaded: true })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    /// Distinct districts, ascending
    pub fn list_districts(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.district.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows whose district equals the normalized `key`
    pub fn filter_by_district(&self, key: &str) -> Vec<&DatasetRow> {
        let key = normalize_district(key);
        self.rows.iter().filter(|row| row.district == key).collect()
    }

    /// Totals for one district, `None` when no row matches
    pub fn aggregate_district(&self, key: &str) -> Option<DistrictAggregate> {
        let matching = self.filter_by_district(key);
        let first = matching.first()?;
        let total: f64 = matching.iter().filter_map(|row| row.area).sum();

        Some(DistrictAggregate {
            district: first.district.clone(),
            total_area: total.trunc() as i64,
            records_count: matching.len(),
        })
    }

    /// The `n` districts with the largest summed area, largest first.
    /// Equal sums are ordered by district name.
    pub fn top_by_area(&self, n: usize) -> Vec<DistrictAggregate> {
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for row in &self.rows {
            let entry = groups.entry(row.district.as_str()).or_insert((0.0, 0));
            entry.0 += row.area.unwrap_or(0.0);
            entry.1 += 1;
        }

        let mut totals: Vec<(&str, f64, usize)> = groups
            .into_iter()
            .map(|(district, (sum, count))| (district, sum, count))
            .collect();
        totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        totals
            .into_iter()
            .take(n)
            .map(|(district, sum, count)| DistrictAggregate {
                district: district.to_string(),
                total_area: sum.trunc() as i64,
                records_count: count,
            })
            .collect()
    }
}
