//! Housing dataset loading and cleaning
//!
//! Reads a spreadsheet (`.xlsx`, `.xlsm`, `.xls`, `.ods`) or CSV file with a
//! header row, keeps the price and the five raw attribute columns, drops rows
//! with a missing value in any of them and coerces the rest to `f64`.

use crate::errors::TrainerError;
use calamine::{open_workbook_auto, Data, Reader};
use rumah_core::{build_features, FeatureVector, RawAttributes, FEATURE_COUNT};
use std::path::Path;
use tracing::debug;

/// Price column.
pub const PRICE_COLUMN: &str = "HARGA";

/// Raw attribute columns in `RawAttributes` field order.
pub const ATTRIBUTE_COLUMNS: [&str; 5] = ["LB", "LT", "KT", "KM", "GRS"];

/// Identifier columns that are present in the source data but never used.
pub const IGNORED_COLUMNS: [&str; 2] = ["NO", "NAMA RUMAH"];

/// One cleaned housing sample.
#[derive(Clone, Debug, PartialEq)]
pub struct HouseRecord {
    pub price: f64,
    pub attributes: RawAttributes,
}

/// Cleaned training dataset.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub records: Vec<HouseRecord>,
    /// Rows dropped for missing values
    pub dropped_rows: usize,
}

#[derive(Clone, Debug, PartialEq)]
enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Load a dataset, choosing the reader from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::from_csv(path),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_spreadsheet(path),
            other => Err(TrainerError::Dataset(format!(
                "unsupported dataset format '{other}' for {}",
                path.display()
            ))),
        }
    }

    /// Load the first worksheet of a spreadsheet.
    pub fn from_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            TrainerError::Dataset(format!("failed to open {}: {e}", path.display()))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TrainerError::Dataset(format!("{} has no worksheets", path.display())))?
            .map_err(|e| TrainerError::Dataset(format!("failed to read worksheet: {e}")))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or_else(|| TrainerError::Dataset("worksheet is empty".to_string()))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let rows = rows
            .map(|row| row.iter().map(spreadsheet_cell).collect())
            .collect();

        Self::from_table(RawTable { headers, rows })
    }

    /// Load a CSV file with a header row.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| TrainerError::Dataset(format!("failed to open {}: {e}", path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| TrainerError::Dataset(format!("failed to read CSV header: {e}")))?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| TrainerError::Dataset(format!("malformed CSV row: {e}")))?;
            rows.push(record.iter().map(csv_cell).collect());
        }

        Self::from_table(RawTable { headers, rows })
    }

    /// Build a dataset from already-clean records.
    pub fn from_records(records: Vec<HouseRecord>) -> Self {
        Self {
            records,
            dropped_rows: 0,
        }
    }

    fn from_table(table: RawTable) -> Result<Self, TrainerError> {
        let column = |name: &str| -> Result<usize, TrainerError> {
            table
                .headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| TrainerError::Dataset(format!("missing required column '{name}'")))
        };

        let price_idx = column(PRICE_COLUMN)?;
        let mut attribute_idx = [0usize; 5];
        for (slot, name) in attribute_idx.iter_mut().zip(ATTRIBUTE_COLUMNS) {
            *slot = column(name)?;
        }

        for name in IGNORED_COLUMNS {
            if table.headers.iter().any(|header| header == name) {
                debug!("ignoring identifier column '{name}'");
            }
        }

        static EMPTY: Cell = Cell::Empty;

        let mut records = Vec::with_capacity(table.rows.len());
        let mut dropped_rows = 0;

        for (row_idx, row) in table.rows.iter().enumerate() {
            // Header is line 1.
            let line = row_idx + 2;
            let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY);

            let required = std::iter::once(price_idx).chain(attribute_idx);
            if required.clone().any(|idx| cell(idx) == &Cell::Empty) {
                dropped_rows += 1;
                continue;
            }

            let mut values = [0.0f64; 6];
            for (value, (idx, name)) in values.iter_mut().zip(
                required.zip(std::iter::once(PRICE_COLUMN).chain(ATTRIBUTE_COLUMNS)),
            ) {
                *value = coerce(cell(idx), line, name)?;
            }

            let price = values[0];
            if price <= 0.0 || !price.is_finite() {
                return Err(TrainerError::Dataset(format!(
                    "line {line}: {PRICE_COLUMN} must be positive to take its logarithm, got {price}"
                )));
            }

            records.push(HouseRecord {
                price,
                attributes: RawAttributes {
                    floor_area: values[1],
                    land_area: values[2],
                    bedrooms: values[3],
                    bathrooms: values[4],
                    garages: values[5],
                },
            });
        }

        if records.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }

        Ok(Self {
            records,
            dropped_rows,
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Engineered feature vector for every record.
    pub fn features(&self) -> Vec<FeatureVector> {
        self.records
            .iter()
            .map(|record| build_features(&record.attributes))
            .collect()
    }

    /// Natural log of every price.
    pub fn log_targets(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.price.ln()).collect()
    }

    /// Per-feature (min, max) over the engineered features.
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); FEATURE_COUNT];

        for features in self.features() {
            for (i, &val) in features.as_slice().iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}

/// Text values read as missing, matching the usual spreadsheet/CSV export
/// conventions (`#N/A`, `NULL`, `nan`, ...).
const NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_null_marker(text: &str) -> bool {
    NULL_MARKERS.contains(&text.trim())
}

fn text_cell(text: &str) -> Cell {
    if is_null_marker(text) {
        Cell::Empty
    } else {
        Cell::Text(text.trim().to_string())
    }
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) if value.is_nan() => Cell::Empty,
        Data::Float(value) => Cell::Number(*value),
        Data::Bool(value) => Cell::Number(if *value { 1.0 } else { 0.0 }),
        Data::String(text) => text_cell(text),
        other => text_cell(&other.to_string()),
    }
}

fn csv_cell(field: &str) -> Cell {
    text_cell(field)
}

fn coerce(cell: &Cell, line: usize, column: &str) -> Result<f64, TrainerError> {
    let value = match cell {
        Cell::Number(value) => *value,
        Cell::Text(text) => text.parse::<f64>().map_err(|_| {
            TrainerError::Dataset(format!(
                "line {line}, column {column}: could not convert '{text}' to float"
            ))
        })?,
        Cell::Empty => {
            return Err(TrainerError::Dataset(format!(
                "line {line}, column {column}: missing value"
            )))
        }
    };

    if !value.is_finite() {
        return Err(TrainerError::Dataset(format!(
            "line {line}, column {column}: value {value} is not finite"
        )));
    }
    Ok(value)
}
