//! CSV-based parameter loader
//!
//! Reads the semicolon-delimited parameter file published for each projection
//! round. One row per parameter, one value column per round (`raming_2022`,
//! `raming_2025`, ...), decimals written with a comma.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use super::snapshot::ParameterSnapshot;
use crate::error::{ProjectionError, Result};

/// Default location of the parameter file
pub const DEFAULT_PARAMETER_PATH: &str = "data/parameters/raming_2025.csv";

/// Column holding the parameter names
pub const NAME_COLUMN: &str = "Variabele";

/// Which column to read and which rows to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Value column, e.g. `raming_2025`
    pub value_column: String,
    /// Column used for row filtering, e.g. `Categorie2`
    pub category_column: String,
    /// Keep only rows whose category column equals this value
    pub category: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            value_column: "raming_2025".to_string(),
            category_column: "Categorie2".to_string(),
            category: Some("Huisarts".to_string()),
        }
    }
}

/// Load a parameter snapshot from a file on disk
pub fn load_snapshot(path: &Path, options: &LoadOptions) -> Result<ParameterSnapshot> {
    debug!("Loading parameters from {}", path.display());
    let file = File::open(path)?;
    load_snapshot_from_reader(file, options)
}

/// Load a parameter snapshot from any reader producing the CSV text
pub fn load_snapshot_from_reader<R: Read>(input: R, options: &LoadOptions) -> Result<ParameterSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let column_index = |column: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ProjectionError::MissingColumn { column: column.to_string() })
    };

    let name_idx = column_index(NAME_COLUMN)?;
    let value_idx = column_index(&options.value_column)?;
    let category_idx = match options.category {
        Some(_) => Some(column_index(&options.category_column)?),
        None => None,
    };

    let mut values = HashMap::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;
        let name = record.get(name_idx).unwrap_or("");
        if name.is_empty() {
            continue;
        }

        if let (Some(idx), Some(wanted)) = (category_idx, options.category.as_deref()) {
            if record.get(idx).unwrap_or("") != wanted {
                continue;
            }
        }

        let raw = record.get(value_idx).unwrap_or("");
        if raw.is_empty() {
            debug!("Parameter {} has no value in {}, skipping", name, options.value_column);
            skipped += 1;
            continue;
        }

        let value = parse_decimal(raw).ok_or_else(|| ProjectionError::MalformedValue {
            name: name.to_string(),
            raw: raw.to_string(),
        })?;

        if values.contains_key(name) {
            warn!("Duplicate parameter {} in {}, keeping first value", name, options.value_column);
            continue;
        }
        values.insert(name.to_string(), value);
    }

    debug!(
        "Loaded {} parameters from column {} ({} empty cells skipped)",
        values.len(),
        options.value_column,
        skipped
    );

    let snapshot = ParameterSnapshot::new(values);
    if snapshot.is_empty() {
        warn!(
            "No parameters read from column {} (category filter {:?})",
            options.value_column, options.category
        );
    }
    Ok(snapshot)
}

/// Load from `path` when given, otherwise use the built-in 2025 parameters
pub fn load_or_reference(path: Option<&Path>, options: &LoadOptions) -> Result<ParameterSnapshot> {
    match path {
        Some(path) => load_snapshot(path, options),
        None => {
            debug!("No parameter file given, using built-in 2025 parameters");
            Ok(ParameterSnapshot::reference_2025())
        }
    }
}

/// Parse a number written with either a comma or a dot as decimal separator
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalised = raw.trim().replace(',', ".");
    normalised.parse::<f64>().ok().filter(|v| v.is_finite())
}
