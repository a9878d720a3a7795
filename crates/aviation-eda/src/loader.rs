//! Record set loader.
//!
//! Reads a delimited file with a header row into a Polars [`DataFrame`] of
//! text columns. Two tolerances are built in:
//!
//! - the file may be in a legacy single-byte encoding: when the bytes are not
//!   valid UTF-8 the whole file is decoded as windows-1252 (the superset of
//!   ISO-8859-1 that `encoding_rs` uses for that label);
//! - rows whose field count differs from the header are skipped and counted
//!   instead of aborting the load.
//!
//! Cells that are empty after trimming are stored as absent values. Type
//! coercion happens later, in the cleaning stage, against the declared schema.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::types::LoadSummary;
use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Cell values read as absent, on top of empty cells.
pub const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Text encoding the input was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEncoding {
    Utf8,
    /// windows-1252 / ISO-8859-1
    Latin1,
}

impl SourceEncoding {
    /// Pick the encoding for a whole file.
    pub fn detect(bytes: &[u8]) -> Self {
        if std::str::from_utf8(bytes).is_ok() {
            Self::Utf8
        } else {
            Self::Latin1
        }
    }

    /// Decode one field.
    pub fn decode(&self, field: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(field).into_owned(),
            Self::Latin1 => WINDOWS_1252
                .decode_without_bom_handling(field)
                .0
                .into_owned(),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf-8"),
            Self::Latin1 => f.write_str("windows-1252"),
        }
    }
}

/// A freshly loaded table and what happened while reading it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub frame: DataFrame,
    pub summary: LoadSummary,
}

impl LoadedTable {
    /// Wrap a table that did not come from a file (nothing skipped).
    pub fn from_frame(frame: DataFrame) -> Self {
        let summary = LoadSummary {
            rows_read: frame.height(),
            rows_skipped: 0,
            columns: frame.width(),
            encoding: SourceEncoding::Utf8,
        };
        Self { frame, summary }
    }
}

/// Tolerant CSV reader for the accident export.
#[derive(Debug, Clone)]
pub struct RecordLoader {
    delimiter: u8,
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl RecordLoader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.delimiter)
    }

    /// Read and parse a file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedTable> {
        let path = path.as_ref();
        info!("Loading records from: {}", path.display());
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes)
    }

    /// Parse an in-memory file.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedTable> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let encoding = SourceEncoding::detect(bytes);
        debug!("Decoding input as {}", encoding);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let header = reader.byte_headers()?.clone();
        if header.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let names = unique_names(
            header
                .iter()
                .map(|field| encoding.decode(field).trim().to_string()),
        );
        let width = names.len();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        let mut record = csv::ByteRecord::new();
        let mut rows_read = 0usize;
        let mut rows_skipped = 0usize;

        loop {
            match reader.read_byte_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    rows_read += 1;
                    if record.len() != width {
                        rows_skipped += 1;
                        debug!(
                            "Skipping row at line {}: {} fields, expected {}",
                            record.position().map(|p| p.line()).unwrap_or(0),
                            record.len(),
                            width
                        );
                        continue;
                    }
                    for (column, field) in cells.iter_mut().zip(record.iter()) {
                        column.push(cell_value(field, encoding));
                    }
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    rows_read += 1;
                    rows_skipped += 1;
                    debug!("Skipping unreadable row: {}", e);
                }
            }
        }

        if rows_skipped > 0 {
            warn!(
                "Skipped {} malformed rows out of {}",
                rows_skipped, rows_read
            );
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name.as_str().into(), values))
            .collect();
        let frame = DataFrame::new(columns)?;

        info!(
            "Loaded {} records x {} columns ({} skipped)",
            frame.height(),
            frame.width(),
            rows_skipped
        );

        Ok(LoadedTable {
            frame,
            summary: LoadSummary {
                rows_read,
                rows_skipped,
                columns: width,
                encoding,
            },
        })
    }
}

/// Header names with repeats renamed `name.1`, `name.2`, ...; blank names
/// become `Unnamed: <index>`.
fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for (index, name) in names.enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }
        if suffix > 0 {
            warn!("Duplicate column '{}' renamed to '{}'", base, candidate);
        }

        seen.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}

fn cell_value(field: &[u8], encoding: SourceEncoding) -> Option<String> {
    let value = encoding.decode(field);
    let trimmed = value.trim();
    if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
