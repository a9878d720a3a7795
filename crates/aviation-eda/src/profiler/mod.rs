//! Data profiling module.
//!
//! Produces a per-column missing-value profile (null count and percentage,
//! distinct count, data type) plus descriptive statistics for numeric
//! columns. The pipeline profiles the table once before cleaning and once
//! after derivation.

mod statistics;

pub use statistics::NumericSummary;

use crate::error::Result;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub null_percentage: f64,
    /// Distinct values, absent counted as one value when present
    pub unique_count: usize,
    pub numeric: Option<NumericSummary>,
}

/// Data profiler for analyzing table structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a table, in column order.
    pub fn profile(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
        df.get_columns()
            .iter()
            .map(|col| Self::profile_column(col.as_materialized_series(), df.height()))
            .collect()
    }

    fn profile_column(series: &Series, height: usize) -> Result<ColumnProfile> {
        let null_count = series.null_count();
        let null_percentage = if height > 0 {
            (null_count as f64 / height as f64) * 100.0
        } else {
            0.0
        };

        let numeric = if is_numeric_dtype(series.dtype()) {
            NumericSummary::from_series(series)?
        } else {
            None
        };

        Ok(ColumnProfile {
            name: series.name().to_string(),
            dtype: series.dtype().to_string(),
            null_count,
            null_percentage,
            unique_count: series.n_unique()?,
            numeric,
        })
    }

    /// Total absent cells across a profile.
    pub fn total_nulls(profiles: &[ColumnProfile]) -> usize {
        profiles.iter().map(|p| p.null_count).sum()
    }
}
