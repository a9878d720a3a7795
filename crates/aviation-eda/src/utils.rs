//! Shared utilities for the analysis pipeline.
//!
//! Series helpers used by the imputation, derivation and aggregation stages.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// View a Series as text, casting when it is not already a String column.
pub fn as_string_series(series: &Series) -> PolarsResult<Series> {
    if matches!(series.dtype(), DataType::String) {
        Ok(series.clone())
    } else {
        series.cast(&DataType::String)
    }
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent present value of a String Series.
///
/// Ties go to the value that appears first in row order, so the result does
/// not depend on hash ordering.
pub fn string_mode(series: &Series) -> PolarsResult<Option<String>> {
    let ca = series.str()?;

    // value -> (count, first row index)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, value) in ca.into_iter().enumerate() {
        if let Some(value) = value {
            counts.entry(value).or_insert((0, idx)).0 += 1;
        }
    }

    Ok(counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string()))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a Float64 Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a String Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<&str> = series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
