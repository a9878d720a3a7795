//! Statistical imputation methods.
//!
//! Provides mean and mode imputation. The fill value is always computed from
//! the values present before any replacement.

use crate::error::{AnalysisError, Result};
use crate::schema::{ColumnSpec, Imputation};
use crate::types::{ImputationRecord, RecordSet};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, string_mode};
use polars::prelude::*;
use tracing::{debug, info};

/// Statistical imputation methods for filling missing values.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply every imputation policy declared in the record set's schema.
    ///
    /// After this call the imputed columns contain no absent values. A column
    /// with no present values at all cannot be filled and is an error.
    pub fn impute(&self, records: &RecordSet) -> Result<(RecordSet, Vec<ImputationRecord>)> {
        info!("Imputing missing values...");

        let specs: Vec<ColumnSpec> = records.schema().imputed_columns().cloned().collect();
        let mut current = records.clone();
        let mut applied = Vec::with_capacity(specs.len());

        for spec in &specs {
            let series = current.role_column(spec.role)?;
            let missing = series.null_count();

            let (filled, fill_value) = match spec.imputation {
                Imputation::Mean => {
                    let (filled, mean) = Self::apply_numeric_mean(series)?;
                    (filled, format!("{:.4}", mean))
                }
                Imputation::Mode => Self::apply_mode(series)?,
                Imputation::None => continue,
            };

            debug!(
                "Filled {} absent values in '{}' with {:?}: {}",
                missing, spec.name, spec.imputation, fill_value
            );

            applied.push(ImputationRecord {
                column: spec.name.clone(),
                strategy: spec.imputation,
                fill_value,
                filled: missing,
            });

            current = current.replace_column(filled)?;
        }

        Ok((current, applied))
    }

    /// Fill a numeric column with the mean of its present values.
    ///
    /// Returns the filled series and the mean used.
    pub fn apply_numeric_mean(series: &Series) -> Result<(Series, f64)> {
        let name = series.name().to_string();
        let numeric = match series.dtype() {
            DataType::Float64 => series.clone(),
            dtype if crate::utils::is_numeric_dtype(dtype) => series.cast(&DataType::Float64)?,
            dtype => {
                return Err(AnalysisError::UnexpectedType {
                    column: name,
                    expected: "Float64".to_string(),
                    found: dtype.to_string(),
                });
            }
        };

        let mean = numeric
            .mean()
            .filter(|m| !m.is_nan())
            .ok_or(AnalysisError::NoValidValues(name))?;
        let filled = fill_numeric_nulls(&numeric, mean)?;
        Ok((filled, mean))
    }

    /// Fill a categorical column with its most frequent present value.
    ///
    /// Returns the filled series and the mode used.
    pub fn apply_mode(series: &Series) -> Result<(Series, String)> {
        let name = series.name().to_string();
        if !matches!(series.dtype(), DataType::String) {
            return Err(AnalysisError::UnexpectedType {
                column: name,
                expected: "String".to_string(),
                found: series.dtype().to_string(),
            });
        }

        let mode = string_mode(series)?.ok_or(AnalysisError::NoValidValues(name))?;
        let filled = fill_string_nulls(series, &mode)?;
        Ok((filled, mode))
    }
}
