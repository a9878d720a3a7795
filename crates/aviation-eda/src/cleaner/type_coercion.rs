//! Type coercion against the declared schema.
//!
//! The loader keeps every cell as text. Columns declared
//! [`ColumnKind::Numeric`] are cast to `Float64` here; cells that do not parse
//! as a number become absent and are counted. Other kinds are left as text.

use crate::error::{AnalysisError, Result, ResultExt};
use crate::schema::ColumnKind;
use crate::types::RecordSet;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Casts declared numeric columns to `Float64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeCoercer;

impl TypeCoercer {
    /// Coerce every numeric column of the schema.
    ///
    /// Returns the new record set and one processing step per coerced column.
    pub fn coerce(&self, records: &RecordSet) -> Result<(RecordSet, Vec<String>)> {
        info!("Coercing declared column types...");

        let mut current = records.clone();
        let mut steps = Vec::new();

        let numeric_roles: Vec<_> = records
            .schema()
            .columns_of_kind(ColumnKind::Numeric)
            .map(|c| c.role)
            .collect();

        for role in numeric_roles {
            let series = current.role_column(role)?;
            let name = series.name().to_string();

            if matches!(series.dtype(), DataType::Float64) {
                debug!("'{}' is already Float64", name);
                let cleaned = nan_to_null(series)?;
                if cleaned.null_count() > series.null_count() {
                    current = current.replace_column(cleaned)?;
                }
                continue;
            }

            if !is_numeric_dtype(series.dtype()) && !matches!(series.dtype(), DataType::String) {
                return Err(AnalysisError::UnexpectedType {
                    column: name,
                    expected: "numeric or text".to_string(),
                    found: series.dtype().to_string(),
                });
            }

            let nulls_before = series.null_count();
            let converted = series
                .cast(&DataType::Float64)
                .context(format!("Casting '{}' to Float64", name))?;
            let converted = nan_to_null(&converted)?;
            let unparseable = converted.null_count().saturating_sub(nulls_before);

            if unparseable > 0 {
                warn!(
                    "'{}': {} values could not be parsed as numbers and are treated as absent",
                    name, unparseable
                );
                steps.push(format!(
                    "Converted '{}' to numeric ({} unparseable values set to absent)",
                    name, unparseable
                ));
            } else {
                steps.push(format!("Converted '{}' to numeric", name));
            }

            current = current.replace_column(converted)?;
        }

        Ok((current, steps))
    }
}

/// Replace NaN with null so a `NaN` cell counts as absent.
fn nan_to_null(series: &Series) -> Result<Series> {
    let values: Float64Chunked = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values.with_name(series.name().clone()).into_series())
}
