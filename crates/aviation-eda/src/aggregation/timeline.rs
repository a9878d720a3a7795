//! Accidents per year.

use crate::error::{AnalysisError, Result};
use crate::types::{RecordSet, YEAR_COLUMN};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Count per year, ascending by year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCounts {
    pub entries: Vec<YearCount>,
    /// Records without a year
    pub missing: usize,
}

impl YearCounts {
    /// Group an Int32 year series, ascending by year.
    pub fn from_series(years: &Series) -> Result<Self> {
        let missing = years.null_count();
        let years = years.clone().with_name(YEAR_COLUMN.into());

        let grouped = DataFrame::new(vec![years.into()])?
            .lazy()
            .filter(col(YEAR_COLUMN).is_not_null())
            .group_by([col(YEAR_COLUMN)])
            .agg([len().cast(DataType::UInt64).alias("count")])
            .sort([YEAR_COLUMN], SortMultipleOptions::default())
            .collect()?;

        let years = grouped.column(YEAR_COLUMN)?.as_materialized_series();
        let counts = grouped.column("count")?.as_materialized_series();
        let entries = years
            .i32()?
            .into_iter()
            .zip(counts.u64()?.into_iter())
            .filter_map(|(year, count)| {
                Some(YearCount {
                    year: year?,
                    count: count? as usize,
                })
            })
            .collect();

        Ok(Self { entries, missing })
    }

    pub fn get(&self, year: i32) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.year == year)
            .map(|e| e.count)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// First and last year with at least one record.
    pub fn span(&self) -> Option<(i32, i32)> {
        Some((self.entries.first()?.year, self.entries.last()?.year))
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let years: Vec<i32> = self.entries.iter().map(|e| e.year).collect();
        let counts: Vec<u64> = self.entries.iter().map(|e| e.count as u64).collect();

        Ok(DataFrame::new(vec![
            Column::new(YEAR_COLUMN.into(), years),
            Column::new("count".into(), counts),
        ])?)
    }
}

/// Count records per derived year.
///
/// Fails with [`AnalysisError::ColumnNotFound`] when the year has not been
/// derived.
pub fn count_by_year(records: &RecordSet) -> Result<YearCounts> {
    let years = records.column(YEAR_COLUMN)?;
    let years = match years.dtype() {
        DataType::Int32 => years.clone(),
        dtype if crate::utils::is_numeric_dtype(dtype) => years.cast(&DataType::Int32)?,
        dtype => {
            return Err(AnalysisError::UnexpectedType {
                column: YEAR_COLUMN.to_string(),
                expected: "Int32".to_string(),
                found: dtype.to_string(),
            });
        }
    };

    YearCounts::from_series(&years)
}
