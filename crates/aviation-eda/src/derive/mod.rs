//! Derived columns.
//!
//! Runs after imputation and adds two columns computed from cleaned values:
//!
//! - `year` (`Int32`) from the event date, absent when the date does not parse;
//! - `severity` (`Low`/`Medium`/`High`) from total fatal injuries, absent when
//!   the count falls outside every bin.
//!
//! Both are registered with their source column, so replacing the source
//! later drops them instead of leaving stale values behind.

mod severity;
mod year;

pub use severity::{SeverityBins, SeverityBucket};
pub use year::parse_year;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::schema::ColumnRole;
use crate::types::{DerivationSummary, RecordSet, SEVERITY_COLUMN, YEAR_COLUMN};
use crate::utils::{as_string_series, is_numeric_dtype};
use polars::prelude::*;
use tracing::{info, warn};

/// Computes the derived columns of a record set.
#[derive(Debug, Clone)]
pub struct Deriver {
    date_formats: Vec<String>,
    bins: SeverityBins,
}

impl Default for Deriver {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl Deriver {
    pub fn new(date_formats: Vec<String>, bins: SeverityBins) -> Self {
        Self { date_formats, bins }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.date_formats.clone(), config.severity_bins.clone())
    }

    /// Add `year` and `severity` to a copy of the record set.
    pub fn derive(&self, records: &RecordSet) -> Result<(RecordSet, DerivationSummary)> {
        info!("Deriving year and severity columns...");

        let mut summary = DerivationSummary::default();

        let dates = records.role_column(ColumnRole::EventDate)?;
        let date_source = dates.name().to_string();
        let years = self.derive_year(dates, &mut summary)?;

        let fatalities = records.role_column(ColumnRole::TotalFatalInjuries)?;
        let fatality_source = fatalities.name().to_string();
        let severity = self.derive_severity(fatalities, &mut summary)?;

        let derived = records
            .with_derived(years, &date_source)?
            .with_derived(severity, &fatality_source)?;

        summary.derived_columns = vec![YEAR_COLUMN.to_string(), SEVERITY_COLUMN.to_string()];

        if summary.unparseable_dates > 0 {
            warn!(
                "{} event dates could not be parsed; their year is absent",
                summary.unparseable_dates
            );
        }
        if summary.unbucketed > 0 {
            info!(
                "{} records fall outside every severity bin",
                summary.unbucketed
            );
        }

        Ok((derived, summary))
    }

    /// Build the `year` column from an event-date column.
    pub fn derive_year(&self, dates: &Series, summary: &mut DerivationSummary) -> Result<Series> {
        let text = match dates.dtype() {
            DataType::Datetime(_, _) => as_string_series(&dates.cast(&DataType::Date)?)?,
            _ => as_string_series(dates)?,
        };

        let years: Vec<Option<i32>> = text
            .str()?
            .into_iter()
            .map(|value| match value {
                None => {
                    summary.missing_dates += 1;
                    None
                }
                Some(value) => {
                    let year = parse_year(value, &self.date_formats);
                    if year.is_none() {
                        summary.unparseable_dates += 1;
                    }
                    year
                }
            })
            .collect();

        Ok(Series::new(YEAR_COLUMN.into(), years))
    }

    /// Build the `severity` column from a fatality-count column.
    pub fn derive_severity(
        &self,
        fatalities: &Series,
        summary: &mut DerivationSummary,
    ) -> Result<Series> {
        let numeric = match fatalities.dtype() {
            DataType::Float64 => fatalities.clone(),
            dtype if is_numeric_dtype(dtype) => fatalities.cast(&DataType::Float64)?,
            dtype => {
                return Err(AnalysisError::UnexpectedType {
                    column: fatalities.name().to_string(),
                    expected: "Float64".to_string(),
                    found: dtype.to_string(),
                });
            }
        };

        let buckets: Vec<Option<&'static str>> = numeric
            .f64()?
            .into_iter()
            .map(|value| {
                let bucket = value.and_then(|v| self.bins.bucket(v));
                if value.is_some() && bucket.is_none() {
                    summary.unbucketed += 1;
                }
                bucket.map(|b| b.label())
            })
            .collect();

        Ok(Series::new(SEVERITY_COLUMN.into(), buckets))
    }
}
