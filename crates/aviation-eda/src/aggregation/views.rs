//! The chart views computed over a cleaned record set.

use super::counts::{Counts, count_by};
use super::crosstab::{CrossTab, cross_tabulate};
use super::timeline::{YearCounts, count_by_year};
use crate::derive::SeverityBucket;
use crate::error::Result;
use crate::schema::ColumnRole;
use crate::types::{RecordSet, SEVERITY_COLUMN};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// All aggregations behind the charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisViews {
    pub accidents_per_year: YearCounts,
    pub top_manufacturers: Counts,
    /// Aircraft category by severity bucket
    pub severity_by_category: CrossTab,
    pub top_locations: Counts,
    pub top_injury_severities: Counts,
    /// Every injury-severity value with its count, absent ones in `missing`
    pub injury_severity_distribution: Counts,
}

impl AnalysisViews {
    /// Compute every view. Requires the derived `year` and `severity` columns.
    pub fn compute(records: &RecordSet, top_n: usize) -> Result<Self> {
        info!("Computing aggregations over {} records...", records.height());

        let schema = records.schema();
        let make = schema.column_name(ColumnRole::Make)?;
        let category = schema.column_name(ColumnRole::AircraftCategory)?;
        let location = schema.column_name(ColumnRole::Location)?;
        let injury = schema.column_name(ColumnRole::InjurySeverity)?;

        for role in [
            ColumnRole::Make,
            ColumnRole::AircraftCategory,
            ColumnRole::Location,
            ColumnRole::InjurySeverity,
        ] {
            records.role_column(role)?;
        }

        let accidents_per_year = count_by_year(records)?;
        debug!(
            "accidents per year: {} distinct years",
            accidents_per_year.entries.len()
        );

        let top_manufacturers = count_by(records, make)?.top_n(top_n);

        let domain: Vec<&str> = SeverityBucket::ALL.iter().map(|b| b.label()).collect();
        let severity_by_category = cross_tabulate(records, category, SEVERITY_COLUMN, &domain)?;
        debug!(
            "severity by category: {} categories, {} records excluded",
            severity_by_category.rows.len(),
            severity_by_category.excluded
        );

        let top_locations = count_by(records, location)?.top_n(top_n);

        let injury_severity_distribution = count_by(records, injury)?;
        let top_injury_severities = injury_severity_distribution.top_n(top_n);

        Ok(Self {
            accidents_per_year,
            top_manufacturers,
            severity_by_category,
            top_locations,
            top_injury_severities,
            injury_severity_distribution,
        })
    }
}
