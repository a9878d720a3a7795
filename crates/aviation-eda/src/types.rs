//! Core data types shared by the pipeline stages.
//!
//! The central type is [`RecordSet`]: the accident table together with the
//! schema it was validated against and the registry of derived columns. Every
//! stage takes a `&RecordSet` and returns a new one; nothing is mutated in
//! place.

use crate::aggregation::AnalysisViews;
use crate::error::{AnalysisError, Result};
use crate::loader::SourceEncoding;
use crate::profiler::ColumnProfile;
use crate::schema::{ColumnRole, DatasetSchema, Imputation};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the derived event-year column.
pub const YEAR_COLUMN: &str = "year";

/// Name of the derived severity-bucket column.
pub const SEVERITY_COLUMN: &str = "severity";

/// A column computed from another column of the record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedColumn {
    pub name: String,
    /// Column the values were computed from
    pub source: String,
}

/// The in-memory accident table plus its schema.
#[derive(Debug, Clone)]
pub struct RecordSet {
    frame: DataFrame,
    schema: DatasetSchema,
    derived: Vec<DerivedColumn>,
}

// Aggregations only read the record set, so it can be shared across threads.
static_assertions::assert_impl_all!(RecordSet: Send, Sync);

impl RecordSet {
    /// Wrap a table. The caller is responsible for checking the schema first.
    pub fn new(frame: DataFrame, schema: DatasetSchema) -> Self {
        Self {
            frame,
            schema,
            derived: Vec::new(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    /// Number of records.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns, derived ones included.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Look up the column declared for a role.
    ///
    /// A missing column is reported with both its name and its role, since it
    /// means the data no longer matches the declared schema.
    pub fn role_column(&self, role: ColumnRole) -> Result<&Series> {
        let name = self.schema.column_name(role)?;
        self.frame
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| AnalysisError::missing_column(name, role))
    }

    pub fn derived_columns(&self) -> &[DerivedColumn] {
        &self.derived
    }

    pub fn is_derived(&self, name: &str) -> bool {
        self.derived.iter().any(|d| d.name == name)
    }

    /// Return a copy with an existing column replaced by `series` (matched by name).
    ///
    /// Every derived column computed from the replaced column is removed, so
    /// stale derived values can never reach an aggregation. They have to be
    /// derived again from the new values.
    pub fn replace_column(&self, series: Series) -> Result<RecordSet> {
        let name = series.name().to_string();
        if !self.has_column(&name) {
            return Err(AnalysisError::ColumnNotFound(name));
        }

        let mut frame = self.frame.clone();
        frame.with_column(series)?;

        let (stale, derived): (Vec<DerivedColumn>, Vec<DerivedColumn>) = self
            .derived
            .iter()
            .cloned()
            .partition(|d| d.source == name);

        for column in &stale {
            debug!(
                "Invalidating derived column '{}' (source '{}' replaced)",
                column.name, name
            );
            frame = frame.drop(&column.name)?;
        }

        Ok(RecordSet {
            frame,
            schema: self.schema.clone(),
            derived,
        })
    }

    /// Return a copy with `series` added (or recomputed) as a derived column of `source`.
    pub fn with_derived(&self, series: Series, source: &str) -> Result<RecordSet> {
        if !self.has_column(source) {
            return Err(AnalysisError::ColumnNotFound(source.to_string()));
        }

        let name = series.name().to_string();
        let mut frame = self.frame.clone();
        frame.with_column(series)?;

        let mut derived: Vec<DerivedColumn> = self
            .derived
            .iter()
            .filter(|d| d.name != name)
            .cloned()
            .collect();
        derived.push(DerivedColumn {
            name,
            source: source.to_string(),
        });

        Ok(RecordSet {
            frame,
            schema: self.schema.clone(),
            derived,
        })
    }

    /// Return a copy without the named columns. Names not present are ignored.
    ///
    /// Returns the names that were actually removed.
    pub fn without_columns(&self, names: &[String]) -> Result<(RecordSet, Vec<String>)> {
        let present: Vec<String> = names
            .iter()
            .filter(|name| self.has_column(name))
            .cloned()
            .collect();

        let mut frame = self.frame.clone();
        for name in &present {
            frame = frame.drop(name)?;
        }

        let derived = self
            .derived
            .iter()
            .filter(|d| !present.contains(&d.name) && !present.contains(&d.source))
            .cloned()
            .collect();

        Ok((
            RecordSet {
                frame,
                schema: self.schema.clone(),
                derived,
            },
            present,
        ))
    }
}

/// Outcome of reading the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Data rows seen after the header
    pub rows_read: usize,
    /// Rows discarded because their field count did not match the header
    pub rows_skipped: usize,
    /// Columns in the header
    pub columns: usize,
    pub encoding: SourceEncoding,
}

impl LoadSummary {
    /// Rows that made it into the record set.
    pub fn rows_loaded(&self) -> usize {
        self.rows_read - self.rows_skipped
    }
}

/// One column filled by the imputation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub strategy: Imputation,
    /// Value written into the absent cells, formatted for display
    pub fill_value: String,
    /// Number of cells that were absent and got filled
    pub filled: usize,
}

/// Bookkeeping from the derivation stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationSummary {
    /// Records whose event date was absent
    pub missing_dates: usize,
    /// Records whose event date was present but did not parse
    pub unparseable_dates: usize,
    /// Records whose fatality count fell outside every severity bin
    pub unbucketed: usize,
    /// Names of the columns that were derived
    pub derived_columns: Vec<String>,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Cleaned record set with derived columns, read-only from here on
    pub records: RecordSet,
    pub load: LoadSummary,
    /// Columns removed by the cleaning stage
    pub dropped_columns: Vec<String>,
    pub imputations: Vec<ImputationRecord>,
    pub derivation: DerivationSummary,
    /// Column profiles of the table as loaded (after type coercion)
    pub profile_before: Vec<ColumnProfile>,
    /// Column profiles of the final table
    pub profile_after: Vec<ColumnProfile>,
    pub views: AnalysisViews,
    /// Human-readable log of what each stage did
    pub processing_steps: Vec<String>,
    pub duration_ms: u64,
}
