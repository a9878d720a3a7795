//! Aviation Accident Analysis Library
//!
//! Exploratory analysis of an aviation accident dataset, built with Rust and
//! Polars.
//!
//! # Overview
//!
//! - **Loading**: tolerant delimited-text reader (legacy encodings, ragged rows)
//! - **Schema**: declared column roles, kinds and imputation policies, checked once
//! - **Cleaning**: column removal and numeric type coercion
//! - **Imputation**: mean for numeric columns, mode for categorical ones
//! - **Derivation**: event year and a fatality-based severity bucket
//! - **Aggregation**: counts, top-N, accidents per year, category × severity cross-tab
//! - **Reporting**: JSON report, CSV export of every view, terminal summary
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use aviation_eda::{AnalysisConfig, Pipeline};
//!
//! let config = AnalysisConfig::builder().top_n(10).build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("AviationData.csv")?;
//!
//! for entry in &outcome.views.accidents_per_year.entries {
//!     println!("{}: {}", entry.year, entry.count);
//! }
//! ```
//!
//! # Configuration
//!
//! [`AnalysisConfig`] can also be read from a JSON file; missing fields keep
//! their defaults:
//!
//! ```json
//! {
//!   "top_n": 5,
//!   "drop_columns": ["Aircraft.damage"],
//!   "severity_bins": { "edges": [0, 1, 5, 100] }
//! }
//! ```

pub mod aggregation;
pub mod cleaner;
pub mod config;
pub mod derive;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregation::{AnalysisViews, CountEntry, Counts, CrossTab, YearCount, YearCounts};
pub use cleaner::{DataCleaner, TypeCoercer};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use derive::{Deriver, SeverityBins, SeverityBucket};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use loader::{LoadedTable, RecordLoader, SourceEncoding};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::{ColumnProfile, DataProfiler, NumericSummary};
pub use reporting::{AnalysisReport, ReportGenerator, RunSummary};
pub use schema::{ColumnKind, ColumnRole, ColumnSpec, DatasetSchema, Imputation};
pub use types::{
    AnalysisOutcome, DerivationSummary, ImputationRecord, LoadSummary, RecordSet,
    SEVERITY_COLUMN, YEAR_COLUMN,
};
