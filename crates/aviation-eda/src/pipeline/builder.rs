//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the load, clean, derive and aggregate workflow.

use crate::aggregation::AnalysisViews;
use crate::cleaner::{DataCleaner, TypeCoercer};
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::derive::Deriver;
use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::loader::{LoadedTable, RecordLoader};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{ColumnProfile, DataProfiler};
use crate::types::{AnalysisOutcome, RecordSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The main analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use aviation_eda::{AnalysisConfig, Pipeline};
///
/// let outcome = Pipeline::builder()
///     .config(AnalysisConfig::builder().top_n(5).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run("AviationData.csv")?;
///
/// for entry in &outcome.views.top_manufacturers.entries {
///     println!("{}: {}", entry.key, entry.count);
/// }
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: RecordLoader,
    cleaner: DataCleaner,
    coercer: TypeCoercer,
    imputer: StatisticalImputer,
    deriver: Deriver,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load a file and run every stage on it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();
        let result = self
            .load(path.as_ref())
            .and_then(|table| self.process_internal(table, start_time));
        self.finish(result)
    }

    /// Run every stage on an already loaded table.
    pub fn process(&self, table: LoadedTable) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();
        let result = self.process_internal(table, start_time);
        self.finish(result)
    }

    /// Validate and profile a loaded table without cleaning or aggregating it.
    ///
    /// The profile is taken after type coercion, the same point as
    /// [`AnalysisOutcome::profile_before`].
    pub fn inspect(&self, table: LoadedTable) -> Result<Vec<ColumnProfile>> {
        let records = self.validate(table)?;
        let (records, _) = self.coercer.coerce(&records)?;
        DataProfiler::profile(records.frame())
    }

    /// Read the input file with the configured delimiter.
    pub fn load(&self, path: &Path) -> Result<LoadedTable> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}...", path.display()),
        ));

        let table = self.loader.load_path(path)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!(
                "Loaded {} rows ({} skipped)",
                table.summary.rows_loaded(),
                table.summary.rows_skipped
            ),
        ));

        Ok(table)
    }

    /// Check the table against the declared schema and wrap it.
    pub fn validate(&self, table: LoadedTable) -> Result<RecordSet> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Validating,
            0.0,
            "Checking required columns...",
        ));

        let names: Vec<String> = table
            .frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.config
            .schema
            .check_columns(names.iter().map(String::as_str))?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Validating,
            1.0,
            "All required columns present",
        ));

        Ok(RecordSet::new(table.frame, self.config.schema.clone()))
    }

    /// Report completion or failure, passing the result through.
    fn finish(&self, result: Result<AnalysisOutcome>) -> Result<AnalysisOutcome> {
        match result {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, table: LoadedTable, start_time: Instant) -> Result<AnalysisOutcome> {
        info!("Starting analysis pipeline...");

        let load = table.summary.clone();
        let mut processing_steps: Vec<String> = vec![format!(
            "Loaded {} rows and {} columns ({}), skipped {} malformed rows",
            load.rows_loaded(),
            load.columns,
            load.encoding,
            load.rows_skipped
        )];

        // Step 1: Schema validation
        let records = self.validate(table)?;

        // Step 2: Type coercion, profile, column removal
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Coercing column types...",
        ));
        info!("Step 2: Cleaning...");

        let (records, coercion_steps) = self.coercer.coerce(&records)?;
        processing_steps.extend(coercion_steps);

        let profile_before = DataProfiler::profile(records.frame())?;
        debug!(
            "{} absent cells before cleaning",
            DataProfiler::total_nulls(&profile_before)
        );

        let (records, dropped_columns) = self
            .cleaner
            .drop_columns(&records, &self.config.drop_columns)?;
        if !dropped_columns.is_empty() {
            processing_steps.push(format!("Dropped columns: {}", dropped_columns.join(", ")));
        }

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!("Dropped {} columns", dropped_columns.len()),
        ));

        // Step 3: Imputation
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputation,
            0.0,
            "Imputing missing values...",
        ));
        info!("Step 3: Imputing...");

        let (records, imputations) = self.imputer.impute(&records)?;
        for record in &imputations {
            processing_steps.push(format!(
                "Filled {} absent values in '{}' with {:?} ({})",
                record.filled, record.column, record.strategy, record.fill_value
            ));
        }

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Imputation,
            1.0,
            format!("Imputed {} columns", imputations.len()),
        ));

        // Step 4: Derived columns
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Derivation,
            0.0,
            "Deriving year and severity...",
        ));
        info!("Step 4: Deriving columns...");

        let (records, derivation) = self.deriver.derive(&records)?;
        processing_steps.push(format!(
            "Derived {} ({} dates absent, {} unparseable, {} records outside every severity bin)",
            derivation.derived_columns.join(", "),
            derivation.missing_dates,
            derivation.unparseable_dates,
            derivation.unbucketed
        ));

        let profile_after = DataProfiler::profile(records.frame())?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Derivation,
            1.0,
            "Derived columns ready",
        ));

        // Step 5: Aggregation
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Aggregation,
            0.0,
            "Computing chart views...",
        ));
        info!("Step 5: Aggregating...");

        let views = AnalysisViews::compute(&records, self.config.top_n)?;
        processing_steps.push(format!(
            "Computed views over {} records (top {})",
            records.height(),
            self.config.top_n
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Aggregation,
            1.0,
            "Aggregations complete",
        ));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Analysis finished in {} ms", duration_ms);

        Ok(AnalysisOutcome {
            records,
            load,
            dropped_columns,
            imputations,
            derivation,
            profile_before,
            profile_after,
            views,
            processing_steps,
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use aviation_eda::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StageLogger;
    ///
    /// impl ProgressReporter for StageLogger {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         eprintln!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(StageLogger))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            loader: RecordLoader::from_config(&config),
            deriver: Deriver::from_config(&config),
            config,
            progress_reporter: self.progress_reporter,
            cleaner: DataCleaner,
            coercer: TypeCoercer,
            imputer: StatisticalImputer,
        })
    }
}
