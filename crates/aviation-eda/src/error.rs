//! Custom error types for the accident analysis pipeline.
//!
//! This module provides the error hierarchy using `thiserror` so every stage
//! can report a precise diagnostic (which column, which stage) to the caller.
//!
//! Errors are serializable so they can be embedded in the JSON report or
//! printed by the CLI in machine-readable form.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A column required by the declared schema is not in the dataset.
    #[error("Required column '{column}' ({role}) not found in dataset")]
    MissingColumn { column: String, role: String },

    /// A column lookup by name failed.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No present values in a column that must be imputed.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// The input file has no header row.
    #[error("Input has no header row")]
    EmptyInput,

    /// A column has a dtype the stage cannot work with.
    #[error("Column '{column}' has type {found}, expected {expected}")]
    UnexpectedType {
        column: String,
        expected: String,
        found: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// CSV reader error wrapper.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a missing schema column.
    pub fn missing_column(column: impl Into<String>, role: impl std::fmt::Display) -> Self {
        AnalysisError::MissingColumn {
            column: column.into(),
            role: role.to_string(),
        }
    }

    /// Stable error code, used in the JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::EmptyInput => "EMPTY_INPUT",
            Self::UnexpectedType { .. } => "UNEXPECTED_TYPE",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from the dataset not matching the declared schema.
    ///
    /// These are the "configuration" failures: the pipeline cannot produce a
    /// meaningful result until the schema or the input file is fixed.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::MissingColumn { .. } | Self::ColumnNotFound(_) | Self::UnexpectedType { .. } => {
                true
            }
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
