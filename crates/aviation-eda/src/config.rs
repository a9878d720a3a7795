//! Configuration types for the analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. The defaults describe the NTSB
//! aviation accident export; a JSON file with the same shape can override any
//! field (missing fields keep their defaults).

use crate::derive::SeverityBins;
use crate::error::{AnalysisError, Result};
use crate::schema::{ColumnKind, ColumnRole, DatasetSchema, Imputation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Columns dropped before cleaning: too sparse or irrelevant to the analysis.
pub const DEFAULT_DROP_COLUMNS: [&str; 2] = ["Aircraft.damage", "Registration.Number"];

/// Date layouts tried, in order, when deriving the event year.
pub const DEFAULT_DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
];

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use aviation_eda::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .top_n(5)
///     .drop_column("Publication.Date")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Declared columns, their kinds and imputation policies.
    pub schema: DatasetSchema,

    /// Columns removed before imputation. Absent columns are ignored.
    /// Default: `Aircraft.damage`, `Registration.Number`
    pub drop_columns: Vec<String>,

    /// Number of entries kept in the top-N views.
    /// Default: 10
    pub top_n: usize,

    /// Fatality bin edges for the severity bucket.
    /// Default: 0, 1, 5, 100
    pub severity_bins: SeverityBins,

    /// `chrono` formats tried in order when parsing the event date.
    pub date_formats: Vec<String>,

    /// Field delimiter of the input file.
    /// Default: b','
    pub delimiter: u8,

    /// Output directory for the JSON report and exported views.
    /// Default: "outputs"
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema: DatasetSchema::ntsb(),
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|s| s.to_string()).collect(),
            top_n: 10,
            severity_bins: SeverityBins::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            delimiter: b',',
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        self.schema.validate()?;

        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n));
        }

        self.severity_bins.validate()?;

        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r' | b'"') {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        if let Some(column) = self
            .drop_columns
            .iter()
            .find(|name| self.schema.columns.iter().any(|c| &c.name == *name))
        {
            return Err(ConfigValidationError::DropsDeclaredColumn(column.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid top-N: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("Invalid severity bins: {0}")]
    InvalidSeverityBins(String),

    #[error("At least one date format is required")]
    NoDateFormats,

    #[error("Invalid delimiter byte: {0:#04x}")]
    InvalidDelimiter(u8),

    #[error("Empty column name declared for {0}")]
    EmptyColumnName(ColumnRole),

    #[error("Role {0} is declared more than once")]
    DuplicateRole(ColumnRole),

    #[error("Column '{0}' is declared more than once")]
    DuplicateColumn(String),

    #[error("No column declared for {0}")]
    UndeclaredRole(ColumnRole),

    #[error("Imputation {imputation:?} cannot be applied to {kind:?} column '{column}'")]
    IncompatibleImputation {
        column: String,
        kind: ColumnKind,
        imputation: Imputation,
    },

    #[error("Column '{0}' is both declared in the schema and listed for removal")]
    DropsDeclaredColumn(String),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    schema: Option<DatasetSchema>,
    drop_columns: Option<Vec<String>>,
    top_n: Option<usize>,
    severity_bins: Option<SeverityBins>,
    date_formats: Option<Vec<String>>,
    delimiter: Option<u8>,
    output_dir: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Replace the declared schema.
    pub fn schema(mut self, schema: DatasetSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replace the list of columns to drop.
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Add one column to the drop list (on top of the defaults).
    pub fn drop_column(mut self, column: impl Into<String>) -> Self {
        self.drop_columns
            .get_or_insert_with(|| DEFAULT_DROP_COLUMNS.iter().map(|s| s.to_string()).collect())
            .push(column.into());
        self
    }

    /// Set the number of entries in the top-N views.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the fatality bin edges for the severity bucket.
    pub fn severity_bins(mut self, bins: SeverityBins) -> Self {
        self.severity_bins = Some(bins);
        self
    }

    /// Replace the date formats tried when deriving the year.
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Set the input field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the output directory for reports and exported views.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            schema: self.schema.unwrap_or(defaults.schema),
            drop_columns: self.drop_columns.unwrap_or(defaults.drop_columns),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            severity_bins: self.severity_bins.unwrap_or(defaults.severity_bins),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.delimiter, b',');
        assert_eq!(
            config.drop_columns,
            vec!["Aircraft.damage".to_string(), "Registration.Number".to_string()]
        );
        assert_eq!(config.severity_bins.edges, [0.0, 1.0, 5.0, 100.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .top_n(3)
            .delimiter(b';')
            .drop_column("Publication.Date")
            .output_dir("custom")
            .build()
            .unwrap();

        assert_eq!(config.top_n, 3);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.drop_columns.len(), 3);
        assert_eq!(config.drop_columns[2], "Publication.Date");
        assert_eq!(config.output_dir, PathBuf::from("custom"));
    }

    #[test]
    fn test_validation_invalid_top_n() {
        let result = AnalysisConfig::builder().top_n(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidTopN(0)
        ));
    }

    #[test]
    fn test_validation_rejects_dropping_declared_column() {
        let result = AnalysisConfig::builder().drop_column("Make").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DropsDeclaredColumn(name) if name == "Make"
        ));
    }

    #[test]
    fn test_validation_invalid_bins() {
        let result = AnalysisConfig::builder()
            .severity_bins(SeverityBins {
                edges: [0.0, 5.0, 1.0, 100.0],
            })
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSeverityBins(_)
        ));
    }

    #[test]
    fn test_validation_empty_date_formats() {
        let result = AnalysisConfig::builder()
            .date_formats(Vec::<String>::new())
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::NoDateFormats
        ));
    }

    #[test]
    fn test_partial_config_from_json_keeps_defaults() {
        let json = r#"{ "top_n": 5, "output_dir": "charts" }"#;

        let config: AnalysisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.top_n, 5);
        assert_eq!(config.output_dir.to_str().unwrap(), "charts");
        assert_eq!(config.schema, DatasetSchema::ntsb());
        assert_eq!(config.drop_columns.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AnalysisConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.top_n, deserialized.top_n);
        assert_eq!(config.schema, deserialized.schema);
        assert_eq!(config.severity_bins, deserialized.severity_bins);
    }
}
