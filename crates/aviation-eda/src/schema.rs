//! Declared dataset schema.
//!
//! The pipeline never looks columns up by ad-hoc strings. Each column it uses
//! is declared once here with a semantic [`ColumnRole`], the column name in
//! the input file, its [`ColumnKind`] and its [`Imputation`] policy. The
//! schema is checked against the input header before any stage runs, so a
//! renamed or missing column fails fast with a diagnostic naming it.

use crate::config::ConfigValidationError;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Semantic role of a column used by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Date of the accident, source of the `year` column
    EventDate,
    /// Aircraft manufacturer
    Make,
    /// Aircraft category (airplane, helicopter, ...)
    AircraftCategory,
    /// Injury severity classification as reported
    InjurySeverity,
    /// Total number of fatal injuries, source of the `severity` column
    TotalFatalInjuries,
    /// Weather condition (VMC/IMC/UNK)
    WeatherCondition,
    /// Location string (city, state)
    Location,
}

impl ColumnRole {
    /// Every role the pipeline needs, in schema order.
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::EventDate,
        ColumnRole::Make,
        ColumnRole::AircraftCategory,
        ColumnRole::InjurySeverity,
        ColumnRole::TotalFatalInjuries,
        ColumnRole::WeatherCondition,
        ColumnRole::Location,
    ];

    /// Returns a human-readable name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::EventDate => "event date",
            Self::Make => "aircraft make",
            Self::AircraftCategory => "aircraft category",
            Self::InjurySeverity => "injury severity",
            Self::TotalFatalInjuries => "total fatal injuries",
            Self::WeatherCondition => "weather condition",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Parsed as `Float64`; unparseable cells become absent
    Numeric,
    /// Kept as text
    Categorical,
    /// Kept as text, parsed during derivation
    Date,
}

/// Strategy for filling absent values in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Imputation {
    /// Leave absent values in place
    #[default]
    None,
    /// Arithmetic mean of the present values (numeric columns only)
    Mean,
    /// Most frequent present value (categorical columns only)
    Mode,
}

impl Imputation {
    /// Whether this policy can be applied to a column of the given kind.
    pub fn supports(&self, kind: ColumnKind) -> bool {
        match self {
            Self::None => true,
            Self::Mean => kind == ColumnKind::Numeric,
            Self::Mode => kind == ColumnKind::Categorical,
        }
    }
}

/// Declaration of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub role: ColumnRole,
    /// Column name as it appears in the input header
    pub name: String,
    pub kind: ColumnKind,
    #[serde(default)]
    pub imputation: Imputation,
}

impl ColumnSpec {
    pub fn new(role: ColumnRole, name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            role,
            name: name.into(),
            kind,
            imputation: Imputation::None,
        }
    }

    pub fn with_imputation(mut self, imputation: Imputation) -> Self {
        self.imputation = imputation;
        self
    }
}

/// The declared schema: one [`ColumnSpec`] per [`ColumnRole`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub columns: Vec<ColumnSpec>,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self::ntsb()
    }
}

impl DatasetSchema {
    /// Schema of the NTSB aviation accident export (`AviationData.csv`).
    pub fn ntsb() -> Self {
        Self {
            columns: vec![
                ColumnSpec::new(ColumnRole::EventDate, "Event.Date", ColumnKind::Date),
                ColumnSpec::new(ColumnRole::Make, "Make", ColumnKind::Categorical),
                ColumnSpec::new(
                    ColumnRole::AircraftCategory,
                    "Aircraft.Category",
                    ColumnKind::Categorical,
                ),
                ColumnSpec::new(
                    ColumnRole::InjurySeverity,
                    "Injury.Severity",
                    ColumnKind::Categorical,
                ),
                ColumnSpec::new(
                    ColumnRole::TotalFatalInjuries,
                    "Total.Fatal.Injuries",
                    ColumnKind::Numeric,
                )
                .with_imputation(Imputation::Mean),
                ColumnSpec::new(
                    ColumnRole::WeatherCondition,
                    "Weather.Condition",
                    ColumnKind::Categorical,
                )
                .with_imputation(Imputation::Mode),
                ColumnSpec::new(ColumnRole::Location, "Location", ColumnKind::Categorical),
            ],
        }
    }

    /// Look up the declaration for a role.
    pub fn spec(&self, role: ColumnRole) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.role == role)
    }

    /// Column name declared for a role.
    pub fn column_name(&self, role: ColumnRole) -> Result<&str> {
        self.spec(role)
            .map(|c| c.name.as_str())
            .ok_or_else(|| AnalysisError::InvalidConfig(format!("no column declared for {}", role)))
    }

    /// Columns with an imputation policy other than [`Imputation::None`].
    pub fn imputed_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.imputation != Imputation::None)
    }

    /// Columns of a given kind.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    /// Check the declaration itself, independent of any input file.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let mut roles = HashSet::new();
        let mut names = HashSet::new();

        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(column.role));
            }
            if !roles.insert(column.role) {
                return Err(ConfigValidationError::DuplicateRole(column.role));
            }
            if !names.insert(column.name.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn(column.name.clone()));
            }
            if !column.imputation.supports(column.kind) {
                return Err(ConfigValidationError::IncompatibleImputation {
                    column: column.name.clone(),
                    kind: column.kind,
                    imputation: column.imputation,
                });
            }
        }

        if let Some(role) = ColumnRole::ALL.iter().find(|r| !roles.contains(*r)) {
            return Err(ConfigValidationError::UndeclaredRole(*role));
        }

        Ok(())
    }

    /// Check that every declared column is present in the input header.
    ///
    /// Fails on the first declared column (in schema order) that is missing.
    pub fn check_columns<'a, I>(&self, available: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let available: HashSet<&str> = available.into_iter().collect();
        for column in &self.columns {
            if !available.contains(column.name.as_str()) {
                return Err(AnalysisError::missing_column(&column.name, column.role));
            }
        }
        Ok(())
    }
}
