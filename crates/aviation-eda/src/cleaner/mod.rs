//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Dropping columns known to be unreliable or redundant
//! - Coercing declared numeric columns to `Float64`

mod type_coercion;

pub use type_coercion::TypeCoercer;

use crate::error::Result;
use crate::types::RecordSet;
use tracing::{debug, info};

/// Data cleaner for the column-removal step.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// Remove the named columns.
    ///
    /// A name that is not in the record set is skipped silently; the returned
    /// list contains only the columns that were actually removed.
    pub fn drop_columns(
        &self,
        records: &RecordSet,
        columns: &[String],
    ) -> Result<(RecordSet, Vec<String>)> {
        info!("Dropping unreliable columns...");

        let (cleaned, removed) = records.without_columns(columns)?;

        for name in columns {
            if removed.contains(name) {
                debug!("Dropped column '{}'", name);
            } else {
                debug!("Column '{}' not present, nothing to drop", name);
            }
        }

        Ok((cleaned, removed))
    }
}
