//! Two-key cross-tabulation.

use crate::error::Result;
use crate::types::RecordSet;
use crate::utils::as_string_series;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const ROW: &str = "row";
const COLUMN: &str = "column";

/// Rectangular count table over two key columns.
///
/// `counts[i][j]` is the number of records with row key `rows[i]` and column
/// key `columns[j]`. Every combination is present; unobserved ones are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_column: String,
    pub column_column: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub counts: Vec<Vec<usize>>,
    /// Records not counted: either key absent, or a column key outside the domain
    pub excluded: usize,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.counts[i][j])
    }

    pub fn row_total(&self, row: &str) -> Option<usize> {
        let i = self.rows.iter().position(|r| r == row)?;
        Some(self.counts[i].iter().sum())
    }

    pub fn column_total(&self, column: &str) -> Option<usize> {
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.counts.iter().map(|row| row[j]).sum())
    }

    /// Records counted in the table.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Wide table: the row key column, then one count column per column key.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(
            self.row_column.as_str().into(),
            self.rows.clone(),
        ));

        for (j, name) in self.columns.iter().enumerate() {
            let values: Vec<u64> = self.counts.iter().map(|row| row[j] as u64).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Cross-tabulate two columns of the record set.
///
/// Rows are every distinct present value of `row_column` (ascending), even
/// when none of its records has a usable column key. Columns are `domain`,
/// in the given order. Only records with both keys present are counted.
pub fn cross_tabulate(
    records: &RecordSet,
    row_column: &str,
    column_column: &str,
    domain: &[&str],
) -> Result<CrossTab> {
    let row_keys = as_string_series(records.column(row_column)?)?;
    let column_keys = as_string_series(records.column(column_column)?)?;
    let row_keys = row_keys.with_name(ROW.into());
    let column_keys = column_keys.with_name(COLUMN.into());
    let height = row_keys.len();
    let frame = DataFrame::new(vec![row_keys.into(), column_keys.into()])?;

    let distinct_rows = frame
        .clone()
        .lazy()
        .select([col(ROW).drop_nulls().unique().sort(SortOptions::default())])
        .collect()?;
    let rows: Vec<String> = distinct_rows
        .column(ROW)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    let columns: Vec<String> = domain.iter().map(|c| c.to_string()).collect();

    let grouped = frame
        .lazy()
        .filter(col(ROW).is_not_null().and(col(COLUMN).is_not_null()))
        .group_by([col(ROW), col(COLUMN)])
        .agg([len().cast(DataType::UInt64).alias("count")])
        .collect()?;

    let mut counts = vec![vec![0usize; columns.len()]; rows.len()];
    let row_keys = grouped.column(ROW)?.as_materialized_series().str()?;
    let column_keys = grouped.column(COLUMN)?.as_materialized_series().str()?;
    let group_sizes = grouped.column("count")?.as_materialized_series().u64()?;

    for ((row_key, column_key), size) in row_keys
        .into_iter()
        .zip(column_keys.into_iter())
        .zip(group_sizes.into_iter())
    {
        let (Some(r), Some(c), Some(size)) = (row_key, column_key, size) else {
            continue;
        };
        // keys outside the domain stay uncounted and end up in `excluded`
        if let (Ok(i), Some(j)) = (
            rows.binary_search_by(|row| row.as_str().cmp(r)),
            columns.iter().position(|name| name == c),
        ) {
            counts[i][j] = size as usize;
        }
    }

    let counted: usize = counts.iter().flatten().sum();
    let excluded = height.saturating_sub(counted);

    Ok(CrossTab {
        row_column: row_column.to_string(),
        column_column: column_column.to_string(),
        rows,
        columns,
        counts,
        excluded,
    })
}
