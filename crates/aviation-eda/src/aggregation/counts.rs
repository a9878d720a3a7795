//! Single-key value counts and top-N.

use crate::error::Result;
use crate::types::RecordSet;
use crate::utils::as_string_series;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const KEY: &str = "key";
const COUNT: &str = "count";

/// Number of records sharing one key value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub key: String,
    pub count: usize,
}

/// Count per distinct present value of one column.
///
/// Entries are sorted by count descending, ties by key ascending. Absent keys
/// are tallied in `missing` and never appear as an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub column: String,
    pub entries: Vec<CountEntry>,
    pub missing: usize,
}

impl Counts {
    /// Count the values of a series with a polars group-by.
    ///
    /// Non-text series are counted by their text rendering.
    pub fn from_series(column: impl Into<String>, series: &Series) -> Result<Self> {
        let keys = as_string_series(series)?.with_name(KEY.into());
        let missing = keys.null_count();

        let grouped = DataFrame::new(vec![keys.into()])?
            .lazy()
            .filter(col(KEY).is_not_null())
            .group_by([col(KEY)])
            .agg([len().cast(DataType::UInt64).alias(COUNT)])
            .sort(
                [COUNT, KEY],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        let keys = grouped.column(KEY)?.as_materialized_series();
        let counts = grouped.column(COUNT)?.as_materialized_series();
        let entries = keys
            .str()?
            .into_iter()
            .zip(counts.u64()?.into_iter())
            .filter_map(|(key, count)| {
                Some(CountEntry {
                    key: key?.to_string(),
                    count: count? as usize,
                })
            })
            .collect();

        Ok(Self {
            column: column.into(),
            entries,
            missing,
        })
    }

    /// Keep the first `n` entries. `missing` is carried over unchanged.
    pub fn top_n(&self, n: usize) -> Counts {
        Counts {
            column: self.column.clone(),
            entries: self.entries.iter().take(n).cloned().collect(),
            missing: self.missing,
        }
    }

    /// Sum of all entry counts (absent keys excluded).
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two-column table: the key column and `count`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let keys: Vec<&str> = self.entries.iter().map(|e| e.key.as_str()).collect();
        let counts: Vec<u64> = self.entries.iter().map(|e| e.count as u64).collect();

        Ok(DataFrame::new(vec![
            Column::new(self.column.as_str().into(), keys),
            Column::new("count".into(), counts),
        ])?)
    }
}

/// Count the values of a column of the record set.
///
/// Non-text columns are counted by their text rendering.
pub fn count_by(records: &RecordSet, column: &str) -> Result<Counts> {
    Counts::from_series(column, records.column(column)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DatasetSchema;

    fn makes(values: &[Option<&str>]) -> Counts {
        let series = Series::new("Make".into(), values.to_vec());
        Counts::from_series("Make", &series).unwrap()
    }

    #[test]
    fn test_counts_sorted_by_count() {
        let counts = makes(&[Some("Boeing"), Some("Boeing"), Some("Cessna")]);

        assert_eq!(
            counts.entries,
            vec![
                CountEntry {
                    key: "Boeing".to_string(),
                    count: 2
                },
                CountEntry {
                    key: "Cessna".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(counts.missing, 0);
    }

    #[test]
    fn test_top_one() {
        let counts = makes(&[Some("Boeing"), Some("Boeing"), Some("Cessna")]).top_n(1);

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("Boeing"), Some(2));
        assert_eq!(counts.get("Cessna"), None);
    }

    #[test]
    fn test_top_n_larger_than_distinct_values() {
        let counts = makes(&[Some("Piper")]).top_n(10);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_ties_break_by_key() {
        let counts = makes(&[
            Some("Piper"),
            Some("Beech"),
            Some("Cessna"),
            Some("Beech"),
            Some("Piper"),
        ]);

        let keys: Vec<&str> = counts.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Beech", "Piper", "Cessna"]);

        let top: Vec<String> = counts.top_n(1).entries.into_iter().map(|e| e.key).collect();
        assert_eq!(top, vec!["Beech".to_string()]);
    }

    #[test]
    fn test_absent_keys_counted_separately() {
        let counts = makes(&[Some("Boeing"), None, None]);

        assert_eq!(counts.missing, 2);
        assert_eq!(counts.total(), 1);
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let counts = makes(&[]);
        assert!(counts.is_empty());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_count_by_column() {
        let frame = df!["Make" => [Some("Cessna"), Some("Cessna"), None]].unwrap();
        let records = RecordSet::new(frame, DatasetSchema::ntsb());

        let counts = count_by(&records, "Make").unwrap();
        assert_eq!(counts.get("Cessna"), Some(2));
        assert_eq!(counts.missing, 1);
        assert_eq!(counts.column, "Make");
    }

    #[test]
    fn test_numeric_keys_counted_as_text() {
        let series = Series::new("year".into(), &[Some(1990i32), Some(1990), None]);
        let counts = Counts::from_series("year", &series).unwrap();

        assert_eq!(counts.get("1990"), Some(2));
        assert_eq!(counts.missing, 1);
    }

    #[test]
    fn test_to_frame() {
        let frame = makes(&[Some("Boeing"), Some("Boeing"), Some("Cessna")])
            .to_frame()
            .unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 2);
        let counts = frame.column("count").unwrap().as_materialized_series();
        assert_eq!(counts.u64().unwrap().get(0), Some(2));
    }
}
