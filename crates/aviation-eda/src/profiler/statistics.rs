//! Summary statistics for numeric columns.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over the present values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Number of present values
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); zero with fewer than two values
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Summarize a numeric series. Returns `None` when no value is present.
    pub fn from_series(series: &Series) -> Result<Option<Self>> {
        let float_series = series.cast(&DataType::Float64)?.drop_nulls();
        if float_series.is_empty() {
            return Ok(None);
        }

        let mean = float_series.mean().unwrap_or(0.0);
        let min = float_series.min::<f64>()?.unwrap_or(0.0);
        let max = float_series.max::<f64>()?.unwrap_or(0.0);

        Ok(Some(Self {
            count: float_series.len(),
            mean,
            std: calculate_std(&float_series)?,
            min,
            max,
        }))
    }
}

/// Sample standard deviation (n - 1) of a series without nulls.
pub(crate) fn calculate_std(series: &Series) -> Result<f64> {
    let mean = series.mean().unwrap_or(0.0);
    let n = series.len() as f64;

    if n <= 1.0 {
        return Ok(0.0);
    }

    let float_series = series.f64()?;
    let variance: f64 = float_series
        .into_iter()
        .filter_map(|v| v.map(|val| (val - mean).powi(2)))
        .sum::<f64>()
        / (n - 1.0);

    Ok(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== calculate_std tests ====================

    fn floats(values: &[f64]) -> Series {
        Series::new("test".into(), values)
    }

    #[test]
    fn test_calculate_std_basic() {
        // Values: 1..=5, mean 3, sample variance 10/4
        let std = calculate_std(&floats(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_std_single_value() {
        assert_eq!(calculate_std(&floats(&[5.0])).unwrap(), 0.0);
    }

    #[test]
    fn test_calculate_std_identical_values() {
        assert_eq!(calculate_std(&floats(&[5.0, 5.0, 5.0, 5.0])).unwrap(), 0.0);
    }

    // ==================== NumericSummary tests ====================

    #[test]
    fn test_summary_ignores_nulls() {
        let series = Series::new("fatal".into(), &[Some(0.0), None, Some(2.0), Some(4.0)]);
        let summary = NumericSummary::from_series(&series).unwrap().unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 4.0);
        assert!((summary.std - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_integers() {
        let series = Series::new("year".into(), &[1990i32, 2000]);
        let summary = NumericSummary::from_series(&series).unwrap().unwrap();
        assert_eq!(summary.mean, 1995.0);
    }

    #[test]
    fn test_summary_all_null() {
        let series = Series::new("fatal".into(), &[Option::<f64>::None]);
        assert!(NumericSummary::from_series(&series).unwrap().is_none());
    }
}
