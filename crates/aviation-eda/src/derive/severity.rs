//! Severity buckets from total fatal injuries.

use crate::config::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity bucket of an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityBucket {
    Low,
    Medium,
    High,
}

impl SeverityBucket {
    /// All buckets, in ascending order.
    pub const ALL: [SeverityBucket; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Classify a fatality count with the default bins.
    pub fn from_fatalities(fatalities: f64) -> Option<Self> {
        SeverityBins::default().bucket(fatalities)
    }
}

impl fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Right-closed bin edges: `(e0, e1]` is Low, `(e1, e2]` Medium, `(e2, e3]` High.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBins {
    pub edges: [f64; 4],
}

impl Default for SeverityBins {
    fn default() -> Self {
        Self {
            edges: [0.0, 1.0, 5.0, 100.0],
        }
    }
}

impl SeverityBins {
    /// Bucket for a value, `None` when it lies outside every bin.
    ///
    /// The lowest edge itself is excluded, so with the default bins a count
    /// of exactly zero is not classified.
    pub fn bucket(&self, value: f64) -> Option<SeverityBucket> {
        if value.is_nan() {
            return None;
        }

        let [e0, e1, e2, e3] = self.edges;
        if value <= e0 || value > e3 {
            None
        } else if value <= e1 {
            Some(SeverityBucket::Low)
        } else if value <= e2 {
            Some(SeverityBucket::Medium)
        } else {
            Some(SeverityBucket::High)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.edges.iter().any(|e| !e.is_finite()) {
            return Err(ConfigValidationError::InvalidSeverityBins(
                "edges must be finite".to_string(),
            ));
        }

        if self.edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigValidationError::InvalidSeverityBins(format!(
                "edges must be strictly increasing, got {:?}",
                self.edges
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bins_mapping() {
        assert_eq!(SeverityBucket::from_fatalities(0.0), None);
        assert_eq!(SeverityBucket::from_fatalities(1.0), Some(SeverityBucket::Low));
        assert_eq!(SeverityBucket::from_fatalities(3.0), Some(SeverityBucket::Medium));
        assert_eq!(SeverityBucket::from_fatalities(10.0), Some(SeverityBucket::High));
        assert_eq!(SeverityBucket::from_fatalities(150.0), None);
    }

    #[test]
    fn test_bins_are_right_closed() {
        let bins = SeverityBins::default();
        assert_eq!(bins.bucket(0.5), Some(SeverityBucket::Low));
        assert_eq!(bins.bucket(1.5), Some(SeverityBucket::Medium));
        assert_eq!(bins.bucket(5.0), Some(SeverityBucket::Medium));
        assert_eq!(bins.bucket(5.01), Some(SeverityBucket::High));
        assert_eq!(bins.bucket(100.0), Some(SeverityBucket::High));
        assert_eq!(bins.bucket(-1.0), None);
    }

    #[test]
    fn test_nan_is_unclassified() {
        assert_eq!(SeverityBins::default().bucket(f64::NAN), None);
    }

    #[test]
    fn test_validate_rejects_unsorted_edges() {
        let bins = SeverityBins {
            edges: [0.0, 5.0, 5.0, 100.0],
        };
        assert!(matches!(
            bins.validate(),
            Err(ConfigValidationError::InvalidSeverityBins(_))
        ));
    }

    #[test]
    fn test_validate_rejects_infinite_edge() {
        let bins = SeverityBins {
            edges: [0.0, 1.0, 5.0, f64::INFINITY],
        };
        assert!(bins.validate().is_err());
        assert!(SeverityBins::default().validate().is_ok());
    }

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = SeverityBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["Low", "Medium", "High"]);
        assert_eq!(SeverityBucket::High.to_string(), "High");
    }
}
