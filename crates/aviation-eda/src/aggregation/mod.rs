//! Aggregation module.
//!
//! Read-only counts over a cleaned record set, grouped with polars:
//! - single-key counts with top-N truncation
//! - accidents per year
//! - a rectangular two-key cross-tab
//!
//! [`AnalysisViews`] bundles the views behind the charts.

mod counts;
mod crosstab;
mod timeline;
mod views;

pub use counts::{CountEntry, Counts, count_by};
pub use crosstab::{CrossTab, cross_tabulate};
pub use timeline::{YearCount, YearCounts, count_by_year};
pub use views::AnalysisViews;
