//! Imputation module for handling missing values.
//!
//! Columns are filled according to the policy declared in the schema:
//! - numeric columns: mean of the present values
//! - categorical columns: most frequent present value

mod statistical;

pub use statistical::StatisticalImputer;
