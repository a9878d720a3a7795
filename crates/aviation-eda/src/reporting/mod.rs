//! Report generation module.
//!
//! [`AnalysisReport`] is the serializable record of one run, used for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - the plain-text terminal summary
//!
//! [`ReportGenerator::export_views`] writes each chart view as a CSV file.
//!
//! # Example
//!
//! ```rust,ignore
//! use aviation_eda::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("AviationData.csv", &outcome);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_report_to_file(&report, "AviationData")?;
//! generator.export_views(&outcome.views)?;
//! ```

mod generator;

pub use generator::{AnalysisReport, ReportGenerator, RunSummary, VIEW_FILES};
