use crate::aggregation::{AnalysisViews, Counts};
use crate::error::Result;
use crate::loader::SourceEncoding;
use crate::profiler::ColumnProfile;
use crate::types::{AnalysisOutcome, DerivationSummary, ImputationRecord};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// File names of the exported views, in export order.
pub const VIEW_FILES: [&str; 5] = [
    "accidents_per_year.csv",
    "top_manufacturers.csv",
    "severity_by_category.csv",
    "top_locations.csv",
    "top_injury_severities.csv",
];

// ============================================================================
// Report Types
// ============================================================================

/// Report of one analysis run.
///
/// Used for JSON output to stdout (`--json`), for the report file
/// (`--emit-report`) and for the human-readable summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,

    pub summary: RunSummary,

    /// Columns removed by the cleaning stage
    pub dropped_columns: Vec<String>,
    pub imputations: Vec<ImputationRecord>,
    pub derivation: DerivationSummary,

    /// Column profiles before cleaning
    pub profile_before: Vec<ColumnProfile>,
    /// Column profiles of the final record set
    pub profile_after: Vec<ColumnProfile>,

    pub views: AnalysisViews,
    pub processing_steps: Vec<String>,
}

/// Row and column totals for the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    /// Records that went through every stage
    pub rows_analyzed: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub encoding: SourceEncoding,
    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

// ============================================================================
// Generator
// ============================================================================

/// Writes reports and view exports under an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Build a report from a pipeline outcome.
    pub fn build_report(input_file: &str, outcome: &AnalysisOutcome) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            summary: RunSummary {
                rows_read: outcome.load.rows_read,
                rows_skipped: outcome.load.rows_skipped,
                rows_analyzed: outcome.records.height(),
                columns_before: outcome.load.columns,
                columns_after: outcome.records.width(),
                encoding: outcome.load.encoding,
                duration_ms: outcome.duration_ms,
            },
            dropped_columns: outcome.dropped_columns.clone(),
            imputations: outcome.imputations.clone(),
            derivation: outcome.derivation.clone(),
            profile_before: outcome.profile_before.clone(),
            profile_after: outcome.profile_after.clone(),
            views: outcome.views.clone(),
            processing_steps: outcome.processing_steps.clone(),
        }
    }

    /// Write a report to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Write each chart view as a CSV file. Returns the written paths.
    pub fn export_views(&self, views: &AnalysisViews) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let frames = [
            views.accidents_per_year.to_frame()?,
            views.top_manufacturers.to_frame()?,
            views.severity_by_category.to_frame()?,
            views.top_locations.to_frame()?,
            views.top_injury_severities.to_frame()?,
        ];

        let mut written = Vec::with_capacity(frames.len());
        for (file_name, mut frame) in VIEW_FILES.iter().zip(frames) {
            let path = self.output_dir.join(file_name);
            let mut file = File::create(&path)?;

            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(&mut frame)?;

            debug!("View saved: {} ({} rows)", path.display(), frame.height());
            written.push(path);
        }

        info!(
            "Exported {} views to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    /// Plain-text summary for the terminal.
    pub fn format_summary(report: &AnalysisReport) -> String {
        let mut out = String::new();
        let summary = &report.summary;

        let _ = writeln!(out, "Aviation accident analysis: {}", report.input_file);
        let _ = writeln!(
            out,
            "  rows: {} read, {} skipped, {} analyzed ({})",
            summary.rows_read, summary.rows_skipped, summary.rows_analyzed, summary.encoding
        );
        let _ = writeln!(
            out,
            "  columns: {} -> {}",
            summary.columns_before, summary.columns_after
        );
        if !report.dropped_columns.is_empty() {
            let _ = writeln!(out, "  dropped: {}", report.dropped_columns.join(", "));
        }
        for imputation in &report.imputations {
            let _ = writeln!(
                out,
                "  imputed {} ({:?}): {} values with {}",
                imputation.column, imputation.strategy, imputation.filled, imputation.fill_value
            );
        }
        let _ = writeln!(
            out,
            "  dates: {} absent, {} unparseable; {} records outside every severity bin",
            report.derivation.missing_dates,
            report.derivation.unparseable_dates,
            report.derivation.unbucketed
        );

        let years = &report.views.accidents_per_year;
        let _ = writeln!(out, "\nAccidents per year");
        for entry in &years.entries {
            let _ = writeln!(out, "  {:>6}  {}", entry.year, entry.count);
        }
        if years.missing > 0 {
            let _ = writeln!(out, "  {:>6}  {}", "-", years.missing);
        }

        write_counts(&mut out, "Top manufacturers", &report.views.top_manufacturers);

        let table = &report.views.severity_by_category;
        let _ = writeln!(out, "\nSeverity by aircraft category");
        let _ = writeln!(
            out,
            "  {:<24}{}",
            "",
            table
                .columns
                .iter()
                .map(|c| format!("{:>8}", c))
                .collect::<String>()
        );
        for (row, counts) in table.rows.iter().zip(&table.counts) {
            let cells: String = counts.iter().map(|c| format!("{:>8}", c)).collect();
            let _ = writeln!(out, "  {:<24}{}", row, cells);
        }

        write_counts(&mut out, "Top locations", &report.views.top_locations);
        write_counts(
            &mut out,
            "Injury severity distribution",
            &report.views.injury_severity_distribution,
        );

        let _ = writeln!(out, "\nCompleted in {} ms", summary.duration_ms);
        out
    }
}

fn write_counts(out: &mut String, title: &str, counts: &Counts) {
    let _ = writeln!(out, "\n{}", title);
    for entry in &counts.entries {
        let _ = writeln!(out, "  {:<32}{:>8}", entry.key, entry.count);
    }
    if counts.missing > 0 {
        let _ = writeln!(out, "  {:<32}{:>8}", "(absent)", counts.missing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadedTable;
    use crate::pipeline::Pipeline;
    use std::path::Path;

    fn outcome() -> AnalysisOutcome {
        let frame = df![
            "Event.Date" => ["1982-10-24", "1990-01-01", "1990-06-01"],
            "Make" => ["Boeing", "Boeing", "Cessna"],
            "Aircraft.Category" => [Some("Airplane"), None, Some("Helicopter")],
            "Injury.Severity" => [Some("Fatal(2)"), Some("Non-Fatal"), None],
            "Total.Fatal.Injuries" => [Some("2"), None, Some("1")],
            "Weather.Condition" => [Some("VMC"), None, Some("IMC")],
            "Location" => ["MIAMI, FL", "MIAMI, FL", "DENVER, CO"],
            "Registration.Number" => ["N1", "N2", "N3"],
        ]
        .unwrap();

        Pipeline::builder()
            .build()
            .unwrap()
            .process(LoadedTable::from_frame(frame))
            .unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "aviation_eda_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_build_report() {
        let report = ReportGenerator::build_report("AviationData.csv", &outcome());

        assert_eq!(report.input_file, "AviationData.csv");
        assert_eq!(report.summary.rows_read, 3);
        assert_eq!(report.summary.rows_analyzed, 3);
        assert_eq!(report.summary.columns_before, 8);
        // Registration.Number dropped, year and severity added
        assert_eq!(report.summary.columns_after, 9);
        assert_eq!(report.dropped_columns, vec!["Registration.Number"]);
    }

    #[test]
    fn test_report_json_shape() {
        let report = ReportGenerator::build_report("in.csv", &outcome());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["encoding"], "utf8");
        assert_eq!(json["views"]["top_manufacturers"]["entries"][0]["key"], "Boeing");
        assert_eq!(
            json["views"]["severity_by_category"]["columns"],
            serde_json::json!(["Low", "Medium", "High"])
        );
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = temp_dir("report");
        let generator = ReportGenerator::new(dir.clone());
        let report = ReportGenerator::build_report("in.csv", &outcome());

        let path = generator.write_report_to_file(&report, "AviationData").unwrap();

        assert_eq!(path, dir.join("AviationData_report.json"));
        let content = fs::read_to_string(&path).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.summary, report.summary);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_views_writes_every_file() {
        let dir = temp_dir("views");
        let generator = ReportGenerator::new(dir.clone());

        let written = generator.export_views(&outcome().views).unwrap();

        assert_eq!(written.len(), VIEW_FILES.len());
        for name in VIEW_FILES {
            assert!(Path::new(&dir.join(name)).exists(), "{} missing", name);
        }

        let makes = fs::read_to_string(dir.join("top_manufacturers.csv")).unwrap();
        assert_eq!(makes.lines().next(), Some("Make,count"));
        assert_eq!(makes.lines().nth(1), Some("Boeing,2"));

        let crosstab = fs::read_to_string(dir.join("severity_by_category.csv")).unwrap();
        assert_eq!(crosstab.lines().next(), Some("Aircraft.Category,Low,Medium,High"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_format_summary_lists_views() {
        let report = ReportGenerator::build_report("in.csv", &outcome());
        let text = ReportGenerator::format_summary(&report);

        assert!(text.contains("Accidents per year"));
        assert!(text.contains("Top manufacturers"));
        assert!(text.contains("Boeing"));
        assert!(text.contains("Severity by aircraft category"));
        assert!(text.contains("(absent)"));
    }
}
