//! Integration tests for the accident analysis pipeline.
//!
//! These tests run the pipeline end to end on the files in `tests/fixtures`.

use aviation_eda::{
    AnalysisConfig, AnalysisError, DatasetSchema, LoadedTable, Pipeline, PipelineStage,
    RecordLoader, ReportGenerator, SEVERITY_COLUMN, SourceEncoding, YEAR_COLUMN,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_fixture(filename: &str) -> aviation_eda::AnalysisOutcome {
    Pipeline::builder()
        .build()
        .unwrap()
        .run(fixtures_path().join(filename))
        .expect("Pipeline should complete successfully")
}

fn keys(counts: &aviation_eda::Counts) -> Vec<&str> {
    counts.entries.iter().map(|e| e.key.as_str()).collect()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_sample() {
    let outcome = run_fixture("aviation_sample.csv");

    assert_eq!(outcome.load.rows_read, 10);
    assert_eq!(outcome.load.rows_skipped, 0);
    assert_eq!(outcome.load.encoding, SourceEncoding::Utf8);
    assert_eq!(outcome.records.height(), 10);

    assert_eq!(
        outcome.dropped_columns,
        vec!["Aircraft.damage".to_string(), "Registration.Number".to_string()]
    );
    assert!(!outcome.records.has_column("Aircraft.damage"));
    assert!(outcome.records.has_column(YEAR_COLUMN));
    assert!(outcome.records.has_column(SEVERITY_COLUMN));
}

#[test]
fn test_imputation_leaves_no_absent_values() {
    let outcome = run_fixture("aviation_sample.csv");

    let fatal = outcome.records.column("Total.Fatal.Injuries").unwrap();
    let weather = outcome.records.column("Weather.Condition").unwrap();
    assert_eq!(fatal.null_count(), 0);
    assert_eq!(weather.null_count(), 0);

    // mean of 2, 4, 0, 1, 12, 3, 0, 150
    let mean = outcome
        .imputations
        .iter()
        .find(|i| i.column == "Total.Fatal.Injuries")
        .unwrap();
    assert_eq!(mean.filled, 2);
    assert_eq!(fatal.f64().unwrap().get(4), Some(21.5));

    let mode = outcome
        .imputations
        .iter()
        .find(|i| i.column == "Weather.Condition")
        .unwrap();
    assert_eq!(mode.fill_value, "VMC");
    assert_eq!(mode.filled, 1);
    assert_eq!(weather.str().unwrap().get(6), Some("VMC"));
}

#[test]
fn test_derived_columns() {
    let outcome = run_fixture("aviation_sample.csv");

    assert_eq!(outcome.derivation.missing_dates, 1);
    assert_eq!(outcome.derivation.unparseable_dates, 1);
    // fatalities 0, 0 and 150 fall outside every bin
    assert_eq!(outcome.derivation.unbucketed, 3);

    let severity: Vec<Option<&str>> = outcome
        .records
        .column(SEVERITY_COLUMN)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        severity,
        vec![
            Some("Medium"),
            Some("Medium"),
            None,
            Some("Low"),
            Some("High"),
            Some("High"),
            Some("Medium"),
            None,
            Some("High"),
            None,
        ]
    );
}

#[test]
fn test_views_on_sample() {
    let views = run_fixture("aviation_sample.csv").views;

    let years: Vec<(i32, usize)> = views
        .accidents_per_year
        .entries
        .iter()
        .map(|e| (e.year, e.count))
        .collect();
    assert_eq!(years, vec![(1982, 2), (1990, 3), (2001, 3)]);
    assert_eq!(views.accidents_per_year.missing, 2);

    assert_eq!(
        keys(&views.top_manufacturers),
        vec!["Cessna", "Boeing", "Piper", "Bell", "Stinson"]
    );
    assert_eq!(views.top_manufacturers.get("Cessna"), Some(4));

    assert_eq!(
        keys(&views.top_locations),
        vec![
            "ANCHORAGE, AK",
            "MIAMI, FL",
            "DENVER, CO",
            "BRIDGEPORT, CA",
            "MOOSE CREEK, ID"
        ]
    );

    let table = &views.severity_by_category;
    assert_eq!(table.rows, vec!["Airplane", "Helicopter"]);
    assert_eq!(table.columns, vec!["Low", "Medium", "High"]);
    assert_eq!(table.counts, vec![vec![1, 2, 2], vec![0, 1, 0]]);
    assert_eq!(table.excluded, 4);

    assert_eq!(views.injury_severity_distribution.missing, 1);
    assert_eq!(views.injury_severity_distribution.get("Non-Fatal"), Some(2));
    assert_eq!(views.injury_severity_distribution.total(), 9);
}

#[test]
fn test_top_n_from_config() {
    let config = AnalysisConfig::builder().top_n(2).build().unwrap();
    let outcome = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixtures_path().join("aviation_sample.csv"))
        .unwrap();

    assert_eq!(keys(&outcome.views.top_manufacturers), vec!["Cessna", "Boeing"]);
    assert_eq!(keys(&outcome.views.top_locations), vec!["ANCHORAGE, AK", "MIAMI, FL"]);
    assert_eq!(outcome.views.top_injury_severities.len(), 2);
}

// ============================================================================
// Loader Tolerance Tests
// ============================================================================

#[test]
fn test_ragged_rows_are_skipped_and_counted() {
    let outcome = run_fixture("ragged_rows.csv");

    assert_eq!(outcome.load.rows_read, 4);
    assert_eq!(outcome.load.rows_skipped, 2);
    assert_eq!(outcome.records.height(), 2);
    assert_eq!(outcome.views.accidents_per_year.get(1990), Some(1));
    assert_eq!(outcome.views.accidents_per_year.get(1991), None);
}

#[test]
fn test_latin1_file_keeps_accented_characters() {
    let table = RecordLoader::default()
        .load_path(fixtures_path().join("latin1.csv"))
        .unwrap();

    assert_eq!(table.summary.encoding, SourceEncoding::Latin1);

    let locations = table.frame.column("Location").unwrap().as_materialized_series();
    assert_eq!(locations.str().unwrap().get(0), Some("BOGOTÁ, CO"));
    assert_eq!(locations.str().unwrap().get(1), Some("MONTRÉAL, QC"));

    let outcome = Pipeline::builder()
        .build()
        .unwrap()
        .process(table)
        .unwrap();
    assert_eq!(outcome.views.top_manufacturers.get("Aérospatiale"), Some(1));
}

#[test]
fn test_custom_delimiter() {
    let config = AnalysisConfig::builder().delimiter(b';').build().unwrap();
    let outcome = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixtures_path().join("semicolon.csv"))
        .unwrap();

    assert_eq!(outcome.records.height(), 2);
    assert_eq!(outcome.views.top_locations.get("MIAMI, FL"), Some(1));
    // the empty weather cell was imputed with the only present value
    assert_eq!(
        outcome.records.column("Weather.Condition").unwrap().null_count(),
        0
    );
}

#[test]
fn test_nan_and_na_cells_are_absent_before_imputation() {
    let csv = b"Event.Date,Location,Make,Aircraft.Category,Injury.Severity,\
Total.Fatal.Injuries,Weather.Condition
1990-01-01,\"MIAMI, FL\",Cessna,Airplane,Non-Fatal,0,VMC
1990-02-01,\"MIAMI, FL\",Piper,Airplane,Fatal(2),2,NA
1991-01-01,\"DENVER, CO\",Cessna,Airplane,Fatal(1),NaN,VMC
1991-02-01,\"DENVER, CO\",Boeing,Airplane,Non-Fatal,,IMC
";
    let table = RecordLoader::default().load_bytes(csv).unwrap();
    let outcome = Pipeline::builder()
        .build()
        .unwrap()
        .process(table)
        .unwrap();

    let mean = outcome
        .imputations
        .iter()
        .find(|i| i.column == "Total.Fatal.Injuries")
        .unwrap();
    assert_eq!(mean.filled, 2);
    assert_eq!(mean.fill_value, "1.0000");

    let fatal: Vec<Option<f64>> = outcome
        .records
        .column("Total.Fatal.Injuries")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(fatal, vec![Some(0.0), Some(2.0), Some(1.0), Some(1.0)]);

    let weather = outcome
        .imputations
        .iter()
        .find(|i| i.column == "Weather.Condition")
        .unwrap();
    assert_eq!(weather.filled, 1);
    assert_eq!(weather.fill_value, "VMC");

    // the two imputed rows now fall in the Low bucket
    assert_eq!(
        outcome.views.severity_by_category.get("Airplane", "Low"),
        Some(2)
    );
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_missing_required_column_names_it() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixtures_path().join("missing_weather.csv"));

    match result {
        Err(AnalysisError::MissingColumn { column, role }) => {
            assert_eq!(column, "Weather.Condition");
            assert_eq!(role, "weather condition");
        }
        other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixtures_path().join("does_not_exist.csv"));

    let err = result.unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
}

#[test]
fn test_progress_reports_failed_stage() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    let _ = Pipeline::builder()
        .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(fixtures_path().join("missing_weather.csv"));

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Loading));
    assert_eq!(stages.last(), Some(&PipelineStage::Failed));
}

#[test]
fn test_categorical_column_with_no_values_cannot_be_imputed() {
    let frame = df![
        "Event.Date" => ["1990-01-01"],
        "Location" => ["MIAMI, FL"],
        "Make" => ["Cessna"],
        "Aircraft.Category" => ["Airplane"],
        "Injury.Severity" => ["Fatal(1)"],
        "Total.Fatal.Injuries" => ["1"],
        "Weather.Condition" => [Option::<&str>::None],
    ]
    .unwrap();

    let err = Pipeline::builder()
        .build()
        .unwrap()
        .process(LoadedTable::from_frame(frame))
        .unwrap_err();

    assert!(matches!(err, AnalysisError::NoValidValues(ref c) if c == "Weather.Condition"));
}

// ============================================================================
// Configuration & Reporting Tests
// ============================================================================

#[test]
fn test_config_file_overrides_defaults() {
    let dir = std::env::temp_dir().join(format!("aviation_eda_config_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(
        &path,
        r#"{ "top_n": 1, "severity_bins": { "edges": [-1.0, 0.0, 5.0, 1000.0] } }"#,
    )
    .unwrap();

    let config = AnalysisConfig::from_json_file(&path).unwrap();
    assert_eq!(config.schema, DatasetSchema::ntsb());

    let outcome = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixtures_path().join("aviation_sample.csv"))
        .unwrap();

    assert_eq!(keys(&outcome.views.top_manufacturers), vec!["Cessna"]);
    // zero fatalities are now Low and 150 is High
    assert_eq!(outcome.derivation.unbucketed, 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_report_and_exports_from_real_run() {
    let outcome = run_fixture("aviation_sample.csv");
    let dir = std::env::temp_dir().join(format!("aviation_eda_exports_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let generator = ReportGenerator::new(dir.clone());
    let report = ReportGenerator::build_report("aviation_sample.csv", &outcome);

    let report_path = generator
        .write_report_to_file(&report, "aviation_sample")
        .unwrap();
    assert!(report_path.ends_with("aviation_sample_report.json"));

    let written = generator.export_views(&outcome.views).unwrap();
    assert_eq!(written.len(), 5);

    let years = std::fs::read_to_string(dir.join("accidents_per_year.csv")).unwrap();
    let lines: Vec<&str> = years.lines().collect();
    assert_eq!(lines, vec!["year,count", "1982,2", "1990,3", "2001,3"]);

    let _ = std::fs::remove_dir_all(&dir);
}
