//! CLI entry point for the aviation accident analysis.

use anyhow::{Result, anyhow};
use aviation_eda::{AnalysisConfig, Pipeline, ReportGenerator};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis of aviation accident records",
    long_about = "Loads an accident dataset, cleans and imputes it, derives the event year \
                  and a severity bucket, and computes the views behind the standard charts.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  aviation-eda -i AviationData.csv\n\n  \
                  # Check columns and missing values only\n  \
                  aviation-eda -i AviationData.csv --dry-run\n\n  \
                  # Machine-readable output\n  \
                  aviation-eda -i AviationData.csv --json | jq .views.top_manufacturers\n\n  \
                  # Write the report and one CSV per chart view\n  \
                  aviation-eda -i AviationData.csv -o charts/ --emit-report --export-views"
)]
struct Args {
    /// Path to the delimited accident file
    #[arg(short, long)]
    input: String,

    /// Output directory for reports and exported views
    ///
    /// Overrides `output_dir` from the config file (default: ./outputs)
    #[arg(short, long)]
    output: Option<String>,

    /// JSON configuration file (schema, drop list, bins, date formats)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of entries kept in the ranked views
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Field delimiter of the input file
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Load, validate and profile the input without cleaning or aggregating
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write each chart view as a CSV file to the output directory
    #[arg(short = 'e', long)]
    export_views: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    if args.dry_run {
        return run_dry_run(&pipeline, &args);
    }

    run_pipeline(&pipeline, &args)
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            AnalysisConfig::from_json_file(path)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(ref output) = args.output {
        config.output_dir = PathBuf::from(output);
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = u8::try_from(u32::from(delimiter)).map_err(|_| {
            anyhow!(
                "Delimiter must be a single-byte character, got '{}'",
                delimiter
            )
        })?;
    }

    Ok(config)
}

fn build_pipeline(args: &Args, config: AnalysisConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Show the load summary and the column profiles, nothing else.
///
/// Uses `println!` on purpose: this output is the point of `--dry-run` and
/// must not depend on the log level.
fn run_dry_run(pipeline: &Pipeline, args: &Args) -> Result<()> {
    let table = pipeline.load(Path::new(&args.input))?;
    let summary = table.summary.clone();
    let profiles = pipeline.inspect(table)?;

    if args.json {
        let output = serde_json::json!({
            "input_file": args.input,
            "load": summary,
            "profile": profiles,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Input check");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Encoding: {}", summary.encoding);
    println!("  Rows: {} ({} skipped)", summary.rows_loaded(), summary.rows_skipped);
    println!("  Columns: {}", summary.columns);
    println!("  All required columns present");
    println!();

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<24} {:<10} {:<10} {:<10} {:<10}",
        "Column", "Type", "Missing", "Missing %", "Unique"
    );
    println!("{}", "-".repeat(70));
    for col in &profiles {
        println!(
            "{:<24} {:<10} {:<10} {:<10.1} {:<10}",
            truncate_str(&col.name, 23),
            col.dtype,
            col.null_count,
            col.null_percentage,
            col.unique_count
        );
    }
    println!();

    let drops: Vec<&String> = pipeline
        .config()
        .drop_columns
        .iter()
        .filter(|name| profiles.iter().any(|p| p.name == **name))
        .collect();
    println!("PROPOSED ACTIONS");
    println!("{}", "-".repeat(40));
    if drops.is_empty() {
        println!("  No columns to drop");
    } else {
        println!("  Drop columns: {:?}", drops);
    }
    for spec in pipeline.config().schema.imputed_columns() {
        println!("  Impute '{}' with {:?}", spec.name, spec.imputation);
    }
    println!("  Derive year and severity, then compute the chart views");
    println!();

    println!("{}", "=".repeat(80));
    println!("To run the analysis, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Run the pipeline and write the requested outputs.
///
/// - Default: print a human-readable summary to stdout
/// - `--json`: print the JSON report to stdout only
/// - `--emit-report`: also write the JSON report to the output directory
/// - `--export-views`: also write one CSV per chart view
fn run_pipeline(pipeline: &Pipeline, args: &Args) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting accident analysis...");
    info!("{}", "=".repeat(80));

    let outcome = match pipeline.run(&args.input) {
        Ok(outcome) => outcome,
        Err(e) => {
            if args.json {
                let output = serde_json::json!({ "error": &e });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    let report = ReportGenerator::build_report(&args.input, &outcome);
    let generator = ReportGenerator::new(pipeline.config().output_dir.clone());

    if args.emit_report {
        let input_stem = extract_file_stem(&args.input);
        let report_path = generator.write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.export_views {
        for path in generator.export_views(&outcome.views)? {
            info!("View written to: {}", path.display());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", ReportGenerator::format_summary(&report));
        if !args.emit_report {
            println!("Use --emit-report to save the JSON report");
        }
    }

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}
