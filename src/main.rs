use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::Value;

use health_trail_lib::config::{self, PipelineSettings};
use health_trail_lib::models::{HistorySnapshot, SuppliedBands};
use health_trail_lib::pipeline::ingest::{history_from_values, normalize_metadata, parse_metadata_str};
use health_trail_lib::pipeline::{ReportOutcome, ReportPipeline, ReportRequest};
use health_trail_lib::summary::SUMMARY_UNAVAILABLE;

#[derive(Parser, Debug)]
#[command(
    name = "health-trail",
    version,
    about = "Turn lab-report text into an annotated visual health report."
)]
struct Args {
    /// Plain-text lab report to analyze.
    #[arg(short, long, conflicts_with = "stored")]
    input: Option<PathBuf>,

    /// Stored report metadata (JSON) to re-render without calling the summarizer.
    #[arg(long)]
    stored: Option<PathBuf>,

    /// JSON array of past report metadata rows, oldest first.
    #[arg(long)]
    history: Option<PathBuf>,

    /// JSON object of reference bands ({"ranges": {...}} or bare {"Metric": {"min", "max"}}).
    #[arg(long)]
    ranges: Option<PathBuf>,

    /// Output directory for the rendered report.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Print the analysis as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    health_trail_lib::init_tracing();
    let args = Args::parse();

    let settings = PipelineSettings::from_env();
    tracing::info!(
        "{} v{} (reports in {})",
        config::APP_NAME,
        config::APP_VERSION,
        settings.reports_dir.display()
    );

    let pipeline = ReportPipeline::from_settings(&settings);
    let history = match &args.history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    let outcome = match (&args.input, &args.stored) {
        (Some(input), None) => {
            let text = read(input)?;
            let supplied_bands = match &args.ranges {
                Some(path) => load_ranges(path)?,
                None => SuppliedBands::new(),
            };
            let request = ReportRequest::new(text)
                .with_supplied_bands(supplied_bands)
                .with_history(history);
            pipeline.run(&request)?
        }
        (None, Some(stored)) => {
            let mut metadata = parse_metadata_str(&read(stored)?)
                .with_context(|| format!("Invalid report metadata in {}", stored.display()))?;
            if let Some(path) = &args.ranges {
                metadata.supplied_bands.extend(load_ranges(path)?);
            }
            pipeline.render_stored(&metadata, SUMMARY_UNAVAILABLE, SUMMARY_UNAVAILABLE, &history)?
        }
        _ => bail!("Provide either --input <report.txt> or --stored <metadata.json>"),
    };

    let out_dir = args.out_dir.unwrap_or(settings.reports_dir);
    let path = outcome.write_to(&out_dir)?;

    if args.json {
        print_json(&outcome, &path)?;
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

fn load_history(path: &Path) -> anyhow::Result<Vec<HistorySnapshot>> {
    let rows: Vec<Value> = serde_json::from_str(&read(path)?)
        .with_context(|| format!("History in {} must be a JSON array", path.display()))?;
    Ok(history_from_values(&rows))
}

fn load_ranges(path: &Path) -> anyhow::Result<SuppliedBands> {
    let value: Value = serde_json::from_str(&read(path)?)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    // A bare band map is accepted as well as full metadata.
    let value = match value {
        Value::Object(map) if !map.contains_key("ranges") => {
            serde_json::json!({ "ranges": Value::Object(map) })
        }
        other => other,
    };
    let metadata = normalize_metadata(&value)
        .with_context(|| format!("Invalid reference ranges in {}", path.display()))?;
    Ok(metadata.supplied_bands)
}

fn print_json(outcome: &ReportOutcome, path: &Path) -> anyhow::Result<()> {
    let body = serde_json::json!({
        "render_id": outcome.render_id,
        "renderer": outcome.document.renderer,
        "path": path,
        "analysis": outcome.analysis,
        "doctor_summary": outcome.doctor_summary,
        "patient_summary": outcome.patient_summary,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
