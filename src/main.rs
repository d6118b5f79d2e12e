use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use triangulation::api::formatting::{CsvFormatter, JsonFormatter, OutputFormat, TextFormatter};
use triangulation::api::types::CaseReport;
use triangulation::processing::dataset::DatasetLoader;
use triangulation::utils::config::ConfigurationManager;
use triangulation::validation::accuracy::AccuracySummary;
use triangulation::{localize_cases_parallel, BearingTriangulator};

/// Locate a target from observer bearings, case by case
#[derive(Debug, Parser)]
#[command(name = "triangulation", version)]
struct Args {
    /// Dataset root holding one directory per case
    #[arg(long)]
    root: PathBuf,

    /// Case to run; repeat for several. Defaults to every case under the root
    #[arg(long = "case")]
    cases: Vec<String>,

    /// Object record used as ground truth, or `auto`
    #[arg(long)]
    object_id: Option<String>,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: csv, json or text
    #[arg(long, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Append accuracy statistics over all cases
    #[arg(long)]
    summary: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn render(format: OutputFormat, reports: &[CaseReport], summary: Option<&AccuracySummary>) -> Result<String> {
    let located: Vec<&CaseReport> = reports.iter().filter(|r| r.localization.estimate().is_some()).collect();
    let records: Vec<_> = located.iter().map(|r| r.to_record()).collect();

    let mut output = match format {
        OutputFormat::Csv => CsvFormatter::new().format_records(&records),
        OutputFormat::Json => JsonFormatter::pretty().format_records(&records)? + "\n",
        OutputFormat::Text => located.iter().map(|r| TextFormatter::new().format_text(r)).collect(),
    };

    if let Some(summary) = summary {
        match format {
            OutputFormat::Json => output.push_str(&(JsonFormatter::pretty().format_summary(summary)? + "\n")),
            _ => output.push_str(&TextFormatter::new().format_summary(summary)),
        }
    }

    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut manager = match &args.config {
        Some(path) => ConfigurationManager::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConfigurationManager::new(),
    };
    if let Some(object_id) = &args.object_id {
        manager.set_object_id(object_id).context("applying --object-id")?;
    }
    let config = manager.config().clone();

    let triangulator = BearingTriangulator::from_config(&config).context("configuring the engine")?;
    let loader = DatasetLoader::from_config(&args.root, &config);

    let case_ids = if args.cases.is_empty() {
        loader
            .case_ids()
            .with_context(|| format!("listing cases under {}", args.root.display()))?
    } else {
        args.cases.clone()
    };
    info!("running {} cases from {}", case_ids.len(), args.root.display());

    let cases = case_ids
        .iter()
        .map(|id| loader.load_case(id).with_context(|| format!("loading case {}", id)))
        .collect::<Result<Vec<_>>>()?;

    let reports: Vec<CaseReport> = localize_cases_parallel(&triangulator, &cases)
        .into_iter()
        .zip(&cases)
        .filter_map(|(report, case)| match report {
            Ok(report) => Some(report),
            Err(e) => {
                error!("case {} failed: {}", case.case_id, e);
                None
            }
        })
        .collect();

    let summary = args.summary.then(|| AccuracySummary::from_reports(&reports));
    print!("{}", render(args.format, &reports, summary.as_ref())?);

    Ok(())
}
