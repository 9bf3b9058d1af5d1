//! # Validate Subcommand
//!
//! Runs a directory batch, writes the requested report artifacts, prints
//! the console summary, and returns the CI summary whose `exit_code`
//! becomes the process exit status.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use conforma_core::ValidationConfiguration;
use conforma_engine::{
    BatchValidator, CancelToken, ClinicalResourceParser, ResourceValidator,
    SchemaConformanceEngine, TracingObserver,
};
use conforma_report::{
    ci_summary, write_report, CiSummary, ConsoleRenderer, CsvRenderer, HtmlRenderer,
    JsonRenderer, ReportRenderer,
};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory to validate, recursively.
    pub dir: PathBuf,

    /// File-name pattern (`*` wildcards).
    #[arg(long, default_value = "*")]
    pub pattern: String,

    /// Profile identifier to validate against (repeatable).
    #[arg(long = "profile")]
    pub profiles: Vec<String>,

    /// Directory containing `*.schema.json` profile definitions.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,

    /// Minimum pass rate (percent) for the batch to succeed.
    #[arg(long, default_value_t = 100.0)]
    pub min_pass_rate: f64,

    /// Maximum tolerated fatal issues across the batch.
    #[arg(long, default_value_t = 0)]
    pub max_fatal: usize,

    /// Concurrency ceiling (defaults to available parallelism).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Write the HTML report to this path.
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Write the JSON report to this path.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the CSV report to this path.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// List every issue per failing resource in the console output.
    #[arg(long)]
    pub verbose: bool,

    /// Batch name used in reports (defaults to the directory name).
    #[arg(long)]
    pub batch_name: Option<String>,
}

/// Run a directory batch per the arguments.
///
/// Ctrl-C raises the cancellation token; the run then surfaces a
/// cancellation error rather than a truncated report.
pub async fn run(args: ValidateArgs) -> anyhow::Result<CiSummary> {
    let engine = match &args.schema_dir {
        Some(dir) => SchemaConformanceEngine::from_dir(dir)?,
        None => SchemaConformanceEngine::empty(),
    };
    let validator = ResourceValidator::new(
        Arc::new(ClinicalResourceParser::new()),
        Arc::new(engine),
    );

    let mut config = ValidationConfiguration::new()
        .with_profiles(args.profiles.clone())
        .with_min_pass_rate(args.min_pass_rate)
        .with_max_fatal_errors(args.max_fatal);
    if let Some(n) = args.concurrency {
        config = config.with_max_concurrency(n);
    }

    let batch_name = args.batch_name.clone().unwrap_or_else(|| {
        args.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "batch".to_string())
    });

    let batch = BatchValidator::new(validator, config)
        .with_observer(Arc::new(TracingObserver))
        .with_batch_name(batch_name);

    let cancel = CancelToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling batch");
            ctrl_c_token.cancel();
        }
    });

    let report = batch
        .validate_directory(&args.dir, &args.pattern, &cancel)
        .await?;

    let mut artifacts = Vec::new();
    let (html, json, csv) = (HtmlRenderer::new(), JsonRenderer::new(), CsvRenderer::new());
    let writes: [(&dyn ReportRenderer, &Option<PathBuf>); 3] = [
        (&html, &args.html),
        (&json, &args.json),
        (&csv, &args.csv),
    ];
    for (renderer, path) in writes {
        if let Some(path) = path {
            write_report(renderer, &report, path)?;
            artifacts.push(path.display().to_string());
        }
    }

    let console = ConsoleRenderer::new().verbose(args.verbose).render(&report)?;
    print!("{console}");

    Ok(ci_summary(&report, artifacts)?)
}
