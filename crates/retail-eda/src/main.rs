//! CLI entry point for the retail transaction analysis.

use anyhow::Result;
use clap::Parser;
use retail_eda::config::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_DIR};
use retail_eda::{AnalysisConfig, AnalysisResult, Pipeline, ReportGenerator, TextReporter};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis of a retail transaction log",
    long_about = "Loads a retail transaction log, removes invalid rows, prints summary \
                  statistics and sales rankings, renders charts and counts outliers.\n\n\
                  EXAMPLES:\n  \
                  # Analyze ./Online Retail.xlsx, charts into ./outputs\n  \
                  retail-eda\n\n  \
                  # Custom input and output, top 5 rankings\n  \
                  retail-eda -i data/retail.csv -o results/ --top-n 5\n\n  \
                  # Machine-readable output only\n  \
                  retail-eda --json --no-charts"
)]
struct Args {
    /// Path to the transaction log (xlsx, xls, ods or CSV)
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Output directory for charts and reports
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Number of entries in each top-N ranking
    #[arg(long, default_value_t = 10)]
    top_n: usize,

    /// Quantile at which chart axes for quantity and unit price are clipped
    #[arg(long, default_value_t = 0.99)]
    clip_quantile: f64,

    /// Number of histogram bins
    #[arg(long, default_value_t = 50)]
    bins: usize,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Output JSON to stdout instead of the text report
    ///
    /// Disables all logs; only the final JSON report is written.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the JSON report.
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
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = AnalysisConfig::builder()
        .input_path(&args.input)
        .output_dir(&args.output)
        .top_n(args.top_n)
        .render_charts(!args.no_charts)
        .clip_quantile(args.clip_quantile)
        .histogram_bins(args.bins)
        .build()?;

    let pipeline = build_pipeline(&args, config)?;

    match pipeline.run() {
        Ok(result) => handle_output(&result, &args),
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            } else {
                error!("Analysis failed: {}", e);
            }
            Err(e.into())
        }
    }
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

/// Handle output based on CLI flags.
///
/// - Default: text report on stdout
/// - `--json`: JSON report on stdout only
/// - `--emit-report`: JSON report written to the output directory
fn handle_output(result: &AnalysisResult, args: &Args) -> Result<()> {
    let input = args.input.display().to_string();

    if args.json {
        let report = ReportGenerator::build_report(&input, result);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        TextReporter::default().write_report(&mut out, result)?;
        out.flush()?;
    }

    if args.emit_report {
        let report = ReportGenerator::build_report(&input, result);
        let path = ReportGenerator::new(args.output.clone())
            .write_report_to_file(&report, &report_base_name(&args.input))?;
        if !args.json {
            info!("JSON report written to {}", path.display());
        }
    }

    info!("Analysis finished in {} ms", result.duration_ms);
    Ok(())
}

/// File stem of the input, used to name the JSON report.
fn report_base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analysis".to_string())
}
