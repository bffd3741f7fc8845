use crate::config::PlotConfig;
use crate::jobs::{self, Job, JobContext};
use crate::model::RunReport;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "openwhisk-bench-plots",
    version,
    about = "Aggregate OpenWhisk load-test results into latency/throughput plots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the input CSV files
    #[arg(long, global = true, default_value = ".")]
    pub input_dir: PathBuf,

    /// Directory the PNG files are written to
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// JSON configuration file (defaults to the per-user config if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the JSON report and exit
    #[arg(long, global = true, conflicts_with = "text")]
    pub json: bool,

    /// Print a text summary (default)
    #[arg(long, global = true)]
    pub text: bool,

    /// Compute the series without writing any image
    #[arg(long, global = true)]
    pub no_render: bool,

    /// Export the report as JSON
    #[arg(long, global = true)]
    pub export_json: Option<PathBuf>,

    /// Export the report as CSV
    #[arg(long, global = true)]
    pub export_csv: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Box plots of latency/throughput per platform concurrency
    Concurrency(ConcurrencyArgs),
    /// Averaged latency/throughput per payload label
    Payload(PayloadArgs),
    /// Trimmed-mean latency per payload size from Result-<size>.csv files
    DataTransfer(DataTransferArgs),
    /// Run every job
    All,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ConcurrencyArgs {
    /// Input CSV file name, relative to --input-dir
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Load-generator concurrency of the row closing each group
    #[arg(long)]
    pub sentinel_load: Option<i64>,

    /// Skip rows with more errors than this
    #[arg(long)]
    pub max_errors: Option<i64>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct PayloadArgs {
    /// Input CSV file name, relative to --input-dir
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Load-generator concurrency of the row closing each averaging window
    #[arg(long)]
    pub boundary_load: Option<i64>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct DataTransferArgs {
    /// Number of leading lines read from each sample file
    #[arg(long)]
    pub sample_count: Option<usize>,

    /// Samples at or below this quantile are dropped
    #[arg(long)]
    pub low_quantile: Option<f64>,

    /// Samples at or above this quantile are dropped
    #[arg(long)]
    pub high_quantile: Option<f64>,
}

/// Apply per-job CLI overrides on top of the loaded configuration.
pub fn build_config(args: &Cli) -> Result<PlotConfig> {
    let mut cfg = PlotConfig::resolve(args.config.as_deref())?;
    match &args.command {
        Command::Concurrency(a) => {
            let c = &mut cfg.concurrency;
            if let Some(v) = &a.csv {
                c.csv = v.clone();
            }
            if let Some(v) = a.sentinel_load {
                c.sentinel_load = v;
            }
            if let Some(v) = a.max_errors {
                c.max_errors = v;
            }
        }
        Command::Payload(a) => {
            let p = &mut cfg.payload;
            if let Some(v) = &a.csv {
                p.csv = v.clone();
            }
            if let Some(v) = a.boundary_load {
                p.boundary_load = v;
            }
        }
        Command::DataTransfer(a) => {
            let t = &mut cfg.data_transfer.trim;
            if let Some(v) = a.sample_count {
                t.sample_count = v;
            }
            if let Some(v) = a.low_quantile {
                t.low_quantile = v;
            }
            if let Some(v) = a.high_quantile {
                t.high_quantile = v;
            }
        }
        Command::All => {}
    }
    Ok(cfg)
}

/// Build a `JobContext` from CLI arguments.
pub fn build_context(args: &Cli) -> JobContext {
    JobContext {
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        render: !args.no_render,
    }
}

fn selected_jobs(command: &Command) -> Vec<Job> {
    match command {
        Command::Concurrency(_) => vec![Job::Concurrency],
        Command::Payload(_) => vec![Job::Payload],
        Command::DataTransfer(_) => vec![Job::DataTransfer],
        Command::All => Job::ALL.to_vec(),
    }
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    let ctx = build_context(&args);
    let report = jobs::run_jobs(&selected_jobs(&args.command), &cfg, &ctx)?;

    handle_exports(&args, &report)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let json = serde_json::to_string_pretty(&report)?;
        writeln!(out, "{json}")?;
    } else {
        for line in crate::text_summary::build_text_summary(&report).lines {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

/// Handle export operations (JSON and CSV) for both text and JSON modes.
fn handle_exports(args: &Cli, report: &RunReport) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        crate::storage::export_json(p, report).context("JSON export failed")?;
        tracing::info!(path = %p.display(), "exported JSON");
    }
    if let Some(p) = args.export_csv.as_deref() {
        crate::storage::export_csv(p, report).context("CSV export failed")?;
        tracing::info!(path = %p.display(), "exported CSV");
    }
    Ok(())
}
