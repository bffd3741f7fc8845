//! The plotting jobs.
//!
//! Each job reads its inputs from `JobContext::input_dir`, reduces them through
//! the aggregation pipeline and renders its figures into
//! `JobContext::output_dir`. CLI layers call into this module and only deal with
//! the returned reports.

mod concurrency;
mod data_transfer;
mod payload;

pub use concurrency::{concurrency_series, run_concurrency};
pub use data_transfer::{run_data_transfer, transfer_points};
pub use payload::{payload_series, run_payload};

use crate::config::PlotConfig;
use crate::model::{JobReport, RunReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Concurrency,
    Payload,
    DataTransfer,
}

impl Job {
    pub const ALL: [Job; 3] = [Job::Concurrency, Job::Payload, Job::DataTransfer];

    pub fn name(self) -> &'static str {
        match self {
            Job::Concurrency => "concurrency",
            Job::Payload => "payload",
            Job::DataTransfer => "data-transfer",
        }
    }
}

/// Where a job reads and writes.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// When false, jobs compute their series but write no images.
    pub render: bool,
}

impl Default for JobContext {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            render: true,
        }
    }
}

impl JobContext {
    pub fn input(&self, name: &Path) -> PathBuf {
        self.input_dir.join(name)
    }

    /// Output path for `name`, or `None` when rendering is off.
    pub fn output(&self, name: &Path) -> Option<PathBuf> {
        self.render.then(|| self.output_dir.join(name))
    }
}

pub fn run_job(job: Job, cfg: &PlotConfig, ctx: &JobContext) -> Result<JobReport> {
    tracing::info!(job = job.name(), "running job");
    let report = match job {
        Job::Concurrency => JobReport::Concurrency(run_concurrency(&cfg.concurrency, ctx)?),
        Job::Payload => JobReport::Payload(run_payload(&cfg.payload, ctx)?),
        Job::DataTransfer => JobReport::DataTransfer(run_data_transfer(&cfg.data_transfer, ctx)?),
    };
    Ok(report)
}

/// Run `jobs` in order, stopping at the first failure.
pub fn run_jobs(jobs: &[Job], cfg: &PlotConfig, ctx: &JobContext) -> Result<RunReport> {
    if ctx.render {
        std::fs::create_dir_all(&ctx.output_dir)
            .with_context(|| format!("create {}", ctx.output_dir.display()))?;
    }
    let mut reports = Vec::with_capacity(jobs.len());
    for &job in jobs {
        let report = run_job(job, cfg, ctx).with_context(|| format!("{} job failed", job.name()))?;
        reports.push(report);
    }
    let timestamp_utc = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .context("format report timestamp")?;
    Ok(RunReport {
        timestamp_utc,
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs: reports,
    })
}
