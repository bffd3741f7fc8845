//! Trimmed-mean latency per payload size, from the raw `Result-<size>.csv` files.

use super::JobContext;
use crate::charts::{self, LinePlot, Marker};
use crate::config::{DataTransferJobConfig, PayloadSize};
use crate::model::{DataTransferReport, TransferPoint};
use crate::samples;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Trimmed mean of each configured size, in configuration order.
pub fn transfer_points(input_dir: &Path, cfg: &DataTransferJobConfig) -> Result<Vec<TransferPoint>> {
    cfg.sizes
        .iter()
        .map(|PayloadSize { bytes, label }| {
            let source = samples::sample_file_path(input_dir, *bytes);
            let trimmed = samples::trimmed_mean_from_file(&source, &cfg.trim)?;
            Ok(TransferPoint {
                bytes: *bytes,
                label: label.clone(),
                source,
                trimmed,
            })
        })
        .collect()
}

fn render(path: &Path, points: &[TransferPoint]) -> Result<()> {
    let ticks: Vec<(f64, String)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.label.clone()))
        .collect();
    let line: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.trimmed.mean))
        .collect();
    let series = [(String::from("latency"), line)];
    charts::render_line_plot(
        path,
        &LinePlot {
            title: "Payload-Latency",
            x_label: "Payload in KBytes",
            y_label: "Latency (ms)",
            size: charts::WIDE_SIZE,
            x_ticks: &ticks,
            series: &series,
            marker: Marker::None,
        },
    )?;
    tracing::info!(path = %path.display(), points = points.len(), "wrote line plot");
    Ok(())
}

pub fn run_data_transfer(cfg: &DataTransferJobConfig, ctx: &JobContext) -> Result<DataTransferReport> {
    let points = transfer_points(&ctx.input_dir, cfg)?;
    let partial_len = cfg.partial_len.min(points.len());

    let output: Option<PathBuf> = ctx.output(&cfg.output);
    if let Some(path) = output.as_deref() {
        render(path, &points)?;
    }
    let partial_output: Option<PathBuf> = ctx.output(&cfg.partial_output);
    if let Some(path) = partial_output.as_deref() {
        render(path, &points[..partial_len])?;
    }

    Ok(DataTransferReport {
        points,
        partial_len,
        output,
        partial_output,
    })
}
