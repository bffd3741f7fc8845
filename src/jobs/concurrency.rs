//! Latency and throughput box plots per platform concurrency level.

use super::JobContext;
use crate::aggregate::{build_grouped_series, Grouped};
use crate::charts::{self, BoxPlot};
use crate::config::ConcurrencyJobConfig;
use crate::error::PipelineError;
use crate::metrics;
use crate::model::{self, ConcurrencyReport, GroupSummary, GroupedMeasure, Measure, SampleRow};
use anyhow::Result;

/// Group `measure` by platform concurrency. Each group closes on its
/// sentinel-load row and skips rows with too many errors.
pub fn concurrency_series(
    rows: &[SampleRow],
    cfg: &ConcurrencyJobConfig,
    measure: Measure,
) -> Result<Grouped<i64, i64>, PipelineError> {
    build_grouped_series(
        rows,
        |r| r.ow_concurrency,
        |r| r.errors <= cfg.max_errors,
        |r, row| measure.value(r, row),
        |r| r.load_concurrency == cfg.sentinel_load,
    )
}

fn summarize(groups: Grouped<i64, i64>) -> Vec<GroupSummary> {
    groups
        .into_iter()
        .map(|(key, samples)| {
            let values: Vec<f64> = samples.iter().map(|&v| v as f64).collect();
            GroupSummary {
                key,
                stats: metrics::box_stats(&values),
                samples,
            }
        })
        .collect()
}

pub fn run_concurrency(cfg: &ConcurrencyJobConfig, ctx: &JobContext) -> Result<ConcurrencyReport> {
    let source = ctx.input(&cfg.csv);
    let rows = model::load_rows(&source)?;

    let mut measures = Vec::with_capacity(Measure::ALL.len());
    for measure in Measure::ALL {
        let groups = summarize(concurrency_series(&rows, cfg, measure)?);
        for g in groups.iter().filter(|g| g.samples.is_empty()) {
            tracing::warn!(measure = measure.as_str(), key = g.key, "group has no qualifying rows");
        }

        let output_name = match measure {
            Measure::Latency => &cfg.latency_output,
            Measure::Throughput => &cfg.throughput_output,
        };
        let output = ctx.output(output_name);
        if let Some(path) = output.as_deref() {
            let boxes: Vec<(String, Option<metrics::BoxStats>)> =
                groups.iter().map(|g| (g.key.to_string(), g.stats)).collect();
            charts::render_box_plot(
                path,
                &BoxPlot {
                    title: measure.title(),
                    x_label: "Concurrency",
                    y_label: measure.axis_label(),
                    groups: &boxes,
                },
            )?;
            tracing::info!(path = %path.display(), groups = boxes.len(), "wrote box plot");
        }

        measures.push(GroupedMeasure {
            measure,
            groups,
            output,
        });
    }

    Ok(ConcurrencyReport { source, measures })
}
