//! Averaged latency/throughput per payload label, drawn as line plots.

use super::JobContext;
use crate::aggregate::{build_averaged_series, project_means, AveragedSeries};
use crate::charts::{self, LinePlot, Marker};
use crate::config::PayloadJobConfig;
use crate::error::PipelineError;
use crate::model::{self, AveragedMeasure, LabelSeries, Measure, PayloadReport, SampleRow};
use anyhow::Result;

/// Average `measure` over every window closed by a boundary-load row, filed
/// under that row's payload label.
pub fn payload_series(
    rows: &[SampleRow],
    cfg: &PayloadJobConfig,
    measure: Measure,
) -> Result<AveragedSeries<i64>, PipelineError> {
    build_averaged_series(
        rows,
        &cfg.labels,
        |r| r.payload_file.as_deref(),
        |r| r.ow_concurrency,
        |_| true,
        |r, row| measure.value(r, row),
        |r| r.load_concurrency == cfg.boundary_load,
    )
}

pub fn run_payload(cfg: &PayloadJobConfig, ctx: &JobContext) -> Result<PayloadReport> {
    let source = ctx.input(&cfg.csv);
    let rows = model::load_rows(&source)?;

    let mut measures = Vec::with_capacity(Measure::ALL.len());
    for measure in Measure::ALL {
        let series = payload_series(&rows, cfg, measure)?;

        let (output_name, marker) = match measure {
            Measure::Latency => (&cfg.latency_output, Marker::Circle),
            Measure::Throughput => (&cfg.throughput_output, Marker::Cross),
        };
        let output = ctx.output(output_name);
        if let Some(path) = output.as_deref() {
            let x: Vec<f64> = cfg.x_axis.iter().map(|&v| v as f64).collect();
            let lines: Vec<(String, Vec<(f64, f64)>)> = project_means(&series, x.len())?
                .into_iter()
                .map(|(label, means)| (label, x.iter().copied().zip(means).collect()))
                .collect();
            let ticks: Vec<(f64, String)> = cfg
                .x_axis
                .iter()
                .map(|&v| (v as f64, v.to_string()))
                .collect();
            charts::render_line_plot(
                path,
                &LinePlot {
                    title: measure.title(),
                    x_label: "Concurrency",
                    y_label: measure.axis_label(),
                    size: charts::DEFAULT_SIZE,
                    x_ticks: &ticks,
                    series: &lines,
                    marker,
                },
            )?;
            tracing::info!(path = %path.display(), series = lines.len(), "wrote line plot");
        }

        measures.push(AveragedMeasure {
            measure,
            x_axis: cfg.x_axis.clone(),
            series: series
                .into_iter()
                .map(|(label, points)| LabelSeries { label, points })
                .collect(),
            output,
        });
    }

    Ok(PayloadReport { source, measures })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
ow concurrency,loadtestconcurrency,errors,realtotaltime(msec),rps,payloadfile
1,1,0,10(msec),4,timeout30
1,10,50,20(msec),6,timeout30
1,1,0,30(msec),1,timeout30payload1K
1,10,0,50(msec),3,timeout30payload1K
2,10,0,8(msec),9,timeout30
";

    #[test]
    fn boundaries_average_everything_since_last_reset() {
        let rows = model::read_rows(CSV.as_bytes()).unwrap();
        let s = payload_series(&rows, &PayloadJobConfig::default(), Measure::Latency).unwrap();
        assert_eq!(s["timeout30"], vec![(1, 15.0), (2, 8.0)]);
        assert_eq!(s["timeout30payload1K"], vec![(1, 40.0)]);
        assert!(s["timeout30payload100K"].is_empty());
        assert!(s["timeout30payload1M"].is_empty());
    }

    #[test]
    fn error_counts_do_not_filter_payload_rows() {
        let rows = model::read_rows(CSV.as_bytes()).unwrap();
        let s = payload_series(&rows, &PayloadJobConfig::default(), Measure::Throughput).unwrap();
        assert_eq!(s["timeout30"][0], (1, 5.0));
    }

    #[test]
    fn unexpected_label_fails_the_job() {
        let csv = "ow concurrency,loadtestconcurrency,errors,realtotaltime(msec),rps,payloadfile\n\
                   1,10,0,1(msec),1,timeout60\n";
        let rows = model::read_rows(csv.as_bytes()).unwrap();
        let err = payload_series(&rows, &PayloadJobConfig::default(), Measure::Latency).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownLabel { row: 1, .. }));
    }
}
