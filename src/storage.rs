//! JSON and CSV exports of a run report.

use crate::model::{JobReport, RunReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub fn export_json(path: &Path, report: &RunReport) -> Result<()> {
    let out = serde_json::to_string_pretty(report)?;
    std::fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// One flat record of the CSV export.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    job: &'static str,
    measure: &'a str,
    group: String,
    x: String,
    stat: &'static str,
    value: f64,
}

fn export_rows(report: &RunReport) -> Vec<ExportRow<'_>> {
    let mut rows = Vec::new();
    for job in &report.jobs {
        match job {
            JobReport::Concurrency(c) => {
                for m in &c.measures {
                    for g in &m.groups {
                        let mut push = |stat, value| {
                            rows.push(ExportRow {
                                job: "concurrency",
                                measure: m.measure.as_str(),
                                group: g.key.to_string(),
                                x: g.key.to_string(),
                                stat,
                                value,
                            })
                        };
                        push("count", g.samples.len() as f64);
                        if let Some(s) = g.stats {
                            push("whisker_low", s.whisker_low);
                            push("q1", s.q1);
                            push("median", s.median);
                            push("q3", s.q3);
                            push("whisker_high", s.whisker_high);
                            push("mean", s.mean);
                        }
                    }
                }
            }
            JobReport::Payload(p) => {
                for m in &p.measures {
                    for series in &m.series {
                        for (x, mean) in &series.points {
                            rows.push(ExportRow {
                                job: "payload",
                                measure: m.measure.as_str(),
                                group: series.label.clone(),
                                x: x.to_string(),
                                stat: "mean",
                                value: *mean,
                            });
                        }
                    }
                }
            }
            JobReport::DataTransfer(d) => {
                for p in &d.points {
                    rows.push(ExportRow {
                        job: "data-transfer",
                        measure: "latency",
                        group: p.bytes.to_string(),
                        x: p.label.clone(),
                        stat: "trimmed_mean",
                        value: p.trimmed.mean,
                    });
                }
            }
        }
    }
    rows
}

/// Write the report as CSV, one row per (job, measure, group, x, stat).
pub fn write_csv<W: Write>(writer: W, report: &RunReport) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    for row in export_rows(report) {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, report: &RunReport) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, report).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::box_stats;
    use crate::model::{ConcurrencyReport, GroupSummary, GroupedMeasure, Measure};

    fn report() -> RunReport {
        RunReport {
            timestamp_utc: "2024-01-01T00:00:00Z".into(),
            version: "0.1.0".into(),
            jobs: vec![JobReport::Concurrency(ConcurrencyReport {
                source: "ConcurrencyLatency.csv".into(),
                measures: vec![GroupedMeasure {
                    measure: Measure::Latency,
                    groups: vec![
                        GroupSummary {
                            key: 1,
                            samples: vec![10, 20],
                            stats: box_stats(&[10.0, 20.0]),
                        },
                        GroupSummary {
                            key: 2,
                            samples: vec![],
                            stats: None,
                        },
                    ],
                    output: None,
                }],
            })],
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_stat() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "job,measure,group,x,stat,value");
        // 7 rows for the populated group, 1 for the empty one
        assert_eq!(lines.len(), 1 + 7 + 1);
        assert!(lines.contains(&"concurrency,latency,1,1,median,15.0"));
        assert!(lines.contains(&"concurrency,latency,2,2,count,0.0"));
    }

    #[test]
    fn json_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_json(&path, &report()).unwrap();
        let back: RunReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report());
    }
}
