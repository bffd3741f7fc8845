//! Text summary builder for CLI output.
//!
//! This module formats human-readable lines for text mode.

use crate::model::{ConcurrencyReport, DataTransferReport, JobReport, PayloadReport, RunReport};

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

fn concurrency_lines(lines: &mut Vec<String>, report: &ConcurrencyReport) {
    lines.push(format!("== concurrency ({}) ==", report.source.display()));
    for m in &report.measures {
        lines.push(format!("{}:", m.measure.axis_label()));
        for g in &m.groups {
            match g.stats {
                Some(s) => lines.push(format!(
                    "  {:>4}: n {:<3} avg {:.1} med {:.1} q1 {:.1} q3 {:.1} whiskers {:.1}..{:.1}",
                    g.key, s.count, s.mean, s.median, s.q1, s.q3, s.whisker_low, s.whisker_high
                )),
                None => lines.push(format!("  {:>4}: no qualifying rows", g.key)),
            }
        }
        if let Some(p) = m.output.as_deref() {
            lines.push(format!("  -> {}", p.display()));
        }
    }
}

fn payload_lines(lines: &mut Vec<String>, report: &PayloadReport) {
    lines.push(format!("== payload ({}) ==", report.source.display()));
    for m in &report.measures {
        lines.push(format!("{}:", m.measure.axis_label()));
        for s in &m.series {
            let means: Vec<String> = s.points.iter().map(|(_, y)| format!("{y:.1}")).collect();
            lines.push(format!("  {:<22} [{}]", s.label, means.join(", ")));
        }
        if let Some(p) = m.output.as_deref() {
            lines.push(format!("  -> {}", p.display()));
        }
    }
}

fn data_transfer_lines(lines: &mut Vec<String>, report: &DataTransferReport) {
    lines.push("== data-transfer ==".to_string());
    for p in &report.points {
        lines.push(format!(
            "  {:>7} B ({:>5} KB): trimmed mean {:.2} ms over {} samples",
            p.bytes,
            p.label,
            p.trimmed.mean,
            p.trimmed.retained.len()
        ));
    }
    for p in [&report.output, &report.partial_output].into_iter().flatten() {
        lines.push(format!("  -> {}", p.display()));
    }
}

/// Build a text summary of every job in the run.
pub fn build_text_summary(report: &RunReport) -> TextSummary {
    let mut lines = Vec::new();
    for job in &report.jobs {
        match job {
            JobReport::Concurrency(c) => concurrency_lines(&mut lines, c),
            JobReport::Payload(p) => payload_lines(&mut lines, p),
            JobReport::DataTransfer(d) => data_transfer_lines(&mut lines, d),
        }
    }
    TextSummary { lines }
}
