//! PNG rendering of box plots and line plots.

use crate::metrics::BoxStats;
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// 6.4x4.8 inches at 100 dpi.
pub const DEFAULT_SIZE: (u32, u32) = (640, 480);
/// Size of the data-transfer figures (9x6 inches).
pub const WIDE_SIZE: (u32, u32) = (900, 600);

const FONT: &str = "sans-serif";
const MEDIAN_COLOR: RGBColor = RGBColor(255, 127, 14);
const BOX_HALF_WIDTH: f64 = 0.25;
const CAP_HALF_WIDTH: f64 = 0.125;

/// `WithKeyPoints<RangedCoordf64>` inherits `NoDefaultFormatting` and so has no
/// `ValueFormatter`, which `configure_mesh` requires. Every call site supplies
/// its own `x_label_formatter`, so this wrapper only flips the format marker.
struct KeyPointAxis(
    plotters::coord::combinators::WithKeyPoints<plotters::coord::types::RangedCoordf64>,
);

impl Ranged for KeyPointAxis {
    type FormatOption = plotters::coord::ranged1d::DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: plotters::coord::ranged1d::KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn range(&self) -> Range<f64> {
        self.0.range()
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

fn plot_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("plotting failed: {e}")
}

/// Axis range covering `values` with 5% headroom on both ends.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Label for an x tick at `x` when ticks sit on the integers `1..=labels.len()`.
fn tick_label(labels: &[String], x: f64, first: f64) -> String {
    let idx = (x - first).round();
    if (x - first - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

pub struct BoxPlot<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// One box per group, drawn left to right at x = 1, 2, ...
    pub groups: &'a [(String, Option<BoxStats>)],
}

/// Draw one box-and-whisker glyph per group. Groups without statistics keep
/// their slot and tick label but draw nothing.
pub fn render_box_plot(path: &Path, plot: &BoxPlot) -> Result<()> {
    let n = plot.groups.len().max(1);
    let labels: Vec<String> = plot.groups.iter().map(|(l, _)| l.clone()).collect();
    let ticks: Vec<f64> = (1..=n).map(|i| i as f64).collect();
    let y_range = padded_range(
        plot.groups
            .iter()
            .filter_map(|(_, s)| s.as_ref())
            .flat_map(|s| [s.whisker_low, s.whisker_high]),
    );

    let root = BitMapBackend::new(path, DEFAULT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(plot.title, (FONT, 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            KeyPointAxis((0.5..n as f64 + 0.5).with_key_points(ticks)),
            y_range,
        )
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .x_labels(n)
        .x_desc(plot.x_label)
        .y_desc(plot.y_label)
        .x_label_formatter(&|x| tick_label(&labels, *x, 1.0))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()
        .map_err(plot_err)?;

    let mut segments: Vec<PathElement<(f64, f64)>> = Vec::new();
    let mut medians: Vec<PathElement<(f64, f64)>> = Vec::new();
    let mut boxes: Vec<Rectangle<(f64, f64)>> = Vec::new();
    for (i, (_, stats)) in plot.groups.iter().enumerate() {
        let Some(s) = stats else { continue };
        let x = (i + 1) as f64;

        boxes.push(Rectangle::new(
            [(x - BOX_HALF_WIDTH, s.q1), (x + BOX_HALF_WIDTH, s.q3)],
            BLACK.stroke_width(1),
        ));
        medians.push(PathElement::new(
            vec![(x - BOX_HALF_WIDTH, s.median), (x + BOX_HALF_WIDTH, s.median)],
            MEDIAN_COLOR.stroke_width(2),
        ));
        // whiskers
        segments.push(PathElement::new(vec![(x, s.q1), (x, s.whisker_low)], BLACK));
        segments.push(PathElement::new(vec![(x, s.q3), (x, s.whisker_high)], BLACK));
        // caps
        for y in [s.whisker_low, s.whisker_high] {
            segments.push(PathElement::new(
                vec![(x - CAP_HALF_WIDTH, y), (x + CAP_HALF_WIDTH, y)],
                BLACK,
            ));
        }
    }
    chart.draw_series(boxes).map_err(plot_err)?;
    chart.draw_series(segments).map_err(plot_err)?;
    chart.draw_series(medians).map_err(plot_err)?;

    root.present()
        .map_err(plot_err)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Cross,
}

pub struct LinePlot<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub size: (u32, u32),
    /// Tick positions and their labels.
    pub x_ticks: &'a [(f64, String)],
    /// Named series of `(x, y)` points. Names are shown in a legend when there
    /// is more than one series.
    pub series: &'a [(String, Vec<(f64, f64)>)],
    pub marker: Marker,
}

pub fn render_line_plot(path: &Path, plot: &LinePlot) -> Result<()> {
    let tick_xs: Vec<f64> = plot.x_ticks.iter().map(|(x, _)| *x).collect();
    let x_range = padded_range(
        tick_xs
            .iter()
            .copied()
            .chain(plot.series.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.0))),
    );
    let y_range = padded_range(plot.series.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.1)));
    let with_legend = plot.series.len() > 1;

    let root = BitMapBackend::new(path, plot.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(plot.title, (FONT, 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(KeyPointAxis(x_range.with_key_points(tick_xs)), y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .x_labels(plot.x_ticks.len().max(1))
        .x_desc(plot.x_label)
        .y_desc(plot.y_label)
        .x_label_formatter(&|x| {
            plot.x_ticks
                .iter()
                .find(|(t, _)| (t - x).abs() < 1e-6)
                .map(|(_, l)| l.clone())
                .unwrap_or_default()
        })
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()
        .map_err(plot_err)?;

    for (idx, (name, points)) in plot.series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let drawn = chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(plot_err)?;
        if with_legend {
            drawn.label(name.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }

        match plot.marker {
            Marker::None => {}
            Marker::Circle => {
                chart
                    .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                    .map_err(plot_err)?;
            }
            Marker::Cross => {
                chart
                    .draw_series(points.iter().map(|&p| Cross::new(p, 4, color.stroke_width(2))))
                    .map_err(plot_err)?;
            }
        }
    }

    if with_legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font((FONT, 10).into_font())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }

    root.present()
        .map_err(plot_err)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_adds_headroom() {
        let r = padded_range([10.0, 20.0]);
        assert!((r.start - 9.5).abs() < 1e-9);
        assert!((r.end - 20.5).abs() < 1e-9);
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range([5.0]), 4.0..6.0);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(padded_range([f64::NAN, 3.0]), 2.0..4.0);
    }

    #[test]
    fn tick_labels_only_on_integer_slots() {
        let labels = vec!["1".to_string(), "5".to_string()];
        assert_eq!(tick_label(&labels, 1.0, 1.0), "1");
        assert_eq!(tick_label(&labels, 2.0, 1.0), "5");
        assert_eq!(tick_label(&labels, 1.5, 1.0), "");
        assert_eq!(tick_label(&labels, 3.0, 1.0), "");
        assert_eq!(tick_label(&labels, 0.0, 1.0), "");
    }

    fn is_png(path: &Path) -> bool {
        let bytes = std::fs::read(path).unwrap();
        bytes.starts_with(b"\x89PNG")
    }

    #[test]
    fn box_plot_with_only_empty_groups_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let groups = vec![("1".to_string(), None), ("5".to_string(), None)];
        render_box_plot(
            &path,
            &BoxPlot {
                title: "Concurrency-Latency",
                x_label: "Concurrency",
                y_label: "Latency(ms)",
                groups: &groups,
            },
        )
        .unwrap();
        assert!(is_png(&path));
    }

    #[test]
    fn single_series_line_plot_renders_without_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line.png");
        let ticks = vec![(1.0, "1".to_string()), (2.0, "2".to_string())];
        let series = vec![("only".to_string(), vec![(1.0, 3.0), (2.0, 4.5)])];
        render_line_plot(
            &path,
            &LinePlot {
                title: "t",
                x_label: "x",
                y_label: "y",
                size: WIDE_SIZE,
                x_ticks: &ticks,
                series: &series,
                marker: Marker::None,
            },
        )
        .unwrap();
        assert!(is_png(&path));
    }

    #[test]
    fn write_failure_names_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("box.png");
        let stats = crate::metrics::box_stats(&[1.0, 2.0, 3.0]);
        let groups = vec![("1".to_string(), stats)];
        let err = render_box_plot(
            &path,
            &BoxPlot {
                title: "t",
                x_label: "x",
                y_label: "y",
                groups: &groups,
            },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("box.png"));
    }
}
