//! Chart plotting.
//!
//! Charts are drawn from cached series data with a fixed visual style:
//! light gray axes and gridlines, small gray labels, and the document
//! accent palette for series without an explicit color.

use crate::model::chart::{Chart, ChartType};
use crate::pptx::chart::DEFAULT_SERIES_COLORS;
use crate::render::context::RenderContext;
use crate::render::svg::{escape, px};
use std::f64::consts::PI;
use std::fmt::Write;

const AXIS_COLOR: &str = "#D9D9D9";
const LABEL_COLOR: &str = "#595959";
const LABEL_SIZE: f64 = 10.0;
const TITLE_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy)]
struct PlotRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Render a chart into its local `0..width` by `0..height` frame.
pub fn render_chart(chart: &Chart, width: f64, height: f64, ctx: &RenderContext) -> String {
    let mut out = String::new();

    let mut top = 4.0;
    if let Some(title) = &chart.title {
        let _ = writeln!(
            out,
            r##"<text x="{}" y="{}" font-family="sans-serif" font-size="{TITLE_SIZE}" fill="#404040" text-anchor="middle">{}</text>"##,
            px(width / 2.0),
            px(top + TITLE_SIZE),
            escape(title)
        );
        top += TITLE_SIZE + 10.0;
    }

    let mut plot = PlotRect {
        x: 8.0,
        y: top,
        w: (width - 16.0).max(10.0),
        h: (height - top - 8.0).max(10.0),
    };
    if let Some(legend) = &chart.legend {
        match legend.position.as_str() {
            "b" => plot.h = (plot.h - 18.0).max(10.0),
            "t" => {
                plot.y += 18.0;
                plot.h = (plot.h - 18.0).max(10.0);
            }
            "l" => {
                plot.x += 90.0;
                plot.w = (plot.w - 90.0).max(10.0);
            }
            _ => plot.w = (plot.w - 90.0).max(10.0),
        }
    }

    let body = match chart.chart_type {
        ChartType::Pie => pie(chart, plot, None),
        ChartType::Doughnut => pie(chart, plot, Some(chart.hole_size.unwrap_or(50.0) / 100.0)),
        ChartType::OfPie => of_pie(chart, plot, ctx),
        ChartType::Bar => bar(chart, axis_plot(plot)),
        ChartType::Line | ChartType::Stock => {
            let plot = axis_plot(plot);
            let mut s = cartesian_frame(chart, plot);
            s.push_str(&line(chart, plot, false));
            s
        }
        ChartType::Area | ChartType::Surface => {
            let plot = axis_plot(plot);
            let mut s = cartesian_frame(chart, plot);
            s.push_str(&line(chart, plot, true));
            s
        }
        ChartType::Scatter | ChartType::Bubble => {
            let plot = axis_plot(plot);
            let mut s = cartesian_frame(chart, plot);
            s.push_str(&scatter(chart, plot));
            s
        }
        ChartType::Radar => radar(chart, plot),
    };
    out.push_str(&body);

    if let Some(legend) = &chart.legend {
        out.push_str(&legend_items(chart, legend.position.as_str(), width, height));
    }
    out
}

/// Inset for the value-axis labels on cartesian charts.
fn axis_plot(plot: PlotRect) -> PlotRect {
    PlotRect {
        x: plot.x + 32.0,
        y: plot.y,
        w: (plot.w - 32.0).max(10.0),
        h: (plot.h - 16.0).max(10.0),
    }
}

fn value_range(chart: &Chart) -> (f64, f64) {
    let mut min = 0.0_f64;
    let mut max = 0.0_f64;
    for series in &chart.series {
        for &v in &series.values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if (max - min).abs() < f64::EPSILON {
        max = min + 1.0;
    }
    (min, max)
}

fn series_color(chart: &Chart, index: usize) -> String {
    chart
        .series
        .get(index)
        .map(|s| s.color.hex.clone())
        .unwrap_or_else(|| DEFAULT_SERIES_COLORS[index % DEFAULT_SERIES_COLORS.len()].to_string())
}

fn point_color(index: usize) -> &'static str {
    DEFAULT_SERIES_COLORS[index % DEFAULT_SERIES_COLORS.len()]
}

/// Axes, horizontal gridlines and value labels shared by the cartesian
/// chart kinds.
fn cartesian_frame(chart: &Chart, plot: PlotRect) -> String {
    let (min, max) = value_range(chart);
    let mut out = String::new();
    let ticks = 4;
    for i in 0..=ticks {
        let frac = i as f64 / ticks as f64;
        let value = min + (max - min) * (1.0 - frac);
        let y = plot.y + plot.h * frac;
        let _ = writeln!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{AXIS_COLOR}"/>"#,
            px(plot.x),
            px(y),
            px(plot.x + plot.w),
            px(y)
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{LABEL_SIZE}" fill="{LABEL_COLOR}" text-anchor="end">{}</text>"#,
            px(plot.x - 4.0),
            px(y + 3.0),
            format_value(value)
        );
    }
    // Category labels under the axis.
    let n = chart.categories.len();
    if n > 0 {
        let step = plot.w / n as f64;
        for (i, cat) in chart.categories.iter().enumerate() {
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{LABEL_SIZE}" fill="{LABEL_COLOR}" text-anchor="middle">{}</text>"#,
                px(plot.x + step * (i as f64 + 0.5)),
                px(plot.y + plot.h + 12.0),
                escape(cat)
            );
        }
    }
    out
}

fn format_value(v: f64) -> String {
    if v.abs() >= 100.0 || (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.1}")
    }
}

fn bar(chart: &Chart, plot: PlotRect) -> String {
    let horizontal = chart.bar_direction.as_deref() == Some("bar");
    let (min, max) = value_range(chart);
    let span = max - min;
    let series_count = chart.series.len().max(1);
    let cat_count = chart
        .series
        .iter()
        .map(|s| s.values.len())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut out = cartesian_frame(chart, plot);
    let slot = if horizontal {
        plot.h / cat_count as f64
    } else {
        plot.w / cat_count as f64
    };
    let bar_size = slot * 0.7 / series_count as f64;
    let zero = ((0.0 - min) / span).clamp(0.0, 1.0);

    for (si, series) in chart.series.iter().enumerate() {
        let color = series_color(chart, si);
        for (vi, &value) in series.values.iter().enumerate() {
            let frac = (value - min) / span;
            let along = slot * vi as f64 + slot * 0.15 + bar_size * si as f64;
            let (lo, hi) = (frac.min(zero), frac.max(zero));
            let (x, y, w, h) = if horizontal {
                (
                    plot.x + plot.w * lo,
                    plot.y + along,
                    plot.w * (hi - lo),
                    bar_size,
                )
            } else {
                (
                    plot.x + along,
                    plot.y + plot.h * (1.0 - hi),
                    bar_size,
                    plot.h * (hi - lo),
                )
            };
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
                px(x),
                px(y),
                px(w.max(0.5)),
                px(h.max(0.5))
            );
        }
    }
    out
}

fn line(chart: &Chart, plot: PlotRect, filled: bool) -> String {
    let (min, max) = value_range(chart);
    let span = max - min;
    let mut out = String::new();
    for (si, series) in chart.series.iter().enumerate() {
        if series.values.is_empty() {
            continue;
        }
        let color = series_color(chart, si);
        let n = series.values.len();
        let step = if n > 1 { plot.w / (n - 1) as f64 } else { 0.0 };
        let mut points = String::new();
        for (vi, &value) in series.values.iter().enumerate() {
            let x = plot.x + step * vi as f64;
            let y = plot.y + plot.h * (1.0 - (value - min) / span);
            let _ = write!(points, "{},{} ", px(x), px(y));
        }
        if filled {
            let baseline = plot.y + plot.h * (1.0 - (0.0 - min) / span).clamp(0.0, 1.0);
            let _ = writeln!(
                out,
                r#"<polygon points="{}{},{} {},{}" fill="{color}" fill-opacity="0.7"/>"#,
                points,
                px(plot.x + step * (n - 1) as f64),
                px(baseline),
                px(plot.x),
                px(baseline)
            );
        } else {
            let _ = writeln!(
                out,
                r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
                points.trim_end()
            );
        }
    }
    out
}

fn scatter(chart: &Chart, plot: PlotRect) -> String {
    let (y_min, y_max) = value_range(chart);
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    for series in &chart.series {
        if let Some(xs) = &series.x_values {
            for &x in xs {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
            }
        }
    }
    if x_min > x_max {
        x_min = 0.0;
        x_max = 1.0;
    }
    if (x_max - x_min).abs() < f64::EPSILON {
        x_max = x_min + 1.0;
    }

    let mut out = String::new();
    for (si, series) in chart.series.iter().enumerate() {
        let color = series_color(chart, si);
        let max_bubble = series
            .bubble_sizes
            .as_ref()
            .map(|sizes| sizes.iter().cloned().fold(0.0_f64, f64::max))
            .filter(|m| *m > 0.0);
        for (vi, &value) in series.values.iter().enumerate() {
            let x_value = series
                .x_values
                .as_ref()
                .and_then(|xs| xs.get(vi).copied())
                .unwrap_or(vi as f64);
            let x = plot.x + plot.w * (x_value - x_min) / (x_max - x_min);
            let y = plot.y + plot.h * (1.0 - (value - y_min) / (y_max - y_min));
            let r = match (&series.bubble_sizes, max_bubble) {
                (Some(sizes), Some(max)) => {
                    let size = sizes.get(vi).copied().unwrap_or(0.0);
                    3.0 + (size / max).sqrt() * plot.w.min(plot.h) * 0.08
                }
                _ => 3.0,
            };
            let _ = writeln!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{color}" fill-opacity="0.8"/>"#,
                px(x),
                px(y),
                px(r)
            );
        }
    }
    out
}

fn pie_slices(values: &[f64], cx: f64, cy: f64, radius: f64, hole: Option<f64>) -> String {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return String::new();
    }
    let inner = hole.map(|frac| radius * frac.clamp(0.0, 0.95));
    let mut out = String::new();
    let mut angle = -PI / 2.0;
    for (i, &value) in values.iter().enumerate() {
        if value <= 0.0 {
            continue;
        }
        let sweep = value / total * 2.0 * PI;
        let end = angle + sweep;
        let large = if sweep > PI { 1 } else { 0 };
        let (sx, sy) = (cx + radius * angle.cos(), cy + radius * angle.sin());
        let (ex, ey) = (cx + radius * end.cos(), cy + radius * end.sin());
        let d = match inner {
            Some(ir) => {
                let (isx, isy) = (cx + ir * angle.cos(), cy + ir * angle.sin());
                let (iex, iey) = (cx + ir * end.cos(), cy + ir * end.sin());
                format!(
                    "M {} {} A {r} {r} 0 {large} 1 {} {} L {} {} A {ir} {ir} 0 {large} 0 {} {} Z",
                    px(sx),
                    px(sy),
                    px(ex),
                    px(ey),
                    px(iex),
                    px(iey),
                    px(isx),
                    px(isy),
                    r = px(radius),
                    ir = px(ir)
                )
            }
            None => format!(
                "M {} {} L {} {} A {r} {r} 0 {large} 1 {} {} Z",
                px(cx),
                px(cy),
                px(sx),
                px(sy),
                px(ex),
                px(ey),
                r = px(radius)
            ),
        };
        let _ = writeln!(
            out,
            r##"<path d="{d}" fill="{}" stroke="#FFFFFF"/>"##,
            point_color(i)
        );
        angle = end;
    }
    out
}

/// Pie and doughnut color per data point, first slice starting at 12
/// o'clock and sweeping clockwise.
fn pie(chart: &Chart, plot: PlotRect, hole: Option<f64>) -> String {
    let values: &[f64] = chart
        .series
        .first()
        .map(|s| s.values.as_slice())
        .unwrap_or(&[]);
    let cx = plot.x + plot.w / 2.0;
    let cy = plot.y + plot.h / 2.0;
    let radius = plot.w.min(plot.h) / 2.0 - 2.0;
    pie_slices(values, cx, cy, radius.max(1.0), hole)
}

/// Of-pie: the main pie plus a smaller secondary pie of the trailing
/// values. A "bar" secondary plot is approximated by the pie form.
fn of_pie(chart: &Chart, plot: PlotRect, ctx: &RenderContext) -> String {
    let values: &[f64] = chart
        .series
        .first()
        .map(|s| s.values.as_slice())
        .unwrap_or(&[]);
    if chart.of_pie_type.as_deref() == Some("bar") {
        ctx.warn("of-pie-bar", "bar-of-pie secondary plot rendered as pie");
    }
    // splitPos counts the trailing values moved to the secondary plot.
    let secondary_count = chart.split_pos.unwrap_or(2).min(values.len());
    let (main, secondary) = values.split_at(values.len() - secondary_count);

    let second_frac = chart.second_pie_size.unwrap_or(75.0) / 100.0;
    let main_r = (plot.w * 0.55).min(plot.h).max(2.0) / 2.0 - 2.0;
    let second_r = main_r * second_frac.clamp(0.1, 1.0);
    let mut out = pie_slices(
        main,
        plot.x + main_r + 2.0,
        plot.y + plot.h / 2.0,
        main_r.max(1.0),
        None,
    );
    out.push_str(&pie_slices(
        secondary,
        plot.x + plot.w - second_r - 2.0,
        plot.y + plot.h / 2.0,
        second_r.max(1.0),
        None,
    ));
    out
}

fn radar(chart: &Chart, plot: PlotRect) -> String {
    let spokes = chart
        .series
        .iter()
        .map(|s| s.values.len())
        .max()
        .unwrap_or(0)
        .max(3);
    let (min, max) = value_range(chart);
    let span = max - min;
    let cx = plot.x + plot.w / 2.0;
    let cy = plot.y + plot.h / 2.0;
    let radius = plot.w.min(plot.h) / 2.0 - 4.0;

    let spoke_point = |i: usize, frac: f64| {
        let angle = -PI / 2.0 + 2.0 * PI * i as f64 / spokes as f64;
        (
            cx + radius * frac * angle.cos(),
            cy + radius * frac * angle.sin(),
        )
    };

    let mut out = String::new();
    for i in 0..spokes {
        let (x, y) = spoke_point(i, 1.0);
        let _ = writeln!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{AXIS_COLOR}"/>"#,
            px(cx),
            px(cy),
            px(x),
            px(y)
        );
    }
    let filled = chart.radar_style.as_deref() == Some("filled");
    for (si, series) in chart.series.iter().enumerate() {
        if series.values.is_empty() {
            continue;
        }
        let color = series_color(chart, si);
        let mut points = String::new();
        for (vi, &value) in series.values.iter().enumerate() {
            let frac = ((value - min) / span).clamp(0.0, 1.0);
            let (x, y) = spoke_point(vi, frac);
            let _ = write!(points, "{},{} ", px(x), px(y));
        }
        if filled {
            let _ = writeln!(
                out,
                r#"<polygon points="{}" fill="{color}" fill-opacity="0.5" stroke="{color}"/>"#,
                points.trim_end()
            );
        } else {
            let _ = writeln!(
                out,
                r#"<polygon points="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
                points.trim_end()
            );
        }
    }
    out
}

fn legend_items(chart: &Chart, position: &str, width: f64, height: f64) -> String {
    let labels: Vec<(String, String)> = if matches!(
        chart.chart_type,
        ChartType::Pie | ChartType::Doughnut | ChartType::OfPie
    ) {
        chart
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), point_color(i).to_string()))
            .collect()
    } else {
        chart
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                (
                    s.name.clone().unwrap_or_else(|| format!("Series {}", i + 1)),
                    series_color(chart, i),
                )
            })
            .collect()
    };
    if labels.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    match position {
        "b" | "t" => {
            let y = if position == "b" { height - 12.0 } else { 14.0 };
            let step = width / labels.len() as f64;
            for (i, (name, color)) in labels.iter().enumerate() {
                let x = step * i as f64 + step / 2.0 - 20.0;
                let _ = writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="8" height="8" fill="{color}"/><text x="{}" y="{}" font-family="sans-serif" font-size="{LABEL_SIZE}" fill="{LABEL_COLOR}">{}</text>"#,
                    px(x),
                    px(y - 7.0),
                    px(x + 11.0),
                    px(y),
                    escape(name)
                );
            }
        }
        _ => {
            let x = if position == "l" { 4.0 } else { width - 86.0 };
            let mut y = (height - labels.len() as f64 * 14.0) / 2.0 + 8.0;
            for (name, color) in &labels {
                let _ = writeln!(
                    out,
                    r#"<rect x="{}" y="{}" width="8" height="8" fill="{color}"/><text x="{}" y="{}" font-family="sans-serif" font-size="{LABEL_SIZE}" fill="{LABEL_COLOR}">{}</text>"#,
                    px(x),
                    px(y - 7.0),
                    px(x + 11.0),
                    px(y),
                    escape(name)
                );
                y += 14.0;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::chart::{ChartSeries, Legend};
    use crate::model::fill::ResolvedColor;
    use crate::render::measure::HeuristicMeasurer;
    use crate::warnings::WarningCollector;
    use std::collections::HashMap;

    fn with_ctx<R>(f: impl FnOnce(&RenderContext) -> R) -> R {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        f(&ctx)
    }

    fn series(values: &[f64], color: &str) -> ChartSeries {
        ChartSeries {
            name: Some("s".to_string()),
            values: values.to_vec(),
            x_values: None,
            bubble_sizes: None,
            color: ResolvedColor::opaque(color),
        }
    }

    fn chart(chart_type: ChartType, series_list: Vec<ChartSeries>) -> Chart {
        Chart {
            chart_type,
            series: series_list,
            categories: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            title: None,
            legend: None,
            bar_direction: None,
            hole_size: None,
            radar_style: None,
            of_pie_type: None,
            split_pos: None,
            second_pie_size: None,
        }
    }

    #[test]
    fn test_column_chart_draws_bars() {
        with_ctx(|ctx| {
            let c = chart(ChartType::Bar, vec![series(&[1.0, 2.0, 3.0], "#4472C4")]);
            let svg = render_chart(&c, 400.0, 300.0, ctx);
            assert_eq!(svg.matches(r##"fill="#4472C4""##).count(), 3);
            // Axis gridlines present.
            assert!(svg.contains(AXIS_COLOR));
        });
    }

    #[test]
    fn test_line_chart_polyline() {
        with_ctx(|ctx| {
            let c = chart(ChartType::Line, vec![series(&[1.0, 3.0, 2.0], "#ED7D31")]);
            let svg = render_chart(&c, 400.0, 300.0, ctx);
            assert!(svg.contains("<polyline"));
            assert!(svg.contains(r##"stroke="#ED7D31""##));
        });
    }

    #[test]
    fn test_pie_slice_count() {
        with_ctx(|ctx| {
            let c = chart(ChartType::Pie, vec![series(&[3.0, 2.0, 1.0], "#4472C4")]);
            let svg = render_chart(&c, 300.0, 300.0, ctx);
            assert_eq!(svg.matches("<path").count(), 3);
        });
    }

    #[test]
    fn test_doughnut_has_inner_arc() {
        with_ctx(|ctx| {
            let mut c = chart(ChartType::Doughnut, vec![series(&[2.0, 2.0], "#4472C4")]);
            c.hole_size = Some(50.0);
            let svg = render_chart(&c, 300.0, 300.0, ctx);
            // Annular slices have two arcs each.
            let first_path = svg.split("<path").nth(1).unwrap();
            assert_eq!(first_path.matches(" A ").count(), 2);
        });
    }

    #[test]
    fn test_negative_values_stay_in_plot() {
        with_ctx(|ctx| {
            let c = chart(ChartType::Bar, vec![series(&[-2.0, 4.0], "#4472C4")]);
            let svg = render_chart(&c, 400.0, 300.0, ctx);
            assert!(svg.contains("-2"));
            assert!(!svg.contains("height=\"-"));
        });
    }

    #[test]
    fn test_legend_right_lists_series() {
        with_ctx(|ctx| {
            let mut c = chart(ChartType::Line, vec![series(&[1.0], "#4472C4")]);
            c.legend = Some(Legend {
                position: "r".to_string(),
            });
            c.series[0].name = Some("Revenue".to_string());
            let svg = render_chart(&c, 400.0, 300.0, ctx);
            assert!(svg.contains(">Revenue</text>"));
        });
    }

    #[test]
    fn test_scatter_points() {
        with_ctx(|ctx| {
            let mut s = series(&[1.0, 2.0], "#70AD47");
            s.x_values = Some(vec![10.0, 20.0]);
            let c = chart(ChartType::Scatter, vec![s]);
            let svg = render_chart(&c, 400.0, 300.0, ctx);
            assert_eq!(svg.matches("<circle").count(), 2);
        });
    }

    #[test]
    fn test_radar_polygon() {
        with_ctx(|ctx| {
            let c = chart(ChartType::Radar, vec![series(&[1.0, 2.0, 3.0], "#4472C4")]);
            let svg = render_chart(&c, 300.0, 300.0, ctx);
            assert!(svg.contains("<polygon"));
            // Three spokes for three values.
            assert_eq!(svg.matches("<line").count(), 3);
        });
    }
}
