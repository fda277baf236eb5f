//! Chart part parsing.
//!
//! Charts live in their own part referenced from a `graphicFrame`. Only the
//! cached values inside the part are read; external workbook links are not
//! followed.

use crate::model::chart::{Chart, ChartSeries, ChartType, Legend};
use crate::model::ResolvedColor;
use crate::pptx::color::resolve_color_in;
use crate::pptx::ParseContext;
use crate::xml::XmlNode;

/// Series colors used when a series has no explicit fill, cycled by index.
pub const DEFAULT_SERIES_COLORS: [&str; 6] = [
    "#4472C4", "#ED7D31", "#A5A5A5", "#FFC000", "#5B9BD5", "#70AD47",
];

const PLOT_KINDS: [(&str, ChartType); 13] = [
    ("barChart", ChartType::Bar),
    ("bar3DChart", ChartType::Bar),
    ("lineChart", ChartType::Line),
    ("line3DChart", ChartType::Line),
    ("areaChart", ChartType::Area),
    ("area3DChart", ChartType::Area),
    ("pieChart", ChartType::Pie),
    ("pie3DChart", ChartType::Pie),
    ("doughnutChart", ChartType::Doughnut),
    ("scatterChart", ChartType::Scatter),
    ("bubbleChart", ChartType::Bubble),
    ("radarChart", ChartType::Radar),
    ("stockChart", ChartType::Stock),
];

/// Parse a chart part. `None` when the plot area holds no supported chart.
pub fn parse_chart(xml: &str, ctx: &ParseContext) -> crate::error::Result<Option<Chart>> {
    let root = XmlNode::parse(xml)?;
    let chart_node = match root.child("chart") {
        Some(c) => c,
        None => return Ok(None),
    };
    let plot_area = match chart_node.child("plotArea") {
        Some(p) => p,
        None => return Ok(None),
    };

    let (plot, chart_type) = match find_plot(plot_area) {
        Some(found) => found,
        None => {
            let kinds: Vec<_> = plot_area
                .elements()
                .filter(|e| e.name.ends_with("Chart"))
                .map(|e| e.name.clone())
                .collect();
            ctx.warn(
                "chart-type",
                format!("unsupported chart type(s): {}", kinds.join(", ")),
            );
            return Ok(None);
        }
    };

    let mut categories = Vec::new();
    let mut series = Vec::new();
    for (i, ser) in plot.children("ser").enumerate() {
        let parsed = parse_series(ser, i, chart_type, ctx);
        if categories.is_empty() {
            categories = series_categories(ser);
        }
        series.push(parsed);
    }

    let mut chart = Chart {
        chart_type,
        series,
        categories,
        title: chart_node.child("title").map(title_text),
        legend: chart_node
            .child("legend")
            .map(|l| Legend {
                position: l
                    .child("legendPos")
                    .and_then(|p| p.attr("val"))
                    .unwrap_or("r")
                    .to_string(),
            }),
        bar_direction: None,
        hole_size: None,
        radar_style: None,
        of_pie_type: None,
        split_pos: None,
        second_pie_size: None,
    };

    match chart_type {
        ChartType::Bar => {
            chart.bar_direction = plot
                .child("barDir")
                .and_then(|d| d.attr("val"))
                .map(str::to_string);
        }
        ChartType::Doughnut => {
            chart.hole_size = plot.child("holeSize").and_then(|h| h.attr_f64("val"));
        }
        ChartType::Radar => {
            chart.radar_style = plot
                .child("radarStyle")
                .and_then(|s| s.attr("val"))
                .map(str::to_string);
        }
        ChartType::OfPie => {
            chart.of_pie_type = plot
                .child("ofPieType")
                .and_then(|t| t.attr("val"))
                .map(str::to_string);
            chart.split_pos = plot
                .child("splitPos")
                .and_then(|p| p.attr_i64("val"))
                .map(|v| v.max(0) as usize);
            chart.second_pie_size = plot.child("secondPieSize").and_then(|s| s.attr_f64("val"));
        }
        _ => {}
    }

    Ok(Some(chart))
}

fn find_plot(plot_area: &XmlNode) -> Option<(&XmlNode, ChartType)> {
    // ofPieChart and surface need a lookup beyond the static table.
    for child in plot_area.elements() {
        if child.name == "ofPieChart" {
            return Some((child, ChartType::OfPie));
        }
        if child.name == "surfaceChart" || child.name == "surface3DChart" {
            return Some((child, ChartType::Surface));
        }
        if let Some((_, ty)) = PLOT_KINDS.iter().find(|(name, _)| *name == child.name) {
            return Some((child, *ty));
        }
    }
    None
}

fn parse_series(
    ser: &XmlNode,
    index: usize,
    chart_type: ChartType,
    ctx: &ParseContext,
) -> ChartSeries {
    let name = ser
        .child("tx")
        .map(cached_strings)
        .and_then(|mut v| if v.is_empty() { None } else { Some(v.remove(0)) });

    let color = ser
        .child("spPr")
        .and_then(|sp_pr| sp_pr.child("solidFill"))
        .and_then(|f| resolve_color_in(f, &ctx.colors()))
        .unwrap_or_else(|| {
            ResolvedColor::opaque(DEFAULT_SERIES_COLORS[index % DEFAULT_SERIES_COLORS.len()])
        });

    let (values, x_values) = match chart_type {
        ChartType::Scatter | ChartType::Bubble => {
            let y = ser.child("yVal").map(cached_numbers).unwrap_or_default();
            let x = ser.child("xVal").map(cached_numbers);
            (y, x)
        }
        _ => (
            ser.child("val").map(cached_numbers).unwrap_or_default(),
            None,
        ),
    };

    let bubble_sizes = if chart_type == ChartType::Bubble {
        ser.child("bubbleSize").map(cached_numbers)
    } else {
        None
    };

    ChartSeries {
        name,
        values,
        x_values,
        bubble_sizes,
        color,
    }
}

fn series_categories(ser: &XmlNode) -> Vec<String> {
    ser.child("cat").map(cached_strings).unwrap_or_default()
}

/// Cached point values under a `numRef`/`numCache` (or a literal `numLit`).
fn cached_numbers(node: &XmlNode) -> Vec<f64> {
    cache_points(node)
        .iter()
        .filter_map(|pt| pt.child_text("v").and_then(|v| v.trim().parse().ok()))
        .collect()
}

/// Cached point values as strings; numeric caches stringify.
fn cached_strings(node: &XmlNode) -> Vec<String> {
    cache_points(node)
        .iter()
        .filter_map(|pt| pt.child_text("v").map(|v| v.trim().to_string()))
        .collect()
}

fn cache_points(node: &XmlNode) -> Vec<&XmlNode> {
    for reference in ["strRef", "numRef", "strLit", "numLit", "rich"] {
        if let Some(r) = node.child(reference) {
            if reference == "rich" {
                // Rich text titles are handled elsewhere.
                return Vec::new();
            }
            let cache = r
                .child("strCache")
                .or_else(|| r.child("numCache"))
                .unwrap_or(r);
            return cache.children("pt").collect();
        }
    }
    Vec::new()
}

fn title_text(title: &XmlNode) -> String {
    let mut out = String::new();
    collect_text(title, &mut out);
    out.trim().to_string()
}

fn collect_text(node: &XmlNode, out: &mut String) {
    for child in node.elements() {
        if child.name == "t" {
            out.push_str(&child.text());
        } else {
            collect_text(child, out);
        }
    }
}
