//! Chart types.

use crate::model::fill::ResolvedColor;
use crate::model::shape::Transform;
use serde::{Deserialize, Serialize};

/// Supported chart families. The parser dispatches on the first matching
/// plot-area tag; one chart type per chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Bar,
    Line,
    Area,
    Pie,
    Doughnut,
    Scatter,
    Bubble,
    Radar,
    Stock,
    Surface,
    OfPie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub values: Vec<f64>,
    /// X values for scatter/bubble charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_values: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bubble_sizes: Option<Vec<f64>>,
    pub color: ResolvedColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    /// "b", "t", "l", "r" or "tr".
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub chart_type: ChartType,
    pub series: Vec<ChartSeries>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    /// "bar" (horizontal) or "col" for bar charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_direction: Option<String>,
    /// Doughnut hole size in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_size: Option<f64>,
    /// "standard", "marker" or "filled" for radar charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radar_style: Option<String>,
    /// "pie" or "bar" for of-pie charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of_pie_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_pos: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_pie_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartElement {
    pub transform: Transform,
    pub chart: Chart,
}
