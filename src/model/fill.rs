//! Fill, color and outline types.

use crate::units::Emu;
use serde::{Deserialize, Serialize};

/// A fully resolved color in `#RRGGBB` + alpha normal form.
///
/// Color resolution always terminates here; unresolvable references fall
/// back to `#000000`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColor {
    pub hex: String,
    pub alpha: f64,
}

impl ResolvedColor {
    pub fn opaque(hex: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            alpha: 1.0,
        }
    }

    pub const FALLBACK_HEX: &'static str = "#000000";
}

/// Shape fill variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Fill {
    /// Explicit `noFill`: nothing is painted.
    None,
    Solid { color: ResolvedColor },
    Gradient(GradientFill),
    Image(ImageFill),
    Pattern(PatternFill),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: ResolvedColor,
    /// 0..1 along the gradient axis, source order preserved.
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientFill {
    pub stops: Vec<GradientStop>,
    /// Degrees, clockwise from the positive x axis.
    pub angle: f64,
    pub kind: GradientKind,
    /// Radial center, 0..1 of the bounding box.
    pub center_x: f64,
    pub center_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFill {
    /// Base64-encoded media payload.
    pub data: String,
    pub mime_type: String,
    /// Tile instead of stretch.
    pub tile: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFill {
    /// OOXML preset name, e.g. "ltHorz".
    pub preset: String,
    pub foreground: ResolvedColor,
    pub background: ResolvedColor,
}

/// OOXML preset dash styles plus custom dash arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    LgDash,
    LgDashDot,
    LgDashDotDot,
    SysDash,
    SysDot,
    SysDashDot,
}

impl DashStyle {
    pub fn from_preset(value: &str) -> DashStyle {
        match value {
            "dash" => DashStyle::Dash,
            "dot" => DashStyle::Dot,
            "dashDot" => DashStyle::DashDot,
            "lgDash" => DashStyle::LgDash,
            "lgDashDot" => DashStyle::LgDashDot,
            "lgDashDotDot" => DashStyle::LgDashDotDot,
            "sysDash" => DashStyle::SysDash,
            "sysDot" => DashStyle::SysDot,
            "sysDashDot" => DashStyle::SysDashDot,
            _ => DashStyle::Solid,
        }
    }
}

/// Arrowhead on a connector or line end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEnd {
    /// "triangle", "arrow", "stealth", "diamond", "oval".
    pub kind: String,
    pub width: Option<String>,
    pub length: Option<String>,
}

/// Stroke properties. A `noFill` child in `a:ln` means no outline at all,
/// which is represented by the absence of this struct, not a zero width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub width: Emu,
    pub fill: Option<Fill>,
    pub dash: DashStyle,
    /// Dash/space pairs as percent of stroke width, from `custDash`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_end: Option<LineEnd>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_end: Option<LineEnd>,
}

impl Outline {
    /// Solid single-color outline, used for synthesized table borders.
    pub fn solid(width: Emu, color: ResolvedColor) -> Self {
        Self {
            width,
            fill: Some(Fill::Solid { color }),
            dash: DashStyle::Solid,
            custom_dash: None,
            cap: None,
            join: None,
            head_end: None,
            tail_end: None,
        }
    }
}
