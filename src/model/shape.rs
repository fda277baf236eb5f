//! Slide element variants and geometry.

use crate::model::chart::ChartElement;
use crate::model::effect::{BlipEffects, EffectList};
use crate::model::fill::{Fill, Outline};
use crate::model::table::TableElement;
use crate::model::text::TextBody;
use crate::units::Emu;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placement of an element on the slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub offset_x: Emu,
    pub offset_y: Emu,
    pub extent_width: Emu,
    pub extent_height: Emu,
    /// Rotation in degrees, clockwise, about the element center.
    pub rotation: f64,
    pub flip_h: bool,
    pub flip_v: bool,
}

/// Child coordinate space of a group (`chOff`/`chExt`). Children are
/// expressed in this space and rescaled by `extent / child_extent` then
/// translated by `-child_offset` before the group's own placement applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildTransform {
    pub offset_x: Emu,
    pub offset_y: Emu,
    pub extent_width: Emu,
    pub extent_height: Emu,
}

/// Placeholder identification on a shape (`ph` element).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Placeholder type, defaulting to "body" when unspecified.
    pub ph_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// One sub-path of a custom geometry, already compiled to SVG path data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGeometryPath {
    /// Logical coordinate-space width of this sub-path.
    pub width: f64,
    pub height: f64,
    /// SVG path data ("M .. L .. C .. Z").
    pub data: String,
}

/// Shape geometry: a named preset with adjust values, or custom paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Geometry {
    Preset {
        preset: String,
        adjust_values: HashMap<String, f64>,
    },
    Custom {
        paths: Vec<CustomGeometryPath>,
    },
}

impl Geometry {
    pub fn rect() -> Geometry {
        Geometry::Preset {
            preset: "rect".to_string(),
            adjust_values: HashMap::new(),
        }
    }
}

/// A drawable shape, possibly carrying text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub transform: Transform,
    pub geometry: Geometry,
    /// `None` means "no fill specified" (inherit/default), distinct from
    /// `Some(Fill::None)` which is an explicit noFill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<TextBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
}

/// A connector line between shapes. Rendered from its preset geometry, or as
/// a plain diagonal when the geometry is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub transform: Transform,
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectList>,
}

/// Crop rectangle on an image, each side in 0..1 fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SrcRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// An embedded raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub transform: Transform,
    /// Base64-encoded payload.
    pub data: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_rect: Option<SrcRect>,
    /// Tile instead of stretch, with the OOXML tile flip mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_flip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blip_effects: Option<BlipEffects>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// A group of elements sharing a child coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub transform: Transform,
    pub child_transform: ChildTransform,
    pub children: Vec<SlideElement>,
}

/// Everything that can appear in a slide's shape tree, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SlideElement {
    Shape(Shape),
    Connector(Connector),
    Image(Image),
    Group(Group),
    Chart(ChartElement),
    Table(TableElement),
}

impl SlideElement {
    /// Placeholder info, if this element is a placeholder shape.
    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            SlideElement::Shape(s) => s.placeholder.as_ref(),
            _ => None,
        }
    }
}
