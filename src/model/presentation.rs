//! Presentation and slide level types.

use crate::model::fill::{Fill, ResolvedColor};
use crate::model::shape::SlideElement;
use crate::units::Emu;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from scheme color slots to theme palette entries
/// (`clrMap` on the master, optionally overridden per slide).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMap {
    map: HashMap<String, String>,
}

impl ColorMap {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    /// Identity mapping of the standard twelve slots.
    pub fn identity() -> Self {
        let mut map = HashMap::new();
        for slot in [
            "bg1", "tx1", "bg2", "tx2", "accent1", "accent2", "accent3", "accent4", "accent5",
            "accent6", "hlink", "folHlink",
        ] {
            map.insert(slot.to_string(), slot.to_string());
        }
        // The usual PowerPoint mapping.
        map.insert("bg1".to_string(), "lt1".to_string());
        map.insert("tx1".to_string(), "dk1".to_string());
        map.insert("bg2".to_string(), "lt2".to_string());
        map.insert("tx2".to_string(), "dk2".to_string());
        Self { map }
    }

    /// Resolves a scheme slot name to the theme palette entry it points to.
    /// Unmapped slots pass through unchanged.
    pub fn resolve<'a>(&'a self, slot: &'a str) -> &'a str {
        self.map.get(slot).map(String::as_str).unwrap_or(slot)
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::identity()
    }
}

/// Default run formatting for one outline level after the cascade has
/// flattened theme font tokens to concrete family names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyleLevel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family_ea: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ResolvedColor>,
}

impl TextStyleLevel {
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none()
            && self.font_family.is_none()
            && self.font_family_ea.is_none()
            && self.color.is_none()
    }
}

/// A list style: per-level defaults plus a `defPPr` fallback used when a
/// level has no entry of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyleLevels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_paragraph: Option<TextStyleLevel>,
    pub levels: [Option<TextStyleLevel>; 9],
}

impl TextStyleLevels {
    /// Style for an outline level, falling back to `defPPr`.
    pub fn level(&self, level: usize) -> Option<&TextStyleLevel> {
        self.levels
            .get(level)
            .and_then(Option::as_ref)
            .or(self.default_paragraph.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.default_paragraph.is_none() && self.levels.iter().all(Option::is_none)
    }
}

/// A fully resolved slide, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based position in the presentation.
    pub slide_number: usize,
    /// Resolved background, walking slide then layout then master.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Fill>,
    /// Paint-ordered elements: inherited placeholders and decorations from
    /// the layer chain first, then the slide's own shape tree.
    pub elements: Vec<SlideElement>,
    pub show_master_shapes: bool,
}

/// Presentation-wide settings from `presentation.xml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub slide_width: Emu,
    pub slide_height: Emu,
    /// `defaultTextStyle`, the last stop of the text cascade.
    pub default_text_style: TextStyleLevels,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            slide_width: Emu(9_144_000),
            slide_height: Emu(5_143_500),
            default_text_style: TextStyleLevels::default(),
        }
    }
}
