//! PPTX package parsing.
//!
//! The parsers in this module turn OOXML parts into the typed model in
//! [`crate::model`]. Parsing is layered: the package loads presentation,
//! master, layout and theme parts, then each slide is resolved against its
//! layer chain (placeholder inheritance, style references, text cascade)
//! before it ever reaches the renderer.

pub mod cascade;
pub mod chart;
pub mod color;
pub mod effect;
pub mod fill;
pub mod geometry;
pub mod master;
pub mod package;
pub mod presentation;
pub mod slide;
pub mod style;
pub mod table;
pub mod text;
pub mod theme;

pub use package::PptxPackage;

use crate::container::{PptxContainer, Relationships};
use crate::model::{ColorMap, Theme};
use crate::warnings::WarningCollector;

/// Everything a part parser needs to resolve references: the container for
/// media lookups, the part's relationships, and the active theme and color
/// map for scheme color resolution.
pub struct ParseContext<'a> {
    pub container: &'a PptxContainer,
    /// Path of the part being parsed, base for relationship targets.
    pub part_path: &'a str,
    pub rels: &'a Relationships,
    pub theme: &'a Theme,
    pub color_map: &'a ColorMap,
    pub warnings: &'a WarningCollector,
    /// Location label for warnings, e.g. "Slide 3".
    pub location: String,
}

impl<'a> ParseContext<'a> {
    pub fn colors(&self) -> color::ColorContext<'a> {
        color::ColorContext {
            scheme: &self.theme.color_scheme,
            map: self.color_map,
        }
    }

    pub fn warn(&self, feature: &str, message: impl Into<String>) {
        self.warnings.warn(feature, message, Some(&self.location));
    }
}
