//! Text body, paragraph and run types.

use crate::model::fill::ResolvedColor;
use crate::units::Emu;
use serde::{Deserialize, Serialize};

/// Body-level text properties (`bodyPr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyProperties {
    /// Vertical anchor: "t", "ctr" or "b".
    pub anchor: String,
    pub inset_left: Emu,
    pub inset_right: Emu,
    pub inset_top: Emu,
    pub inset_bottom: Emu,
    /// "square" or "none".
    pub wrap: String,
    /// "normAutofit" or "spAutofit" when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fit: Option<String>,
    /// normAutofit font scale, 1.0 when absent.
    pub font_scale: f64,
    /// normAutofit line spacing reduction, 0.0 when absent.
    pub line_spacing_reduction: f64,
    /// "vert" or "vert270" for rotated text flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

impl Default for BodyProperties {
    fn default() -> Self {
        Self {
            anchor: "t".to_string(),
            inset_left: Emu(91_440),
            inset_right: Emu(91_440),
            inset_top: Emu(45_720),
            inset_bottom: Emu(45_720),
            wrap: "square".to_string(),
            auto_fit: None,
            font_scale: 1.0,
            line_spacing_reduction: 0.0,
            vert: None,
            columns: None,
        }
    }
}

/// Spacing value: explicit points or a percentage of the line height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "camelCase")]
pub enum Spacing {
    Points(f64),
    Percent(f64),
}

/// Bullet specification on a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Bullet {
    None,
    Char {
        character: String,
    },
    AutoNum {
        /// Numbering scheme, e.g. "arabicPeriod", "romanLcParenR".
        scheme: String,
        start_at: i64,
    },
}

/// A tab stop position with alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabStop {
    pub position: Emu,
    pub alignment: String,
}

/// Paragraph-level properties (`pPr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// "l", "ctr", "r" or "just".
    pub alignment: String,
    /// Indent level 0..8.
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<Spacing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before: Option<Spacing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after: Option<Spacing>,
    pub margin_left: Emu,
    pub indent: Emu,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<Bullet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_color: Option<ResolvedColor>,
    /// Bullet size as a percentage of the text size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_size_pct: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tab_stops: Vec<TabStop>,
}

impl Default for ParagraphProperties {
    fn default() -> Self {
        Self {
            alignment: "l".to_string(),
            level: 0,
            line_spacing: None,
            space_before: None,
            space_after: None,
            margin_left: Emu::ZERO,
            indent: Emu::ZERO,
            bullet: None,
            bullet_font: None,
            bullet_color: None,
            bullet_size_pct: None,
            tab_stops: Vec::new(),
        }
    }
}

/// Text outline on a run (stroked glyphs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOutline {
    pub width: Emu,
    pub color: ResolvedColor,
}

/// Run-level character properties. Fields start `None` meaning "inherit"
/// and are filled by the style cascade; once non-`None` they are never
/// overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    /// Font size in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family_ea: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family_cs: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ResolvedColor>,
    /// Positive for superscript, negative for subscript, in 1000ths.
    pub baseline: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<TextOutline>,
}

/// One text run. A hard line break (`a:br`) is a run whose text is "\n".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub properties: RunProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub properties: ParagraphProperties,
    pub runs: Vec<TextRun>,
    /// `endParaRPr`, used for the height of empty paragraphs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_properties: Option<RunProperties>,
}

impl Paragraph {
    pub fn has_text(&self) -> bool {
        self.runs.iter().any(|r| !r.text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body_properties: BodyProperties,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBody {
    pub fn has_text(&self) -> bool {
        self.paragraphs.iter().any(|p| p.has_text())
    }
}
