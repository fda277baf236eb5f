//! Theme types: color palette, font scheme and format scheme.

use crate::model::fill::{Fill, Outline};
use crate::model::effect::EffectList;
use crate::model::presentation::TextStyleLevels;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Major/minor font pairs from `fontScheme`. The `+mj-lt`, `+mn-lt`,
/// `+mj-ea` and `+mn-ea` tokens in run properties resolve against these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontScheme {
    pub major_font: String,
    pub minor_font: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_font_ea: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_font_ea: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_font_cs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_font_cs: Option<String>,
}

impl Default for FontScheme {
    fn default() -> Self {
        Self {
            major_font: "Calibri Light".to_string(),
            minor_font: "Calibri".to_string(),
            major_font_ea: None,
            minor_font_ea: None,
            major_font_cs: None,
            minor_font_cs: None,
        }
    }
}

impl FontScheme {
    /// Resolves a theme font token to a concrete family name. Non-token
    /// names pass through.
    pub fn resolve(&self, name: &str) -> String {
        match name {
            "+mj-lt" => self.major_font.clone(),
            "+mn-lt" => self.minor_font.clone(),
            "+mj-ea" => self
                .major_font_ea
                .clone()
                .unwrap_or_else(|| self.major_font.clone()),
            "+mn-ea" => self
                .minor_font_ea
                .clone()
                .unwrap_or_else(|| self.minor_font.clone()),
            "+mj-cs" => self
                .major_font_cs
                .clone()
                .unwrap_or_else(|| self.major_font.clone()),
            "+mn-cs" => self
                .minor_font_cs
                .clone()
                .unwrap_or_else(|| self.minor_font.clone()),
            other => other.to_string(),
        }
    }
}

/// Style matrix from `fmtScheme`, indexed by `fillRef`/`lnRef`/`effectRef`.
/// Entries are parsed with the placeholder color left as solid black; the
/// style resolver substitutes the reference color at lookup time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatScheme {
    pub fill_styles: Vec<Fill>,
    pub bg_fill_styles: Vec<Fill>,
    pub line_styles: Vec<Option<Outline>>,
    pub effect_styles: Vec<Option<EffectList>>,
}

/// The three `txStyles` buckets on a slide master.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterTextStyles {
    pub title: TextStyleLevels,
    pub body: TextStyleLevels,
    pub other: TextStyleLevels,
}

impl MasterTextStyles {
    /// Picks the bucket a placeholder type falls into.
    pub fn for_placeholder(&self, ph_type: &str) -> &TextStyleLevels {
        match ph_type {
            "title" | "ctrTitle" => &self.title,
            "body" | "subTitle" => &self.body,
            _ => &self.other,
        }
    }
}

/// A parsed theme part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Palette entries keyed by name: dk1, lt1, dk2, lt2, accent1..6,
    /// hlink, folHlink. Values are 6-digit uppercase hex.
    pub color_scheme: HashMap<String, String>,
    pub font_scheme: FontScheme,
    pub format_scheme: FormatScheme,
}

impl Theme {
    pub fn color(&self, name: &str) -> Option<&str> {
        self.color_scheme.get(name).map(String::as_str)
    }
}
