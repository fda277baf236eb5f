//! Per-conversion rendering state.

use crate::render::measure::TextMeasurer;
use crate::warnings::WarningCollector;
use std::cell::Cell;
use std::collections::HashMap;

/// State shared by every renderer in one conversion: the warning sink, the
/// text measurer, the font substitution map and the def-id generator.
pub struct RenderContext<'a> {
    pub warnings: &'a WarningCollector,
    pub measurer: &'a dyn TextMeasurer,
    /// Lowercased requested family -> substitute family.
    font_mapping: &'a HashMap<String, String>,
    /// Random per-conversion prefix keeps def ids unique when several
    /// rendered slides end up inlined in one host document.
    id_prefix: String,
    id_counter: Cell<u64>,
    location: String,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        warnings: &'a WarningCollector,
        measurer: &'a dyn TextMeasurer,
        font_mapping: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            warnings,
            measurer,
            font_mapping,
            id_prefix: format!("{:04x}", rand::random::<u16>()),
            id_counter: Cell::new(0),
            location: String::new(),
        }
    }

    /// Fresh document-unique id for a def element.
    pub fn next_id(&self, kind: &str) -> String {
        let n = self.id_counter.get();
        self.id_counter.set(n + 1);
        format!("{kind}-{}-{n}", self.id_prefix)
    }

    /// Substitute a font family through the mapping, case-insensitively.
    /// Unknown families pass through unchanged.
    pub fn map_font(&self, family: &str) -> String {
        self.font_mapping
            .get(&family.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| family.to_string())
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn warn(&self, feature: &str, message: impl Into<String>) {
        let location = if self.location.is_empty() {
            None
        } else {
            Some(self.location.as_str())
        };
        self.warnings.warn(feature, message, location);
    }
}
