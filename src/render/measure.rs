//! Text measurement.
//!
//! Line breaking and autofit need advance widths before any text is drawn.
//! When font files are available the [`FontMeasurer`] reads real metrics
//! through `fontdb`/`ttf-parser`; otherwise the [`HeuristicMeasurer`]
//! estimates from character classes, tuned against common UI fonts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use unicode_width::UnicodeWidthChar;

/// Measures rendered text in pixels.
pub trait TextMeasurer {
    /// Width of `text` at `font_size` pixels.
    fn measure(&self, text: &str, family: &str, font_size: f64, bold: bool) -> f64;

    /// Single line height as a multiple of the font size.
    fn line_height_ratio(&self, family: &str) -> f64 {
        let _ = family;
        1.2
    }
}

/// Character-class width estimate: no font files required.
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, _family: &str, font_size: f64, bold: bool) -> f64 {
        let mut width = 0.0;
        for ch in text.chars() {
            width += char_width_factor(ch) * font_size;
        }
        if bold {
            width *= 1.05;
        }
        width
    }
}

/// Width of one character as a fraction of the font size: narrow
/// punctuation, average latin, or full-width CJK.
fn char_width_factor(ch: char) -> f64 {
    if UnicodeWidthChar::width(ch).unwrap_or(1) >= 2 {
        return 1.0;
    }
    match ch {
        'i' | 'j' | 'l' | 't' | 'f' | 'r' | '.' | ',' | ';' | ':' | '!' | '\'' | '|' | '('
        | ')' | '[' | ']' | ' ' => 0.3,
        'm' | 'w' | 'M' | 'W' | '@' => 0.9,
        _ => 0.6,
    }
}

struct LoadedFont {
    data: Vec<u8>,
    face_index: u32,
    units_per_em: f64,
    /// Line height ratio from the face's ascender/descender.
    line_ratio: f64,
    /// Advance table for the ASCII range, in font units.
    ascii_advances: [f64; 128],
}

/// Real font metrics from font files on disk.
///
/// ASCII advances are pre-tabulated per face; other code points re-parse
/// the face on a cached lookup miss.
pub struct FontMeasurer {
    db: fontdb::Database,
    faces: RefCell<HashMap<String, Option<LoadedFont>>>,
    wide_cache: RefCell<HashMap<(String, char), f64>>,
    fallback: HeuristicMeasurer,
}

impl FontMeasurer {
    pub fn new(font_dirs: &[impl AsRef<Path>]) -> Self {
        let mut db = fontdb::Database::new();
        for dir in font_dirs {
            db.load_fonts_dir(dir);
        }
        Self {
            db,
            faces: RefCell::new(HashMap::new()),
            wide_cache: RefCell::new(HashMap::new()),
            fallback: HeuristicMeasurer,
        }
    }

    /// Number of faces available to the measurer.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn load(&self, family: &str, bold: bool) -> Option<(Vec<u8>, u32)> {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family), fontdb::Family::SansSerif],
            weight: if bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            ..fontdb::Query::default()
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| (data.to_vec(), index))
    }

    fn with_font<R>(
        &self,
        family: &str,
        bold: bool,
        f: impl FnOnce(&LoadedFont) -> R,
    ) -> Option<R> {
        let key = format!("{}|{}", family.to_ascii_lowercase(), bold as u8);
        let mut faces = self.faces.borrow_mut();
        let entry = faces.entry(key).or_insert_with(|| {
            let (data, face_index) = self.load(family, bold)?;
            let face = ttf_parser::Face::parse(&data, face_index).ok()?;
            let units_per_em = face.units_per_em() as f64;
            if units_per_em <= 0.0 {
                return None;
            }
            let ascender = face.ascender() as f64;
            let descender = face.descender() as f64;
            let line_ratio = (ascender + descender.abs()) / units_per_em;
            let mut ascii_advances = [units_per_em * 0.6; 128];
            for (i, advance) in ascii_advances.iter_mut().enumerate() {
                if let Some(ch) = char::from_u32(i as u32) {
                    if let Some(a) = face
                        .glyph_index(ch)
                        .and_then(|g| face.glyph_hor_advance(g))
                    {
                        *advance = a as f64;
                    }
                }
            }
            Some(LoadedFont {
                data,
                face_index,
                units_per_em,
                line_ratio,
                ascii_advances,
            })
        });
        entry.as_ref().map(f)
    }

    fn wide_advance(&self, font: &LoadedFont, family: &str, ch: char) -> f64 {
        let key = (family.to_ascii_lowercase(), ch);
        if let Some(&cached) = self.wide_cache.borrow().get(&key) {
            return cached;
        }
        let advance = ttf_parser::Face::parse(&font.data, font.face_index)
            .ok()
            .and_then(|face| {
                face.glyph_index(ch)
                    .and_then(|g| face.glyph_hor_advance(g))
                    .map(|a| a as f64)
            })
            .unwrap_or_else(|| char_width_factor(ch) * font.units_per_em);
        self.wide_cache.borrow_mut().insert(key, advance);
        advance
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, family: &str, font_size: f64, bold: bool) -> f64 {
        let measured = self.with_font(family, bold, |font| {
            let mut units = 0.0;
            for ch in text.chars() {
                let code = ch as u32;
                if code < 128 {
                    units += font.ascii_advances[code as usize];
                } else {
                    units += self.wide_advance(font, family, ch);
                }
            }
            units / font.units_per_em * font_size
        });
        measured.unwrap_or_else(|| self.fallback.measure(text, family, font_size, bold))
    }

    fn line_height_ratio(&self, family: &str) -> f64 {
        self.with_font(family, false, |font| font.line_ratio)
            .filter(|r| *r > 0.5)
            .unwrap_or(1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_scales_with_size() {
        let m = HeuristicMeasurer;
        let narrow = m.measure("ill", "Any", 10.0, false);
        let normal = m.measure("abc", "Any", 10.0, false);
        let double = m.measure("abc", "Any", 20.0, false);
        assert!(narrow < normal);
        assert!((double - normal * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_heuristic_cjk_is_full_width() {
        let m = HeuristicMeasurer;
        let cjk = m.measure("日本", "Any", 10.0, false);
        assert!((cjk - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_heuristic_bold_is_wider() {
        let m = HeuristicMeasurer;
        let regular = m.measure("hello", "Any", 12.0, false);
        let bold = m.measure("hello", "Any", 12.0, true);
        assert!(bold > regular);
    }

    #[test]
    fn test_font_measurer_falls_back_without_fonts() {
        let dirs: [&Path; 0] = [];
        let m = FontMeasurer::new(&dirs);
        assert_eq!(m.face_count(), 0);
        let fallback = HeuristicMeasurer.measure("hello", "Nope", 12.0, false);
        assert_eq!(m.measure("hello", "Nope", 12.0, false), fallback);
        assert_eq!(m.line_height_ratio("Nope"), 1.2);
    }
}
