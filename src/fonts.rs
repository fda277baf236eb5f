//! Font substitution defaults and font usage inspection.

use crate::error::Result;
use crate::model::presentation::Slide;
use crate::model::shape::SlideElement;
use crate::model::text::TextBody;
use crate::pptx::PptxPackage;
use crate::warnings::{LogLevel, WarningCollector};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Metric-compatible substitutes for fonts that ship with PowerPoint but
/// are rarely installed elsewhere. Keys are lowercased family names.
static DEFAULT_MAPPING: Lazy<HashMap<String, String>> = Lazy::new(|| {
    [
        ("calibri", "Carlito"),
        ("calibri light", "Carlito"),
        ("arial", "Arimo"),
        ("helvetica", "Arimo"),
        ("times new roman", "Tinos"),
        ("courier new", "Cousine"),
        ("cambria", "Caladea"),
        ("cambria math", "Caladea"),
        ("ms gothic", "Noto Sans JP"),
        ("ms pgothic", "Noto Sans JP"),
        ("meiryo", "Noto Sans JP"),
        ("yu gothic", "Noto Sans JP"),
        ("ms mincho", "Noto Serif JP"),
        ("ms pmincho", "Noto Serif JP"),
        ("yu mincho", "Noto Serif JP"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
});

/// A copy of the built-in substitution table, ready for caller overrides.
pub fn default_font_mapping() -> HashMap<String, String> {
    DEFAULT_MAPPING.clone()
}

/// Fonts a deck needs, reported without rendering anything.
#[derive(Debug, Clone)]
pub struct UsedFonts {
    /// Major and minor theme fonts, majors first.
    pub theme_fonts: Vec<String>,
    /// Every font family any slide references, sorted and unique. Theme
    /// fonts are included.
    pub fonts: Vec<String>,
}

/// Inspect a deck and report every font it uses, so callers can fetch
/// substitutes (from a font service, say) before converting.
pub fn collect_used_fonts(data: Vec<u8>) -> Result<UsedFonts> {
    let package = PptxPackage::from_bytes(data)?;
    let quiet = WarningCollector::new(LogLevel::Off);

    let scheme = package.font_scheme();
    let mut theme_fonts: Vec<String> = Vec::new();
    for name in [
        Some(&scheme.major_font),
        scheme.major_font_ea.as_ref(),
        scheme.major_font_cs.as_ref(),
        Some(&scheme.minor_font),
        scheme.minor_font_ea.as_ref(),
        scheme.minor_font_cs.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        if !name.is_empty() && !theme_fonts.iter().any(|f| f == name) {
            theme_fonts.push(name.clone());
        }
    }

    let mut fonts: BTreeSet<String> = theme_fonts.iter().cloned().collect();
    for number in 1..=package.slide_count() {
        if let Ok(Some(slide)) = package.resolve_slide(number, &quiet) {
            fonts.extend(slide_fonts(&slide));
        }
    }

    Ok(UsedFonts {
        theme_fonts,
        fonts: fonts.into_iter().collect(),
    })
}

/// Every font family a resolved slide references.
pub fn slide_fonts(slide: &Slide) -> BTreeSet<String> {
    let mut fonts = BTreeSet::new();
    for element in &slide.elements {
        collect_element(element, &mut fonts);
    }
    fonts
}

fn collect_element(element: &SlideElement, fonts: &mut BTreeSet<String>) {
    match element {
        SlideElement::Shape(shape) => {
            if let Some(body) = &shape.text_body {
                collect_body(body, fonts);
            }
        }
        SlideElement::Table(element) => {
            for row in &element.table.rows {
                for cell in &row.cells {
                    if let Some(body) = &cell.text_body {
                        collect_body(body, fonts);
                    }
                }
            }
        }
        SlideElement::Group(group) => {
            for child in &group.children {
                collect_element(child, fonts);
            }
        }
        SlideElement::Connector(_) | SlideElement::Image(_) | SlideElement::Chart(_) => {}
    }
}

fn collect_body(body: &TextBody, fonts: &mut BTreeSet<String>) {
    for paragraph in &body.paragraphs {
        if let Some(font) = &paragraph.properties.bullet_font {
            fonts.insert(font.clone());
        }
        for run in &paragraph.runs {
            for family in [
                run.properties.font_family.as_ref(),
                run.properties.font_family_ea.as_ref(),
                run.properties.font_family_cs.as_ref(),
            ]
            .into_iter()
            .flatten()
            {
                fonts.insert(family.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shape::{Geometry, Shape, Transform};
    use crate::model::text::{
        BodyProperties, Paragraph, ParagraphProperties, RunProperties, TextRun,
    };

    fn shape_with_font(family: &str) -> SlideElement {
        SlideElement::Shape(Shape {
            transform: Transform::default(),
            geometry: Geometry::rect(),
            fill: None,
            outline: None,
            effects: None,
            text_body: Some(TextBody {
                body_properties: BodyProperties::default(),
                paragraphs: vec![Paragraph {
                    properties: ParagraphProperties::default(),
                    runs: vec![TextRun {
                        text: "x".to_string(),
                        properties: RunProperties {
                            font_family: Some(family.to_string()),
                            ..Default::default()
                        },
                    }],
                    end_properties: None,
                }],
            }),
            placeholder: None,
            alt_text: None,
            hyperlink: None,
        })
    }

    #[test]
    fn test_default_mapping_covers_office_fonts() {
        let mapping = default_font_mapping();
        assert_eq!(mapping.get("calibri").map(String::as_str), Some("Carlito"));
        assert_eq!(mapping.get("arial").map(String::as_str), Some("Arimo"));
        assert!(mapping.get("futura").is_none());
    }

    #[test]
    fn test_collect_dedups_and_recurses_groups() {
        use crate::model::shape::{ChildTransform, Group};
        let slide = Slide {
            slide_number: 1,
            background: None,
            elements: vec![
                shape_with_font("Calibri"),
                SlideElement::Group(Group {
                    transform: Transform::default(),
                    child_transform: ChildTransform::default(),
                    children: vec![shape_with_font("Calibri"), shape_with_font("Arial")],
                }),
            ],
            show_master_shapes: true,
        };
        let fonts = slide_fonts(&slide);
        assert_eq!(
            fonts.into_iter().collect::<Vec<_>>(),
            vec!["Arial".to_string(), "Calibri".to_string()]
        );
    }
}
