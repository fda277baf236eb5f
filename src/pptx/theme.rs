//! Theme part parsing: color scheme, font scheme and format scheme.
//!
//! Format scheme entries reference the placeholder color `phClr`. They are
//! parsed with the placeholder left as black; the style reference resolver
//! substitutes the real color when a shape's `fillRef`/`lnRef` is applied.

use crate::container::{PptxContainer, Relationships};
use crate::error::Result;
use crate::model::presentation::ColorMap;
use crate::model::theme::{FontScheme, FormatScheme, Theme};
use crate::pptx::{effect, fill, ParseContext};
use crate::warnings::WarningCollector;
use crate::xml::XmlNode;
use std::collections::HashMap;

/// Parse a theme part.
pub fn parse_theme(
    xml: &str,
    container: &PptxContainer,
    part_path: &str,
    rels: &Relationships,
    warnings: &WarningCollector,
) -> Result<Theme> {
    let root = XmlNode::parse(xml)?;
    let elements = match root.child("themeElements") {
        Some(e) => e,
        None => return Ok(Theme::default()),
    };

    let color_scheme = elements
        .child("clrScheme")
        .map(parse_color_scheme)
        .unwrap_or_default();
    let font_scheme = elements
        .child("fontScheme")
        .map(parse_font_scheme)
        .unwrap_or_default();

    // Format scheme fills can carry scheme colors and gradients, so give
    // them a context with the palette already in place.
    let mut theme = Theme {
        color_scheme,
        font_scheme,
        format_scheme: FormatScheme::default(),
    };
    if let Some(fmt) = elements.child("fmtScheme") {
        let color_map = ColorMap::identity();
        let ctx = ParseContext {
            container,
            part_path,
            rels,
            theme: &theme,
            color_map: &color_map,
            warnings,
            location: "Theme".to_string(),
        };
        let format_scheme = parse_format_scheme(fmt, &ctx);
        theme.format_scheme = format_scheme;
    }
    Ok(theme)
}

fn parse_color_scheme(node: &XmlNode) -> HashMap<String, String> {
    let mut scheme = HashMap::new();
    for entry in node.elements() {
        let hex = entry
            .child("srgbClr")
            .and_then(|c| c.attr("val"))
            .map(str::to_string)
            .or_else(|| {
                entry
                    .child("sysClr")
                    .and_then(|c| c.attr("lastClr"))
                    .map(str::to_string)
            });
        if let Some(hex) = hex {
            scheme.insert(entry.name.clone(), hex.to_ascii_uppercase());
        }
    }
    scheme
}

fn parse_font_scheme(node: &XmlNode) -> FontScheme {
    let mut scheme = FontScheme::default();
    if let Some(major) = node.child("majorFont") {
        if let Some(latin) = major.child("latin").and_then(|l| l.attr("typeface")) {
            if !latin.is_empty() {
                scheme.major_font = latin.to_string();
            }
        }
        scheme.major_font_ea = major
            .child("ea")
            .and_then(|l| l.attr("typeface"))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        scheme.major_font_cs = major
            .child("cs")
            .and_then(|l| l.attr("typeface"))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
    if let Some(minor) = node.child("minorFont") {
        if let Some(latin) = minor.child("latin").and_then(|l| l.attr("typeface")) {
            if !latin.is_empty() {
                scheme.minor_font = latin.to_string();
            }
        }
        scheme.minor_font_ea = minor
            .child("ea")
            .and_then(|l| l.attr("typeface"))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        scheme.minor_font_cs = minor
            .child("cs")
            .and_then(|l| l.attr("typeface"))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
    scheme
}

fn parse_format_scheme(fmt: &XmlNode, ctx: &ParseContext) -> FormatScheme {
    let mut scheme = FormatScheme::default();
    if let Some(fills) = fmt.child("fillStyleLst") {
        scheme.fill_styles = fills.elements().map(|f| fill::parse_fill(f, ctx)).collect();
    }
    if let Some(fills) = fmt.child("bgFillStyleLst") {
        scheme.bg_fill_styles = fills.elements().map(|f| fill::parse_fill(f, ctx)).collect();
    }
    if let Some(lines) = fmt.child("lnStyleLst") {
        scheme.line_styles = lines
            .children("ln")
            .map(|ln| fill::parse_outline(ln, ctx))
            .collect();
    }
    if let Some(effects) = fmt.child("effectStyleLst") {
        scheme.effect_styles = effects
            .children("effectStyle")
            .map(|style| {
                style
                    .child("effectLst")
                    .and_then(|lst| effect::parse_effect_list(lst, ctx))
            })
            .collect();
    }
    scheme
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fill;

    const THEME_XML: &str = r#"<?xml version="1.0"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
    </a:fontScheme>
    <a:fmtScheme name="Office">
      <a:fillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:gradFill>
          <a:gsLst>
            <a:gs pos="0"><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:gs>
            <a:gs pos="100000"><a:schemeClr val="phClr"/></a:gs>
          </a:gsLst>
          <a:lin ang="5400000"/>
        </a:gradFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:fillStyleLst>
      <a:lnStyleLst>
        <a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
        <a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>
      </a:lnStyleLst>
      <a:effectStyleLst>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle><a:effectLst/></a:effectStyle>
        <a:effectStyle>
          <a:effectLst>
            <a:outerShdw blurRad="57150" dist="19050" dir="5400000">
              <a:srgbClr val="000000"><a:alpha val="63000"/></a:srgbClr>
            </a:outerShdw>
          </a:effectLst>
        </a:effectStyle>
      </a:effectStyleLst>
      <a:bgFillStyleLst>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
        <a:solidFill><a:schemeClr val="phClr"/></a:solidFill>
      </a:bgFillStyleLst>
    </a:fmtScheme>
  </a:themeElements>
</a:theme>"#;

    fn parse_fixture() -> Theme {
        let empty_zip = vec![
            0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let container = PptxContainer::from_bytes(empty_zip).unwrap();
        let rels = Relationships::new();
        let warnings = WarningCollector::default();
        parse_theme(
            THEME_XML,
            &container,
            "ppt/theme/theme1.xml",
            &rels,
            &warnings,
        )
        .unwrap()
    }

    #[test]
    fn test_palette() {
        let theme = parse_fixture();
        assert_eq!(theme.color("dk1"), Some("000000"));
        assert_eq!(theme.color("lt1"), Some("FFFFFF"));
        assert_eq!(theme.color("accent1"), Some("4472C4"));
        assert_eq!(theme.color("hlink"), Some("0563C1"));
    }

    #[test]
    fn test_fonts() {
        let theme = parse_fixture();
        assert_eq!(theme.font_scheme.major_font, "Calibri Light");
        assert_eq!(theme.font_scheme.minor_font, "Calibri");
        // Empty typefaces stay unset.
        assert!(theme.font_scheme.major_font_ea.is_none());
    }

    #[test]
    fn test_format_scheme_shapes() {
        let theme = parse_fixture();
        assert_eq!(theme.format_scheme.fill_styles.len(), 3);
        assert!(matches!(
            theme.format_scheme.fill_styles[1],
            Fill::Gradient(_)
        ));
        assert_eq!(theme.format_scheme.line_styles.len(), 3);
        assert_eq!(
            theme.format_scheme.line_styles[1].as_ref().map(|l| l.width),
            Some(crate::units::Emu(12_700))
        );
        assert_eq!(theme.format_scheme.effect_styles.len(), 3);
        assert!(theme.format_scheme.effect_styles[0].is_none());
        assert!(theme.format_scheme.effect_styles[2].is_some());
    }
}
