//! Slide master and layout layer parsing.
//!
//! Masters and layouts contribute three things to a resolved slide: a
//! background, decoration shapes painted under the slide's own, and the
//! per-placeholder list styles the text cascade walks.

use crate::model::presentation::{ColorMap, TextStyleLevel, TextStyleLevels};
use crate::model::shape::{Placeholder, SlideElement, Transform};
use crate::model::theme::MasterTextStyles;
use crate::model::Fill;
use crate::pptx::color::resolve_color_in;
use crate::pptx::{slide, ParseContext};
use crate::units::Pt;
use crate::xml::XmlNode;
use std::collections::HashMap;

/// The style and geometry a placeholder contributes to shapes that inherit
/// from it.
#[derive(Debug, Clone)]
pub struct PlaceholderStyle {
    pub placeholder: Placeholder,
    /// The placeholder's own box, inherited by shapes without an `xfrm`.
    pub transform: Option<Transform>,
    pub list_style: TextStyleLevels,
}

/// Parsed master or layout part.
#[derive(Debug, Clone)]
pub struct Layer {
    pub background: Option<Fill>,
    /// Non-placeholder decoration shapes, in paint order.
    pub decorations: Vec<SlideElement>,
    pub placeholder_styles: Vec<PlaceholderStyle>,
    /// `showMasterSp` on layouts, `true` elsewhere.
    pub show_master_shapes: bool,
}

/// Read the `clrMap` attributes of a master (or `overrideClrMapping`).
pub fn parse_color_map(node: &XmlNode) -> ColorMap {
    let mut map = HashMap::new();
    for (key, value) in &node.attrs {
        map.insert(key.clone(), value.clone());
    }
    if map.is_empty() {
        ColorMap::identity()
    } else {
        ColorMap::new(map)
    }
}

/// Color map override of a slide or layout part, if present.
pub fn color_map_override(root: &XmlNode) -> Option<ColorMap> {
    root.child("clrMapOvr")
        .and_then(|ovr| ovr.child("overrideClrMapping"))
        .map(parse_color_map)
}

/// Parse the shared structure of a master or layout part.
pub fn parse_layer(root: &XmlNode, ctx: &ParseContext) -> Layer {
    let show_master_shapes = root
        .attr("showMasterSp")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(true);

    let c_sld = match root.child("cSld") {
        Some(c) => c,
        None => {
            return Layer {
                background: None,
                decorations: Vec::new(),
                placeholder_styles: Vec::new(),
                show_master_shapes,
            }
        }
    };

    let background = c_sld
        .child("bg")
        .and_then(|bg| slide::parse_background(bg, ctx));

    let mut decorations = Vec::new();
    let mut placeholder_styles = Vec::new();
    if let Some(sp_tree) = c_sld.child("spTree") {
        for element in slide::parse_shape_tree(sp_tree, ctx) {
            match &element {
                SlideElement::Shape(shape) if shape.placeholder.is_some() => {
                    // Placeholder boxes are templates, not content; their
                    // list styles feed the cascade instead.
                }
                _ => decorations.push(element),
            }
        }
        // A second pass over the raw tree keeps the lstStyle, which the
        // shape parser does not retain.
        for sp in sp_tree.children("sp") {
            if let Some(style) = placeholder_style(sp, ctx) {
                placeholder_styles.push(style);
            }
        }
    }

    Layer {
        background,
        decorations,
        placeholder_styles,
        show_master_shapes,
    }
}

fn placeholder_style(sp: &XmlNode, ctx: &ParseContext) -> Option<PlaceholderStyle> {
    let ph = sp
        .child("nvSpPr")
        .and_then(|nv| nv.child("nvPr"))
        .and_then(|nv| nv.child("ph"))?;
    let placeholder = Placeholder {
        ph_type: ph.attr("type").unwrap_or("body").to_string(),
        index: ph.attr_i64("idx").map(|v| v.max(0) as u32),
    };
    let transform = sp
        .child("spPr")
        .and_then(|pr| pr.child("xfrm"))
        .map(slide::parse_transform);
    let list_style = sp
        .child("txBody")
        .and_then(|body| body.child("lstStyle"))
        .map(|lst| parse_list_style(lst, ctx))
        .unwrap_or_default();
    Some(PlaceholderStyle {
        placeholder,
        transform,
        list_style,
    })
}

/// Parse a `lstStyle` (or any element carrying `defPPr`/`lvlXpPr` children).
pub fn parse_list_style(node: &XmlNode, ctx: &ParseContext) -> TextStyleLevels {
    let mut styles = TextStyleLevels::default();
    for child in node.elements() {
        match child.name.as_str() {
            "defPPr" => styles.default_paragraph = style_level(child, ctx),
            name => {
                if let Some(level) = name
                    .strip_prefix("lvl")
                    .and_then(|rest| rest.strip_suffix("pPr"))
                    .and_then(|n| n.parse::<usize>().ok())
                {
                    if (1..=9).contains(&level) {
                        styles.levels[level - 1] = style_level(child, ctx);
                    }
                }
            }
        }
    }
    styles
}

fn style_level(ppr: &XmlNode, ctx: &ParseContext) -> Option<TextStyleLevel> {
    let def_rpr = ppr.child("defRPr")?;
    let fonts = &ctx.theme.font_scheme;
    let level = TextStyleLevel {
        font_size: def_rpr.attr_i64("sz").map(|v| Pt::from_hundredths(v).0),
        font_family: def_rpr
            .child("latin")
            .and_then(|f| f.attr("typeface"))
            .filter(|t| !t.is_empty())
            .map(|t| fonts.resolve(t)),
        font_family_ea: def_rpr
            .child("ea")
            .and_then(|f| f.attr("typeface"))
            .filter(|t| !t.is_empty())
            .map(|t| fonts.resolve(t)),
        color: def_rpr
            .child("solidFill")
            .and_then(|f| resolve_color_in(f, &ctx.colors())),
    };
    if level.is_empty() {
        None
    } else {
        Some(level)
    }
}

/// Parse the `txStyles` element of a master.
pub fn parse_master_text_styles(tx_styles: &XmlNode, ctx: &ParseContext) -> MasterTextStyles {
    MasterTextStyles {
        title: tx_styles
            .child("titleStyle")
            .map(|s| parse_list_style(s, ctx))
            .unwrap_or_default(),
        body: tx_styles
            .child("bodyStyle")
            .map(|s| parse_list_style(s, ctx))
            .unwrap_or_default(),
        other: tx_styles
            .child("otherStyle")
            .map(|s| parse_list_style(s, ctx))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{PptxContainer, Relationships};
    use crate::model::Theme;
    use crate::units::Emu;
    use crate::warnings::WarningCollector;

    struct Fixture {
        container: PptxContainer,
        rels: Relationships,
        theme: Theme,
        color_map: ColorMap,
        warnings: WarningCollector,
    }

    impl Fixture {
        fn new() -> Self {
            let empty_zip = vec![
                0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            ];
            let mut theme = Theme::default();
            theme.font_scheme.major_font = "Georgia".to_string();
            theme
                .color_scheme
                .insert("dk2".to_string(), "44546A".to_string());
            theme
                .color_scheme
                .insert("dk1".to_string(), "000000".to_string());
            Self {
                container: PptxContainer::from_bytes(empty_zip).unwrap(),
                rels: Relationships::new(),
                theme,
                color_map: ColorMap::identity(),
                warnings: WarningCollector::default(),
            }
        }

        fn ctx(&self) -> ParseContext<'_> {
            ParseContext {
                container: &self.container,
                part_path: "ppt/slideMasters/slideMaster1.xml",
                rels: &self.rels,
                theme: &self.theme,
                color_map: &self.color_map,
                warnings: &self.warnings,
                location: "Master".to_string(),
            }
        }
    }

    #[test]
    fn test_color_map_attrs() {
        let node = XmlNode::parse(
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" xmlns:p="p"/>"#,
        )
        .unwrap();
        let map = parse_color_map(&node);
        assert_eq!(map.resolve("bg1"), "lt1");
        assert_eq!(map.resolve("tx2"), "dk2");
    }

    #[test]
    fn test_list_style_levels() {
        let fx = Fixture::new();
        let lst = XmlNode::parse(
            r#"<a:lstStyle xmlns:a="a">
                 <a:defPPr><a:defRPr sz="1800"/></a:defPPr>
                 <a:lvl1pPr>
                   <a:defRPr sz="4400">
                     <a:solidFill><a:schemeClr val="dk2"/></a:solidFill>
                     <a:latin typeface="+mj-lt"/>
                   </a:defRPr>
                 </a:lvl1pPr>
                 <a:lvl2pPr><a:defRPr sz="3200"/></a:lvl2pPr>
               </a:lstStyle>"#,
        )
        .unwrap();
        let fx_ctx = fx.ctx();
        let styles = parse_list_style(&lst, &fx_ctx);
        let lvl1 = styles.levels[0].as_ref().unwrap();
        assert_eq!(lvl1.font_size, Some(44.0));
        assert_eq!(lvl1.font_family.as_deref(), Some("Georgia"));
        assert_eq!(lvl1.color.as_ref().map(|c| c.hex.as_str()), Some("#44546A"));
        assert_eq!(styles.levels[1].as_ref().unwrap().font_size, Some(32.0));
        assert_eq!(
            styles.default_paragraph.as_ref().unwrap().font_size,
            Some(18.0)
        );
        // Level 5 has no entry and falls to defPPr.
        assert_eq!(styles.level(4).unwrap().font_size, Some(18.0));
    }

    #[test]
    fn test_layer_splits_placeholders_from_decorations() {
        let fx = Fixture::new();
        let root = XmlNode::parse(
            r#"<p:sldLayout showMasterSp="0" xmlns:p="p" xmlns:a="a">
                 <p:cSld>
                   <p:bg><p:bgPr><a:solidFill><a:srgbClr val="EEEEEE"/></a:solidFill></p:bgPr></p:bg>
                   <p:spTree>
                     <p:sp>
                       <p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
                       <p:spPr><a:xfrm><a:off x="914400" y="274638"/><a:ext cx="7315200" cy="1143000"/></a:xfrm></p:spPr>
                       <p:txBody>
                         <a:bodyPr/>
                         <a:lstStyle><a:lvl1pPr><a:defRPr sz="4000"/></a:lvl1pPr></a:lstStyle>
                         <a:p/>
                       </p:txBody>
                     </p:sp>
                     <p:sp>
                       <p:nvSpPr><p:cNvPr id="3" name="Decoration"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
                       <p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm></p:spPr>
                     </p:sp>
                   </p:spTree>
                 </p:cSld>
               </p:sldLayout>"#,
        )
        .unwrap();
        let layer = parse_layer(&root, &fx.ctx());
        assert!(!layer.show_master_shapes);
        assert!(layer.background.is_some());
        assert_eq!(layer.decorations.len(), 1);
        assert_eq!(layer.placeholder_styles.len(), 1);
        let ph = &layer.placeholder_styles[0];
        assert_eq!(ph.placeholder.ph_type, "title");
        assert_eq!(ph.transform.as_ref().map(|t| t.offset_x), Some(Emu(914_400)));
        assert_eq!(
            ph.list_style.levels[0].as_ref().unwrap().font_size,
            Some(40.0)
        );
    }

    #[test]
    fn test_master_text_styles_buckets() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<p:txStyles xmlns:p="p" xmlns:a="a">
                 <p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"/></a:lvl1pPr></p:titleStyle>
                 <p:bodyStyle><a:lvl1pPr><a:defRPr sz="2800"/></a:lvl1pPr></p:bodyStyle>
                 <p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle>
               </p:txStyles>"#,
        )
        .unwrap();
        let fx_ctx = fx.ctx();
        let styles = parse_master_text_styles(&node, &fx_ctx);
        assert_eq!(styles.title.levels[0].as_ref().unwrap().font_size, Some(44.0));
        assert_eq!(styles.body.levels[0].as_ref().unwrap().font_size, Some(28.0));
        assert_eq!(styles.other.levels[0].as_ref().unwrap().font_size, Some(18.0));
    }
}
