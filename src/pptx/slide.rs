//! Shape tree parsing shared by slides, layouts and masters.

use crate::container::PptxContainer;
use crate::model::shape::{
    ChildTransform, Connector, Geometry, Group, Image, Placeholder, Shape, SlideElement, SrcRect,
    Transform,
};
use crate::model::table::TableElement;
use crate::model::chart::ChartElement;
use crate::model::Fill;
use crate::pptx::{chart, effect, fill, geometry, style, table, text, ParseContext};
use crate::units::{angle_to_degrees, Emu};
use crate::xml::XmlNode;

/// Parse every supported element of an `spTree`, in document (paint) order.
pub fn parse_shape_tree(sp_tree: &XmlNode, ctx: &ParseContext) -> Vec<SlideElement> {
    let mut elements = Vec::new();
    for child in sp_tree.elements() {
        match child.name.as_str() {
            "sp" => elements.push(SlideElement::Shape(parse_shape(child, ctx))),
            "cxnSp" => elements.push(SlideElement::Connector(parse_connector(child, ctx))),
            "pic" => {
                if let Some(image) = parse_picture(child, ctx) {
                    elements.push(SlideElement::Image(image));
                }
            }
            "grpSp" => elements.push(SlideElement::Group(parse_group(child, ctx))),
            "graphicFrame" => {
                if let Some(element) = parse_graphic_frame(child, ctx) {
                    elements.push(element);
                }
            }
            "nvGrpSpPr" | "grpSpPr" => {}
            "AlternateContent" => {
                // mc:AlternateContent: prefer the fallback branch, which is
                // plain DrawingML.
                if let Some(branch) = child.child("Fallback").or_else(|| child.child("Choice")) {
                    elements.extend(parse_shape_tree(branch, ctx));
                }
            }
            other => {
                ctx.warn(
                    "shape-tree-element",
                    format!("element '{other}' is not rendered"),
                );
            }
        }
    }
    elements
}

/// Parse an `a:xfrm` into a transform. Missing pieces stay zero, which the
/// placeholder inheritance step treats as "inherit from the layer below".
pub fn parse_transform(xfrm: &XmlNode) -> Transform {
    let mut t = Transform {
        rotation: angle_to_degrees(xfrm.attr_i64("rot").unwrap_or(0)),
        flip_h: xfrm.attr_bool("flipH"),
        flip_v: xfrm.attr_bool("flipV"),
        ..Transform::default()
    };
    if let Some(off) = xfrm.child("off") {
        t.offset_x = Emu(off.attr_i64("x").unwrap_or(0));
        t.offset_y = Emu(off.attr_i64("y").unwrap_or(0));
    }
    if let Some(ext) = xfrm.child("ext") {
        t.extent_width = Emu(ext.attr_i64("cx").unwrap_or(0));
        t.extent_height = Emu(ext.attr_i64("cy").unwrap_or(0));
    }
    t
}

fn parse_child_transform(xfrm: &XmlNode) -> ChildTransform {
    let mut t = ChildTransform::default();
    if let Some(off) = xfrm.child("chOff") {
        t.offset_x = Emu(off.attr_i64("x").unwrap_or(0));
        t.offset_y = Emu(off.attr_i64("y").unwrap_or(0));
    }
    if let Some(ext) = xfrm.child("chExt") {
        t.extent_width = Emu(ext.attr_i64("cx").unwrap_or(0));
        t.extent_height = Emu(ext.attr_i64("cy").unwrap_or(0));
    }
    t
}

fn parse_placeholder(nv_pr: &XmlNode) -> Option<Placeholder> {
    let ph = nv_pr.child("ph")?;
    Some(Placeholder {
        ph_type: ph.attr("type").unwrap_or("body").to_string(),
        index: ph.attr_i64("idx").map(|v| v.max(0) as u32),
    })
}

fn shape_hyperlink(c_nv_pr: &XmlNode, ctx: &ParseContext) -> Option<String> {
    let link = c_nv_pr.child("hlinkClick")?;
    let id = link.attr_exact("r:id").or_else(|| link.attr("id"))?;
    let rel = ctx.rels.get(id)?;
    rel.external.then(|| rel.target.clone())
}

pub fn parse_shape(sp: &XmlNode, ctx: &ParseContext) -> Shape {
    let nv = sp.child("nvSpPr");
    let placeholder = nv
        .and_then(|nv| nv.child("nvPr"))
        .and_then(parse_placeholder);
    let c_nv_pr = nv.and_then(|nv| nv.child("cNvPr"));
    let alt_text = c_nv_pr
        .and_then(|c| c.attr("descr"))
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let hyperlink = c_nv_pr.and_then(|c| shape_hyperlink(c, ctx));

    let refs = sp
        .child("style")
        .map(|s| style::resolve_style(s, ctx))
        .unwrap_or_default();

    let mut shape = Shape {
        transform: Transform::default(),
        geometry: Geometry::rect(),
        fill: None,
        outline: None,
        effects: None,
        text_body: None,
        placeholder,
        alt_text,
        hyperlink,
    };

    if let Some(sp_pr) = sp.child("spPr") {
        if let Some(xfrm) = sp_pr.child("xfrm") {
            shape.transform = parse_transform(xfrm);
        }
        if let Some(geom) = geometry::parse_geometry(sp_pr, ctx) {
            shape.geometry = geom;
        }
        // An explicit fill or line wins over the style reference; an absent
        // one falls through to it.
        shape.fill = fill::parse_fill_in(sp_pr, ctx).or(refs.fill);
        shape.outline = match sp_pr.child("ln") {
            Some(ln) => fill::parse_outline(ln, ctx),
            None => refs.outline,
        };
        shape.effects = sp_pr
            .child("effectLst")
            .and_then(|lst| effect::parse_effect_list(lst, ctx))
            .or(refs.effects);
    } else {
        shape.fill = refs.fill;
        shape.outline = refs.outline;
        shape.effects = refs.effects;
    }

    if let Some(tx_body) = sp.child("txBody") {
        let mut body = text::parse_text_body(tx_body, ctx);
        // fontRef is the shape's own base formatting; runs that specify
        // nothing pick it up before the placeholder cascade runs.
        if refs.font_family.is_some() || refs.font_color.is_some() {
            for paragraph in &mut body.paragraphs {
                for run in &mut paragraph.runs {
                    if run.properties.font_family.is_none() {
                        run.properties.font_family = refs.font_family.clone();
                    }
                    if run.properties.color.is_none() {
                        run.properties.color = refs.font_color.clone();
                    }
                }
            }
        }
        shape.text_body = Some(body);
    }

    shape
}

fn parse_connector(cxn: &XmlNode, ctx: &ParseContext) -> Connector {
    let refs = cxn
        .child("style")
        .map(|s| style::resolve_style(s, ctx))
        .unwrap_or_default();

    let mut connector = Connector {
        transform: Transform::default(),
        geometry: Geometry::Preset {
            preset: "line".to_string(),
            adjust_values: Default::default(),
        },
        outline: None,
        effects: None,
    };
    if let Some(sp_pr) = cxn.child("spPr") {
        if let Some(xfrm) = sp_pr.child("xfrm") {
            connector.transform = parse_transform(xfrm);
        }
        if let Some(geom) = geometry::parse_geometry(sp_pr, ctx) {
            connector.geometry = geom;
        }
        connector.outline = match sp_pr.child("ln") {
            Some(ln) => fill::parse_outline(ln, ctx),
            None => refs.outline,
        };
        connector.effects = sp_pr
            .child("effectLst")
            .and_then(|lst| effect::parse_effect_list(lst, ctx))
            .or(refs.effects);
    } else {
        connector.outline = refs.outline;
        connector.effects = refs.effects;
    }
    connector
}

fn parse_picture(pic: &XmlNode, ctx: &ParseContext) -> Option<Image> {
    let blip_fill = pic.child("blipFill")?;
    let blip = blip_fill.child("blip")?;

    let alt_text = pic
        .child("nvPicPr")
        .and_then(|nv| nv.child("cNvPr"))
        .and_then(|c| c.attr("descr"))
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let (data, mime_type) = match fill::load_blip_media(blip, ctx) {
        Some(media) => media,
        None => {
            ctx.warn("picture-media", "picture media could not be loaded");
            return None;
        }
    };

    let src_rect = blip_fill.child("srcRect").map(|sr| SrcRect {
        left: sr.attr_f64("l").unwrap_or(0.0) / 100_000.0,
        top: sr.attr_f64("t").unwrap_or(0.0) / 100_000.0,
        right: sr.attr_f64("r").unwrap_or(0.0) / 100_000.0,
        bottom: sr.attr_f64("b").unwrap_or(0.0) / 100_000.0,
    });
    let tile_flip = blip_fill
        .child("tile")
        .map(|t| t.attr("flip").unwrap_or("none").to_string());

    let mut image = Image {
        transform: Transform::default(),
        data,
        mime_type,
        src_rect: src_rect.filter(|sr| {
            sr.left != 0.0 || sr.top != 0.0 || sr.right != 0.0 || sr.bottom != 0.0
        }),
        tile_flip,
        outline: None,
        effects: None,
        blip_effects: effect::parse_blip_effects(blip, ctx),
        alt_text,
    };

    if let Some(sp_pr) = pic.child("spPr") {
        if let Some(xfrm) = sp_pr.child("xfrm") {
            image.transform = parse_transform(xfrm);
        }
        image.outline = sp_pr.child("ln").and_then(|ln| fill::parse_outline(ln, ctx));
        image.effects = sp_pr
            .child("effectLst")
            .and_then(|lst| effect::parse_effect_list(lst, ctx));
    }

    Some(image)
}

fn parse_group(grp: &XmlNode, ctx: &ParseContext) -> Group {
    let (transform, child_transform) = grp
        .child("grpSpPr")
        .and_then(|pr| pr.child("xfrm"))
        .map(|xfrm| (parse_transform(xfrm), parse_child_transform(xfrm)))
        .unwrap_or_default();

    Group {
        transform,
        child_transform,
        children: parse_shape_tree(grp, ctx),
    }
}

fn parse_graphic_frame(frame: &XmlNode, ctx: &ParseContext) -> Option<SlideElement> {
    let transform = frame
        .child("xfrm")
        .map(parse_transform)
        .unwrap_or_default();
    let data = frame.child("graphic")?.child("graphicData")?;
    let uri = data.attr("uri").unwrap_or("");

    if uri.ends_with("/table") || data.child("tbl").is_some() {
        let tbl = data.child("tbl")?;
        return Some(SlideElement::Table(TableElement {
            transform,
            table: table::parse_table(tbl, ctx),
        }));
    }

    if uri.ends_with("/chart") || data.child("chart").is_some() {
        let chart_ref = data.child("chart")?;
        let rel_id = chart_ref.attr_exact("r:id").or_else(|| chart_ref.attr("id"))?;
        let rel = ctx.rels.get(rel_id)?;
        let chart_path = PptxContainer::resolve_path(ctx.part_path, &rel.target);
        let xml = ctx.container.read_xml(&chart_path).ok()?;
        let chart_rels = ctx.container.read_relationships(&chart_path).ok()?;
        let chart_ctx = ParseContext {
            container: ctx.container,
            part_path: &chart_path,
            rels: &chart_rels,
            theme: ctx.theme,
            color_map: ctx.color_map,
            warnings: ctx.warnings,
            location: ctx.location.clone(),
        };
        return match chart::parse_chart(&xml, &chart_ctx) {
            Ok(Some(parsed)) => Some(SlideElement::Chart(ChartElement {
                transform,
                chart: parsed,
            })),
            Ok(None) => None,
            Err(_) => {
                ctx.warn("chart-parse", "chart part could not be parsed");
                None
            }
        };
    }

    ctx.warn(
        "graphic-frame",
        format!("graphic frame content '{uri}' is not rendered"),
    );
    None
}

/// Resolve a `p:bg` element against the format scheme.
pub fn parse_background(bg: &XmlNode, ctx: &ParseContext) -> Option<Fill> {
    if let Some(bg_pr) = bg.child("bgPr") {
        return fill::parse_fill_in(bg_pr, ctx);
    }
    if let Some(bg_ref) = bg.child("bgRef") {
        let idx = bg_ref.attr_i64("idx").unwrap_or(0);
        if idx == 0 {
            return None;
        }
        // Reuse the style resolver by treating bgRef as a fillRef.
        let scheme = &ctx.theme.format_scheme;
        let base = if idx >= 1000 {
            scheme.bg_fill_styles.get((idx - 1001) as usize)
        } else {
            scheme.fill_styles.get((idx - 1) as usize)
        }?;
        let color = crate::pptx::color::resolve_color_in(bg_ref, &ctx.colors());
        return Some(match (base, color) {
            (Fill::Solid { .. }, Some(c)) => Fill::Solid { color: c },
            (Fill::Gradient(grad), Some(c)) => {
                let mut grad = grad.clone();
                for stop in &mut grad.stops {
                    let alpha = stop.color.alpha;
                    stop.color = crate::model::ResolvedColor {
                        hex: c.hex.clone(),
                        alpha,
                    };
                }
                Fill::Gradient(grad)
            }
            (other, _) => other.clone(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{PptxContainer, Relationships};
    use crate::model::presentation::ColorMap;
    use crate::model::{ResolvedColor, Theme};
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
            theme
                .color_scheme
                .insert("dk1".to_string(), "000000".to_string());
            theme
                .color_scheme
                .insert("lt1".to_string(), "FFFFFF".to_string());
            theme.format_scheme.fill_styles = vec![Fill::Solid {
                color: ResolvedColor::opaque("#000000"),
            }];
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
                part_path: "ppt/slides/slide1.xml",
                rels: &self.rels,
                theme: &self.theme,
                color_map: &self.color_map,
                warnings: &self.warnings,
                location: "Slide 1".to_string(),
            }
        }
    }

    const SIMPLE_SHAPE: &str = r#"<p:sp xmlns:p="p" xmlns:a="a">
      <p:nvSpPr>
        <p:cNvPr id="2" name="Title 1" descr="headline"/>
        <p:nvSpPr/>
        <p:nvPr><p:ph type="ctrTitle"/></p:nvPr>
      </p:nvSpPr>
      <p:spPr>
        <a:xfrm rot="1200000" flipH="1">
          <a:off x="914400" y="457200"/>
          <a:ext cx="1828800" cy="914400"/>
        </a:xfrm>
        <a:prstGeom prst="roundRect"><a:avLst><a:gd name="adj" fmla="val 25000"/></a:avLst></a:prstGeom>
        <a:solidFill><a:srgbClr val="FF0000"/></a:solidFill>
      </p:spPr>
      <p:txBody><a:bodyPr/><a:p><a:r><a:t>Hi</a:t></a:r></a:p></p:txBody>
    </p:sp>"#;

    #[test]
    fn test_parse_shape() {
        let fx = Fixture::new();
        let node = XmlNode::parse(SIMPLE_SHAPE).unwrap();
        let shape = parse_shape(&node, &fx.ctx());
        assert_eq!(shape.transform.offset_x, Emu(914_400));
        assert_eq!(shape.transform.extent_height, Emu(914_400));
        assert_eq!(shape.transform.rotation, 20.0);
        assert!(shape.transform.flip_h);
        let ph = shape.placeholder.unwrap();
        assert_eq!(ph.ph_type, "ctrTitle");
        assert_eq!(shape.alt_text.as_deref(), Some("headline"));
        match shape.geometry {
            Geometry::Preset {
                ref preset,
                ref adjust_values,
            } => {
                assert_eq!(preset, "roundRect");
                assert_eq!(adjust_values.get("adj"), Some(&25_000.0));
            }
            _ => panic!("expected preset geometry"),
        }
        assert!(shape.text_body.unwrap().has_text());
    }

    #[test]
    fn test_group_child_space() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<p:grpSp xmlns:p="p" xmlns:a="a">
                 <p:grpSpPr>
                   <a:xfrm>
                     <a:off x="0" y="0"/>
                     <a:ext cx="1828800" cy="914400"/>
                     <a:chOff x="914400" y="0"/>
                     <a:chExt cx="914400" cy="457200"/>
                   </a:xfrm>
                 </p:grpSpPr>
                 <p:sp><p:spPr/></p:sp>
               </p:grpSp>"#,
        )
        .unwrap();
        let group = parse_group(&node, &fx.ctx());
        assert_eq!(group.transform.extent_width, Emu(1_828_800));
        assert_eq!(group.child_transform.offset_x, Emu(914_400));
        assert_eq!(group.child_transform.extent_height, Emu(457_200));
        assert_eq!(group.children.len(), 1);
    }

    #[test]
    fn test_tree_order_preserved() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<p:spTree xmlns:p="p" xmlns:a="a">
                 <p:nvGrpSpPr/><p:grpSpPr/>
                 <p:sp><p:spPr/></p:sp>
                 <p:cxnSp><p:spPr/></p:cxnSp>
                 <p:sp><p:spPr/></p:sp>
               </p:spTree>"#,
        )
        .unwrap();
        let elements = parse_shape_tree(&node, &fx.ctx());
        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[0], SlideElement::Shape(_)));
        assert!(matches!(elements[1], SlideElement::Connector(_)));
        assert!(matches!(elements[2], SlideElement::Shape(_)));
    }

    #[test]
    fn test_background_ref() {
        let fx = Fixture::new();
        let bg = XmlNode::parse(
            r#"<p:bg xmlns:p="p" xmlns:a="a">
                 <p:bgRef idx="1"><a:schemeClr val="lt1"/></p:bgRef>
               </p:bg>"#,
        )
        .unwrap();
        let fill = parse_background(&bg, &fx.ctx()).unwrap();
        assert_eq!(
            fill,
            Fill::Solid {
                color: ResolvedColor::opaque("#FFFFFF")
            }
        );
    }

    #[test]
    fn test_background_pr() {
        let fx = Fixture::new();
        let bg = XmlNode::parse(
            r#"<p:bg xmlns:p="p" xmlns:a="a">
                 <p:bgPr><a:solidFill><a:srgbClr val="123456"/></a:solidFill></p:bgPr>
               </p:bg>"#,
        )
        .unwrap();
        let fill = parse_background(&bg, &fx.ctx()).unwrap();
        assert_eq!(
            fill,
            Fill::Solid {
                color: ResolvedColor::opaque("#123456")
            }
        );
    }

    #[test]
    fn test_missing_picture_media_warns() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<p:pic xmlns:p="p" xmlns:a="a" xmlns:r="r">
                 <p:blipFill><a:blip r:embed="rIdMissing"/></p:blipFill>
                 <p:spPr/>
               </p:pic>"#,
        )
        .unwrap();
        assert!(parse_picture(&node, &fx.ctx()).is_none());
        assert_eq!(fx.warnings.summary().total, 1);
    }
}
