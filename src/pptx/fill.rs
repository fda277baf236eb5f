//! Fill and outline parsing.

use crate::container::PptxContainer;
use crate::model::fill::{
    DashStyle, Fill, GradientFill, GradientKind, GradientStop, ImageFill, LineEnd, Outline,
    PatternFill, ResolvedColor,
};
use crate::pptx::color::{resolve_color_in, ColorContext};
use crate::pptx::ParseContext;
use crate::units::{angle_to_degrees, Emu};
use crate::xml::XmlNode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

const FILL_ELEMENTS: [&str; 6] = [
    "noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill",
];

/// First fill element among the children of `parent`, parsed. `None` means
/// no fill was specified at all, which the caller treats as "inherit".
pub fn parse_fill_in(parent: &XmlNode, ctx: &ParseContext) -> Option<Fill> {
    let node = parent
        .elements()
        .find(|e| FILL_ELEMENTS.contains(&e.name.as_str()))?;
    Some(parse_fill(node, ctx))
}

/// Parse one fill element.
pub fn parse_fill(node: &XmlNode, ctx: &ParseContext) -> Fill {
    let colors = ctx.colors();
    match node.name.as_str() {
        "noFill" => Fill::None,
        "solidFill" => Fill::Solid {
            color: resolve_color_in(node, &colors)
                .unwrap_or_else(|| ResolvedColor::opaque(ResolvedColor::FALLBACK_HEX)),
        },
        "gradFill" => Fill::Gradient(parse_gradient(node, &colors)),
        "blipFill" => match parse_blip_fill(node, ctx) {
            Some(image) => Fill::Image(image),
            None => {
                ctx.warn("blip-fill-media", "image fill media could not be loaded");
                Fill::None
            }
        },
        "pattFill" => Fill::Pattern(PatternFill {
            preset: node.attr("prst").unwrap_or("pct50").to_string(),
            foreground: node
                .child("fgClr")
                .and_then(|c| resolve_color_in(c, &colors))
                .unwrap_or_else(|| ResolvedColor::opaque("#000000")),
            background: node
                .child("bgClr")
                .and_then(|c| resolve_color_in(c, &colors))
                .unwrap_or_else(|| ResolvedColor::opaque("#FFFFFF")),
        }),
        // grpFill inherits from the containing group; the group renderer
        // passes its own fill down, so nothing to resolve here.
        _ => Fill::None,
    }
}

pub fn parse_gradient(node: &XmlNode, colors: &ColorContext) -> GradientFill {
    let mut stops = Vec::new();
    if let Some(gs_lst) = node.child("gsLst") {
        for gs in gs_lst.children("gs") {
            let position = gs.attr_f64("pos").unwrap_or(0.0) / 100_000.0;
            let color = resolve_color_in(gs, colors)
                .unwrap_or_else(|| ResolvedColor::opaque(ResolvedColor::FALLBACK_HEX));
            stops.push(GradientStop { color, position });
        }
    }
    if stops.is_empty() {
        stops.push(GradientStop {
            color: ResolvedColor::opaque("#FFFFFF"),
            position: 0.0,
        });
        stops.push(GradientStop {
            color: ResolvedColor::opaque("#000000"),
            position: 1.0,
        });
    }

    if let Some(path) = node.child("path") {
        // Radial and rectangular path gradients both map to a radial
        // gradient, centered on the fillToRect when present.
        let (mut cx, mut cy) = (0.5, 0.5);
        if let Some(rect) = path.child("fillToRect") {
            let l = rect.attr_f64("l").unwrap_or(0.0) / 100_000.0;
            let t = rect.attr_f64("t").unwrap_or(0.0) / 100_000.0;
            let r = rect.attr_f64("r").unwrap_or(0.0) / 100_000.0;
            let b = rect.attr_f64("b").unwrap_or(0.0) / 100_000.0;
            cx = (l + (1.0 - r)) / 2.0;
            cy = (t + (1.0 - b)) / 2.0;
        }
        return GradientFill {
            stops,
            angle: 0.0,
            kind: GradientKind::Radial,
            center_x: cx,
            center_y: cy,
        };
    }

    let angle = node
        .child("lin")
        .and_then(|lin| lin.attr_i64("ang"))
        .map(angle_to_degrees)
        .unwrap_or(0.0);

    GradientFill {
        stops,
        angle,
        kind: GradientKind::Linear,
        center_x: 0.5,
        center_y: 0.5,
    }
}

/// Load the media behind an `a:blip` reference as base64 plus mime type.
pub fn load_blip_media(blip: &XmlNode, ctx: &ParseContext) -> Option<(String, String)> {
    let rel_id = blip.attr_exact("r:embed").or_else(|| blip.attr("embed"))?;
    let rel = ctx.rels.get(rel_id)?;
    if rel.external {
        return None;
    }
    let path = PptxContainer::resolve_path(ctx.part_path, &rel.target);
    let bytes = ctx.container.read_binary(&path).ok()?;
    Some((BASE64.encode(&bytes), mime_from_path(&path)))
}

fn parse_blip_fill(node: &XmlNode, ctx: &ParseContext) -> Option<ImageFill> {
    let blip = node.child("blip")?;
    let (data, mime_type) = load_blip_media(blip, ctx)?;
    Some(ImageFill {
        data,
        mime_type,
        tile: node.child("tile").is_some(),
    })
}

pub fn mime_from_path(path: &str) -> String {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Parse an `a:ln` element. Returns `None` for an explicit `noFill` stroke.
pub fn parse_outline(ln: &XmlNode, ctx: &ParseContext) -> Option<Outline> {
    if ln.child("noFill").is_some() {
        return None;
    }
    let fill = parse_fill_in(ln, ctx);
    let width = Emu(ln.attr_i64("w").unwrap_or(12_700));

    let dash = ln
        .child("prstDash")
        .and_then(|d| d.attr("val"))
        .map(DashStyle::from_preset)
        .unwrap_or_default();

    let custom_dash = ln.child("custDash").map(|cd| {
        cd.children("ds")
            .flat_map(|ds| {
                let d = parse_percent_or_number(ds.attr("d"));
                let sp = parse_percent_or_number(ds.attr("sp"));
                [d, sp]
            })
            .collect::<Vec<f64>>()
    });

    Some(Outline {
        width,
        fill,
        dash,
        custom_dash: custom_dash.filter(|v| !v.is_empty()),
        cap: ln.attr("cap").map(str::to_string),
        join: parse_join(ln),
        head_end: ln.child("headEnd").and_then(parse_line_end),
        tail_end: ln.child("tailEnd").and_then(parse_line_end),
    })
}

/// Dash segment lengths come as "100%"-style or raw 1/1000 percent values.
fn parse_percent_or_number(value: Option<&str>) -> f64 {
    match value {
        Some(v) if v.ends_with('%') => v.trim_end_matches('%').parse::<f64>().unwrap_or(100.0),
        Some(v) => v.parse::<f64>().unwrap_or(100_000.0) / 1_000.0,
        None => 100.0,
    }
}

fn parse_join(ln: &XmlNode) -> Option<String> {
    for (name, svg) in [("round", "round"), ("bevel", "bevel"), ("miter", "miter")] {
        if ln.child(name).is_some() {
            return Some(svg.to_string());
        }
    }
    None
}

fn parse_line_end(node: &XmlNode) -> Option<LineEnd> {
    let kind = node.attr("type")?;
    if kind == "none" {
        return None;
    }
    Some(LineEnd {
        kind: kind.to_string(),
        width: node.attr("w").map(str::to_string),
        length: node.attr("len").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Relationships;
    use crate::model::presentation::ColorMap;
    use crate::model::Theme;
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
            // Minimal empty zip (EOCD record only).
            let empty_zip = vec![
                0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            ];
            let mut theme = Theme::default();
            theme
                .color_scheme
                .insert("accent1".to_string(), "4472C4".to_string());
            theme
                .color_scheme
                .insert("dk1".to_string(), "000000".to_string());
            theme
                .color_scheme
                .insert("lt1".to_string(), "FFFFFF".to_string());
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

    #[test]
    fn test_solid_fill() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:spPr xmlns:a="a"><a:solidFill><a:schemeClr val="accent1"/></a:solidFill></a:spPr>"#,
        )
        .unwrap();
        let fill = parse_fill_in(&node, &fx.ctx()).unwrap();
        assert_eq!(
            fill,
            Fill::Solid {
                color: ResolvedColor::opaque("#4472C4")
            }
        );
    }

    #[test]
    fn test_no_fill_vs_absent() {
        let fx = Fixture::new();
        let none = XmlNode::parse(r#"<a:spPr xmlns:a="a"><a:noFill/></a:spPr>"#).unwrap();
        assert_eq!(parse_fill_in(&none, &fx.ctx()), Some(Fill::None));
        let absent = XmlNode::parse(r#"<a:spPr xmlns:a="a"/>"#).unwrap();
        assert_eq!(parse_fill_in(&absent, &fx.ctx()), None);
    }

    #[test]
    fn test_linear_gradient_stops_and_angle() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:gradFill xmlns:a="a">
                 <a:gsLst>
                   <a:gs pos="0"><a:srgbClr val="FF0000"/></a:gs>
                   <a:gs pos="100000"><a:srgbClr val="0000FF"/></a:gs>
                 </a:gsLst>
                 <a:lin ang="5400000"/>
               </a:gradFill>"#,
        )
        .unwrap();
        let grad = match parse_fill(&node, &fx.ctx()) {
            Fill::Gradient(g) => g,
            other => panic!("expected gradient, got {other:?}"),
        };
        assert_eq!(grad.kind, GradientKind::Linear);
        assert_eq!(grad.angle, 90.0);
        assert_eq!(grad.stops.len(), 2);
        assert_eq!(grad.stops[0].color.hex, "#FF0000");
        assert_eq!(grad.stops[1].position, 1.0);
    }

    #[test]
    fn test_radial_gradient_center() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:gradFill xmlns:a="a">
                 <a:gsLst><a:gs pos="0"><a:srgbClr val="FFFFFF"/></a:gs></a:gsLst>
                 <a:path path="circle"><a:fillToRect l="100000" t="100000"/></a:path>
               </a:gradFill>"#,
        )
        .unwrap();
        let grad = match parse_fill(&node, &fx.ctx()) {
            Fill::Gradient(g) => g,
            other => panic!("expected gradient, got {other:?}"),
        };
        assert_eq!(grad.kind, GradientKind::Radial);
        assert!((grad.center_x - 1.0).abs() < 1e-9);
        assert!((grad.center_y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_fill() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:pattFill prst="ltHorz" xmlns:a="a">
                 <a:fgClr><a:srgbClr val="111111"/></a:fgClr>
                 <a:bgClr><a:srgbClr val="EEEEEE"/></a:bgClr>
               </a:pattFill>"#,
        )
        .unwrap();
        let patt = match parse_fill(&node, &fx.ctx()) {
            Fill::Pattern(p) => p,
            other => panic!("expected pattern, got {other:?}"),
        };
        assert_eq!(patt.preset, "ltHorz");
        assert_eq!(patt.foreground.hex, "#111111");
        assert_eq!(patt.background.hex, "#EEEEEE");
    }

    #[test]
    fn test_outline_defaults_and_dash() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:ln w="25400" cap="rnd" xmlns:a="a">
                 <a:solidFill><a:srgbClr val="FF0000"/></a:solidFill>
                 <a:prstDash val="dash"/>
                 <a:round/>
               </a:ln>"#,
        )
        .unwrap();
        let ln = parse_outline(&node, &fx.ctx()).unwrap();
        assert_eq!(ln.width, Emu(25_400));
        assert_eq!(ln.dash, DashStyle::Dash);
        assert_eq!(ln.cap.as_deref(), Some("rnd"));
        assert_eq!(ln.join.as_deref(), Some("round"));
    }

    #[test]
    fn test_outline_width_defaults_to_one_point() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:ln xmlns:a="a"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln>"#,
        )
        .unwrap();
        let ln = parse_outline(&node, &fx.ctx()).unwrap();
        assert_eq!(ln.width, Emu(12_700));
    }

    #[test]
    fn test_outline_no_fill_is_none() {
        let fx = Fixture::new();
        let node = XmlNode::parse(r#"<a:ln xmlns:a="a"><a:noFill/></a:ln>"#).unwrap();
        assert!(parse_outline(&node, &fx.ctx()).is_none());
    }

    #[test]
    fn test_line_ends() {
        let fx = Fixture::new();
        let node = XmlNode::parse(
            r#"<a:ln xmlns:a="a">
                 <a:solidFill><a:srgbClr val="000000"/></a:solidFill>
                 <a:headEnd type="none"/>
                 <a:tailEnd type="triangle" w="med" len="lg"/>
               </a:ln>"#,
        )
        .unwrap();
        let ln = parse_outline(&node, &fx.ctx()).unwrap();
        assert!(ln.head_end.is_none());
        let tail = ln.tail_end.unwrap();
        assert_eq!(tail.kind, "triangle");
        assert_eq!(tail.length.as_deref(), Some("lg"));
    }
}
