//! Slide element dispatch and placement.
//!
//! Every element renders in a local space from the origin to its extent
//! and is positioned by a group carrying the placement transform:
//! translation, then rotation about the center, then flips.

use crate::model::shape::{
    Connector, Group, Image, Shape, SlideElement, Transform,
};
use crate::render::context::RenderContext;
use crate::render::svg::{escape, px, Defs};
use crate::render::{chart, effect, fill, geometry, image, table, text};
use std::fmt::Write;

/// Placement transform attribute, empty for an untransformed element.
fn transform_attribute(transform: &Transform) -> String {
    let x = transform.offset_x.to_pixels();
    let y = transform.offset_y.to_pixels();
    let w = transform.extent_width.to_pixels();
    let h = transform.extent_height.to_pixels();

    let mut parts = Vec::new();
    if x != 0.0 || y != 0.0 {
        parts.push(format!("translate({} {})", px(x), px(y)));
    }
    if transform.rotation != 0.0 {
        parts.push(format!(
            "rotate({} {} {})",
            px(transform.rotation),
            px(w / 2.0),
            px(h / 2.0)
        ));
    }
    if transform.flip_h || transform.flip_v {
        let sx = if transform.flip_h { -1.0 } else { 1.0 };
        let sy = if transform.flip_v { -1.0 } else { 1.0 };
        parts.push(format!(
            "translate({} {}) scale({sx} {sy}) translate({} {})",
            px(w / 2.0),
            px(h / 2.0),
            px(-w / 2.0),
            px(-h / 2.0)
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" transform=\"{}\"", parts.join(" "))
    }
}

fn open_group(transform: &Transform, alt_text: Option<&str>) -> String {
    let mut out = format!("<g{}>", transform_attribute(transform));
    if let Some(alt) = alt_text {
        let _ = write!(out, "<title>{}</title>", escape(alt));
    }
    out.push('\n');
    out
}

/// Render one slide element, appending shared defs as needed.
pub fn render_element(element: &SlideElement, defs: &mut Defs, ctx: &RenderContext) -> String {
    match element {
        SlideElement::Shape(shape) => render_shape(shape, defs, ctx),
        SlideElement::Connector(connector) => render_connector(connector, defs, ctx),
        SlideElement::Image(img) => render_image_element(img, defs, ctx),
        SlideElement::Group(group) => render_group(group, defs, ctx),
        SlideElement::Chart(element) => {
            let w = element.transform.extent_width.to_pixels();
            let h = element.transform.extent_height.to_pixels();
            let mut out = open_group(&element.transform, None);
            out.push_str(&chart::render_chart(&element.chart, w, h, ctx));
            out.push_str("</g>\n");
            out
        }
        SlideElement::Table(element) => {
            let mut out = open_group(&element.transform, None);
            out.push_str(&table::render_table(&element.table, defs, ctx));
            out.push_str("</g>\n");
            out
        }
    }
}

fn paint_attributes(
    shape_fill: Option<&crate::model::fill::Fill>,
    outline: Option<&crate::model::fill::Outline>,
    effects: Option<&crate::model::effect::EffectList>,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> String {
    let mut attrs = match shape_fill {
        Some(f) => fill::fill_attributes(f, defs, ctx)
            .unwrap_or_else(|| "fill=\"none\"".to_string()),
        None => "fill=\"none\"".to_string(),
    };
    match outline.and_then(|o| fill::stroke_attributes(o, defs, ctx)) {
        Some(stroke) => {
            attrs.push(' ');
            attrs.push_str(&stroke);
        }
        None => {}
    }
    if let Some(list) = effects {
        attrs.push(' ');
        attrs.push_str(&effect::effect_filter(list, defs, ctx));
    }
    attrs
}

fn render_shape(shape: &Shape, defs: &mut Defs, ctx: &RenderContext) -> String {
    let w = shape.transform.extent_width.to_pixels();
    let h = shape.transform.extent_height.to_pixels();

    let attrs = paint_attributes(
        shape.fill.as_ref(),
        shape.outline.as_ref(),
        shape.effects.as_ref(),
        defs,
        ctx,
    );

    let mut body = geometry::render_geometry(&shape.geometry, w, h, &attrs, ctx);
    if let Some(text_body) = &shape.text_body {
        if text_body.has_text() || !text_body.paragraphs.is_empty() {
            body.push_str(&text::render_text_body(text_body, w, h, ctx));
        }
    }

    let mut out = open_group(&shape.transform, shape.alt_text.as_deref());
    match &shape.hyperlink {
        Some(href) => {
            let _ = write!(out, "<a href=\"{}\">\n{body}</a>\n", escape(href));
        }
        None => out.push_str(&body),
    }
    out.push_str("</g>\n");
    out
}

fn render_connector(connector: &Connector, defs: &mut Defs, ctx: &RenderContext) -> String {
    let w = connector.transform.extent_width.to_pixels();
    let h = connector.transform.extent_height.to_pixels();

    let mut attrs = "fill=\"none\"".to_string();
    if let Some(outline) = &connector.outline {
        if let Some(stroke) = fill::stroke_attributes(outline, defs, ctx) {
            attrs.push(' ');
            attrs.push_str(&stroke);
        }
    } else {
        // A connector with no outline still has to be visible.
        attrs.push_str(" stroke=\"#000000\" stroke-width=\"1\"");
    }
    if let Some(effects) = &connector.effects {
        attrs.push(' ');
        attrs.push_str(&effect::effect_filter(effects, defs, ctx));
    }

    let mut out = open_group(&connector.transform, None);
    out.push_str(&geometry::render_geometry(&connector.geometry, w, h, &attrs, ctx));
    out.push_str("</g>\n");
    out
}

fn render_image_element(img: &Image, defs: &mut Defs, ctx: &RenderContext) -> String {
    let w = img.transform.extent_width.to_pixels();
    let h = img.transform.extent_height.to_pixels();
    let mut out = open_group(&img.transform, img.alt_text.as_deref());
    out.push_str(&image::render_image(img, w, h, defs, ctx));
    out.push_str("</g>\n");
    out
}

fn render_group(group: &Group, defs: &mut Defs, ctx: &RenderContext) -> String {
    let mut out = open_group(&group.transform, None);

    // Children live in the chOff/chExt space and are rescaled into the
    // group's extent.
    let ext_w = group.transform.extent_width.to_pixels();
    let ext_h = group.transform.extent_height.to_pixels();
    let ch_w = group.child_transform.extent_width.to_pixels();
    let ch_h = group.child_transform.extent_height.to_pixels();
    let sx = if ch_w > 0.0 { ext_w / ch_w } else { 1.0 };
    let sy = if ch_h > 0.0 { ext_h / ch_h } else { 1.0 };
    let ox = group.child_transform.offset_x.to_pixels();
    let oy = group.child_transform.offset_y.to_pixels();

    let needs_inner = sx != 1.0 || sy != 1.0 || ox != 0.0 || oy != 0.0;
    if needs_inner {
        let _ = writeln!(
            out,
            "<g transform=\"scale({sx:.6} {sy:.6}) translate({} {})\">",
            px(-ox),
            px(-oy)
        );
    }
    for child in &group.children {
        out.push_str(&render_element(child, defs, ctx));
    }
    if needs_inner {
        out.push_str("</g>\n");
    }
    out.push_str("</g>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fill::{Fill, ResolvedColor};
    use crate::model::shape::{ChildTransform, Geometry};
    use crate::render::measure::HeuristicMeasurer;
    use crate::units::Emu;
    use crate::warnings::WarningCollector;
    use std::collections::HashMap;

    fn with_ctx<R>(f: impl FnOnce(&RenderContext, &mut Defs) -> R) -> R {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        let mut defs = Defs::default();
        f(&ctx, &mut defs)
    }

    fn transform(x: i64, y: i64, w: i64, h: i64) -> Transform {
        Transform {
            offset_x: Emu(x),
            offset_y: Emu(y),
            extent_width: Emu(w),
            extent_height: Emu(h),
            rotation: 0.0,
            flip_h: false,
            flip_v: false,
        }
    }

    fn red_rect() -> Shape {
        Shape {
            transform: transform(914_400, 457_200, 914_400, 914_400),
            geometry: Geometry::rect(),
            fill: Some(Fill::Solid {
                color: ResolvedColor::opaque("#FF0000"),
            }),
            outline: None,
            effects: None,
            text_body: None,
            placeholder: None,
            alt_text: None,
            hyperlink: None,
        }
    }

    #[test]
    fn test_shape_is_translated() {
        with_ctx(|ctx, defs| {
            let svg = render_element(&SlideElement::Shape(red_rect()), defs, ctx);
            assert!(svg.contains(r#"transform="translate(96 48)""#));
            assert!(svg.contains(r##"fill="#FF0000""##));
        });
    }

    #[test]
    fn test_rotation_about_center() {
        with_ctx(|ctx, defs| {
            let mut shape = red_rect();
            shape.transform.rotation = 45.0;
            let svg = render_element(&SlideElement::Shape(shape), defs, ctx);
            assert!(svg.contains("rotate(45 48 48)"));
        });
    }

    #[test]
    fn test_flip_h_mirrors_about_center() {
        with_ctx(|ctx, defs| {
            let mut shape = red_rect();
            shape.transform.flip_h = true;
            let svg = render_element(&SlideElement::Shape(shape), defs, ctx);
            assert!(svg.contains("scale(-1 1)"));
            assert!(svg.contains("translate(48 48)"));
        });
    }

    #[test]
    fn test_hyperlink_wraps_shape() {
        with_ctx(|ctx, defs| {
            let mut shape = red_rect();
            shape.hyperlink = Some("https://example.com/a&b".to_string());
            let svg = render_element(&SlideElement::Shape(shape), defs, ctx);
            assert!(svg.contains("<a href=\"https://example.com/a&amp;b\">"));
        });
    }

    #[test]
    fn test_alt_text_becomes_title() {
        with_ctx(|ctx, defs| {
            let mut shape = red_rect();
            shape.alt_text = Some("A red square".to_string());
            let svg = render_element(&SlideElement::Shape(shape), defs, ctx);
            assert!(svg.contains("<title>A red square</title>"));
        });
    }

    #[test]
    fn test_group_rescales_children() {
        with_ctx(|ctx, defs| {
            let group = Group {
                transform: transform(0, 0, 914_400, 914_400),
                child_transform: ChildTransform {
                    offset_x: Emu(457_200),
                    offset_y: Emu(0),
                    extent_width: Emu(1_828_800),
                    extent_height: Emu(1_828_800),
                },
                children: vec![SlideElement::Shape(red_rect())],
            };
            let svg = render_element(&SlideElement::Group(group), defs, ctx);
            // Half-scale child space shifted left by the child offset.
            assert!(svg.contains("scale(0.500000 0.500000) translate(-48 0)"));
        });
    }

    #[test]
    fn test_connector_default_stroke() {
        with_ctx(|ctx, defs| {
            let connector = Connector {
                transform: transform(0, 0, 914_400, 457_200),
                geometry: Geometry::Preset {
                    preset: "line".to_string(),
                    adjust_values: HashMap::new(),
                },
                outline: None,
                effects: None,
            };
            let svg = render_element(&SlideElement::Connector(connector), defs, ctx);
            assert!(svg.contains(r##"stroke="#000000""##));
            assert!(svg.contains("<line"));
        });
    }

    #[test]
    fn test_no_fill_shape_paints_nothing() {
        with_ctx(|ctx, defs| {
            let mut shape = red_rect();
            shape.fill = Some(Fill::None);
            let svg = render_element(&SlideElement::Shape(shape), defs, ctx);
            assert!(svg.contains(r#"fill="none""#));
        });
    }
}
