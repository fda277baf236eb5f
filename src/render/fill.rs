//! Paint attribute generation: fills, strokes, dash patterns, arrowheads.

use crate::model::fill::{
    DashStyle, Fill, GradientFill, GradientKind, ImageFill, LineEnd, Outline, PatternFill,
    ResolvedColor,
};
use crate::render::context::RenderContext;
use crate::render::svg::{px, Defs};
use std::fmt::Write;

/// Paint attributes for a fill. `None` means nothing is painted (explicit
/// noFill); callers writing shapes should emit `fill="none"` instead.
pub fn fill_attributes(
    fill: &Fill,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> Option<String> {
    match fill {
        Fill::None => None,
        Fill::Solid { color } => Some(solid_attributes(color, "fill")),
        Fill::Gradient(gradient) => {
            let id = gradient_def(gradient, defs, ctx);
            Some(format!(r#"fill="url(#{id})""#))
        }
        Fill::Image(image) => {
            let id = image_pattern_def(image, defs, ctx);
            Some(format!(r#"fill="url(#{id})""#))
        }
        Fill::Pattern(pattern) => {
            let id = preset_pattern_def(pattern, defs, ctx);
            Some(format!(r#"fill="url(#{id})""#))
        }
    }
}

fn solid_attributes(color: &ResolvedColor, attr: &str) -> String {
    if color.alpha < 1.0 {
        format!(
            r#"{attr}="{}" {attr}-opacity="{:.3}""#,
            color.hex, color.alpha
        )
    } else {
        format!(r#"{attr}="{}""#, color.hex)
    }
}

/// Register a gradient def and return its id.
pub fn gradient_def(gradient: &GradientFill, defs: &mut Defs, ctx: &RenderContext) -> String {
    let id = ctx.next_id("grad");
    let mut def = String::new();
    match gradient.kind {
        GradientKind::Linear => {
            // Angle is clockwise from the positive x axis; the y axis
            // already points down in SVG, so no sign flip.
            let rad = gradient.angle.to_radians();
            let (dx, dy) = (rad.cos() / 2.0, rad.sin() / 2.0);
            let _ = write!(
                def,
                r#"<linearGradient id="{id}" x1="{}" y1="{}" x2="{}" y2="{}">"#,
                fmt_unit(0.5 - dx),
                fmt_unit(0.5 - dy),
                fmt_unit(0.5 + dx),
                fmt_unit(0.5 + dy)
            );
        }
        GradientKind::Radial => {
            let _ = write!(
                def,
                r#"<radialGradient id="{id}" cx="{}" cy="{}" r="0.75">"#,
                fmt_unit(gradient.center_x),
                fmt_unit(gradient.center_y)
            );
        }
    }
    for stop in &gradient.stops {
        let _ = write!(
            def,
            r#"<stop offset="{}" stop-color="{}""#,
            fmt_unit(stop.position),
            stop.color.hex
        );
        if stop.color.alpha < 1.0 {
            let _ = write!(def, r#" stop-opacity="{:.3}""#, stop.color.alpha);
        }
        def.push_str("/>");
    }
    def.push_str(match gradient.kind {
        GradientKind::Linear => "</linearGradient>",
        GradientKind::Radial => "</radialGradient>",
    });
    defs.add(&def);
    id
}

fn image_pattern_def(image: &ImageFill, defs: &mut Defs, ctx: &RenderContext) -> String {
    let id = ctx.next_id("imgfill");
    if image.tile {
        // The tile's natural size is unknown without decoding the image,
        // so tiling degrades to a cover-style stretch.
        ctx.warn("image-fill-tile", "tiled image fill approximated as stretch");
    }
    let preserve = if image.tile { "xMidYMid slice" } else { "none" };
    defs.add(&format!(
        r#"<pattern id="{id}" width="1" height="1" patternContentUnits="objectBoundingBox"><image width="1" height="1" preserveAspectRatio="{preserve}" href="data:{};base64,{}"/></pattern>"#,
        image.mime_type, image.data
    ));
    id
}

/// Preset hatch patterns on an 8px tile. Unknown presets fall back to a
/// 50% checker.
fn preset_pattern_def(pattern: &PatternFill, defs: &mut Defs, ctx: &RenderContext) -> String {
    let id = ctx.next_id("patt");
    let fg = &pattern.foreground.hex;
    let bg = &pattern.background.hex;
    let content = match pattern.preset.as_str() {
        "ltHorz" | "horz" => format!(r#"<path d="M 0 4 H 8" stroke="{fg}" stroke-width="1"/>"#),
        "ltVert" | "vert" => format!(r#"<path d="M 4 0 V 8" stroke="{fg}" stroke-width="1"/>"#),
        "ltUpDiag" | "upDiag" | "wdUpDiag" => {
            format!(r#"<path d="M 0 8 L 8 0" stroke="{fg}" stroke-width="1"/>"#)
        }
        "ltDnDiag" | "dnDiag" | "wdDnDiag" => {
            format!(r#"<path d="M 0 0 L 8 8" stroke="{fg}" stroke-width="1"/>"#)
        }
        "cross" | "smGrid" | "lgGrid" => format!(
            r#"<path d="M 0 4 H 8 M 4 0 V 8" stroke="{fg}" stroke-width="1"/>"#
        ),
        "diagCross" => format!(
            r#"<path d="M 0 0 L 8 8 M 0 8 L 8 0" stroke="{fg}" stroke-width="1"/>"#
        ),
        "pct5" | "pct10" | "pct20" | "pct25" => format!(
            r#"<circle cx="2" cy="2" r="1" fill="{fg}"/>"#
        ),
        "pct30" | "pct40" | "pct50" => format!(
            r#"<rect x="0" y="0" width="4" height="4" fill="{fg}"/><rect x="4" y="4" width="4" height="4" fill="{fg}"/>"#
        ),
        "pct60" | "pct70" | "pct75" | "pct80" | "pct90" => format!(
            r#"<rect x="0" y="0" width="8" height="8" fill="{fg}"/><rect x="0" y="0" width="4" height="4" fill="{bg}"/>"#
        ),
        other => {
            ctx.warn(
                "pattern-preset",
                format!("pattern preset '{other}' approximated as checker"),
            );
            format!(
                r#"<rect x="0" y="0" width="4" height="4" fill="{fg}"/><rect x="4" y="4" width="4" height="4" fill="{fg}"/>"#
            )
        }
    };
    defs.add(&format!(
        r#"<pattern id="{id}" width="8" height="8" patternUnits="userSpaceOnUse"><rect width="8" height="8" fill="{bg}"/>{content}</pattern>"#
    ));
    id
}

/// Stroke attributes for an outline, including dash pattern and line ends.
/// `None` when the outline paints nothing.
pub fn stroke_attributes(
    outline: &Outline,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> Option<String> {
    let width = outline.width.to_pixels().max(0.25);
    let mut attrs = match outline.fill.as_ref()? {
        Fill::None => return None,
        Fill::Solid { color } => solid_attributes(color, "stroke"),
        Fill::Gradient(gradient) => {
            let id = gradient_def(gradient, defs, ctx);
            format!(r#"stroke="url(#{id})""#)
        }
        other => {
            // Image and pattern strokes are rare; approximate with black.
            let _ = other;
            ctx.warn("stroke-fill", "non-solid stroke approximated as black");
            r##"stroke="#000000""##.to_string()
        }
    };

    let _ = write!(attrs, r#" stroke-width="{}""#, px(width));

    if let Some(dash) = dash_array(outline, width) {
        let _ = write!(attrs, r#" stroke-dasharray="{dash}""#);
    }
    if let Some(cap) = &outline.cap {
        let svg_cap = match cap.as_str() {
            "rnd" => "round",
            "sq" => "square",
            _ => "butt",
        };
        let _ = write!(attrs, r#" stroke-linecap="{svg_cap}""#);
    }
    if let Some(join) = &outline.join {
        let _ = write!(attrs, r#" stroke-linejoin="{join}""#);
    }

    if let Some(head) = &outline.head_end {
        if let Some(color) = stroke_color(outline) {
            let id = marker_def(head, &color, false, defs, ctx);
            let _ = write!(attrs, r#" marker-start="url(#{id})""#);
        }
    }
    if let Some(tail) = &outline.tail_end {
        if let Some(color) = stroke_color(outline) {
            let id = marker_def(tail, &color, true, defs, ctx);
            let _ = write!(attrs, r#" marker-end="url(#{id})""#);
        }
    }

    Some(attrs)
}

fn stroke_color(outline: &Outline) -> Option<String> {
    match outline.fill.as_ref()? {
        Fill::Solid { color } => Some(color.hex.clone()),
        _ => Some("#000000".to_string()),
    }
}

/// Dash segment lengths scale with the stroke width, per the preset tables.
fn dash_array(outline: &Outline, width: f64) -> Option<String> {
    if let Some(custom) = &outline.custom_dash {
        let parts: Vec<String> = custom
            .iter()
            .map(|pct| px(pct / 100.0 * width))
            .collect();
        return Some(parts.join(" "));
    }
    let pattern: &[f64] = match outline.dash {
        DashStyle::Solid => return None,
        DashStyle::Dash => &[4.0, 3.0],
        DashStyle::Dot => &[1.0, 3.0],
        DashStyle::DashDot => &[4.0, 3.0, 1.0, 3.0],
        DashStyle::LgDash => &[8.0, 3.0],
        DashStyle::LgDashDot => &[8.0, 3.0, 1.0, 3.0],
        DashStyle::LgDashDotDot => &[8.0, 3.0, 1.0, 3.0, 1.0, 3.0],
        DashStyle::SysDash => &[3.0, 1.0],
        DashStyle::SysDot => &[1.0, 1.0],
        DashStyle::SysDashDot => &[3.0, 1.0, 1.0, 1.0],
    };
    let parts: Vec<String> = pattern.iter().map(|seg| px(seg * width)).collect();
    Some(parts.join(" "))
}

fn marker_def(
    end: &LineEnd,
    color: &str,
    is_tail: bool,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> String {
    let id = ctx.next_id("marker");
    let scale = match end.width.as_deref() {
        Some("sm") => 0.75,
        Some("lg") => 1.5,
        _ => 1.0,
    };
    let size = 6.0 * scale;
    // Head markers point against the path direction.
    let orient = if is_tail { "auto" } else { "auto-start-reverse" };
    let shape = match end.kind.as_str() {
        "oval" => format!(r#"<circle cx="3" cy="3" r="3" fill="{color}"/>"#),
        "diamond" => format!(r#"<path d="M 3 0 L 6 3 L 3 6 L 0 3 Z" fill="{color}"/>"#),
        "stealth" => format!(r#"<path d="M 0 0 L 6 3 L 0 6 L 1.5 3 Z" fill="{color}"/>"#),
        "arrow" => format!(
            r#"<path d="M 0 0 L 6 3 L 0 6" fill="none" stroke="{color}" stroke-width="1"/>"#
        ),
        _ => format!(r#"<path d="M 0 0 L 6 3 L 0 6 Z" fill="{color}"/>"#),
    };
    defs.add(&format!(
        r#"<marker id="{id}" markerWidth="{size}" markerHeight="{size}" refX="3" refY="3" orient="{orient}" markerUnits="strokeWidth" viewBox="0 0 6 6">{shape}</marker>"#
    ));
    id
}

fn fmt_unit(v: f64) -> String {
    format!("{:.4}", v)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
