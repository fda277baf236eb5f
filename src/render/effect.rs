//! SVG filter generation for shape and image effects.

use crate::model::effect::{BlipEffects, EffectList, Shadow};
use crate::render::context::RenderContext;
use crate::render::svg::Defs;
use std::fmt::Write;

fn hex_channels(hex: &str) -> (f64, f64, f64) {
    let parse = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0) as f64 / 255.0;
    if hex.len() == 7 {
        (parse(&hex[1..3]), parse(&hex[3..5]), parse(&hex[5..7]))
    } else {
        (0.0, 0.0, 0.0)
    }
}

fn shadow_offset(shadow: &Shadow) -> (f64, f64) {
    let rad = shadow.direction.to_radians();
    let dist = shadow.distance.to_pixels();
    (dist * rad.cos(), dist * rad.sin())
}

/// Register a filter for a shape effect list and return the `filter`
/// attribute to put on the shape, e.g. `filter="url(#fx-ab12-0)"`.
pub fn effect_filter(effects: &EffectList, defs: &mut Defs, ctx: &RenderContext) -> String {
    let id = ctx.next_id("fx");
    let mut f = format!(
        r#"<filter id="{id}" x="-50%" y="-50%" width="200%" height="200%" color-interpolation-filters="sRGB">"#
    );

    if let Some(soft) = &effects.soft_edge {
        let _ = write!(
            f,
            r#"<feGaussianBlur in="SourceGraphic" stdDeviation="{:.2}" result="soft"/>"#,
            soft.radius.to_pixels() / 2.0
        );
    }
    let source = if effects.soft_edge.is_some() {
        "soft"
    } else {
        "SourceGraphic"
    };

    if let Some(glow) = &effects.glow {
        let (r, g, b) = hex_channels(&glow.color.hex);
        let _ = write!(
            f,
            r#"<feGaussianBlur in="SourceAlpha" stdDeviation="{:.2}"/><feColorMatrix type="matrix" values="0 0 0 0 {r:.3} 0 0 0 0 {g:.3} 0 0 0 0 {b:.3} 0 0 0 {:.3} 0" result="glow"/>"#,
            glow.radius.to_pixels() / 2.0,
            glow.color.alpha
        );
    }

    if let Some(shadow) = &effects.outer_shadow {
        let (dx, dy) = shadow_offset(shadow);
        let (r, g, b) = hex_channels(&shadow.color.hex);
        let _ = write!(
            f,
            r#"<feGaussianBlur in="SourceAlpha" stdDeviation="{:.2}"/><feOffset dx="{dx:.2}" dy="{dy:.2}"/><feColorMatrix type="matrix" values="0 0 0 0 {r:.3} 0 0 0 0 {g:.3} 0 0 0 0 {b:.3} 0 0 0 {:.3} 0" result="shadow"/>"#,
            shadow.blur_radius.to_pixels() / 2.0,
            shadow.color.alpha
        );
    }

    // Stack: shadow below, then glow, then the shape itself.
    f.push_str("<feMerge>");
    if effects.outer_shadow.is_some() {
        f.push_str(r#"<feMergeNode in="shadow"/>"#);
    }
    if effects.glow.is_some() {
        f.push_str(r#"<feMergeNode in="glow"/>"#);
    }
    let _ = write!(f, r#"<feMergeNode in="{source}"/>"#);
    f.push_str("</feMerge>");

    if let Some(shadow) = &effects.inner_shadow {
        let (dx, dy) = shadow_offset(shadow);
        let (r, g, b) = hex_channels(&shadow.color.hex);
        // Invert the alpha, offset it, and composite back inside the shape.
        let _ = write!(
            f,
            r#"<feComponentTransfer in="SourceAlpha" result="inv"><feFuncA type="table" tableValues="1 0"/></feComponentTransfer><feGaussianBlur in="inv" stdDeviation="{:.2}"/><feOffset dx="{dx:.2}" dy="{dy:.2}"/><feColorMatrix type="matrix" values="0 0 0 0 {r:.3} 0 0 0 0 {g:.3} 0 0 0 0 {b:.3} 0 0 0 {:.3} 0"/><feComposite operator="in" in2="SourceAlpha"/><feComposite operator="over" in2="SourceGraphic"/>"#,
            shadow.blur_radius.to_pixels() / 2.0,
            shadow.color.alpha
        );
    }

    f.push_str("</filter>");
    defs.add(&f);
    format!(r#"filter="url(#{id})""#)
}

/// Register a filter for raster image adjustments. Returns `None` when the
/// effect set needs no filter.
pub fn blip_filter(effects: &BlipEffects, defs: &mut Defs, ctx: &RenderContext) -> Option<String> {
    if effects.is_empty() {
        return None;
    }
    let id = ctx.next_id("imgfx");
    let mut f = format!(r#"<filter id="{id}" color-interpolation-filters="sRGB">"#);

    if let Some(radius) = &effects.blur_radius {
        let _ = write!(
            f,
            r#"<feGaussianBlur stdDeviation="{:.2}"/>"#,
            radius.to_pixels() / 2.0
        );
    }
    if effects.grayscale || effects.duotone.is_some() || effects.bi_level.is_some() {
        f.push_str(r#"<feColorMatrix type="matrix" values="0.2126 0.7152 0.0722 0 0 0.2126 0.7152 0.0722 0 0 0.2126 0.7152 0.0722 0 0 0 0 0 1 0"/>"#);
    }
    if let Some(threshold) = effects.bi_level {
        // Step function around the threshold via a discrete transfer table.
        let steps = 16usize;
        let mut values = String::new();
        for i in 0..=steps {
            let v = i as f64 / steps as f64;
            if i > 0 {
                values.push(' ');
            }
            values.push_str(if v < threshold { "0" } else { "1" });
        }
        let _ = write!(
            f,
            r#"<feComponentTransfer><feFuncR type="discrete" tableValues="{values}"/><feFuncG type="discrete" tableValues="{values}"/><feFuncB type="discrete" tableValues="{values}"/></feComponentTransfer>"#
        );
    }
    if let Some(duotone) = &effects.duotone {
        let (dr, dg, db) = hex_channels(&duotone.dark.hex);
        let (lr, lg, lb) = hex_channels(&duotone.light.hex);
        // Luminance interpolates between the dark and the light color.
        let _ = write!(
            f,
            r#"<feComponentTransfer><feFuncR type="table" tableValues="{dr:.3} {lr:.3}"/><feFuncG type="table" tableValues="{dg:.3} {lg:.3}"/><feFuncB type="table" tableValues="{db:.3} {lb:.3}"/></feComponentTransfer>"#
        );
    }
    if let Some(lum) = &effects.luminance {
        let slope = 1.0 + lum.contrast;
        let intercept = lum.brightness - lum.contrast / 2.0;
        let _ = write!(
            f,
            r#"<feComponentTransfer><feFuncR type="linear" slope="{slope:.3}" intercept="{intercept:.3}"/><feFuncG type="linear" slope="{slope:.3}" intercept="{intercept:.3}"/><feFuncB type="linear" slope="{slope:.3}" intercept="{intercept:.3}"/></feComponentTransfer>"#
        );
    }

    f.push_str("</filter>");
    defs.add(&f);
    Some(format!(r#"filter="url(#{id})""#))
}
