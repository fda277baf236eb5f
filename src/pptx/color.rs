//! DrawingML color resolution.
//!
//! A color element (`srgbClr`, `schemeClr`, `sysClr`, `prstClr`) resolves to
//! a hex value, then its child transforms apply in a fixed order: luminance
//! modulation/offset, tint, shade, alpha. Scheme colors go through the color
//! map first (`bg1` -> `lt1`), then the theme palette.

use crate::model::presentation::ColorMap;
use crate::model::ResolvedColor;
use crate::xml::XmlNode;
use std::collections::HashMap;

/// Palette and slot mapping a color lookup runs against.
pub struct ColorContext<'a> {
    /// Theme palette, keyed dk1/lt1/dk2/lt2/accent1..6/hlink/folHlink.
    pub scheme: &'a HashMap<String, String>,
    pub map: &'a ColorMap,
}

/// Names of the color element variants, used to find a color child inside
/// `solidFill`, `gs`, `fgClr` and friends.
const COLOR_ELEMENTS: [&str; 6] = [
    "srgbClr", "schemeClr", "sysClr", "prstClr", "hslClr", "scrgbClr",
];

/// First color element child of `parent`, if any.
pub fn find_color_element(parent: &XmlNode) -> Option<&XmlNode> {
    parent
        .elements()
        .find(|e| COLOR_ELEMENTS.contains(&e.name.as_str()))
}

/// Resolve a color element to normal form. `None` only when `node` is not a
/// color element at all; unresolvable references fall back to black.
pub fn resolve_color(node: &XmlNode, ctx: &ColorContext) -> Option<ResolvedColor> {
    let base = match node.name.as_str() {
        "srgbClr" => node.attr("val").map(str::to_string),
        "schemeClr" => {
            let slot = node.attr("val").unwrap_or("dk1");
            Some(lookup_scheme(slot, ctx))
        }
        "sysClr" => Some(
            node.attr("lastClr")
                .map(str::to_string)
                .unwrap_or_else(|| "000000".to_string()),
        ),
        "prstClr" => Some(preset_color(node.attr("val").unwrap_or("")).to_string()),
        "hslClr" => {
            let h = node.attr_f64("hue").unwrap_or(0.0) / 60_000.0;
            let s = node.attr_f64("sat").unwrap_or(0.0) / 100_000.0;
            let l = node.attr_f64("lum").unwrap_or(0.0) / 100_000.0;
            Some(hex_from_rgb(hsl_to_rgb(h, s, l)))
        }
        "scrgbClr" => {
            let r = node.attr_f64("r").unwrap_or(0.0) / 100_000.0;
            let g = node.attr_f64("g").unwrap_or(0.0) / 100_000.0;
            let b = node.attr_f64("b").unwrap_or(0.0) / 100_000.0;
            Some(hex_from_rgb((
                (r * 255.0).round().clamp(0.0, 255.0) as u8,
                (g * 255.0).round().clamp(0.0, 255.0) as u8,
                (b * 255.0).round().clamp(0.0, 255.0) as u8,
            )))
        }
        _ => return None,
    };

    let hex = base.unwrap_or_else(|| "000000".to_string());
    Some(apply_transforms(&hex, node))
}

/// Find and resolve a color element inside `parent`.
pub fn resolve_color_in(parent: &XmlNode, ctx: &ColorContext) -> Option<ResolvedColor> {
    find_color_element(parent).and_then(|c| resolve_color(c, ctx))
}

fn lookup_scheme(slot: &str, ctx: &ColorContext) -> String {
    let mapped = ctx.map.resolve(slot);
    if let Some(hex) = ctx.scheme.get(mapped) {
        return hex.clone();
    }
    // Slots without a map entry may name the palette directly.
    if let Some(hex) = ctx.scheme.get(slot) {
        return hex.clone();
    }
    ctx.scheme
        .get("dk1")
        .cloned()
        .unwrap_or_else(|| "000000".to_string())
}

fn apply_transforms(hex: &str, node: &XmlNode) -> ResolvedColor {
    let mut rgb = parse_hex(hex);
    let mut alpha = 1.0;

    let pct = |n: &XmlNode| n.attr_f64("val").unwrap_or(0.0) / 100_000.0;

    // Luminance first, in HSL space.
    let lum_mod = node.child("lumMod").map(pct);
    let lum_off = node.child("lumOff").map(pct);
    if lum_mod.is_some() || lum_off.is_some() {
        let (h, s, mut l) = rgb_to_hsl(rgb);
        if let Some(m) = lum_mod {
            l *= m;
        }
        if let Some(o) = lum_off {
            l += o;
        }
        rgb = hsl_to_rgb(h, s, l.clamp(0.0, 1.0));
    }

    if let Some(t) = node.child("tint").map(pct) {
        rgb = (
            tint_channel(rgb.0, t),
            tint_channel(rgb.1, t),
            tint_channel(rgb.2, t),
        );
    }

    if let Some(s) = node.child("shade").map(pct) {
        rgb = (
            shade_channel(rgb.0, s),
            shade_channel(rgb.1, s),
            shade_channel(rgb.2, s),
        );
    }

    if let Some(a) = node.child("alpha").map(pct) {
        alpha = a.clamp(0.0, 1.0);
    }

    ResolvedColor {
        hex: hex_from_rgb(rgb),
        alpha,
    }
}

// Tint moves the channel toward white by the given fraction.
fn tint_channel(c: u8, tint: f64) -> u8 {
    (c as f64 + (255.0 - c as f64) * tint)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn shade_channel(c: u8, shade: f64) -> u8 {
    (c as f64 * shade).round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return (0, 0, 0);
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    (r, g, b)
}

fn hex_from_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

fn rgb_to_hsl((r, g, b): (u8, u8, u8)) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if (max - r).abs() < f64::EPSILON {
        ((g - b) / d + if g < b { 6.0 } else { 0.0 }) * 60.0
    } else if (max - g).abs() < f64::EPSILON {
        ((b - r) / d + 2.0) * 60.0
    } else {
        ((r - g) / d + 4.0) * 60.0
    };
    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s <= 0.0 {
        let v = (l * 255.0).round().clamp(0.0, 255.0) as u8;
        return (v, v, v);
    }
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (
        ((r1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((g1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((b1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

fn preset_color(name: &str) -> &'static str {
    match name {
        "black" => "000000",
        "white" => "FFFFFF",
        "red" => "FF0000",
        "green" => "008000",
        "blue" => "0000FF",
        "yellow" => "FFFF00",
        "cyan" => "00FFFF",
        "magenta" => "FF00FF",
        "gray" | "grey" => "808080",
        "ltGray" | "lightGray" => "D3D3D3",
        "dkGray" | "darkGray" => "A9A9A9",
        "orange" => "FFA500",
        "purple" => "800080",
        "brown" => "A52A2A",
        "pink" => "FFC0CB",
        "silver" => "C0C0C0",
        "navy" => "000080",
        "teal" => "008080",
        "maroon" => "800000",
        "olive" => "808000",
        "lime" => "00FF00",
        _ => "000000",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::presentation::ColorMap;

    fn palette() -> HashMap<String, String> {
        [
            ("dk1", "000000"),
            ("lt1", "FFFFFF"),
            ("dk2", "44546A"),
            ("lt2", "E7E6E6"),
            ("accent1", "4472C4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn ctx<'a>(scheme: &'a HashMap<String, String>, map: &'a ColorMap) -> ColorContext<'a> {
        ColorContext { scheme, map }
    }

    #[test]
    fn test_srgb_plain() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(r#"<a:srgbClr val="FF0000" xmlns:a="a"/>"#).unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#FF0000");
        assert_eq!(c.alpha, 1.0);
    }

    #[test]
    fn test_scheme_through_color_map() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(r#"<a:schemeClr val="bg1" xmlns:a="a"/>"#).unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#FFFFFF");
    }

    #[test]
    fn test_unknown_scheme_falls_back_to_dk1() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(r#"<a:schemeClr val="accent9" xmlns:a="a"/>"#).unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#000000");
    }

    #[test]
    fn test_alpha_transform() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(
            r#"<a:srgbClr val="4472C4" xmlns:a="a"><a:alpha val="50000"/></a:srgbClr>"#,
        )
        .unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#4472C4");
        assert!((c.alpha - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_tint_moves_toward_white() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(
            r#"<a:srgbClr val="000000" xmlns:a="a"><a:tint val="50000"/></a:srgbClr>"#,
        )
        .unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#808080");
    }

    #[test]
    fn test_quarter_tint_is_a_quarter_of_the_way_to_white() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(
            r#"<a:srgbClr val="000000" xmlns:a="a"><a:tint val="25000"/></a:srgbClr>"#,
        )
        .unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#404040");

        // And from a non-black base.
        let node = XmlNode::parse(
            r#"<a:srgbClr val="8040C0" xmlns:a="a"><a:tint val="25000"/></a:srgbClr>"#,
        )
        .unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#A070D0");
    }

    #[test]
    fn test_shade_moves_toward_black() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node = XmlNode::parse(
            r#"<a:srgbClr val="FFFFFF" xmlns:a="a"><a:shade val="50000"/></a:srgbClr>"#,
        )
        .unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#808080");
    }

    #[test]
    fn test_lum_mod_off() {
        let scheme = palette();
        let map = ColorMap::identity();
        // 50% luminance of white is mid gray.
        let node = XmlNode::parse(
            r#"<a:srgbClr val="FFFFFF" xmlns:a="a"><a:lumMod val="50000"/></a:srgbClr>"#,
        )
        .unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#808080");
    }

    #[test]
    fn test_sys_color_uses_last_clr() {
        let scheme = palette();
        let map = ColorMap::identity();
        let node =
            XmlNode::parse(r#"<a:sysClr val="windowText" lastClr="1A1A1A" xmlns:a="a"/>"#).unwrap();
        let c = resolve_color(&node, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#1A1A1A");
        let bare = XmlNode::parse(r#"<a:sysClr val="window" xmlns:a="a"/>"#).unwrap();
        assert_eq!(resolve_color(&bare, &ctx(&scheme, &map)).unwrap().hex, "#000000");
    }

    #[test]
    fn test_find_color_element_in_solid_fill() {
        let scheme = palette();
        let map = ColorMap::identity();
        let fill = XmlNode::parse(
            r#"<a:solidFill xmlns:a="a"><a:schemeClr val="accent1"/></a:solidFill>"#,
        )
        .unwrap();
        let c = resolve_color_in(&fill, &ctx(&scheme, &map)).unwrap();
        assert_eq!(c.hex, "#4472C4");
    }
}
