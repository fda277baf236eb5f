//! Effect list and blip effect parsing.

use crate::model::effect::{BlipEffects, Duotone, EffectList, Glow, Luminance, Shadow, SoftEdge};
use crate::model::ResolvedColor;
use crate::pptx::color::resolve_color_in;
use crate::pptx::ParseContext;
use crate::units::{angle_to_degrees, Emu};
use crate::xml::XmlNode;

/// Parse an `a:effectLst`. Returns `None` when no supported effect is
/// present so callers can skip the filter element entirely.
pub fn parse_effect_list(node: &XmlNode, ctx: &ParseContext) -> Option<EffectList> {
    let colors = ctx.colors();

    let shadow_from = |n: &XmlNode| Shadow {
        color: resolve_color_in(n, &colors).unwrap_or(ResolvedColor {
            hex: "#000000".to_string(),
            alpha: 0.5,
        }),
        blur_radius: Emu(n.attr_i64("blurRad").unwrap_or(0)),
        distance: Emu(n.attr_i64("dist").unwrap_or(0)),
        direction: angle_to_degrees(n.attr_i64("dir").unwrap_or(0)),
    };

    let list = EffectList {
        outer_shadow: node.child("outerShdw").map(shadow_from),
        inner_shadow: node.child("innerShdw").map(shadow_from),
        glow: node.child("glow").map(|n| Glow {
            color: resolve_color_in(n, &colors)
                .unwrap_or_else(|| ResolvedColor::opaque("#FFFF00")),
            radius: Emu(n.attr_i64("rad").unwrap_or(0)),
        }),
        soft_edge: node.child("softEdge").map(|n| SoftEdge {
            radius: Emu(n.attr_i64("rad").unwrap_or(0)),
        }),
    };

    for child in node.elements() {
        if !matches!(
            child.name.as_str(),
            "outerShdw" | "innerShdw" | "glow" | "softEdge"
        ) {
            ctx.warn(
                "effect-unsupported",
                format!("effect '{}' is not rendered", child.name),
            );
        }
    }

    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

/// Parse raster effect children of an `a:blip`.
pub fn parse_blip_effects(blip: &XmlNode, ctx: &ParseContext) -> Option<BlipEffects> {
    let colors = ctx.colors();
    let mut effects = BlipEffects::default();
    let mut duotone_colors: Vec<ResolvedColor> = Vec::new();

    for child in blip.elements() {
        match child.name.as_str() {
            "grayscl" => effects.grayscale = true,
            "biLevel" => {
                effects.bi_level =
                    Some(child.attr_f64("thresh").unwrap_or(50_000.0) / 100_000.0);
            }
            "blur" => {
                effects.blur_radius = Some(Emu(child.attr_i64("rad").unwrap_or(0)));
            }
            "lum" => {
                effects.luminance = Some(Luminance {
                    brightness: child.attr_f64("bright").unwrap_or(0.0) / 100_000.0,
                    contrast: child.attr_f64("contrast").unwrap_or(0.0) / 100_000.0,
                });
            }
            "duotone" => {
                duotone_colors = child
                    .elements()
                    .filter_map(|c| crate::pptx::color::resolve_color(c, &colors))
                    .collect();
            }
            "alphaModFix" | "extLst" => {}
            other => {
                ctx.warn(
                    "blip-effect-unsupported",
                    format!("image effect '{other}' is not rendered"),
                );
            }
        }
    }

    if duotone_colors.len() == 2 {
        let mut it = duotone_colors.into_iter();
        effects.duotone = Some(Duotone {
            dark: it.next().unwrap_or_else(|| ResolvedColor::opaque("#000000")),
            light: it.next().unwrap_or_else(|| ResolvedColor::opaque("#FFFFFF")),
        });
    }

    if effects.is_empty() {
        None
    } else {
        Some(effects)
    }
}
