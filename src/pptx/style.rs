//! Shape style reference resolution (`p:style`).
//!
//! A style reference points into the theme's format scheme and carries the
//! color that replaces the `phClr` placeholder. Per-stop tint and shade
//! variations inside matrix gradients are approximated by substituting the
//! reference color into every stop.

use crate::model::effect::EffectList;
use crate::model::fill::{Fill, Outline, ResolvedColor};
use crate::pptx::color::resolve_color_in;
use crate::pptx::ParseContext;
use crate::xml::XmlNode;

/// Resolved output of a `p:style` element.
#[derive(Debug, Clone, Default)]
pub struct StyleRefs {
    pub fill: Option<Fill>,
    pub outline: Option<Outline>,
    pub effects: Option<EffectList>,
    pub font_family: Option<String>,
    pub font_color: Option<ResolvedColor>,
}

pub fn resolve_style(style: &XmlNode, ctx: &ParseContext) -> StyleRefs {
    let scheme = &ctx.theme.format_scheme;
    let colors = ctx.colors();
    let mut refs = StyleRefs::default();

    if let Some(fill_ref) = style.child("fillRef") {
        let idx = fill_ref.attr_i64("idx").unwrap_or(0);
        let color = resolve_color_in(fill_ref, &colors);
        // 1..999 indexes fillStyleLst, 1001+ indexes bgFillStyleLst.
        let base = if idx >= 1000 {
            scheme.bg_fill_styles.get((idx - 1001) as usize)
        } else if idx >= 1 {
            scheme.fill_styles.get((idx - 1) as usize)
        } else {
            None
        };
        refs.fill = base.map(|f| match &color {
            Some(c) => substitute_color(f, c),
            None => f.clone(),
        });
    }

    if let Some(ln_ref) = style.child("lnRef") {
        let idx = ln_ref.attr_i64("idx").unwrap_or(0);
        let color = resolve_color_in(ln_ref, &colors);
        if idx >= 1 {
            if let Some(Some(outline)) = scheme.line_styles.get((idx - 1) as usize) {
                let mut outline = outline.clone();
                if let (Some(c), Some(fill)) = (&color, &outline.fill) {
                    outline.fill = Some(substitute_color(fill, c));
                }
                refs.outline = Some(outline);
            }
        }
    }

    if let Some(effect_ref) = style.child("effectRef") {
        let idx = effect_ref.attr_i64("idx").unwrap_or(0);
        if let Some(Some(effects)) = scheme.effect_styles.get(idx as usize) {
            refs.effects = Some(effects.clone());
        }
    }

    if let Some(font_ref) = style.child("fontRef") {
        refs.font_family = match font_ref.attr("idx") {
            Some("major") => Some(ctx.theme.font_scheme.major_font.clone()),
            Some("minor") => Some(ctx.theme.font_scheme.minor_font.clone()),
            _ => None,
        };
        refs.font_color = resolve_color_in(font_ref, &colors);
    }

    refs
}

/// Replace the placeholder color in a matrix style with the reference color.
fn substitute_color(fill: &Fill, color: &ResolvedColor) -> Fill {
    match fill {
        Fill::Solid { .. } => Fill::Solid {
            color: color.clone(),
        },
        Fill::Gradient(grad) => {
            let mut grad = grad.clone();
            for stop in &mut grad.stops {
                let alpha = stop.color.alpha;
                stop.color = ResolvedColor {
                    hex: color.hex.clone(),
                    alpha,
                };
            }
            Fill::Gradient(grad)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{PptxContainer, Relationships};
    use crate::model::fill::{GradientFill, GradientKind, GradientStop};
    use crate::model::presentation::ColorMap;
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
            theme
                .color_scheme
                .insert("accent1".to_string(), "4472C4".to_string());
            theme
                .color_scheme
                .insert("dk1".to_string(), "000000".to_string());
            theme.format_scheme.fill_styles = vec![
                Fill::Solid {
                    color: ResolvedColor::opaque("#000000"),
                },
                Fill::Gradient(GradientFill {
                    stops: vec![
                        GradientStop {
                            color: ResolvedColor {
                                hex: "#000000".to_string(),
                                alpha: 0.8,
                            },
                            position: 0.0,
                        },
                        GradientStop {
                            color: ResolvedColor::opaque("#000000"),
                            position: 1.0,
                        },
                    ],
                    angle: 90.0,
                    kind: GradientKind::Linear,
                    center_x: 0.5,
                    center_y: 0.5,
                }),
            ];
            theme.format_scheme.bg_fill_styles = vec![Fill::Solid {
                color: ResolvedColor::opaque("#111111"),
            }];
            theme.format_scheme.line_styles = vec![Some(Outline::solid(
                Emu(6_350),
                ResolvedColor::opaque("#000000"),
            ))];
            theme.format_scheme.effect_styles = vec![None, None, None];
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
    fn test_fill_ref_substitutes_solid_color() {
        let fx = Fixture::new();
        let style = XmlNode::parse(
            r#"<p:style xmlns:p="p" xmlns:a="a">
                 <a:fillRef idx="1"><a:schemeClr val="accent1"/></a:fillRef>
               </p:style>"#,
        )
        .unwrap();
        let refs = resolve_style(&style, &fx.ctx());
        assert_eq!(
            refs.fill,
            Some(Fill::Solid {
                color: ResolvedColor::opaque("#4472C4")
            })
        );
    }

    #[test]
    fn test_fill_ref_substitutes_gradient_stops() {
        let fx = Fixture::new();
        let style = XmlNode::parse(
            r#"<p:style xmlns:p="p" xmlns:a="a">
                 <a:fillRef idx="2"><a:schemeClr val="accent1"/></a:fillRef>
               </p:style>"#,
        )
        .unwrap();
        let refs = resolve_style(&style, &fx.ctx());
        let grad = match refs.fill {
            Some(Fill::Gradient(g)) => g,
            other => panic!("expected gradient, got {other:?}"),
        };
        assert!(grad.stops.iter().all(|s| s.color.hex == "#4472C4"));
        // Stop alpha survives the substitution.
        assert!((grad.stops[0].color.alpha - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_fill_ref_background_band() {
        let fx = Fixture::new();
        let style = XmlNode::parse(
            r#"<p:style xmlns:p="p" xmlns:a="a"><a:fillRef idx="1001"/></p:style>"#,
        )
        .unwrap();
        let refs = resolve_style(&style, &fx.ctx());
        assert_eq!(
            refs.fill,
            Some(Fill::Solid {
                color: ResolvedColor::opaque("#111111")
            })
        );
    }

    #[test]
    fn test_ln_ref_recolors_outline() {
        let fx = Fixture::new();
        let style = XmlNode::parse(
            r#"<p:style xmlns:p="p" xmlns:a="a">
                 <a:lnRef idx="1"><a:schemeClr val="accent1"/></a:lnRef>
               </p:style>"#,
        )
        .unwrap();
        let refs = resolve_style(&style, &fx.ctx());
        let outline = refs.outline.unwrap();
        assert_eq!(
            outline.fill,
            Some(Fill::Solid {
                color: ResolvedColor::opaque("#4472C4")
            })
        );
    }

    #[test]
    fn test_zero_and_out_of_range_indexes() {
        let fx = Fixture::new();
        let style = XmlNode::parse(
            r#"<p:style xmlns:p="p" xmlns:a="a">
                 <a:fillRef idx="0"/>
                 <a:lnRef idx="99"/>
                 <a:effectRef idx="1"/>
               </p:style>"#,
        )
        .unwrap();
        let refs = resolve_style(&style, &fx.ctx());
        assert!(refs.fill.is_none());
        assert!(refs.outline.is_none());
        assert!(refs.effects.is_none());
    }

    #[test]
    fn test_font_ref() {
        let fx = Fixture::new();
        let style = XmlNode::parse(
            r#"<p:style xmlns:p="p" xmlns:a="a">
                 <a:fontRef idx="minor"><a:schemeClr val="accent1"/></a:fontRef>
               </p:style>"#,
        )
        .unwrap();
        let refs = resolve_style(&style, &fx.ctx());
        assert_eq!(refs.font_family.as_deref(), Some("Calibri"));
        assert_eq!(refs.font_color.map(|c| c.hex).as_deref(), Some("#4472C4"));
    }
}
