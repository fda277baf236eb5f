//! Text body layout and rendering.
//!
//! Paragraphs are wrapped, stacked vertically, anchored inside the body
//! box and emitted as one `<text>` element per line with `<tspan>`
//! fragments. Autofit shrinks the font scale until the stack fits.

use crate::model::text::{Bullet, Paragraph, RunProperties, Spacing, TextBody};
use crate::render::context::RenderContext;
use crate::render::svg::{escape, px};
use crate::render::wrap::{self, Line};
use crate::units::PX_PER_PT;
use std::fmt::Write;

/// Ascent fraction of the em box used to place the baseline in a line.
const BASELINE_RATIO: f64 = 0.8;
const DEFAULT_FONT_SIZE: f64 = 18.0;

struct LaidOutParagraph<'a> {
    paragraph: &'a Paragraph,
    lines: Vec<Line>,
    line_height: f64,
    space_before: f64,
    space_after: f64,
}

/// Render a text body into `<text>` elements positioned in the shape's
/// local space, `0..width` by `0..height`.
pub fn render_text_body(
    body: &TextBody,
    width: f64,
    height: f64,
    ctx: &RenderContext,
) -> String {
    let bp = &body.body_properties;
    // Vertical text lays out in a box with the axes swapped and is
    // rotated into place afterwards.
    let vertical = matches!(bp.vert.as_deref(), Some("vert") | Some("vert270"));
    let (box_w, box_h) = if vertical { (height, width) } else { (width, height) };

    let content_w = (box_w - bp.inset_left.to_pixels() - bp.inset_right.to_pixels()).max(1.0);
    let content_h = (box_h - bp.inset_top.to_pixels() - bp.inset_bottom.to_pixels()).max(1.0);
    let wrap_width = if bp.wrap == "none" { f64::INFINITY } else { content_w };

    let shrink = bp.auto_fit.as_deref() == Some("normAutofit") || bp.wrap == "none";
    let mut scale = bp.font_scale;
    let mut laid_out = layout(body, wrap_width, content_w, scale, ctx);
    if shrink {
        for _ in 0..5 {
            let total = stack_height(&laid_out);
            let widest = laid_out
                .iter()
                .flat_map(|p| p.lines.iter())
                .map(|l| l.width)
                .fold(0.0_f64, f64::max);
            let h_ratio = if total > content_h { content_h / total } else { 1.0 };
            let w_ratio = if bp.wrap == "none" && widest > content_w {
                content_w / widest
            } else {
                1.0
            };
            let ratio = h_ratio.min(w_ratio);
            if ratio >= 0.999 {
                break;
            }
            scale = (scale * ratio).max(0.1);
            laid_out = layout(body, wrap_width, content_w, scale, ctx);
            if scale <= 0.1 {
                break;
            }
        }
    }

    let total = stack_height(&laid_out);
    let top = bp.inset_top.to_pixels();
    let start_y = match bp.anchor.as_str() {
        "ctr" => top + (content_h - total) / 2.0,
        "b" => top + content_h - total,
        _ => top,
    }
    .max(top);

    let mut out = String::new();
    let mut y = start_y;
    let mut counters = [0i64; 9];
    for lp in &laid_out {
        y += lp.space_before;
        let level = lp.paragraph.properties.level.min(8);
        for deeper in counters.iter_mut().skip(level + 1) {
            *deeper = 0;
        }
        let bullet_label = bullet_text(lp.paragraph, &mut counters[level]);

        let left = bp.inset_left.to_pixels() + lp.paragraph.properties.margin_left.to_pixels();
        let avail = (content_w - lp.paragraph.properties.margin_left.to_pixels()).max(1.0);
        for (i, line) in lp.lines.iter().enumerate() {
            let baseline = y + lp.line_height * BASELINE_RATIO;
            if i == 0 {
                if let Some(label) = &bullet_label {
                    out.push_str(&bullet_element(lp.paragraph, label, left, baseline, scale, ctx));
                }
            }
            let x = match lp.paragraph.properties.alignment.as_str() {
                "ctr" => left + (avail - line.width) / 2.0,
                "r" => left + avail - line.width,
                _ => left,
            };
            if !line.fragments.is_empty() {
                out.push_str(&line_element(line, x, baseline, scale, ctx));
            }
            y += lp.line_height;
        }
        y += lp.space_after;
    }

    if out.is_empty() {
        return out;
    }
    match bp.vert.as_deref() {
        Some("vert") => format!(
            "<g transform=\"translate({} 0) rotate(90)\">\n{out}</g>\n",
            px(width)
        ),
        Some("vert270") => format!(
            "<g transform=\"translate(0 {}) rotate(-90)\">\n{out}</g>\n",
            px(height)
        ),
        _ => out,
    }
}

fn layout<'a>(
    body: &'a TextBody,
    wrap_width: f64,
    content_w: f64,
    scale: f64,
    ctx: &RenderContext,
) -> Vec<LaidOutParagraph<'a>> {
    body.paragraphs
        .iter()
        .map(|paragraph| {
            let indent_w = paragraph.properties.margin_left.to_pixels();
            let effective = if wrap_width.is_finite() {
                (wrap_width - indent_w).max(1.0).min(content_w)
            } else {
                wrap_width
            };
            let lines = wrap::wrap_paragraph(paragraph, effective, scale, ctx);
            let tallest = lines.iter().map(|l| l.font_size).fold(0.0_f64, f64::max);
            let family = dominant_family(paragraph, ctx);
            let base_ratio = ctx.measurer.line_height_ratio(&family);
            let line_height = match paragraph.properties.line_spacing {
                Some(Spacing::Points(pt)) => pt * PX_PER_PT,
                Some(Spacing::Percent(pct)) => tallest * base_ratio * pct,
                None => tallest * base_ratio,
            };
            let reduction = 1.0 - body.body_properties.line_spacing_reduction;
            let line_height = line_height * reduction.clamp(0.2, 1.0);
            LaidOutParagraph {
                paragraph,
                lines,
                line_height,
                space_before: spacing_px(paragraph.properties.space_before, line_height),
                space_after: spacing_px(paragraph.properties.space_after, line_height),
            }
        })
        .collect()
}

fn stack_height(paragraphs: &[LaidOutParagraph]) -> f64 {
    paragraphs
        .iter()
        .map(|p| p.space_before + p.line_height * p.lines.len() as f64 + p.space_after)
        .sum()
}

fn spacing_px(spacing: Option<Spacing>, line_height: f64) -> f64 {
    match spacing {
        Some(Spacing::Points(pt)) => pt * PX_PER_PT,
        Some(Spacing::Percent(pct)) => line_height * pct,
        None => 0.0,
    }
}

fn dominant_family(paragraph: &Paragraph, ctx: &RenderContext) -> String {
    let family = paragraph
        .runs
        .first()
        .and_then(|r| r.properties.font_family.as_deref())
        .unwrap_or("sans-serif");
    ctx.map_font(family)
}

fn line_element(line: &Line, x: f64, baseline: f64, scale: f64, ctx: &RenderContext) -> String {
    let mut out = format!("<text x=\"{}\" y=\"{}\">", px(x), px(baseline));
    for fragment in &line.fragments {
        let tspan = fragment_tspan(&fragment.text, &fragment.properties, scale, ctx);
        match &fragment.properties.hyperlink {
            Some(href) => {
                let _ = write!(out, "<a href=\"{}\">{tspan}</a>", escape(href));
            }
            None => out.push_str(&tspan),
        }
    }
    out.push_str("</text>\n");
    out
}

fn fragment_tspan(text: &str, props: &RunProperties, scale: f64, ctx: &RenderContext) -> String {
    let size = props.font_size.unwrap_or(DEFAULT_FONT_SIZE) * scale * PX_PER_PT;
    let family = ctx.map_font(props.font_family.as_deref().unwrap_or("sans-serif"));
    let mut attrs = format!(
        "font-family=\"{}\" font-size=\"{}\"",
        escape(&family),
        px(size)
    );
    if let Some(color) = &props.color {
        let _ = write!(attrs, " fill=\"{}\"", color.hex);
        if color.alpha < 1.0 {
            let _ = write!(attrs, " fill-opacity=\"{:.3}\"", color.alpha);
        }
    }
    if props.bold {
        attrs.push_str(" font-weight=\"bold\"");
    }
    if props.italic {
        attrs.push_str(" font-style=\"italic\"");
    }
    match (props.underline, props.strikethrough) {
        (true, true) => attrs.push_str(" text-decoration=\"underline line-through\""),
        (true, false) => attrs.push_str(" text-decoration=\"underline\""),
        (false, true) => attrs.push_str(" text-decoration=\"line-through\""),
        (false, false) => {}
    }
    if props.baseline != 0 {
        // OOXML baseline is in 1/1000 percent of the line height.
        let _ = write!(attrs, " baseline-shift=\"{}%\"", props.baseline / 1_000);
    }
    if let Some(outline) = &props.outline {
        let _ = write!(
            attrs,
            " stroke=\"{}\" stroke-width=\"{}\"",
            outline.color.hex,
            px(outline.width.to_pixels().max(0.25))
        );
    }
    format!("<tspan {attrs}>{}</tspan>", escape(text))
}

/// The visible bullet label for a paragraph, advancing the auto-number
/// counter as a side effect. `None` when the paragraph has no bullet or
/// no text.
fn bullet_text(paragraph: &Paragraph, counter: &mut i64) -> Option<String> {
    if !paragraph.has_text() {
        return None;
    }
    match paragraph.properties.bullet.as_ref()? {
        Bullet::None => None,
        Bullet::Char { character } => Some(character.clone()),
        Bullet::AutoNum { scheme, start_at } => {
            if *counter == 0 {
                *counter = *start_at;
            } else {
                *counter += 1;
            }
            Some(format_auto_number(scheme, *counter))
        }
    }
}

fn bullet_element(
    paragraph: &Paragraph,
    label: &str,
    text_left: f64,
    baseline: f64,
    scale: f64,
    ctx: &RenderContext,
) -> String {
    let props = &paragraph.properties;
    let run_size = paragraph
        .runs
        .first()
        .and_then(|r| r.properties.font_size)
        .unwrap_or(DEFAULT_FONT_SIZE)
        * scale;
    let size = run_size * props.bullet_size_pct.unwrap_or(1.0) * PX_PER_PT;
    // A hanging indent puts the bullet left of the text column.
    let indent = props.indent.to_pixels();
    let x = if indent < 0.0 { text_left + indent } else { (text_left - size).max(0.0) };
    let family = props
        .bullet_font
        .clone()
        .or_else(|| {
            paragraph
                .runs
                .first()
                .and_then(|r| r.properties.font_family.clone())
        })
        .unwrap_or_else(|| "sans-serif".to_string());
    let color = props
        .bullet_color
        .as_ref()
        .or_else(|| {
            paragraph
                .runs
                .first()
                .and_then(|r| r.properties.color.as_ref())
        })
        .map(|c| c.hex.clone())
        .unwrap_or_else(|| "#000000".to_string());
    format!(
        "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{color}\">{}</text>\n",
        px(x),
        px(baseline),
        escape(&ctx.map_font(&family)),
        px(size),
        escape(label)
    )
}

fn to_roman(mut n: i64) -> String {
    const TABLE: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n <= 0 {
        return "I".to_string();
    }
    let mut out = String::new();
    for (value, sym) in TABLE {
        while n >= value {
            out.push_str(sym);
            n -= value;
        }
    }
    out
}

fn to_alpha(n: i64) -> String {
    let mut n = n.max(1);
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Format an auto-number bullet per its OOXML scheme name. The scheme
/// encodes the numeral system plus the decoration (period, parens).
fn format_auto_number(scheme: &str, n: i64) -> String {
    let numeral = if scheme.starts_with("romanUc") {
        to_roman(n)
    } else if scheme.starts_with("romanLc") {
        to_roman(n).to_ascii_lowercase()
    } else if scheme.starts_with("alphaUc") {
        to_alpha(n)
    } else if scheme.starts_with("alphaLc") {
        to_alpha(n).to_ascii_lowercase()
    } else {
        n.to_string()
    };
    if scheme.ends_with("ParenBoth") {
        format!("({numeral})")
    } else if scheme.ends_with("ParenR") {
        format!("{numeral})")
    } else if scheme.ends_with("Period") {
        format!("{numeral}.")
    } else {
        numeral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::text::{BodyProperties, ParagraphProperties, TextRun};
    use crate::render::measure::HeuristicMeasurer;
    use crate::warnings::WarningCollector;
    use std::collections::HashMap;

    fn with_ctx<R>(f: impl FnOnce(&RenderContext) -> R) -> R {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        f(&ctx)
    }

    fn simple_body(text: &str) -> TextBody {
        TextBody {
            body_properties: BodyProperties::default(),
            paragraphs: vec![Paragraph {
                properties: ParagraphProperties::default(),
                runs: vec![TextRun {
                    text: text.to_string(),
                    properties: RunProperties {
                        font_size: Some(12.0),
                        ..Default::default()
                    },
                }],
                end_properties: None,
            }],
        }
    }

    #[test]
    fn test_single_line_top_anchor() {
        with_ctx(|ctx| {
            let svg = render_text_body(&simple_body("hello"), 400.0, 100.0, ctx);
            assert!(svg.contains("<text "));
            assert!(svg.contains(">hello</tspan>"));
            assert!(svg.contains("font-size=\"16\""));
        });
    }

    #[test]
    fn test_bottom_anchor_is_lower_than_top() {
        with_ctx(|ctx| {
            let mut body = simple_body("hi");
            let top = render_text_body(&body, 400.0, 200.0, ctx);
            body.body_properties.anchor = "b".to_string();
            let bottom = render_text_body(&body, 400.0, 200.0, ctx);
            let y_of = |svg: &str| -> f64 {
                let start = svg.find("y=\"").unwrap() + 3;
                let end = svg[start..].find('"').unwrap() + start;
                svg[start..end].parse().unwrap()
            };
            assert!(y_of(&bottom) > y_of(&top));
        });
    }

    #[test]
    fn test_char_bullet_emitted_once() {
        with_ctx(|ctx| {
            let mut body = simple_body("item one that wraps over multiple lines for sure");
            body.paragraphs[0].properties.bullet = Some(Bullet::Char {
                character: "•".to_string(),
            });
            body.paragraphs[0].properties.margin_left = crate::units::Emu(342_900);
            body.paragraphs[0].properties.indent = crate::units::Emu(-342_900);
            let svg = render_text_body(&body, 150.0, 300.0, ctx);
            assert_eq!(svg.matches("•").count(), 1);
        });
    }

    #[test]
    fn test_auto_number_sequence() {
        with_ctx(|ctx| {
            let mut body = simple_body("first");
            let second = Paragraph {
                properties: ParagraphProperties {
                    bullet: Some(Bullet::AutoNum {
                        scheme: "arabicPeriod".to_string(),
                        start_at: 1,
                    }),
                    ..Default::default()
                },
                runs: vec![TextRun {
                    text: "second".to_string(),
                    properties: RunProperties::default(),
                }],
                end_properties: None,
            };
            body.paragraphs[0].properties.bullet = Some(Bullet::AutoNum {
                scheme: "arabicPeriod".to_string(),
                start_at: 1,
            });
            body.paragraphs.push(second);
            let svg = render_text_body(&body, 400.0, 300.0, ctx);
            assert!(svg.contains(">1.</text>"));
            assert!(svg.contains(">2.</text>"));
        });
    }

    #[test]
    fn test_autofit_shrinks_to_box() {
        with_ctx(|ctx| {
            let mut body = simple_body(
                "a very long paragraph that cannot possibly fit inside a tiny box \
                 without the automatic fit logic shrinking the font size down",
            );
            body.body_properties.auto_fit = Some("normAutofit".to_string());
            let svg = render_text_body(&body, 120.0, 40.0, ctx);
            // The 12pt default renders at 16px; shrink must have kicked in.
            assert!(!svg.contains("font-size=\"16\""));
        });
    }

    #[test]
    fn test_vertical_text_is_rotated() {
        with_ctx(|ctx| {
            let mut body = simple_body("vertical");
            body.body_properties.vert = Some("vert".to_string());
            let svg = render_text_body(&body, 60.0, 300.0, ctx);
            assert!(svg.contains("rotate(90)"));
        });
    }

    #[test]
    fn test_hyperlink_wraps_tspan() {
        with_ctx(|ctx| {
            let mut body = simple_body("click");
            body.paragraphs[0].runs[0].properties.hyperlink =
                Some("https://example.com".to_string());
            let svg = render_text_body(&body, 400.0, 100.0, ctx);
            assert!(svg.contains("<a href=\"https://example.com\">"));
        });
    }

    #[test]
    fn test_roman_and_alpha_formatting() {
        assert_eq!(format_auto_number("romanUcPeriod", 4), "IV.");
        assert_eq!(format_auto_number("romanLcParenR", 2), "ii)");
        assert_eq!(format_auto_number("alphaUcPeriod", 27), "AA.");
        assert_eq!(format_auto_number("alphaLcParenBoth", 3), "(c)");
        assert_eq!(format_auto_number("arabicPlain", 7), "7");
    }

    #[test]
    fn test_superscript_baseline_shift() {
        with_ctx(|ctx| {
            let mut body = simple_body("x2");
            body.paragraphs[0].runs[0].properties.baseline = 30_000;
            let svg = render_text_body(&body, 400.0, 100.0, ctx);
            assert!(svg.contains("baseline-shift=\"30%\""));
        });
    }
}
