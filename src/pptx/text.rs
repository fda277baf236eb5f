//! Text body parsing: `txBody`, paragraphs, runs and their properties.

use crate::model::text::{
    BodyProperties, Bullet, Paragraph, ParagraphProperties, RunProperties, Spacing, TabStop,
    TextBody, TextOutline, TextRun,
};
use crate::pptx::color::resolve_color_in;
use crate::pptx::ParseContext;
use crate::units::{Emu, Pt};
use crate::xml::XmlNode;

/// Parse a `txBody` (or `p:txBody` inside a shape, `a:txBody` in a table
/// cell; the namespace prefix is already stripped).
pub fn parse_text_body(node: &XmlNode, ctx: &ParseContext) -> TextBody {
    let body_properties = node
        .child("bodyPr")
        .map(|bp| parse_body_properties(bp, ctx))
        .unwrap_or_default();

    let paragraphs = node
        .children("p")
        .map(|p| parse_paragraph(p, ctx))
        .collect();

    TextBody {
        body_properties,
        paragraphs,
    }
}

fn parse_body_properties(bp: &XmlNode, ctx: &ParseContext) -> BodyProperties {
    let mut props = BodyProperties::default();
    if let Some(anchor) = bp.attr("anchor") {
        props.anchor = anchor.to_string();
    }
    if let Some(v) = bp.attr_i64("lIns") {
        props.inset_left = Emu(v);
    }
    if let Some(v) = bp.attr_i64("rIns") {
        props.inset_right = Emu(v);
    }
    if let Some(v) = bp.attr_i64("tIns") {
        props.inset_top = Emu(v);
    }
    if let Some(v) = bp.attr_i64("bIns") {
        props.inset_bottom = Emu(v);
    }
    if let Some(wrap) = bp.attr("wrap") {
        props.wrap = wrap.to_string();
    }
    match bp.attr("vert") {
        Some("horz") | None => {}
        Some(v @ ("vert" | "vert270")) => props.vert = Some(v.to_string()),
        Some(other) => {
            props.vert = Some("vert".to_string());
            ctx.warn(
                "text-vertical",
                format!("vertical text mode '{other}' approximated as 'vert'"),
            );
        }
    }
    if let Some(cols) = bp.attr_i64("numCol") {
        if cols > 1 {
            props.columns = Some(cols as u32);
        }
    }
    if let Some(autofit) = bp.child("normAutofit") {
        props.auto_fit = Some("normAutofit".to_string());
        props.font_scale = autofit.attr_f64("fontScale").unwrap_or(100_000.0) / 100_000.0;
        props.line_spacing_reduction =
            autofit.attr_f64("lnSpcRed").unwrap_or(0.0) / 100_000.0;
    } else if bp.child("spAutoFit").is_some() {
        props.auto_fit = Some("spAutoFit".to_string());
    }
    props
}

pub fn parse_paragraph(p: &XmlNode, ctx: &ParseContext) -> Paragraph {
    let properties = p
        .child("pPr")
        .map(|ppr| parse_paragraph_properties(ppr, ctx))
        .unwrap_or_default();

    let mut runs = Vec::new();
    for child in p.elements() {
        match child.name.as_str() {
            "r" | "fld" => {
                let props = child
                    .child("rPr")
                    .map(|rpr| parse_run_properties(rpr, ctx))
                    .unwrap_or_default();
                let text = child.child_text("t").unwrap_or_default();
                runs.push(TextRun {
                    text,
                    properties: props,
                });
            }
            "br" => {
                let props = child
                    .child("rPr")
                    .map(|rpr| parse_run_properties(rpr, ctx))
                    .unwrap_or_default();
                runs.push(TextRun {
                    text: "\n".to_string(),
                    properties: props,
                });
            }
            _ => {}
        }
    }

    let end_properties = p
        .child("endParaRPr")
        .map(|rpr| parse_run_properties(rpr, ctx));

    Paragraph {
        properties,
        runs,
        end_properties,
    }
}

pub fn parse_paragraph_properties(ppr: &XmlNode, ctx: &ParseContext) -> ParagraphProperties {
    let mut props = ParagraphProperties::default();
    if let Some(algn) = ppr.attr("algn") {
        props.alignment = algn.to_string();
    }
    if let Some(lvl) = ppr.attr_i64("lvl") {
        props.level = (lvl.max(0) as usize).min(8);
    }
    if let Some(v) = ppr.attr_i64("marL") {
        props.margin_left = Emu(v);
    }
    if let Some(v) = ppr.attr_i64("indent") {
        props.indent = Emu(v);
    }
    props.line_spacing = ppr.child("lnSpc").and_then(parse_spacing);
    props.space_before = ppr.child("spcBef").and_then(parse_spacing);
    props.space_after = ppr.child("spcAft").and_then(parse_spacing);

    if ppr.child("buNone").is_some() {
        props.bullet = Some(Bullet::None);
    } else if let Some(bu) = ppr.child("buChar") {
        props.bullet = Some(Bullet::Char {
            character: bu.attr("char").unwrap_or("\u{2022}").to_string(),
        });
    } else if let Some(bu) = ppr.child("buAutoNum") {
        props.bullet = Some(Bullet::AutoNum {
            scheme: bu.attr("type").unwrap_or("arabicPeriod").to_string(),
            start_at: bu.attr_i64("startAt").unwrap_or(1),
        });
    }
    props.bullet_font = ppr
        .child("buFont")
        .and_then(|f| f.attr("typeface"))
        .map(str::to_string);
    props.bullet_color = ppr
        .child("buClr")
        .and_then(|c| resolve_color_in(c, &ctx.colors()));
    props.bullet_size_pct = ppr
        .child("buSzPct")
        .and_then(|s| s.attr_f64("val"))
        .map(|v| v / 100_000.0);

    if let Some(tabs) = ppr.child("tabLst") {
        props.tab_stops = tabs
            .children("tab")
            .map(|t| TabStop {
                position: Emu(t.attr_i64("pos").unwrap_or(0)),
                alignment: t.attr("algn").unwrap_or("l").to_string(),
            })
            .collect();
    }

    props
}

/// Spacing element (`lnSpc`, `spcBef`, `spcAft`): `spcPct` is a fraction of
/// the line height, `spcPts` is 1/100 point.
fn parse_spacing(node: &XmlNode) -> Option<Spacing> {
    if let Some(pct) = node.child("spcPct") {
        return Some(Spacing::Percent(
            pct.attr_f64("val").unwrap_or(100_000.0) / 100_000.0,
        ));
    }
    if let Some(pts) = node.child("spcPts") {
        return Some(Spacing::Points(pts.attr_f64("val").unwrap_or(0.0) / 100.0));
    }
    None
}

pub fn parse_run_properties(rpr: &XmlNode, ctx: &ParseContext) -> RunProperties {
    let fonts = &ctx.theme.font_scheme;
    let mut props = RunProperties::default();
    props.font_size = rpr.attr_i64("sz").map(|v| Pt::from_hundredths(v).0);
    props.bold = rpr.attr_bool("b");
    props.italic = rpr.attr_bool("i");
    props.underline = matches!(rpr.attr("u"), Some(u) if u != "none");
    props.strikethrough = matches!(rpr.attr("strike"), Some(s) if s != "noStrike");
    props.baseline = rpr.attr_i64("baseline").unwrap_or(0);

    props.font_family = rpr
        .child("latin")
        .and_then(|f| f.attr("typeface"))
        .map(|t| fonts.resolve(t));
    props.font_family_ea = rpr
        .child("ea")
        .and_then(|f| f.attr("typeface"))
        .filter(|t| !t.is_empty())
        .map(|t| fonts.resolve(t));
    props.font_family_cs = rpr
        .child("cs")
        .and_then(|f| f.attr("typeface"))
        .filter(|t| !t.is_empty())
        .map(|t| fonts.resolve(t));

    props.color = rpr
        .child("solidFill")
        .and_then(|f| resolve_color_in(f, &ctx.colors()));

    if let Some(link) = rpr.child("hlinkClick") {
        props.hyperlink = link
            .attr_exact("r:id")
            .or_else(|| link.attr("id"))
            .and_then(|id| ctx.rels.get(id))
            .filter(|rel| rel.external)
            .map(|rel| rel.target.clone());
    }

    if let Some(ln) = rpr.child("ln") {
        if ln.child("noFill").is_none() {
            if let Some(color) = ln
                .child("solidFill")
                .and_then(|f| resolve_color_in(f, &ctx.colors()))
            {
                props.outline = Some(TextOutline {
                    width: Emu(ln.attr_i64("w").unwrap_or(9_525)),
                    color,
                });
            }
        }
    }

    props
}
