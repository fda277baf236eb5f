//! `presentation.xml` parsing: slide size, slide order, default text style.

use crate::container::{PptxContainer, Relationships};
use crate::error::Result;
use crate::model::presentation::Presentation;
use crate::pptx::{master, ParseContext};
use crate::units::Emu;
use crate::xml::XmlNode;

/// The presentation part plus the slide part paths in presentation order.
#[derive(Debug, Clone)]
pub struct PresentationPart {
    pub presentation: Presentation,
    pub slide_paths: Vec<String>,
}

pub fn parse_presentation(
    xml: &str,
    part_path: &str,
    rels: &Relationships,
    ctx: &ParseContext,
) -> Result<PresentationPart> {
    let root = XmlNode::parse(xml)?;
    let mut presentation = Presentation::default();

    if let Some(sld_sz) = root.child("sldSz") {
        if let Some(cx) = sld_sz.attr_i64("cx") {
            presentation.slide_width = Emu(cx);
        }
        if let Some(cy) = sld_sz.attr_i64("cy") {
            presentation.slide_height = Emu(cy);
        }
    }

    if let Some(default_style) = root.child("defaultTextStyle") {
        presentation.default_text_style = master::parse_list_style(default_style, ctx);
    }

    // Slide order comes from sldIdLst; each entry's r:id points at the part.
    let mut slide_paths = Vec::new();
    if let Some(id_lst) = root.child("sldIdLst") {
        for sld_id in id_lst.children("sldId") {
            let rel_id = match sld_id.attr_exact("r:id") {
                Some(id) => id,
                None => continue,
            };
            if let Some(rel) = rels.get(rel_id) {
                slide_paths.push(PptxContainer::resolve_path(part_path, &rel.target));
            }
        }
    }

    Ok(PresentationPart {
        presentation,
        slide_paths,
    })
}
