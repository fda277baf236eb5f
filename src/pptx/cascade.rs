//! Placeholder text inheritance.
//!
//! Run properties start as "what the slide says" with `None` for anything
//! unspecified. The cascade walks layout placeholder styles, master
//! placeholder styles, the master's `txStyles` bucket and finally the
//! presentation default, filling each still-empty field from the first
//! layer that defines it.

use crate::model::presentation::{TextStyleLevel, TextStyleLevels};
use crate::model::shape::{Placeholder, Shape, Transform};
use crate::model::text::RunProperties;
use crate::model::theme::MasterTextStyles;
use crate::pptx::master::PlaceholderStyle;

/// The layer chain a slide shape resolves against.
pub struct CascadeSources<'a> {
    pub layout: &'a [PlaceholderStyle],
    pub master: &'a [PlaceholderStyle],
    pub master_text: &'a MasterTextStyles,
    pub presentation_default: &'a TextStyleLevels,
}

/// Find the placeholder entry a shape inherits from: same index first, then
/// same type, with the title/body aliases (`ctrTitle` inherits `title`,
/// `subTitle` inherits `body`).
pub fn match_placeholder<'a>(
    styles: &'a [PlaceholderStyle],
    ph: &Placeholder,
) -> Option<&'a PlaceholderStyle> {
    if let Some(idx) = ph.index {
        if let Some(found) = styles.iter().find(|s| s.placeholder.index == Some(idx)) {
            return Some(found);
        }
    }
    if let Some(found) = styles.iter().find(|s| s.placeholder.ph_type == ph.ph_type) {
        return Some(found);
    }
    let alias = match ph.ph_type.as_str() {
        "ctrTitle" => "title",
        "subTitle" => "body",
        _ => return None,
    };
    styles.iter().find(|s| s.placeholder.ph_type == alias)
}

/// Inherit a missing transform from the layout, then the master. A zero
/// extent marks the transform as unset.
pub fn inherit_transform(shape: &mut Shape, sources: &CascadeSources) {
    if !transform_is_empty(&shape.transform) {
        return;
    }
    let ph = match &shape.placeholder {
        Some(ph) => ph.clone(),
        None => return,
    };
    for styles in [sources.layout, sources.master] {
        if let Some(found) = match_placeholder(styles, &ph) {
            if let Some(t) = &found.transform {
                if !transform_is_empty(t) {
                    shape.transform = t.clone();
                    return;
                }
            }
        }
    }
}

fn transform_is_empty(t: &Transform) -> bool {
    t.extent_width.is_zero() && t.extent_height.is_zero()
}

/// Run the full text cascade over a shape's paragraphs.
pub fn apply_text_cascade(shape: &mut Shape, sources: &CascadeSources) {
    let ph = shape.placeholder.clone();
    let body = match &mut shape.text_body {
        Some(body) => body,
        None => return,
    };

    let layout_style = ph
        .as_ref()
        .and_then(|ph| match_placeholder(sources.layout, ph))
        .map(|s| &s.list_style);
    let master_style = ph
        .as_ref()
        .and_then(|ph| match_placeholder(sources.master, ph))
        .map(|s| &s.list_style);
    let bucket = ph
        .as_ref()
        .map(|ph| sources.master_text.for_placeholder(&ph.ph_type))
        .unwrap_or(&sources.master_text.other);

    for paragraph in &mut body.paragraphs {
        let level = paragraph.properties.level;
        let chain: [Option<&TextStyleLevel>; 4] = [
            layout_style.and_then(|s| s.level(level)),
            master_style.and_then(|s| s.level(level)),
            bucket.level(level),
            sources.presentation_default.level(level),
        ];
        for run in &mut paragraph.runs {
            fill_from_chain(&mut run.properties, &chain);
        }
        if let Some(end) = &mut paragraph.end_properties {
            fill_from_chain(end, &chain);
        }
    }
}

fn fill_from_chain(props: &mut RunProperties, chain: &[Option<&TextStyleLevel>]) {
    for level in chain.iter().flatten() {
        if props.font_size.is_none() {
            props.font_size = level.font_size;
        }
        if props.font_family.is_none() {
            props.font_family = level.font_family.clone();
        }
        if props.font_family_ea.is_none() {
            props.font_family_ea = level.font_family_ea.clone();
        }
        if props.color.is_none() {
            props.color = level.color.clone();
        }
    }
}
