//! Raster image placement.

use crate::model::shape::{Image, SrcRect};
use crate::render::context::RenderContext;
use crate::render::svg::{escape, px, Defs};
use crate::render::{effect, fill};
use std::fmt::Write;

/// Vector metafile payloads cannot be rasterized here and degrade to a
/// labeled placeholder box.
fn is_metafile(mime: &str) -> bool {
    matches!(
        mime,
        "image/x-emf" | "image/emf" | "image/x-wmf" | "image/wmf"
    )
}

/// Render an image into its local `0..width` by `0..height` box. The
/// placement transform is applied by the caller.
pub fn render_image(
    image: &Image,
    width: f64,
    height: f64,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> String {
    if is_metafile(&image.mime_type) {
        ctx.warn(
            "image-metafile",
            format!("metafile image ({}) rendered as placeholder", image.mime_type),
        );
        let mut out = format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#D9D9D9\" stroke=\"#A6A6A6\"/>\n",
            px(width),
            px(height)
        );
        if let Some(alt) = &image.alt_text {
            let _ = write!(
                out,
                "<text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"10\" fill=\"#595959\" text-anchor=\"middle\">{}</text>\n",
                px(width / 2.0),
                px(height / 2.0),
                escape(alt)
            );
        }
        return out;
    }

    let mut filter = String::new();
    if let Some(effects) = &image.effects {
        filter = effect::effect_filter(effects, defs, ctx);
    }
    if let Some(blip) = &image.blip_effects {
        if let Some(attr) = effect::blip_filter(blip, defs, ctx) {
            if !filter.is_empty() {
                filter.push(' ');
            }
            filter.push_str(&attr);
        }
    }

    if image.tile_flip.is_some() {
        // Tile size needs the decoded bitmap dimensions; stretch instead.
        ctx.warn("image-tile", "tiled picture fill approximated as stretch");
    }
    let href = format!("data:{};base64,{}", image.mime_type, image.data);
    let body = match &image.src_rect {
        Some(rect) => cropped_image(&href, rect, width, height, defs, ctx),
        None => format!(
            "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{href}\"/>\n",
            px(width),
            px(height)
        ),
    };

    let mut out = if filter.is_empty() {
        body
    } else {
        format!("<g {filter}>\n{body}</g>\n")
    };
    if let Some(outline) = &image.outline {
        if let Some(stroke) = fill::stroke_attributes(outline, defs, ctx) {
            let _ = write!(
                out,
                "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"none\" {stroke}/>\n",
                px(width),
                px(height)
            );
        }
    }
    out
}

/// Crop by drawing the full image scaled up inside a clipping viewport so
/// the `src_rect` window fills the box.
fn cropped_image(
    href: &str,
    rect: &SrcRect,
    width: f64,
    height: f64,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> String {
    let visible_w = (1.0 - rect.left - rect.right).max(0.01);
    let visible_h = (1.0 - rect.top - rect.bottom).max(0.01);
    let full_w = width / visible_w;
    let full_h = height / visible_h;
    let offset_x = -full_w * rect.left;
    let offset_y = -full_h * rect.top;

    let clip_id = ctx.next_id("crop");
    defs.add(&format!(
        "<clipPath id=\"{clip_id}\"><rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"/></clipPath>",
        px(width),
        px(height)
    ));
    format!(
        "<g clip-path=\"url(#{clip_id})\"><image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{href}\"/></g>\n",
        px(offset_x),
        px(offset_y),
        px(full_w),
        px(full_h)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shape::Transform;
    use crate::render::measure::HeuristicMeasurer;
    use crate::warnings::WarningCollector;
    use std::collections::HashMap;

    fn image(mime: &str) -> Image {
        Image {
            transform: Transform::default(),
            data: "aGVsbG8=".to_string(),
            mime_type: mime.to_string(),
            src_rect: None,
            tile_flip: None,
            outline: None,
            effects: None,
            blip_effects: None,
            alt_text: None,
        }
    }

    fn with_ctx<R>(f: impl FnOnce(&RenderContext, &mut Defs) -> R) -> R {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        let mut defs = Defs::default();
        f(&ctx, &mut defs)
    }

    #[test]
    fn test_plain_image_stretches() {
        with_ctx(|ctx, defs| {
            let svg = render_image(&image("image/png"), 200.0, 100.0, defs, ctx);
            assert!(svg.contains("href=\"data:image/png;base64,aGVsbG8=\""));
            assert!(svg.contains("preserveAspectRatio=\"none\""));
            assert!(svg.contains("width=\"200\" "));
        });
    }

    #[test]
    fn test_crop_scales_past_viewport() {
        with_ctx(|ctx, defs| {
            let mut img = image("image/jpeg");
            // Crop away the right half: the visible part doubles in scale.
            img.src_rect = Some(SrcRect {
                left: 0.0,
                top: 0.0,
                right: 0.5,
                bottom: 0.0,
            });
            let svg = render_image(&img, 100.0, 100.0, defs, ctx);
            assert!(svg.contains("clip-path=\"url(#crop-"));
            assert!(svg.contains("width=\"200\""));
            assert!(defs.content.contains("<clipPath"));
        });
    }

    #[test]
    fn test_metafile_placeholder() {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        let mut defs = Defs::default();
        let mut img = image("image/x-emf");
        img.alt_text = Some("Diagram".to_string());
        let svg = render_image(&img, 100.0, 100.0, &mut defs, &ctx);
        assert!(svg.contains("#D9D9D9"));
        assert!(svg.contains(">Diagram</text>"));
        assert!(!svg.contains("<image"));
        assert_eq!(warnings.summary().entries[0].feature, "image-metafile");
    }
}
