//! SVG document assembly.

use crate::model::presentation::{Presentation, Slide};
use crate::render::context::RenderContext;
use crate::render::{fill, shape};
use std::fmt::Write;

/// Collected `<defs>` content for one document.
#[derive(Debug, Default)]
pub struct Defs {
    pub(crate) content: String,
}

impl Defs {
    pub fn add(&mut self, def: &str) {
        self.content.push_str(def);
        self.content.push('\n');
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Escape text content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Format a pixel coordinate with enough precision for sub-pixel layout.
pub fn px(value: f64) -> String {
    if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Render one resolved slide into a standalone SVG document.
pub fn render_slide(slide: &Slide, presentation: &Presentation, ctx: &RenderContext) -> String {
    let width = presentation.slide_width.to_pixels();
    let height = presentation.slide_height.to_pixels();

    let mut defs = Defs::default();
    let mut body = String::new();

    if let Some(background) = &slide.background {
        let attrs = fill::fill_attributes(background, &mut defs, ctx);
        if let Some(attrs) = attrs {
            let _ = writeln!(
                body,
                r#"<rect x="0" y="0" width="{}" height="{}" {attrs}/>"#,
                px(width),
                px(height)
            );
        }
    } else {
        // Decks without any background layer paint on white.
        let _ = writeln!(
            body,
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#FFFFFF"/>"##,
            px(width),
            px(height)
        );
    }

    for element in &slide.elements {
        body.push_str(&shape::render_element(element, &mut defs, ctx));
    }

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = px(width),
        h = px(height)
    );
    if !defs.is_empty() {
        let _ = writeln!(svg, "<defs>\n{}</defs>", defs.content);
    }
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}
