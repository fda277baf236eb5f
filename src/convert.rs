//! High-level conversion entry points.

use crate::error::Result;
use crate::fonts;
use crate::pptx::PptxPackage;
use crate::render::{self, FontMeasurer, HeuristicMeasurer, RenderContext, TextMeasurer};
use crate::warnings::{LogLevel, WarningCollector, WarningSummary};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Conversion settings.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// 1-based slide numbers to convert; `None` converts every slide.
    pub slides: Option<Vec<usize>>,
    /// Warning verbosity.
    pub log_level: LogLevel,
    /// Directories scanned for font files. With at least one directory the
    /// converter measures text with real font metrics; without any it falls
    /// back to heuristic widths.
    pub font_dirs: Vec<PathBuf>,
    /// Extra font substitutions merged over the built-in mapping. Keys are
    /// matched case-insensitively.
    pub font_mapping: HashMap<String, String>,
    /// PNG pixel width. Wins over `height` when both are set; when neither
    /// is set the default is 960. Ignored for SVG output.
    pub width: Option<u32>,
    /// PNG pixel height.
    pub height: Option<u32>,
}

/// One converted slide.
#[derive(Debug, Clone)]
pub struct SlideSvg {
    /// 1-based position in the deck.
    pub slide_number: usize,
    pub svg: String,
    /// Pixel dimensions at 96 DPI.
    pub width: f64,
    pub height: f64,
}

fn build_measurer(options: &ConvertOptions) -> Box<dyn TextMeasurer> {
    if options.font_dirs.is_empty() {
        Box::new(HeuristicMeasurer)
    } else {
        Box::new(FontMeasurer::new(&options.font_dirs))
    }
}

fn build_font_mapping(options: &ConvertOptions) -> HashMap<String, String> {
    let mut mapping = fonts::default_font_mapping();
    for (key, value) in &options.font_mapping {
        mapping.insert(key.to_ascii_lowercase(), value.clone());
    }
    mapping
}

fn convert_package(
    package: &PptxPackage,
    options: &ConvertOptions,
    warnings: &WarningCollector,
) -> Result<Vec<SlideSvg>> {
    let measurer = build_measurer(options);
    let mapping = build_font_mapping(options);
    let presentation = package.presentation();
    let width = presentation.slide_width.to_pixels();
    let height = presentation.slide_height.to_pixels();

    let numbers: Vec<usize> = match &options.slides {
        Some(filter) => filter.clone(),
        None => (1..=package.slide_count()).collect(),
    };

    let mut out = Vec::with_capacity(numbers.len());
    for number in numbers {
        // Partial-success semantics: a bad or out-of-range slide is
        // reported and skipped, never fatal for the rest of the deck.
        let slide = match package.resolve_slide(number, warnings) {
            Ok(Some(slide)) => slide,
            Ok(None) => {
                warnings.warn(
                    "slide-range",
                    format!(
                        "slide {number} is out of range (deck has {} slides)",
                        package.slide_count()
                    ),
                    None,
                );
                continue;
            }
            Err(e) => {
                warnings.warn(
                    "slide-parse",
                    format!("slide {number} could not be parsed: {e}"),
                    None,
                );
                continue;
            }
        };
        let mut ctx = RenderContext::new(warnings, measurer.as_ref(), &mapping);
        ctx.set_location(format!("Slide {number}"));
        let svg = render::render_slide(&slide, presentation, &ctx);
        out.push(SlideSvg {
            slide_number: number,
            svg,
            width,
            height,
        });
    }
    Ok(out)
}

/// Convert an in-memory PPTX to SVG documents, one per slide.
pub fn convert_to_svg(data: Vec<u8>, options: &ConvertOptions) -> Result<Vec<SlideSvg>> {
    let (slides, _) = convert_to_svg_with_report(data, options)?;
    Ok(slides)
}

/// Like [`convert_to_svg`] but also returns the summary of everything
/// that was approximated or skipped.
pub fn convert_to_svg_with_report(
    data: Vec<u8>,
    options: &ConvertOptions,
) -> Result<(Vec<SlideSvg>, WarningSummary)> {
    let package = PptxPackage::from_bytes(data)?;
    let warnings = WarningCollector::new(options.log_level);
    let slides = convert_package(&package, options, &warnings)?;
    warnings.flush();
    Ok((slides, warnings.summary()))
}

/// Convert a PPTX file on disk.
pub fn convert_file(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Vec<SlideSvg>> {
    let data = std::fs::read(path)?;
    convert_to_svg(data, options)
}

/// Async variant of [`convert_file`]. The CPU-bound conversion runs on the
/// blocking pool.
#[cfg(feature = "async")]
pub async fn convert_file_async(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<Vec<SlideSvg>> {
    let data = tokio::fs::read(path.as_ref()).await?;
    let options = options.clone();
    tokio::task::spawn_blocking(move || convert_to_svg(data, &options))
        .await
        .map_err(|e| crate::error::Error::Render(format!("conversion task failed: {e}")))?
}

/// One rasterized slide.
#[cfg(feature = "png")]
#[derive(Debug, Clone)]
pub struct SlidePng {
    /// 1-based position in the deck.
    pub slide_number: usize,
    pub png: Vec<u8>,
    /// Pixel dimensions of the encoded image.
    pub width: u32,
    pub height: u32,
}

/// Rasterize one converted slide. `width`/`height` in the options scale the
/// output, width winning when both are set; the default is 960 wide.
#[cfg(feature = "png")]
pub fn render_png(slide: &SlideSvg, options: &ConvertOptions) -> Result<SlidePng> {
    use crate::error::Error;
    use resvg::usvg;

    let scale = match (options.width, options.height) {
        (Some(w), _) => f64::from(w) / slide.width,
        (None, Some(h)) => f64::from(h) / slide.height,
        (None, None) => 960.0 / slide.width,
    };
    let width = (slide.width * scale).round().max(1.0) as u32;
    let height = (slide.height * scale).round().max(1.0) as u32;

    let mut opt = usvg::Options::default();
    {
        let db = opt.fontdb_mut();
        db.load_system_fonts();
        for dir in &options.font_dirs {
            db.load_fonts_dir(dir);
        }
    }
    let tree = usvg::Tree::from_str(&slide.svg, &opt)
        .map_err(|e| Error::Render(format!("SVG parse failed: {e}")))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::Render("slide has zero pixel area".to_string()))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale as f32, scale as f32),
        &mut pixmap.as_mut(),
    );
    let png = pixmap
        .encode_png()
        .map_err(|e| Error::Render(format!("PNG encode failed: {e}")))?;
    Ok(SlidePng {
        slide_number: slide.slide_number,
        png,
        width,
        height,
    })
}

/// Convert an in-memory PPTX straight to PNG images, one per slide.
#[cfg(feature = "png")]
pub fn convert_to_png(data: Vec<u8>, options: &ConvertOptions) -> Result<Vec<SlidePng>> {
    let slides = convert_to_svg(data, options)?;
    slides.iter().map(|slide| render_png(slide, options)).collect()
}
