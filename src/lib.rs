//! PPTX to SVG conversion.
//!
//! Reads a PowerPoint (OOXML) package, resolves each slide through its
//! layout, master and theme, and renders standalone SVG documents, one per
//! slide. PNG rasterization is available behind the `png` feature.
//!
//! # Example
//!
//! ```no_run
//! use slidesvg::{convert_file, ConvertOptions};
//!
//! let slides = convert_file("deck.pptx", &ConvertOptions::default())?;
//! for slide in &slides {
//!     std::fs::write(format!("slide-{}.svg", slide.slide_number), &slide.svg)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod container;
pub mod convert;
pub mod error;
pub mod fonts;
pub mod model;
pub mod pptx;
pub mod render;
pub mod units;
pub mod warnings;
pub mod xml;

pub use convert::{convert_file, convert_to_svg, convert_to_svg_with_report, ConvertOptions, SlideSvg};
#[cfg(feature = "async")]
pub use convert::convert_file_async;
#[cfg(feature = "png")]
pub use convert::{convert_to_png, render_png, SlidePng};
pub use error::{Error, Result};
pub use fonts::{collect_used_fonts, UsedFonts};
pub use pptx::PptxPackage;
pub use warnings::{LogLevel, WarningSummary};
