//! SVG rendering of resolved slides.
//!
//! Rendering is a single pass over the element tree. Anything that needs a
//! document-level definition (gradients, patterns, filters, clip paths)
//! registers it on the [`svg::Defs`] collector and references it by id.

pub mod chart;
pub mod context;
pub mod effect;
pub mod fill;
pub mod geometry;
pub mod image;
pub mod measure;
pub mod shape;
pub mod svg;
pub mod table;
pub mod text;
pub mod wrap;

pub use context::RenderContext;
pub use measure::{FontMeasurer, HeuristicMeasurer, TextMeasurer};
pub use svg::render_slide;
