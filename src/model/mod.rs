//! Typed scene graph built from a PPTX package.
//!
//! The whole model is rebuilt from scratch on every conversion call and is
//! immutable once the inheritance resolver has run.

pub mod chart;
pub mod effect;
pub mod fill;
pub mod presentation;
pub mod shape;
pub mod table;
pub mod text;
pub mod theme;

pub use chart::{Chart, ChartElement, ChartSeries, ChartType, Legend};
pub use effect::{BlipEffects, Duotone, EffectList, Glow, Luminance, Shadow, SoftEdge};
pub use fill::{
    DashStyle, Fill, GradientFill, GradientKind, GradientStop, ImageFill, LineEnd, Outline,
    PatternFill, ResolvedColor,
};
pub use presentation::{ColorMap, Presentation, Slide, TextStyleLevel, TextStyleLevels};
pub use shape::{
    ChildTransform, Connector, CustomGeometryPath, Geometry, Group, Image, Placeholder, Shape,
    SlideElement, SrcRect, Transform,
};
pub use table::{CellBorders, Table, TableCell, TableColumn, TableElement, TableRow};
pub use text::{
    BodyProperties, Bullet, Paragraph, ParagraphProperties, RunProperties, Spacing, TabStop,
    TextBody, TextOutline, TextRun,
};
pub use theme::{FontScheme, FormatScheme, MasterTextStyles, Theme};
