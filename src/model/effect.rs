//! Shape effect and image (blip) effect types.

use crate::model::fill::ResolvedColor;
use crate::units::Emu;
use serde::{Deserialize, Serialize};

/// Shadow parameters shared by outer and inner shadows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: ResolvedColor,
    pub blur_radius: Emu,
    pub distance: Emu,
    /// Direction in degrees, clockwise from the positive x axis.
    pub direction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    pub color: ResolvedColor,
    pub radius: Emu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftEdge {
    pub radius: Emu,
}

/// Effect list attached to a shape. Absence of every sub-effect is
/// represented by the whole list being `None` upstream, so a present list
/// always emits a filter element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow: Option<Glow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_edge: Option<SoftEdge>,
}

impl EffectList {
    pub fn is_empty(&self) -> bool {
        self.outer_shadow.is_none()
            && self.inner_shadow.is_none()
            && self.glow.is_none()
            && self.soft_edge.is_none()
    }
}

/// Brightness/contrast adjustment on an image, both in -1..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Luminance {
    pub brightness: f64,
    pub contrast: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duotone {
    pub dark: ResolvedColor,
    pub light: ResolvedColor,
}

/// Raster effects applied to an embedded image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlipEffects {
    pub grayscale: bool,
    /// Threshold 0..1 for black/white conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bi_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur_radius: Option<Emu>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luminance: Option<Luminance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duotone: Option<Duotone>,
}

impl BlipEffects {
    pub fn is_empty(&self) -> bool {
        !self.grayscale
            && self.bi_level.is_none()
            && self.blur_radius.is_none()
            && self.luminance.is_none()
            && self.duotone.is_none()
    }
}
