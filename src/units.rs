//! Branded measurement units.
//!
//! OOXML mixes three numeric domains that are easy to confuse: EMU for
//! lengths (914400 per inch), 1/60000 of a degree for angles, and 1/100
//! point for font sizes. Lengths and point sizes get newtypes; the odd
//! fractional units are converted at parse boundaries and never stored.

use serde::{Deserialize, Serialize};

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;
/// EMU per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;
/// Output raster density for EMU-to-pixel conversion.
pub const DEFAULT_DPI: f64 = 96.0;
/// CSS pixel per typographic point at 96 DPI.
pub const PX_PER_PT: f64 = 96.0 / 72.0;

/// A length in English Metric Units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Emu(pub i64);

impl Emu {
    pub const ZERO: Emu = Emu(0);

    /// Convert to pixels at 96 DPI.
    pub fn to_pixels(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64 * DEFAULT_DPI
    }

    /// Convert from pixels at 96 DPI, rounding to the nearest EMU.
    pub fn from_pixels(px: f64) -> Emu {
        Emu((px / DEFAULT_DPI * EMU_PER_INCH as f64).round() as i64)
    }

    /// Convert to typographic points.
    pub fn to_points(self) -> f64 {
        self.0 as f64 / EMU_PER_POINT as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// A font size in typographic points.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pt(pub f64);

impl Pt {
    /// Build from OOXML's 1/100-point font size unit (`sz` attributes).
    pub fn from_hundredths(value: i64) -> Pt {
        Pt(value as f64 / 100.0)
    }

    /// Convert to pixels at 96 DPI.
    pub fn to_pixels(self) -> f64 {
        self.0 * PX_PER_PT
    }
}

/// Convert an OOXML 1/60000-degree angle to degrees.
pub fn angle_to_degrees(value: i64) -> f64 {
    value as f64 / 60_000.0
}

/// Convert an OOXML 1/60000-degree angle to radians.
pub fn angle_to_radians(value: f64) -> f64 {
    (value / 60_000.0).to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_inch_is_96_pixels() {
        assert_eq!(Emu(EMU_PER_INCH).to_pixels(), 96.0);
    }

    #[test]
    fn test_pixel_round_trip() {
        for emu in [0i64, 12_700, 914_400, 9_144_000, 5_143_500, 123_457] {
            let back = Emu::from_pixels(Emu(emu).to_pixels());
            assert!((back.0 - emu).abs() <= 5, "round trip drifted: {emu} -> {}", back.0);
        }
    }

    #[test]
    fn test_points() {
        assert_eq!(Emu(12_700).to_points(), 1.0);
        assert_eq!(Pt::from_hundredths(1800), Pt(18.0));
        assert_eq!(Pt(18.0).to_pixels(), 24.0);
    }

    #[test]
    fn test_angles() {
        assert_eq!(angle_to_degrees(60_000), 1.0);
        assert_eq!(angle_to_degrees(5_400_000), 90.0);
        assert!((angle_to_radians(10_800_000.0) - std::f64::consts::PI).abs() < 1e-12);
    }
}
