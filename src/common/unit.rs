//! Unit conversion utilities.
//!
//! Shape geometry is stored in English Metric Units (EMU) inside the package and
//! surfaced to callers as pixels, points or centimeters. Pixel conversions take
//! the DPI explicitly so horizontal and vertical resolutions can differ.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_PT: i64 = 12_700;

/// Default screen resolution used for pixel conversions.
pub const DEFAULT_DPI: f64 = 96.0;

/// Convert pixels to EMU, truncating toward zero.
///
/// # Examples
///
/// ```
/// use longan::common::unit::px_to_emu;
/// assert_eq!(px_to_emu(96.0, 96.0), 914_400);
/// assert_eq!(px_to_emu(100.0, 96.0), 952_500);
/// ```
#[inline]
pub fn px_to_emu(px: f64, dpi: f64) -> i64 {
    (px * EMUS_PER_INCH as f64 / dpi) as i64
}

/// Convert EMU to fractional pixels.
#[inline]
pub fn emu_to_px(emu: i64, dpi: f64) -> f64 {
    emu as f64 * dpi / EMUS_PER_INCH as f64
}

#[inline]
pub fn px_to_emu_96(px: f64) -> i64 {
    px_to_emu(px, DEFAULT_DPI)
}

#[inline]
pub fn emu_to_px_96(emu: i64) -> f64 {
    emu_to_px(emu, DEFAULT_DPI)
}

#[inline]
pub fn pt_to_emu(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

#[inline]
pub fn emu_to_pt(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMUS_PER_CM as f64).round() as i64
}

#[inline]
pub fn emu_to_cm(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_CM as f64
}

/// Pixel/EMU converter bound to a pair of resolutions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Dpi {
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    #[inline]
    pub fn horizontal_px_to_emu(&self, px: f64) -> i64 {
        px_to_emu(px, self.horizontal)
    }

    #[inline]
    pub fn vertical_px_to_emu(&self, px: f64) -> i64 {
        px_to_emu(px, self.vertical)
    }

    #[inline]
    pub fn horizontal_emu_to_px(&self, emu: i64) -> f64 {
        emu_to_px(emu, self.horizontal)
    }

    #[inline]
    pub fn vertical_emu_to_px(&self, emu: i64) -> f64 {
        emu_to_px(emu, self.vertical)
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::new(DEFAULT_DPI, DEFAULT_DPI)
    }
}
