//! Physical page sizing for paginated exports.

const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page size in millimetres derived from raster pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub orientation: Orientation,
}

impl PageGeometry {
    /// Converts pixels to millimetres at `dpi`. Landscape only when strictly
    /// wider than tall.
    pub fn from_pixels(width_px: u32, height_px: u32, dpi: f64) -> Self {
        let width_mm = px_to_mm(width_px, dpi);
        let height_mm = px_to_mm(height_px, dpi);
        let orientation = if width_mm > height_mm {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        Self {
            width_mm,
            height_mm,
            orientation,
        }
    }
}

fn px_to_mm(pixels: u32, dpi: f64) -> f64 {
    f64::from(pixels) * MM_PER_INCH / dpi
}
