//! Cropping transparent margins.

use image::{imageops, RgbaImage};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crops images to their non-transparent content.
pub struct Trimmer;

impl Trimmer {
    /// Smallest rectangle enclosing every pixel with alpha > 0.
    ///
    /// Returns `None` for a fully transparent (or empty) image.
    pub fn content_bounds(image: &RgbaImage) -> Option<Bounds> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;

        for (y, row) in image.rows().enumerate() {
            let y = y as u32;
            let mut row_hit = false;
            for (x, pixel) in row.enumerate() {
                if pixel.0[3] > 0 {
                    let x = x as u32;
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    row_hit = true;
                }
            }
            if row_hit {
                min_y = min_y.min(y);
                max_y = y;
                found = true;
            }
        }

        if !found {
            return None;
        }

        Some(Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Crop to the content bounds.
    ///
    /// Fully transparent images are returned untouched rather than cropped to
    /// nothing, and images whose content already fills the canvas are returned
    /// without copying.
    pub fn trim(image: RgbaImage) -> RgbaImage {
        let Some(bounds) = Self::content_bounds(&image) else {
            return image;
        };
        if bounds.width == image.width() && bounds.height == image.height() {
            return image;
        }
        imageops::crop_imm(&image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
    }
}
