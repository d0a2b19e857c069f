//! Compositing steps: square padding, fixed-canvas letterboxing and logo
//! overlay.

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::config::{Canvas, LogoSettings};

use super::encode::flatten;
use super::trim::Bounds;

/// Placement of an overlaid logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

/// Geometric transforms applied after trimming.
pub struct Compositor;

impl Compositor {
    /// Center the image on a transparent square canvas.
    ///
    /// The side is `round(max(w, h) * (1 + 2 * ratio))`. Pixels are copied,
    /// not blended, so the source alpha survives unchanged.
    pub fn square_pad(image: &RgbaImage, ratio: f32) -> RgbaImage {
        let (width, height) = image.dimensions();
        let side = width.max(height);
        let padded = (side as f64 * (1.0 + 2.0 * ratio as f64)).round() as u32;
        let padded = padded.max(side);

        let mut canvas = RgbaImage::new(padded, padded);
        let x = (padded - width) / 2;
        let y = (padded - height) / 2;
        imageops::replace(&mut canvas, image, x as i64, y as i64);
        canvas
    }

    /// Dimensions after fitting `width x height` inside `canvas`.
    ///
    /// Only ever scales down; the result is never smaller than 1 px.
    pub fn fit_within(width: u32, height: u32, canvas: Canvas) -> (u32, u32) {
        if width <= canvas.width && height <= canvas.height {
            return (width, height);
        }
        let scale = f64::min(
            canvas.width as f64 / width as f64,
            canvas.height as f64 / height as f64,
        );
        let fit_w = ((width as f64 * scale).round() as u32).clamp(1, canvas.width);
        let fit_h = ((height as f64 * scale).round() as u32).clamp(1, canvas.height);
        (fit_w, fit_h)
    }

    /// Scale down to fit `canvas` and center on an opaque background.
    ///
    /// The source is blended onto `background` before it is pasted, so every
    /// output pixel has alpha 255.
    pub fn letterbox(image: &RgbaImage, canvas: Canvas, background: [u8; 3]) -> RgbaImage {
        let (width, height) = image.dimensions();
        let (fit_w, fit_h) = Self::fit_within(width, height, canvas);

        let [r, g, b] = background;
        let mut out = RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([r, g, b, 255]));
        let x = ((canvas.width - fit_w) / 2) as i64;
        let y = ((canvas.height - fit_h) / 2) as i64;

        let flat = if (fit_w, fit_h) == (width, height) {
            flatten(image, background)
        } else {
            let scaled = resample(image, Region::whole(image), fit_w, fit_h);
            flatten(&scaled, background)
        };
        imageops::replace(&mut out, &DynamicImage::ImageRgb8(flat).into_rgba8(), x, y);
        out
    }

    /// Logo size for a target of width `target_width`.
    ///
    /// The width is `target_width * ratio`, the height follows the logo's own
    /// aspect ratio; both truncate.
    pub fn scaled_logo_size(target_width: u32, logo: (u32, u32), ratio: f32) -> (u32, u32) {
        let (logo_w, logo_h) = logo;
        if logo_w == 0 || logo_h == 0 {
            return (0, 0);
        }
        let width = (target_width as f64 * ratio as f64) as u32;
        let height = (width as f64 * logo_h as f64 / logo_w as f64) as u32;
        (width, height)
    }

    /// Top-left corner of a `logo` sized overlay on a `target` sized image.
    ///
    /// May be negative when the logo plus padding does not fit; the overlay
    /// clips in that case.
    pub fn logo_position(
        target: (u32, u32),
        logo: (u32, u32),
        anchor: Anchor,
        padding: u32,
    ) -> (i64, i64) {
        let (tw, th) = (target.0 as i64, target.1 as i64);
        let (lw, lh) = (logo.0 as i64, logo.1 as i64);
        let p = padding as i64;
        match anchor {
            Anchor::TopLeft => (p, p),
            Anchor::TopRight => (tw - lw - p, p),
            Anchor::BottomLeft => (p, th - lh - p),
            Anchor::BottomRight => (tw - lw - p, th - lh - p),
            Anchor::Center => ((tw - lw) / 2, (th - lh) / 2),
        }
    }

    /// Part of a `size` overlay placed at `origin` that lands on a `target`
    /// sized image, in overlay coordinates. `None` when nothing is visible.
    pub fn visible_part(target: (u32, u32), origin: (i64, i64), size: (u32, u32)) -> Option<Bounds> {
        let x0 = (-origin.0).max(0);
        let y0 = (-origin.1).max(0);
        let x1 = (target.0 as i64 - origin.0).min(size.0 as i64);
        let y1 = (target.1 as i64 - origin.1).min(size.1 as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Bounds {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    /// Alpha-composite a scaled logo onto `target`.
    ///
    /// Transparent regions of the logo leave the target visible. A logo that
    /// scales to zero pixels is skipped. Only the part of the scaled logo that
    /// lands on the target is resampled.
    pub fn overlay_logo(target: &mut RgbaImage, logo: &RgbaImage, settings: &LogoSettings) {
        let (width, height) =
            Self::scaled_logo_size(target.width(), logo.dimensions(), settings.size_ratio);
        if width == 0 || height == 0 {
            tracing::debug!(
                "Logo scales to {}x{} on a {}px wide image, skipping overlay",
                width,
                height,
                target.width()
            );
            return;
        }

        let (x, y) = Self::logo_position(
            target.dimensions(),
            (width, height),
            settings.anchor,
            settings.padding_px,
        );

        if (width, height) == logo.dimensions() {
            imageops::overlay(target, logo, x, y);
            return;
        }

        let Some(visible) = Self::visible_part(target.dimensions(), (x, y), (width, height)) else {
            tracing::debug!("Logo at ({}, {}) misses the image, skipping overlay", x, y);
            return;
        };
        let scale_x = logo.width() as f64 / width as f64;
        let scale_y = logo.height() as f64 / height as f64;
        let region = Region {
            left: visible.x as f64 * scale_x,
            top: visible.y as f64 * scale_y,
            width: visible.width as f64 * scale_x,
            height: visible.height as f64 * scale_y,
        };
        let scaled = resample(logo, region, visible.width, visible.height);
        imageops::overlay(target, &scaled, x + visible.x as i64, y + visible.y as i64);
    }
}

/// Source rectangle to resample, in fractional source pixels.
#[derive(Debug, Clone, Copy)]
struct Region {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Region {
    fn whole(image: &RgbaImage) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: image.width() as f64,
            height: image.height() as f64,
        }
    }
}

/// Lanczos3 resample of `region` to `width x height`.
///
/// Falls back to `imageops::resize` on the cropped region if the fast path
/// rejects its buffers.
fn resample(image: &RgbaImage, region: Region, width: u32, height: u32) -> RgbaImage {
    match resample_premultiplied(image, region, width, height) {
        Ok(resized) => resized,
        Err(err) => {
            tracing::warn!("fast_image_resize failed, falling back to imageops: {}", err);
            let cropped = imageops::crop_imm(
                image,
                region.left.floor() as u32,
                region.top.floor() as u32,
                region.width.ceil().max(1.0) as u32,
                region.height.ceil().max(1.0) as u32,
            )
            .to_image();
            imageops::resize(&cropped, width, height, FilterType::Lanczos3)
        }
    }
}

/// Resample with alpha multiplied in, so the colour of fully transparent
/// pixels never bleeds into edges.
fn resample_premultiplied(
    image: &RgbaImage,
    region: Region,
    width: u32,
    height: u32,
) -> Result<RgbaImage, String> {
    let (src_w, src_h) = (image.width() as f64, image.height() as f64);
    let left = region.left.clamp(0.0, src_w);
    let top = region.top.clamp(0.0, src_h);
    let crop_w = region.width.min(src_w - left);
    let crop_h = region.height.min(src_h - top);

    let src = fr::images::Image::from_vec_u8(
        image.width(),
        image.height(),
        image.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| format!("source buffer: {e}"))?;
    let mut dst = fr::images::Image::new(width, height, fr::PixelType::U8x4);

    // mul_div_alpha is on by default
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3))
        .crop(left, top, crop_w, crop_h);
    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src, &mut dst, Some(&options))
        .map_err(|e| format!("resize: {e}"))?;

    RgbaImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| "resized buffer has the wrong length".to_string())
}
