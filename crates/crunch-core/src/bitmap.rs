use crate::error::{CrunchError, Result};
use crate::hash;
use image::{imageops, RgbaImage};
use std::path::Path;
use tracing::warn;

/// One input image after load-time processing (premultiply, trim).
///
/// `pixels` holds the trimmed RGBA8 buffer; the `frame_*` fields record where
/// that buffer sits inside the original, untrimmed image. When trimming is
/// disabled (or was a no-op) the frame equals the raw image with
/// `frame_x == frame_y == 0`.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub name: String,
    pub frame_x: i32,
    pub frame_y: i32,
    pub frame_w: u32,
    pub frame_h: u32,
    /// Content fingerprint over width, height and the pixel bytes.
    pub hash_value: u64,
    pub pixels: RgbaImage,
}

impl Bitmap {
    /// Decodes `path` and runs the load pipeline.
    pub fn load(path: &Path, name: impl Into<String>, premultiply: bool, trim: bool) -> Result<Self> {
        let img = image::open(path).map_err(|source| CrunchError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgba(name, img.to_rgba8(), premultiply, trim))
    }

    /// Builds a bitmap from an in-memory RGBA buffer.
    pub fn from_rgba(name: impl Into<String>, mut rgba: RgbaImage, premultiply: bool, trim: bool) -> Self {
        let name = name.into();

        if premultiply {
            for px in rgba.pixels_mut() {
                let m = px[3] as f32 / 255.0;
                px[0] = (px[0] as f32 * m) as u8;
                px[1] = (px[1] as f32 * m) as u8;
                px[2] = (px[2] as f32 * m) as u8;
            }
        }

        let (w, h) = rgba.dimensions();
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (0u32, 0u32, w.saturating_sub(1), h.saturating_sub(1));
        if trim {
            let mut found = false;
            let (mut lo_x, mut lo_y, mut hi_x, mut hi_y) = (w, h, 0u32, 0u32);
            for (x, y, px) in rgba.enumerate_pixels() {
                if px[3] > 0 {
                    lo_x = lo_x.min(x);
                    lo_y = lo_y.min(y);
                    hi_x = hi_x.max(x);
                    hi_y = hi_y.max(y);
                    found = true;
                }
            }
            if found {
                (min_x, min_y, max_x, max_y) = (lo_x, lo_y, hi_x, hi_y);
            } else {
                warn!("image is completely transparent: {name}");
            }
        }

        let tw = max_x - min_x + 1;
        let th = max_y - min_y + 1;
        let (frame_x, frame_y, pixels) = if tw == w && th == h {
            (0, 0, rgba)
        } else {
            (
                -(min_x as i32),
                -(min_y as i32),
                imageops::crop_imm(&rgba, min_x, min_y, tw, th).to_image(),
            )
        };

        let mut hash_value = 0u64;
        hash::combine(&mut hash_value, tw as u64);
        hash::combine(&mut hash_value, th as u64);
        hash::hash_data(&mut hash_value, pixels.as_raw());

        Self {
            name,
            frame_x,
            frame_y,
            frame_w: w,
            frame_h: h,
            hash_value,
            pixels,
        }
    }

    /// Trimmed width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Trimmed height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// True iff dimensions match and the pixel buffers are byte-equal.
    pub fn equals(&self, other: &Bitmap) -> bool {
        self.pixels.dimensions() == other.pixels.dimensions()
            && self.pixels.as_raw() == other.pixels.as_raw()
    }
}

/// Blits `src` into `dst` at `(tx, ty)`, overwriting destination pixels.
pub fn copy_pixels(dst: &mut RgbaImage, src: &RgbaImage, tx: u32, ty: u32) {
    for (x, y, px) in src.enumerate_pixels() {
        dst.put_pixel(tx + x, ty + y, *px);
    }
}

/// Blits `src` into `dst` rotated 90 degrees clockwise.
///
/// Source pixel `(x, y)` lands at `(tx + src.height - 1 - y, ty + x)`; the
/// destination region is `src.height` wide and `src.width` tall.
pub fn copy_pixels_rot(dst: &mut RgbaImage, src: &RgbaImage, tx: u32, ty: u32) {
    let sh = src.height();
    for (x, y, px) in src.enumerate_pixels() {
        dst.put_pixel(tx + (sh - 1 - y), ty + x, *px);
    }
}
