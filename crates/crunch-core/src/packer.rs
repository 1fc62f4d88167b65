use crate::bitmap::{copy_pixels, copy_pixels_rot, Bitmap};
use crate::config::Config;
use crate::error::{CrunchError, Result};
use crate::maxrects::MaxRectsBin;
use crate::model::Placement;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;

/// One atlas page: a MaxRects bin run plus the placements it produced.
///
/// Bitmaps are referenced by index into the build's owning arena; `bitmaps`
/// and `points` stay parallel, in the order images were consumed. That order
/// is the order manifests emit.
pub struct Packer {
    pub width: u32,
    pub height: u32,
    pub pad: u32,
    pub bitmaps: Vec<usize>,
    pub points: Vec<Placement>,
    dup_lookup: HashMap<u64, usize>,
}

impl Packer {
    pub fn new(width: u32, height: u32, pad: u32) -> Self {
        Self {
            width,
            height,
            pad,
            bitmaps: Vec::new(),
            points: Vec::new(),
            dup_lookup: HashMap::new(),
        }
    }

    /// Consumes images from the back of `queue` (largest first; the queue is
    /// sorted ascending by area) until the page is full or the queue empty.
    ///
    /// Leftover entries belong to the next page. After packing, the page
    /// shrinks to the power-of-two floor that still covers the used extent.
    pub fn pack(&mut self, queue: &mut Vec<usize>, arena: &[Bitmap], cfg: &Config) {
        let mut bin = MaxRectsBin::new(self.width, self.height);
        let mut ww = 0;
        let mut hh = 0;

        while let Some(&idx) = queue.last() {
            let bitmap = &arena[idx];

            if cfg.verbose {
                println!("\t{}: {}", queue.len(), bitmap.name);
            }

            if cfg.unique {
                if let Some(&primary) = self.dup_lookup.get(&bitmap.hash_value) {
                    // Fingerprints can collide; only dedup on a byte-equal match.
                    if bitmap.equals(&arena[self.bitmaps[primary]]) {
                        let p = self.points[primary];
                        self.points.push(Placement {
                            dup_of: Some(primary),
                            ..p
                        });
                        self.bitmaps.push(idx);
                        queue.pop();
                        continue;
                    }
                }
            }

            let Some(rect) = bin.insert(
                bitmap.width() + self.pad,
                bitmap.height() + self.pad,
                cfg.rotate,
            ) else {
                // Page is full; whatever remains goes to the next page.
                break;
            };

            if cfg.unique {
                self.dup_lookup.insert(bitmap.hash_value, self.points.len());
            }

            self.points.push(Placement {
                x: rect.x,
                y: rect.y,
                dup_of: None,
                rotated: cfg.rotate && bitmap.width() + self.pad != rect.w,
            });
            self.bitmaps.push(idx);
            queue.pop();

            ww = ww.max(rect.x + rect.w);
            hh = hh.max(rect.y + rect.h);
        }

        let ww = ww.max(1);
        let hh = hh.max(1);
        while self.width / 2 >= ww {
            self.width /= 2;
        }
        while self.height / 2 >= hh {
            self.height /= 2;
        }
    }

    /// Composites every non-duplicate placement onto a transparent canvas
    /// and encodes it as a PNG.
    pub fn save_png(&self, path: &Path, arena: &[Bitmap]) -> Result<()> {
        let mut canvas = RgbaImage::new(self.width, self.height);
        for (i, &bi) in self.bitmaps.iter().enumerate() {
            let p = &self.points[i];
            if p.dup_of.is_none() {
                if p.rotated {
                    copy_pixels_rot(&mut canvas, &arena[bi].pixels, p.x, p.y);
                } else {
                    copy_pixels(&mut canvas, &arena[bi].pixels, p.x, p.y);
                }
            }
        }
        canvas.save(path).map_err(|source| CrunchError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}
