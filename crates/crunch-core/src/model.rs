use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle spanning `[x, x+w) x [y, y+h)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge coordinate (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge coordinate (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if `self` and `r` overlap by at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right() || r.x >= self.right() || self.y >= r.bottom() || r.y >= self.bottom())
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
}

/// Where one bitmap landed inside an atlas page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    /// Top-left corner inside the page.
    pub x: u32,
    pub y: u32,
    /// Index of an earlier placement on the same page whose pixels this
    /// record shares, when the bitmap was deduplicated.
    pub dup_of: Option<usize>,
    /// True when the bitmap was placed rotated 90 degrees clockwise.
    pub rotated: bool,
}
