//! MaxRects bin packing with the Best Short Side Fit heuristic.

use crate::model::Rect;

/// Online rectangle placement into a fixed-size bin.
///
/// The free list starts as the whole bin. Each placement splits every
/// intersecting free rectangle by the maximal-rectangles rule and prunes
/// rectangles fully contained in another, so the free list always covers
/// exactly the unoccupied area with no nested entries.
pub struct MaxRectsBin {
    free: Vec<Rect>,
}

impl MaxRectsBin {
    pub fn new(bin_width: u32, bin_height: u32) -> Self {
        Self {
            free: vec![Rect::new(0, 0, bin_width, bin_height)],
        }
    }

    /// Places a `w` x `h` rectangle, optionally rotated 90 degrees.
    ///
    /// Returns the placed rectangle in its actual orientation; callers detect
    /// rotation by comparing the returned width to the requested one. `None`
    /// when nothing fits.
    pub fn insert(&mut self, w: u32, h: u32, allow_rotate: bool) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }
        let node = self.find_position(w, h, allow_rotate)?;
        self.place(&node);
        Some(node)
    }

    /// Best Short Side Fit: minimize the smaller leftover side, tie-break on
    /// the larger one. The first candidate wins ties, which keeps results
    /// deterministic for a given insertion sequence.
    fn find_position(&self, w: u32, h: u32, allow_rotate: bool) -> Option<Rect> {
        let mut best: Option<Rect> = None;
        let mut best_short = u32::MAX;
        let mut best_long = u32::MAX;

        for fr in &self.free {
            if fr.w >= w && fr.h >= h {
                let leftover_h = fr.w - w;
                let leftover_v = fr.h - h;
                let short = leftover_h.min(leftover_v);
                let long = leftover_h.max(leftover_v);
                if short < best_short || (short == best_short && long < best_long) {
                    best = Some(Rect::new(fr.x, fr.y, w, h));
                    best_short = short;
                    best_long = long;
                }
            }
            if allow_rotate && fr.w >= h && fr.h >= w {
                let leftover_h = fr.w - h;
                let leftover_v = fr.h - w;
                let short = leftover_h.min(leftover_v);
                let long = leftover_h.max(leftover_v);
                if short < best_short || (short == best_short && long < best_long) {
                    best = Some(Rect::new(fr.x, fr.y, h, w));
                    best_short = short;
                    best_long = long;
                }
            }
        }
        best
    }

    fn place(&mut self, node: &Rect) {
        let mut split_out: Vec<Rect> = Vec::new();
        let mut i = 0;
        while i < self.free.len() {
            if self.free[i].intersects(node) {
                let fr = self.free.swap_remove(i);
                split_free_node(&fr, node, &mut split_out);
            } else {
                i += 1;
            }
        }
        self.free.extend(split_out);
        self.prune_free_list();
    }

    /// Drops every free rectangle contained in another.
    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut removed_i = false;
            let mut j = i + 1;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    self.free.swap_remove(i);
                    removed_i = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.swap_remove(j);
                } else {
                    j += 1;
                }
            }
            if !removed_i {
                i += 1;
            }
        }
    }

    /// Current free rectangles (unspecified order).
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }
}

/// Splits `fr` around `node`, emitting up to four maximal leftover
/// rectangles (left/right span the full height, top/bottom the full width).
/// Only called when the two intersect.
fn split_free_node(fr: &Rect, node: &Rect, out: &mut Vec<Rect>) {
    if node.x > fr.x {
        out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
    }
    if node.right() < fr.right() {
        out.push(Rect::new(node.right(), fr.y, fr.right() - node.right(), fr.h));
    }
    if node.y > fr.y {
        out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
    }
    if node.bottom() < fr.bottom() {
        out.push(Rect::new(fr.x, node.bottom(), fr.w, fr.bottom() - node.bottom()));
    }
}
