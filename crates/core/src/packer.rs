//! Free-rectangle bin packer.
//!
//! [`RectPacker`] places rectangles on a fixed-size surface one at a time.
//! It keeps a list of free rectangles; each insertion picks the free
//! rectangle that scores best under the chosen [`PackHeuristic`], records the
//! used area, and splits every free rectangle the used area touches into the
//! (up to four) maximal slivers left over around it.
//!
//! After each split, free rectangles fully contained in another free
//! rectangle are pruned so the free list stays bounded.
//!
//! For a fixed sequence of `insert` calls on a packer of a fixed size, the
//! results are fully deterministic.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Scoring rule used to choose among free rectangles that fit a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackHeuristic {
    /// Minimize the shorter leftover side.
    #[default]
    BestShortSideFit,
    /// Minimize the longer leftover side.
    BestLongSideFit,
    /// Minimize the leftover area.
    BestAreaFit,
}

/// All recognized heuristic names.
const HEURISTIC_NAMES: &[&str] = &["bssf", "blsf", "baf"];

impl PackHeuristic {
    /// Parses `bssf`, `blsf`, or `baf`. Unknown names fall back to
    /// best-short-side-fit.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bssf" => PackHeuristic::BestShortSideFit,
            "blsf" => PackHeuristic::BestLongSideFit,
            "baf" => PackHeuristic::BestAreaFit,
            other => {
                tracing::warn!(heuristic = other, "unknown packing heuristic, using bssf");
                PackHeuristic::BestShortSideFit
            }
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        HEURISTIC_NAMES
    }

    /// Lower is better. Only called when `free` fits `w x h`.
    fn score(self, free: &Rect, w: u32, h: u32) -> u64 {
        let leftover_w = u64::from(free.width - w);
        let leftover_h = u64::from(free.height - h);
        match self {
            PackHeuristic::BestShortSideFit => leftover_w.min(leftover_h),
            PackHeuristic::BestLongSideFit => leftover_w.max(leftover_h),
            PackHeuristic::BestAreaFit => free.area() - u64::from(w) * u64::from(h),
        }
    }
}

/// Stateful rectangle allocator for one surface size.
///
/// Instances are cheap and meant to be discarded after a packing attempt;
/// nothing is shared between packers.
#[derive(Debug, Clone)]
pub struct RectPacker {
    width: u32,
    height: u32,
    padding: u32,
    heuristic: PackHeuristic,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl RectPacker {
    /// Creates a packer for a `width x height` surface using
    /// best-short-side-fit.
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        Self::with_heuristic(width, height, padding, PackHeuristic::default())
    }

    pub fn with_heuristic(
        width: u32,
        height: u32,
        padding: u32,
        heuristic: PackHeuristic,
    ) -> Self {
        let free = if width > 0 && height > 0 {
            vec![Rect::new(0, 0, width, height)]
        } else {
            Vec::new()
        };
        Self {
            width,
            height,
            padding,
            heuristic,
            free,
            used: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current free rectangles, in insertion order.
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    /// Rectangles handed out so far, padding included.
    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    /// Reserves space for a `sprite_width x sprite_height` sprite.
    ///
    /// The request is inflated by the padding on the right and bottom edges.
    /// Returns the reserved rectangle (padding included), or `None` if no
    /// free rectangle can hold it. `None` only means "does not fit at this
    /// surface size" and leaves the packer unchanged.
    pub fn insert(&mut self, sprite_width: u32, sprite_height: u32) -> Option<Rect> {
        let w = sprite_width.checked_add(self.padding)?;
        let h = sprite_height.checked_add(self.padding)?;
        if w == 0 || h == 0 {
            return None;
        }

        let mut best: Option<(u64, usize)> = None;
        for (i, free) in self.free.iter().enumerate() {
            if free.width < w || free.height < h {
                continue;
            }
            let score = self.heuristic.score(free, w, h);
            // Strict comparison keeps the first-encountered candidate on ties.
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, i));
            }
        }

        let (_, index) = best?;
        let target = self.free[index];
        let used = Rect::new(target.x, target.y, w, h);
        self.split_free(&used);
        self.prune_free();
        self.used.push(used);
        Some(used)
    }

    /// Replaces every free rectangle that intersects `used` with the maximal
    /// slivers left of, right of, above, and below it.
    fn split_free(&mut self, used: &Rect) {
        let mut next = Vec::with_capacity(self.free.len() + 4);
        for free in &self.free {
            if !free.intersects(used) {
                next.push(*free);
                continue;
            }
            if used.x > free.x {
                next.push(Rect::new(free.x, free.y, used.x - free.x, free.height));
            }
            if used.right() < free.right() {
                next.push(Rect::new(
                    used.right(),
                    free.y,
                    free.right() - used.right(),
                    free.height,
                ));
            }
            if used.y > free.y {
                next.push(Rect::new(free.x, free.y, free.width, used.y - free.y));
            }
            if used.bottom() < free.bottom() {
                next.push(Rect::new(
                    free.x,
                    used.bottom(),
                    free.width,
                    free.bottom() - used.bottom(),
                ));
            }
        }
        self.free = next;
    }

    /// Drops free rectangles contained in another free rectangle. Of two
    /// identical rectangles the earlier one is kept.
    fn prune_free(&mut self) {
        let free = &self.free;
        let keep: Vec<bool> = free
            .iter()
            .enumerate()
            .map(|(i, a)| {
                !free.iter().enumerate().any(|(j, b)| {
                    i != j && b.contains(a) && (a != b || j < i)
                })
            })
            .collect();
        let mut flags = keep.into_iter();
        self.free.retain(|_| flags.next().unwrap_or(true));
    }
}
