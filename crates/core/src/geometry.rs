//! Integer rectangles in surface-local coordinates and power-of-two helpers.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with its origin at the top-left corner.
///
/// Used both for the packer's free-space bookkeeping and for placement
/// results. `right()` and `bottom()` are exclusive edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns true if the two rectangles share at least one pixel.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns true if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Smallest power of two that is `>= n`. Returns 1 for `n <= 1`.
///
/// Saturates at `2^31` for inputs above it.
pub fn next_power_of_two(n: u32) -> u32 {
    n.checked_next_power_of_two().unwrap_or(1 << 31)
}

/// Largest power of two that is `<= n`. Returns 0 for `n == 0`.
pub fn prev_power_of_two(n: u32) -> u32 {
    if n == 0 {
        0
    } else {
        1 << (31 - n.leading_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_power_of_two_rounds_up() {
        assert_eq!(next_power_of_two(70), 128);
        assert_eq!(next_power_of_two(36), 64);
        assert_eq!(next_power_of_two(129), 256);
    }

    #[test]
    fn next_power_of_two_keeps_exact_powers() {
        assert_eq!(next_power_of_two(128), 128);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2048), 2048);
    }

    #[test]
    fn next_power_of_two_of_zero_is_one() {
        assert_eq!(next_power_of_two(0), 1);
    }

    #[test]
    fn prev_power_of_two_rounds_down() {
        assert_eq!(prev_power_of_two(100), 64);
        assert_eq!(prev_power_of_two(2048), 2048);
        assert_eq!(prev_power_of_two(1), 1);
        assert_eq!(prev_power_of_two(0), 0);
    }

    #[test]
    fn edges_are_exclusive() {
        let r = Rect::new(2, 3, 10, 20);
        assert_eq!(r.right(), 12);
        assert_eq!(r.bottom(), 23);
        assert_eq!(r.area(), 200);
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        let c = Rect::new(0, 10, 10, 10);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn overlapping_rects_intersect_symmetrically() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(9, 9, 5, 5);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn contains_includes_equal_rect() {
        let a = Rect::new(4, 4, 8, 8);
        assert!(a.contains(&a));
        assert!(a.contains(&Rect::new(5, 5, 2, 2)));
        assert!(!a.contains(&Rect::new(3, 4, 2, 2)));
        assert!(!a.contains(&Rect::new(10, 10, 4, 4)));
    }

    #[test]
    fn rect_serializes_with_field_names() {
        let json = serde_json::to_value(Rect::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json["x"], 1);
        assert_eq!(json["y"], 2);
        assert_eq!(json["width"], 3);
        assert_eq!(json["height"], 4);
    }
}
