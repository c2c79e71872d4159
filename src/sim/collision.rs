//! Axis-aligned box overlap tests
//!
//! Every agent occupies a square of side `2 * radius` centered on its
//! position. Overlap is strict on both axes, so boxes that merely share an
//! edge do not count as touching.

use glam::Vec2;

/// An axis-aligned box stored as min/max corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from any two opposite corners; each axis is normalized to
    /// min/max independently, so corner order does not matter.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Square box centered on an agent position
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        let half = Vec2::splat(half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict AABB overlap: projections on both axes must overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_basic() {
        let a = Aabb::around(Vec2::ZERO, 0.1);
        let b = Aabb::around(Vec2::new(0.15, 0.0), 0.1);
        assert!(a.overlaps(&b));

        let far = Aabb::around(Vec2::new(0.5, 0.0), 0.1);
        assert!(!a.overlaps(&far));
    }

    #[test]
    fn test_edge_contact_is_not_overlap() {
        // Boxes sharing the x = 0.2 edge exactly
        let a = Aabb::around(Vec2::ZERO, 0.1);
        let b = Aabb::around(Vec2::new(0.3, 0.0), 0.1);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_overlap_needs_both_axes() {
        let a = Aabb::around(Vec2::ZERO, 0.1);
        // Overlaps on x only
        let b = Aabb::around(Vec2::new(0.05, 0.5), 0.1);
        assert!(!a.overlaps(&b));
        // Overlaps on y only
        let c = Aabb::around(Vec2::new(0.5, 0.05), 0.1);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_from_corners_normalizes() {
        // Corners given top-left / bottom-right in y-up coords: the y pair
        // arrives inverted and must still produce a valid box.
        let b = Aabb::from_corners(Vec2::new(0.7, 0.9), Vec2::new(0.9, -0.9));
        assert_eq!(b.min, Vec2::new(0.7, -0.9));
        assert_eq!(b.max, Vec2::new(0.9, 0.9));
    }

    proptest! {
        #[test]
        fn prop_overlap_symmetric(
            ax in -1.0f32..1.0, ay in -1.0f32..1.0,
            bx in -1.0f32..1.0, by in -1.0f32..1.0,
            ra in 0.01f32..0.5, rb in 0.01f32..0.5,
        ) {
            let a = Aabb::around(Vec2::new(ax, ay), ra);
            let b = Aabb::around(Vec2::new(bx, by), rb);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
