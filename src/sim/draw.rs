//! Per-frame scene assembly
//!
//! The sim hands the renderer a flat list of colored axis-aligned boxes,
//! rebuilt fresh every frame. The renderer owns everything from there.

use glam::Vec2;

use super::collision::Aabb;
use super::state::WorldState;
use crate::consts::FENCE_DRAW_PAD;

/// Scene colors (RGBA8)
pub mod palette {
    pub const FENCE: [u8; 4] = [0x80, 0x00, 0x80, 0xff];
    pub const SHEEP: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
    pub const DOG: [u8; 4] = [0xff, 0x00, 0x00, 0xff];
}

/// One box for the renderer to rasterize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub min: Vec2,
    pub max: Vec2,
    pub color: [u8; 4],
}

impl DrawRect {
    fn from_aabb(aabb: Aabb, color: [u8; 4]) -> Self {
        Self {
            min: aabb.min,
            max: aabb.max,
            color,
        }
    }
}

/// Fence bands, then each sheep in flock order, then the dog
pub fn scene(state: &WorldState) -> Vec<DrawRect> {
    let mut rects = Vec::with_capacity(state.sheep.len() + 5);

    for band in state.pen.bands(FENCE_DRAW_PAD) {
        rects.push(DrawRect::from_aabb(band, palette::FENCE));
    }
    for sheep in &state.sheep {
        rects.push(DrawRect::from_aabb(
            sheep.aabb(state.params.radius),
            palette::SHEEP,
        ));
    }
    rects.push(DrawRect::from_aabb(
        Aabb::around(state.dog, state.params.radius * state.params.dog_scale),
        palette::DOG,
    ));

    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DOG_START, SHEEP_COUNT, SHEEP_RADIUS};

    #[test]
    fn test_scene_shape_and_order() {
        let state = WorldState::new(11);
        let rects = scene(&state);
        assert_eq!(rects.len(), 4 + SHEEP_COUNT + 1);

        assert!(rects[..4].iter().all(|r| r.color == palette::FENCE));
        assert!(
            rects[4..4 + SHEEP_COUNT]
                .iter()
                .all(|r| r.color == palette::SHEEP)
        );
        assert_eq!(rects.last().unwrap().color, palette::DOG);
    }

    #[test]
    fn test_sheep_and_dog_boxes_track_positions() {
        let state = WorldState::new(12);
        let rects = scene(&state);

        let first_sheep = &rects[4];
        let half = Vec2::splat(SHEEP_RADIUS);
        assert_eq!(first_sheep.min, state.sheep[0].pos - half);
        assert_eq!(first_sheep.max, state.sheep[0].pos + half);

        let dog = rects.last().unwrap();
        assert_eq!(dog.min, DOG_START - half * state.params.dog_scale);
    }

    #[test]
    fn test_fence_bands_use_draw_pad() {
        let state = WorldState::new(13);
        let rects = scene(&state);
        // Top band is the thin visual band, not the wider trigger band
        assert_eq!(rects[0].min, Vec2::new(-0.85, 0.75));
        assert_eq!(rects[0].max, Vec2::new(0.85, 0.85));
    }
}
