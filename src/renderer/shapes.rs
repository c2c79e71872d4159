//! Shape generation for 2D primitives

use glam::Vec2;

use super::vertex::{Vertex, rgba8_to_f32};
use crate::sim::DrawRect;

/// Generate vertices for a filled axis-aligned rectangle (two triangles)
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let bl = Vertex::new(min.x, min.y, color);
    let br = Vertex::new(max.x, min.y, color);
    let tl = Vertex::new(min.x, max.y, color);
    let tr = Vertex::new(max.x, max.y, color);
    [bl, br, tr, tr, tl, bl]
}

/// Flatten a frame's box list into one triangle-list vertex buffer
pub fn scene_vertices(rects: &[DrawRect]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(rects.len() * 6);
    for r in rects {
        vertices.extend_from_slice(&rect(r.min, r.max, rgba8_to_f32(r.color)));
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_covers_all_corners() {
        let verts = rect(Vec2::new(-0.5, -0.25), Vec2::new(0.5, 0.25), [1.0; 4]);
        assert_eq!(verts.len(), 6);
        for (x, y) in [(-0.5, -0.25), (0.5, -0.25), (-0.5, 0.25), (0.5, 0.25)] {
            assert!(verts.iter().any(|v| v.position == [x, y]));
        }
    }

    #[test]
    fn test_scene_vertices_count_and_color() {
        let rects = vec![
            DrawRect {
                min: Vec2::ZERO,
                max: Vec2::ONE,
                color: [255, 0, 0, 255],
            },
            DrawRect {
                min: -Vec2::ONE,
                max: Vec2::ZERO,
                color: [0, 255, 0, 255],
            },
        ];
        let verts = scene_vertices(&rects);
        assert_eq!(verts.len(), 12);
        assert!(verts[..6].iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
        assert!(verts[6..].iter().all(|v| v.color == [0.0, 1.0, 0.0, 1.0]));
    }
}
