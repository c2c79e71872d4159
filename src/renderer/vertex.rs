//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// RGBA8 scene color to the f32 color the vertex format carries
#[inline]
pub fn rgba8_to_f32(color: [u8; 4]) -> [f32; 4] {
    color.map(|c| c as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba8_conversion() {
        assert_eq!(rgba8_to_f32([0, 0, 0, 0]), [0.0; 4]);
        assert_eq!(rgba8_to_f32([255, 255, 255, 255]), [1.0; 4]);
        let purple = rgba8_to_f32([0x80, 0x00, 0x80, 0xff]);
        assert!((purple[0] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(purple[1], 0.0);
    }
}
