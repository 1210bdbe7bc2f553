//! Vertex format for chunk meshes.
//!
//! Matches what the rendering layer's vertex shader expects: a world-space
//! position, the in-quad texture coordinate (scaled by the face's extent so
//! tiled textures repeat across merged faces), and the raster-lookup
//! coordinate pointing at the face's cell block in the chunk's face-texture
//! raster.

use cgmath::Point3;

/// A single mesh vertex.
///
/// # Memory Layout
/// `#[repr(C)]` + `bytemuck` so the vertex buffer can be uploaded to the GPU
/// as raw bytes: 3×f32 position, 2×f32 UV, 2×f32 raster UV, 28 bytes total.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockVertex {
    /// Position in chunk-local space (the chunk transform places it in the
    /// world).
    pub position: [f32; 3],
    /// In-quad texture coordinate, scaled by the face's 2D extent.
    pub uv: [f32; 2],
    /// Texel coordinate of the face's origin cell in the face-texture
    /// raster.
    pub raster_uv: [f32; 2],
}

impl BlockVertex {
    /// Creates a vertex from a position and its two texture coordinates.
    pub fn new(position: Point3<f32>, uv: [f32; 2], raster_uv: [f32; 2]) -> Self {
        BlockVertex {
            position: [position.x, position.y, position.z],
            uv,
            raster_uv,
        }
    }
}
