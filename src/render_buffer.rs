//! Per-mesh scratch space for one render pass

use crate::math::Vec3Fx;

/// Upper bounds for the shared scratch variant.
pub const MAX_VERTICES_BUFFER_SIZE: usize = 500;
pub const MAX_NORMALS_BUFFER_SIZE: usize = 500;

/// Transient storage for transformed and projected vertex/normal data.
///
/// Recomputed, never reallocated, every frame. The [`scratch`](Self::scratch)
/// variant is mutated destructively by every draw call that borrows it;
/// holding its contents across frames or across two overlapping draws reads
/// corrupted data.
pub struct RenderBuffer {
    /// Mesh world position at the last projection.
    pub offset: Vec3Fx,
    /// Vertex positions after local scale + rotation (pre-camera).
    pub position: Vec<Vec3Fx>,
    /// Screen-space x/y plus camera-space depth z.
    pub projected: Vec<Vec3Fx>,
    /// Face normals after local rotation.
    pub normal: Vec<Vec3Fx>,
    /// Cosine of the mesh's local rotation, cached per axis.
    pub cos_angle: Vec3Fx,
    pub sin_angle: Vec3Fx,
}

impl RenderBuffer {
    /// Allocate arrays sized exactly to a mesh's vertex and face counts.
    pub fn alloc(vertex_count: usize, face_count: usize) -> Self {
        Self {
            offset: Vec3Fx::ZERO,
            position: vec![Vec3Fx::ZERO; vertex_count],
            projected: vec![Vec3Fx::ZERO; vertex_count],
            normal: vec![Vec3Fx::ZERO; face_count],
            cos_angle: Vec3Fx::ZERO,
            sin_angle: Vec3Fx::ZERO,
        }
    }

    /// The bounded reusable variant for allocation-free draws.
    pub fn scratch() -> Self {
        Self::alloc(MAX_VERTICES_BUFFER_SIZE, MAX_NORMALS_BUFFER_SIZE)
    }

    /// Whether a mesh with the given counts fits this buffer.
    pub fn fits(&self, vertex_count: usize, face_count: usize) -> bool {
        vertex_count <= self.position.len() && face_count <= self.normal.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_sizes_exactly() {
        let rb = RenderBuffer::alloc(8, 6);
        assert_eq!(rb.position.len(), 8);
        assert_eq!(rb.projected.len(), 8);
        assert_eq!(rb.normal.len(), 6);
    }

    #[test]
    fn test_scratch_bounds() {
        let rb = RenderBuffer::scratch();
        assert!(rb.fits(MAX_VERTICES_BUFFER_SIZE, MAX_NORMALS_BUFFER_SIZE));
        assert!(!rb.fits(MAX_VERTICES_BUFFER_SIZE + 1, 0));
    }
}
