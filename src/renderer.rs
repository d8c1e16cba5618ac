//! Scene-level glue: per-pass render context and the mesh renderer component

use crate::camera::Camera;
use crate::math::{Vec2Uv, Vec3Fx};
use crate::mesh::Mesh;
use crate::raster::RenderTarget;
use crate::render_buffer::RenderBuffer;
use crate::transform::Transform;

/// A camera plus a shared scratch buffer for immediate-mode draws. Meshes
/// drawn through [`draw_mesh`](Self::draw_mesh) reuse the same bounded
/// buffer, so no per-mesh state survives between calls.
pub struct RenderContext {
    pub camera: Camera,
    scratch: RenderBuffer,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            camera: Camera::new(),
            scratch: RenderBuffer::scratch(),
        }
    }

    /// Snapshot the camera transform and prepare the depth buffer for a new
    /// frame at the given resolution.
    pub fn begin_frame(&mut self, camera_transform: &Transform, width: i32, height: i32) {
        self.camera.begin_frame(camera_transform, width, height);
    }

    /// Transform, project and draw a mesh in one call through the scratch
    /// buffer. Meshes exceeding the scratch capacity are skipped.
    pub fn draw_mesh<T: RenderTarget>(
        &mut self,
        mesh: &Mesh,
        transform: &Transform,
        target: &mut T,
        wireframe: bool,
    ) {
        if !self.scratch.fits(mesh.vertex_count(), mesh.face_count()) {
            log::warn!(
                "mesh too large for scratch buffer ({} vertices, {} faces), skipped",
                mesh.vertex_count(),
                mesh.face_count()
            );
            return;
        }
        mesh.calculate_transform(transform, &mut self.scratch);
        mesh.calculate_projection(transform, &self.camera, &mut self.scratch);
        mesh.render(&mut self.camera, &self.scratch, target, wireframe);
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Retained-mode counterpart: owns a buffer sized to one mesh so the
/// local-transform step runs only when the transform actually changes.
pub struct MeshRenderer {
    pub transform: Transform,
    pub wireframe: bool,
    buffer: Option<RenderBuffer>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self {
            transform: Transform::default(),
            wireframe: false,
            buffer: None,
        }
    }

    /// Attach a mesh: allocates a buffer for its exact counts and runs the
    /// local transform once.
    pub fn set_mesh(&mut self, mesh: &Mesh) {
        let mut buffer = RenderBuffer::alloc(mesh.vertex_count(), mesh.face_count());
        mesh.calculate_transform(&self.transform, &mut buffer);
        self.buffer = Some(buffer);
    }

    /// Re-run the local transform after mutating [`transform`](Self::transform).
    pub fn update_transform(&mut self, mesh: &Mesh) {
        if let Some(buffer) = &mut self.buffer {
            mesh.calculate_transform(&self.transform, buffer);
        }
    }

    /// Project and draw with the buffered local transform. No-op until
    /// [`set_mesh`](Self::set_mesh) was called.
    pub fn on_render<T: RenderTarget>(&mut self, mesh: &Mesh, camera: &mut Camera, target: &mut T) {
        let buffer = match &mut self.buffer {
            Some(b) => b,
            None => return,
        };
        mesh.calculate_projection(&self.transform, camera, buffer);
        mesh.render(camera, buffer, target, self.wireframe);
    }
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit-radius cube with one quad per side, outward normals and material
/// slot 0 on every face. UVs cover the material region once per face.
pub fn create_test_cube() -> Mesh {
    let mut mesh = Mesh::new(8, 4, 6);
    mesh.vertices[0] = Vec3Fx::from_ints(-1, -1, -1);
    mesh.vertices[1] = Vec3Fx::from_ints(1, -1, -1);
    mesh.vertices[2] = Vec3Fx::from_ints(1, 1, -1);
    mesh.vertices[3] = Vec3Fx::from_ints(-1, 1, -1);
    mesh.vertices[4] = Vec3Fx::from_ints(-1, -1, 1);
    mesh.vertices[5] = Vec3Fx::from_ints(1, -1, 1);
    mesh.vertices[6] = Vec3Fx::from_ints(1, 1, 1);
    mesh.vertices[7] = Vec3Fx::from_ints(-1, 1, 1);

    mesh.uvs[0] = Vec2Uv::from_f32s(0.0, 0.0);
    mesh.uvs[1] = Vec2Uv::from_f32s(1.0, 0.0);
    mesh.uvs[2] = Vec2Uv::from_f32s(1.0, 1.0);
    mesh.uvs[3] = Vec2Uv::from_f32s(0.0, 1.0);

    let uv_loop = [0u16, 1, 2, 3];
    mesh.set_face(0, &[0, 1, 2, 3], &uv_loop, 0); // -z
    mesh.set_face(1, &[5, 4, 7, 6], &uv_loop, 0); // +z
    mesh.set_face(2, &[4, 0, 3, 7], &uv_loop, 0); // -x
    mesh.set_face(3, &[1, 5, 6, 2], &uv_loop, 0); // +x
    mesh.set_face(4, &[3, 2, 6, 7], &uv_loop, 0); // +y
    mesh.set_face(5, &[4, 5, 1, 0], &uv_loop, 0); // -y

    mesh.normals[0] = Vec3Fx::from_ints(0, 0, -1);
    mesh.normals[1] = Vec3Fx::from_ints(0, 0, 1);
    mesh.normals[2] = Vec3Fx::from_ints(-1, 0, 0);
    mesh.normals[3] = Vec3Fx::from_ints(1, 0, 0);
    mesh.normals[4] = Vec3Fx::from_ints(0, 1, 0);
    mesh.normals[5] = Vec3Fx::from_ints(0, -1, 0);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fx;
    use crate::material::Material;
    use crate::raster::Framebuffer;
    use crate::texture::{Color, Rect, Sprite, Texture};
    use std::rc::Rc;

    fn bound_cube() -> Mesh {
        let mut mesh = create_test_cube();
        let tex = Rc::new(Texture::checkerboard(8, 8, Color::WHITE, Color::BLUE));
        mesh.set_material(0, Material::new(Sprite::new(tex, Rect::new(0, 0, 8, 8))));
        mesh.bake_uv();
        mesh
    }

    #[test]
    fn test_cube_shape() {
        let mesh = create_test_cube();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        for i in 0..6 {
            let face = mesh.face(i);
            assert_eq!(face.len, 4);
            assert_eq!(face.material, 0);
            // Outward normal: every face vertex lies on its positive side
            for &(vi, _) in mesh.face_indices(face) {
                assert!(mesh.normals[i].dot(mesh.vertices[vi as usize]) > Fx::ZERO);
            }
        }
    }

    #[test]
    fn test_context_draws_cube() {
        let mesh = bound_cube();
        let mut ctx = RenderContext::new();
        ctx.begin_frame(&Transform::default(), 160, 120);
        let mut fb = Framebuffer::new(160, 120);
        ctx.draw_mesh(&mesh, &Transform::at(Vec3Fx::from_ints(0, 0, 5)), &mut fb, false);
        assert_ne!(fb.pixel_at(80, 60), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_context_skips_oversized_mesh() {
        let mesh = Mesh::new(
            crate::render_buffer::MAX_VERTICES_BUFFER_SIZE + 1,
            1,
            0,
        );
        let mut ctx = RenderContext::new();
        ctx.begin_frame(&Transform::default(), 64, 64);
        let mut fb = Framebuffer::new(64, 64);
        // Must not panic or touch the target
        ctx.draw_mesh(&mesh, &Transform::default(), &mut fb, false);
        assert_eq!(fb.pixel_at(32, 32), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_mesh_renderer_round_trip() {
        let mesh = bound_cube();
        let mut camera = Camera::new();
        camera.begin_frame(&Transform::default(), 160, 120);

        let mut renderer = MeshRenderer::new();
        renderer.transform = Transform::at(Vec3Fx::from_ints(0, 0, 5));
        renderer.set_mesh(&mesh);

        let mut fb = Framebuffer::new(160, 120);
        renderer.on_render(&mesh, &mut camera, &mut fb);
        assert_ne!(fb.pixel_at(80, 60), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_mesh_renderer_without_mesh_is_noop() {
        let mesh = bound_cube();
        let mut camera = Camera::new();
        camera.begin_frame(&Transform::default(), 64, 64);
        let mut renderer = MeshRenderer::new();
        let mut fb = Framebuffer::new(64, 64);
        renderer.on_render(&mesh, &mut camera, &mut fb);
        assert_eq!(fb.pixel_at(32, 32), Color::with_alpha(0, 0, 0, 0));
    }
}
