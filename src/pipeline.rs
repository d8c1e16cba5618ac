//! Mesh render pass: local transform, camera projection, culling, dispatch
//!
//! A pass over one mesh runs in three steps, each writing into the mesh's
//! [`RenderBuffer`]: `calculate_transform` applies local scale and rotation,
//! `calculate_projection` moves the result into camera space and projects it
//! to the screen, and `render` walks the faces, culls, classifies and hands
//! each survivor to the fill routines.

use crate::camera::Camera;
use crate::fixed::Fx;
use crate::math::Vec3Fx;
use crate::mesh::{Face, Mesh};
use crate::raster::{
    classify_quad, dispatch_horz_parallelogram, dispatch_rect, dispatch_triangle,
    dispatch_vert_parallelogram, QuadShape, RenderTarget, VertexInfo,
};
use crate::render_buffer::RenderBuffer;
use crate::texture::Color;
use crate::transform::Transform;

/// Camera-space depth beyond which faces are discarded.
const MAX_DRAW_DEPTH: Fx = Fx::from_int(100);
/// Floor for the perspective divide; anything at or behind it projects as if
/// it sat this close. Depth stored for the rasterizer stays unclamped.
const MIN_PROJECT_DEPTH: Fx = Fx::from_raw((0.1 * (1i64 << 12) as f64) as i32);

fn rotate_x(v: &mut Vec3Fx, cos: Fx, sin: Fx) {
    let y = v.y * cos - v.z * sin;
    let z = v.y * sin + v.z * cos;
    v.y = y;
    v.z = z;
}

fn rotate_y(v: &mut Vec3Fx, cos: Fx, sin: Fx) {
    let x = v.x * cos + v.z * sin;
    let z = -v.x * sin + v.z * cos;
    v.x = x;
    v.z = z;
}

fn rotate_z(v: &mut Vec3Fx, cos: Fx, sin: Fx) {
    let x = v.x * cos - v.y * sin;
    let y = v.x * sin + v.y * cos;
    v.x = x;
    v.y = y;
}

impl Mesh {
    /// Apply the mesh's local scale and rotation (X, then Y, then Z) to
    /// every vertex and face normal. Negative scale components mirror the
    /// normals before rotation. Needs re-running only when the mesh
    /// transform changes.
    pub fn calculate_transform(&self, transform: &Transform, rb: &mut RenderBuffer) {
        let scale = transform.scale();
        let rotation = transform.rotation();
        rb.cos_angle = Vec3Fx::new(rotation.x.cos(), rotation.y.cos(), rotation.z.cos());
        rb.sin_angle = Vec3Fx::new(rotation.x.sin(), rotation.y.sin(), rotation.z.sin());
        let cos = rb.cos_angle;
        let sin = rb.sin_angle;

        for (i, vertex) in self.vertices.iter().enumerate() {
            let mut p = Vec3Fx::new(vertex.x * scale.x, vertex.y * scale.y, vertex.z * scale.z);
            rotate_x(&mut p, cos.x, sin.x);
            rotate_y(&mut p, cos.y, sin.y);
            rotate_z(&mut p, cos.z, sin.z);
            rb.position[i] = p;
        }

        for (i, normal) in self.normals.iter().enumerate() {
            let mut n = *normal;
            if scale.x < Fx::ZERO {
                n.x = -n.x;
            }
            if scale.y < Fx::ZERO {
                n.y = -n.y;
            }
            if scale.z < Fx::ZERO {
                n.z = -n.z;
            }
            rotate_x(&mut n, cos.x, sin.x);
            rotate_y(&mut n, cos.y, sin.y);
            rotate_z(&mut n, cos.z, sin.z);
            rb.normal[i] = n;
        }
    }

    /// Translate the transformed vertices into camera space, apply the
    /// camera rotation and project to screen coordinates. The projected z
    /// keeps the unclamped camera-space depth for the depth test.
    pub fn calculate_projection(
        &self,
        transform: &Transform,
        camera: &Camera,
        rb: &mut RenderBuffer,
    ) {
        let mesh_position = transform.position();
        rb.offset = mesh_position;

        let half_w = Fx::from_int(camera.screen_width() / 2);
        let half_h = Fx::from_int(camera.screen_height() / 2);
        let width = Fx::from_int(camera.screen_width());
        let cam_pos = camera.position();
        let cos = camera.cos;
        let sin = camera.sin;

        for i in 0..self.vertices.len() {
            let mut p = rb.position[i] + mesh_position - cam_pos;
            rotate_x(&mut p, cos.x, sin.x);
            rotate_y(&mut p, cos.y, sin.y);
            rotate_z(&mut p, cos.z, sin.z);

            let m_z = if p.z <= MIN_PROJECT_DEPTH {
                MIN_PROJECT_DEPTH
            } else {
                p.z
            };
            let f = width / m_z;
            rb.projected[i] = Vec3Fx::new(
                p.x * f + half_w + camera.offset_projection.x,
                -p.y * f + half_h + camera.offset_projection.y,
                p.z,
            );
        }
    }

    /// Winding-independent backface test against the transformed (but not
    /// yet camera-rotated) positions. The mesh offset is always weighted 4,
    /// triangles included.
    pub fn is_backface(&self, camera: &Camera, rb: &RenderBuffer, face_index: usize) -> bool {
        let face = self.face(face_index);
        let mut sum = Vec3Fx::ZERO;
        for &(vi, _) in self.face_indices(face) {
            sum += rb.position[vi as usize];
        }
        sum -= camera.position() * face.len as i32;
        sum += rb.offset * 4;
        rb.normal[face_index].dot(sum) > Fx::ZERO
    }

    /// Farthest projected depth among the face's vertices.
    fn face_depth(&self, rb: &RenderBuffer, face: &Face) -> Fx {
        let mut depth = Fx::MIN;
        for &(vi, _) in self.face_indices(face) {
            depth = depth.max(rb.projected[vi as usize].z);
        }
        depth
    }

    /// Depth-range and screen-AABB rejection.
    fn is_visible(&self, camera: &Camera, rb: &RenderBuffer, face: &Face) -> bool {
        let depth = self.face_depth(rb, face);
        if depth <= Fx::ZERO || depth > MAX_DRAW_DEPTH {
            return false;
        }

        let mut min_x = Fx::MAX;
        let mut min_y = Fx::MAX;
        let mut max_x = Fx::MIN;
        let mut max_y = Fx::MIN;
        for &(vi, _) in self.face_indices(face) {
            let p = rb.projected[vi as usize];
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let screen_w = Fx::from_int(camera.screen_width());
        let screen_h = Fx::from_int(camera.screen_height());
        !(max_x < Fx::ZERO || max_y < Fx::ZERO || min_x >= screen_w || min_y >= screen_h)
    }

    /// Draw every face that has a bound material, is inside the view volume
    /// and faces the camera. Quads take the specialized fill their projected
    /// shape allows, or split into two triangles. `wireframe` overlays the
    /// face edges in red after the fill.
    pub fn render<T: RenderTarget>(
        &self,
        camera: &mut Camera,
        rb: &RenderBuffer,
        target: &mut T,
        wireframe: bool,
    ) {
        // The fills clip to the target and index the depth buffer with the
        // same coordinates.
        debug_assert!(
            target.width() == camera.depth_buffer().width()
                && target.height() == camera.depth_buffer().height(),
            "render target size does not match the frame's depth buffer"
        );
        for i in 0..self.face_count() {
            let face = *self.face(i);
            let material = match self.face_material(&face) {
                Some(m) if m.is_bound() => m,
                _ => continue,
            };
            if !self.is_visible(camera, rb, &face) || self.is_backface(camera, rb, i) {
                continue;
            }

            let indices = self.face_indices(&face);
            let vert = |j: usize| {
                VertexInfo::new(
                    rb.projected[indices[j].0 as usize],
                    self.uvs[indices[j].1 as usize],
                )
            };
            let depth = camera.depth_buffer_mut();

            if face.len == 4 {
                let verts = [vert(0), vert(1), vert(2), vert(3)];
                match classify_quad(&verts) {
                    QuadShape::Rect => {
                        dispatch_rect(face.tiling, face.square_uv, target, depth, material, &verts)
                    }
                    QuadShape::HorzParallelogram(r) => dispatch_horz_parallelogram(
                        face.tiling,
                        face.square_uv,
                        target,
                        depth,
                        material,
                        verts[r],
                        verts[(r + 1) % 4],
                        verts[(r + 2) % 4],
                        verts[(r + 3) % 4],
                    ),
                    QuadShape::VertParallelogram(r) => dispatch_vert_parallelogram(
                        face.tiling,
                        face.square_uv,
                        target,
                        depth,
                        material,
                        verts[r],
                        verts[(r + 1) % 4],
                        verts[(r + 2) % 4],
                        verts[(r + 3) % 4],
                    ),
                    QuadShape::Split => {
                        dispatch_triangle(
                            face.tiling,
                            target,
                            depth,
                            material,
                            verts[0],
                            verts[1],
                            verts[2],
                        );
                        dispatch_triangle(
                            face.tiling,
                            target,
                            depth,
                            material,
                            verts[0],
                            verts[2],
                            verts[3],
                        );
                    }
                }
            } else {
                dispatch_triangle(face.tiling, target, depth, material, vert(0), vert(1), vert(2));
            }

            if wireframe {
                for j in 0..face.len as usize {
                    let a = rb.projected[indices[j].0 as usize];
                    let b = rb.projected[indices[(j + 1) % face.len as usize].0 as usize];
                    target.draw_line(
                        a.x.floor(),
                        a.y.floor(),
                        b.x.floor(),
                        b.y.floor(),
                        Color::RED,
                    );
                }
            }
        }
    }
}
