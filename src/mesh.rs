//! Mesh data model
//!
//! Immutable-per-instance geometry: vertices, UVs, variable-length faces
//! (3 or 4 vertices), per-face precomputed normals and material slots.
//! Face index lists live in a flattened per-mesh arena instead of per-face
//! allocations; each face stores an (offset, length) pair into it.
//!
//! Face indices are trusted input from the asset pipeline and are not
//! range-checked against the vertex/UV arrays.

use crate::fixed::{Fx, FxUv};
use crate::material::Material;
use crate::math::{Vec2Uv, Vec3Fx};

/// Material slot value meaning "unassigned": the face is never drawn.
pub const MATERIAL_NONE: u8 = 255;

/// A polygon face: 3 or 4 (vertex, uv) index pairs in the mesh arena.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub(crate) offset: u32,
    pub len: u8,
    pub material: u8,
    /// True iff any referenced UV component lies outside [0, 1].
    pub tiling: bool,
    /// Quads only: true iff uv0 == uv1 and uv2 == uv3.
    pub square_uv: bool,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            offset: 0,
            len: 0,
            material: MATERIAL_NONE,
            tiling: false,
            square_uv: false,
        }
    }
}

pub struct Mesh {
    pub vertices: Vec<Vec3Fx>,
    pub uvs: Vec<Vec2Uv>,
    pub normals: Vec<Vec3Fx>,
    pub materials: Vec<Material>,
    faces: Vec<Face>,
    index_pool: Vec<(u16, u16)>,
}

impl Mesh {
    pub fn new(vertex_count: usize, uv_count: usize, face_count: usize) -> Self {
        Self {
            vertices: vec![Vec3Fx::ZERO; vertex_count],
            uvs: vec![Vec2Uv::ZERO; uv_count],
            normals: vec![Vec3Fx::ZERO; face_count],
            materials: Vec::new(),
            faces: vec![Face::default(); face_count],
            index_pool: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn uv_count(&self) -> usize {
        self.uvs.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, index: usize) -> &Face {
        &self.faces[index]
    }

    /// The face's (vertex, uv) index pairs.
    pub fn face_indices(&self, face: &Face) -> &[(u16, u16)] {
        let start = face.offset as usize;
        &self.index_pool[start..start + face.len as usize]
    }

    /// (Re)assign a face's geometry. The arena slot is reused when the
    /// length is unchanged; otherwise a fresh slot is appended. Recomputes
    /// the `tiling` and `square_uv` flags from the referenced UVs and grows
    /// the material table to cover a non-sentinel material index.
    pub fn set_face(
        &mut self,
        index: usize,
        vertex_indices: &[u16],
        uv_indices: &[u16],
        material: u8,
    ) {
        debug_assert_eq!(vertex_indices.len(), uv_indices.len());
        let len = vertex_indices.len() as u8;
        debug_assert!(len == 3 || len == 4);

        if self.faces[index].len != len {
            self.faces[index].offset = self.index_pool.len() as u32;
            self.index_pool
                .extend(std::iter::repeat((0u16, 0u16)).take(len as usize));
        }
        let face = &mut self.faces[index];
        face.len = len;
        face.tiling = false;
        let start = face.offset as usize;
        for i in 0..len as usize {
            self.index_pool[start + i] = (vertex_indices[i], uv_indices[i]);
            let uv = self.uvs[uv_indices[i] as usize];
            if uv.x > FxUv::ONE || uv.y > FxUv::ONE || uv.x < FxUv::ZERO || uv.y < FxUv::ZERO {
                face.tiling = true;
            }
        }
        face.square_uv = len == 4
            && self.uvs[uv_indices[0] as usize] == self.uvs[uv_indices[1] as usize]
            && self.uvs[uv_indices[2] as usize] == self.uvs[uv_indices[3] as usize];
        face.material = material;
        if material != MATERIAL_NONE && material as usize >= self.materials.len() {
            self.materials
                .resize_with(material as usize + 1, Material::default);
        }
    }

    /// Bind a material to a slot, growing the table as needed.
    pub fn set_material(&mut self, slot: u8, material: Material) {
        if slot == MATERIAL_NONE {
            return;
        }
        if slot as usize >= self.materials.len() {
            self.materials
                .resize_with(slot as usize + 1, Material::default);
        }
        self.materials[slot as usize] = material;
    }

    pub(crate) fn face_material(&self, face: &Face) -> Option<&Material> {
        if face.material == MATERIAL_NONE {
            return None;
        }
        self.materials.get(face.material as usize)
    }

    /// Face normal from the cross product of the first two edges.
    pub fn calculate_normal_face(&self, index: usize) -> Vec3Fx {
        let indices = self.face_indices(&self.faces[index]);
        let v1 = self.vertices[indices[0].0 as usize];
        let v2 = self.vertices[indices[1].0 as usize];
        let v3 = self.vertices[indices[2].0 as usize];

        let edge1 = v2 - v1;
        let edge2 = v3 - v1;
        edge2.cross(edge1).normalize()
    }

    /// Recompute every face normal, for meshes whose source asset did not
    /// supply them.
    pub fn calculate_normals(&mut self) {
        for i in 0..self.faces.len() {
            self.normals[i] = self.calculate_normal_face(i);
        }
    }

    /// Convert normalized UVs to absolute texel coordinates within each
    /// face's material region. Shared UV indices are converted once; faces
    /// with an unassigned material or no bound sprite are skipped. Regions
    /// one texel wide or tall scale that axis by 1 so the mapping stays
    /// invertible.
    pub fn bake_uv(&mut self) {
        let mut baked = vec![false; self.uvs.len()];
        for fi in 0..self.faces.len() {
            let face = self.faces[fi];
            let rect = match self.face_material(&face).and_then(|m| m.sprite.as_ref()) {
                Some(sprite) => sprite.rect(),
                None => continue,
            };
            let sx = (rect.w - 1).max(1);
            let sy = (rect.h - 1).max(1);
            let start = face.offset as usize;
            for i in 0..face.len as usize {
                let uv_index = self.index_pool[start + i].1 as usize;
                if baked[uv_index] {
                    continue;
                }
                baked[uv_index] = true;
                let uv = &mut self.uvs[uv_index];
                uv.x = FxUv::from_int(rect.x) + uv.x * sx;
                uv.y = FxUv::from_int(rect.y) + uv.y * sy;
            }
        }
    }

    /// Inverse of [`bake_uv`](Self::bake_uv), modulo fixed-point rounding.
    pub fn unbake_uv(&mut self) {
        let mut unbaked = vec![false; self.uvs.len()];
        for fi in 0..self.faces.len() {
            let face = self.faces[fi];
            let rect = match self.face_material(&face).and_then(|m| m.sprite.as_ref()) {
                Some(sprite) => sprite.rect(),
                None => continue,
            };
            let sx = (rect.w - 1).max(1);
            let sy = (rect.h - 1).max(1);
            let start = face.offset as usize;
            for i in 0..face.len as usize {
                let uv_index = self.index_pool[start + i].1 as usize;
                if unbaked[uv_index] {
                    continue;
                }
                unbaked[uv_index] = true;
                let uv = &mut self.uvs[uv_index];
                uv.x = (uv.x - FxUv::from_int(rect.x)) / sx;
                uv.y = (uv.y - FxUv::from_int(rect.y)) / sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{Color, Rect, Sprite, Texture};
    use std::rc::Rc;

    fn quad_mesh(uvs: [(f32, f32); 4]) -> Mesh {
        let mut mesh = Mesh::new(4, 4, 1);
        mesh.vertices[0] = Vec3Fx::from_ints(0, 0, 0);
        mesh.vertices[1] = Vec3Fx::from_ints(1, 0, 0);
        mesh.vertices[2] = Vec3Fx::from_ints(1, 1, 0);
        mesh.vertices[3] = Vec3Fx::from_ints(0, 1, 0);
        for (i, (u, v)) in uvs.iter().enumerate() {
            mesh.uvs[i] = Vec2Uv::from_f32s(*u, *v);
        }
        mesh.set_face(0, &[0, 1, 2, 3], &[0, 1, 2, 3], 0);
        mesh
    }

    #[test]
    fn test_set_face_flags_plain_quad() {
        let mesh = quad_mesh([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let face = mesh.face(0);
        assert!(!face.tiling);
        // uv0 != uv1 here
        assert!(!face.square_uv);
    }

    #[test]
    fn test_set_face_tiling_from_out_of_range_uv() {
        let mesh = quad_mesh([(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        assert!(mesh.face(0).tiling);
    }

    #[test]
    fn test_set_face_square_uv_pairs() {
        let mesh = quad_mesh([(0.5, 0.5), (0.5, 0.5), (1.0, 1.0), (1.0, 1.0)]);
        let face = mesh.face(0);
        assert!(face.square_uv);
        assert!(!face.tiling);
    }

    #[test]
    fn test_square_uv_never_set_for_triangles() {
        let mut mesh = Mesh::new(3, 3, 1);
        for i in 0..3 {
            mesh.uvs[i] = Vec2Uv::from_f32s(0.5, 0.5);
        }
        mesh.set_face(0, &[0, 1, 2], &[0, 1, 2], 0);
        assert!(!mesh.face(0).square_uv);
    }

    #[test]
    fn test_set_face_arena_reuse() {
        let mut mesh = quad_mesh([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let offset = mesh.face(0).offset;
        // Same length: slot reused in place
        mesh.set_face(0, &[3, 2, 1, 0], &[3, 2, 1, 0], 0);
        assert_eq!(mesh.face(0).offset, offset);
        assert_eq!(mesh.face_indices(mesh.face(0))[0], (3, 3));
        // Shrinking to a triangle appends a new slot
        mesh.set_face(0, &[0, 1, 2], &[0, 1, 2], 0);
        assert_ne!(mesh.face(0).offset, offset);
        assert_eq!(mesh.face(0).len, 3);
    }

    #[test]
    fn test_material_table_growth() {
        let mut mesh = quad_mesh([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(mesh.materials.len(), 1);
        mesh.set_face(0, &[0, 1, 2, 3], &[0, 1, 2, 3], 5);
        assert_eq!(mesh.materials.len(), 6);
        // The sentinel never grows the table
        mesh.set_face(0, &[0, 1, 2, 3], &[0, 1, 2, 3], MATERIAL_NONE);
        assert_eq!(mesh.materials.len(), 6);
    }

    #[test]
    fn test_calculate_normals() {
        let mut mesh = quad_mesh([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        mesh.calculate_normals();
        let n = mesh.normals[0];
        // Counter-clockwise XY quad: normal along -Z by the edge2 x edge1 rule
        assert!(n.z < Fx::ZERO);
        assert_eq!(n.x, Fx::ZERO);
        assert_eq!(n.y, Fx::ZERO);
    }

    #[test]
    fn test_bake_unbake_round_trip() {
        let mut mesh = quad_mesh([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.25, 0.75)]);
        let tex = Rc::new(Texture::checkerboard(64, 64, Color::WHITE, Color::BLACK));
        mesh.set_material(0, Material::new(Sprite::new(tex, Rect::new(16, 8, 32, 16))));

        let original = mesh.uvs.clone();
        mesh.bake_uv();
        // Baked coordinates are absolute texels inside the region
        assert_eq!(mesh.uvs[0].x.round(), 16);
        assert_eq!(mesh.uvs[0].y.round(), 8);
        assert_eq!(mesh.uvs[2].x.round(), 16 + 31);
        mesh.unbake_uv();
        for (a, b) in mesh.uvs.iter().zip(original.iter()) {
            assert!((a.x - b.x).abs() < FxUv::from_f32(0.002));
            assert!((a.y - b.y).abs() < FxUv::from_f32(0.002));
        }
    }

    #[test]
    fn test_bake_unbake_one_texel_wide_region() {
        let mut mesh = quad_mesh([(0.0, 0.0), (0.75, 0.0), (0.75, 0.75), (0.0, 0.75)]);
        let tex = Rc::new(Texture::checkerboard(8, 8, Color::WHITE, Color::BLACK));
        mesh.set_material(0, Material::new(Sprite::new(tex, Rect::new(0, 0, 1, 8))));

        let original = mesh.uvs.clone();
        mesh.bake_uv();
        // The 1-texel axis scales by 1; the other bakes normally
        assert_eq!(mesh.uvs[2].y.round(), (0.75 * 7.0_f32).round() as i32);
        mesh.unbake_uv();
        for (a, b) in mesh.uvs.iter().zip(original.iter()) {
            assert!((a.x - b.x).abs() < FxUv::from_f32(0.002));
            assert!((a.y - b.y).abs() < FxUv::from_f32(0.002));
        }
    }

    #[test]
    fn test_bake_skips_unbound_material() {
        let mut mesh = quad_mesh([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let original = mesh.uvs.clone();
        mesh.bake_uv();
        assert_eq!(mesh.uvs, original);
    }
}
