//! Binary mesh loading and the path-keyed mesh registry
//!
//! Mesh files are flat binary: three `u32` counts (vertices, UVs, faces),
//! then `f32` vertex triples, `f32` UV pairs, and per face a `u8` length,
//! `length` (vertex, uv) `u32` index pairs and an `f32` normal triple.
//! Big-endian is the on-disk default; the reader also accepts little-endian
//! for tool-generated files.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fixed::{Fx, FxUv};
use crate::math::{Vec2Uv, Vec3Fx};
use crate::mesh::Mesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("i/o error reading mesh: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported face length {0} (expected 3 or 4)")]
    BadFaceLength(u8),
}

/// Endian-aware primitive reader over any byte source.
pub struct BinReader<R: Read> {
    inner: R,
    endian: Endian,
}

impl<R: Read> BinReader<R> {
    pub fn new(inner: R, endian: Endian) -> Self {
        Self { inner, endian }
    }

    pub fn read_u8(&mut self) -> Result<u8, MeshError> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, MeshError> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes(buf),
            Endian::Little => u32::from_le_bytes(buf),
        })
    }

    pub fn read_f32(&mut self) -> Result<f32, MeshError> {
        Ok(f32::from_bits(self.read_u32()?))
    }
}

impl Mesh {
    /// Read a mesh from an open binary stream. Faces load into material
    /// slot 0; the caller binds sprites afterwards.
    pub fn read_from<R: Read>(reader: &mut BinReader<R>) -> Result<Mesh, MeshError> {
        let vertex_count = reader.read_u32()? as usize;
        let uv_count = reader.read_u32()? as usize;
        let face_count = reader.read_u32()? as usize;
        let mut mesh = Mesh::new(vertex_count, uv_count, face_count);

        for i in 0..vertex_count {
            let x = reader.read_f32()?;
            let y = reader.read_f32()?;
            let z = reader.read_f32()?;
            mesh.vertices[i] = Vec3Fx::new(Fx::from_f32(x), Fx::from_f32(y), Fx::from_f32(z));
        }

        for i in 0..uv_count {
            let u = reader.read_f32()?;
            let v = reader.read_f32()?;
            mesh.uvs[i] = Vec2Uv::new(FxUv::from_f32(u), FxUv::from_f32(v));
        }

        for i in 0..face_count {
            let length = reader.read_u8()?;
            if length != 3 && length != 4 {
                return Err(MeshError::BadFaceLength(length));
            }
            let mut vertices = [0u16; 4];
            let mut uvs = [0u16; 4];
            for j in 0..length as usize {
                vertices[j] = reader.read_u32()? as u16;
                uvs[j] = reader.read_u32()? as u16;
            }
            mesh.set_face(i, &vertices[..length as usize], &uvs[..length as usize], 0);

            let x = reader.read_f32()?;
            let y = reader.read_f32()?;
            let z = reader.read_f32()?;
            mesh.normals[i] = Vec3Fx::new(Fx::from_f32(x), Fx::from_f32(y), Fx::from_f32(z));
        }

        Ok(mesh)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BinReader::new(BufReader::new(file), Endian::Big);
        let mesh = Mesh::read_from(&mut reader)?;
        log::debug!(
            "loaded mesh {}: {} vertices, {} faces",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }
}

/// Stable handle into a [`MeshRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

/// Owns every loaded mesh and deduplicates loads by path. Handles stay
/// valid for the registry's lifetime; meshes are never evicted.
#[derive(Default)]
pub struct MeshRegistry {
    meshes: Vec<Mesh>,
    by_path: HashMap<PathBuf, MeshId>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mesh file, or return the existing handle if this path was
    /// already loaded.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<MeshId, MeshError> {
        let path = path.as_ref();
        if let Some(&id) = self.by_path.get(path) {
            return Ok(id);
        }
        let mesh = Mesh::load_file(path)?;
        let id = self.insert(mesh);
        self.by_path.insert(path.to_path_buf(), id);
        Ok(id)
    }

    /// Register an in-memory mesh (procedural geometry, tests).
    pub fn insert(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len());
        self.meshes.push(mesh);
        id
    }

    pub fn get(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn get_mut(&mut self, id: MeshId) -> &mut Mesh {
        &mut self.meshes[id.0]
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    fn push_f32(buf: &mut Vec<u8>, v: f32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    fn triangle_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        push_u32(&mut buf, 3); // vertices
        push_u32(&mut buf, 3); // uvs
        push_u32(&mut buf, 1); // faces
        for (x, y, z) in [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)] {
            push_f32(&mut buf, x);
            push_f32(&mut buf, y);
            push_f32(&mut buf, z);
        }
        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            push_f32(&mut buf, u);
            push_f32(&mut buf, v);
        }
        buf.push(3); // face length
        for i in 0..3u32 {
            push_u32(&mut buf, i); // vertex index
            push_u32(&mut buf, i); // uv index
        }
        push_f32(&mut buf, 0.0);
        push_f32(&mut buf, 0.0);
        push_f32(&mut buf, -1.0);
        buf
    }

    #[test]
    fn test_read_big_endian_triangle() {
        let bytes = triangle_bytes();
        let mut reader = BinReader::new(bytes.as_slice(), Endian::Big);
        let mesh = Mesh::read_from(&mut reader).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.uv_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertices[1], Vec3Fx::from_ints(1, 0, 0));
        assert_eq!(mesh.normals[0], Vec3Fx::from_ints(0, 0, -1));
        let face = mesh.face(0);
        assert_eq!(face.len, 3);
        assert_eq!(face.material, 0);
        assert_eq!(mesh.face_indices(face), &[(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_bad_face_length_rejected() {
        let mut bytes = triangle_bytes();
        // Patch the face length byte (after counts, vertices and uvs)
        let offset = 12 + 3 * 12 + 3 * 8;
        bytes[offset] = 5;
        let mut reader = BinReader::new(bytes.as_slice(), Endian::Big);
        match Mesh::read_from(&mut reader) {
            Err(MeshError::BadFaceLength(5)) => {}
            other => panic!("expected BadFaceLength, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_truncated_file_is_io_error() {
        let bytes = &triangle_bytes()[..20];
        let mut reader = BinReader::new(bytes, Endian::Big);
        assert!(matches!(
            Mesh::read_from(&mut reader),
            Err(MeshError::Io(_))
        ));
    }

    #[test]
    fn test_little_endian_reader() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        let mut reader = BinReader::new(buf.as_slice(), Endian::Little);
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
    }

    #[test]
    fn test_registry_deduplicates_by_path() {
        let path = std::env::temp_dir().join("fixel_registry_test.mesh");
        std::fs::write(&path, triangle_bytes()).unwrap();

        let mut registry = MeshRegistry::new();
        let a = registry.load(&path).unwrap();
        let b = registry.load(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(a).vertex_count(), 3);

        std::fs::remove_file(&path).ok();
    }
}
