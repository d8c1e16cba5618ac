//! Materials: texture regions bound to mesh face slots
//!
//! Mesh files carry no material data; faces reference material slots and the
//! caller binds sprites to those slots after load, either directly or
//! through a RON manifest.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::math::Vec2I;
use crate::mesh::Mesh;
use crate::texture::{Color, Rect, Sprite, Texture};

/// A texture region plus its cached texel bounds, as the rasterizer sees it.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub start: Vec2I,
    pub end: Vec2I,
    pub size: Vec2I,
    pub sprite: Option<Sprite>,
}

impl Material {
    pub fn new(sprite: Sprite) -> Self {
        let rect = sprite.rect();
        Self {
            start: Vec2I::new(rect.x, rect.y),
            end: Vec2I::new(rect.x + rect.w, rect.y + rect.h),
            size: Vec2I::new(rect.w, rect.h),
            sprite: Some(sprite),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.sprite.is_some()
    }

    /// Sample the region at absolute texel coordinates (post-bake UV space).
    /// Tiling wraps into the region, otherwise coordinates clamp to it.
    pub fn sample<const TILING: bool>(&self, tx: i32, ty: i32) -> Color {
        let sprite = match &self.sprite {
            Some(s) => s,
            None => return Color::BLACK,
        };
        let (tx, ty) = if TILING {
            (
                self.start.x + (tx - self.start.x).rem_euclid(self.size.x),
                self.start.y + (ty - self.start.y).rem_euclid(self.size.y),
            )
        } else {
            (
                tx.clamp(self.start.x, self.end.x - 1),
                ty.clamp(self.start.y, self.end.y - 1),
            )
        };
        sprite.texture().texel(tx, ty)
    }
}

/// One manifest entry: a material slot bound to a texture file, optionally
/// restricted to a sub-rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialBinding {
    pub slot: u8,
    pub texture: String,
    #[serde(default)]
    pub rect: Option<Rect>,
}

/// RON manifest describing the material bindings for a mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialSet {
    pub bindings: Vec<MaterialBinding>,
}

impl MaterialSet {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        ron::from_str(&text).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Bind every entry to the mesh. Unloadable textures are logged and
    /// skipped; the slot stays unbound and its faces are not drawn.
    pub fn apply(&self, mesh: &mut Mesh) {
        let mut cache: HashMap<&str, Rc<Texture>> = HashMap::new();
        for binding in &self.bindings {
            let texture = match cache.get(binding.texture.as_str()) {
                Some(t) => Rc::clone(t),
                None => match Texture::from_file(&binding.texture) {
                    Ok(t) => {
                        let t = Rc::new(t);
                        cache.insert(binding.texture.as_str(), Rc::clone(&t));
                        t
                    }
                    Err(e) => {
                        log::warn!("skipping material slot {}: {}", binding.slot, e);
                        continue;
                    }
                },
            };
            let sprite = match binding.rect {
                Some(rect) => Sprite::new(texture, rect),
                None => Sprite::from_texture(texture),
            };
            log::debug!("bound material slot {} to {}", binding.slot, binding.texture);
            mesh.set_material(binding.slot, Material::new(sprite));
        }
    }
}
