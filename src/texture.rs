//! Colors, textures and texture regions

use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to [u8; 4] for framebuffer writes
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Integer texel rectangle within a texture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Load a texture from an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Load a texture from raw encoded bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, String> {
        use image::GenericImageView;

        let img = image::load_from_memory(bytes)
            .map_err(|e| format!("Failed to decode image: {}", e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Fetch a texel, clamping out-of-range coordinates to the edge
    pub fn texel(&self, x: i32, y: i32) -> Color {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.pixels[y * self.width + x]
    }
}

/// A region of a shared texture. Textures are immutable once loaded, so
/// sprites hand out cheap clones of the same pixel data.
#[derive(Debug, Clone)]
pub struct Sprite {
    texture: Rc<Texture>,
    rect: Rect,
}

impl Sprite {
    pub fn new(texture: Rc<Texture>, rect: Rect) -> Self {
        Self { texture, rect }
    }

    /// Sprite covering a whole texture
    pub fn from_texture(texture: Rc<Texture>) -> Self {
        let rect = Rect::new(0, 0, texture.width as i32, texture.height as i32);
        Self { texture, rect }
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// A sprite for a sub-region, relative to this sprite's origin
    pub fn sub_sprite(&self, rect: Rect) -> Sprite {
        Sprite {
            texture: Rc::clone(&self.texture),
            rect: Rect::new(self.rect.x + rect.x, self.rect.y + rect.y, rect.w, rect.h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_clamps() {
        let tex = Texture::checkerboard(8, 8, Color::WHITE, Color::BLACK);
        assert_eq!(tex.texel(0, 0), Color::WHITE);
        assert_eq!(tex.texel(-5, 0), tex.texel(0, 0));
        assert_eq!(tex.texel(100, 100), tex.texel(7, 7));
    }

    #[test]
    fn test_sub_sprite_offsets() {
        let tex = Rc::new(Texture::new(32, 32));
        let sprite = Sprite::new(tex, Rect::new(8, 8, 16, 16));
        let sub = sprite.sub_sprite(Rect::new(4, 4, 8, 8));
        assert_eq!(sub.rect(), Rect::new(12, 12, 8, 8));
    }

    #[test]
    fn test_set_rect_retargets_region() {
        let tex = Rc::new(Texture::new(32, 32));
        let mut sprite = Sprite::new(tex, Rect::new(0, 0, 32, 32));
        sprite.set_rect(Rect::new(16, 0, 16, 16));
        assert_eq!(sprite.rect(), Rect::new(16, 0, 16, 16));
        // Sub-sprites are taken from the new origin
        assert_eq!(
            sprite.sub_sprite(Rect::new(4, 4, 8, 8)).rect(),
            Rect::new(20, 4, 8, 8)
        );
    }
}
