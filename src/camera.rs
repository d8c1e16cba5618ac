//! Camera view state and the shared depth buffer

use crate::fixed::Fx;
use crate::math::{Vec2Fx, Vec3Fx};
use crate::transform::Transform;

/// Per-pixel record of the nearest depth seen so far. Reallocated only when
/// the resolution changes; cleared to the maximum sentinel every frame.
pub struct DepthBuffer {
    data: Vec<Fx>,
    width: i32,
    height: i32,
}

impl DepthBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Reallocate if the resolution changed. Contents are unspecified until
    /// the next [`clear`](Self::clear).
    pub fn resize(&mut self, width: i32, height: i32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.data = vec![Fx::MAX; (width * height) as usize];
    }

    pub fn clear(&mut self) {
        self.data.fill(Fx::MAX);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Fx {
        self.data[(y * self.width + x) as usize]
    }

    /// Nearer-fragment-wins test. Returns true (and records the depth) when
    /// `z` is strictly nearer than the stored value. Coordinates must be in
    /// bounds; the fills clip before calling.
    #[inline]
    pub fn test_and_set(&mut self, x: i32, y: i32, z: Fx) -> bool {
        let idx = (y * self.width + x) as usize;
        if z < self.data[idx] {
            self.data[idx] = z;
            true
        } else {
            false
        }
    }
}

impl Default for DepthBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// View-space camera state: an orientation cosine/sine cache and a world
/// position snapshot captured once per render pass (not per mesh), a 2D
/// projection offset (shake effects), and the depth buffer every mesh drawn
/// through this camera shares.
pub struct Camera {
    pub(crate) cos: Vec3Fx,
    pub(crate) sin: Vec3Fx,
    pub(crate) position: Vec3Fx,
    pub offset_projection: Vec2Fx,
    screen_width: i32,
    screen_height: i32,
    depth: DepthBuffer,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            cos: Vec3Fx::from_ints(1, 1, 1),
            sin: Vec3Fx::ZERO,
            position: Vec3Fx::ZERO,
            offset_projection: Vec2Fx::ZERO,
            screen_width: 0,
            screen_height: 0,
            depth: DepthBuffer::new(),
        }
    }

    /// Snapshot the camera transform for this pass and prepare the depth
    /// buffer: reallocate on resolution change, then clear.
    pub fn begin_frame(&mut self, transform: &Transform, screen_width: i32, screen_height: i32) {
        let rotation = transform.rotation();
        self.cos = Vec3Fx::new(rotation.x.cos(), rotation.y.cos(), rotation.z.cos());
        self.sin = Vec3Fx::new(rotation.x.sin(), rotation.y.sin(), rotation.z.sin());
        self.position = transform.position();
        self.screen_width = screen_width;
        self.screen_height = screen_height;
        self.depth.resize(screen_width, screen_height);
        self.depth.clear();
    }

    pub fn position(&self) -> Vec3Fx {
        self.position
    }

    pub fn screen_width(&self) -> i32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> i32 {
        self.screen_height
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn depth_buffer_mut(&mut self) -> &mut DepthBuffer {
        &mut self.depth
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_buffer_resize_and_clear() {
        let mut depth = DepthBuffer::new();
        depth.resize(396, 224);
        depth.clear();
        assert_eq!(depth.len(), 396 * 224);
        depth.resize(792, 448);
        depth.clear();
        assert_eq!(depth.len(), 792 * 448);
        assert_eq!(depth.depth_at(0, 0), Fx::MAX);
        assert_eq!(depth.depth_at(791, 447), Fx::MAX);
    }

    #[test]
    fn test_depth_buffer_resize_same_size_keeps_allocation() {
        let mut depth = DepthBuffer::new();
        depth.resize(64, 64);
        depth.clear();
        depth.test_and_set(3, 3, Fx::from_int(5));
        depth.resize(64, 64);
        // Same resolution: no reallocation, contents untouched
        assert_eq!(depth.depth_at(3, 3), Fx::from_int(5));
    }

    #[test]
    fn test_nearer_fragment_wins() {
        let mut depth = DepthBuffer::new();
        depth.resize(8, 8);
        depth.clear();
        assert!(depth.test_and_set(2, 2, Fx::from_int(10)));
        assert!(!depth.test_and_set(2, 2, Fx::from_int(12)));
        assert!(depth.test_and_set(2, 2, Fx::from_int(7)));
        assert_eq!(depth.depth_at(2, 2), Fx::from_int(7));
    }

    #[test]
    fn test_begin_frame_snapshots_transform() {
        let mut camera = Camera::new();
        let mut t = Transform::default();
        t.position = Vec3Fx::from_ints(1, 2, 3);
        camera.begin_frame(&t, 320, 240);
        assert_eq!(camera.position(), Vec3Fx::from_ints(1, 2, 3));
        assert_eq!(camera.screen_width(), 320);
        assert_eq!(camera.depth_buffer().len(), 320 * 240);
        // Identity rotation: cos 1, sin 0 within approximation error
        assert!((camera.cos.x - Fx::ONE).abs() < Fx::from_f32(0.02));
        assert!(camera.sin.x.abs() < Fx::from_f32(0.02));
    }
}
