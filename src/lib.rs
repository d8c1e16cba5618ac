//! Fixed-point software 3D renderer
//!
//! A complete integer-only rendering pipeline: meshes are transformed and
//! projected with 12-bit fixed-point math, culled per face, and rasterized
//! with specialized textured fills against a shared depth buffer. Built for
//! targets without an FPU or GPU; the render path never touches floating
//! point (only asset loading converts from `f32`).
//!
//! The usual frame loop:
//!
//! ```no_run
//! use fixel::{Framebuffer, Mesh, RenderContext, Transform, Vec3Fx};
//!
//! let mesh = Mesh::load_file("cube.mesh").unwrap();
//! let mut ctx = RenderContext::new();
//! let mut fb = Framebuffer::new(320, 240);
//!
//! ctx.begin_frame(&Transform::default(), 320, 240);
//! ctx.draw_mesh(&mesh, &Transform::at(Vec3Fx::from_ints(0, 0, 5)), &mut fb, false);
//! ```

pub mod camera;
pub mod fixed;
pub mod loader;
pub mod material;
pub mod math;
pub mod mesh;
pub mod pipeline;
pub mod raster;
pub mod render_buffer;
pub mod renderer;
pub mod texture;
pub mod transform;

pub use camera::{Camera, DepthBuffer};
pub use fixed::{Fixed, Fx, FxUv};
pub use loader::{BinReader, Endian, MeshError, MeshId, MeshRegistry};
pub use material::{Material, MaterialBinding, MaterialSet};
pub use math::{Vec2, Vec2Fx, Vec2I, Vec2Uv, Vec3, Vec3Fx};
pub use mesh::{Face, Mesh, MATERIAL_NONE};
pub use raster::{Framebuffer, QuadShape, RenderTarget, VertexInfo};
pub use render_buffer::RenderBuffer;
pub use renderer::{create_test_cube, MeshRenderer, RenderContext};
pub use texture::{Color, Rect, Sprite, Texture};
pub use transform::Transform;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
