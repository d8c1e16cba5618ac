//! Shape classifier and fixed-point polygon fills
//!
//! Quads that project to an axis-aligned rectangle or to a parallelogram
//! with two horizontal or two vertical edges get a specialized fill; the
//! rest split into two triangles. Fills interpolate UV and depth
//! incrementally in fixed point, sample the face's material with wrap or
//! clamp addressing, and resolve overlap per pixel against the shared depth
//! buffer.
//!
//! The fill routines are monomorphized over the face's `TILING` and
//! `SQUARE_UV` flags so the hot loops carry no per-pixel branching; the
//! `dispatch_*` helpers branch once per face.

use crate::camera::DepthBuffer;
use crate::fixed::{Fx, FxUv};
use crate::material::Material;
use crate::math::{Vec2I, Vec2Uv, Vec3Fx};
use crate::texture::Color;

/// A projected, UV-tagged vertex just before rasterization.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexInfo {
    /// Screen-space x/y plus camera-space depth z.
    pub projected: Vec3Fx,
    /// Integer screen coordinate (floor of the projected position).
    pub screen: Vec2I,
    pub uv: Vec2Uv,
}

impl VertexInfo {
    pub fn new(projected: Vec3Fx, uv: Vec2Uv) -> Self {
        Self {
            projected,
            screen: Vec2I::new(projected.x.floor(), projected.y.floor()),
            uv,
        }
    }
}

/// The 2D back-end the rasterizer plots into.
pub trait RenderTarget {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Plot one pixel. Implementations may assume coordinates are in
    /// bounds for calls coming from the fill routines; the default
    /// [`draw_line`](Self::draw_line) clips for itself.
    fn put_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Bresenham line, clipped per pixel.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width() && y >= 0 && y < self.height() {
                self.put_pixel(x, y, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Plain RGBA framebuffer render target
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn pixel_at(&self, x: usize, y: usize) -> Color {
        let idx = (y * self.width + x) * 4;
        Color::with_alpha(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }
}

impl RenderTarget for Framebuffer {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
    }
}

/// Result of probing a quad's projected shape. Parallelogram variants carry
/// the cyclic rotation that put the matching edges into TL/TR/BR/BL roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadShape {
    Rect,
    HorzParallelogram(usize),
    VertParallelogram(usize),
    Split,
}

/// Probe the cyclic vertex rotations for cheap-to-fill edge patterns.
/// Rotations i and i+2 test the same edge pairs, so starting at 1 covers
/// every pattern.
pub fn classify_quad(verts: &[VertexInfo; 4]) -> QuadShape {
    for i0 in 1..4 {
        let tl = verts[i0];
        let tr = verts[(i0 + 1) % 4];
        let br = verts[(i0 + 2) % 4];
        let bl = verts[(i0 + 3) % 4];

        let top_horizontal = tl.screen.y == tr.screen.y;
        let bottom_horizontal = bl.screen.y == br.screen.y;
        let left_vertical = tl.screen.x == bl.screen.x;
        let right_vertical = tr.screen.x == br.screen.x;

        if top_horizontal && bottom_horizontal && left_vertical && right_vertical {
            return QuadShape::Rect;
        } else if top_horizontal && bottom_horizontal {
            return QuadShape::HorzParallelogram(i0);
        } else if left_vertical && right_vertical {
            return QuadShape::VertParallelogram(i0);
        }
    }
    QuadShape::Split
}

/// (x or y, depth, uv) endpoint attributes for one scanline or column.
type EdgePoint = (Fx, Fx, Vec2Uv);

fn edge_at(a: &VertexInfo, b: &VertexInfo, t: Fx) -> EdgePoint {
    let tu: FxUv = t.convert();
    (
        Fx::lerp(a.projected.x, b.projected.x, t),
        Fx::lerp(a.projected.z, b.projected.z, t),
        Vec2Uv::new(
            FxUv::lerp(a.uv.x, b.uv.x, tu),
            FxUv::lerp(a.uv.y, b.uv.y, tu),
        ),
    )
}

/// Fill one scanline between two edge points, stepping depth and UV.
/// `SQUARE_UV` rows sample the material once.
fn fill_span<const TILING: bool, const SQUARE_UV: bool, T: RenderTarget>(
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    y: i32,
    left: EdgePoint,
    right: EdgePoint,
) {
    let ((xl, zl, uvl), (xr, zr, uvr)) = if right.0 < left.0 {
        (right, left)
    } else {
        (left, right)
    };

    let mut ix0 = xl.floor();
    let mut ix1 = xr.floor();
    let w = target.width();
    if ix1 < 0 || ix0 >= w {
        return;
    }

    let span = ix1 - ix0;
    let (dz, du, dv) = if span > 0 {
        (
            (zr - zl) / span,
            (uvr.x - uvl.x) / span,
            (uvr.y - uvl.y) / span,
        )
    } else {
        (Fx::ZERO, FxUv::ZERO, FxUv::ZERO)
    };

    let mut z = zl;
    let mut u = uvl.x;
    let mut v = uvl.y;
    if ix0 < 0 {
        let skip = -ix0;
        z += dz * skip;
        u += du * skip;
        v += dv * skip;
        ix0 = 0;
    }
    if ix1 >= w {
        ix1 = w - 1;
    }

    let row_color = if SQUARE_UV {
        material.sample::<TILING>(u.floor(), v.floor())
    } else {
        Color::BLACK
    };

    for x in ix0..=ix1 {
        if depth.test_and_set(x, y, z) {
            let color = if SQUARE_UV {
                row_color
            } else {
                material.sample::<TILING>(u.floor(), v.floor())
            };
            target.put_pixel(x, y, color);
        }
        z += dz;
        if !SQUARE_UV {
            u += du;
            v += dv;
        }
    }
}

/// Fill one column between two edge points ((y, z, uv) attributes).
fn fill_column<const TILING: bool, T: RenderTarget>(
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    x: i32,
    top: EdgePoint,
    bottom: EdgePoint,
) {
    let ((yt, zt, uvt), (yb, zb, uvb)) = if bottom.0 < top.0 {
        (bottom, top)
    } else {
        (top, bottom)
    };

    let mut iy0 = yt.floor();
    let mut iy1 = yb.floor();
    let h = target.height();
    if iy1 < 0 || iy0 >= h {
        return;
    }

    let span = iy1 - iy0;
    let (dz, du, dv) = if span > 0 {
        (
            (zb - zt) / span,
            (uvb.x - uvt.x) / span,
            (uvb.y - uvt.y) / span,
        )
    } else {
        (Fx::ZERO, FxUv::ZERO, FxUv::ZERO)
    };

    let mut z = zt;
    let mut u = uvt.x;
    let mut v = uvt.y;
    if iy0 < 0 {
        let skip = -iy0;
        z += dz * skip;
        u += du * skip;
        v += dv * skip;
        iy0 = 0;
    }
    if iy1 >= h {
        iy1 = h - 1;
    }

    for y in iy0..=iy1 {
        if depth.test_and_set(x, y, z) {
            target.put_pixel(x, y, material.sample::<TILING>(u.floor(), v.floor()));
        }
        z += dz;
        u += du;
        v += dv;
    }
}

/// Scanline triangle fill.
pub fn draw_triangle<const TILING: bool, T: RenderTarget>(
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    v0: VertexInfo,
    v1: VertexInfo,
    v2: VertexInfo,
) {
    let mut a = v0;
    let mut b = v1;
    let mut c = v2;
    if b.screen.y < a.screen.y {
        std::mem::swap(&mut a, &mut b);
    }
    if c.screen.y < a.screen.y {
        std::mem::swap(&mut a, &mut c);
    }
    if c.screen.y < b.screen.y {
        std::mem::swap(&mut b, &mut c);
    }
    if a.screen.y == c.screen.y {
        return; // zero height
    }

    let y_start = a.screen.y.max(0);
    let y_end = c.screen.y.min(target.height() - 1);

    for y in y_start..=y_end {
        let t_long = Fx::from_int(y - a.screen.y) / Fx::from_int(c.screen.y - a.screen.y);
        let long_point = edge_at(&a, &c, t_long);

        let (e0, e1) = if y < b.screen.y { (&a, &b) } else { (&b, &c) };
        let short_point = if e1.screen.y == e0.screen.y {
            (e1.projected.x, e1.projected.z, e1.uv)
        } else {
            let t = Fx::from_int(y - e0.screen.y) / Fx::from_int(e1.screen.y - e0.screen.y);
            edge_at(e0, e1, t)
        };

        fill_span::<TILING, false, T>(target, depth, material, y, long_point, short_point);
    }
}

/// Axis-aligned rectangle fill. Corner order is whatever the classifier saw;
/// UV and depth gradients are derived from the corner adjacency instead.
pub fn draw_rect<const TILING: bool, const SQUARE_UV: bool, T: RenderTarget>(
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    verts: &[VertexInfo; 4],
) {
    let a = verts[0];
    let hp = match verts
        .iter()
        .find(|v| v.screen.y == a.screen.y && v.screen.x != a.screen.x)
    {
        Some(v) => *v,
        None => return, // degenerate
    };
    let vp = match verts
        .iter()
        .find(|v| v.screen.x == a.screen.x && v.screen.y != a.screen.y)
    {
        Some(v) => *v,
        None => return,
    };

    let dx = hp.screen.x - a.screen.x;
    let dy = vp.screen.y - a.screen.y;
    let dudx = (hp.uv.x - a.uv.x) / dx;
    let dvdx = (hp.uv.y - a.uv.y) / dx;
    let dzdx = (hp.projected.z - a.projected.z) / dx;
    let dudy = (vp.uv.x - a.uv.x) / dy;
    let dvdy = (vp.uv.y - a.uv.y) / dy;
    let dzdy = (vp.projected.z - a.projected.z) / dy;

    let x0 = verts.iter().map(|v| v.screen.x).min().unwrap_or(0).max(0);
    let x1 = verts
        .iter()
        .map(|v| v.screen.x)
        .max()
        .unwrap_or(-1)
        .min(target.width() - 1);
    let y0 = verts.iter().map(|v| v.screen.y).min().unwrap_or(0).max(0);
    let y1 = verts
        .iter()
        .map(|v| v.screen.y)
        .max()
        .unwrap_or(-1)
        .min(target.height() - 1);
    if x1 < x0 || y1 < y0 {
        return;
    }

    let mut row_u = a.uv.x + dudx * (x0 - a.screen.x) + dudy * (y0 - a.screen.y);
    let mut row_v = a.uv.y + dvdx * (x0 - a.screen.x) + dvdy * (y0 - a.screen.y);
    let mut row_z = a.projected.z + dzdx * (x0 - a.screen.x) + dzdy * (y0 - a.screen.y);

    for y in y0..=y1 {
        let mut u = row_u;
        let mut v = row_v;
        let mut z = row_z;
        let row_color = if SQUARE_UV {
            material.sample::<TILING>(u.floor(), v.floor())
        } else {
            Color::BLACK
        };
        for x in x0..=x1 {
            if depth.test_and_set(x, y, z) {
                let color = if SQUARE_UV {
                    row_color
                } else {
                    material.sample::<TILING>(u.floor(), v.floor())
                };
                target.put_pixel(x, y, color);
            }
            z += dzdx;
            if !SQUARE_UV {
                u += dudx;
                v += dvdx;
            }
        }
        row_u += dudy;
        row_v += dvdy;
        row_z += dzdy;
    }
}

/// Parallelogram with horizontal top and bottom edges: one span per row.
pub fn draw_horz_parallelogram<const TILING: bool, const SQUARE_UV: bool, T: RenderTarget>(
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    tl: VertexInfo,
    tr: VertexInfo,
    br: VertexInfo,
    bl: VertexInfo,
) {
    let (tl, tr, br, bl) = if bl.screen.y < tl.screen.y {
        (bl, br, tr, tl)
    } else {
        (tl, tr, br, bl)
    };
    let height = bl.screen.y - tl.screen.y;
    if height == 0 {
        return;
    }

    let y0 = tl.screen.y.max(0);
    let y1 = bl.screen.y.min(target.height() - 1);
    for y in y0..=y1 {
        let t = Fx::from_int(y - tl.screen.y) / Fx::from_int(height);
        let left = edge_at(&tl, &bl, t);
        let right = edge_at(&tr, &br, t);
        fill_span::<TILING, SQUARE_UV, T>(target, depth, material, y, left, right);
    }
}

/// Parallelogram with vertical left and right edges: one column per x step.
pub fn draw_vert_parallelogram<const TILING: bool, const SQUARE_UV: bool, T: RenderTarget>(
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    tl: VertexInfo,
    tr: VertexInfo,
    br: VertexInfo,
    bl: VertexInfo,
) {
    let (tl, tr, br, bl) = if tr.screen.x < tl.screen.x {
        (tr, tl, bl, br)
    } else {
        (tl, tr, br, bl)
    };
    let width = tr.screen.x - tl.screen.x;
    if width == 0 {
        return;
    }

    let x0 = tl.screen.x.max(0);
    let x1 = tr.screen.x.min(target.width() - 1);
    for x in x0..=x1 {
        let t = Fx::from_int(x - tl.screen.x) / Fx::from_int(width);
        let tu: FxUv = t.convert();
        let top_uv = if SQUARE_UV {
            tl.uv
        } else {
            Vec2Uv::new(
                FxUv::lerp(tl.uv.x, tr.uv.x, tu),
                FxUv::lerp(tl.uv.y, tr.uv.y, tu),
            )
        };
        let bottom_uv = if SQUARE_UV {
            bl.uv
        } else {
            Vec2Uv::new(
                FxUv::lerp(bl.uv.x, br.uv.x, tu),
                FxUv::lerp(bl.uv.y, br.uv.y, tu),
            )
        };
        let top = (
            Fx::lerp(tl.projected.y, tr.projected.y, t),
            Fx::lerp(tl.projected.z, tr.projected.z, t),
            top_uv,
        );
        let bottom = (
            Fx::lerp(bl.projected.y, br.projected.y, t),
            Fx::lerp(bl.projected.z, br.projected.z, t),
            bottom_uv,
        );
        fill_column::<TILING, T>(target, depth, material, x, top, bottom);
    }
}

pub fn dispatch_triangle<T: RenderTarget>(
    tiling: bool,
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    v0: VertexInfo,
    v1: VertexInfo,
    v2: VertexInfo,
) {
    if tiling {
        draw_triangle::<true, T>(target, depth, material, v0, v1, v2);
    } else {
        draw_triangle::<false, T>(target, depth, material, v0, v1, v2);
    }
}

pub fn dispatch_rect<T: RenderTarget>(
    tiling: bool,
    square_uv: bool,
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    verts: &[VertexInfo; 4],
) {
    match (tiling, square_uv) {
        (true, true) => draw_rect::<true, true, T>(target, depth, material, verts),
        (true, false) => draw_rect::<true, false, T>(target, depth, material, verts),
        (false, true) => draw_rect::<false, true, T>(target, depth, material, verts),
        (false, false) => draw_rect::<false, false, T>(target, depth, material, verts),
    }
}

pub fn dispatch_horz_parallelogram<T: RenderTarget>(
    tiling: bool,
    square_uv: bool,
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    tl: VertexInfo,
    tr: VertexInfo,
    br: VertexInfo,
    bl: VertexInfo,
) {
    match (tiling, square_uv) {
        (true, true) => {
            draw_horz_parallelogram::<true, true, T>(target, depth, material, tl, tr, br, bl)
        }
        (true, false) => {
            draw_horz_parallelogram::<true, false, T>(target, depth, material, tl, tr, br, bl)
        }
        (false, true) => {
            draw_horz_parallelogram::<false, true, T>(target, depth, material, tl, tr, br, bl)
        }
        (false, false) => {
            draw_horz_parallelogram::<false, false, T>(target, depth, material, tl, tr, br, bl)
        }
    }
}

pub fn dispatch_vert_parallelogram<T: RenderTarget>(
    tiling: bool,
    square_uv: bool,
    target: &mut T,
    depth: &mut DepthBuffer,
    material: &Material,
    tl: VertexInfo,
    tr: VertexInfo,
    br: VertexInfo,
    bl: VertexInfo,
) {
    match (tiling, square_uv) {
        (true, true) => {
            draw_vert_parallelogram::<true, true, T>(target, depth, material, tl, tr, br, bl)
        }
        (true, false) => {
            draw_vert_parallelogram::<true, false, T>(target, depth, material, tl, tr, br, bl)
        }
        (false, true) => {
            draw_vert_parallelogram::<false, true, T>(target, depth, material, tl, tr, br, bl)
        }
        (false, false) => {
            draw_vert_parallelogram::<false, false, T>(target, depth, material, tl, tr, br, bl)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{Rect, Sprite, Texture};
    use std::rc::Rc;

    fn vi(x: i32, y: i32, z: i32, u: f32, v: f32) -> VertexInfo {
        VertexInfo::new(
            Vec3Fx::from_ints(x, y, z),
            Vec2Uv::from_f32s(u, v),
        )
    }

    fn solid_material(color: Color) -> Material {
        let mut tex = Texture::new(8, 8);
        tex.pixels.fill(color);
        Material::new(Sprite::new(Rc::new(tex), Rect::new(0, 0, 8, 8)))
    }

    fn setup(w: usize, h: usize) -> (Framebuffer, DepthBuffer) {
        let mut depth = DepthBuffer::new();
        depth.resize(w as i32, h as i32);
        depth.clear();
        (Framebuffer::new(w, h), depth)
    }

    #[test]
    fn test_classify_axis_rect() {
        let verts = [
            vi(10, 10, 1, 0.0, 0.0),
            vi(20, 10, 1, 1.0, 0.0),
            vi(20, 20, 1, 1.0, 1.0),
            vi(10, 20, 1, 0.0, 1.0),
        ];
        assert_eq!(classify_quad(&verts), QuadShape::Rect);
    }

    #[test]
    fn test_classify_horz_parallelogram() {
        let verts = [
            vi(10, 10, 1, 0.0, 0.0),
            vi(20, 10, 1, 1.0, 0.0),
            vi(25, 20, 1, 1.0, 1.0),
            vi(15, 20, 1, 0.0, 1.0),
        ];
        assert!(matches!(
            classify_quad(&verts),
            QuadShape::HorzParallelogram(_)
        ));
    }

    #[test]
    fn test_classify_vert_parallelogram() {
        let verts = [
            vi(10, 10, 1, 0.0, 0.0),
            vi(20, 13, 1, 1.0, 0.0),
            vi(20, 23, 1, 1.0, 1.0),
            vi(10, 20, 1, 0.0, 1.0),
        ];
        assert!(matches!(
            classify_quad(&verts),
            QuadShape::VertParallelogram(_)
        ));
    }

    #[test]
    fn test_classify_irregular_splits() {
        let verts = [
            vi(10, 10, 1, 0.0, 0.0),
            vi(22, 12, 1, 1.0, 0.0),
            vi(19, 24, 1, 1.0, 1.0),
            vi(8, 21, 1, 0.0, 1.0),
        ];
        assert_eq!(classify_quad(&verts), QuadShape::Split);
    }

    #[test]
    fn test_rect_fill_covers_interior() {
        let (mut fb, mut depth) = setup(32, 32);
        let mat = solid_material(Color::GREEN);
        let verts = [
            vi(4, 4, 2, 0.0, 0.0),
            vi(12, 4, 2, 7.0, 0.0),
            vi(12, 12, 2, 7.0, 7.0),
            vi(4, 12, 2, 0.0, 7.0),
        ];
        draw_rect::<false, false, _>(&mut fb, &mut depth, &mat, &verts);
        assert_eq!(fb.pixel_at(8, 8), Color::GREEN);
        assert_eq!(fb.pixel_at(4, 4), Color::GREEN);
        // Outside stays untouched
        assert_eq!(fb.pixel_at(20, 20), Color::with_alpha(0, 0, 0, 0));
        // Depth recorded
        assert_eq!(depth.depth_at(8, 8), Fx::from_int(2));
    }

    #[test]
    fn test_rect_fill_clips_to_target() {
        let (mut fb, mut depth) = setup(16, 16);
        let mat = solid_material(Color::RED);
        let verts = [
            vi(-8, -8, 2, 0.0, 0.0),
            vi(24, -8, 2, 7.0, 0.0),
            vi(24, 24, 2, 7.0, 7.0),
            vi(-8, 24, 2, 0.0, 7.0),
        ];
        draw_rect::<false, false, _>(&mut fb, &mut depth, &mat, &verts);
        assert_eq!(fb.pixel_at(0, 0), Color::RED);
        assert_eq!(fb.pixel_at(15, 15), Color::RED);
    }

    #[test]
    fn test_triangle_fill_covers_interior() {
        let (mut fb, mut depth) = setup(32, 32);
        let mat = solid_material(Color::BLUE);
        draw_triangle::<false, _>(
            &mut fb,
            &mut depth,
            &mat,
            vi(16, 2, 3, 0.0, 0.0),
            vi(28, 28, 3, 7.0, 7.0),
            vi(4, 28, 3, 0.0, 7.0),
        );
        assert_eq!(fb.pixel_at(16, 16), Color::BLUE);
        assert_eq!(fb.pixel_at(16, 27), Color::BLUE);
        // Corner well outside the triangle
        assert_eq!(fb.pixel_at(1, 2), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_depth_resolves_overlap() {
        let (mut fb, mut depth) = setup(16, 16);
        let near = solid_material(Color::GREEN);
        let far = solid_material(Color::RED);
        let quad = |z: i32, u: f32| {
            [
                vi(2, 2, z, 0.0, 0.0),
                vi(12, 2, z, u, 0.0),
                vi(12, 12, z, u, u),
                vi(2, 12, z, 0.0, u),
            ]
        };
        // Far first, near second: near wins
        draw_rect::<false, false, _>(&mut fb, &mut depth, &far, &quad(10, 7.0));
        draw_rect::<false, false, _>(&mut fb, &mut depth, &near, &quad(5, 7.0));
        assert_eq!(fb.pixel_at(6, 6), Color::GREEN);
        // Drawing something farther afterwards changes nothing
        draw_rect::<false, false, _>(&mut fb, &mut depth, &far, &quad(8, 7.0));
        assert_eq!(fb.pixel_at(6, 6), Color::GREEN);
    }

    #[test]
    fn test_horz_parallelogram_fill() {
        let (mut fb, mut depth) = setup(48, 32);
        let mat = solid_material(Color::WHITE);
        draw_horz_parallelogram::<false, false, _>(
            &mut fb,
            &mut depth,
            &mat,
            vi(8, 4, 2, 0.0, 0.0),
            vi(20, 4, 2, 7.0, 0.0),
            vi(30, 24, 2, 7.0, 7.0),
            vi(18, 24, 2, 0.0, 7.0),
        );
        // Center of the sheared shape
        assert_eq!(fb.pixel_at(19, 14), Color::WHITE);
        // Left of the slanted left edge at the bottom
        assert_eq!(fb.pixel_at(9, 23), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_vert_parallelogram_fill() {
        let (mut fb, mut depth) = setup(48, 48);
        let mat = solid_material(Color::WHITE);
        draw_vert_parallelogram::<false, false, _>(
            &mut fb,
            &mut depth,
            &mat,
            vi(8, 4, 2, 0.0, 0.0),
            vi(24, 12, 2, 7.0, 0.0),
            vi(24, 28, 2, 7.0, 7.0),
            vi(8, 20, 2, 0.0, 7.0),
        );
        assert_eq!(fb.pixel_at(16, 16), Color::WHITE);
        assert_eq!(fb.pixel_at(9, 40), Color::with_alpha(0, 0, 0, 0));
    }

    #[test]
    fn test_tiling_wraps_inside_fill() {
        // 2x1 region: texel 0 white, texel 1 black; UVs span two periods
        let mut tex = Texture::new(2, 1);
        tex.pixels[0] = Color::WHITE;
        tex.pixels[1] = Color::BLACK;
        let mat = Material::new(Sprite::new(Rc::new(tex), Rect::new(0, 0, 2, 1)));

        let (mut fb, mut depth) = setup(8, 4);
        // Baked UVs running 0..4 over a 2-wide region wrap twice
        let verts = [
            vi(0, 0, 2, 0.0, 0.0),
            vi(7, 0, 2, 3.99, 0.0),
            vi(7, 2, 2, 3.99, 0.0),
            vi(0, 2, 2, 0.0, 0.0),
        ];
        draw_rect::<true, false, _>(&mut fb, &mut depth, &mat, &verts);
        assert_eq!(fb.pixel_at(0, 0), Color::WHITE);
        assert_eq!(fb.pixel_at(2, 0), Color::BLACK);
        assert_eq!(fb.pixel_at(4, 0), Color::WHITE);
        assert_eq!(fb.pixel_at(6, 0), Color::BLACK);
    }

    #[test]
    fn test_square_uv_rect_samples_per_row() {
        let mut tex = Texture::new(1, 8);
        for y in 0..8 {
            tex.pixels[y] = Color::new(0, (y * 30) as u8, 0);
        }
        let mat = Material::new(Sprite::new(Rc::new(tex), Rect::new(0, 0, 1, 8)));

        let (mut fb, mut depth) = setup(8, 8);
        let verts = [
            vi(0, 0, 2, 0.0, 0.0),
            vi(7, 0, 2, 0.0, 0.0),
            vi(7, 7, 2, 0.0, 7.0),
            vi(0, 7, 2, 0.0, 7.0),
        ];
        draw_rect::<false, true, _>(&mut fb, &mut depth, &mat, &verts);
        // Every pixel of a row carries that row's single sample
        assert_eq!(fb.pixel_at(0, 3), fb.pixel_at(7, 3));
        assert_ne!(fb.pixel_at(0, 0), fb.pixel_at(0, 7));
    }
}
