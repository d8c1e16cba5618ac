//! Vector math for the fixed-point pipeline

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed, Fx, FxUv};

/// 3D vector over any element type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

/// 2D vector (texture and screen coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

pub type Vec3Fx = Vec3<Fx>;
pub type Vec2Fx = Vec2<Fx>;
pub type Vec2Uv = Vec2<FxUv>;
pub type Vec2I = Vec2<i32>;

impl<T> Vec3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T> Vec2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl Vec3Fx {
    pub const ZERO: Self = Self::new(Fx::ZERO, Fx::ZERO, Fx::ZERO);

    /// All components one (identity scale).
    pub const ONE: Self = Self::new(Fx::ONE, Fx::ONE, Fx::ONE);

    pub fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self::new(Fx::from_int(x), Fx::from_int(y), Fx::from_int(z))
    }

    pub fn dot(self, other: Self) -> Fx {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> Fx {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == Fx::ZERO {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len, self.z / len)
    }
}

impl<const P: u32> Add for Vec3<Fixed<P>> {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<const P: u32> Sub for Vec3<Fixed<P>> {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<const P: u32> Neg for Vec3<Fixed<P>> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<const P: u32> Mul<Fixed<P>> for Vec3<Fixed<P>> {
    type Output = Self;
    fn mul(self, s: Fixed<P>) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl<const P: u32> Mul<i32> for Vec3<Fixed<P>> {
    type Output = Self;
    fn mul(self, s: i32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl<const P: u32> AddAssign for Vec3<Fixed<P>> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<const P: u32> SubAssign for Vec3<Fixed<P>> {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Vec2Uv {
    pub const ZERO: Self = Self::new(FxUv::ZERO, FxUv::ZERO);

    pub fn from_f32s(x: f32, y: f32) -> Self {
        Self::new(FxUv::from_f32(x), FxUv::from_f32(y))
    }
}

impl Vec2Fx {
    pub const ZERO: Self = Self::new(Fx::ZERO, Fx::ZERO);
}

impl<const P: u32> Add for Vec2<Fixed<P>> {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<const P: u32> Sub for Vec2<Fixed<P>> {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<const P: u32> Mul<Fixed<P>> for Vec2<Fixed<P>> {
    type Output = Self;
    fn mul(self, s: Fixed<P>) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}
