//! Fixed-point scalar arithmetic
//!
//! Integer-backed real numbers standing in for hardware floating point.
//! All geometry math in the pipeline runs on these; the trigonometric and
//! square-root approximations are monotonic and bounded-error rather than
//! bit-exact.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Signed 32-bit fixed-point number with `P` fractional bits.
///
/// `Fx` (12 fractional bits) is used for positions, depths and angles,
/// `FxUv` (16 fractional bits) for texture coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fixed<const P: u32>(i32);

/// Geometry precision: 12 fractional bits.
pub type Fx = Fixed<12>;
/// Texture-coordinate precision: 16 fractional bits.
pub type FxUv = Fixed<16>;

impl<const P: u32> Fixed<P> {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << P);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    pub const PI: Self = Self((std::f64::consts::PI * (1i64 << P) as f64) as i32);
    pub const HALF_PI: Self = Self((std::f64::consts::FRAC_PI_2 * (1i64 << P) as f64) as i32);
    pub const TAU: Self = Self((std::f64::consts::TAU * (1i64 << P) as f64) as i32);

    // Parabolic sine approximation coefficients.
    const SIN_B: Self = Self(((4.0 / std::f64::consts::PI) * (1i64 << P) as f64) as i32);
    const SIN_C: Self =
        Self(((-4.0 / (std::f64::consts::PI * std::f64::consts::PI)) * (1i64 << P) as f64) as i32);
    const SIN_P: Self = Self((0.225 * (1i64 << P) as f64) as i32);

    // Rational arctangent approximation coefficients.
    const ATAN_A: Self = Self((0.97239411 * (1i64 << P) as f64) as i32);
    const ATAN_B: Self = Self((0.19194795 * (1i64 << P) as f64) as i32);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn from_int(v: i32) -> Self {
        Self(v << P)
    }

    /// Conversion from `f32`, for asset-loading boundaries and tests only.
    /// The render path itself never touches floating point.
    pub fn from_f32(v: f32) -> Self {
        Self((v * (1i64 << P) as f32) as i32)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1i64 << P) as f32
    }

    /// Reinterpret at a different precision, shifting the raw value.
    pub fn convert<const Q: u32>(self) -> Fixed<Q> {
        if Q >= P {
            Fixed::<Q>(((self.0 as i64) << (Q - P)) as i32)
        } else {
            Fixed::<Q>(self.0 >> (P - Q))
        }
    }

    pub const fn floor(self) -> i32 {
        self.0 >> P
    }

    pub const fn ceil(self) -> i32 {
        (self.0 + ((1 << P) - 1)) >> P
    }

    pub const fn round(self) -> i32 {
        (self.0 + (1 << (P - 1))) >> P
    }

    pub const fn abs(self) -> Self {
        if self.0 < 0 {
            Self(-self.0)
        } else {
            self
        }
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 < other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self.0 > other.0 {
            self
        } else {
            other
        }
    }

    pub fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + t * (b - a)
    }

    /// Digit-by-digit integer square root.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        let mut val = self.0 as u32;
        let mut res: u32 = 0;
        let mut bit: u32 = 1 << 30;
        while bit > val {
            bit >>= 2;
        }
        while bit != 0 {
            if val >= res + bit {
                val -= res + bit;
                res = (res >> 1) + bit;
            } else {
                res >>= 1;
            }
            bit >>= 2;
        }
        Self((res as i32) << (P / 2))
    }

    /// Parabolic sine approximation, wrapped to [-pi, pi].
    pub fn sin(self) -> Self {
        let mut x = self + Self::PI;
        x = Self(x.0.rem_euclid(Self::TAU.0));
        let x = x - Self::PI;

        let y = Self::SIN_B * x + Self::SIN_C * x * x.abs();
        Self::SIN_P * (y * y.abs() - y) + y
    }

    pub fn cos(self) -> Self {
        (self + Self::HALF_PI).sin()
    }

    /// Rational arctangent approximation with octant fix-ups.
    pub fn atan2(y: Self, x: Self) -> Self {
        if x == Self::ZERO {
            return if y > Self::ZERO {
                Self::HALF_PI
            } else if y < Self::ZERO {
                -Self::HALF_PI
            } else {
                Self::ZERO
            };
        }

        let abs_y = y.abs();
        let mut angle;
        if x.abs() > abs_y {
            let r = abs_y / x.abs();
            let r2 = r * r;
            angle = r * Self::ATAN_A - r * r2 * Self::ATAN_B;
        } else {
            let r = x.abs() / abs_y;
            let r2 = r * r;
            angle = Self::HALF_PI - (r * Self::ATAN_A - r * r2 * Self::ATAN_B);
        }

        if x < Self::ZERO {
            angle = if y < Self::ZERO {
                angle - Self::PI
            } else {
                Self::PI - angle
            };
        } else if y < Self::ZERO {
            angle = -angle;
        }
        angle
    }
}

impl<const P: u32> Add for Fixed<P> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl<const P: u32> Sub for Fixed<P> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl<const P: u32> Mul for Fixed<P> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self((((self.0 as i64) * (rhs.0 as i64)) >> P) as i32)
    }
}

impl<const P: u32> Div for Fixed<P> {
    type Output = Self;
    /// Division by zero is undefined behavior at this layer; callers guard
    /// (projection clamps depth before dividing).
    fn div(self, rhs: Self) -> Self {
        Self((((self.0 as i64) << P) / (rhs.0 as i64)) as i32)
    }
}

impl<const P: u32> Neg for Fixed<P> {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl<const P: u32> Mul<i32> for Fixed<P> {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl<const P: u32> Div<i32> for Fixed<P> {
    type Output = Self;
    fn div(self, rhs: i32) -> Self {
        Self(self.0 / rhs)
    }
}

impl<const P: u32> AddAssign for Fixed<P> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const P: u32> SubAssign for Fixed<P> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const P: u32> MulAssign for Fixed<P> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const P: u32> DivAssign for Fixed<P> {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<const P: u32> fmt::Debug for Fixed<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f32())
    }
}

impl<const P: u32> fmt::Display for Fixed<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f32())
    }
}
