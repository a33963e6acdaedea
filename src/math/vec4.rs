//! 4D vector for homogeneous coordinates.
//!
//! The same type carries points (`w = 1`), directions (`w = 0`) and RGB
//! colors (components used as 0-255 scalars).

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

use super::mat4::Mat4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// All four components set to `s`.
    pub const fn splat(s: f64) -> Self {
        Self::new(s, s, s, s)
    }

    /// Create a point (w=1) from x, y, z coordinates.
    pub const fn point(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 1.0)
    }

    /// Create a direction vector (w=0) from x, y, z coordinates.
    pub const fn direction(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 0.0)
    }

    /// Create an RGB color. Components are 0-255 scalars, w is unused.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 0.0)
    }

    /// Returns a copy with the w component replaced.
    pub const fn with_w(self, w: f64) -> Self {
        Self::new(self.x, self.y, self.z, w)
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Dot product ignoring w.
    pub fn dot3(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// 3-component cross product. The result is always a direction (w=0).
    pub fn cross(&self, other: Self) -> Self {
        Self::direction(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    pub fn length3(&self) -> f64 {
        self.dot3(*self).sqrt()
    }

    /// Divides all four components by [`Vec4::length`].
    ///
    /// # Panics
    /// Panics if the vector has zero length.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }

    /// Divides by [`Vec4::length3`] and forces w to 0.
    ///
    /// # Panics
    /// Panics if the xyz part has zero length.
    pub fn normalize3(&self) -> Self {
        (*self / self.length3()).with_w(0.0)
    }

    pub fn distance3(&self, other: Self) -> f64 {
        (*self - other).length3()
    }

    pub fn distance(&self, other: Self) -> f64 {
        (*self - other).length()
    }

    /// Divides xyz by w. Vectors with `w == 0` (directions) are returned unchanged.
    pub fn perspective_divide(self) -> Self {
        if self.w != 0.0 && self.w != 1.0 {
            Self::new(self.x / self.w, self.y / self.w, self.z / self.w, 1.0)
        } else {
            self
        }
    }

    /// Linearly interpolate between two vectors.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vec4 {
    type Output = Vec4;

    fn add(self, rhs: Vec4) -> Self::Output {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl AddAssign for Vec4 {
    fn add_assign(&mut self, rhs: Vec4) {
        *self = *self + rhs;
    }
}

impl Sub for Vec4 {
    type Output = Vec4;

    fn sub(self, rhs: Vec4) -> Self::Output {
        Self::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl SubAssign for Vec4 {
    fn sub_assign(&mut self, rhs: Vec4) {
        *self = *self - rhs;
    }
}

/// Componentwise product.
impl Mul<Vec4> for Vec4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Self::Output {
        Self::new(
            self.x * rhs.x,
            self.y * rhs.y,
            self.z * rhs.z,
            self.w * rhs.w,
        )
    }
}

impl Mul<f64> for Vec4 {
    type Output = Vec4;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl MulAssign<f64> for Vec4 {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

/// Row vector times matrix: `v' = v * M`.
impl Mul<Mat4> for Vec4 {
    type Output = Vec4;

    fn mul(self, m: Mat4) -> Self::Output {
        m[0] * self.x + m[1] * self.y + m[2] * self.z + m[3] * self.w
    }
}

impl MulAssign<Mat4> for Vec4 {
    fn mul_assign(&mut self, m: Mat4) {
        *self = *self * m;
    }
}

/// # Panics
/// Dividing by zero is a caller bug and panics.
impl Div<f64> for Vec4 {
    type Output = Vec4;

    fn div(self, rhs: f64) -> Self::Output {
        assert!(rhs != 0.0, "Vec4 divided by zero");
        self * (1.0 / rhs)
    }
}

impl DivAssign<f64> for Vec4 {
    fn div_assign(&mut self, rhs: f64) {
        *self = *self / rhs;
    }
}

impl Neg for Vec4 {
    type Output = Vec4;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Index<usize> for Vec4 {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vec4 index out of range: {i}"),
        }
    }
}

impl IndexMut<usize> for Vec4 {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            3 => &mut self.w,
            _ => panic!("Vec4 index out of range: {i}"),
        }
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

impl AbsDiffEq for Vec4 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
            && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

impl RelativeEq for Vec4 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
            && self.w.relative_eq(&other.w, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_is_a_direction() {
        let a = Vec4::point(1.0, 0.0, 0.0);
        let b = Vec4::point(0.0, 1.0, 0.0);
        assert_eq!(a.cross(b), Vec4::direction(0.0, 0.0, 1.0));
    }

    #[test]
    fn normalize3_forces_w_zero() {
        let n = Vec4::point(3.0, 0.0, 4.0).normalize3();
        assert_relative_eq!(n.length3(), 1.0);
        assert_eq!(n.w, 0.0);
        assert_relative_eq!(n.x, 0.6);
    }

    #[test]
    fn dot3_ignores_w() {
        let a = Vec4::new(1.0, 2.0, 3.0, 10.0);
        let b = Vec4::new(1.0, 1.0, 1.0, 10.0);
        assert_relative_eq!(a.dot3(b), 6.0);
        assert_relative_eq!(a.dot(b), 106.0);
    }

    #[test]
    #[should_panic(expected = "divided by zero")]
    fn division_by_zero_panics() {
        let _ = Vec4::ONE / 0.0;
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_out_of_range_panics() {
        let v = Vec4::ZERO;
        let _value: f64 = v[4];
    }

    #[test]
    fn perspective_divide_leaves_directions() {
        let p = Vec4::new(2.0, 4.0, 6.0, 2.0).perspective_divide();
        assert_eq!(p, Vec4::point(1.0, 2.0, 3.0));
        let d = Vec4::direction(1.0, 2.0, 3.0);
        assert_eq!(d.perspective_divide(), d);
    }
}
