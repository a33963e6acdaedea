//! 4x4 transformation matrix using the row-vector convention.
//!
//! # Convention
//! - Vectors are **row vectors** on the left: `v * M`
//! - Translation is stored in the **last row**
//! - Transforms chain **left-to-right**: `v * A * B` applies A first, then B
//!
//! # Example
//! ```ignore
//! let transform = Mat4::scaling(2.0) * Mat4::rotation_z(90.0); // scale, then rotate
//! let result = vertex * transform;
//! ```
//!
//! Rotation helpers take **degrees**.

use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, MulAssign, Sub};

use approx::{AbsDiffEq, RelativeEq};

use super::vec4::Vec4;

/// 4x4 matrix stored as four row vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    rows: [Vec4; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const fn from_rows(a: Vec4, b: Vec4, c: Vec4, d: Vec4) -> Self {
        Self { rows: [a, b, c, d] }
    }

    pub fn new(data: [[f64; 4]; 4]) -> Self {
        let row = |r: [f64; 4]| Vec4::new(r[0], r[1], r[2], r[3]);
        Self::from_rows(row(data[0]), row(data[1]), row(data[2]), row(data[3]))
    }

    /// Diagonal matrix with `d` on every diagonal entry (including row 3).
    pub fn diagonal(d: f64) -> Self {
        Self::new([
            [d, 0.0, 0.0, 0.0],
            [0.0, d, 0.0, 0.0],
            [0.0, 0.0, d, 0.0],
            [0.0, 0.0, 0.0, d],
        ])
    }

    pub fn identity() -> Self {
        Self::diagonal(1.0)
    }

    pub fn zero() -> Self {
        Self::diagonal(0.0)
    }

    /// Creates a translation matrix. Translation lives in the last row.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::identity();
        m.rows[3] = Vec4::point(x, y, z);
        m
    }

    /// Translation by the xyz part of `v`.
    pub fn translation_vec(v: Vec4) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    /// Uniform scale. Row 3 stays homogeneous.
    pub fn scaling(s: f64) -> Self {
        Self::scaling_xyz(s, s, s)
    }

    pub fn scaling_xyz(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Self::identity();
        m.rows[0].x = sx;
        m.rows[1].y = sy;
        m.rows[2].z = sz;
        m
    }

    /// Per-axis scale from the xyz part of `v`.
    pub fn scaling_vec(v: Vec4) -> Self {
        Self::scaling_xyz(v.x, v.y, v.z)
    }

    /// Right-handed rotation around the X axis.
    pub fn rotation_x(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation around the Y axis.
    pub fn rotation_y(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new([
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation around the Z axis.
    pub fn rotation_z(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new([
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Transposes the matrix in place.
    pub fn transpose(&mut self) {
        for row in 0..4 {
            for col in (row + 1)..4 {
                let upper = self.rows[row][col];
                self.rows[row][col] = self.rows[col][row];
                self.rows[col][row] = upper;
            }
        }
    }

    /// Returns a transposed copy.
    pub fn transposed(&self) -> Self {
        let mut m = *self;
        m.transpose();
        m
    }

    pub fn row(&self, row: usize) -> Vec4 {
        self.rows[row]
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    /// Set element at [row][col].
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.rows[row][col] = value;
    }
}

/// Matrix multiplication: `A * B` applies A first, then B (row vectors).
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        Mat4::from_rows(
            self.rows[0] * rhs,
            self.rows[1] * rhs,
            self.rows[2] * rhs,
            self.rows[3] * rhs,
        )
    }
}

impl MulAssign<Mat4> for Mat4 {
    fn mul_assign(&mut self, rhs: Mat4) {
        *self = *self * rhs;
    }
}

/// Matrix times column vector: each component is the dot with one row.
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        Vec4::new(
            self.rows[0].dot(v),
            self.rows[1].dot(v),
            self.rows[2].dot(v),
            self.rows[3].dot(v),
        )
    }
}

impl Mul<f64> for Mat4 {
    type Output = Mat4;

    fn mul(self, c: f64) -> Self::Output {
        Mat4::from_rows(
            self.rows[0] * c,
            self.rows[1] * c,
            self.rows[2] * c,
            self.rows[3] * c,
        )
    }
}

/// # Panics
/// Dividing by zero is a caller bug and panics.
impl Div<f64> for Mat4 {
    type Output = Mat4;

    fn div(self, c: f64) -> Self::Output {
        assert!(c != 0.0, "Mat4 divided by zero");
        self * (1.0 / c)
    }
}

impl Add for Mat4 {
    type Output = Mat4;

    fn add(self, rhs: Mat4) -> Self::Output {
        Mat4::from_rows(
            self.rows[0] + rhs.rows[0],
            self.rows[1] + rhs.rows[1],
            self.rows[2] + rhs.rows[2],
            self.rows[3] + rhs.rows[3],
        )
    }
}

impl Sub for Mat4 {
    type Output = Mat4;

    fn sub(self, rhs: Mat4) -> Self::Output {
        Mat4::from_rows(
            self.rows[0] - rhs.rows[0],
            self.rows[1] - rhs.rows[1],
            self.rows[2] - rhs.rows[2],
            self.rows[3] - rhs.rows[3],
        )
    }
}

impl Index<usize> for Mat4 {
    type Output = Vec4;

    fn index(&self, row: usize) -> &Vec4 {
        &self.rows[row]
    }
}

impl IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, row: usize) -> &mut Vec4 {
        &mut self.rows[row]
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.rows
            .iter()
            .zip(other.rows.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Mat4 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.rows
            .iter()
            .zip(other.rows.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn translation_moves_points_not_directions() {
        let t = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(Vec4::point(0.0, 0.0, 0.0) * t, Vec4::point(1.0, 2.0, 3.0));
        let d = Vec4::direction(1.0, 0.0, 0.0);
        assert_eq!(d * t, d);
    }

    #[test]
    fn composition_applies_left_first() {
        // Scale then translate: (1,0,0) -> (2,0,0) -> (3,0,0)
        let m = Mat4::scaling(2.0) * Mat4::translation(1.0, 0.0, 0.0);
        let p = Vec4::point(1.0, 0.0, 0.0) * m;
        assert_relative_eq!(p, Vec4::point(3.0, 0.0, 0.0));

        // Translate then scale: (1,0,0) -> (2,0,0) -> (4,0,0)
        let m = Mat4::translation(1.0, 0.0, 0.0) * Mat4::scaling(2.0);
        let p = Vec4::point(1.0, 0.0, 0.0) * m;
        assert_relative_eq!(p, Vec4::point(4.0, 0.0, 0.0));
    }

    #[test]
    fn rotation_z_is_right_handed() {
        let p = Vec4::point(1.0, 0.0, 0.0) * Mat4::rotation_z(90.0);
        assert_relative_eq!(p, Vec4::point(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_x_and_y_are_right_handed() {
        let p = Vec4::point(0.0, 1.0, 0.0) * Mat4::rotation_x(90.0);
        assert_relative_eq!(p, Vec4::point(0.0, 0.0, 1.0), epsilon = 1e-12);
        let p = Vec4::point(0.0, 0.0, 1.0) * Mat4::rotation_y(90.0);
        assert_relative_eq!(p, Vec4::point(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn transpose_in_place_swaps_across_diagonal() {
        let mut m = Mat4::translation(1.0, 2.0, 3.0);
        m.transpose();
        assert_eq!(m.get(0, 3), 1.0);
        assert_eq!(m.get(1, 3), 2.0);
        assert_eq!(m.get(2, 3), 3.0);
        assert_eq!(m.get(3, 0), 0.0);
        m.transpose();
        assert_eq!(m, Mat4::translation(1.0, 2.0, 3.0));
    }

    #[test]
    fn uniform_scale_keeps_homogeneous_corner() {
        let m = Mat4::scaling(3.0);
        assert_eq!(m.get(3, 3), 1.0);
        assert_eq!(m.get(1, 1), 3.0);
    }

    #[test]
    #[should_panic(expected = "divided by zero")]
    fn division_by_zero_panics() {
        let _ = Mat4::identity() / 0.0;
    }
}
