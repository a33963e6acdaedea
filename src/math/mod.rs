//! Homogeneous vector/matrix kernel and screen-space geometry helpers.

pub mod intersect;
pub mod mat4;
pub mod vec4;

/// Tolerance for near-zero lengths and near-parallel tests.
pub const EPSILON: f64 = 1e-8;

/// Binomial coefficient `C(n, k)` computed iteratively in floating point.
///
/// Avoids evaluating full factorials, which overflow for modest `n`.
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * f64::from(n - i) / f64::from(i + 1))
}
