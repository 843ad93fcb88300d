//! Numeric utilities shared across the solver.
//!
//! Everything here operates on plain `f64` slices: epsilon comparisons,
//! input rectification, the smoothed minimum used by non-exact combo
//! solves, and the deterministic content hash for integer-vector keys.

pub mod qr;

/// Comparison tolerance used throughout the solver.
pub const EPS: f64 = 1e-6;

/// Float equality within [`EPS`].
#[inline]
#[must_use]
pub fn float_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS
}

/// True when `a` is within [`EPS`] of zero.
#[inline]
#[must_use]
pub fn is_zero(a: f64) -> bool {
    float_eq(a, 0.0)
}

/// True when `a` is on the positive side of zero, zero included.
///
/// Zero is deliberately both positive and negative: a point on an orthant
/// boundary belongs to every adjacent orthant.
#[inline]
#[must_use]
pub fn is_positive(a: f64) -> bool {
    a > -EPS
}

/// True when `a` is on the negative side of zero, zero included.
#[inline]
#[must_use]
pub fn is_negative(a: f64) -> bool {
    a < EPS
}

/// Decompose a signed input vector into magnitudes, magnitudes clamped to
/// 1, and per-component sign flags (`true` = negative).
///
/// The rectified view is produced once per solve call and handed
/// read-only to every controller, so combos and traversals never touch
/// raw sign handling themselves.
#[must_use]
pub fn rectify(raw: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<bool>) {
    let mut values = Vec::with_capacity(raw.len());
    let mut clamped = Vec::with_capacity(raw.len());
    let mut inverted = Vec::with_capacity(raw.len());
    for &r in raw {
        let v = r.abs();
        values.push(v);
        clamped.push(v.min(1.0));
        inverted.push(r < 0.0);
    }
    (values, clamped, inverted)
}

/// Smooth approximation of `min(x, y)`, used when exact solving is off.
///
/// A hard minimum has a velocity discontinuity wherever the operands
/// cross; the smoothing radius `h = 0.025` rounds that corner while
/// keeping `soft_min(1, 1) = 1` exactly. As `h → 0` the function
/// approaches `min`.
#[must_use]
pub fn soft_min(x: f64, y: f64) -> f64 {
    if is_zero(x) || is_zero(y) {
        return 0.0;
    }
    // p = 2, q = 1/p = 0.5
    const H: f64 = 0.025;
    let (x, y) = if x >= y { (x, y) } else { (y, x) };
    let s = H.sqrt();
    let d = 2.0 * ((1.0 + H).sqrt() - s);
    let z = (x * x + H).sqrt() + (y * y + H).sqrt() - ((x - y) * (x - y) + H).sqrt();
    (z - s) / d
}

/// Deterministic content hash for integer-vector keys.
///
/// Fold with seed `0x345678` and multiplier `1000003`, then XOR with the
/// length. Orthoscheme encodings are hashed with this so the simplex map
/// behaves identically across runs and platforms.
#[must_use]
pub fn vec_key_hash(key: &[i64]) -> u64 {
    let mut x: u64 = 0x0034_5678;
    for &v in key {
        x = (x ^ (v as u64)).wrapping_mul(1_000_003);
    }
    x ^ (key.len() as u64)
}
