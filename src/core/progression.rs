//! Progressions: 1-D interpolation from a scalar parameter to a weighted
//! bag of shapes.
//!
//! Every controller funnels its activation through a progression, which
//! turns the scalar into per-shape weights. Pairs are kept sorted by
//! parameter, and the three interpolation modes share one interval
//! search.

use crate::math;

/// Interpolation mode of a progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interp {
    /// Piecewise-linear between neighboring pairs.
    Linear,
    /// Uniform Catmull-Rom through the pairs, with reflected phantom
    /// endpoints at the boundaries.
    #[default]
    Spline,
    /// Catmull-Rom restricted to the pairs on the same side of zero as
    /// the parameter, so the curve never crosses the origin.
    SplitSpline,
}

impl Interp {
    /// Parse the document string form. `spline` is the document default.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Interp::Linear),
            "spline" => Some(Interp::Spline),
            "splitspline" => Some(Interp::SplitSpline),
            _ => None,
        }
    }
}

/// One (parameter → shape) anchor of a progression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgPair {
    /// Shape index on the owning container.
    pub shape: usize,
    /// Parameter at which this shape is fully expressed.
    pub param: f64,
}

/// Ordered (parameter → shape) pairs with an interpolation mode.
///
/// Weights returned by a single sample need not sum to 1: traversal
/// multipliers scale them freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    /// Display name from the definition document.
    pub name: String,
    /// Interpolation mode.
    pub interp: Interp,
    /// Anchors, sorted by parameter ascending.
    pub pairs: Vec<ProgPair>,
}

impl Progression {
    /// Create a progression; pairs are sorted by parameter.
    #[must_use]
    pub fn new(name: String, interp: Interp, mut pairs: Vec<ProgPair>) -> Self {
        pairs.sort_by(|a, b| a.param.partial_cmp(&b.param).unwrap_or(std::cmp::Ordering::Equal));
        Progression { name, interp, pairs }
    }

    /// Sample the progression at `t`, scaling every weight by `mul`.
    #[must_use]
    pub fn get_output(&self, t: f64, mul: f64) -> Vec<(usize, f64)> {
        match self.interp {
            Interp::Linear => linear(&self.pairs, t, mul),
            Interp::Spline => spline(&self.pairs, t, mul),
            Interp::SplitSpline => {
                // Only the pairs on t's side of zero participate; the
                // rest pair at 0 belongs to both sides.
                let side: Vec<ProgPair> = if t >= 0.0 {
                    self.pairs.iter().copied().filter(|p| p.param >= 0.0).collect()
                } else {
                    self.pairs.iter().copied().filter(|p| p.param <= 0.0).collect()
                };
                spline(&side, t, mul)
            }
        }
    }
}

/// Index `i` with `param[i] <= t < param[i+1]`, clamped to the last legal
/// interval when `t` falls outside the sampled range.
fn interval(pairs: &[ProgPair], t: f64) -> usize {
    let last = pairs.len() - 2;
    for i in 0..=last {
        if t < pairs[i + 1].param {
            return i;
        }
    }
    last
}

fn linear(pairs: &[ProgPair], t: f64, mul: f64) -> Vec<(usize, f64)> {
    match pairs.len() {
        0 => Vec::new(),
        1 => single(pairs[0], t, mul),
        _ => {
            let i = interval(pairs, t);
            let (a, b) = (pairs[i], pairs[i + 1]);
            let u = (t - a.param) / (b.param - a.param);
            vec![(a.shape, mul * (1.0 - u)), (b.shape, mul * u)]
        }
    }
}

/// A lone anchor ramps linearly from the origin: full expression at its
/// parameter, silence on the opposite side of zero.
fn single(pair: ProgPair, t: f64, mul: f64) -> Vec<(usize, f64)> {
    if math::is_zero(pair.param) {
        return vec![(pair.shape, mul)];
    }
    let u = t / pair.param;
    vec![(pair.shape, mul * u.max(0.0))]
}

fn spline(pairs: &[ProgPair], t: f64, mul: f64) -> Vec<(usize, f64)> {
    let n = pairs.len();
    if n <= 2 || t < pairs[0].param || t > pairs[n - 1].param {
        // Too few pairs for a tangent, or outside the sampled range:
        // extrapolate along the end segment.
        return linear(pairs, t, mul);
    }
    let i = interval(pairs, t);
    let u = (t - pairs[i].param) / (pairs[i + 1].param - pairs[i].param);
    let u2 = u * u;
    let u3 = u2 * u;
    let v0 = -0.5 * u3 + u2 - 0.5 * u;
    let v1 = 1.5 * u3 - 2.5 * u2 + 1.0;
    let v2 = -1.5 * u3 + 2.0 * u2 + 0.5 * u;
    let v3 = 0.5 * u3 - 0.5 * u2;
    if i == 0 {
        // Missing left neighbor folded into the first two points
        // (reflection: P₋₁ = 2·P₀ − P₁).
        vec![
            (pairs[0].shape, mul * (v1 + 2.0 * v0)),
            (pairs[1].shape, mul * (v2 - v0)),
            (pairs[2].shape, mul * v3),
        ]
    } else if i == n - 2 {
        // Symmetric fold of the missing right neighbor.
        vec![
            (pairs[i - 1].shape, mul * v0),
            (pairs[i].shape, mul * (v1 - v3)),
            (pairs[i + 1].shape, mul * (v2 + 2.0 * v3)),
        ]
    } else {
        vec![
            (pairs[i - 1].shape, mul * v0),
            (pairs[i].shape, mul * v1),
            (pairs[i + 1].shape, mul * v2),
            (pairs[i + 2].shape, mul * v3),
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic, reason = "Standard test relaxations")]

    use super::*;

    fn prog(interp: Interp, pairs: &[(usize, f64)]) -> Progression {
        Progression::new(
            "p".to_owned(),
            interp,
            pairs.iter().map(|&(shape, param)| ProgPair { shape, param }).collect(),
        )
    }

    fn weight_of(out: &[(usize, f64)], shape: usize) -> f64 {
        out.iter().filter(|(s, _)| *s == shape).map(|(_, w)| w).sum()
    }

    #[test]
    fn test_linear_interval_weights() {
        let p = prog(Interp::Linear, &[(0, 0.0), (1, 0.5), (2, 1.0)]);
        let out = p.get_output(0.75, 1.0);
        assert!((weight_of(&out, 1) - 0.5).abs() < 1e-12);
        assert!((weight_of(&out, 2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_linear_weights_affine_and_sum_to_one() {
        let p = prog(Interp::Linear, &[(0, 0.0), (1, 1.0)]);
        for step in 0..=10 {
            let t = f64::from(step) / 10.0;
            let out = p.get_output(t, 1.0);
            let total: f64 = out.iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-12);
            assert!((weight_of(&out, 1) - t).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_extrapolates_outside_range() {
        let p = prog(Interp::Linear, &[(0, 0.0), (1, 1.0)]);
        let out = p.get_output(1.5, 1.0);
        assert!((weight_of(&out, 1) - 1.5).abs() < 1e-12);
        assert!((weight_of(&out, 0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_pair_ramps_from_origin() {
        let p = prog(Interp::Linear, &[(3, 1.0)]);
        assert!((weight_of(&p.get_output(0.4, 1.0), 3) - 0.4).abs() < 1e-12);
        assert!((weight_of(&p.get_output(1.0, 1.0), 3) - 1.0).abs() < 1e-12);
        // Opposite side of zero stays silent.
        assert_eq!(weight_of(&p.get_output(-1.0, 1.0), 3), 0.0);
    }

    #[test]
    fn test_single_pair_scales_by_mul() {
        let p = prog(Interp::Linear, &[(3, 1.0)]);
        assert!((weight_of(&p.get_output(0.5, 0.5), 3) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_spline_hits_anchors() {
        let p = prog(Interp::Spline, &[(0, 0.0), (1, 0.5), (2, 1.0)]);
        for (t, shape) in [(0.0, 0), (0.5, 1), (1.0, 2)] {
            let out = p.get_output(t, 1.0);
            assert!((weight_of(&out, shape) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_spline_partition_of_unity() {
        let p = prog(Interp::Spline, &[(0, 0.0), (1, 0.25), (2, 0.5), (3, 0.75), (4, 1.0)]);
        for step in 0..=20 {
            let t = f64::from(step) / 20.0;
            let out = p.get_output(t, 1.0);
            let total: f64 = out.iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-12, "sum {} at t {}", total, t);
        }
    }

    #[test]
    fn test_spline_two_pairs_falls_back_to_linear() {
        let p = prog(Interp::Spline, &[(0, 0.0), (1, 1.0)]);
        let out = p.get_output(0.3, 1.0);
        assert!((weight_of(&out, 0) - 0.7).abs() < 1e-12);
        assert!((weight_of(&out, 1) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_split_spline_ignores_other_side() {
        // Negative-side pairs must not bend the positive curve.
        let p = prog(
            Interp::SplitSpline,
            &[(4, -1.0), (3, -0.5), (0, 0.0), (1, 0.5), (2, 1.0)],
        );
        let out = p.get_output(0.25, 1.0);
        assert_eq!(weight_of(&out, 3), 0.0);
        assert_eq!(weight_of(&out, 4), 0.0);
        let total: f64 = out.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_split_spline_negative_side() {
        let p = prog(
            Interp::SplitSpline,
            &[(4, -1.0), (3, -0.5), (0, 0.0), (1, 0.5), (2, 1.0)],
        );
        let out = p.get_output(-0.5, 1.0);
        assert!((weight_of(&out, 3) - 1.0).abs() < 1e-12);
        assert_eq!(weight_of(&out, 1), 0.0);
    }

    #[test]
    fn test_pairs_sorted_on_construction() {
        let p = prog(Interp::Linear, &[(2, 1.0), (0, 0.0), (1, 0.5)]);
        let params: Vec<f64> = p.pairs.iter().map(|x| x.param).collect();
        assert_eq!(params, vec![0.0, 0.5, 1.0]);
    }
}
