//! Triangulated floater spaces.
//!
//! Floaters are combos whose targets sit strictly inside the signed unit
//! cube, so no corner-based activation rule applies; instead their
//! subspace is triangulated and the input point is resolved to
//! barycentric weights.
//!
//! The orthant containing a group of floaters is implicitly subdivided
//! into `n!` Schläfli orthoschemes, each encoded as a leading `0`
//! followed by a signed permutation of `{1..n}` (the sign carries the
//! orthant's direction along that axis). Orthoschemes containing floater
//! targets are fan-split by those targets at build time; at solve time
//! the input point picks its containing orthoscheme, then the first
//! sub-simplex whose barycentric coordinates are all non-negative, and
//! the member floaters receive those coordinates as values.

use crate::core::combo::Combo;
use crate::math::{self, qr};
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};


/// An integer-encoded orthoscheme or split sub-simplex.
///
/// Entries with magnitude in `1..=n` are signed axes along the monotonic
/// path from the origin; entries `>= n + 1` address user points appended
/// past the cube corners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplexKey(pub Vec<i64>);

impl Hash for SimplexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(math::vec_key_hash(&self.0));
    }
}

/// A group of floaters sharing one slider set and one orthant, with the
/// triangulation of that orthant.
#[derive(Debug, Clone, Default)]
pub struct TriSpace {
    /// Member floaters, as combo indices on the owning container.
    pub floaters: Vec<usize>,
    /// One signed target point per floater.
    user_points: Vec<Vec<f64>>,
    /// Orthoschemes known to contain user points, in discovery order.
    override_simplices: Vec<SimplexKey>,
    /// Sub-simplices each override orthoscheme was split into.
    simplex_map: FxHashMap<SimplexKey, Vec<SimplexKey>>,
}

impl TriSpace {
    /// Create an empty space over the given member floaters.
    #[must_use]
    pub fn new(floaters: Vec<usize>) -> Self {
        TriSpace {
            floaters,
            user_points: Vec::new(),
            override_simplices: Vec::new(),
            simplex_map: FxHashMap::default(),
        }
    }

    /// Number of orthoschemes split by user points.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.override_simplices.len()
    }

    /// Triangulate: collect the member targets as user points, find every
    /// orthoscheme whose closure contains one, fan-split those and store
    /// the re-encoded pieces.
    pub fn build(&mut self, combos: &[Combo]) {
        self.user_points.clear();
        self.override_simplices.clear();
        self.simplex_map.clear();

        for &fi in &self.floaters {
            let Some(c) = combos.get(fi) else { continue };
            self.user_points
                .push(c.state.iter().map(|p| p.value).collect());
        }
        let n = self.user_points.first().map_or(0, Vec::len);
        if n == 0 {
            return;
        }

        // Orthoscheme -> contained user points, in discovery order so the
        // split sequence is deterministic.
        let mut overrides: Vec<(SimplexKey, Vec<usize>)> = Vec::new();
        for (ui, point) in self.user_points.iter().enumerate() {
            for key in point_to_adj_simps(point, math::EPS) {
                match overrides.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, contained)) => contained.push(ui),
                    None => overrides.push((key, vec![ui])),
                }
            }
        }

        for (key, contained) in overrides {
            let ortho = simplex_to_corners(&key, n, &self.user_points);
            let mut subs = vec![ortho.clone()];
            for &ui in &contained {
                subs = split_simplices(&self.user_points[ui], subs);
            }
            let encoded = subs
                .iter()
                .map(|sub| encode_sub(&key, sub, &self.user_points))
                .collect();
            self.simplex_map.insert(key.clone(), encoded);
            self.override_simplices.push(key);
        }
    }

    /// Resolve the current input to barycentric weights on the member
    /// floaters.
    ///
    /// Leaves every floater at rest when the input sits in a different
    /// orthant, on the orthant boundary, or outside every split
    /// orthoscheme.
    pub fn store_value(&self, combos: &mut [Combo], clamped: &[f64], inverted: &[bool]) {
        let Some(&first) = self.floaters.first() else {
            return;
        };
        let (members, orthant): (Vec<usize>, Vec<bool>) = {
            let Some(c) = combos.get(first) else { return };
            (c.state.iter().map(|p| p.slider).collect(), c.inverted.clone())
        };

        let mut q = Vec::with_capacity(members.len());
        for (k, &si) in members.iter().enumerate() {
            let (Some(&cv), Some(&inv)) = (clamped.get(si), inverted.get(si)) else {
                return;
            };
            if inv != orthant[k] {
                return; // wrong orthant: the whole group stays at rest
            }
            if cv == 0.0 {
                return; // on the orthant boundary
            }
            q.push(if inv { -cv } else { cv });
        }

        let major = point_to_simp(&q);
        let Some(subs) = self.simplex_map.get(&major) else {
            return;
        };
        let ortho = simplex_to_corners(&major, q.len(), &self.user_points);
        for sub in subs {
            let (corners, floater_corners) = sub_simplex_corners(sub, &ortho, &self.user_points, q.len());
            let bary = qr::barycentric(&corners, &q);
            if bary.iter().all(|&b| b >= -math::EPS) {
                for (weight, fc) in bary.iter().zip(&floater_corners) {
                    let Some(local) = *fc else { continue };
                    let Some(&combo_idx) = self.floaters.get(local) else {
                        continue;
                    };
                    if let Some(c) = combos.get_mut(combo_idx) {
                        c.ctrl.value = *weight;
                    }
                }
                return; // first accepted sub-simplex wins
            }
        }
    }
}

/// Corner points of an encoded simplex.
///
/// The leading 0 is the origin; each signed axis entry flips one
/// coordinate of the running vector to ±1, tracing a strictly monotonic
/// path from the origin to the orthant corner. Entries `>= n + 1` address
/// appended user points.
pub(crate) fn simplex_to_corners(
    key: &SimplexKey,
    n: usize,
    user_points: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let mut corners = Vec::with_capacity(key.0.len());
    let mut running = vec![0.0; n];
    for &e in &key.0 {
        if e == 0 {
            corners.push(running.clone());
        } else {
            let axis = e.unsigned_abs() as usize;
            if axis <= n {
                running[axis - 1] = if e < 0 { -1.0 } else { 1.0 };
                corners.push(running.clone());
            } else {
                corners.push(
                    user_points
                        .get(axis - n - 1)
                        .cloned()
                        .unwrap_or_else(|| vec![0.0; n]),
                );
            }
        }
    }
    corners
}

/// Corner points of a split sub-simplex, against its parent orthoscheme.
///
/// Splitting preserves corner positions, so a non-user entry takes the
/// parent corner at the same position and a user entry takes its user
/// point. The second return value carries, per corner, the local floater
/// index when the corner is a user point.
pub(crate) fn sub_simplex_corners(
    sub: &SimplexKey,
    ortho_corners: &[Vec<f64>],
    user_points: &[Vec<f64>],
    n: usize,
) -> (Vec<Vec<f64>>, Vec<Option<usize>>) {
    let mut corners = Vec::with_capacity(sub.0.len());
    let mut floater_corners = Vec::with_capacity(sub.0.len());
    for (i, &e) in sub.0.iter().enumerate() {
        let user = usize::try_from(e).ok().filter(|&a| a > n).map(|a| a - n - 1);
        match user {
            Some(u) => {
                corners.push(
                    user_points
                        .get(u)
                        .cloned()
                        .unwrap_or_else(|| vec![0.0; n]),
                );
                floater_corners.push(Some(u));
            }
            None => {
                corners.push(
                    ortho_corners
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| vec![0.0; n]),
                );
                floater_corners.push(None);
            }
        }
    }
    (corners, floater_corners)
}

/// Every orthoscheme whose interior or boundary contains `p`, within
/// `eps`.
///
/// Recursion emits the remaining axis of largest magnitude; axes tied
/// within `eps` branch into every order, and a zero coordinate branches
/// into both signs (zero lies on the boundary between orthants).
pub(crate) fn point_to_adj_simps(p: &[f64], eps: f64) -> Vec<SimplexKey> {
    let mut out = Vec::new();
    let remaining: Vec<usize> = (0..p.len()).collect();
    let mut partial = vec![0_i64];
    adj_recurse(p, eps, &remaining, &mut partial, &mut out);
    out
}

fn adj_recurse(
    p: &[f64],
    eps: f64,
    remaining: &[usize],
    partial: &mut Vec<i64>,
    out: &mut Vec<SimplexKey>,
) {
    if remaining.is_empty() {
        out.push(SimplexKey(partial.clone()));
        return;
    }
    let max = remaining.iter().map(|&a| p[a].abs()).fold(0.0, f64::max);
    for (pos, &axis) in remaining.iter().enumerate() {
        if p[axis].abs() + eps < max {
            continue;
        }
        let mut rest = remaining.to_vec();
        rest.remove(pos);
        let idx = (axis + 1) as i64;
        if p[axis].abs() <= eps {
            for sign in [1_i64, -1] {
                partial.push(sign * idx);
                adj_recurse(p, eps, &rest, partial, out);
                partial.pop();
            }
        } else {
            partial.push(if p[axis] < 0.0 { -idx } else { idx });
            adj_recurse(p, eps, &rest, partial, out);
            partial.pop();
        }
    }
}

/// The orthoscheme whose interior contains `p`: axes in descending order
/// of magnitude, ties broken toward lower axes.
pub(crate) fn point_to_simp(p: &[f64]) -> SimplexKey {
    let mut axes: Vec<usize> = (0..p.len()).collect();
    axes.sort_by(|&a, &b| {
        p[b].abs()
            .partial_cmp(&p[a].abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut enc = Vec::with_capacity(p.len() + 1);
    enc.push(0);
    for a in axes {
        let idx = (a + 1) as i64;
        enc.push(if p[a] < 0.0 { -idx } else { idx });
    }
    SimplexKey(enc)
}

/// Fan-split every simplex containing `p` by `p`, keeping the rest.
///
/// A containing simplex is replaced by the simplices obtained by
/// substituting `p` for each corner in turn, skipping the origin corner
/// (it anchors the progression from rest) and corners with a zero
/// barycentric coordinate (those substitutions are flat).
pub(crate) fn split_simplices(p: &[f64], simps: Vec<Vec<Vec<f64>>>) -> Vec<Vec<Vec<f64>>> {
    let mut out = Vec::new();
    for s in simps {
        let bary = qr::barycentric(&s, p);
        if bary.iter().all(|&b| b >= -math::EPS) {
            for (j, corner) in s.iter().enumerate() {
                if corner.iter().all(|&c| c == 0.0) {
                    continue;
                }
                if math::is_zero(bary[j]) {
                    continue;
                }
                let mut sub = s.clone();
                sub[j] = p.to_vec();
                out.push(sub);
            }
        } else {
            out.push(s);
        }
    }
    out
}

/// Re-encode a split sub-simplex against its parent orthoscheme: corners
/// matching a user point take the appended index, the rest keep the
/// parent entry at their position.
pub(crate) fn encode_sub(key: &SimplexKey, sub: &[Vec<f64>], user_points: &[Vec<f64>]) -> SimplexKey {
    let n = sub.len().saturating_sub(1);
    let mut enc = Vec::with_capacity(sub.len());
    for (i, corner) in sub.iter().enumerate() {
        match user_points.iter().position(|up| points_eq(up, corner)) {
            Some(u) => enc.push((n + 1 + u) as i64),
            None => enc.push(key.0.get(i).copied().unwrap_or(0)),
        }
    }
    SimplexKey(enc)
}

fn points_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| math::float_eq(*x, *y))
}
