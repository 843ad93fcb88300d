//! Dense linear solves for barycentric coordinates.
//!
//! The barycentric systems are tiny (one column per subspace dimension,
//! rarely above six), so a naive dense Householder QR with column
//! pivoting is all the machinery needed. Near-singular systems are not an
//! error here: the factorization returns whatever solution falls out and
//! the caller's non-negativity gate rejects nonsense candidates.

/// Diagonal magnitude below which a pivot is treated as collapsed.
const TINY: f64 = 1e-12;

/// Solve `M · x = b` where `columns` holds the square matrix `M` one
/// column at a time.
///
/// Householder QR with column pivoting. Consumes its inputs as scratch
/// space. Rank-deficient pivots contribute 0 to the solution.
#[must_use]
pub fn solve(columns: &mut [Vec<f64>], b: &mut [f64]) -> Vec<f64> {
    let n = b.len();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // Pivot on the column with the largest remaining norm.
        let mut best = k;
        let mut best_norm = 0.0_f64;
        for j in k..n {
            let norm: f64 = columns[j][k..].iter().map(|v| v * v).sum();
            if norm > best_norm {
                best_norm = norm;
                best = j;
            }
        }
        columns.swap(k, best);
        perm.swap(k, best);

        if best_norm.sqrt() < TINY {
            // Remaining block is numerically zero; nothing to reflect.
            continue;
        }

        // Householder reflection zeroing rows k+1.. of column k.
        let alpha = if columns[k][k] > 0.0 {
            -best_norm.sqrt()
        } else {
            best_norm.sqrt()
        };
        let mut v: Vec<f64> = columns[k][k..].to_vec();
        v[0] -= alpha;
        let vnorm2: f64 = v.iter().map(|x| x * x).sum();
        if vnorm2 < TINY {
            columns[k][k] = alpha;
            continue;
        }
        for j in k..n {
            let dot: f64 = v.iter().zip(&columns[j][k..]).map(|(vi, ci)| vi * ci).sum();
            let f = 2.0 * dot / vnorm2;
            for (vi, ci) in v.iter().zip(&mut columns[j][k..]) {
                *ci -= f * vi;
            }
        }
        let dot: f64 = v.iter().zip(&b[k..]).map(|(vi, bi)| vi * bi).sum();
        let f = 2.0 * dot / vnorm2;
        for (vi, bi) in v.iter().zip(&mut b[k..]) {
            *bi -= f * vi;
        }
        columns[k][k] = alpha;
    }

    // Back substitution on R, then undo the column permutation.
    let mut y = vec![0.0; n];
    for i in (0..n).rev() {
        let mut s = b[i];
        for j in (i + 1)..n {
            s -= columns[j][i] * y[j];
        }
        let d = columns[i][i];
        y[i] = if d.abs() > TINY { s / d } else { 0.0 };
    }
    let mut x = vec![0.0; n];
    for (k, &p) in perm.iter().enumerate() {
        x[p] = y[k];
    }
    x
}

/// Barycentric coordinates of `p` in the simplex spanned by `corners`
/// (`n + 1` corners in ℝⁿ).
///
/// Column `j` of the system is `cornerⱼ − cornerₙ` and the right-hand
/// side is `p − cornerₙ`; the final coordinate is `1 − Σxⱼ`, so the
/// returned coordinates always sum to 1.
#[must_use]
pub fn barycentric(corners: &[Vec<f64>], p: &[f64]) -> Vec<f64> {
    let n = p.len();
    let last = &corners[n];
    let mut columns: Vec<Vec<f64>> = corners[..n]
        .iter()
        .map(|c| c.iter().zip(last).map(|(ci, li)| ci - li).collect())
        .collect();
    let mut b: Vec<f64> = p.iter().zip(last).map(|(pi, li)| pi - li).collect();
    let mut coords = solve(&mut columns, &mut b);
    let s: f64 = coords.iter().sum();
    coords.push(1.0 - s);
    coords
}
