//! Combos: scalar activations from conjunctions of slider targets.
//!
//! A combo fires when every slider in its state list moves toward its
//! target. The reduction of the per-slider activations to one scalar is
//! selectable per combo and shared with traversals (`reduce`).

use crate::core::controller::Controller;
use crate::core::slider::Slider;
use crate::math;

/// How a combo reduces its per-slider activations to one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveType {
    /// Smallest activation; smoothed unless exact solving is on.
    #[default]
    Min,
    /// Product of all activations.
    AllMul,
    /// Product of the two extremes.
    ExtMul,
    /// `2·max·min / (max + min)`, 0 when the denominator collapses.
    MulAvgExt,
    /// `n · Π / Σ` over all activations, 0 when the sum collapses.
    MulAvgAll,
}

impl SolveType {
    /// Parse the document string form. `None` is the historical spelling
    /// of the default minimum rule.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" | "None" => Some(SolveType::Min),
            "allMul" => Some(SolveType::AllMul),
            "extMul" => Some(SolveType::ExtMul),
            "mulAvgExt" => Some(SolveType::MulAvgExt),
            "mulAvgAll" => Some(SolveType::MulAvgAll),
            _ => None,
        }
    }
}

/// One (slider, target) conjunct of a combo or traversal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboPair {
    /// Slider index on the owning container.
    pub slider: usize,
    /// Signed value the slider is expected to reach.
    pub value: f64,
}

/// A conjunction of slider targets driving one progression.
///
/// Combos whose targets all sit at ±1 activate through their own
/// `store_value`; combos with strictly interior targets are floaters and
/// receive their value from the triangulated space that owns them.
#[derive(Debug, Clone)]
pub struct Combo {
    /// Shared controller state.
    pub ctrl: Controller,
    /// (slider, target) pairs, sorted by slider index.
    pub state: Vec<ComboPair>,
    /// Floaters defer their value to a triangulated space.
    pub floater: bool,
    /// Reduction rule for the per-slider activations.
    pub solve_type: SolveType,
    /// Snapshot of the container-wide exact-solve flag.
    pub exact: bool,
    /// Cached target magnitudes, clamped to 1.
    pub clamped: Vec<f64>,
    /// Cached target signs (`true` = negative): the combo's orthant.
    pub inverted: Vec<bool>,
}

impl Combo {
    /// Create a combo; the state list is sorted by slider index and the
    /// floater flag is derived from the targets (any magnitude that is
    /// neither 0 nor 1 makes the combo a floater).
    #[must_use]
    pub fn new(
        name: String,
        prog: usize,
        enabled: bool,
        mut state: Vec<ComboPair>,
        solve_type: SolveType,
    ) -> Self {
        state.sort_by_key(|p| p.slider);
        let floater = state
            .iter()
            .any(|p| !math::float_eq(p.value.abs(), 1.0) && !math::is_zero(p.value));
        let clamped = state.iter().map(|p| p.value.abs().min(1.0)).collect();
        let inverted = state.iter().map(|p| p.value < 0.0).collect();
        Combo {
            ctrl: Controller::new(name, prog, enabled),
            state,
            floater,
            solve_type,
            exact: true,
            clamped,
            inverted,
        }
    }

    /// Reduce the stored slider values to this combo's activation.
    ///
    /// Floaters are skipped: their value is written by the triangulated
    /// space that owns them.
    pub fn store_value(&mut self, sliders: &[Slider]) {
        if !self.ctrl.enabled || self.floater {
            return;
        }
        self.ctrl.value = solve_state(&self.state, sliders, self.solve_type, self.exact);
    }
}

/// True when `v` is on the wrong side of zero for `target` (zero counts
/// as positive).
pub(crate) fn sign_mismatch(v: f64, target: f64) -> bool {
    if target < 0.0 {
        !math::is_negative(v)
    } else {
        !math::is_positive(v)
    }
}

/// Combo-style reduction of a (slider, target) state list: sign-gate each
/// slider against its target, clamp the magnitudes to 1, reduce.
///
/// Also used for traversal multipliers, which are combo states by
/// construction.
pub(crate) fn solve_state(
    state: &[ComboPair],
    sliders: &[Slider],
    solve_type: SolveType,
    exact: bool,
) -> f64 {
    let mut vals = Vec::with_capacity(state.len());
    for pair in state {
        let Some(slider) = sliders.get(pair.slider) else {
            return 0.0;
        };
        let v = slider.ctrl.value;
        if sign_mismatch(v, pair.value) {
            return 0.0;
        }
        vals.push(v.abs().min(1.0));
    }
    reduce(&vals, solve_type, exact)
}

/// Reduce per-slider activations to one scalar.
pub(crate) fn reduce(vals: &[f64], solve_type: SolveType, exact: bool) -> f64 {
    if vals.is_empty() {
        return 0.0;
    }
    let mut mn = f64::INFINITY;
    let mut mx = f64::NEG_INFINITY;
    let mut prod = 1.0;
    let mut sum = 0.0;
    for &v in vals {
        mn = mn.min(v);
        mx = mx.max(v);
        prod *= v;
        sum += v;
    }
    match solve_type {
        SolveType::Min => {
            if exact {
                mn
            } else {
                math::soft_min(mx, mn)
            }
        }
        SolveType::AllMul => prod,
        SolveType::ExtMul => mx * mn,
        SolveType::MulAvgExt => {
            let den = mx + mn;
            if math::is_zero(den) { 0.0 } else { 2.0 * mx * mn / den }
        }
        SolveType::MulAvgAll => {
            if math::is_zero(sum) {
                0.0
            } else {
                vals.len() as f64 * prod / sum
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic, reason = "Standard test relaxations")]

    use super::*;

    fn sliders_with_values(values: &[f64]) -> Vec<Slider> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut s = Slider::new(format!("s{i}"), 0, true, i);
                s.ctrl.value = v;
                s
            })
            .collect()
    }

    fn combo(targets: &[f64], solve_type: SolveType, exact: bool) -> Combo {
        let state = targets
            .iter()
            .enumerate()
            .map(|(i, &value)| ComboPair { slider: i, value })
            .collect();
        let mut c = Combo::new("c".to_owned(), 0, true, state, solve_type);
        c.exact = exact;
        c
    }

    #[test]
    fn test_floater_flag_derivation() {
        assert!(!combo(&[1.0, -1.0], SolveType::Min, true).floater);
        assert!(combo(&[0.5, 1.0], SolveType::Min, true).floater);
        // A zero target alone does not make a floater.
        assert!(!combo(&[1.0, 0.0], SolveType::Min, true).floater);
    }

    #[test]
    fn test_state_sorted_by_slider() {
        let state = vec![
            ComboPair { slider: 2, value: 1.0 },
            ComboPair { slider: 0, value: 1.0 },
        ];
        let c = Combo::new("c".to_owned(), 0, true, state, SolveType::Min);
        assert_eq!(c.state[0].slider, 0);
        assert_eq!(c.state[1].slider, 2);
    }

    #[test]
    fn test_min_exact() {
        let sliders = sliders_with_values(&[1.0, 0.4]);
        let mut c = combo(&[1.0, 1.0], SolveType::Min, true);
        c.store_value(&sliders);
        assert!((c.ctrl.value - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_min_exact_unit_corner() {
        let sliders = sliders_with_values(&[1.0, 1.0]);
        let mut c = combo(&[1.0, 1.0], SolveType::Min, true);
        c.store_value(&sliders);
        assert_eq!(c.ctrl.value, 1.0);
    }

    #[test]
    fn test_min_soft_near_corner() {
        let sliders = sliders_with_values(&[1.0, 1.0]);
        let mut c = combo(&[1.0, 1.0], SolveType::Min, false);
        c.store_value(&sliders);
        assert!(c.ctrl.value > 0.99 && c.ctrl.value <= 1.0);
    }

    #[test]
    fn test_sign_mismatch_deactivates() {
        let sliders = sliders_with_values(&[1.0, -1.0]);
        let mut c = combo(&[1.0, 1.0], SolveType::Min, true);
        c.ctrl.value = 0.7;
        c.store_value(&sliders);
        assert_eq!(c.ctrl.value, 0.0);
    }

    #[test]
    fn test_negative_orthant_combo() {
        let sliders = sliders_with_values(&[-0.6, 1.0]);
        let mut c = combo(&[-1.0, 1.0], SolveType::Min, true);
        c.store_value(&sliders);
        assert!((c.ctrl.value - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_magnitudes_clamped_to_one() {
        let sliders = sliders_with_values(&[1.8, 0.5]);
        let mut c = combo(&[1.0, 1.0], SolveType::AllMul, true);
        c.store_value(&sliders);
        assert!((c.ctrl.value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_solve_type_table() {
        let vals = [0.5, 0.8, 0.25];
        let mn = 0.25;
        let mx = 0.8;
        let prod = 0.5 * 0.8 * 0.25;
        let sum = 0.5 + 0.8 + 0.25;
        assert!((reduce(&vals, SolveType::Min, true) - mn).abs() < 1e-12);
        assert!((reduce(&vals, SolveType::AllMul, true) - prod).abs() < 1e-12);
        assert!((reduce(&vals, SolveType::ExtMul, true) - mx * mn).abs() < 1e-12);
        assert!(
            (reduce(&vals, SolveType::MulAvgExt, true) - 2.0 * mx * mn / (mx + mn)).abs() < 1e-12
        );
        assert!((reduce(&vals, SolveType::MulAvgAll, true) - 3.0 * prod / sum).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_combo_stays_at_rest() {
        let sliders = sliders_with_values(&[1.0, 1.0]);
        let mut c = combo(&[1.0, 1.0], SolveType::Min, true);
        c.ctrl.enabled = false;
        c.store_value(&sliders);
        assert_eq!(c.ctrl.value, 0.0);
    }

    #[test]
    fn test_floater_store_value_is_noop() {
        let sliders = sliders_with_values(&[0.5, 0.5]);
        let mut c = combo(&[0.5, 0.5], SolveType::Min, true);
        assert!(c.floater);
        c.ctrl.value = 0.33;
        c.store_value(&sliders);
        assert_eq!(c.ctrl.value, 0.33);
    }

    #[test]
    fn test_solve_type_names() {
        assert_eq!(SolveType::from_name("min"), Some(SolveType::Min));
        assert_eq!(SolveType::from_name("None"), Some(SolveType::Min));
        assert_eq!(SolveType::from_name("allMul"), Some(SolveType::AllMul));
        assert_eq!(SolveType::from_name("extMul"), Some(SolveType::ExtMul));
        assert_eq!(SolveType::from_name("mulAvgExt"), Some(SolveType::MulAvgExt));
        assert_eq!(SolveType::from_name("mulAvgAll"), Some(SolveType::MulAvgAll));
        assert_eq!(SolveType::from_name("bogus"), None);
    }
}
