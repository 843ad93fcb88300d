//! Traversals: transition shapes between two combo states.
//!
//! A traversal is parameterized along the segment between a start state
//! and an end state, with an independent multiplier gating it by the
//! sliders the two endpoints share. Both the legacy single-controller
//! form and the current two-endpoint form collapse to the same runtime
//! shape.

use crate::core::combo::{self, ComboPair, SolveType};
use crate::core::controller::Controller;
use crate::core::slider::Slider;
use crate::math;
use std::collections::BTreeMap;

/// A legacy progress or multiplier controller reference.
#[derive(Debug, Clone)]
pub enum LegacyControl {
    /// A slider, by index on the owning container.
    Slider(usize),
    /// A combo, by its state list.
    Combo(Vec<ComboPair>),
}

/// A transition shape driven by two combo states.
#[derive(Debug, Clone)]
pub struct Traversal {
    /// Shared controller state.
    pub ctrl: Controller,
    /// Progress origin, one entry per differing slider.
    pub prog_start: Vec<ComboPair>,
    /// Progress extent, aligned with `prog_start`.
    pub prog_delta: Vec<ComboPair>,
    /// Sliders shared by both endpoints; they gate and scale the output.
    pub mult_state: Vec<ComboPair>,
    /// Reduction rule shared by the progress and multiplier sides.
    pub solve_type: SolveType,
    /// Snapshot of the container-wide exact-solve flag.
    pub exact: bool,
}

impl Traversal {
    /// Current-form construction from two endpoint combo states.
    ///
    /// The endpoints' sliders are unioned: a slider present in only one
    /// endpoint ramps from 0 (or back to 0), a slider with differing
    /// values ramps between them, and a slider with equal values in both
    /// endpoints becomes part of the multiplier state.
    #[must_use]
    pub fn from_states(
        name: String,
        prog: usize,
        enabled: bool,
        start: &[ComboPair],
        end: &[ComboPair],
        solve_type: SolveType,
    ) -> Self {
        let mut union: BTreeMap<usize, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for p in start {
            union.entry(p.slider).or_insert((None, None)).0 = Some(p.value);
        }
        for p in end {
            union.entry(p.slider).or_insert((None, None)).1 = Some(p.value);
        }

        let mut prog_start = Vec::new();
        let mut prog_delta = Vec::new();
        let mut mult_state = Vec::new();
        for (slider, ends) in union {
            match ends {
                (None, Some(ev)) => {
                    prog_start.push(ComboPair { slider, value: 0.0 });
                    prog_delta.push(ComboPair { slider, value: ev });
                }
                (Some(sv), None) => {
                    prog_start.push(ComboPair { slider, value: sv });
                    prog_delta.push(ComboPair { slider, value: -sv });
                }
                (Some(sv), Some(ev)) if math::float_eq(sv, ev) => {
                    mult_state.push(ComboPair { slider, value: sv });
                }
                (Some(sv), Some(ev)) => {
                    prog_start.push(ComboPair { slider, value: sv });
                    prog_delta.push(ComboPair { slider, value: ev - sv });
                }
                (None, None) => {}
            }
        }

        Traversal {
            ctrl: Controller::new(name, prog, enabled),
            prog_start,
            prog_delta,
            mult_state,
            solve_type,
            exact: true,
        }
    }

    /// Legacy construction from one progress controller and one
    /// multiplier controller, each either a slider or a combo.
    #[must_use]
    pub fn from_legacy(
        name: String,
        prog: usize,
        enabled: bool,
        progress: LegacyControl,
        progress_flip: bool,
        multiplier: LegacyControl,
        multiplier_flip: bool,
    ) -> Self {
        let mult_state = match multiplier {
            LegacyControl::Slider(slider) => vec![ComboPair {
                slider,
                value: if multiplier_flip { -1.0 } else { 1.0 },
            }],
            LegacyControl::Combo(state) => state,
        };
        let (prog_start, prog_delta) = match progress {
            LegacyControl::Slider(slider) => (
                vec![ComboPair { slider, value: 0.0 }],
                vec![ComboPair {
                    slider,
                    value: if progress_flip { -1.0 } else { 1.0 },
                }],
            ),
            LegacyControl::Combo(state) => (
                state
                    .iter()
                    .map(|p| ComboPair { slider: p.slider, value: 0.0 })
                    .collect(),
                state,
            ),
        };

        Traversal {
            ctrl: Controller::new(name, prog, enabled),
            prog_start,
            prog_delta,
            mult_state,
            solve_type: SolveType::Min,
            exact: true,
        }
    }

    /// Evaluate multiplier and progress from the stored slider values.
    ///
    /// The multiplier is the combo-style reduction of the shared-slider
    /// state (1 when there is none). Progress is each slider's offset
    /// from the start state normalized by its delta, sign-gated and
    /// clamped, then reduced the same way.
    pub fn store_value(&mut self, sliders: &[Slider]) {
        if !self.ctrl.enabled {
            return;
        }
        self.ctrl.multiplier = if self.mult_state.is_empty() {
            1.0
        } else {
            combo::solve_state(&self.mult_state, sliders, self.solve_type, self.exact)
        };

        let mut vals = Vec::with_capacity(self.prog_start.len());
        for (start, delta) in self.prog_start.iter().zip(&self.prog_delta) {
            let Some(slider) = sliders.get(start.slider) else {
                return;
            };
            let v = slider.ctrl.value - start.value;
            if math::is_zero(delta.value) || combo::sign_mismatch(v, delta.value) {
                self.ctrl.value = 0.0;
                return;
            }
            vals.push((v / delta.value).abs().min(1.0));
        }
        self.ctrl.value = combo::reduce(&vals, self.solve_type, self.exact);
    }
}
