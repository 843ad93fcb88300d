//! The ownership root and solve facade.
//!
//! A `Rig` owns every parsed entity; all cross-entity references are
//! plain indices into its vectors, which are populated only during parse
//! and never resized afterwards. The lifecycle is
//! `clear → parse → build → (solve…)*`; solve is repeatable and resets
//! the controllers' transient state each call.

use crate::core::combo::Combo;
use crate::core::error::RigError;
use crate::core::progression::Progression;
use crate::core::shape::Shape;
use crate::core::slider::Slider;
use crate::core::traversal::Traversal;
use crate::math;
use crate::parser;
use crate::trispace::TriSpace;
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// Recorded outcome of a failed parse, queryable from the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Human-readable message.
    pub message: String,
    /// Byte offset into the definition document, 0 when unknown.
    pub offset: usize,
}

/// The blendshape combination solver.
///
/// Feed it a definition document, build it, then solve once per
/// evaluation tick. A built rig is read-only during `solve` except for
/// the controllers' transient `value`/`multiplier` fields, so concurrent
/// solves on one instance are unsafe; use an instance per thread.
///
/// # Example
///
/// ```
/// use blendrig::Rig;
///
/// let definition = r#"{
///     "encodingVersion": 2,
///     "shapes": [{"name": "rest"}, {"name": "smile"}],
///     "progressions": [
///         {"name": "smileProg", "pairs": [[0, 0.0], [1, 1.0]], "interp": "linear"}
///     ],
///     "sliders": [{"name": "smile", "prog": 0}]
/// }"#;
///
/// let mut rig = Rig::new();
/// rig.parse(definition).unwrap();
/// rig.build();
/// let weights = rig.solve(&[0.5]);
/// assert!((weights[1] - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Rig {
    pub(crate) shapes: Vec<Shape>,
    pub(crate) progs: Vec<Progression>,
    pub(crate) sliders: Vec<Slider>,
    /// All combos, floaters included (flagged).
    pub(crate) combos: Vec<Combo>,
    /// Indices of the floater combos, in definition order.
    pub(crate) floaters: Vec<usize>,
    pub(crate) traversals: Vec<Traversal>,
    pub(crate) spaces: Vec<TriSpace>,
    built: bool,
    loaded: bool,
    exact_solve: bool,
    parse_error: Option<ParseFailure>,
}

impl Default for Rig {
    fn default() -> Self {
        Rig::new()
    }
}

impl Rig {
    /// Create an empty container. Exact solving is on by default
    /// (modeler mode); animation hosts usually turn it off.
    #[must_use]
    pub fn new() -> Self {
        Rig {
            shapes: Vec::new(),
            progs: Vec::new(),
            sliders: Vec::new(),
            combos: Vec::new(),
            floaters: Vec::new(),
            traversals: Vec::new(),
            spaces: Vec::new(),
            built: false,
            loaded: false,
            exact_solve: true,
            parse_error: None,
        }
    }

    /// Parse a definition document and build in one step.
    pub fn from_definition(definition: &str) -> Result<Self, RigError> {
        let mut rig = Rig::new();
        rig.parse(definition)?;
        rig.build();
        Ok(rig)
    }

    /// Parse a definition document into this container.
    ///
    /// The container is cleared first. On failure the error is also
    /// recorded on the container (see [`Rig::parse_error`]) and the
    /// container stays cleared; on success the graph is populated and
    /// the rig is loaded but not yet built.
    pub fn parse(&mut self, definition: &str) -> Result<(), RigError> {
        self.clear();
        match parser::parse_document(definition) {
            Ok(doc) => {
                self.shapes = doc.shapes;
                self.progs = doc.progs;
                self.sliders = doc.sliders;
                self.combos = doc.combos;
                self.traversals = doc.traversals;
                self.floaters = self
                    .combos
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.floater)
                    .map(|(i, _)| i)
                    .collect();
                let exact = self.exact_solve;
                self.propagate_exact(exact);
                self.loaded = true;
                debug!(
                    "parsed definition: {} shapes, {} progressions, {} sliders, {} combos ({} floaters), {} traversals",
                    self.shapes.len(),
                    self.progs.len(),
                    self.sliders.len(),
                    self.combos.len(),
                    self.floaters.len(),
                    self.traversals.len()
                );
                Ok(())
            }
            Err(err) => {
                self.parse_error = Some(ParseFailure {
                    message: err.to_string(),
                    offset: err.offset(),
                });
                Err(err)
            }
        }
    }

    /// Group the floaters into triangulated spaces and triangulate them.
    /// Idempotent after a successful parse.
    pub fn build(&mut self) {
        self.spaces.clear();

        // Group floaters sharing one ordered slider set and one orthant;
        // first-seen order keeps the spaces deterministic.
        let mut index: FxHashMap<(Vec<usize>, Vec<bool>), usize> = FxHashMap::default();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for &fi in &self.floaters {
            let Some(c) = self.combos.get(fi) else { continue };
            let key = (
                c.state.iter().map(|p| p.slider).collect::<Vec<_>>(),
                c.inverted.clone(),
            );
            let gi = *index.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[gi].push(fi);
        }

        for members in groups {
            let mut space = TriSpace::new(members);
            space.build(&self.combos);
            self.spaces.push(space);
        }
        self.built = true;
        debug!(
            "built {} triangulated spaces from {} floaters",
            self.spaces.len(),
            self.floaters.len()
        );
    }

    /// Toggle exact solving at runtime. Propagated to every combo and
    /// traversal so a mid-solve mutation cannot split a frame.
    pub fn set_exact_solve(&mut self, exact: bool) {
        self.exact_solve = exact;
        self.propagate_exact(exact);
    }

    fn propagate_exact(&mut self, exact: bool) {
        for c in &mut self.combos {
            c.exact = exact;
        }
        for t in &mut self.traversals {
            t.exact = exact;
        }
    }

    /// Whether combos resolve to exact minimums (`true`) or the smoothed
    /// approximation (`false`).
    #[must_use]
    pub fn exact_solve(&self) -> bool {
        self.exact_solve
    }

    /// Produce the shape weight vector for one input vector.
    ///
    /// Missing trailing inputs are treated as 0; extra inputs are
    /// ignored. The first weight is the rest shape,
    /// `1 − max(|value · multiplier|)` over all controllers; it may go
    /// negative when a controller is driven past 1, and clamping that is
    /// the host's business.
    pub fn solve(&mut self, input: &[f64]) -> Vec<f64> {
        if !self.built && !self.floaters.is_empty() {
            warn!("solve called before build; floaters will not contribute");
        }

        let mut raw = vec![0.0; self.sliders.len()];
        for (slot, &v) in raw.iter_mut().zip(input) {
            *slot = v;
        }
        let (_values, clamped, inverted) = math::rectify(&raw);

        for s in &mut self.sliders {
            s.ctrl.reset();
        }
        for c in &mut self.combos {
            c.ctrl.reset();
        }
        for t in &mut self.traversals {
            t.ctrl.reset();
        }

        // Commit order matters: sliders feed combos, combos feed spaces,
        // spaces write floaters, traversals read sliders last.
        for s in &mut self.sliders {
            s.store_value(&raw);
        }
        for c in &mut self.combos {
            c.store_value(&self.sliders);
        }
        for space in &self.spaces {
            space.store_value(&mut self.combos, &clamped, &inverted);
        }
        for t in &mut self.traversals {
            t.store_value(&self.sliders);
        }

        let mut output = vec![0.0; self.shapes.len()];
        let mut max_act = 0.0;
        for s in &self.sliders {
            s.ctrl.accumulate(&self.progs, &mut output, &mut max_act);
        }
        for c in &self.combos {
            if !c.floater {
                c.ctrl.accumulate(&self.progs, &mut output, &mut max_act);
            }
        }
        for &fi in &self.floaters {
            if let Some(c) = self.combos.get(fi) {
                c.ctrl.accumulate(&self.progs, &mut output, &mut max_act);
            }
        }
        for t in &self.traversals {
            t.ctrl.accumulate(&self.progs, &mut output, &mut max_act);
        }

        if let Some(rest) = output.first_mut() {
            *rest = 1.0 - max_act;
        }
        output
    }

    /// Reset every controller's transient state without rebuilding.
    pub fn clear_values(&mut self) {
        for s in &mut self.sliders {
            s.ctrl.reset();
        }
        for c in &mut self.combos {
            c.ctrl.reset();
        }
        for t in &mut self.traversals {
            t.ctrl.reset();
        }
    }

    /// Drop all parsed state. The exact-solve preference survives; it is
    /// host configuration, not document state.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.progs.clear();
        self.sliders.clear();
        self.combos.clear();
        self.floaters.clear();
        self.traversals.clear();
        self.spaces.clear();
        self.built = false;
        self.loaded = false;
        self.parse_error = None;
    }

    /// Number of sliders (the expected input length).
    #[must_use]
    pub fn slider_count(&self) -> usize {
        self.sliders.len()
    }

    /// Number of shapes (the output length).
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Shape names in output order.
    #[must_use]
    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes.iter().map(|s| s.name.as_str()).collect()
    }

    /// Slider names in input order.
    #[must_use]
    pub fn slider_names(&self) -> Vec<&str> {
        self.sliders.iter().map(|s| s.ctrl.name.as_str()).collect()
    }

    /// Whether a definition document has been parsed successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the triangulated spaces have been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The failure recorded by the last unsuccessful [`Rig::parse`].
    #[must_use]
    pub fn parse_error(&self) -> Option<&ParseFailure> {
        self.parse_error.as_ref()
    }
}
