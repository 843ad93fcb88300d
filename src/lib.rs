#![forbid(unsafe_code)]
//! Blendshape combination solver for facial rigs.
//!
//! Given a vector of slider inputs (FACS-style control values), the
//! solver produces a vector of shape weights for a downstream blendshape
//! deformer. Its job is composing many overlapping controls — extreme
//! shapes, negative/positive variants, in-betweens, combination shapes,
//! transition shapes, and sparsely placed interior combination points —
//! into one coherent weighting of the shape library.
//!
//! # Features
//! - Declarative JSON rig definitions, three backward-compatible schema
//!   versions
//! - Linear, Catmull-Rom and split-spline progressions with in-betweens
//! - Combos with selectable solve rules, exact or smoothed activation
//! - Traversals between arbitrary combo states
//! - Floaters resolved barycentrically inside triangulated subspaces
//!
//! # Usage
//!
//! ```
//! use blendrig::Rig;
//!
//! let definition = r#"{
//!     "encodingVersion": 2,
//!     "shapes": [{"name": "rest"}, {"name": "jawOpen"}],
//!     "progressions": [
//!         {"name": "jawProg", "pairs": [[0, 0.0], [1, 1.0]], "interp": "linear"}
//!     ],
//!     "sliders": [{"name": "jaw", "prog": 0}]
//! }"#;
//!
//! let mut rig = Rig::from_definition(definition).unwrap();
//! let weights = rig.solve(&[0.25]);
//! assert!((weights[1] - 0.25).abs() < 1e-9);
//! ```
//!
//! The solver performs no I/O and holds no host-side state: one
//! definition string in, one weight vector out per call.

mod core;
mod math;
mod parser;
mod trispace;

#[cfg(test)]
mod tests;

// Re-export the public surface from core
pub use core::combo::{Combo, ComboPair, SolveType};
pub use core::controller::Controller;
pub use core::error::RigError;
pub use core::progression::{Interp, ProgPair, Progression};
pub use core::rig::{ParseFailure, Rig};
pub use core::shape::Shape;
pub use core::slider::Slider;
pub use core::traversal::{LegacyControl, Traversal};

// Re-export the numeric helpers hosts tend to want
pub use math::{EPS, rectify, soft_min};
pub use trispace::TriSpace;
