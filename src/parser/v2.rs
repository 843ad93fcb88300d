//! Version 2: keyed-object element schemas and legacy traversals.
//!
//! Shapes, progressions, sliders and combos became keyed objects in this
//! version, and sliders/combos grew an `enabled` flag. Traversals are
//! the legacy single-controller form: a progress controller and a
//! multiplier controller, each either a slider or a combo, with optional
//! flips.

use super::{
    Document, as_object, as_str, bool_member, check_unique_params, member, optional_array,
    read_interp, read_prog_pairs, read_solve_type, read_state_pairs, required_array, as_index,
};
use crate::core::combo::Combo;
use crate::core::error::RigError;
use crate::core::progression::{Interp, Progression};
use crate::core::shape::Shape;
use crate::core::slider::Slider;
use crate::core::traversal::{LegacyControl, Traversal};
use serde_json::{Map, Value};

pub(super) fn read(obj: &Map<String, Value>) -> Result<Document, RigError> {
    let shapes = read_shapes(required_array(obj, "shapes")?)?;
    let progs = read_progressions(required_array(obj, "progressions")?, shapes.len())?;
    let sliders = read_sliders(required_array(obj, "sliders")?, progs.len())?;
    let combos = read_combos(optional_array(obj, "combos")?, progs.len(), sliders.len())?;
    let traversals = read_traversals(
        optional_array(obj, "traversals")?,
        progs.len(),
        sliders.len(),
        &combos,
    )?;
    Ok(Document {
        shapes,
        progs,
        sliders,
        combos,
        traversals,
    })
}

pub(super) fn read_shapes(items: &[Value]) -> Result<Vec<Shape>, RigError> {
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let what = format!("shape {i}");
            let o = as_object(v, &what)?;
            let name = as_str(member(o, "name", &what)?, &format!("{what} name"))?;
            Ok(Shape::new(name.to_owned(), i))
        })
        .collect()
}

pub(super) fn read_progressions(
    items: &[Value],
    shape_count: usize,
) -> Result<Vec<Progression>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("progression {i}");
        let o = as_object(v, &what)?;
        let name = as_str(member(o, "name", &what)?, &format!("{what} name"))?;
        let pairs = read_prog_pairs(
            member(o, "pairs", &what)?,
            shape_count,
            &format!("{what} pairs"),
        )?;
        check_unique_params(&pairs, &what)?;
        let interp = match o.get("interp") {
            None => Interp::Spline,
            Some(iv) => read_interp(iv, &what)?,
        };
        out.push(Progression::new(name.to_owned(), interp, pairs));
    }
    Ok(out)
}

pub(super) fn read_sliders(items: &[Value], prog_count: usize) -> Result<Vec<Slider>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("slider {i}");
        let o = as_object(v, &what)?;
        let name = as_str(member(o, "name", &what)?, &format!("{what} name"))?;
        let prog = as_index(member(o, "prog", &what)?, prog_count, &format!("{what} prog"))?;
        let enabled = bool_member(o, "enabled", true, &what)?;
        out.push(Slider::new(name.to_owned(), prog, enabled, i));
    }
    Ok(out)
}

pub(super) fn read_combos(
    items: &[Value],
    prog_count: usize,
    slider_count: usize,
) -> Result<Vec<Combo>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("combo {i}");
        let o = as_object(v, &what)?;
        let name = as_str(member(o, "name", &what)?, &format!("{what} name"))?;
        let prog = as_index(member(o, "prog", &what)?, prog_count, &format!("{what} prog"))?;
        let state = read_state_pairs(
            member(o, "pairs", &what)?,
            slider_count,
            &format!("{what} pairs"),
        )?;
        let solve_type = read_solve_type(o, &what)?;
        let enabled = bool_member(o, "enabled", true, &what)?;
        out.push(Combo::new(name.to_owned(), prog, enabled, state, solve_type));
    }
    Ok(out)
}

/// A legacy control is a slider when its type string starts with 'S',
/// a combo otherwise.
fn read_control(
    o: &Map<String, Value>,
    type_key: &str,
    control_key: &str,
    slider_count: usize,
    combos: &[Combo],
    what: &str,
) -> Result<LegacyControl, RigError> {
    let kind = as_str(member(o, type_key, what)?, &format!("{what} {type_key}"))?;
    let control = member(o, control_key, what)?;
    if kind.starts_with('S') {
        let idx = as_index(control, slider_count, &format!("{what} {control_key}"))?;
        Ok(LegacyControl::Slider(idx))
    } else {
        let idx = as_index(control, combos.len(), &format!("{what} {control_key}"))?;
        Ok(LegacyControl::Combo(combos[idx].state.clone()))
    }
}

fn read_traversals(
    items: &[Value],
    prog_count: usize,
    slider_count: usize,
    combos: &[Combo],
) -> Result<Vec<Traversal>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("traversal {i}");
        let o = as_object(v, &what)?;
        let name = as_str(member(o, "name", &what)?, &format!("{what} name"))?;
        let prog = as_index(member(o, "prog", &what)?, prog_count, &format!("{what} prog"))?;
        let progress = read_control(o, "progressType", "progressControl", slider_count, combos, &what)?;
        let progress_flip = bool_member(o, "progressFlip", false, &what)?;
        let multiplier = read_control(
            o,
            "multiplierType",
            "multiplierControl",
            slider_count,
            combos,
            &what,
        )?;
        let multiplier_flip = bool_member(o, "multiplierFlip", false, &what)?;
        let enabled = bool_member(o, "enabled", true, &what)?;
        out.push(Traversal::from_legacy(
            name.to_owned(),
            prog,
            enabled,
            progress,
            progress_flip,
            multiplier,
            multiplier_flip,
        ));
    }
    Ok(out)
}
