//! Version 1: positional-array element schemas.
//!
//! The earliest document format. Shapes are bare strings, everything
//! else is a fixed-position array. v1 predates traversals; a
//! `traversals` member is ignored.

use super::{
    Document, as_array, as_f64, as_index, as_str, check_unique_params, optional_array,
    read_interp, read_state_pairs, required_array,
};
use crate::core::combo::{Combo, SolveType};
use crate::core::error::RigError;
use crate::core::progression::{Interp, ProgPair, Progression};
use crate::core::shape::Shape;
use crate::core::slider::Slider;
use serde_json::{Map, Value};

pub(super) fn read(obj: &Map<String, Value>) -> Result<Document, RigError> {
    let shapes = read_shapes(required_array(obj, "shapes")?)?;
    let progs = read_progressions(required_array(obj, "progressions")?, shapes.len())?;
    let sliders = read_sliders(required_array(obj, "sliders")?, progs.len())?;
    let combos = read_combos(optional_array(obj, "combos")?, progs.len(), sliders.len())?;
    Ok(Document {
        shapes,
        progs,
        sliders,
        combos,
        traversals: Vec::new(),
    })
}

fn read_shapes(items: &[Value]) -> Result<Vec<Shape>, RigError> {
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let name = as_str(v, &format!("shape {i}"))?;
            Ok(Shape::new(name.to_owned(), i))
        })
        .collect()
}

fn read_progressions(items: &[Value], shape_count: usize) -> Result<Vec<Progression>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("progression {i}");
        let arr = as_array(v, &what)?;
        if arr.len() < 3 {
            return Err(RigError::schema(format!(
                "{what} must be [name, shapes, params, interp?]"
            )));
        }
        let name = as_str(&arr[0], &format!("{what} name"))?;
        let shape_idxs = as_array(&arr[1], &format!("{what} shapes"))?;
        let params = as_array(&arr[2], &format!("{what} params"))?;
        if shape_idxs.len() != params.len() {
            return Err(RigError::schema(format!(
                "{what}: shape and parameter arrays differ in length"
            )));
        }
        let mut pairs = Vec::with_capacity(shape_idxs.len());
        for (j, (sv, pv)) in shape_idxs.iter().zip(params).enumerate() {
            pairs.push(ProgPair {
                shape: as_index(sv, shape_count, &format!("{what} shape {j}"))?,
                param: as_f64(pv, &format!("{what} parameter {j}"))?,
            });
        }
        check_unique_params(&pairs, &what)?;
        let interp = match arr.get(3) {
            None => Interp::Spline,
            Some(iv) => read_interp(iv, &what)?,
        };
        out.push(Progression::new(name.to_owned(), interp, pairs));
    }
    Ok(out)
}

fn read_sliders(items: &[Value], prog_count: usize) -> Result<Vec<Slider>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("slider {i}");
        let arr = as_array(v, &what)?;
        if arr.len() != 2 {
            return Err(RigError::schema(format!("{what} must be [name, prog]")));
        }
        let name = as_str(&arr[0], &format!("{what} name"))?;
        let prog = as_index(&arr[1], prog_count, &format!("{what} prog"))?;
        out.push(Slider::new(name.to_owned(), prog, true, i));
    }
    Ok(out)
}

fn read_combos(
    items: &[Value],
    prog_count: usize,
    slider_count: usize,
) -> Result<Vec<Combo>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("combo {i}");
        let arr = as_array(v, &what)?;
        if arr.len() != 3 {
            return Err(RigError::schema(format!(
                "{what} must be [name, prog, pairs]"
            )));
        }
        let name = as_str(&arr[0], &format!("{what} name"))?;
        let prog = as_index(&arr[1], prog_count, &format!("{what} prog"))?;
        let state = read_state_pairs(&arr[2], slider_count, &format!("{what} pairs"))?;
        out.push(Combo::new(name.to_owned(), prog, true, state, SolveType::Min));
    }
    Ok(out)
}
