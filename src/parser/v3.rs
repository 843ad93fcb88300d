//! Version 3: keyed-object element schemas and two-endpoint traversals.
//!
//! Identical to v2 except for traversals, which are now described by
//! their start and end combo states and collapse to the runtime form in
//! the traversal constructor.

use super::{
    Document, as_index, as_object, as_str, bool_member, member, optional_array, read_solve_type,
    read_state_pairs, required_array, v2,
};
use crate::core::error::RigError;
use crate::core::traversal::Traversal;
use serde_json::{Map, Value};

pub(super) fn read(obj: &Map<String, Value>) -> Result<Document, RigError> {
    let shapes = v2::read_shapes(required_array(obj, "shapes")?)?;
    let progs = v2::read_progressions(required_array(obj, "progressions")?, shapes.len())?;
    let sliders = v2::read_sliders(required_array(obj, "sliders")?, progs.len())?;
    let combos = v2::read_combos(optional_array(obj, "combos")?, progs.len(), sliders.len())?;
    let traversals =
        read_traversals(optional_array(obj, "traversals")?, progs.len(), sliders.len())?;
    Ok(Document {
        shapes,
        progs,
        sliders,
        combos,
        traversals,
    })
}

fn read_traversals(
    items: &[Value],
    prog_count: usize,
    slider_count: usize,
) -> Result<Vec<Traversal>, RigError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, v) in items.iter().enumerate() {
        let what = format!("traversal {i}");
        let o = as_object(v, &what)?;
        let name = as_str(member(o, "name", &what)?, &format!("{what} name"))?;
        let prog = as_index(member(o, "prog", &what)?, prog_count, &format!("{what} prog"))?;
        let start = read_state_pairs(
            member(o, "start", &what)?,
            slider_count,
            &format!("{what} start"),
        )?;
        let end = read_state_pairs(
            member(o, "end", &what)?,
            slider_count,
            &format!("{what} end"),
        )?;
        let solve_type = read_solve_type(o, &what)?;
        let enabled = bool_member(o, "enabled", true, &what)?;
        out.push(Traversal::from_states(
            name.to_owned(),
            prog,
            enabled,
            &start,
            &end,
            solve_type,
        ));
    }
    Ok(out)
}
