//! Definition-document parsing.
//!
//! Three backward-compatible schema versions produce one internal graph:
//! v1 is positional arrays, v2 keyed objects with legacy traversals, v3
//! keyed objects with two-endpoint traversals. A failure at any element
//! is fatal for the whole document; the caller records the message and
//! byte offset and leaves the container cleared.

mod v1;
mod v2;
mod v3;

use crate::core::combo::{Combo, ComboPair, SolveType};
use crate::core::error::RigError;
use crate::core::progression::{Interp, ProgPair, Progression};
use crate::core::shape::Shape;
use crate::core::slider::Slider;
use crate::core::traversal::Traversal;
use crate::math;
use serde_json::{Map, Value};

/// Everything a successfully parsed definition document produces.
pub(crate) struct Document {
    pub shapes: Vec<Shape>,
    pub progs: Vec<Progression>,
    pub sliders: Vec<Slider>,
    pub combos: Vec<Combo>,
    pub traversals: Vec<Traversal>,
}

/// Parse a definition document, dispatching on `encodingVersion`
/// (default 1).
pub(crate) fn parse_document(text: &str) -> Result<Document, RigError> {
    let root: Value = serde_json::from_str(text).map_err(|e| {
        let offset = byte_offset(text, e.line(), e.column());
        RigError::malformed(e.to_string(), offset)
    })?;
    let obj = root
        .as_object()
        .ok_or_else(|| RigError::schema("definition root must be an object"))?;
    let version = match obj.get("encodingVersion") {
        None => 1,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| RigError::schema("encodingVersion must be an unsigned integer"))?,
    };
    match version {
        1 => v1::read(obj),
        2 => v2::read(obj),
        3 => v3::read(obj),
        version => Err(RigError::UnsupportedEncoding { version }),
    }
}

/// Translate serde_json's 1-based line/column into a byte offset.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    if line <= 1 {
        return column.saturating_sub(1);
    }
    let mut newlines = line - 1;
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            start = i + 1;
            newlines -= 1;
            if newlines == 0 {
                break;
            }
        }
    }
    start + column.saturating_sub(1)
}

// =============================================================================
// Value accessors — every failure names the offending element
// =============================================================================

const EMPTY: &[Value] = &[];

fn required_array<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], RigError> {
    obj.get(key)
        .ok_or_else(|| RigError::schema(format!("missing required member '{key}'")))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| RigError::schema(format!("member '{key}' must be an array")))
}

fn optional_array<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], RigError> {
    match obj.get(key) {
        None => Ok(EMPTY),
        Some(v) => v
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| RigError::schema(format!("member '{key}' must be an array"))),
    }
}

fn as_array<'a>(v: &'a Value, what: &str) -> Result<&'a [Value], RigError> {
    v.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| RigError::schema(format!("{what} must be an array")))
}

fn as_object<'a>(v: &'a Value, what: &str) -> Result<&'a Map<String, Value>, RigError> {
    v.as_object()
        .ok_or_else(|| RigError::schema(format!("{what} must be an object")))
}

fn as_str<'a>(v: &'a Value, what: &str) -> Result<&'a str, RigError> {
    v.as_str()
        .ok_or_else(|| RigError::schema(format!("{what} must be a string")))
}

fn as_f64(v: &Value, what: &str) -> Result<f64, RigError> {
    v.as_f64()
        .ok_or_else(|| RigError::schema(format!("{what} must be a number")))
}

/// Read an unsigned index and range-check it against its arena.
fn as_index(v: &Value, bound: usize, what: &str) -> Result<usize, RigError> {
    let idx = v
        .as_u64()
        .ok_or_else(|| RigError::schema(format!("{what} must be an unsigned index")))?;
    if idx >= bound as u64 {
        return Err(RigError::schema(format!(
            "{what} {idx} out of range (must be < {bound})"
        )));
    }
    Ok(idx as usize)
}

fn member<'a>(obj: &'a Map<String, Value>, key: &str, what: &str) -> Result<&'a Value, RigError> {
    obj.get(key)
        .ok_or_else(|| RigError::schema(format!("{what} is missing member '{key}'")))
}

fn bool_member(
    obj: &Map<String, Value>,
    key: &str,
    default: bool,
    what: &str,
) -> Result<bool, RigError> {
    match obj.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| RigError::schema(format!("{what}.{key} must be a boolean"))),
    }
}

// =============================================================================
// Element pieces shared between versions
// =============================================================================

fn read_interp(v: &Value, what: &str) -> Result<Interp, RigError> {
    let s = as_str(v, &format!("{what} interp"))?;
    Interp::from_name(s).ok_or_else(|| RigError::schema(format!("{what}: unknown interp '{s}'")))
}

fn read_solve_type(obj: &Map<String, Value>, what: &str) -> Result<SolveType, RigError> {
    match obj.get("solveType") {
        None => Ok(SolveType::Min),
        Some(v) => {
            let s = as_str(v, &format!("{what} solveType"))?;
            SolveType::from_name(s)
                .ok_or_else(|| RigError::schema(format!("{what}: unknown solveType '{s}'")))
        }
    }
}

/// Read a `[[shapeIdx, parameter], …]` pair list.
fn read_prog_pairs(v: &Value, shape_count: usize, what: &str) -> Result<Vec<ProgPair>, RigError> {
    let arr = as_array(v, what)?;
    let mut out = Vec::with_capacity(arr.len());
    for (i, pv) in arr.iter().enumerate() {
        let pair = as_array(pv, &format!("{what} pair {i}"))?;
        if pair.len() != 2 {
            return Err(RigError::schema(format!(
                "{what} pair {i} must be [shape, parameter]"
            )));
        }
        out.push(ProgPair {
            shape: as_index(&pair[0], shape_count, &format!("{what} pair {i} shape"))?,
            param: as_f64(&pair[1], &format!("{what} pair {i} parameter"))?,
        });
    }
    Ok(out)
}

/// Read a `[[sliderIdx, value], …]` state list.
fn read_state_pairs(
    v: &Value,
    slider_count: usize,
    what: &str,
) -> Result<Vec<ComboPair>, RigError> {
    let arr = as_array(v, what)?;
    let mut out = Vec::with_capacity(arr.len());
    for (i, pv) in arr.iter().enumerate() {
        let pair = as_array(pv, &format!("{what} pair {i}"))?;
        if pair.len() != 2 {
            return Err(RigError::schema(format!(
                "{what} pair {i} must be [slider, value]"
            )));
        }
        out.push(ComboPair {
            slider: as_index(&pair[0], slider_count, &format!("{what} pair {i} slider"))?,
            value: as_f64(&pair[1], &format!("{what} pair {i} value"))?,
        });
    }
    Ok(out)
}

/// Progression parameters must be unique within one progression.
fn check_unique_params(pairs: &[ProgPair], what: &str) -> Result<(), RigError> {
    for (i, a) in pairs.iter().enumerate() {
        for b in &pairs[i + 1..] {
            if math::float_eq(a.param, b.param) {
                return Err(RigError::schema(format!(
                    "{what}: duplicate parameter {}",
                    a.param
                )));
            }
        }
    }
    Ok(())
}
