//! The two-pass pointer-patching encoder.
//!
//! Walks the augmented schema in order, reserving `count`/`offset` placeholders
//! as they're encountered and back-patching them once the referenced payload's
//! size and position are known. `count_pos`/`offset_pos` are shared across the
//! whole top-level call (including array-element recursion); reuse across
//! siblings is safe because the walk is strictly sequential — a path's meta is
//! always consumed before the next field that might reuse the same path name.

use std::collections::HashMap;

use crate::error::EncodeError;
use crate::record::Value;
use crate::schema::types::{Group, Node, ScalarKind};
use crate::stream::Writer;

type PosMap = HashMap<String, usize>;

pub fn encode_group(
    group: &Group,
    value: &Value,
    w: &mut Writer,
    prefix: &str,
    count_pos: &mut PosMap,
    offset_pos: &mut PosMap,
) -> Result<(), EncodeError> {
    let obj = value.as_object();

    for node in &group.nodes {
        match node {
            Node::MetaCount { path } => {
                count_pos.insert(path.clone(), w.pos());
                w.write_u16(0);
            }
            Node::MetaOffset { path } => {
                offset_pos.insert(path.clone(), w.pos());
                w.write_u16(0);
            }
            Node::Scalar { name, kind } => {
                let path = format!("{prefix}{name}");
                let field = obj.and_then(|o| o.get(name));
                backpatch(w, &path, count_pos, offset_pos, None);
                write_scalar(w, kind, field, &path)?;
            }
            Node::StringField { name } => {
                let path = format!("{prefix}{name}");
                let s = obj.and_then(|o| o.get(name)).and_then(Value::as_str).unwrap_or("");
                let units = s.encode_utf16().count() as u16;
                backpatch(w, &path, count_pos, offset_pos, Some(units));
                w.write_string(s);
            }
            Node::BytesField { name } => {
                let path = format!("{prefix}{name}");
                let b = obj.and_then(|o| o.get(name)).and_then(Value::as_bytes).unwrap_or(&[]);
                backpatch(w, &path, count_pos, offset_pos, Some(b.len() as u16));
                w.write_bytes(b);
            }
            Node::ObjectField { name, group: sub } => {
                let sub_value = obj.and_then(|o| o.get(name)).cloned().unwrap_or_else(Value::empty_object);
                encode_group(sub, &sub_value, w, &format!("{prefix}{name}."), count_pos, offset_pos)?;
            }
            Node::ArrayField { name, group: elem } => {
                let path = format!("{prefix}{name}");
                let empty: Vec<Value> = Vec::new();
                let elems = obj.and_then(|o| o.get(name)).and_then(Value::as_array).unwrap_or(&empty);
                encode_array(w, &path, elems, elem, count_pos, offset_pos)?;
            }
        }
    }

    Ok(())
}

fn backpatch(w: &mut Writer, path: &str, count_pos: &PosMap, offset_pos: &PosMap, length: Option<u16>) {
    if let (Some(&pos), Some(len)) = (count_pos.get(path), length) {
        w.patch_u16(pos, len);
    }
    if let Some(&pos) = offset_pos.get(path) {
        w.patch_u16(pos, w.pos() as u16);
    }
}

fn encode_array(
    w: &mut Writer,
    path: &str,
    elems: &[Value],
    elem_group: &Group,
    count_pos: &mut PosMap,
    offset_pos: &mut PosMap,
) -> Result<(), EncodeError> {
    if let Some(&pos) = count_pos.get(path) {
        w.patch_u16(pos, elems.len() as u16);
    }
    if elems.is_empty() {
        return Ok(());
    }

    let mut last = *offset_pos.get(path).ok_or_else(|| EncodeError::InvalidValue {
        path: path.to_string(),
        type_name: "array".to_string(),
        detail: "no offset placeholder reserved for this field; an explicit schema is missing its 'offset' line"
            .to_string(),
    })?;

    for elem in elems {
        let here = w.pos() as u16;
        w.patch_u16(last, here);
        w.write_u16(here);
        let next_slot = w.pos();
        w.write_u16(0);
        last = next_slot;

        encode_group(elem_group, elem, w, "", count_pos, offset_pos)?;
    }

    Ok(())
}

fn write_scalar(w: &mut Writer, kind: &ScalarKind, value: Option<&Value>, path: &str) -> Result<(), EncodeError> {
    match kind {
        ScalarKind::Bool => w.write_bool(matches!(value, Some(Value::Bool(true)))),
        ScalarKind::Byte => w.write_u8(coerce_u8(value)),
        ScalarKind::I16 => w.write_i16(coerce_i16(value)),
        ScalarKind::U16 => w.write_u16(coerce_u16(value)),
        ScalarKind::I32 => w.write_i32(coerce_i32(value)),
        ScalarKind::U32 => w.write_u32(coerce_u32(value)),
        ScalarKind::I64 => w.write_i64(coerce_i64(value)),
        ScalarKind::U64 => w.write_u64(coerce_u64(value)),
        ScalarKind::F32 => w.write_f32(match value {
            Some(Value::F32(v)) => *v,
            Some(Value::F64(v)) => *v as f32,
            _ => 0.0,
        }),
        ScalarKind::F64 => w.write_f64(match value {
            Some(Value::F64(v)) => *v,
            Some(Value::F32(v)) => *v as f64,
            _ => 0.0,
        }),
        ScalarKind::Unknown(type_name) => {
            return Err(EncodeError::InvalidValue {
                path: path.to_string(),
                type_name: type_name.clone(),
                detail: "unknown scalar type".to_string(),
            })
        }
    }
    Ok(())
}

// Numeric-width tolerance: accept either the signed or unsigned variant of a
// given width and reinterpret by bit pattern, rather than rejecting or
// clamping. `as` between equal-width integer types in Rust already performs
// that reinterpretation.
fn coerce_u8(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Byte(v)) => *v,
        _ => 0,
    }
}

fn coerce_i16(value: Option<&Value>) -> i16 {
    match value {
        Some(Value::I16(v)) => *v,
        Some(Value::U16(v)) => *v as i16,
        _ => 0,
    }
}

fn coerce_u16(value: Option<&Value>) -> u16 {
    match value {
        Some(Value::U16(v)) => *v,
        Some(Value::I16(v)) => *v as u16,
        _ => 0,
    }
}

fn coerce_i32(value: Option<&Value>) -> i32 {
    match value {
        Some(Value::I32(v)) => *v,
        Some(Value::U32(v)) => *v as i32,
        _ => 0,
    }
}

fn coerce_u32(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::U32(v)) => *v,
        Some(Value::I32(v)) => *v as u32,
        _ => 0,
    }
}

fn coerce_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::I64(v)) => *v,
        Some(Value::U64(v)) => *v as i64,
        _ => 0,
    }
}

fn coerce_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::U64(v)) => *v,
        Some(Value::I64(v)) => *v as u64,
        _ => 0,
    }
}
