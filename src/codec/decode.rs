//! The tolerant decoder: reads counts/offsets first and uses them to drive
//! array/string/bytes reads, reconciling minor offset drift rather than trusting
//! positional continuity.

use std::collections::HashMap;

use crate::error::{DecodeError, Diagnostic};
use crate::record::Value;
use crate::schema::types::{Group, Node, ScalarKind};
use crate::stream::Reader;

type ValMap = HashMap<String, u16>;

pub fn decode_group(
    group: &Group,
    r: &mut Reader<'_>,
    prefix: &str,
    count: &mut ValMap,
    offset: &mut ValMap,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Value, DecodeError> {
    let mut map = std::collections::BTreeMap::new();

    for node in &group.nodes {
        match node {
            Node::MetaCount { path } => {
                let v = r.read_u16(path)?;
                count.insert(path.clone(), v);
            }
            Node::MetaOffset { path } => {
                let v = r.read_u16(path)?;
                offset.insert(path.clone(), v);
            }
            Node::Scalar { name, kind } => {
                let path = format!("{prefix}{name}");
                reconcile_offset(r, &path, offset, diagnostics);
                map.insert(name.clone(), read_scalar(r, kind, &path)?);
            }
            Node::StringField { name } => {
                let path = format!("{prefix}{name}");
                reconcile_offset(r, &path, offset, diagnostics);
                map.insert(name.clone(), Value::Str(r.read_string(&path)?));
            }
            Node::BytesField { name } => {
                let path = format!("{prefix}{name}");
                reconcile_offset(r, &path, offset, diagnostics);
                let n = *count.get(&path).unwrap_or(&0) as usize;
                map.insert(name.clone(), Value::Bytes(r.read_bytes(n, &path)?));
            }
            Node::ObjectField { name, group: sub } => {
                let v = decode_group(sub, r, &format!("{prefix}{name}."), count, offset, diagnostics)?;
                map.insert(name.clone(), v);
            }
            Node::ArrayField { name, group: elem } => {
                let path = format!("{prefix}{name}");
                let v = decode_array(r, &path, count, offset, elem, diagnostics)?;
                map.insert(name.clone(), v);
            }
        }
    }

    Ok(Value::Object(map))
}

fn reconcile_offset(r: &mut Reader<'_>, path: &str, offset: &ValMap, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(&expected) = offset.get(path) {
        if r.pos() != expected as usize {
            diagnostics.push(Diagnostic::new(
                "<buffer>",
                0,
                format!("{path}: offset drift, expected {expected}, cursor at {}; seeking", r.pos()),
            ));
            r.seek(expected as usize);
        }
    }
}

fn decode_array(
    r: &mut Reader<'_>,
    path: &str,
    count: &mut ValMap,
    offset: &mut ValMap,
    elem_group: &Group,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Value, DecodeError> {
    let length = *count.get(path).unwrap_or(&0) as usize;
    let mut next = *offset.get(path).unwrap_or(&0);
    let mut elems = Vec::with_capacity(length);

    // AwaitingFirst -> Reading -> Done, driven entirely by `next`.
    while next != 0 {
        if r.pos() != next as usize {
            diagnostics.push(Diagnostic::new(
                "<buffer>",
                0,
                format!("{path}: offset drift, expected {next}, cursor at {}; seeking", r.pos()),
            ));
            r.seek(next as usize);
        }

        let here = r.read_u16(path)?;
        if here != next {
            return Err(DecodeError::HerePointerMismatch { path: path.to_string(), expected: next, found: here });
        }
        let following = r.read_u16(path)?;

        let elem = decode_group(elem_group, r, "", count, offset, diagnostics)?;
        elems.push(elem);

        if elems.len() >= length && following != 0 {
            diagnostics.push(Diagnostic::new("<buffer>", 0, format!("{path}: more elements than declared count {length}")));
        }

        next = following;
    }

    Ok(Value::Array(elems))
}

fn read_scalar(r: &mut Reader<'_>, kind: &ScalarKind, path: &str) -> Result<Value, DecodeError> {
    Ok(match kind {
        ScalarKind::Bool => Value::Bool(r.read_bool(path)?),
        ScalarKind::Byte => Value::Byte(r.read_u8(path)?),
        ScalarKind::I16 => Value::I16(r.read_i16(path)?),
        ScalarKind::U16 => Value::U16(r.read_u16(path)?),
        ScalarKind::I32 => Value::I32(r.read_i32(path)?),
        ScalarKind::U32 => Value::U32(r.read_u32(path)?),
        ScalarKind::I64 => Value::I64(r.read_i64(path)?),
        ScalarKind::U64 => Value::U64(r.read_u64(path)?),
        ScalarKind::F32 => Value::F32(r.read_f32(path)?),
        ScalarKind::F64 => Value::F64(r.read_f64(path)?),
        ScalarKind::Unknown(type_name) => {
            return Err(DecodeError::UnknownType { path: path.to_string(), type_name: type_name.clone() })
        }
    })
}
