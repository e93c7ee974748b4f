//! Computes the exact serialized byte length of a record against a schema,
//! without writing anything. The Encoder relies on this to pre-size its buffer;
//! any mismatch between this estimate and the actual encoded size is treated as
//! a bug (see [`crate::error::EncodeError::LengthMismatch`]).

use crate::error::LengthError;
use crate::record::Value;
use crate::schema::types::{Group, Node};

pub fn estimate(group: &Group, value: &Value) -> Result<usize, LengthError> {
    estimate_at(group, value, "")
}

fn estimate_at(group: &Group, value: &Value, prefix: &str) -> Result<usize, LengthError> {
    let obj = value.as_object();
    let mut total = 0usize;

    for node in &group.nodes {
        total += match node {
            Node::MetaCount { .. } | Node::MetaOffset { .. } => 2,
            Node::Scalar { name: _, kind } => kind
                .fixed_size()
                .ok_or_else(|| LengthError { path: format!("{prefix}{}", field_name(node)), type_name: format!("{kind:?}") })?,
            Node::StringField { name } => {
                let field = obj.and_then(|o| o.get(name)).and_then(Value::as_str);
                // Always counts the NUL terminator, even for an absent string,
                // per the resolved ambiguity documented in DESIGN.md.
                let units = field.map(|s| s.encode_utf16().count()).unwrap_or(0);
                (units + 1) * 2
            }
            Node::BytesField { name } => {
                let field = obj.and_then(|o| o.get(name)).and_then(Value::as_bytes);
                field.map(|b| b.len()).unwrap_or(0)
            }
            Node::ObjectField { name, group: sub } => {
                let sub_value = obj.and_then(|o| o.get(name)).cloned().unwrap_or_else(Value::empty_object);
                estimate_at(sub, &sub_value, &format!("{prefix}{name}."))?
            }
            Node::ArrayField { name, group: elem } => {
                let elems = obj.and_then(|o| o.get(name)).and_then(Value::as_array).unwrap_or(&[]);
                let mut sum = 0usize;
                for e in elems {
                    sum += 4 + estimate_at(elem, e, "")?;
                }
                sum
            }
        };
    }

    Ok(total)
}

fn field_name(node: &Node) -> &str {
    match node {
        Node::Scalar { name, .. }
        | Node::StringField { name }
        | Node::BytesField { name }
        | Node::ObjectField { name, .. }
        | Node::ArrayField { name, .. } => name,
        Node::MetaCount { path } | Node::MetaOffset { path } => path,
    }
}
