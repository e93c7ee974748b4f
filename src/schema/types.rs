//! The augmented schema tree: the canonical representation produced by
//! [`crate::schema::loader`] that the Length Estimator, Encoder, and Decoder all
//! walk directly.
//!
//! A [`Group`] is a flat, ordered list of [`Node`]s. For a schema loaded in the
//! default (implicit) mode, the loader places every `count`/`offset` meta node for
//! the group's variable-length descendants — recursing through pure `object`
//! nesting, stopping at `array` boundaries — ahead of the group's own fields, so
//! downstream code never special-cases implicit vs. explicit placement: it just
//! walks `nodes` in order.

use std::sync::Arc;

/// Fixed-size scalar kinds. `Unknown` carries forward a type name the loader did
/// not recognize; per the error-handling design, that is a load-time warning, not
/// a load-time failure — it surfaces as a fatal error only when the Length
/// Estimator or Encoder actually tries to size or write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Byte,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Unknown(String),
}

impl ScalarKind {
    pub fn from_type_name(name: &str) -> Option<ScalarKind> {
        Some(match name {
            "bool" => ScalarKind::Bool,
            "byte" => ScalarKind::Byte,
            "int16" => ScalarKind::I16,
            "uint16" => ScalarKind::U16,
            "int32" => ScalarKind::I32,
            "uint32" => ScalarKind::U32,
            "int64" => ScalarKind::I64,
            "uint64" => ScalarKind::U64,
            "float" => ScalarKind::F32,
            "double" => ScalarKind::F64,
            _ => return None,
        })
    }

    pub fn fixed_size(&self) -> Option<usize> {
        Some(match self {
            ScalarKind::Bool | ScalarKind::Byte => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
            ScalarKind::Unknown(_) => return None,
        })
    }
}

/// One entry in a [`Group`]'s node list.
#[derive(Debug, Clone)]
pub enum Node {
    Scalar { name: String, kind: ScalarKind },
    StringField { name: String },
    BytesField { name: String },
    ObjectField { name: String, group: Group },
    /// `group` is the element schema; it is itself a full group with its own
    /// (possibly empty) meta block, since each array element is a fresh layout
    /// boundary.
    ArrayField { name: String, group: Group },
    /// `path` is the full dotted path of the descendant this count describes,
    /// already resolved by the loader at schema-build time.
    MetaCount { path: String },
    MetaOffset { path: String },
}

/// An ordered list of nodes forming one layout boundary: the root record, or the
/// element schema of an array.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub nodes: Vec<Node>,
}

impl Group {
    pub fn empty() -> Self {
        Group { nodes: Vec::new() }
    }
}

/// A fully loaded, named, versioned schema ready for registration.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub version: u32,
    pub root: Arc<Group>,
    /// True if the definition contained an explicit `count`/`offset` line,
    /// disabling implicit meta insertion for this schema.
    pub explicit_meta: bool,
}
