//! Length estimation, encoding, and decoding: the codec's hard engineering core.
//!
//! [`write_frame`] and [`parse_frame`] are the outermost entry points; they
//! resolve the schema through the registry, then delegate to the recursive
//! per-group functions in [`encode`] / [`decode`].

pub mod decode;
pub mod encode;
pub mod length;

use std::collections::HashMap;

use crate::error::{DecodeError, Diagnostic, EncodeError};
use crate::record::Value;
use crate::schema::registry::{Identifier, Registry, Version};
use crate::stream::{Reader, Writer};

/// Serializes `data` against the schema resolved for `identifier`/`version`,
/// prepending the 4-byte `(total_length, opcode)` frame header.
pub fn write_frame(registry: &Registry, identifier: Identifier<'_>, version: Version, data: &Value) -> Result<Vec<u8>, EncodeError> {
    // A missing opcode is fatal a few lines down (`MissingOpcode`), so the
    // resolve-time diagnostic would be redundant here; still thread a sink
    // through so `resolve` never has to special-case a missing diagnostics list.
    let mut resolve_diagnostics = Vec::new();
    let resolved = registry.resolve(identifier, version, "<anonymous>", &mut resolve_diagnostics)?;
    let body_len = length::estimate(&resolved.schema, data)?;
    let total = 4 + body_len;

    let mut w = Writer::with_capacity(total);
    w.write_u16(total as u16);
    let code = resolved.code.ok_or_else(|| EncodeError::MissingOpcode { name: resolved.name.clone() })?;
    w.write_u16(code as u16);

    let mut count_pos = HashMap::new();
    let mut offset_pos = HashMap::new();
    encode::encode_group(&resolved.schema, data, &mut w, "", &mut count_pos, &mut offset_pos)?;

    if w.pos() != total {
        return Err(EncodeError::LengthMismatch { expected: total, actual: w.pos() });
    }

    Ok(w.into_vec())
}

/// Deserializes `buffer` (the full frame, including its 4-byte header) against
/// the schema resolved for `identifier`/`version`. Returns the decoded record
/// plus any tolerance diagnostics (offset drift, out-of-bounds array elements).
pub fn parse_frame(
    registry: &Registry,
    identifier: Identifier<'_>,
    version: Version,
    buffer: &[u8],
) -> Result<(Value, Vec<Diagnostic>), DecodeError> {
    let mut diagnostics = Vec::new();
    let resolved = registry.resolve(identifier, version, "<anonymous>", &mut diagnostics)?;
    let mut r = Reader::new(buffer);
    r.seek(4);

    let mut count = HashMap::new();
    let mut offset = HashMap::new();
    let value = decode::decode_group(&resolved.schema, &mut r, "", &mut count, &mut offset, &mut diagnostics)?;

    Ok((value, diagnostics))
}
