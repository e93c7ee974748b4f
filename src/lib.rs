//! Schema-driven binary message codec for the TERA protocol family.
//!
//! Loads textual message definitions and an opcode map at startup, then
//! serializes and deserializes in-memory records to/from framed byte buffers
//! using a pointer-patched layout: every variable-length field is referenced by
//! an (offset, count) pair in its parent, and every array element carries a
//! forward/self pointer chain.

pub mod codec;
pub mod error;
pub mod loader_fs;
pub mod record;
pub mod schema;
pub mod stream;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Loads a registry from a directory of `protocol.map` + `<Name>.<Version>.def`
/// files.
pub use loader_fs::load_dir;

/// Encodes a record into a framed buffer.
pub use codec::write_frame;
/// Decodes a framed buffer into a record.
pub use codec::parse_frame;

pub use error::{Diagnostic, DecodeError, EncodeError, LengthError, LoadError, ResolveError};
pub use record::Value;
pub use schema::{Group, Identifier, Registry, Version};
