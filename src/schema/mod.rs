//! Schema loading, the augmented schema tree, and the name/opcode registry.

pub mod loader;
pub mod registry;
pub mod types;

pub use loader::{parse_definition, parse_opcode_map, OpcodeMap};
pub use registry::{Identifier, Registry, Resolved, Version};
pub use types::{Group, Node, Schema, ScalarKind};
