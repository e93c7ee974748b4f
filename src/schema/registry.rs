//! Name/code and `(name, version) -> schema` lookup tables.
//!
//! The registry is built once by a loader and treated as read-only afterwards;
//! see the concurrency notes in the crate root docs for the reload contract.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Diagnostic, ResolveError};
use crate::schema::types::Group;

/// How the caller identifies which schema to use.
pub enum Identifier<'a> {
    /// A caller-supplied schema, bypassing the registry's schema table entirely.
    Direct(Arc<Group>),
    Name(&'a str),
    Code(i64),
}

/// Which version of a named schema to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Exact(u32),
    /// Selects the numerically greatest version registered for the name.
    Latest,
}

/// The outcome of [`Registry::resolve`].
#[derive(Debug)]
pub struct Resolved {
    pub name: String,
    pub code: Option<i64>,
    pub version: Option<u32>,
    pub schema: Arc<Group>,
}

#[derive(Default)]
pub struct Registry {
    name_to_code: HashMap<String, i64>,
    code_to_name: HashMap<i64, String>,
    schemas: HashMap<(String, u32), Arc<Group>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register_opcode(&mut self, name: impl Into<String>, code: i64) {
        let name = name.into();
        self.code_to_name.insert(code, name.clone());
        self.name_to_code.insert(name, code);
    }

    pub fn register_schema(&mut self, name: impl Into<String>, version: u32, schema: Arc<Group>) {
        self.schemas.insert((name.into(), version), schema);
    }

    pub fn opcode_for(&self, name: &str) -> Option<i64> {
        self.name_to_code.get(name).copied()
    }

    pub fn name_for_opcode(&self, code: i64) -> Option<&str> {
        self.code_to_name.get(&code).map(|s| s.as_str())
    }

    /// True if at least one version of `name` is registered.
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.keys().any(|(n, _)| n == name)
    }

    fn pick_schema(&self, name: &str, version: Version) -> Result<(u32, Arc<Group>), ResolveError> {
        match version {
            Version::Exact(v) => self
                .schemas
                .get(&(name.to_string(), v))
                .cloned()
                .map(|g| (v, g))
                .ok_or_else(|| ResolveError::NoSchema { name: name.to_string(), version: v.to_string() }),
            Version::Latest => {
                let max = self.schemas.keys().filter(|(n, _)| n == name).map(|(_, v)| *v).max();
                match max {
                    Some(v) => Ok((v, self.schemas[&(name.to_string(), v)].clone())),
                    None => Err(ResolveError::NoSchema { name: name.to_string(), version: "*".to_string() }),
                }
            }
        }
    }

    /// Resolves `identifier` to a concrete schema. `diagnostics` collects
    /// non-fatal issues along the way — currently just a name with no
    /// registered opcode, mirroring how [`crate::loader_fs::load_dir`] reports
    /// the same condition at load time.
    pub fn resolve(
        &self,
        identifier: Identifier<'_>,
        version: Version,
        default_name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Resolved, ResolveError> {
        match identifier {
            Identifier::Direct(schema) => {
                Ok(Resolved { name: default_name.to_string(), code: None, version: None, schema })
            }
            Identifier::Name(name) => {
                let code = self.name_to_code.get(name).copied();
                if code.is_none() {
                    diagnostics.push(Diagnostic::new("<registry>", 0, format!("'{name}' has no opcode mapping")));
                }
                let (v, schema) = self.pick_schema(name, version)?;
                Ok(Resolved { name: name.to_string(), code, version: Some(v), schema })
            }
            Identifier::Code(code) => {
                let name = self.code_to_name.get(&code).ok_or(ResolveError::UnknownOpcode(code))?.clone();
                let (v, schema) = self.pick_schema(&name, version)?;
                Ok(Resolved { name, code: Some(code), version: Some(v), schema })
            }
        }
    }
}
