//! Filesystem-facing convenience layer on top of [`crate::schema::loader`].
//!
//! Reading files from disk and iterating directories is explicitly an external
//! collaborator concern, not part of the core codec — this module is that
//! collaborator, kept separate so the pure parsers stay testable without a
//! filesystem. Mirrors how the CLI layer in this codebase walks directories with
//! `walkdir` rather than the library itself doing so.

use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Diagnostic, LoadError};
use crate::schema::loader::{parse_definition, parse_opcode_map};
use crate::schema::registry::Registry;
use std::sync::Arc;

const OPCODE_MAP_FILENAME: &str = "protocol.map";

/// Walks `base` for `protocol.map` and every `<Name>.<Version>.def` file,
/// parses them, and returns a fully populated [`Registry`] plus every
/// diagnostic collected along the way. Idempotent: calling it twice with the
/// same inputs rebuilds an equivalent registry from scratch.
pub fn load_dir(base: &Path) -> Result<(Registry, Vec<Diagnostic>), LoadError> {
    let def_name = Regex::new(r"^(\w+)\.(\d+)\.def$").expect("static regex is valid");
    let mut registry = Registry::new();
    let mut diagnostics = Vec::new();

    for entry in WalkDir::new(base).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();

        if file_name == OPCODE_MAP_FILENAME {
            let text = std::fs::read_to_string(entry.path())?;
            let (map, mut diags) = parse_opcode_map(&text, &file_name);
            diagnostics.append(&mut diags);
            for (name, code) in map.name_to_code {
                registry.register_opcode(name, code);
            }
            continue;
        }

        if let Some(caps) = def_name.captures(&file_name) {
            let name = caps[1].to_string();
            let version: u32 = caps[2].parse().unwrap_or(0);
            let text = std::fs::read_to_string(entry.path())?;
            let (group, _explicit, mut diags) = parse_definition(&text, &file_name);
            diagnostics.append(&mut diags);
            registry.register_schema(&name, version, Arc::new(group));
        }
    }

    for entry in WalkDir::new(base).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(caps) = def_name.captures(&entry.file_name().to_string_lossy()) {
            let name = caps[1].to_string();
            if !registry_has_opcode(&registry, &name) {
                diagnostics.push(Diagnostic::new(file_name_of(entry.path()), 0, format!("schema '{name}' has no opcode mapping")));
            }
        }
    }

    Ok((registry, diagnostics))
}

fn registry_has_opcode(registry: &Registry, name: &str) -> bool {
    registry.opcode_for(name).is_some()
}

fn file_name_of(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_opcode_map_and_definitions_from_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("protocol.map"), "S_LOGIN 1024\n").unwrap();
        fs::write(dir.path().join("S_LOGIN.1.def"), "int16 x\n").unwrap();

        let (registry, diagnostics) = load_dir(dir.path()).unwrap();
        assert_eq!(registry.opcode_for("S_LOGIN"), Some(1024));
        assert!(registry.has_schema("S_LOGIN"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn warns_when_schema_has_no_opcode() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ORPHAN.1.def"), "byte b\n").unwrap();

        let (_, diagnostics) = load_dir(dir.path()).unwrap();
        assert!(diagnostics.iter().any(|d| d.message.contains("no opcode mapping")));
    }

    #[test]
    fn ignores_files_that_do_not_match_either_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "not a schema\n").unwrap();

        let (registry, _) = load_dir(dir.path()).unwrap();
        assert!(!registry.has_schema("README"));
    }
}
