//! Parses opcode maps and message definition files into the augmented schema
//! tree.
//!
//! The two parsers here (`parse_opcode_map`, `parse_definition`) are pure
//! functions over `&str` — no filesystem access — so they are unit-testable in
//! isolation. [`crate::loader_fs::load_dir`] is the thin filesystem-facing layer
//! that finds `.def`/`protocol.map` files and feeds their contents to these.

use std::collections::HashMap;

use crate::error::Diagnostic;
use crate::schema::types::{Group, Node, ScalarKind};

/// Bidirectional `name <-> code` table parsed from a `protocol.map` file.
#[derive(Debug, Default, Clone)]
pub struct OpcodeMap {
    pub name_to_code: HashMap<String, i64>,
}

/// One non-blank, non-comment definition line after dash-depth parsing.
struct RawLine {
    depth: usize,
    type_name: String,
    field_name: String,
    line_no: usize,
}

/// A node in the loader's temporary arena, addressed by index while the
/// definition's nesting is resolved; converted to a pure downward [`Group`] tree
/// once parsing completes (see DESIGN.md "Cyclic-looking parent links").
struct RawNode {
    type_name: String,
    name: String,
    children: Vec<usize>,
}

const ROOT_ID: usize = 0;

/// Parses a `protocol.map` file body. `#` starts a line comment; blank lines are
/// ignored. Malformed lines (wrong token count, non-numeric code) are reported as
/// diagnostics and skipped rather than aborting the load.
pub fn parse_opcode_map(text: &str, file: &str) -> (OpcodeMap, Vec<Diagnostic>) {
    let mut map = OpcodeMap::default();
    let mut diagnostics = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = match raw_line.split('#').next() {
            Some(l) => l.trim(),
            None => "",
        };
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (name, code) = match (parts.next(), parts.next(), parts.next()) {
            (Some(n), Some(c), None) => (n, c),
            _ => {
                diagnostics.push(Diagnostic::new(file, line_no, format!("malformed opcode line: '{line}'")));
                continue;
            }
        };
        match code.parse::<i64>() {
            Ok(code) => {
                map.name_to_code.insert(name.to_string(), code);
            }
            Err(_) => {
                diagnostics.push(Diagnostic::new(file, line_no, format!("non-numeric opcode '{code}' for '{name}'")));
            }
        }
    }

    (map, diagnostics)
}

/// Parses one `<Name>.<Version>.def` file body into an augmented [`Group`].
///
/// Returns the group plus whether explicit `count`/`offset` lines were present
/// (disabling implicit meta insertion for this schema) and the diagnostics
/// accumulated along the way.
pub fn parse_definition(text: &str, file: &str) -> (Group, bool, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let lines = tokenize(text, file, &mut diagnostics);

    let explicit_meta = lines.iter().any(|l| l.type_name == "count" || l.type_name == "offset");
    if explicit_meta {
        diagnostics.push(Diagnostic::new(
            file,
            0,
            "explicit count/offset fields present; implicit meta insertion disabled for this schema",
        ));
    }

    let arena = build_arena(&lines, file, &mut diagnostics);

    let group = if explicit_meta {
        build_group_explicit(&arena, ROOT_ID)
    } else {
        build_group_implicit(&arena, ROOT_ID)
    };

    (group, explicit_meta, diagnostics)
}

fn tokenize(text: &str, file: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<RawLine> {
    let mut out = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let dash_run_end = trimmed.find(|c: char| c != '-' && !c.is_whitespace()).unwrap_or(0);
        let (dashes, rest) = trimmed.split_at(dash_run_end.max(0));
        let depth = dashes.chars().filter(|c| *c == '-').count();
        let rest = rest.trim();

        let mut parts = rest.splitn(2, char::is_whitespace);
        let type_name = match parts.next() {
            Some(t) if !t.is_empty() => t,
            _ => {
                diagnostics.push(Diagnostic::new(file, line_no, format!("malformed definition line: '{raw_line}'")));
                continue;
            }
        };
        let field_name = match parts.next() {
            Some(f) if !f.trim().is_empty() => f.trim(),
            _ => {
                diagnostics.push(Diagnostic::new(file, line_no, format!("malformed definition line: '{raw_line}'")));
                continue;
            }
        };

        out.push(RawLine {
            depth,
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            line_no,
        });
    }
    out
}

fn build_arena(lines: &[RawLine], file: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<RawNode> {
    let mut arena = vec![RawNode { type_name: "root".to_string(), name: String::new(), children: Vec::new() }];
    let mut parent_at_depth: Vec<usize> = vec![ROOT_ID];
    let mut last_at_depth: Vec<usize> = Vec::new();
    let mut prev_depth: i64 = -1;

    for line in lines {
        let mut depth = line.depth;
        if prev_depth >= 0 && depth as i64 > prev_depth + 1 {
            diagnostics.push(Diagnostic::new(
                file,
                line.line_no,
                format!("field '{}' skips a nesting level; treating as one level deeper", line.field_name),
            ));
            depth = (prev_depth + 1) as usize;
        }

        if depth as i64 == prev_depth + 1 {
            if prev_depth >= 0 {
                let parent_id = last_at_depth[prev_depth as usize];
                match arena[parent_id].type_name.as_str() {
                    "array" | "object" => {}
                    other => diagnostics.push(Diagnostic::new(
                        file,
                        line.line_no,
                        format!("field '{}' nests under non-composite type '{other}'", line.field_name),
                    )),
                }
                if parent_at_depth.len() <= depth {
                    parent_at_depth.push(parent_id);
                } else {
                    parent_at_depth[depth] = parent_id;
                }
            }
        }

        let parent_id = parent_at_depth[depth];
        let node = RawNode { type_name: line.type_name.clone(), name: line.field_name.clone(), children: Vec::new() };
        arena.push(node);
        let id = arena.len() - 1;
        arena[parent_id].children.push(id);

        if last_at_depth.len() <= depth {
            last_at_depth.resize(depth + 1, ROOT_ID);
        }
        last_at_depth[depth] = id;
        prev_depth = depth as i64;
    }

    arena
}

fn field_node(arena: &[RawNode], id: usize, prefix: &str) -> Node {
    let raw = &arena[id];
    match raw.type_name.as_str() {
        "string" => Node::StringField { name: raw.name.clone() },
        "bytes" => Node::BytesField { name: raw.name.clone() },
        "object" => Node::ObjectField {
            name: raw.name.clone(),
            group: Group { nodes: build_fields_only(arena, id, &format!("{prefix}{}.", raw.name)) },
        },
        "array" => Node::ArrayField { name: raw.name.clone(), group: build_group_implicit(arena, id) },
        other => {
            let kind = ScalarKind::from_type_name(other).unwrap_or_else(|| ScalarKind::Unknown(other.to_string()));
            Node::Scalar { name: raw.name.clone(), kind }
        }
    }
}

/// Builds the field nodes for a group without any local meta block — used for
/// the fields directly inside an `object`, whose variable-length descendants'
/// meta entries are hoisted up to the nearest enclosing root/array-element group.
fn build_fields_only(arena: &[RawNode], id: usize, prefix: &str) -> Vec<Node> {
    arena[id].children.iter().map(|&child_id| field_node(arena, child_id, prefix)).collect()
}

/// Collects `count`/`offset` meta nodes for every variable-length descendant of
/// `id` reachable through pure `object` nesting, in field-declaration order.
/// Stops at `array` children: an array's own count/offset is emitted here, but
/// its element schema is a new group boundary with its own meta block.
fn collect_meta(arena: &[RawNode], id: usize, prefix: &str) -> Vec<Node> {
    let mut out = Vec::new();
    for &child_id in &arena[id].children {
        let child = &arena[child_id];
        let path = format!("{prefix}{}", child.name);
        match child.type_name.as_str() {
            "array" => {
                out.push(Node::MetaCount { path: path.clone() });
                out.push(Node::MetaOffset { path });
            }
            "bytes" => {
                out.push(Node::MetaOffset { path: path.clone() });
                out.push(Node::MetaCount { path });
            }
            "string" => {
                out.push(Node::MetaOffset { path });
            }
            "object" => {
                out.extend(collect_meta(arena, child_id, &format!("{path}.")));
            }
            _ => {}
        }
    }
    out
}

fn build_group_implicit(arena: &[RawNode], id: usize) -> Group {
    let mut nodes = collect_meta(arena, id, "");
    nodes.extend(build_fields_only(arena, id, ""));
    Group { nodes }
}

/// Author-managed meta placement: literal `count`/`offset` lines are kept exactly
/// where they appear, with no hoisting or path prefixing beyond the declared
/// field name. This is a deliberate simplification of explicit mode — see
/// DESIGN.md.
fn build_group_explicit(arena: &[RawNode], id: usize) -> Group {
    let mut nodes = Vec::new();
    for &child_id in &arena[id].children {
        let raw = &arena[child_id];
        let node = match raw.type_name.as_str() {
            "count" => Node::MetaCount { path: raw.name.clone() },
            "offset" => Node::MetaOffset { path: raw.name.clone() },
            "object" => Node::ObjectField { name: raw.name.clone(), group: build_group_explicit(arena, child_id) },
            "array" => Node::ArrayField { name: raw.name.clone(), group: build_group_explicit(arena, child_id) },
            "string" => Node::StringField { name: raw.name.clone() },
            "bytes" => Node::BytesField { name: raw.name.clone() },
            other => {
                let kind = ScalarKind::from_type_name(other).unwrap_or_else(|| ScalarKind::Unknown(other.to_string()));
                Node::Scalar { name: raw.name.clone(), kind }
            }
        };
        nodes.push(node);
    }
    Group { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_map_parses_name_code_pairs() {
        let (map, diags) = parse_opcode_map("# comment\nS_LOGIN 1024\nC_MOVE  2048\n", "protocol.map");
        assert!(diags.is_empty());
        assert_eq!(map.name_to_code.get("S_LOGIN"), Some(&1024));
        assert_eq!(map.name_to_code.get("C_MOVE"), Some(&2048));
    }

    #[test]
    fn opcode_map_warns_on_non_numeric_code() {
        let (map, diags) = parse_opcode_map("FOO bar\n", "protocol.map");
        assert!(map.name_to_code.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 1);
    }

    #[test]
    fn opcode_map_warns_on_malformed_line() {
        let (_, diags) = parse_opcode_map("JUST_A_NAME\n", "protocol.map");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let (map, diags) = parse_opcode_map("\n   \n# nothing here\n", "protocol.map");
        assert!(map.name_to_code.is_empty());
        assert!(diags.is_empty());
    }

    fn field_names(group: &Group) -> Vec<&str> {
        group
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Scalar { name, .. }
                | Node::StringField { name }
                | Node::BytesField { name }
                | Node::ObjectField { name, .. }
                | Node::ArrayField { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn simple_scalar_schema_has_no_meta() {
        let (group, explicit, diags) = parse_definition("int16 x\n", "TEST.2.def");
        assert!(diags.is_empty());
        assert!(!explicit);
        assert_eq!(field_names(&group), vec!["x"]);
        assert!(group.nodes.iter().all(|n| !matches!(n, Node::MetaCount { .. } | Node::MetaOffset { .. })));
    }

    #[test]
    fn string_field_gets_offset_only_meta_ahead_of_fields() {
        let (group, _, _) = parse_definition("string s1\nstring s2\n", "TEST_STRING.1.def");
        let metas: Vec<&Node> = group.nodes.iter().take(2).collect();
        assert!(matches!(metas[0], Node::MetaOffset { path } if path == "s1"));
        assert!(matches!(metas[1], Node::MetaOffset { path } if path == "s2"));
        assert_eq!(field_names(&group), vec!["s1", "s2"]);
    }

    #[test]
    fn bytes_field_gets_offset_then_count_meta() {
        let (group, _, _) = parse_definition("bytes b1\n", "TEST_BYTES.1.def");
        assert!(matches!(&group.nodes[0], Node::MetaOffset { path } if path == "b1"));
        assert!(matches!(&group.nodes[1], Node::MetaCount { path } if path == "b1"));
    }

    #[test]
    fn array_field_gets_count_then_offset_meta() {
        let (group, _, _) = parse_definition("array items\n- int16 a\n", "TEST_ARRAY.1.def");
        assert!(matches!(&group.nodes[0], Node::MetaCount { path } if path == "items"));
        assert!(matches!(&group.nodes[1], Node::MetaOffset { path } if path == "items"));
        match &group.nodes[2] {
            Node::ArrayField { name, group: elem } => {
                assert_eq!(name, "items");
                assert_eq!(field_names(elem), vec!["a"]);
            }
            other => panic!("expected array field, got {other:?}"),
        }
    }

    #[test]
    fn nested_object_array_meta_hoists_to_root() {
        let (group, _, _) = parse_definition("object outer\n- array inner\n- - int16 v\n", "TEST_NEST.1.def");
        assert!(matches!(&group.nodes[0], Node::MetaCount { path } if path == "outer.inner"));
        assert!(matches!(&group.nodes[1], Node::MetaOffset { path } if path == "outer.inner"));
        match &group.nodes[2] {
            Node::ObjectField { name, group: inner } => {
                assert_eq!(name, "outer");
                assert!(inner.nodes.iter().all(|n| !matches!(n, Node::MetaCount { .. } | Node::MetaOffset { .. })));
            }
            other => panic!("expected object field, got {other:?}"),
        }
    }

    #[test]
    fn explicit_meta_disables_implicit_insertion() {
        let (group, explicit, diags) = parse_definition("offset off_s1\nstring s1\n", "TEST_EXPLICIT.1.def");
        assert!(explicit);
        assert_eq!(diags.len(), 1);
        assert!(matches!(&group.nodes[0], Node::MetaOffset { path } if path == "off_s1"));
        assert!(matches!(&group.nodes[1], Node::StringField { name } if name == "s1"));
    }

    #[test]
    fn skipped_nesting_level_warns_but_descends_one_step() {
        let (group, _, diags) = parse_definition("array items\n- - int16 a\n", "TEST_SKIP.1.def");
        assert_eq!(diags.len(), 1);
        match &group.nodes[2] {
            Node::ArrayField { group: elem, .. } => assert_eq!(field_names(elem), vec!["a"]),
            other => panic!("expected array field, got {other:?}"),
        }
    }

    #[test]
    fn nesting_under_a_scalar_field_warns() {
        let (_, _, diags) = parse_definition("int16 x\n- byte y\n", "TEST_BAD_NEST.1.def");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("non-composite type 'int16'"));
    }

    #[test]
    fn unknown_scalar_type_is_kept_for_later_failure() {
        let (group, _, diags) = parse_definition("quux x\n", "TEST_UNKNOWN.1.def");
        assert!(diags.is_empty());
        match &group.nodes[0] {
            Node::Scalar { kind: ScalarKind::Unknown(name), .. } => assert_eq!(name, "quux"),
            other => panic!("expected unknown scalar, got {other:?}"),
        }
    }
}
