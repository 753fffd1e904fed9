//! Debug dumps of a parsed tree.
//!
//! The layout is the one used by the html5lib tree-construction tests: one
//! node per line, `| ` prefix, two spaces of indent per level, attributes
//! sorted by name on their own lines, and foreign elements prefixed with
//! their namespace (`svg`, `math`).

use std::fmt::Write as _;

use thicket_dom::{Document, Namespace, NodeData, NodeId};

/// Render the subtree rooted at `id` (the Document itself is not printed,
/// only its children).
#[must_use]
pub fn format_tree(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    if id == document.root() {
        for &child in document.children(id) {
            write_node(document, child, 0, &mut out);
        }
    } else {
        write_node(document, id, 0, &mut out);
    }
    out
}

/// Print a DOM tree for debugging.
pub fn print_tree(document: &Document, id: NodeId) {
    print!("{}", format_tree(document, id));
}

fn namespace_prefix(ns: &Namespace) -> Option<&'static str> {
    match ns {
        Namespace::Svg => Some("svg"),
        Namespace::MathMl => Some("math"),
        Namespace::XLink => Some("xlink"),
        Namespace::Xml => Some("xml"),
        Namespace::Xmlns => Some("xmlns"),
        _ => None,
    }
}

fn write_node(document: &Document, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let Some(node) = document.get(id) else {
        return;
    };
    match node.data() {
        NodeData::Document | NodeData::DocumentFragment => {}
        NodeData::DocumentType {
            name,
            public_id,
            system_id,
        } => {
            if public_id.is_empty() && system_id.is_empty() {
                let _ = writeln!(out, "| {indent}<!DOCTYPE {name}>");
            } else {
                let _ = writeln!(out, "| {indent}<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">");
            }
        }
        NodeData::Text(data) => {
            let _ = writeln!(out, "| {indent}\"{data}\"");
        }
        NodeData::Comment(data) => {
            let _ = writeln!(out, "| {indent}<!-- {data} -->");
        }
        NodeData::Element(element) => {
            match namespace_prefix(element.namespace()) {
                Some(prefix) => {
                    let _ = writeln!(out, "| {indent}<{prefix} {}>", element.local_name());
                }
                None => {
                    let _ = writeln!(out, "| {indent}<{}>", element.local_name());
                }
            }

            let mut attributes: Vec<(String, &str)> = element
                .attrs()
                .iter()
                .map(|attr| {
                    let name = match namespace_prefix(&attr.name.ns) {
                        Some(prefix) => format!("{prefix} {}", attr.name.local),
                        None => attr.name.local.clone(),
                    };
                    (name, attr.value.as_str())
                })
                .collect();
            attributes.sort_unstable();
            for (name, value) in attributes {
                let _ = writeln!(out, "| {indent}  {name}=\"{value}\"");
            }

            if let Some(contents) = element.template_contents() {
                let _ = writeln!(out, "| {indent}  content");
                for &child in document.children(contents) {
                    write_node(document, child, depth + 2, out);
                }
            }
        }
    }
    for &child in document.children(id) {
        write_node(document, child, depth + 1, out);
    }
}
