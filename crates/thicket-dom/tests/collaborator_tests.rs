//! Tests for the selector engine and declaration parser seams.

use indexmap::IndexMap;
use thicket_dom::{DeclarationParser, Document, NodeId, SelectorEngine};

/// Matches type selectors only. Includes `root` when it matches.
struct TagSelector;

impl SelectorEngine for TagSelector {
    fn select(&self, document: &Document, selector: &str, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        if document
            .as_element(root)
            .is_some_and(|element| element.local_name() == selector)
        {
            found.push(root);
        }
        found.extend(document.get_elements_by_tag_name(root, selector));
        found
    }
}

/// Splits `name: value; ...` without any CSS awareness.
struct SplitDeclarations;

impl DeclarationParser for SplitDeclarations {
    fn parse_declarations(&self, text: &str) -> IndexMap<String, String> {
        text.split(';')
            .filter_map(|decl| decl.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect()
    }
}

fn tree() -> (Document, NodeId, NodeId, NodeId) {
    let mut doc = Document::default();
    let div = doc.create_element("div").expect("div");
    let outer = doc.create_element("span").expect("span");
    let inner = doc.create_element("span").expect("span");
    let text = doc.create_text_node("span");
    let _ = doc.append_child(doc.root(), div).expect("append");
    let _ = doc.append_child(div, outer).expect("append");
    let _ = doc.append_child(outer, inner).expect("append");
    let _ = doc.append_child(div, text).expect("append");
    (doc, div, outer, inner)
}

#[test]
fn test_query_selector_all_in_tree_order() {
    let (doc, div, outer, inner) = tree();
    assert_eq!(doc.query_selector_all(&TagSelector, div, "span"), vec![outer, inner]);
    assert_eq!(doc.query_selector(&TagSelector, div, "span"), Some(outer));
}

#[test]
fn test_query_selector_excludes_root() {
    let (doc, _, outer, inner) = tree();
    assert_eq!(doc.query_selector_all(&TagSelector, outer, "span"), vec![inner]);
    assert_eq!(doc.query_selector(&TagSelector, inner, "span"), None);
}

#[test]
fn test_style_uses_declaration_parser() {
    let (mut doc, div, outer, _) = tree();
    doc.set_attribute(div, "style", "color: red; margin : 0 auto;")
        .expect("set style");

    let style = doc.style(&SplitDeclarations, div);
    assert_eq!(style.get("color").map(String::as_str), Some("red"));
    assert_eq!(style.get("margin").map(String::as_str), Some("0 auto"));
    assert_eq!(style.keys().collect::<Vec<_>>(), ["color", "margin"]);

    assert!(doc.style(&SplitDeclarations, outer).is_empty());
}
