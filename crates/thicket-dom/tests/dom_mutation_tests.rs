//! Tests for DOM tree mutation methods: append_child, insert_before,
//! remove_child, replace_child, and the validity checks in front of them.

use thicket_dom::{DomException, Document, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn element(doc: &mut Document, tag: &str) -> NodeId {
    doc.create_element(tag).expect("valid element name")
}

/// Helper to build `<html><body></body></html>` under the document.
fn html_body(doc: &mut Document) -> NodeId {
    let html = element(doc, "html");
    let body = element(doc, "body");
    doc.append_child(doc.root(), html).unwrap();
    doc.append_child(html, body).unwrap();
    body
}

/// Assert that every child's cached index and parent link are consistent.
fn assert_links(doc: &Document, parent: NodeId) {
    for (i, &child) in doc.children(parent).iter().enumerate() {
        assert_eq!(doc.parent(child), Some(parent));
        assert_eq!(doc.index_in_parent(child), Some(i));
        assert_links(doc, child);
    }
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let child = element(&mut doc, "p");
    doc.append_child(parent, child).unwrap();

    assert_eq!(doc.children(parent).len(), 1);

    doc.remove_child(parent, child).unwrap();

    assert_eq!(doc.children(parent).len(), 0);
    assert_eq!(doc.parent(child), None);
    assert_eq!(doc.prev_sibling(child), None);
    assert_eq!(doc.next_sibling(child), None);
}

#[test]
fn test_remove_child_first_of_three() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let a = element(&mut doc, "a");
    let b = element(&mut doc, "b");
    let c = element(&mut doc, "c");
    doc.append_child(parent, a).unwrap();
    doc.append_child(parent, b).unwrap();
    doc.append_child(parent, c).unwrap();

    doc.remove_child(parent, a).unwrap();

    // b is now first child, c is second
    assert_eq!(doc.children(parent), &[b, c]);
    assert_eq!(doc.prev_sibling(b), None);
    assert_eq!(doc.next_sibling(b), Some(c));
    assert_eq!(doc.prev_sibling(c), Some(b));
    assert_links(&doc, parent);
}

#[test]
fn test_remove_child_not_a_child() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let stranger = element(&mut doc, "span");

    let err = doc.remove_child(parent, stranger).unwrap_err();
    assert!(matches!(err, DomException::NotFound(_)));
    assert_eq!(err.name(), "NotFoundError");
}

// ========== insert_before ==========

#[test]
fn test_insert_before_middle() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "ul");
    let a = element(&mut doc, "li");
    let c = element(&mut doc, "li");
    doc.append_child(parent, a).unwrap();
    doc.append_child(parent, c).unwrap();

    let b = element(&mut doc, "li");
    doc.insert_before(parent, b, Some(c)).unwrap();

    assert_eq!(doc.children(parent), &[a, b, c]);
    assert_links(&doc, parent);
}

#[test]
fn test_insert_before_itself_is_a_no_op() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let a = element(&mut doc, "a");
    let b = element(&mut doc, "b");
    doc.append_child(parent, a).unwrap();
    doc.append_child(parent, b).unwrap();

    doc.insert_before(parent, a, Some(a)).unwrap();

    assert_eq!(doc.children(parent), &[a, b]);
}

#[test]
fn test_append_moves_existing_child() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let a = element(&mut doc, "a");
    let b = element(&mut doc, "b");
    let c = element(&mut doc, "c");
    for child in [a, b, c] {
        doc.append_child(parent, child).unwrap();
    }

    doc.append_child(parent, a).unwrap();

    assert_eq!(doc.children(parent), &[b, c, a]);
    assert_links(&doc, parent);
}

#[test]
fn test_insert_fragment_moves_children() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let fragment = doc.create_document_fragment();
    let a = element(&mut doc, "a");
    let text = doc.create_text_node("hi");
    doc.append_child(fragment, a).unwrap();
    doc.append_child(fragment, text).unwrap();

    doc.append_child(parent, fragment).unwrap();

    assert_eq!(doc.children(parent), &[a, text]);
    assert!(doc.children(fragment).is_empty());
    assert_links(&doc, parent);
}

// ========== replace_child ==========

#[test]
fn test_replace_child() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let a = element(&mut doc, "a");
    let b = element(&mut doc, "b");
    let c = element(&mut doc, "c");
    doc.append_child(parent, a).unwrap();
    doc.append_child(parent, b).unwrap();

    let replaced = doc.replace_child(parent, c, a).unwrap();

    assert_eq!(replaced, a);
    assert_eq!(doc.children(parent), &[c, b]);
    assert_eq!(doc.parent(a), None);
    assert_links(&doc, parent);
}

#[test]
fn test_replace_child_with_next_sibling() {
    let mut doc = Document::default();
    let parent = element(&mut doc, "div");
    let a = element(&mut doc, "a");
    let b = element(&mut doc, "b");
    let c = element(&mut doc, "c");
    for child in [a, b, c] {
        doc.append_child(parent, child).unwrap();
    }

    doc.replace_child(parent, b, a).unwrap();

    assert_eq!(doc.children(parent), &[b, c]);
}

// ========== validity checks ==========

#[test]
fn test_cannot_insert_ancestor() {
    let mut doc = Document::default();
    let outer = element(&mut doc, "div");
    let inner = element(&mut doc, "span");
    doc.append_child(outer, inner).unwrap();

    let err = doc.append_child(inner, outer).unwrap_err();
    assert!(matches!(err, DomException::HierarchyRequest(_)));

    let err = doc.append_child(outer, outer).unwrap_err();
    assert!(matches!(err, DomException::HierarchyRequest(_)));
}

#[test]
fn test_text_cannot_have_children() {
    let mut doc = Document::default();
    let text = doc.create_text_node("x");
    let span = element(&mut doc, "span");

    let err = doc.append_child(text, span).unwrap_err();
    assert!(matches!(err, DomException::HierarchyRequest(_)));
}

#[test]
fn test_document_accepts_one_element() {
    let mut doc = Document::default();
    let html = element(&mut doc, "html");
    let second = element(&mut doc, "html");
    doc.append_child(doc.root(), html).unwrap();

    let err = doc.append_child(doc.root(), second).unwrap_err();
    assert!(matches!(err, DomException::HierarchyRequest(_)));
    assert_eq!(doc.document_element(), Some(html));
}

#[test]
fn test_document_rejects_text_child() {
    let mut doc = Document::default();
    let text = doc.create_text_node("stray");

    let err = doc.append_child(doc.root(), text).unwrap_err();
    assert_eq!(err.code(), 3);
}

#[test]
fn test_doctype_must_precede_element() {
    let mut doc = Document::default();
    let html = element(&mut doc, "html");
    doc.append_child(doc.root(), html).unwrap();

    let doctype = doc.create_document_type("html", "", "");
    let err = doc.append_child(doc.root(), doctype).unwrap_err();
    assert!(matches!(err, DomException::HierarchyRequest(_)));

    doc.insert_before(doc.root(), doctype, Some(html)).unwrap();
    assert_eq!(doc.doctype(), Some(doctype));
    assert_eq!(doc.node_type(doc.children(doc.root())[0]), Some(NodeType::DocumentType));
}

#[test]
fn test_doctype_only_inside_document() {
    let mut doc = Document::default();
    let div = element(&mut doc, "div");
    let doctype = doc.create_document_type("html", "", "");

    let err = doc.append_child(div, doctype).unwrap_err();
    assert!(matches!(err, DomException::HierarchyRequest(_)));
}

#[test]
fn test_wrong_document() {
    let mut first = Document::default();
    let mut second = Document::default();
    let foreign = second.create_element("div").unwrap();
    let local = first.create_element("div").unwrap();

    let err = first.append_child(local, foreign).unwrap_err();
    assert_eq!(err, DomException::WrongDocument);
    assert_eq!(err.name(), "WrongDocumentError");
}

#[test]
fn test_invalid_element_name() {
    let mut doc = Document::default();
    let err = doc.create_element("1bad").unwrap_err();
    assert!(matches!(err, DomException::InvalidCharacter(_)));

    let err = doc.create_element_ns(None, "svg:rect").unwrap_err();
    assert!(matches!(err, DomException::Namespace(_)));
}

#[test]
fn test_create_element_lowercases_in_html_document() {
    let mut doc = Document::default();
    let div = doc.create_element("DIV").unwrap();
    let data = doc.as_element(div).unwrap();
    assert_eq!(data.local_name(), "div");
    assert_eq!(data.tag_name(), "DIV");
}

// ========== character data ==========

#[test]
fn test_text_content() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let p = element(&mut doc, "p");
    let hello = doc.create_text_node("Hello ");
    let b = element(&mut doc, "b");
    let world = doc.create_text_node("World");
    doc.append_child(body, p).unwrap();
    doc.append_child(p, hello).unwrap();
    doc.append_child(p, b).unwrap();
    doc.append_child(b, world).unwrap();

    assert_eq!(doc.text_content(p).as_deref(), Some("Hello World"));

    doc.set_text_content(p, "replaced").unwrap();
    assert_eq!(doc.children(p).len(), 1);
    assert_eq!(doc.text_content(p).as_deref(), Some("replaced"));
    assert!(!doc.is_rooted(b));
}

#[test]
fn test_append_data() {
    let mut doc = Document::default();
    let text = doc.create_text_node("abc");
    doc.append_data(text, "def").unwrap();
    assert_eq!(doc.as_text(text), Some("abcdef"));

    let div = element(&mut doc, "div");
    let err = doc.append_data(div, "x").unwrap_err();
    assert!(matches!(err, DomException::InvalidNodeType(_)));
}

// ========== cloning and equality ==========

#[test]
fn test_clone_node_deep_and_shallow() {
    let mut doc = Document::default();
    let div = element(&mut doc, "div");
    doc.set_attribute(div, "class", "box").unwrap();
    let text = doc.create_text_node("content");
    doc.append_child(div, text).unwrap();

    let shallow = doc.clone_node(div, false).unwrap();
    assert!(doc.children(shallow).is_empty());
    assert_eq!(doc.get_attribute(shallow, "class"), Some("box"));

    let deep = doc.clone_node(div, true).unwrap();
    assert!(doc.is_equal_node(div, &doc, deep));
    assert_ne!(deep, div);
    assert_eq!(doc.parent(deep), None);
}

#[test]
fn test_import_node_between_documents() {
    let mut source = Document::default();
    let span = source.create_element("span").unwrap();
    let text = source.create_text_node("x");
    source.append_child(span, text).unwrap();

    let mut target = Document::default();
    let copy = target.import_node(&source, span, true).unwrap();

    assert_eq!(copy.document(), target.id());
    assert!(target.is_equal_node(copy, &source, span));
}

#[test]
fn test_is_equal_node_attribute_order_insensitive() {
    let mut doc = Document::default();
    let a = element(&mut doc, "div");
    let b = element(&mut doc, "div");
    doc.set_attribute(a, "x", "1").unwrap();
    doc.set_attribute(a, "y", "2").unwrap();
    doc.set_attribute(b, "y", "2").unwrap();
    doc.set_attribute(b, "x", "1").unwrap();
    assert!(doc.is_equal_node(a, &doc, b));

    doc.set_attribute(b, "x", "3").unwrap();
    assert!(!doc.is_equal_node(a, &doc, b));
}

#[test]
fn test_template_has_contents_fragment() {
    let mut doc = Document::default();
    let template = element(&mut doc, "template");
    let contents = doc
        .as_element(template)
        .and_then(|data| data.template_contents())
        .expect("template contents");
    assert_eq!(doc.node_type(contents), Some(NodeType::DocumentFragment));
}
