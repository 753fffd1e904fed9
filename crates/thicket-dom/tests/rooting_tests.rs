//! Tests for rooting: external ids, the id index, mutation events, the dual
//! attribute index, and the modification clock.

use std::cell::RefCell;
use std::rc::Rc;

use quickcheck_macros::quickcheck;
use thicket_dom::{
    Document, DomException, MutationEvent, MutationKind, Namespace, NodeId,
};

fn element(doc: &mut Document, tag: &str) -> NodeId {
    doc.create_element(tag).expect("valid element name")
}

fn html_body(doc: &mut Document) -> NodeId {
    let html = element(doc, "html");
    let body = element(doc, "body");
    doc.append_child(doc.root(), html).unwrap();
    doc.append_child(html, body).unwrap();
    body
}

/// Install a handler that records every event.
fn record_events(doc: &mut Document) -> Rc<RefCell<Vec<MutationEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    doc.set_mutation_handler(Some(Box::new(move |event: &MutationEvent| {
        sink.borrow_mut().push(event.clone());
    })));
    events
}

fn kinds(events: &Rc<RefCell<Vec<MutationEvent>>>) -> Vec<MutationKind> {
    events.borrow().iter().map(MutationEvent::kind).collect()
}

// ========== rooting ==========

#[test]
fn test_subtree_rooted_on_insert() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);

    let div = element(&mut doc, "div");
    let span = element(&mut doc, "span");
    doc.append_child(div, span).unwrap();
    assert!(!doc.is_rooted(div));
    assert!(!doc.is_rooted(span));
    assert_eq!(doc.nid(span), None);

    doc.append_child(body, div).unwrap();
    assert!(doc.is_rooted(div));
    assert!(doc.is_rooted(span));

    let nid = doc.nid(span).expect("rooted nodes have an id");
    assert_eq!(doc.node_by_nid(nid), Some(span));

    doc.remove_child(body, div).unwrap();
    assert!(!doc.is_rooted(span));
    assert_eq!(doc.node_by_nid(nid), None);
}

#[test]
fn test_one_event_per_insert() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let events = record_events(&mut doc);

    let div = element(&mut doc, "div");
    for _ in 0..3 {
        let child = element(&mut doc, "p");
        doc.append_child(div, child).unwrap();
    }
    // Detached subtree: nothing reported yet.
    assert!(events.borrow().is_empty());

    doc.append_child(body, div).unwrap();
    assert_eq!(kinds(&events), vec![MutationKind::Insert]);
    assert_eq!(
        events.borrow()[0],
        MutationEvent::Insert {
            target: div,
            parent: body,
            index: 0,
        }
    );
}

#[test]
fn test_move_and_remove_events() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let first = element(&mut doc, "div");
    let second = element(&mut doc, "div");
    doc.append_child(body, first).unwrap();
    doc.append_child(body, second).unwrap();
    let events = record_events(&mut doc);

    doc.append_child(second, first).unwrap();
    let nid = doc.nid(second).unwrap();
    doc.remove_child(body, second).unwrap();

    assert_eq!(kinds(&events), vec![MutationKind::Move, MutationKind::Remove]);
    assert_eq!(
        events.borrow()[1],
        MutationEvent::Remove {
            target: second,
            nid,
            parent: body,
        }
    );
}

#[test]
fn test_attribute_and_value_events() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let text = doc.create_text_node("a");
    doc.append_child(body, text).unwrap();
    let events = record_events(&mut doc);

    doc.set_attribute(body, "class", "x").unwrap();
    doc.remove_attribute(body, "class").unwrap();
    doc.set_character_data(text, "b").unwrap();

    assert_eq!(
        kinds(&events),
        vec![MutationKind::Attr, MutationKind::RemoveAttr, MutationKind::Value]
    );
    assert_eq!(MutationKind::RemoveAttr.to_string(), "REMOVE_ATTR");
}

#[test]
fn test_append_data_reports_the_whole_text() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let text = doc.create_text_node("a");
    doc.append_child(body, text).unwrap();
    let events = record_events(&mut doc);

    doc.append_data(text, "b").unwrap();
    doc.append_data(text, "c").unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            MutationEvent::Value {
                target: text,
                data: "ab".to_string(),
            },
            MutationEvent::Value {
                target: text,
                data: "abc".to_string(),
            },
        ]
    );
}

#[test]
fn test_append_data_without_handler() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let text = doc.create_text_node("");
    doc.append_child(body, text).unwrap();

    for _ in 0..10_000 {
        doc.append_data(text, "abcdefghij").unwrap();
    }
    assert_eq!(doc.as_text(text).map(str::len), Some(100_000));
}

// ========== unchecked insertion ==========

#[test]
fn test_insert_before_unchecked_roots_and_reports() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let first = element(&mut doc, "p");
    doc.append_child(body, first).unwrap();
    let events = record_events(&mut doc);

    let second = element(&mut doc, "p");
    doc.insert_before_unchecked(body, second, Some(first)).unwrap();
    assert!(doc.is_rooted(second));
    assert_eq!(doc.children(body), [second, first]);

    // Moving a rooted node is a MOVE, as with the checked API.
    doc.insert_before_unchecked(body, second, None).unwrap();
    assert_eq!(doc.children(body), [first, second]);
    assert_eq!(kinds(&events), vec![MutationKind::Insert, MutationKind::Move]);
}

#[test]
fn test_insert_before_unchecked_still_checks_ownership() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let stray = element(&mut doc, "p");
    let node = element(&mut doc, "span");
    assert!(matches!(
        doc.insert_before_unchecked(body, node, Some(stray)),
        Err(DomException::NotFound(_))
    ));
    assert_eq!(doc.parent(node), None);

    let mut other = Document::default();
    let foreign = element(&mut other, "div");
    assert_eq!(
        doc.insert_before_unchecked(body, foreign, None),
        Err(DomException::WrongDocument)
    );
}

// ========== id index ==========

#[test]
fn test_get_element_by_id_follows_attribute_changes() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let div = element(&mut doc, "div");
    doc.append_child(body, div).unwrap();

    doc.set_attribute(div, "id", "first").unwrap();
    assert_eq!(doc.get_element_by_id("first"), Some(div));

    doc.set_attribute(div, "id", "second").unwrap();
    assert_eq!(doc.get_element_by_id("first"), None);
    assert_eq!(doc.get_element_by_id("second"), Some(div));

    doc.remove_attribute(div, "id").unwrap();
    assert_eq!(doc.get_element_by_id("second"), None);
}

#[test]
fn test_id_index_ignores_detached_elements() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let div = element(&mut doc, "div");
    doc.set_attribute(div, "id", "x").unwrap();
    assert_eq!(doc.get_element_by_id("x"), None);

    doc.append_child(body, div).unwrap();
    assert_eq!(doc.get_element_by_id("x"), Some(div));

    doc.remove(div);
    assert_eq!(doc.get_element_by_id("x"), None);
}

#[test]
fn test_duplicate_ids_in_tree_order() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let later = element(&mut doc, "p");
    let earlier = element(&mut doc, "p");
    doc.set_attribute(later, "id", "dup").unwrap();
    doc.set_attribute(earlier, "id", "dup").unwrap();

    doc.append_child(body, later).unwrap();
    doc.insert_before(body, earlier, Some(later)).unwrap();

    assert_eq!(doc.elements_with_id("dup"), &[earlier, later]);
    assert_eq!(doc.get_element_by_id("dup"), Some(earlier));

    // Moving the first one to the end re-sorts the index.
    doc.append_child(body, earlier).unwrap();
    assert_eq!(doc.get_element_by_id("dup"), Some(later));
}

// ========== attributes ==========

#[test]
fn test_attribute_names_fold_case_for_html() {
    let mut doc = Document::default();
    let div = element(&mut doc, "div");
    doc.set_attribute(div, "DATA-Foo", "1").unwrap();
    assert_eq!(doc.get_attribute(div, "data-foo"), Some("1"));
    assert_eq!(doc.get_attribute(div, "DATA-FOO"), Some("1"));
    assert_eq!(doc.attribute_names(div), vec!["data-foo".to_string()]);
}

#[test]
fn test_same_qualified_name_in_two_namespaces() {
    let mut doc = Document::default();
    let svg = doc
        .create_element_ns(Some(Namespace::SVG_URL), "svg")
        .unwrap();
    doc.set_attribute_ns(svg, Some("urn:a"), "p:href", "a").unwrap();
    doc.set_attribute_ns(svg, Some("urn:b"), "p:href", "b").unwrap();

    let attrs = doc.as_element(svg).unwrap().attrs();
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs.all_named("p:href").len(), 2);
    // "get an attribute by name" returns the first one.
    assert_eq!(doc.get_attribute(svg, "p:href"), Some("a"));
    assert_eq!(doc.get_attribute_ns(svg, Some("urn:b"), "href"), Some("b"));

    assert!(doc.remove_attribute(svg, "p:href").unwrap());
    assert_eq!(doc.get_attribute(svg, "p:href"), Some("b"));
    assert!(doc.remove_attribute_ns(svg, Some("urn:b"), "href").unwrap());
    assert!(!doc.has_attribute(svg, "p:href"));
    assert!(doc.as_element(svg).unwrap().attrs().is_empty());
}

#[test]
fn test_set_attribute_rejects_bad_names() {
    let mut doc = Document::default();
    let div = element(&mut doc, "div");
    let err = doc.set_attribute(div, "a b", "x").unwrap_err();
    assert!(matches!(err, DomException::InvalidCharacter(_)));

    let text = doc.create_text_node("t");
    let err = doc.set_attribute(text, "a", "x").unwrap_err();
    assert!(matches!(err, DomException::InvalidNodeType(_)));
}

// ========== modification clock ==========

#[test]
fn test_last_mod_time_propagates_to_stamped_ancestors() {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let div = element(&mut doc, "div");
    doc.append_child(body, div).unwrap();

    let body_before = doc.last_mod_time(body);
    let div_before = doc.last_mod_time(div);
    assert_eq!(body_before, div_before);

    let span = element(&mut doc, "span");
    doc.append_child(div, span).unwrap();

    assert!(doc.last_mod_time(div) > div_before);
    assert!(doc.last_mod_time(body) > body_before);
    assert_eq!(doc.last_mod_time(div), doc.last_mod_time(body));
}

// ========== properties ==========

/// Any sequence of appends and removals keeps parent links, cached indices,
/// and the id index consistent.
#[quickcheck]
fn prop_links_and_ids_stay_consistent(ops: Vec<(u8, u8, bool)>) -> bool {
    let mut doc = Document::default();
    let body = html_body(&mut doc);
    let mut nodes = vec![body];
    for i in 0..6 {
        let div = element(&mut doc, "div");
        doc.set_attribute(div, "id", &format!("n{}", i % 3)).unwrap();
        nodes.push(div);
    }

    for (parent, child, remove) in ops {
        let parent = nodes[usize::from(parent) % nodes.len()];
        let child = nodes[1 + usize::from(child) % (nodes.len() - 1)];
        if remove {
            doc.remove(child);
        } else {
            // Hierarchy errors are expected for cycles; they must not corrupt
            // the tree.
            let _ = doc.append_child(parent, child);
        }
    }

    let links_ok = doc.descendants(doc.root()).all(|id| {
        doc.children(id)
            .iter()
            .enumerate()
            .all(|(i, &c)| doc.parent(c) == Some(id) && doc.index_in_parent(c) == Some(i))
    });

    let ids_ok = (0..3).all(|i| {
        let value = format!("n{i}");
        let mut expected: Vec<NodeId> = doc
            .descendants(doc.root())
            .filter(|&id| doc.get_attribute(id, "id") == Some(value.as_str()))
            .collect();
        let indexed = doc.elements_with_id(&value).to_vec();
        expected.sort_by(|&a, &b| doc.compare_tree_order(a, b));
        expected == indexed
    });

    links_ok && ids_ok
}
