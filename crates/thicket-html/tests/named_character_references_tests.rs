//! Integration tests for named character reference lookup.

use thicket_html::tokenizer::named_character_references::{
    LONGEST_NAME, NAMED_CHARACTER_REFERENCES, longest_match, lookup_entity,
};

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("copy"), Some("\u{A9}"));
    // Not every name has a legacy form
    assert_eq!(lookup_entity("hellip"), None);
    assert_eq!(lookup_entity("hellip;"), Some("\u{2026}"));
}

#[test]
fn test_lookup_multi_code_point_entity() {
    assert_eq!(lookup_entity("NotEqualTilde;"), Some("\u{2242}\u{338}"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_longest_match() {
    assert_eq!(longest_match("amp;rest"), Some((4, "&")));
    assert_eq!(longest_match("ampx"), Some((3, "&")));
    assert_eq!(longest_match("notin;"), Some((6, "\u{2209}")));
    assert_eq!(longest_match("xyz"), None);
}

#[test]
fn test_no_name_exceeds_longest_name() {
    assert!(
        NAMED_CHARACTER_REFERENCES
            .iter()
            .all(|(name, _)| name.len() <= LONGEST_NAME)
    );
    assert!(
        NAMED_CHARACTER_REFERENCES
            .iter()
            .any(|(name, _)| name.len() == LONGEST_NAME)
    );
}
