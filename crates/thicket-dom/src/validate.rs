//! Name validation for the DOM factory and attribute methods.
//!
//! [§ 1.6 Namespaces](https://dom.spec.whatwg.org/#namespaces)

use crate::element::{Namespace, QualName};
use crate::error::{DomException, DomResult};

const fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || !c.is_ascii()
}

const fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// XML `Name` production, restricted to ASCII plus any non-ASCII code point.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

/// [§ 1.6](https://dom.spec.whatwg.org/#valid-attribute-local-name)
/// "A string is a valid attribute local name if its length is at least 1 and
/// it does not contain ASCII whitespace, U+0000 NULL, U+002F (/), U+003D (=),
/// or U+003E (>)."
pub(crate) fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_ascii_whitespace() || matches!(c, '\0' | '/' | '=' | '>'))
}

/// [§ 1.6](https://dom.spec.whatwg.org/#validate-and-extract)
pub(crate) fn validate_and_extract(ns: Option<&str>, qname: &str) -> DomResult<QualName> {
    // STEP 1: "If namespace is the empty string, then set it to null."
    let ns = Namespace::from_url(ns);

    // STEP 2-4: "Let prefix be null. Let localName be qualifiedName. If
    //            qualifiedName contains a U+003A (:), then strictly split the
    //            string on it and set prefix to the part before and localName
    //            to the part after."
    let (prefix, local) = match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    };
    let valid = match prefix {
        Some(prefix) => is_valid_name(prefix) && is_valid_name(local) && !local.contains(':'),
        None => is_valid_name(local),
    };
    if !valid {
        return Err(DomException::InvalidCharacter(qname.to_string()));
    }

    // STEP 7: "If prefix is non-null and namespace is null, then throw a
    //          "NamespaceError" DOMException."
    if prefix.is_some() && ns == Namespace::None {
        return Err(DomException::Namespace("prefix without a namespace"));
    }
    // STEP 8: "If prefix is "xml" and namespace is not the XML namespace..."
    if prefix == Some("xml") && ns != Namespace::Xml {
        return Err(DomException::Namespace("xml prefix outside the XML namespace"));
    }
    // STEP 9: "If either qualifiedName or prefix is "xmlns" and namespace is
    //          not the XMLNS namespace..."
    if (qname == "xmlns" || prefix == Some("xmlns")) && ns != Namespace::Xmlns {
        return Err(DomException::Namespace("xmlns outside the XMLNS namespace"));
    }
    // STEP 10: "If namespace is the XMLNS namespace and neither qualifiedName
    //           nor prefix is "xmlns"..."
    if ns == Namespace::Xmlns && qname != "xmlns" && prefix != Some("xmlns") {
        return Err(DomException::Namespace("XMLNS namespace requires xmlns"));
    }

    Ok(QualName::new(prefix, ns, local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert!(is_valid_name("div"));
        assert!(is_valid_name("my-element"));
        assert!(!is_valid_name("1div"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a b"));
    }

    #[test]
    fn test_validate_and_extract() {
        let name = validate_and_extract(Some(Namespace::XLINK_URL), "xlink:href").unwrap();
        assert_eq!(name.prefix.as_deref(), Some("xlink"));
        assert_eq!(name.local, "href");
        assert_eq!(name.ns, Namespace::XLink);

        assert!(matches!(
            validate_and_extract(None, "a:b"),
            Err(DomException::Namespace(_))
        ));
        assert!(matches!(
            validate_and_extract(Some(Namespace::SVG_URL), "xml:lang"),
            Err(DomException::Namespace(_))
        ));
        assert!(matches!(
            validate_and_extract(Some(Namespace::XMLNS_URL), "foo"),
            Err(DomException::Namespace(_))
        ));
        assert!(matches!(
            validate_and_extract(None, "a:b:c"),
            Err(DomException::InvalidCharacter(_))
        ));
    }
}
