//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

use thicket_dom::{Attr, ElementData, Namespace, QualName};

use self::mathml::{adjust_mathml_attribute_name, is_mathml_text_integration_point};
use self::svg::{adjust_svg_attribute_name, adjust_svg_tag_name};
use super::core::{TreeBuilder, is_whitespace};
use crate::tokenizer::{Attribute, Token};

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "When the steps below require the user agent to adjust foreign attributes
/// for a token, then, if any of the attributes on the token match the strings
/// in the first column of the following table, let the attribute be a namespaced
/// attribute, with the prefix being the string in the second column, the local
/// name being the string in the third column, and the namespace being the
/// namespace in the fourth column."
///
/// Format: (`attribute_name`, prefix, `local_name`, namespace)
const FOREIGN_ATTRIBUTES: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::Xmlns),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::Xmlns),
];

/// Turn a foreign start tag's attributes into DOM attributes.
///
/// Runs "adjust MathML attributes" or "adjust SVG attributes" for the
/// element's namespace, then "adjust foreign attributes".
#[must_use]
pub fn adjust_foreign_attributes(namespace: &Namespace, attributes: &[Attribute]) -> Vec<Attr> {
    attributes
        .iter()
        .map(|attr| {
            let name = match namespace {
                Namespace::Svg => adjust_svg_attribute_name(&attr.name),
                Namespace::MathMl => adjust_mathml_attribute_name(&attr.name),
                _ => attr.name.as_str(),
            };
            let qname = FOREIGN_ATTRIBUTES
                .iter()
                .find(|(from, ..)| *from == name)
                .map_or_else(
                    || QualName::new(None, Namespace::None, name),
                    |(_, prefix, local, ns)| QualName::new(*prefix, ns.clone(), local),
                );
            Attr {
                name: qname,
                value: attr.value.clone(),
            }
        })
        .collect()
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
///
/// "A node is an HTML integration point if it is one of the following
/// elements: A MathML annotation-xml element whose start tag token had an
/// attribute with the name "encoding" whose value was an ASCII
/// case-insensitive match for the string "text/html"; A MathML
/// annotation-xml element whose start tag token had an attribute with the
/// name "encoding" whose value was an ASCII case-insensitive match for the
/// string "application/xhtml+xml"; An SVG foreignObject element; An SVG desc
/// element; An SVG title element"
#[must_use]
pub fn is_html_integration_point(element: &ElementData) -> bool {
    match element.namespace() {
        Namespace::MathMl => {
            element.local_name() == "annotation-xml"
                && element.attrs().get("encoding").is_some_and(|encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                })
        }
        Namespace::Svg => matches!(element.local_name(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// Start tags that break out of foreign content.
fn is_breakout_tag(name: &str, attributes: &[Attribute]) -> bool {
    match name {
        "b" | "big" | "blockquote" | "body" | "br" | "center" | "code" | "dd" | "div" | "dl"
        | "dt" | "em" | "embed" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "head" | "hr" | "i"
        | "img" | "li" | "listing" | "menu" | "meta" | "nobr" | "ol" | "p" | "pre" | "ruby"
        | "s" | "small" | "span" | "strong" | "strike" | "sub" | "sup" | "table" | "tt" | "u"
        | "ul" | "var" => true,
        // "A start tag whose tag name is "font", if the token has any
        //  attributes named "color", "face", or "size""
        "font" => attributes
            .iter()
            .any(|attr| matches!(attr.name.as_str(), "color" | "face" | "size")),
        _ => false,
    }
}

impl TreeBuilder {
    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(super) fn process_foreign_content(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL: Parse error. Insert a
            //  U+FFFD REPLACEMENT CHARACTER character."
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Insert the token's character."
            // "Any other character token: Insert the token's character. Set
            //  the frameset-ok flag to "not ok"."
            Token::Text { data } => {
                if data.contains('\0') {
                    self.parse_error("unexpected-null-character");
                }
                if data.chars().any(|c| c != '\0' && !is_whitespace(c)) {
                    self.frameset_ok = false;
                }
                self.insert_text(&data.replace('\0', "\u{FFFD}"));
            }
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is one of: "b", "big", ... "var"
            //  A start tag whose tag name is "font", if the token has any
            //  attributes named "color", "face", or "size"
            //  An end tag whose tag name is "br", "p""
            Token::StartTag {
                name, attributes, ..
            } if is_breakout_tag(name, attributes) => self.break_out_of_foreign_content(token),
            Token::EndTag { name, .. } if name == "br" || name == "p" => {
                self.break_out_of_foreign_content(token);
            }

            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                // "Any other start tag"
                let Some(namespace) = self
                    .adjusted_current_node()
                    .and_then(|id| self.document.as_element(id))
                    .map(|element| element.namespace().clone())
                else {
                    return;
                };
                // "If the adjusted current node is an element in the SVG
                //  namespace, adjust SVG tag names."
                let local = if namespace == Namespace::Svg {
                    adjust_svg_tag_name(name)
                } else {
                    name.as_str()
                };
                // "Insert a foreign element for the token, with adjusted
                //  current node's namespace"
                let _ = self.insert_element(local, attributes, namespace);

                // "If the token has its self-closing flag set, then run the
                //  appropriate steps from the following list: ... Pop the
                //  current node off the stack of open elements and
                //  acknowledge the token's self-closing flag."
                if *self_closing {
                    self.pop_current_node();
                    self.acknowledge_self_closing();
                }
            }

            // "An end tag whose tag name is "script", if the current node is
            //  an SVG script element: Pop the current node off the stack of
            //  open elements."
            Token::EndTag { name, .. }
                if name == "script"
                    && self.current_node().is_some_and(|id| {
                        self.document
                            .as_element(id)
                            .is_some_and(|element| element.is(&Namespace::Svg, "script"))
                    }) =>
            {
                self.pop_current_node();
            }

            Token::EndTag { name, .. } => self.foreign_end_tag(name, token),

            Token::EndOfFile => self.process_using(self.insertion_mode, token),
        }
    }

    /// "Parse error. While the current node is not a MathML text integration
    /// point, an HTML integration point, or an element in the HTML namespace,
    /// pop elements from the stack of open elements. Reprocess the token
    /// according to the rules given in the section corresponding to the
    /// current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: &Token) {
        self.unexpected_token(token);
        while let Some(id) = self.current_node() {
            let stop = self.document.as_element(id).is_none_or(|element| {
                *element.namespace() == Namespace::Html
                    || is_mathml_text_integration_point(element)
                    || is_html_integration_point(element)
            });
            if stop {
                break;
            }
            self.pop_current_node();
        }
        self.process_using(self.insertion_mode, token);
    }

    /// "Any other end tag"
    fn foreign_end_tag(&mut self, name: &str, token: &Token) {
        let local_name_of = |builder: &Self, index: usize| {
            builder
                .open_elements
                .get(index)
                .and_then(|id| builder.document.as_element(id))
                .map(|element| element.local_name().to_ascii_lowercase())
        };

        // STEP 1: "Initialize node to be the current node (the bottommost
        //          node of the stack)."
        let Some(mut index) = self.open_elements.len().checked_sub(1) else {
            return;
        };

        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not
        //          the same as the tag name of the token, then this is a parse
        //          error."
        if local_name_of(self, index).as_deref() != Some(name) {
            self.unexpected_token(token);
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of
            //          open elements, then return. (fragment case)"
            if index == 0 {
                return;
            }
            // STEP 4: "If node's tag name, converted to ASCII lowercase, is
            //          the same as the tag name of the token, pop elements
            //          from the stack of open elements until node has been
            //          popped from the stack, and then return."
            if local_name_of(self, index).as_deref() == Some(name) {
                self.open_elements.truncate(index);
                return;
            }
            // STEP 5: "Set node to the previous entry in the stack of open
            //          elements."
            index -= 1;
            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            let is_html = self
                .open_elements
                .get(index)
                .and_then(|id| self.document.as_element(id))
                .is_some_and(|element| *element.namespace() == Namespace::Html);
            if is_html {
                // STEP 7: "Otherwise, process the token according to the rules
                //          given in the section corresponding to the current
                //          insertion mode in HTML content."
                self.process_using(self.insertion_mode, token);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xlink_href_is_namespaced() {
        let attrs = adjust_foreign_attributes(
            &Namespace::Svg,
            &[Attribute::new("xlink:href", "#a"), Attribute::new("viewbox", "0 0 1 1")],
        );
        assert_eq!(attrs[0].name.ns, Namespace::XLink);
        assert_eq!(attrs[0].name.prefix.as_deref(), Some("xlink"));
        assert_eq!(attrs[0].name.local, "href");
        assert_eq!(attrs[1].name.local, "viewBox");
        assert_eq!(attrs[1].name.ns, Namespace::None);
    }

    #[test]
    fn mathml_definition_url() {
        let attrs =
            adjust_foreign_attributes(&Namespace::MathMl, &[Attribute::new("definitionurl", "x")]);
        assert_eq!(attrs[0].name.local, "definitionURL");
    }

    #[test]
    fn font_breaks_out_only_with_presentational_attributes() {
        assert!(!is_breakout_tag("font", &[]));
        assert!(is_breakout_tag("font", &[Attribute::new("color", "red")]));
        assert!(is_breakout_tag("div", &[]));
        assert!(!is_breakout_tag("circle", &[]));
    }
}
