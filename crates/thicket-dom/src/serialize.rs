//! HTML serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use crate::document::Document;
use crate::element::{ElementData, HtmlTag, Namespace};
use crate::node::{NodeData, NodeId};

/// "escaping a string": in attribute mode `"` is escaped, otherwise `<` and
/// `>` are; `&` and U+00A0 always are.
fn escape(text: &str, attribute_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element ... then append the value of current
/// node's data IDL attribute literally."
const fn is_raw_text_parent(tag: HtmlTag) -> bool {
    matches!(
        tag,
        HtmlTag::Style
            | HtmlTag::Script
            | HtmlTag::Xmp
            | HtmlTag::Iframe
            | HtmlTag::Noembed
            | HtmlTag::Noframes
            | HtmlTag::Plaintext
    )
}

fn serialized_tag_name(data: &ElementData) -> String {
    // "If current node is an element in the HTML namespace, the MathML
    //  namespace, or the SVG namespace, then let tagname be current node's
    //  local name. Otherwise, let tagname be current node's qualified name."
    match data.namespace() {
        Namespace::Html | Namespace::MathMl | Namespace::Svg => data.local_name().to_string(),
        _ => data.name().qualified().into_owned(),
    }
}

fn serialize_attributes(data: &ElementData, out: &mut String) {
    for attr in data.attrs() {
        out.push(' ');
        // "Attribute's serialized name"
        match &attr.name.ns {
            Namespace::None => out.push_str(&attr.name.local),
            Namespace::Xml => {
                out.push_str("xml:");
                out.push_str(&attr.name.local);
            }
            Namespace::Xmlns if attr.name.local == "xmlns" => out.push_str("xmlns"),
            Namespace::Xmlns => {
                out.push_str("xmlns:");
                out.push_str(&attr.name.local);
            }
            Namespace::XLink => {
                out.push_str("xlink:");
                out.push_str(&attr.name.local);
            }
            _ => out.push_str(&attr.name.qualified()),
        }
        out.push_str("=\"");
        escape(&attr.value, true, out);
        out.push('"');
    }
}

impl Document {
    /// The node whose children are serialized for `id`: template contents for
    /// `template`, the node itself otherwise.
    fn serialization_parent(&self, id: NodeId) -> NodeId {
        self.as_element(id)
            .and_then(ElementData::template_contents)
            .unwrap_or(id)
    }

    fn serialize_children_into(&self, id: NodeId, out: &mut String) {
        for &child in self.children(self.serialization_parent(id)) {
            self.serialize_node_into(child, id, out);
        }
    }

    fn serialize_node_into(&self, id: NodeId, parent: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        match node.data() {
            NodeData::Element(data) => {
                let tag = serialized_tag_name(data);
                out.push('<');
                out.push_str(&tag);
                serialize_attributes(data, out);
                out.push('>');

                // "If current node serializes as void, then continue on to the
                //  next child node at this point."
                if data.html_tag().is_some_and(HtmlTag::is_void) {
                    return;
                }

                // A leading newline in these elements is dropped by the parser,
                // so one is added back to keep the content intact.
                if matches!(
                    data.html_tag(),
                    Some(HtmlTag::Pre | HtmlTag::Textarea | HtmlTag::Listing)
                ) && self
                    .first_child(id)
                    .and_then(|first| self.as_text(first))
                    .is_some_and(|text| text.starts_with('\n'))
                {
                    out.push('\n');
                }

                self.serialize_children_into(id, out);
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
            NodeData::Text(text) => {
                let raw = self
                    .as_element(parent)
                    .and_then(ElementData::html_tag)
                    .is_some_and(is_raw_text_parent);
                if raw {
                    out.push_str(text);
                } else {
                    escape(text, false, out);
                }
            }
            NodeData::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
            NodeData::DocumentType { name, .. } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Document | NodeData::DocumentFragment => {
                self.serialize_children_into(id, out);
            }
        }
    }

    /// [§ 3.5.1](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml)
    /// Serialize the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_children_into(id, &mut out);
        out
    }

    /// Serialize `id` itself, including its start and end tags.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let parent = self.parent(id).unwrap_or(id);
        self.serialize_node_into(id, parent, &mut out);
        out
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }
}
