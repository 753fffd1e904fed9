//! JSON dump of a parsed tree.

use serde::Serialize;
use thicket_dom::{Document, Namespace, NodeData, NodeId};

/// One node of the dump. Template contents appear under `content`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsonNode {
    /// The Document node.
    Document {
        /// Top-level nodes.
        children: Vec<JsonNode>,
    },
    /// A fragment's parsed nodes, or template contents.
    Fragment {
        /// Nodes in tree order.
        children: Vec<JsonNode>,
    },
    /// `<!DOCTYPE ...>`.
    Doctype {
        /// Doctype name.
        name: String,
        /// Public identifier.
        #[serde(skip_serializing_if = "String::is_empty")]
        public_id: String,
        /// System identifier.
        #[serde(skip_serializing_if = "String::is_empty")]
        system_id: String,
    },
    /// An element.
    #[serde(rename_all = "camelCase")]
    Element {
        /// Local name.
        tag_name: String,
        /// Namespace URL, omitted for HTML elements.
        #[serde(skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        /// Qualified attribute names and values, in source order.
        attributes: Vec<(String, String)>,
        /// Template contents.
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<Box<JsonNode>>,
        /// Child nodes.
        children: Vec<JsonNode>,
    },
    /// A text node.
    Text {
        /// Character data.
        content: String,
    },
    /// A comment.
    Comment {
        /// Comment data.
        content: String,
    },
}

impl JsonNode {
    /// Build the dump for the subtree rooted at `id`.
    #[must_use]
    pub fn build(document: &Document, id: NodeId) -> Option<Self> {
        let node = document.get(id)?;
        let children = || children_of(document, id);
        Some(match node.data() {
            NodeData::Document => Self::Document {
                children: children(),
            },
            NodeData::DocumentFragment => Self::Fragment {
                children: children(),
            },
            NodeData::DocumentType {
                name,
                public_id,
                system_id,
            } => Self::Doctype {
                name: name.clone(),
                public_id: public_id.clone(),
                system_id: system_id.clone(),
            },
            NodeData::Element(element) => Self::Element {
                tag_name: element.local_name().to_string(),
                namespace: match element.namespace() {
                    Namespace::Html => None,
                    ns => ns.url().map(str::to_string),
                },
                attributes: element
                    .attrs()
                    .iter()
                    .map(|attr| (attr.qualified_name(), attr.value.clone()))
                    .collect(),
                content: element
                    .template_contents()
                    .and_then(|contents| Self::build(document, contents))
                    .map(Box::new),
                children: children(),
            },
            NodeData::Text(data) => Self::Text {
                content: data.clone(),
            },
            NodeData::Comment(data) => Self::Comment {
                content: data.clone(),
            },
        })
    }

    /// Wrap a fragment's top-level nodes.
    #[must_use]
    pub fn fragment(document: &Document, nodes: &[NodeId]) -> Self {
        Self::Fragment {
            children: nodes
                .iter()
                .filter_map(|&id| Self::build(document, id))
                .collect(),
        }
    }
}

fn children_of(document: &Document, id: NodeId) -> Vec<JsonNode> {
    document
        .children(id)
        .iter()
        .filter_map(|&child| JsonNode::build(document, child))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_html::{ParserOptions, parse_document};

    #[test]
    fn test_dump_shape() {
        let document = parse_document("<!DOCTYPE html><p class=a>x<!--c-->", ParserOptions::new());
        let dump = JsonNode::build(&document, document.root()).expect("root");
        let value = serde_json::to_value(&dump).expect("serializable");

        assert_eq!(value["type"], "document");
        assert_eq!(value["children"][0]["type"], "doctype");
        let body = &value["children"][1]["children"][1];
        assert_eq!(body["tagName"], "body");
        let p = &body["children"][0];
        assert_eq!(p["attributes"][0][0], "class");
        assert_eq!(p["attributes"][0][1], "a");
        assert_eq!(p["children"][0]["content"], "x");
        assert_eq!(p["children"][1]["type"], "comment");
        assert!(p.get("namespace").is_none());
    }

    #[test]
    fn test_svg_namespace_is_reported() {
        let document = parse_document("<svg></svg>", ParserOptions::new());
        let svg = document
            .get_elements_by_tag_name(document.root(), "svg")
            .first()
            .copied()
            .expect("svg");
        let value = serde_json::to_value(JsonNode::build(&document, svg)).expect("serializable");
        assert_eq!(value["namespace"], "http://www.w3.org/2000/svg");
    }
}
