//! Interfaces to the CSS collaborators.
//!
//! The declaration parser (for `style` attributes) and the selector engine
//! (for `query_selector`) live outside this crate. The document only calls
//! through these traits.

use indexmap::IndexMap;

use crate::document::Document;
use crate::node::NodeId;

/// Parses the contents of a `style` attribute.
pub trait DeclarationParser {
    /// [CSSOM § 6.6.1](https://drafts.csswg.org/cssom/#parse-a-css-declaration-block)
    /// Property name to value, in declaration order. Later duplicates win.
    fn parse_declarations(&self, text: &str) -> IndexMap<String, String>;
}

/// Matches selectors against a document.
pub trait SelectorEngine {
    /// Elements under `root` (inclusive) matching `selector`, in tree order.
    fn select(&self, document: &Document, selector: &str, root: NodeId) -> Vec<NodeId>;
}

impl Document {
    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
    /// Descendant elements of `root` matching `selector`; `root` itself is
    /// excluded.
    #[must_use]
    pub fn query_selector_all(
        &self,
        engine: &dyn SelectorEngine,
        root: NodeId,
        selector: &str,
    ) -> Vec<NodeId> {
        engine
            .select(self, selector, root)
            .into_iter()
            .filter(|&id| id != root && self.as_element(id).is_some())
            .collect()
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
    #[must_use]
    pub fn query_selector(
        &self,
        engine: &dyn SelectorEngine,
        root: NodeId,
        selector: &str,
    ) -> Option<NodeId> {
        self.query_selector_all(engine, root, selector)
            .into_iter()
            .next()
    }

    /// Parsed declarations of the element's `style` attribute. Empty when the
    /// attribute is absent.
    #[must_use]
    pub fn style(&self, parser: &dyn DeclarationParser, element: NodeId) -> IndexMap<String, String> {
        self.get_attribute(element, "style")
            .map(|text| parser.parse_declarations(text))
            .unwrap_or_default()
    }
}
