//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
//!
//! "Initially, the stack of open elements is empty. The stack grows
//! downwards; the topmost node on the stack is the first one added to the
//! stack, and the bottommost node of the stack is the most recently added
//! node in the stack."
//!
//! Index 0 is the topmost node (normally the `html` element); the last entry
//! is the current node.

use thicket_dom::{Document, ElementData, HtmlTag, Namespace, NodeId};

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// The element types that stop a "has an element in ... scope" walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope": the default set plus `ol`, `ul`.
    ListItem,
    /// "has an element in button scope": the default set plus `button`.
    Button,
    /// "has an element in table scope": `html`, `table`, `template`.
    Table,
    /// "has an element in select scope": everything except `optgroup` and
    /// `option`.
    Select,
}

impl Scope {
    fn is_boundary(self, element: &ElementData) -> bool {
        let tag = element.html_tag();
        match self {
            Self::Default => is_default_scope_boundary(element),
            Self::ListItem => {
                is_default_scope_boundary(element) || matches!(tag, Some(HtmlTag::Ol | HtmlTag::Ul))
            }
            Self::Button => is_default_scope_boundary(element) || tag == Some(HtmlTag::Button),
            Self::Table => matches!(
                tag,
                Some(HtmlTag::Html | HtmlTag::Table | HtmlTag::Template)
            ),
            Self::Select => !matches!(tag, Some(HtmlTag::Optgroup | HtmlTag::OptionElement)),
        }
    }
}

/// "The stack of open elements is said to have an element in scope when it
/// has that element in the specific scope consisting of the following
/// element types: applet, caption, html, table, td, th, marquee, object,
/// template, MathML mi, MathML mo, MathML mn, MathML ms, MathML mtext,
/// MathML annotation-xml, SVG foreignObject, SVG desc, SVG title"
fn is_default_scope_boundary(element: &ElementData) -> bool {
    match element.namespace() {
        Namespace::Html => matches!(
            element.html_tag(),
            Some(
                HtmlTag::Applet
                    | HtmlTag::Caption
                    | HtmlTag::Html
                    | HtmlTag::Table
                    | HtmlTag::Td
                    | HtmlTag::Th
                    | HtmlTag::Marquee
                    | HtmlTag::Object
                    | HtmlTag::Template
            )
        ),
        Namespace::MathMl => matches!(
            element.local_name(),
            "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
        ),
        Namespace::Svg => matches!(element.local_name(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// The stack of open elements.
#[derive(Debug, Default, Clone)]
pub struct ElementStack {
    elements: Vec<NodeId>,
}

impl ElementStack {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Push onto the bottom of the stack.
    pub fn push(&mut self, node: NodeId) {
        self.elements.push(node);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.elements.pop()
    }

    /// "The current node is the bottommost node in this stack of open
    /// elements."
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.elements.last().copied()
    }

    /// The topmost node, normally the `html` element.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }

    /// Node at `index`, counted from the top.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.elements.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate from the top of the stack to the current node.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.elements.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.elements.contains(&node)
    }

    /// Index of `node`, counted from the top.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.elements.iter().rposition(|&id| id == node)
    }

    /// Remove `node` wherever it is in the stack.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(index) = self.position(node) {
            let _ = self.elements.remove(index);
        }
    }

    /// Remove the entry at `index`.
    pub fn remove_at(&mut self, index: usize) {
        if index < self.elements.len() {
            let _ = self.elements.remove(index);
        }
    }

    /// Insert `node` at `index`, counted from the top.
    pub fn insert(&mut self, index: usize, node: NodeId) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, node);
    }

    /// Put `new` in the place of `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if let Some(index) = self.position(old) {
            self.elements[index] = new;
        }
    }

    /// Keep only the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.elements.truncate(len);
    }

    /// Index of the bottommost HTML element with tag `tag`.
    #[must_use]
    pub fn last_index_of(&self, document: &Document, tag: HtmlTag) -> Option<usize> {
        self.elements
            .iter()
            .rposition(|&id| document.is_html_element(id, tag))
    }

    /// Whether any HTML element with tag `tag` is on the stack.
    #[must_use]
    pub fn contains_tag(&self, document: &Document, tag: HtmlTag) -> bool {
        self.last_index_of(document, tag).is_some()
    }

    /// Whether the current node is an HTML element with tag `tag`.
    #[must_use]
    pub fn current_is(&self, document: &Document, tag: HtmlTag) -> bool {
        self.current()
            .is_some_and(|id| document.is_html_element(id, tag))
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "1. Initialize node to be the current node (the bottommost node of
    ///  the stack).
    ///  2. If node is the target node, terminate in a match state.
    ///  3. Otherwise, if node is one of the element types in list, terminate
    ///  in a failure state.
    ///  4. Otherwise, set node to the previous entry in the stack of open
    ///  elements and return to step 2."
    fn has_matching_in_scope(
        &self,
        document: &Document,
        scope: Scope,
        mut is_target: impl FnMut(NodeId, &ElementData) -> bool,
    ) -> bool {
        for &id in self.elements.iter().rev() {
            let Some(element) = document.as_element(id) else {
                continue;
            };
            if is_target(id, element) {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// Whether an HTML element with tag `tag` is in `scope`.
    #[must_use]
    pub fn has_in_scope(&self, document: &Document, tag: HtmlTag, scope: Scope) -> bool {
        self.has_matching_in_scope(document, scope, |_, element| element.html_tag() == Some(tag))
    }

    /// Whether any HTML element with one of `tags` is in `scope`.
    #[must_use]
    pub fn has_any_in_scope(&self, document: &Document, tags: &[HtmlTag], scope: Scope) -> bool {
        self.has_matching_in_scope(document, scope, |_, element| {
            element.html_tag().is_some_and(|tag| tags.contains(&tag))
        })
    }

    /// Whether the specific node `node` is in `scope`.
    #[must_use]
    pub fn has_node_in_scope(&self, document: &Document, node: NodeId, scope: Scope) -> bool {
        self.has_matching_in_scope(document, scope, |id, _| id == node)
    }

    /// Pop elements until an HTML element with tag `tag` has been popped.
    pub fn pop_until(&mut self, document: &Document, tag: HtmlTag) {
        while let Some(id) = self.elements.pop() {
            if document.is_html_element(id, tag) {
                break;
            }
        }
    }

    /// Pop elements until an HTML element with one of `tags` has been popped.
    pub fn pop_until_any(&mut self, document: &Document, tags: &[HtmlTag]) {
        while let Some(id) = self.elements.pop() {
            if document
                .as_element(id)
                .and_then(ElementData::html_tag)
                .is_some_and(|tag| tags.contains(&tag))
            {
                break;
            }
        }
    }

    /// Pop elements until `node` has been popped.
    pub fn pop_until_node(&mut self, node: NodeId) {
        while let Some(id) = self.elements.pop() {
            if id == node {
                break;
            }
        }
    }

    /// Pop elements while the current node is not an HTML element with one
    /// of `tags`. Used by "clear the stack back to a table context" and its
    /// siblings.
    pub fn clear_back_to(&mut self, document: &Document, tags: &[HtmlTag]) {
        while let Some(id) = self.current() {
            let keep = document
                .as_element(id)
                .and_then(ElementData::html_tag)
                .is_some_and(|tag| tags.contains(&tag));
            if keep {
                break;
            }
            let _ = self.elements.pop();
        }
    }
}
