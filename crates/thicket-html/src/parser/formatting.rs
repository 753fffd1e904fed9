//! [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//!
//! "The list of active formatting elements... is used to handle mis-nested
//! formatting element tags."

use thicket_dom::{HtmlTag, NodeId};

use crate::tokenizer::Attribute;

/// One entry in the list: an element or a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingEntry {
    /// A formatting element, with the token it was created for.
    ///
    /// The attributes are a snapshot taken at push time; reconstruction and
    /// the adoption agency algorithm clone elements from them.
    Element {
        /// The element in the document.
        node: NodeId,
        /// Its tag name.
        tag: HtmlTag,
        /// The start tag's attributes.
        attributes: Vec<Attribute>,
    },
    /// "A marker is an entry in the list of active formatting elements that
    /// is distinct from any element."
    ///
    /// Pushed when entering applet, object, marquee, template, td, th, and
    /// caption.
    Marker,
}

impl FormattingEntry {
    /// The entry's element, `None` for a marker.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Element { node, .. } => Some(*node),
            Self::Marker => None,
        }
    }
}

/// The list of active formatting elements.
#[derive(Debug, Default, Clone)]
pub struct ActiveFormattingElements {
    entries: Vec<FormattingEntry>,
}

impl ActiveFormattingElements {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FormattingEntry> {
        self.entries.get(index)
    }

    /// "Insert a marker at the end of the list of active formatting
    /// elements."
    pub fn push_marker(&mut self) {
        self.entries.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "1. If there are already three elements in the list of active
    ///  formatting elements after the last marker, if any, or anywhere in
    ///  the list if there are no markers, that have the same tag name,
    ///  namespace, and attributes as element, then remove the earliest such
    ///  element from the list of active formatting elements. For these
    ///  purposes, the attributes must be compared as they were when the
    ///  elements were created by the parser; two elements have the same
    ///  attributes if all their parsed attributes can be paired such that
    ///  the two attributes in each pair have identical names, namespaces,
    ///  and values (the order of the attributes does not matter).
    ///
    ///  2. Add element to the list of active formatting elements."
    pub fn push(&mut self, node: NodeId, tag: HtmlTag, attributes: &[Attribute]) {
        let mut matching = Vec::new();
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => break,
                FormattingEntry::Element {
                    tag: other_tag,
                    attributes: other_attributes,
                    ..
                } => {
                    if *other_tag == tag && same_attributes(other_attributes, attributes) {
                        matching.push(index);
                    }
                }
            }
        }
        // Noah's Ark clause
        if matching.len() >= 3
            && let Some(&earliest) = matching.last()
        {
            let _ = self.entries.remove(earliest);
        }

        self.entries.push(FormattingEntry::Element {
            node,
            tag,
            attributes: attributes.to_vec(),
        });
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "1. Let entry be the last (most recently added) entry in the list of
    ///  active formatting elements.
    ///  2. Remove entry from the list of active formatting elements.
    ///  3. If entry was a marker, then stop the algorithm at this point.
    ///  4. Go to step 1."
    pub fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry == FormattingEntry::Marker {
                break;
            }
        }
    }

    /// Index of the entry for `node`.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.node() == Some(node))
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.position(node).is_some()
    }

    /// Remove the entry for `node`, if present.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(index) = self.position(node) {
            let _ = self.entries.remove(index);
        }
    }

    /// Insert an element entry at `index`.
    pub fn insert(&mut self, index: usize, entry: FormattingEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Point the entry at `index` at a freshly created element.
    pub fn replace_node(&mut self, index: usize, new_node: NodeId) {
        if let Some(FormattingEntry::Element { node, .. }) = self.entries.get_mut(index) {
            *node = new_node;
        }
    }

    /// The last element with tag `tag` between the end of the list and the
    /// last marker, as `(index, node)`.
    #[must_use]
    pub fn last_after_marker(&self, tag: HtmlTag) -> Option<(usize, NodeId)> {
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element {
                    node,
                    tag: entry_tag,
                    ..
                } if *entry_tag == tag => return Some((index, *node)),
                FormattingEntry::Element { .. } => {}
            }
        }
        None
    }
}

/// Order-insensitive comparison of two attribute lists.
fn same_attributes(a: &[Attribute], b: &[Attribute]) -> bool {
    a.len() == b.len()
        && a.iter().all(|attr| {
            b.iter()
                .any(|other| other.name == attr.name && other.value == attr.value)
        })
}
