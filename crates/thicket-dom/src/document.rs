//! The document arena: node storage, factories, traversal, and indices.
//!
//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use strum_macros::Display;

use crate::attr::Attr;
use crate::element::{ElementData, HtmlTag, Namespace, QualName};
use crate::error::{DomException, DomResult};
use crate::mutation::{MutationEvent, MutationHandler};
use crate::node::{DocumentId, Node, NodeData, NodeId, NodeType};
use crate::validate::{is_valid_name, validate_and_extract};

/// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-mode)
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum QuirksMode {
    /// "no-quirks"
    #[default]
    #[strum(serialize = "no-quirks")]
    NoQuirks,
    /// "quirks"
    #[strum(serialize = "quirks")]
    Quirks,
    /// "limited-quirks"
    #[strum(serialize = "limited-quirks")]
    LimitedQuirks,
}

/// Arena-based document tree.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// All nodes created by this document live in one vector and are addressed
/// by [`NodeId`]. Nodes are never freed: a removed subtree stays allocated
/// and can be re-inserted.
///
/// Besides the tree itself the document maintains:
/// - an id index from `id` attribute values to elements, each list sorted in
///   tree order, covering rooted elements only
/// - a map from external node ids (assigned when a node becomes rooted) to
///   nodes
/// - a modification clock used to stamp `last_mod_time` lazily
pub struct Document {
    id: DocumentId,
    nodes: Vec<Node>,
    address: String,
    is_html: bool,
    quirks_mode: QuirksMode,
    ids: HashMap<String, Vec<NodeId>>,
    nids: HashMap<u32, NodeId>,
    next_nid: u32,
    modclock: Cell<u64>,
    handler: Option<MutationHandler>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("address", &self.address)
            .field("quirks_mode", &self.quirks_mode)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl Document {
    /// Create an empty HTML document whose URL is `address`.
    #[must_use]
    pub fn new(address: &str) -> Self {
        let mut doc = Self {
            id: DocumentId::next(),
            nodes: Vec::new(),
            address: address.to_string(),
            is_html: true,
            quirks_mode: QuirksMode::NoQuirks,
            ids: HashMap::new(),
            nids: HashMap::new(),
            next_nid: 1,
            modclock: Cell::new(0),
            handler: None,
        };
        let root = doc.alloc(NodeData::Document);
        doc.assign_nid(root);
        doc
    }

    /// This document's arena identity.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// The Document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::new(self.id, 0)
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-url)
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// True for HTML documents (the only kind the parser produces).
    #[must_use]
    pub const fn is_html_document(&self) -> bool {
        self.is_html
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-mode)
    #[must_use]
    pub const fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Set the document mode.
    pub const fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    /// Install (or clear) the mutation observer.
    pub fn set_mutation_handler(&mut self, handler: Option<MutationHandler>) {
        self.handler = handler;
    }

    pub(crate) const fn has_mutation_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub(crate) fn notify(&mut self, event: &MutationEvent) {
        if let Some(handler) = self.handler.as_mut() {
            handler(event);
        }
    }

    /// Number of nodes ever allocated by this document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the Document node itself is allocated on creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Node access
    // =========================================================================

    /// Check that `id` was allocated by this document.
    ///
    /// # Errors
    ///
    /// `WrongDocumentError` for a node of another document.
    pub fn check_owned(&self, id: NodeId) -> DomResult<()> {
        if id.document() != self.id {
            return Err(DomException::WrongDocument);
        }
        if id.index() >= self.nodes.len() {
            return Err(DomException::NotFound("no such node"));
        }
        Ok(())
    }

    /// Get a node, `None` if `id` belongs to another document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.document() == self.id {
            self.nodes.get(id.index())
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.document() == self.id {
            self.nodes.get_mut(id.index())
        } else {
            None
        }
    }

    /// Node type of `id`.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    /// Element data for `id`, if it is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub(crate) fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.get_mut(id)?.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Character data of a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Character data of a text or comment node.
    #[must_use]
    pub fn character_data(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data),
            _ => None,
        }
    }

    /// True if `id` is an HTML element with the given tag.
    #[must_use]
    pub fn is_html_element(&self, id: NodeId, tag: HtmlTag) -> bool {
        self.as_element(id)
            .is_some_and(|data| data.html_tag() == Some(tag))
    }

    // =========================================================================
    // Tree traversal
    // =========================================================================

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-parentnode)
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-childnodes)
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-firstchild)
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-lastchild)
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let node = self.get(id)?;
        node.parent.map(|_| node.sibling_index)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nextsibling)
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        self.children(node.parent?)
            .get(node.sibling_index + 1)
            .copied()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-previoussibling)
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let index = node.sibling_index.checked_sub(1)?;
        self.children(node.parent?).get(index).copied()
    }

    /// Ancestors of `id`, nearest first, not including `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// `id` and its descendants in tree order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-inclusive-ancestor)
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Child indices from the root down to `id`.
    fn tree_path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(node) = self.get(current) {
            let Some(parent) = node.parent else { break };
            path.push(node.sibling_index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-order)
    /// "preorder, depth-first traversal of a tree"
    ///
    /// Only meaningful for nodes in the same tree.
    #[must_use]
    pub fn compare_tree_order(&self, a: NodeId, b: NodeId) -> Ordering {
        self.tree_path(a).cmp(&self.tree_path(b))
    }

    // =========================================================================
    // Rooting and external ids
    // =========================================================================

    /// True if `id` is reachable from the Document node.
    #[must_use]
    pub fn is_rooted(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_rooted)
    }

    /// External id of a rooted node.
    #[must_use]
    pub fn nid(&self, id: NodeId) -> Option<u32> {
        self.get(id)?.nid
    }

    /// Look a rooted node up by its external id.
    #[must_use]
    pub fn node_by_nid(&self, nid: u32) -> Option<NodeId> {
        self.nids.get(&nid).copied()
    }

    fn assign_nid(&mut self, id: NodeId) {
        let nid = self.next_nid;
        self.next_nid += 1;
        if let Some(node) = self.get_mut(id) {
            node.nid = Some(nid);
        }
        let _ = self.nids.insert(nid, id);
    }

    /// Root `id` and its subtree: assign external ids and index `id`
    /// attributes.
    pub(crate) fn root_subtree(&mut self, id: NodeId) {
        let subtree: Vec<NodeId> = self.descendants(id).collect();
        for node in subtree {
            self.assign_nid(node);
            if let Some(value) = self.as_element(node).and_then(ElementData::id) {
                let value = value.to_string();
                self.id_index_add(&value, node);
            }
        }
    }

    /// Reverse of [`Self::root_subtree`].
    pub(crate) fn uproot_subtree(&mut self, id: NodeId) {
        let subtree: Vec<NodeId> = self.descendants(id).collect();
        for node in subtree {
            if let Some(nid) = self.get_mut(node).and_then(|n| n.nid.take()) {
                let _ = self.nids.remove(&nid);
            }
            if let Some(value) = self.as_element(node).and_then(ElementData::id) {
                let value = value.to_string();
                self.id_index_remove(&value, node);
            }
        }
    }

    /// Re-sort the id index entries of a rooted subtree after it moved.
    pub(crate) fn reindex_subtree_ids(&mut self, id: NodeId) {
        let with_ids: Vec<(NodeId, String)> = self
            .descendants(id)
            .filter_map(|node| {
                self.as_element(node)
                    .and_then(ElementData::id)
                    .map(|value| (node, value.to_string()))
            })
            .collect();
        for (node, value) in with_ids {
            self.id_index_remove(&value, node);
            self.id_index_add(&value, node);
        }
    }

    // =========================================================================
    // Id index
    // =========================================================================

    pub(crate) fn id_index_add(&mut self, value: &str, element: NodeId) {
        if value.is_empty() {
            return;
        }
        let mut list = self.ids.remove(value).unwrap_or_default();
        let position = list
            .binary_search_by(|&other| self.compare_tree_order(other, element))
            .unwrap_or_else(|insert_at| insert_at);
        if list.get(position) != Some(&element) {
            list.insert(position, element);
        }
        let _ = self.ids.insert(value.to_string(), list);
    }

    pub(crate) fn id_index_remove(&mut self, value: &str, element: NodeId) {
        if let Some(list) = self.ids.get_mut(value) {
            list.retain(|&e| e != element);
            if list.is_empty() {
                let _ = self.ids.remove(value);
            }
        }
    }

    /// [§ 4.2.4](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    /// "return the first element, in tree order, within this's descendants,
    /// whose ID is elementId"
    #[must_use]
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.ids.get(element_id)?.first().copied()
    }

    /// Every rooted element whose id is `element_id`, in tree order.
    #[must_use]
    pub fn elements_with_id(&self, element_id: &str) -> &[NodeId] {
        self.ids.get(element_id).map_or(&[], Vec::as_slice)
    }

    // =========================================================================
    // Modification clock
    // =========================================================================

    /// Lazily stamped modification time of `id`.
    ///
    /// The first read stamps the node with the current clock; later
    /// structural or attribute changes under it advance the stamp. Reading
    /// starts the clock, so an unobserved document pays nothing.
    #[must_use]
    pub fn last_mod_time(&self, id: NodeId) -> u64 {
        let Some(node) = self.get(id) else { return 0 };
        if node.last_mod_time.get() == 0 {
            if self.modclock.get() == 0 {
                self.modclock.set(1);
            }
            node.last_mod_time.set(self.modclock.get());
        }
        node.last_mod_time.get()
    }

    /// Advance the clock and propagate the new time to every stamped node
    /// from `id` up to the root.
    pub(crate) fn modify(&self, id: NodeId) {
        if self.modclock.get() == 0 {
            return;
        }
        let time = self.modclock.get() + 1;
        self.modclock.set(time);
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else { break };
            if node.last_mod_time.get() != 0 {
                node.last_mod_time.set(time);
            }
            current = node.parent;
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::new(self.id, self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Allocate an element, creating template contents for HTML `template`.
    fn alloc_element(&mut self, data: ElementData) -> NodeId {
        let is_template = data.html_tag() == Some(HtmlTag::Template);
        let element = self.alloc(NodeData::Element(data));
        if is_template {
            let contents = self.alloc(NodeData::DocumentFragment);
            if let Some(data) = self.as_element_mut(element) {
                data.template_contents = Some(contents);
            }
        }
        element
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// # Errors
    ///
    /// `InvalidCharacterError` if `local_name` is not a valid element name.
    pub fn create_element(&mut self, local_name: &str) -> DomResult<NodeId> {
        // STEP 1: "If localName is not a valid element local name, then throw
        //          an "InvalidCharacterError" DOMException."
        if !is_valid_name(local_name) {
            return Err(DomException::InvalidCharacter(local_name.to_string()));
        }
        // STEP 2: "If this is an HTML document, then set localName to
        //          localName in ASCII lowercase."
        let local = if self.is_html {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        let data = ElementData::new(QualName::html(&local), self.is_html);
        Ok(self.alloc_element(data))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createelementns)
    ///
    /// # Errors
    ///
    /// `InvalidCharacterError` or `NamespaceError` from "validate and extract".
    pub fn create_element_ns(&mut self, ns: Option<&str>, qname: &str) -> DomResult<NodeId> {
        let name = validate_and_extract(ns, qname)?;
        let data = ElementData::new(name, self.is_html);
        Ok(self.alloc_element(data))
    }

    /// Create an element from an already-validated name and attribute list.
    ///
    /// This is the parser's entry point: token names are not XML names (e.g.
    /// `<p a<b>` yields an attribute named `a<b`), so no validation is done.
    /// Attributes with a duplicate namespace and local name are dropped,
    /// keeping the first.
    pub fn create_element_with_attributes(
        &mut self,
        name: QualName,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> NodeId {
        let mut data = ElementData::new(name, self.is_html);
        for attr in attrs {
            if data.attrs.get_ns(&attr.name.ns, &attr.name.local).is_none() {
                let _ = data.attrs.set(attr);
            }
        }
        self.alloc_element(data)
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.alloc(NodeData::Text(data.to_string()))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createcomment)
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeData::Comment(data.to_string()))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createdocumentfragment)
    pub fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::DocumentFragment)
    }

    /// [§ 4.5.1](https://dom.spec.whatwg.org/#dom-domimplementation-createdocumenttype)
    ///
    /// The parser creates doctypes with arbitrary (even empty) names, so the
    /// name is not validated here.
    pub fn create_document_type(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.alloc(NodeData::DocumentType {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        })
    }

    /// Allocate a node from a payload copied out of some document.
    pub(crate) fn alloc_copy(&mut self, data: NodeData) -> NodeId {
        match data {
            NodeData::Element(mut element) => {
                element.is_html = self.is_html && element.name.ns == Namespace::Html;
                element.template_contents = None;
                self.alloc_element(element)
            }
            other => self.alloc(other),
        }
    }

    // =========================================================================
    // Document accessors
    // =========================================================================

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-documentelement)
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&child| self.node_type(child) == Some(NodeType::Element))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-doctype)
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&child| self.node_type(child) == Some(NodeType::DocumentType))
    }

    fn html_child_of_document_element(&self, tag: HtmlTag) -> Option<NodeId> {
        let html = self.document_element()?;
        if !self.is_html_element(html, HtmlTag::Html) {
            return None;
        }
        self.children(html)
            .iter()
            .copied()
            .find(|&child| self.is_html_element(child, tag))
    }

    /// [§ 3.1.5](https://html.spec.whatwg.org/multipage/dom.html#dom-document-head)
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.html_child_of_document_element(HtmlTag::Head)
    }

    /// [§ 3.1.5](https://html.spec.whatwg.org/multipage/dom.html#dom-document-body)
    /// "The body element of a document is the first of the html element's
    /// children that is either a body element or a frameset element"
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        if !self.is_html_element(html, HtmlTag::Html) {
            return None;
        }
        self.children(html).iter().copied().find(|&child| {
            self.is_html_element(child, HtmlTag::Body)
                || self.is_html_element(child, HtmlTag::Frameset)
        })
    }

    /// [§ 3.1.5](https://html.spec.whatwg.org/multipage/dom.html#document.title)
    /// "strip and collapse ASCII whitespace" of the first `title` element's
    /// text.
    #[must_use]
    pub fn title(&self) -> String {
        let Some(title) = self
            .descendants(self.root())
            .find(|&id| self.is_html_element(id, HtmlTag::Title))
        else {
            return String::new();
        };
        self.child_text_content(title)
            .split_ascii_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Concatenated data of the Text children of `id`.
    #[must_use]
    pub fn child_text_content(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&child| self.as_text(child))
            .collect()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// `None` for the Document and doctypes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        match self.node_type(id)? {
            NodeType::Document | NodeType::DocumentType => None,
            NodeType::Text | NodeType::Comment => self.character_data(id).map(str::to_string),
            NodeType::Element | NodeType::DocumentFragment => Some(
                self.descendants(id)
                    .filter_map(|node| self.as_text(node))
                    .collect(),
            ),
        }
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    ///
    /// Descendant elements of `root` (not `root` itself) whose qualified name
    /// is `qname`, or all of them for `"*"`. HTML elements in HTML documents
    /// are matched against the lowercased name.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, root: NodeId, qname: &str) -> Vec<NodeId> {
        let lowered = qname.to_ascii_lowercase();
        self.descendants(root)
            .skip(1)
            .filter(|&id| {
                self.as_element(id).is_some_and(|data| {
                    if qname == "*" {
                        return true;
                    }
                    let wanted = if data.is_html() { lowered.as_str() } else { qname };
                    data.name().qualified() == wanted
                })
            })
            .collect()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-getelementsbyclassname)
    #[must_use]
    pub fn get_elements_by_class_name(&self, root: NodeId, class_names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class_names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendants(root)
            .skip(1)
            .filter(|&id| {
                self.as_element(id).is_some_and(|data| {
                    let classes = data.classes();
                    wanted.iter().all(|class| classes.contains(class))
                })
            })
            .collect()
    }
}

/// Preorder iterator returned by [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
