//! Node storage for the arena-backed document.
//!
//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

use strum_macros::Display;

use crate::element::ElementData;

/// Identity of one [`Document`](crate::Document) arena.
///
/// Every `NodeId` carries the id of the document that allocated it, so a node
/// handed to the wrong document is detected instead of silently aliasing
/// another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u32);

impl DocumentId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A type-safe index into a document's node arena.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document, set upon creation"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    document: DocumentId,
    index: u32,
}

impl NodeId {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn new(document: DocumentId, index: usize) -> Self {
        Self {
            document,
            index: index as u32,
        }
    }

    /// The document whose arena this node lives in.
    #[must_use]
    pub const fn document(self) -> DocumentId {
        self.document
    }

    /// Position in the arena. Stable for the lifetime of the document.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#dom-node-nodetype)
///
/// "nodeType ... returns a number" - the discriminants match the DOM constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeType {
    /// `ELEMENT_NODE`
    Element = 1,
    /// `TEXT_NODE`
    Text = 3,
    /// `COMMENT_NODE`
    Comment = 8,
    /// `DOCUMENT_NODE`
    Document = 9,
    /// `DOCUMENT_TYPE_NODE`
    DocumentType = 10,
    /// `DOCUMENT_FRAGMENT_NODE`
    DocumentFragment = 11,
}

/// Per-type payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    /// "Doctypes have an associated name, public ID, and system ID."
    DocumentType {
        /// The doctype name (`html` for standards documents).
        name: String,
        /// Public identifier, empty if absent.
        public_id: String,
        /// System identifier, empty if absent.
        system_id: String,
    },
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
}

impl NodeData {
    /// The DOM node type constant for this payload.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Document => NodeType::Document,
            Self::DocumentType { .. } => NodeType::DocumentType,
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
            Self::DocumentFragment => NodeType::DocumentFragment,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "An object that participates in a tree has a parent, which is either
/// null or an object, and has children, which is an ordered set of objects."
///
/// The parent link is a back-reference only; a node is owned by its parent's
/// child list, and every node's storage is owned by the document arena.
#[derive(Debug)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Position of this node in `parent.children`. Meaningless when parentless.
    pub(crate) sibling_index: usize,
    /// External id, present exactly while the node is rooted.
    pub(crate) nid: Option<u32>,
    /// Lazily stamped modification time, 0 until first read.
    pub(crate) last_mod_time: Cell<u64>,
}

impl Node {
    pub(crate) const fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
            nid: None,
            last_mod_time: Cell::new(0),
        }
    }

    /// The node's payload.
    #[must_use]
    pub const fn data(&self) -> &NodeData {
        &self.data
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodetype)
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A node is rooted while it is reachable from its document by parent
    /// links. Rooted nodes carry a stable external id.
    #[must_use]
    pub const fn is_rooted(&self) -> bool {
        self.nid.is_some()
    }

    /// The external node id assigned when the node was rooted.
    #[must_use]
    pub const fn nid(&self) -> Option<u32> {
        self.nid
    }

    /// Element payload, if this node is an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }
}
