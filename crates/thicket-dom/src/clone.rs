//! Cloning, importing, and structural equality.

use crate::document::Document;
use crate::error::{DomException, DomResult};
use crate::node::{NodeData, NodeId};

/// A detached copy of a subtree, independent of any arena.
struct Snapshot {
    data: NodeData,
    template_contents: Option<Box<Snapshot>>,
    children: Vec<Snapshot>,
}

impl Document {
    fn snapshot(&self, id: NodeId, deep: bool) -> Option<Snapshot> {
        let node = self.get(id)?;
        let template_contents = node
            .as_element()
            .and_then(|data| data.template_contents())
            .filter(|_| deep)
            .and_then(|contents| self.snapshot(contents, true))
            .map(Box::new);
        let children = if deep {
            node.children()
                .iter()
                .filter_map(|&child| self.snapshot(child, true))
                .collect()
        } else {
            Vec::new()
        };
        Some(Snapshot {
            data: node.data().clone(),
            template_contents,
            children,
        })
    }

    fn instantiate(&mut self, snapshot: Snapshot) -> NodeId {
        let copy = self.alloc_copy(snapshot.data);
        if let Some(contents) = snapshot.template_contents
            && let Some(target) = self.as_element(copy).and_then(|data| data.template_contents())
        {
            for child in contents.children {
                let child = self.instantiate(child);
                self.append_detached(target, child);
            }
        }
        for child in snapshot.children {
            let child = self.instantiate(child);
            self.append_detached(copy, child);
        }
        copy
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-clone)
    ///
    /// The copy is detached and unrooted.
    ///
    /// # Errors
    ///
    /// `NotSupportedError` for the Document node, `WrongDocumentError` for a
    /// node of another document.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        self.check_owned(id)?;
        if id == self.root() {
            return Err(DomException::NotSupported("cannot clone a document into itself"));
        }
        let snapshot = self
            .snapshot(id, deep)
            .ok_or(DomException::NotFound("no such node"))?;
        Ok(self.instantiate(snapshot))
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-importnode)
    /// Copy a node of `source` into this document.
    ///
    /// # Errors
    ///
    /// `NotSupportedError` if `id` is `source`'s Document node.
    pub fn import_node(&mut self, source: &Self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        source.check_owned(id)?;
        if id == source.root() {
            return Err(DomException::NotSupported("cannot import a document"));
        }
        let snapshot = source
            .snapshot(id, deep)
            .ok_or(DomException::NotFound("no such node"))?;
        Ok(self.instantiate(snapshot))
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-equals)
    ///
    /// Compare node `a` of this document with node `b` of `other` (which may
    /// be this document).
    #[must_use]
    pub fn is_equal_node(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        let (Some(left), Some(right)) = (self.get(a), other.get(b)) else {
            return false;
        };
        let same_data = match (left.data(), right.data()) {
            (NodeData::Document, NodeData::Document)
            | (NodeData::DocumentFragment, NodeData::DocumentFragment) => true,
            (
                NodeData::DocumentType {
                    name,
                    public_id,
                    system_id,
                },
                NodeData::DocumentType {
                    name: other_name,
                    public_id: other_public,
                    system_id: other_system,
                },
            ) => name == other_name && public_id == other_public && system_id == other_system,
            (NodeData::Element(l), NodeData::Element(r)) => {
                l.name() == r.name() && l.attrs().same_as(r.attrs())
            }
            (NodeData::Text(l), NodeData::Text(r)) | (NodeData::Comment(l), NodeData::Comment(r)) => {
                l == r
            }
            _ => false,
        };
        same_data
            && left.children().len() == right.children().len()
            && left
                .children()
                .iter()
                .zip(right.children())
                .all(|(&l, &r)| self.is_equal_node(l, other, r))
    }
}
