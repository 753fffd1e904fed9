//! Tree mutation: insertion, removal, replacement, and character data.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! Every public operation validates first and then calls an unchecked
//! primitive. The primitives keep parent links and cached sibling indices in
//! sync, root or uproot the affected subtree, and emit one mutation event for
//! the node the caller passed in.

use crate::document::Document;
use crate::error::{DomException, DomResult};
use crate::mutation::MutationEvent;
use crate::node::{NodeData, NodeId, NodeType};

impl Document {
    // =========================================================================
    // Link primitives
    // =========================================================================

    fn reindex_children_from(&mut self, parent: NodeId, from: usize) {
        let children = self.children(parent)[from..].to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            if let Some(node) = self.get_mut(child) {
                node.sibling_index = from + offset;
            }
        }
    }

    /// Put a parentless `node` at `index` in `parent`'s children.
    fn link(&mut self, parent: NodeId, node: NodeId, index: usize) {
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.insert(index, node);
        }
        if let Some(child) = self.get_mut(node) {
            child.parent = Some(parent);
        }
        self.reindex_children_from(parent, index);
    }

    /// Detach `node` from its parent. Returns the former parent.
    fn unlink(&mut self, node: NodeId) -> Option<NodeId> {
        let child = self.get_mut(node)?;
        let parent = child.parent.take()?;
        let index = child.sibling_index;
        if let Some(parent_node) = self.get_mut(parent) {
            let _ = parent_node.children.remove(index);
        }
        self.reindex_children_from(parent, index);
        Some(parent)
    }

    /// Append to a detached subtree without validation or events. Used when
    /// building copies.
    pub(crate) fn append_detached(&mut self, parent: NodeId, node: NodeId) {
        let index = self.children(parent).len();
        self.link(parent, node, index);
    }

    // =========================================================================
    // Unchecked insert / remove
    // =========================================================================

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Insert `node` into `parent` before `before` (or at the end). Handles
    /// DocumentFragments by moving their children.
    fn insert_unchecked(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) {
        // "If node is a DocumentFragment node, then set nodes to node's
        //  children."
        if self.node_type(node) == Some(NodeType::DocumentFragment) {
            let kids = self.children(node).to_vec();
            for kid in kids {
                let _ = self.unlink(kid);
                self.place(parent, kid, before);
            }
            self.modify(node);
            return;
        }

        let was_rooted = self.is_rooted(node);
        let parent_rooted = self.is_rooted(parent);

        // "If node's parent is non-null, then remove node."
        if let Some(old_parent) = self.unlink(node) {
            self.modify(old_parent);
            if was_rooted && !parent_rooted {
                let nid = self.nid(node).unwrap_or_default();
                self.uproot_subtree(node);
                self.notify(&MutationEvent::Remove {
                    target: node,
                    nid,
                    parent: old_parent,
                });
            }
        }

        if was_rooted && parent_rooted {
            let index = self.insertion_index(parent, before);
            self.link(parent, node, index);
            self.modify(parent);
            self.reindex_subtree_ids(node);
            self.notify(&MutationEvent::Move {
                target: node,
                parent,
                index,
            });
        } else {
            self.place(parent, node, before);
        }
    }

    fn insertion_index(&self, parent: NodeId, before: Option<NodeId>) -> usize {
        before
            .and_then(|reference| self.index_in_parent(reference))
            .unwrap_or_else(|| self.children(parent).len())
    }

    /// Link a parentless, unrooted `node` and root it if `parent` is rooted.
    fn place(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) {
        let index = self.insertion_index(parent, before);
        self.link(parent, node, index);
        self.modify(parent);
        if self.is_rooted(parent) {
            self.root_subtree(node);
            self.notify(&MutationEvent::Insert {
                target: node,
                parent,
                index,
            });
        }
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-remove)
    fn remove_unchecked(&mut self, node: NodeId) {
        let was_rooted = self.is_rooted(node);
        let nid = self.nid(node).unwrap_or_default();
        let Some(parent) = self.unlink(node) else {
            return;
        };
        self.modify(parent);
        if was_rooted {
            self.uproot_subtree(node);
            self.notify(&MutationEvent::Remove {
                target: node,
                nid,
                parent,
            });
        }
    }

    // =========================================================================
    // Validity
    // =========================================================================

    fn has_child_of_type(&self, parent: NodeId, node_type: NodeType, except: Option<NodeId>) -> bool {
        self.children(parent)
            .iter()
            .any(|&c| Some(c) != except && self.node_type(c) == Some(node_type))
    }

    /// A doctype child of `parent` follows `child`.
    fn doctype_follows(&self, parent: NodeId, child: NodeId) -> bool {
        let start = self.index_in_parent(child).map_or(0, |i| i + 1);
        self.children(parent)[start..]
            .iter()
            .any(|&c| self.node_type(c) == Some(NodeType::DocumentType))
    }

    /// An element child of `parent` precedes `child`.
    fn element_precedes(&self, parent: NodeId, child: NodeId) -> bool {
        let end = self.index_in_parent(child).unwrap_or(0);
        self.children(parent)[..end]
            .iter()
            .any(|&c| self.node_type(c) == Some(NodeType::Element))
    }

    /// Steps shared by pre-insertion and replacement validity, up to the
    /// Document-specific constraints.
    fn check_hierarchy(&self, parent: NodeId, node: NodeId, child: Option<NodeId>) -> DomResult<NodeType> {
        self.check_owned(parent)?;
        self.check_owned(node)?;
        if let Some(child) = child {
            self.check_owned(child)?;
        }

        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //          node, then throw a "HierarchyRequestError" DOMException."
        let parent_type = self.node_type(parent).unwrap_or(NodeType::Text);
        if !matches!(
            parent_type,
            NodeType::Document | NodeType::DocumentFragment | NodeType::Element
        ) {
            return Err(DomException::HierarchyRequest("parent cannot have children"));
        }

        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //          then throw a "HierarchyRequestError" DOMException."
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomException::HierarchyRequest("node is an ancestor of parent"));
        }

        // STEP 3: "If child is non-null and its parent is not parent, then
        //          throw a "NotFoundError" DOMException."
        if let Some(child) = child
            && self.parent(child) != Some(parent)
        {
            return Err(DomException::NotFound("child is not a child of parent"));
        }

        // STEP 4: "If node is not a DocumentFragment, DocumentType, Element, or
        //          CharacterData node, then throw a "HierarchyRequestError"."
        let node_type = self.node_type(node).unwrap_or(NodeType::Document);
        if node_type == NodeType::Document {
            return Err(DomException::HierarchyRequest("a document cannot be inserted"));
        }

        // STEP 5: "If either node is a Text node and parent is a document, or
        //          node is a doctype and parent is not a document..."
        if node_type == NodeType::Text && parent_type == NodeType::Document {
            return Err(DomException::HierarchyRequest("text cannot be a child of a document"));
        }
        if node_type == NodeType::DocumentType && parent_type != NodeType::Document {
            return Err(DomException::HierarchyRequest("doctype outside a document"));
        }
        Ok(node_type)
    }

    /// Number of element children and whether there is a Text child.
    fn fragment_shape(&self, fragment: NodeId) -> (usize, bool) {
        let kids = self.children(fragment);
        let elements = kids
            .iter()
            .filter(|&&c| self.node_type(c) == Some(NodeType::Element))
            .count();
        let text = kids
            .iter()
            .any(|&c| self.node_type(c) == Some(NodeType::Text));
        (elements, text)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    fn ensure_pre_insertion_validity(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<()> {
        let node_type = self.check_hierarchy(parent, node, child)?;
        if self.node_type(parent) != Some(NodeType::Document) {
            return Ok(());
        }

        // STEP 6: "If parent is a document, and any of the statements below,
        //          switched on the interface node implements, are true, then
        //          throw a "HierarchyRequestError" DOMException."
        let too_many = DomException::HierarchyRequest("document can have one element and one doctype");
        match node_type {
            // "If node has more than one element child or has a Text node child.
            //  Otherwise, if node has one element child and either parent has an
            //  element child, child is a doctype, or child is non-null and a
            //  doctype is following child."
            NodeType::DocumentFragment => {
                let (elements, text) = self.fragment_shape(node);
                if elements > 1 || text {
                    return Err(too_many);
                }
                if elements == 1
                    && (self.has_child_of_type(parent, NodeType::Element, None)
                        || child.is_some_and(|c| {
                            self.node_type(c) == Some(NodeType::DocumentType)
                                || self.doctype_follows(parent, c)
                        }))
                {
                    return Err(too_many);
                }
            }
            // "parent has an element child, child is a doctype, or child is
            //  non-null and a doctype is following child."
            NodeType::Element => {
                if self.has_child_of_type(parent, NodeType::Element, None)
                    || child.is_some_and(|c| {
                        self.node_type(c) == Some(NodeType::DocumentType)
                            || self.doctype_follows(parent, c)
                    })
                {
                    return Err(too_many);
                }
            }
            // "parent has a doctype child, child is non-null and an element is
            //  preceding child, or child is null and parent has an element
            //  child."
            NodeType::DocumentType => {
                let misplaced = match child {
                    Some(c) => self.element_precedes(parent, c),
                    None => self.has_child_of_type(parent, NodeType::Element, None),
                };
                if self.has_child_of_type(parent, NodeType::DocumentType, None) || misplaced {
                    return Err(too_many);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-replace) steps 1-6.
    fn ensure_replace_validity(&self, parent: NodeId, node: NodeId, child: NodeId) -> DomResult<()> {
        let node_type = self.check_hierarchy(parent, node, Some(child))?;
        if self.node_type(parent) != Some(NodeType::Document) {
            return Ok(());
        }
        let too_many = DomException::HierarchyRequest("document can have one element and one doctype");
        match node_type {
            // "If node has more than one element child or has a Text node child.
            //  Otherwise, if node has one element child and either parent has an
            //  element child that is not child or a doctype is following child."
            NodeType::DocumentFragment => {
                let (elements, text) = self.fragment_shape(node);
                if elements > 1 || text {
                    return Err(too_many);
                }
                if elements == 1
                    && (self.has_child_of_type(parent, NodeType::Element, Some(child))
                        || self.doctype_follows(parent, child))
                {
                    return Err(too_many);
                }
            }
            NodeType::Element => {
                if self.has_child_of_type(parent, NodeType::Element, Some(child))
                    || self.doctype_follows(parent, child)
                {
                    return Err(too_many);
                }
            }
            NodeType::DocumentType => {
                if self.has_child_of_type(parent, NodeType::DocumentType, Some(child))
                    || self.element_precedes(parent, child)
                {
                    return Err(too_many);
                }
            }
            _ => {}
        }
        Ok(())
    }

    // =========================================================================
    // Public tree API
    // =========================================================================

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-appendchild)
    ///
    /// # Errors
    ///
    /// `HierarchyRequestError`, `NotFoundError`, or `WrongDocumentError` when
    /// the insertion would produce an invalid tree.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, node, None)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-insertbefore)
    ///
    /// # Errors
    ///
    /// See [`Self::append_child`].
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        // "Ensure pre-insertion validity of node into parent before child."
        self.ensure_pre_insertion_validity(parent, node, child)?;

        // "Let referenceChild be child. If referenceChild is node, then set
        //  referenceChild to node's next sibling."
        let reference = if child == Some(node) {
            self.next_sibling(node)
        } else {
            child
        };

        self.insert_unchecked(parent, node, reference);
        Ok(node)
    }

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-insert) without
    /// the pre-insertion validity checks.
    ///
    /// For builders that only produce trees those checks accept, such as the
    /// HTML tree builder. Skips the ancestor walk from `parent` that
    /// [`Self::insert_before`] makes.
    ///
    /// # Errors
    ///
    /// `WrongDocumentError` for a node of another document, `NotFoundError`
    /// if `child` is not a child of `parent`.
    pub fn insert_before_unchecked(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_owned(parent)?;
        self.check_owned(node)?;
        if let Some(child) = child {
            self.check_owned(child)?;
            if self.parent(child) != Some(parent) {
                return Err(DomException::NotFound("reference child is not a child of parent"));
            }
        }
        let reference = if child == Some(node) {
            self.next_sibling(node)
        } else {
            child
        };
        self.insert_unchecked(parent, node, reference);
        Ok(node)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-removechild)
    ///
    /// # Errors
    ///
    /// `NotFoundError` if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.check_owned(parent)?;
        self.check_owned(child)?;
        // "If child's parent is not parent, then throw a "NotFoundError"
        //  DOMException."
        if self.parent(child) != Some(parent) {
            return Err(DomException::NotFound("child is not a child of parent"));
        }
        self.remove_unchecked(child);
        Ok(child)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-replacechild)
    ///
    /// Emits a REMOVE for `child` followed by the insertion event for `node`.
    ///
    /// # Errors
    ///
    /// See [`Self::append_child`].
    pub fn replace_child(&mut self, parent: NodeId, node: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.ensure_replace_validity(parent, node, child)?;
        if node == child {
            return Ok(child);
        }

        // STEP 7: "Let referenceChild be child's next sibling."
        // STEP 8: "If referenceChild is node, then set referenceChild to node's
        //          next sibling."
        let mut reference = self.next_sibling(child);
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }

        self.remove_unchecked(child);
        self.insert_unchecked(parent, node, reference);
        Ok(child)
    }

    /// [§ 4.2.8](https://dom.spec.whatwg.org/#dom-childnode-remove)
    /// "If this's parent is null, then return. Remove this."
    pub fn remove(&mut self, node: NodeId) {
        if self.get(node).is_some() {
            self.remove_unchecked(node);
        }
    }

    /// Move every child of `from` to the end of `to`, in order.
    ///
    /// # Errors
    ///
    /// See [`Self::append_child`].
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> DomResult<()> {
        let kids = self.children(from).to_vec();
        for kid in kids {
            let _ = self.append_child(to, kid)?;
        }
        Ok(())
    }

    // =========================================================================
    // Character data
    // =========================================================================

    /// [§ 4.10](https://dom.spec.whatwg.org/#concept-cd-replace)
    /// Replace the data of a text or comment node.
    ///
    /// # Errors
    ///
    /// `InvalidNodeTypeError` if `id` is not a text or comment node.
    pub fn set_character_data(&mut self, id: NodeId, data: &str) -> DomResult<()> {
        self.check_owned(id)?;
        match self.get_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(current) | NodeData::Comment(current)) => {
                data.clone_into(current);
            }
            _ => return Err(DomException::InvalidNodeType("not character data")),
        }
        self.character_data_changed(id);
        Ok(())
    }

    /// Append to the data of a text or comment node. The parser uses this to
    /// merge adjacent character tokens into one Text node.
    ///
    /// # Errors
    ///
    /// `InvalidNodeTypeError` if `id` is not a text or comment node.
    pub fn append_data(&mut self, id: NodeId, data: &str) -> DomResult<()> {
        self.check_owned(id)?;
        match self.get_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(current) | NodeData::Comment(current)) => current.push_str(data),
            _ => return Err(DomException::InvalidNodeType("not character data")),
        }
        self.character_data_changed(id);
        Ok(())
    }

    fn character_data_changed(&mut self, id: NodeId) {
        self.modify(id);
        if self.has_mutation_handler() && self.is_rooted(id) {
            let data = self.character_data(id).unwrap_or_default().to_string();
            self.notify(&MutationEvent::Value { target: id, data });
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-textcontent) setter.
    ///
    /// Elements and fragments have all children replaced by a single Text
    /// node (none for an empty string); character data is replaced in place.
    /// Documents and doctypes are unaffected.
    ///
    /// # Errors
    ///
    /// `WrongDocumentError` for a node of another document.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        self.check_owned(id)?;
        match self.node_type(id) {
            Some(NodeType::Element | NodeType::DocumentFragment) => {
                let kids = self.children(id).to_vec();
                for kid in kids {
                    self.remove_unchecked(kid);
                }
                if !text.is_empty() {
                    let node = self.create_text_node(text);
                    self.insert_unchecked(id, node, None);
                }
                Ok(())
            }
            Some(NodeType::Text | NodeType::Comment) => self.set_character_data(id, text),
            _ => Ok(()),
        }
    }
}
