//! Mutation notifications for an external observer (e.g. a renderer).
//!
//! Events are only produced for rooted nodes. Each top-level tree operation
//! produces exactly one event; subtree rooting and id-index maintenance have
//! already completed when the handler runs.

use strum_macros::Display;

use crate::node::NodeId;

/// Event kind, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    /// Character data of a text or comment node changed.
    Value,
    /// An attribute was added or its value changed.
    Attr,
    /// An attribute was removed.
    RemoveAttr,
    /// A rooted node was detached from the document.
    Remove,
    /// A rooted node was moved to a new position in the same document.
    Move,
    /// A node (and its subtree) became rooted.
    Insert,
}

/// One tree change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    /// [`MutationKind::Value`]
    Value {
        /// The text or comment node.
        target: NodeId,
        /// New data.
        data: String,
    },
    /// [`MutationKind::Attr`]
    Attr {
        /// The element.
        target: NodeId,
        /// Qualified attribute name.
        name: String,
        /// New value.
        value: String,
    },
    /// [`MutationKind::RemoveAttr`]
    RemoveAttr {
        /// The element.
        target: NodeId,
        /// Qualified attribute name.
        name: String,
    },
    /// [`MutationKind::Remove`]
    Remove {
        /// The detached node.
        target: NodeId,
        /// The external id it had while rooted.
        nid: u32,
        /// Its former parent.
        parent: NodeId,
    },
    /// [`MutationKind::Move`]
    Move {
        /// The moved node.
        target: NodeId,
        /// New parent.
        parent: NodeId,
        /// New position among the parent's children.
        index: usize,
    },
    /// [`MutationKind::Insert`]
    Insert {
        /// Root of the inserted subtree.
        target: NodeId,
        /// New parent.
        parent: NodeId,
        /// Position among the parent's children.
        index: usize,
    },
}

impl MutationEvent {
    /// The event kind.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Value { .. } => MutationKind::Value,
            Self::Attr { .. } => MutationKind::Attr,
            Self::RemoveAttr { .. } => MutationKind::RemoveAttr,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Move { .. } => MutationKind::Move,
            Self::Insert { .. } => MutationKind::Insert,
        }
    }

    /// The node the event is about.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        match self {
            Self::Value { target, .. }
            | Self::Attr { target, .. }
            | Self::RemoveAttr { target, .. }
            | Self::Remove { target, .. }
            | Self::Move { target, .. }
            | Self::Insert { target, .. } => *target,
        }
    }
}

/// Observer callback. Receives events only, so it cannot reach back into the
/// document or the parser while a mutation is in progress.
pub type MutationHandler = Box<dyn FnMut(&MutationEvent)>;
