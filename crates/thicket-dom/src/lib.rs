//! DOM tree implementation for the Thicket parser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! A [`Document`] owns every node it creates in one arena; [`NodeId`]s
//! index into it and carry the owning document's identity, so a node passed
//! to the wrong document is reported as a `WrongDocumentError` rather than
//! aliasing an unrelated node.
//!
//! Nodes inserted under the Document become *rooted*: they receive an
//! external id, their `id` attributes enter the document's id index, and a
//! single [`MutationEvent`] is sent to the installed handler. Removal
//! reverses all three.

mod attr;
mod clone;
mod collaborators;
mod document;
mod element;
mod error;
mod mutate;
mod mutation;
mod node;
mod serialize;
mod validate;

pub use attr::{Attr, AttributeList};
pub use collaborators::{DeclarationParser, SelectorEngine};
pub use document::{Descendants, Document, QuirksMode};
pub use element::{ElementData, ElementKind, HtmlTag, Namespace, QualName};
pub use error::{DomException, DomResult};
pub use mutation::{MutationEvent, MutationHandler, MutationKind};
pub use node::{DocumentId, Node, NodeData, NodeId, NodeType};
