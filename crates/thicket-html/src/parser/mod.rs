//! Tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

mod adoption;
/// Tree builder state and the shared node-insertion algorithms.
pub mod core;
/// SVG and MathML handling.
pub mod foreign_content;
/// The list of active formatting elements.
pub mod formatting;
mod in_body;
mod modes;
/// DOCTYPE quirks classification.
pub mod quirks;
/// The stack of open elements and element scopes.
pub mod stack;
mod table;
mod tree_print;

pub use self::core::{InsertionMode, TreeBuilder};
pub use adoption::{is_formatting, is_special};
pub use tree_print::{format_tree, print_tree};
