//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.

mod attribute;
/// Character reference states per § 13.2.5.72.
mod character_reference;
/// HTML tokenizer state machine.
pub mod core;
/// Helper methods for tokenizer state transitions.
mod helpers;
mod markup;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
mod script;
mod text;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HTMLTokenizer, TokenizerState, tokenize};
pub use token::{Attribute, Token};
