//! HTML tokenizer and tree builder for the Thicket DOM.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input stream** ([WHATWG § 13.2.3](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream))
//!   - Chunked input, CRLF normalization, leading BOM removal
//!   - Save/restore stack for input written by scripts while parsing
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Every tokenizer state, including script data escapes and CDATA
//!   - Named and numeric character references
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Every insertion mode, tables and templates included
//!   - Adoption agency algorithm and foster parenting
//!   - SVG and MathML foreign content
//!   - DOCTYPE quirks classification
//!
//! - **Fragment parsing** ([WHATWG § 13.2.9](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!   and `innerHTML` assignment
//!
//! # Example
//!
//! ```
//! use thicket_html::{Parser, ParserOptions};
//!
//! let mut parser = Parser::new("about:blank", None, ParserOptions::new());
//! parser.parse("<p>Hello, ", false);
//! parser.parse("world</p>", true);
//! let document = parser.into_document();
//! let body = document.body().unwrap();
//! assert_eq!(document.text_content(body).as_deref(), Some("Hello, world"));
//! ```

/// The parser facade tying the stages together.
pub mod driver;
/// Fragment parsing.
pub mod fragment;
/// Parse errors.
pub mod issue;
/// HTML parser and tree construction.
pub mod parser;
/// The input stream.
pub mod scanner;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use driver::{Parser, ParserOptions, ScriptHost, parse_document, parse_fragment};
pub use fragment::{FragmentContext, set_inner_html};
pub use issue::ParseIssue;
pub use parser::{InsertionMode, TreeBuilder, format_tree, print_tree};
pub use scanner::Scanner;
pub use tokenizer::{Attribute, HTMLTokenizer, Token, TokenizerState, tokenize};
