//! The parser facade: scanner, tokenizer, and tree builder wired together.
//!
//! [§ 13.2.1 Overview of the parsing model](https://html.spec.whatwg.org/multipage/parsing.html#overview-of-the-parsing-model)
//!
//! Input arrives in chunks through [`Parser::parse`]. Each chunk is pushed
//! into the [`Scanner`] and tokens are pumped into the [`TreeBuilder`] until
//! the tokenizer runs out of input. A [`ScriptHost`] may feed more text back
//! in while a script runs; that text is parsed by a nested pump over the
//! scanner's save/restore stack before the outer input resumes.

use log::{debug, trace, warn};

use thicket_dom::{Document, HtmlTag, NodeId, QualName};

use crate::fragment::FragmentContext;
use crate::issue::ParseIssue;
use crate::parser::TreeBuilder;
use crate::scanner::Scanner;
use crate::tokenizer::{HTMLTokenizer, TokenizerState};

/// Nested `document.write` calls beyond this depth are dropped.
const MAX_REENTRANCY_DEPTH: usize = 16;

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for
    /// the Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise." It changes how `noscript` parses.
    pub scripting_enabled: bool,
    /// Log every parse issue at `warn` level as it is recorded.
    pub strict: bool,
}

impl ParserOptions {
    /// Scripting disabled, not strict.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scripting_enabled: false,
            strict: false,
        }
    }

    /// Set the scripting flag.
    #[must_use]
    pub const fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting_enabled = enabled;
        self
    }

    /// Enable strict mode.
    #[must_use]
    pub const fn with_strict_mode(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// Runs scripts as the parser finishes each `script` element.
///
/// The returned strings are inserted into the input stream at the current
/// insertion point, as `document.write()` would, and parsed before the rest
/// of the input.
pub trait ScriptHost {
    /// Execute `script`, an element of `document` whose end tag was just
    /// parsed.
    fn execute(&mut self, document: &mut Document, script: NodeId) -> Vec<String>;
}

/// An HTML parser for one document or fragment.
pub struct Parser {
    scanner: Scanner,
    tokenizer: HTMLTokenizer,
    builder: TreeBuilder,
    script_host: Option<Box<dyn ScriptHost>>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("insertion_mode", &self.builder.insertion_mode())
            .field("tokenizer_state", &self.tokenizer.state())
            .field("has_script_host", &self.script_host.is_some())
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Create a parser for a new document at `address`.
    ///
    /// With a `fragment_context`, this is the
    /// [HTML fragment parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments):
    /// the context element decides the initial insertion mode and tokenizer
    /// state, and the parsed nodes end up under [`Parser::fragment_root`].
    #[must_use]
    pub fn new(address: &str, fragment_context: Option<FragmentContext>, options: ParserOptions) -> Self {
        let mut document = Document::new(address);
        let mut tokenizer = HTMLTokenizer::new();

        let builder = match fragment_context {
            None => TreeBuilder::new(document, options.scripting_enabled),
            Some(context) => {
                // STEP 2: "If the context element's node document is in quirks
                //          mode, then let the Document be in quirks mode.
                //          Otherwise, if it is in limited-quirks mode, then let
                //          the Document be in limited-quirks mode."
                document.set_quirks_mode(context.quirks_mode);

                // STEP 5: "Set the state of the HTML parser's tokenization
                //          stage as follows, switching on the context
                //          element"
                if let Some(state) = context.initial_tokenizer_state(options.scripting_enabled) {
                    tokenizer.set_state(state);
                }

                let element = document.create_element_with_attributes(
                    QualName::new(None, context.namespace, &context.local_name),
                    context.attributes,
                );

                // The recreated context has no ancestors. A detached `form`
                // parent stands in for its form ancestor in STEP 14.
                if context.form_ancestor && !document.is_html_element(element, HtmlTag::Form) {
                    let form = document.create_element_with_attributes(QualName::html("form"), Vec::new());
                    if let Err(err) = document.append_child(form, element) {
                        debug!(target: "thicket::parser", "form ancestor not attached: {err}");
                    }
                }
                TreeBuilder::new_fragment(document, element, options.scripting_enabled)
            }
        };
        let builder = if options.strict {
            builder.with_strict_mode()
        } else {
            builder
        };
        tokenizer.set_allow_cdata(builder.allows_cdata());

        Self {
            scanner: Scanner::new(),
            tokenizer,
            builder,
            script_host: None,
        }
    }

    /// Install a host that runs scripts as they are parsed.
    #[must_use]
    pub fn with_script_host(mut self, host: Box<dyn ScriptHost>) -> Self {
        self.script_host = Some(host);
        self
    }

    /// Feed a chunk of input. `is_final` marks the last chunk; after it, the
    /// end-of-file token is processed and the document is complete.
    ///
    /// Chunks may split the input anywhere, including inside a tag, a
    /// character reference, or a CRLF pair.
    pub fn parse(&mut self, text: &str, is_final: bool) {
        trace!(target: "thicket::parser", "chunk of {} bytes, final: {is_final}", text.len());
        self.scanner.push_chunk(text, is_final);
        self.pump();
    }

    /// True once the end-of-file token has been processed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.builder.is_stopped()
    }

    /// The document built so far.
    #[must_use]
    pub const fn document(&self) -> &Document {
        self.builder.document()
    }

    /// Take the finished document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.builder.into_document()
    }

    /// Parse errors recorded so far, in input order.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        self.builder.issues()
    }

    /// The `html` element holding a fragment's parsed nodes.
    #[must_use]
    pub const fn fragment_root(&self) -> Option<NodeId> {
        self.builder.fragment_root()
    }

    /// [§ 13.2.9](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// "Return root's children, in tree order." Empty for a document parse.
    #[must_use]
    pub fn fragment_children(&self) -> Vec<NodeId> {
        self.fragment_root()
            .map(|root| self.document().children(root).to_vec())
            .unwrap_or_default()
    }

    /// Run the tokenizer and tree builder until input runs out or parsing
    /// stops.
    fn pump(&mut self) {
        while !self.builder.is_stopped() {
            let Some(token) = self.tokenizer.next_token(&mut self.scanner) else {
                break;
            };
            self.builder.record_issues(self.tokenizer.take_errors());
            self.builder.set_position(self.scanner.position());
            self.builder.process_token(&token);

            // The tree builder cannot reach the tokenizer; apply what it
            // asked for before the next token is produced.
            if let Some(state) = self.builder.take_tokenizer_state() {
                self.tokenizer.set_state(state);
            }
            self.tokenizer.set_allow_cdata(self.builder.allows_cdata());

            if let Some(script) = self.builder.take_pending_script() {
                self.run_script(script);
            }
        }
        self.builder.record_issues(self.tokenizer.take_errors());
    }

    /// [§ 13.2.6.4.8](https://html.spec.whatwg.org/multipage/parsing.html#scriptEndTag)
    ///
    /// Execute a script and parse what it writes "at the insertion point".
    fn run_script(&mut self, script: NodeId) {
        let Some(host) = self.script_host.as_mut() else {
            return;
        };
        if self.scanner.depth() >= MAX_REENTRANCY_DEPTH {
            warn!(target: "thicket::parser", "script nesting too deep, output dropped");
            return;
        }

        let output = host.execute(self.builder.document_mut(), script);
        let written: String = output.concat();
        if written.is_empty() {
            return;
        }
        debug!(
            target: "thicket::parser",
            "script wrote {} bytes at depth {}",
            written.len(),
            self.scanner.depth()
        );

        self.scanner.begin_reentrant(&written);
        self.pump();
        self.scanner.end_reentrant();
    }

    /// The tokenizer's current state, for diagnostics.
    #[must_use]
    pub const fn tokenizer_state(&self) -> TokenizerState {
        self.tokenizer.state()
    }
}

/// Parse a complete document.
#[must_use]
pub fn parse_document(html: &str, options: ParserOptions) -> Document {
    let mut parser = Parser::new("about:blank", None, options);
    parser.parse(html, true);
    parser.into_document()
}

/// Parse a fragment in `context`. Returns the fragment's document and the
/// parsed top-level nodes, which are children of the document's `html`
/// element.
#[must_use]
pub fn parse_fragment(
    context: FragmentContext,
    html: &str,
    options: ParserOptions,
) -> (Document, Vec<NodeId>) {
    let mut parser = Parser::new("about:blank", Some(context), options);
    parser.parse(html, true);
    let children = parser.fragment_children();
    (parser.into_document(), children)
}
