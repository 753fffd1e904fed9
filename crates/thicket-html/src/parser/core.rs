use log::{debug, warn};
use strum_macros::Display;

use thicket_common::warning::warn_once;
use thicket_dom::{Attr, Document, ElementData, HtmlTag, Namespace, NodeId, QualName};

use super::foreign_content::mathml::is_mathml_text_integration_point;
use super::foreign_content::{adjust_foreign_attributes, is_html_integration_point};
use super::formatting::ActiveFormattingElements;
use super::stack::{ElementStack, Scope};
use crate::issue::ParseIssue;
use crate::tokenizer::{Attribute, Token, TokenizerState};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
///
/// An adjusted insertion location: inside `parent`, before `before` (or at
/// the end when `before` is `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct InsertionPoint {
    pub(super) parent: NodeId,
    pub(super) before: Option<NodeId>,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The tree builder consumes tokens one at a time and builds the
/// [`Document`] it owns. It never fails: every parse error is recovered
/// locally and recorded as a [`ParseIssue`].
///
/// It cannot reach the tokenizer. State switches it requests (RCDATA for
/// `<title>`, script data for `<script>`, ...) are collected with
/// [`TreeBuilder::take_tokenizer_state`] after each token.
pub struct TreeBuilder {
    pub(super) document: Document,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// Used by the "text" and "in table text" modes to return.
    pub(super) original_insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) open_elements: ElementStack,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: ActiveFormattingElements,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#head-element-pointer)
    pub(super) head_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer)
    ///
    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    pub(super) form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    ///
    /// Set only by the HTML fragment parsing algorithm. The element is
    /// created in this document but never inserted.
    pub(super) context_element: Option<NodeId>,

    /// The `html` element that holds a fragment's parsed children.
    pub(super) fragment_root: Option<NodeId>,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    pub(super) scripting_enabled: bool,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// "If the next token is a U+000A LINE FEED (LF) character token, then
    /// ignore that token and move on to the next one." (`pre`, `listing`,
    /// `textarea`)
    pub(super) ignore_next_line_feed: bool,

    /// "The pending table character tokens list"
    pub(super) pending_table_text: String,

    /// Whether the current start tag's self-closing flag was acknowledged.
    pub(super) self_closing_acknowledged: bool,

    pub(super) tokenizer_state_request: Option<TokenizerState>,
    pub(super) pending_script: Option<NodeId>,
    pub(super) stopped: bool,

    /// Input position of the token being processed, for issue reports.
    pub(super) position: usize,
    pub(super) issues: Vec<ParseIssue>,
    pub(super) strict_mode: bool,
}

impl TreeBuilder {
    /// A tree builder for a whole document, starting in the "initial" mode.
    #[must_use]
    pub fn new(document: Document, scripting_enabled: bool) -> Self {
        Self {
            document,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: InsertionMode::Initial,
            template_insertion_modes: Vec::new(),
            open_elements: ElementStack::new(),
            active_formatting_elements: ActiveFormattingElements::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            context_element: None,
            fragment_root: None,
            scripting_enabled,
            frameset_ok: true,
            foster_parenting: false,
            ignore_next_line_feed: false,
            pending_table_text: String::new(),
            self_closing_acknowledged: false,
            tokenizer_state_request: None,
            pending_script: None,
            stopped: false,
            position: 0,
            issues: Vec::new(),
            strict_mode: false,
        }
    }

    /// [§ 13.2.9 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// A tree builder for the fragment case. `context` must be an element
    /// of `document`.
    #[must_use]
    pub fn new_fragment(document: Document, context: NodeId, scripting_enabled: bool) -> Self {
        let mut builder = Self::new(document, scripting_enabled);
        builder.context_element = Some(context);

        // STEP 8: "Let root be the result of creating an element given
        //          document, "html", and the HTML namespace."
        // STEP 9: "Append the element root to the Document node created
        //          above."
        // STEP 10: "Set up the parser's stack of open elements so that it
        //           contains just the single element root."
        let root = builder
            .document
            .create_element_with_attributes(QualName::html("html"), Vec::new());
        let document_node = builder.document.root();
        builder.insert_at(
            InsertionPoint {
                parent: document_node,
                before: None,
            },
            root,
        );
        builder.open_elements.push(root);
        builder.fragment_root = Some(root);

        // STEP 11: "If the context element is a template element, then push
        //           "in template" onto the stack of template insertion modes
        //           so that it is the new current template insertion mode."
        if builder.document.is_html_element(context, HtmlTag::Template) {
            builder.template_insertion_modes.push(InsertionMode::InTemplate);
        }

        // STEP 13: "Reset the parser's insertion mode appropriately."
        builder.reset_insertion_mode_appropriately();

        // STEP 14: "Set the parser's form element pointer to the nearest node
        //           to the context element that is a form element (going
        //           straight up the ancestor chain, and including the element
        //           itself, if it is a form element), if any."
        builder.form_element_pointer = std::iter::once(context)
            .chain(builder.document.ancestors(context))
            .find(|&id| builder.document.is_html_element(id, HtmlTag::Form));

        builder
    }

    /// Record parse issues at `warn` level as they happen, in addition to
    /// the deduplicated warning channel.
    #[must_use]
    pub const fn with_strict_mode(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    /// The document being built.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for the script host.
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Give up the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// The `html` element holding the result of a fragment parse.
    #[must_use]
    pub const fn fragment_root(&self) -> Option<NodeId> {
        self.fragment_root
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// Whether "stop parsing" has run.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The stack of open elements.
    #[must_use]
    pub const fn open_elements(&self) -> &ElementStack {
        &self.open_elements
    }

    /// Parse issues recorded so far.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Add issues reported by the tokenizer, keeping one list in input order.
    pub fn record_issues(&mut self, issues: impl IntoIterator<Item = ParseIssue>) {
        for issue in issues {
            if self.strict_mode {
                warn!(target: "thicket::tokenizer", "{} at {}", issue.message, issue.position);
            }
            self.issues.push(issue);
        }
    }

    /// Set the input position used for issue reports.
    pub const fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// A tokenizer state switch requested by the last token, if any.
    pub const fn take_tokenizer_state(&mut self) -> Option<TokenizerState> {
        self.tokenizer_state_request.take()
    }

    /// A `script` element whose end tag was just processed, if any.
    pub const fn take_pending_script(&mut self) -> Option<NodeId> {
        self.pending_script.take()
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "If there is an adjusted current node and it is not an element in the
    /// HTML namespace" then `<![CDATA[` starts a CDATA section.
    #[must_use]
    pub fn allows_cdata(&self) -> bool {
        self.adjusted_current_node()
            .and_then(|id| self.document.as_element(id))
            .is_some_and(|element| *element.namespace() != Namespace::Html)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    pub fn process_token(&mut self, token: &Token) {
        if self.stopped {
            return;
        }
        self.self_closing_acknowledged = false;

        if std::mem::take(&mut self.ignore_next_line_feed)
            && let Token::Text { data } = token
            && let Some(rest) = data.strip_prefix('\n')
        {
            if !rest.is_empty() {
                self.dispatch(&Token::Text {
                    data: rest.to_string(),
                });
            }
            return;
        }

        self.dispatch(token);

        // "When a start tag token is emitted with its self-closing flag set,
        //  if the flag is not acknowledged when the token is processed by the
        //  tree construction stage, that is a parse error."
        if let Token::StartTag {
            self_closing: true,
            name,
            ..
        } = token
            && !self.self_closing_acknowledged
        {
            self.parse_error(&format!(
                "non-void-html-element-start-tag-with-trailing-solidus <{name}>"
            ));
        }
    }

    /// "As each token is emitted from the tokenizer, the user agent must
    /// follow the appropriate steps from the following list, known as the
    /// tree construction dispatcher"
    fn dispatch(&mut self, token: &Token) {
        if self.uses_html_rules(token) {
            self.process_using(self.insertion_mode, token);
        } else {
            self.process_foreign_content(token);
        }
    }

    fn uses_html_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return true;
        };
        let Some(element) = self.document.as_element(node) else {
            return true;
        };
        // "If the adjusted current node is an element in the HTML namespace"
        if *element.namespace() == Namespace::Html {
            return true;
        }
        match token {
            // "If the adjusted current node is a MathML text integration point
            //  and the token is a start tag whose tag name is neither
            //  "mglyph" nor "malignmark""
            // "If the adjusted current node is a MathML text integration point
            //  and the token is a character token"
            Token::StartTag { name, .. }
                if is_mathml_text_integration_point(element)
                    && name != "mglyph"
                    && name != "malignmark" =>
            {
                true
            }
            Token::Text { .. } if is_mathml_text_integration_point(element) => true,
            // "If the adjusted current node is a MathML annotation-xml element
            //  and the token is a start tag whose tag name is "svg""
            Token::StartTag { name, .. }
                if name == "svg" && element.is(&Namespace::MathMl, "annotation-xml") =>
            {
                true
            }
            // "If the adjusted current node is an HTML integration point and
            //  the token is a start tag"
            // "If the adjusted current node is an HTML integration point and
            //  the token is a character token"
            Token::StartTag { .. } | Token::Text { .. } => is_html_integration_point(element),
            // "If the token is an end-of-file token"
            Token::EndOfFile => true,
            _ => false,
        }
    }

    /// Process `token` using the rules for `mode`, without changing the
    /// current insertion mode.
    pub(super) fn process_using(&mut self, mode: InsertionMode, token: &Token) {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),

            // ===== TABLE PARSING MODES =====
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),

            // ===== FORM ELEMENT MODES =====
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),

            InsertionMode::InTemplate => self.handle_in_template_mode(token),

            // ===== AFTER / FRAMESET MODES =====
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// Switch to `mode` and reprocess the token there.
    pub(super) fn reprocess_in(&mut self, mode: InsertionMode, token: &Token) {
        self.insertion_mode = mode;
        self.dispatch(token);
    }

    /// "Reprocess the token" in the current insertion mode, after the
    /// handler has changed it.
    pub(super) fn reprocess(&mut self, token: &Token) {
        self.dispatch(token);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    pub(super) fn parse_error(&mut self, message: &str) {
        debug!(target: "thicket::tree_builder", "{message} at {} in {}", self.position, self.insertion_mode);
        let _ = warn_once("HTML tree builder", message);
        if self.strict_mode {
            warn!(target: "thicket::tree_builder", "{message} at {}", self.position);
        }
        self.issues.push(ParseIssue::new(message, self.position));
    }

    pub(super) fn unexpected_token(&mut self, token: &Token) {
        let message = match token {
            Token::StartTag { name, .. } => format!("unexpected-start-tag <{name}>"),
            Token::EndTag { name, .. } => format!("unexpected-end-tag </{name}>"),
            Token::Doctype { .. } => "unexpected-doctype".to_string(),
            Token::Text { .. } => "unexpected-character".to_string(),
            Token::Comment { .. } => "unexpected-comment".to_string(),
            Token::EndOfFile => "unexpected-eof".to_string(),
        };
        self.parse_error(&message);
    }

    // =========================================================================
    // Stack helpers
    // =========================================================================

    /// "The current node is the bottommost node in this stack of open
    /// elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.open_elements.current()
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#adjusted-current-node)
    ///
    /// "The adjusted current node is the context element if the parser was
    /// created as part of the HTML fragment parsing algorithm and the stack
    /// of open elements has only one element in it (fragment case);
    /// otherwise, the adjusted current node is the current node."
    pub(super) fn adjusted_current_node(&self) -> Option<NodeId> {
        match self.context_element {
            Some(context) if self.open_elements.len() == 1 => Some(context),
            _ => self.current_node(),
        }
    }

    /// The HTML tag of `id`, `None` for foreign or unknown elements.
    pub(super) fn html_tag_of(&self, id: NodeId) -> Option<HtmlTag> {
        self.document.as_element(id).and_then(ElementData::html_tag)
    }

    pub(super) fn current_node_is(&self, tag: HtmlTag) -> bool {
        self.open_elements.current_is(&self.document, tag)
    }

    pub(super) fn current_node_is_any(&self, tags: &[HtmlTag]) -> bool {
        self.current_node()
            .and_then(|id| self.html_tag_of(id))
            .is_some_and(|tag| tags.contains(&tag))
    }

    pub(super) fn pop_current_node(&mut self) {
        let _ = self.open_elements.pop();
    }

    pub(super) fn template_on_stack(&self) -> bool {
        self.open_elements
            .contains_tag(&self.document, HtmlTag::Template)
    }

    /// Whether this is the fragment case of the parsing algorithm.
    pub(super) const fn is_fragment(&self) -> bool {
        self.context_element.is_some()
    }

    // =========================================================================
    // Creating and inserting nodes
    // =========================================================================

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    pub(super) fn appropriate_place(&self, override_target: Option<NodeId>) -> InsertionPoint {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the
        //          current node."
        let target = override_target
            .or_else(|| self.current_node())
            .unwrap_or_else(|| self.document.root());

        // STEP 2: "Determine the adjusted insertion location using the first
        //          matching steps from the following list:"
        let mut point = if self.foster_parenting
            && matches!(
                self.html_tag_of(target),
                Some(HtmlTag::Table | HtmlTag::Tbody | HtmlTag::Tfoot | HtmlTag::Thead | HtmlTag::Tr)
            ) {
            self.foster_parent_location()
        } else {
            // "Otherwise: Let adjusted insertion location be inside target,
            //  after its last child (if any)."
            InsertionPoint {
                parent: target,
                before: None,
            }
        };

        // STEP 3: "If the adjusted insertion location is inside a template
        //          element, let it instead be inside the template element's
        //          template contents, after its last child (if any)."
        if let Some(contents) = self
            .document
            .as_element(point.parent)
            .and_then(ElementData::template_contents)
        {
            point = InsertionPoint {
                parent: contents,
                before: None,
            };
        }
        point
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// "If foster parenting is enabled and target is a table, tbody, tfoot,
    /// thead, or tr element"
    fn foster_parent_location(&self) -> InsertionPoint {
        // "1. Let last template be the last template element in the stack of
        //  open elements, if any.
        //  2. Let last table be the last table element in the stack of open
        //  elements, if any."
        let last_template = self
            .open_elements
            .last_index_of(&self.document, HtmlTag::Template);
        let last_table = self
            .open_elements
            .last_index_of(&self.document, HtmlTag::Table);

        let inside = |index: usize| InsertionPoint {
            parent: self
                .open_elements
                .get(index)
                .unwrap_or_else(|| self.document.root()),
            before: None,
        };

        match (last_template, last_table) {
            // "3. If there is a last template and either there is no last
            //  table, or there is one, but last template is lower (more
            //  recently added) than last table in the stack of open elements,
            //  then: let adjusted insertion location be inside last
            //  template's template contents, after its last child (if any),
            //  and abort these steps."
            (Some(template), table) if table.is_none_or(|table| template > table) => {
                inside(template)
            }
            // "4. If there is no last table, then let adjusted insertion
            //  location be inside the first element in the stack of open
            //  elements (the html element), after its last child (if any),
            //  and abort these steps. (fragment case)"
            (_, None) => inside(0),
            (_, Some(table)) => {
                let table_id = self
                    .open_elements
                    .get(table)
                    .unwrap_or_else(|| self.document.root());
                // "5. If last table has a parent node, then let adjusted
                //  insertion location be inside last table's parent node,
                //  immediately before last table, and abort these steps."
                match self.document.parent(table_id) {
                    Some(parent) => InsertionPoint {
                        parent,
                        before: Some(table_id),
                    },
                    // "6. Let previous element be the element immediately
                    //  above last table in the stack of open elements.
                    //  7. Let adjusted insertion location be inside previous
                    //  element, after its last child (if any)."
                    None => inside(table.saturating_sub(1)),
                }
            }
        }
    }

    /// Insert `node` at `point`. The tree builder only makes insertions the
    /// DOM accepts, so the pre-insertion checks are skipped; a failure here
    /// is logged and otherwise ignored.
    pub(super) fn insert_at(&mut self, point: InsertionPoint, node: NodeId) {
        if let Err(err) = self
            .document
            .insert_before_unchecked(point.parent, node, point.before)
        {
            debug!(target: "thicket::tree_builder", "insertion rejected: {err}");
        }
    }

    /// Append `node` to `parent`.
    pub(super) fn append_to(&mut self, parent: NodeId, node: NodeId) {
        self.insert_at(InsertionPoint { parent, before: None }, node);
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Inserts a whole run of characters at once.
    pub(super) fn insert_text(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        // STEP 2: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let point = self.appropriate_place(None);

        // STEP 3: "If the adjusted insertion location is inside a Document
        //          node, then return."
        if point.parent == self.document.root() {
            return;
        }

        // STEP 4: "If there is a Text node immediately before the adjusted
        //          insertion location, then append data to that Text node's
        //          data."
        let previous = match point.before {
            Some(before) => self.document.prev_sibling(before),
            None => self.document.last_child(point.parent),
        };
        if let Some(previous) = previous
            && self.document.as_text(previous).is_some()
        {
            if let Err(err) = self.document.append_data(previous, data) {
                debug!(target: "thicket::tree_builder", "text merge rejected: {err}");
            }
            return;
        }

        // STEP 5: "Otherwise, create a new Text node whose data is data and
        //          whose node document is the same as that of the element in
        //          which the adjusted insertion location finds itself, and
        //          insert the newly created node at the adjusted insertion
        //          location."
        let text = self.document.create_text_node(data);
        self.insert_at(point, text);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    pub(super) fn insert_comment(&mut self, data: &str) {
        let point = self.appropriate_place(None);
        let comment = self.document.create_comment(data);
        self.insert_at(point, comment);
    }

    /// Insert a comment as the last child of `parent`, e.g. the Document.
    pub(super) fn append_comment_to(&mut self, parent: NodeId, data: &str) {
        let comment = self.document.create_comment(data);
        self.append_to(parent, comment);
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for a token": the element is not inserted. SVG and
    /// MathML elements have their attributes adjusted here, the only case in
    /// which foreign elements are created from tokens.
    pub(super) fn create_element_for_token(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> NodeId {
        let attrs: Vec<Attr> = match namespace {
            Namespace::Svg | Namespace::MathMl => adjust_foreign_attributes(&namespace, attributes),
            _ => attributes
                .iter()
                .map(|attr| Attr::new(&attr.name, &attr.value))
                .collect(),
        };
        self.document
            .create_element_with_attributes(QualName::new(None, namespace, name), attrs)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "Insert a foreign element": create, insert at the appropriate place,
    /// and push onto the stack of open elements.
    pub(super) fn insert_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
    ) -> NodeId {
        // STEP 1: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let point = self.appropriate_place(None);
        // STEP 2: "Let element be the result of creating an element for the
        //          token in the given namespace"
        let element = self.create_element_for_token(name, attributes, namespace);
        // STEP 3: "If it is possible to insert element at the adjusted
        //          insertion location..."
        self.insert_at(point, element);
        // STEP 4: "Push element onto the stack of open elements so that it is
        //          the new current node."
        self.open_elements.push(element);
        element
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the
    /// token, with the HTML namespace"
    pub(super) fn insert_html_element(&mut self, token: &Token) -> NodeId {
        let name = token.tag_name().unwrap_or_default();
        self.insert_element(name, attributes_of(token), Namespace::Html)
    }

    /// Insert an HTML element for a start tag named `name` with no
    /// attributes, as in "insert an HTML element for a "body" start tag
    /// token with no attributes".
    pub(super) fn insert_html_element_named(&mut self, name: &str) -> NodeId {
        self.insert_element(name, &[], Namespace::Html)
    }

    /// "Acknowledge the token's self-closing flag"
    pub(super) const fn acknowledge_self_closing(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// Insert a void element: insert, pop, and acknowledge the self-closing
    /// flag.
    pub(super) fn insert_void_element(&mut self, token: &Token) {
        let _ = self.insert_html_element(token);
        self.pop_current_node();
        self.acknowledge_self_closing();
    }

    /// Add the token's attributes to `element` where not already present,
    /// as for a stray `<html>` or `<body>` start tag.
    pub(super) fn merge_attributes(&mut self, element: NodeId, token: &Token) {
        for attr in attributes_of(token) {
            let _ = self
                .document
                .add_attribute_if_missing(element, Attr::new(&attr.name, &attr.value));
        }
    }

    /// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    /// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm)
    ///
    /// "1. Insert an HTML element for the token.
    ///  2. If the algorithm that was invoked is the generic raw text element
    ///  parsing algorithm, switch the tokenizer to the RAWTEXT state;
    ///  otherwise the algorithm invoked was the generic RCDATA element
    ///  parsing algorithm, switch the tokenizer to the RCDATA state.
    ///  3. Set the original insertion mode to the current insertion mode.
    ///  4. Then, switch the insertion mode to "text"."
    pub(super) fn parse_text_element(&mut self, token: &Token, state: TokenizerState) {
        let _ = self.insert_html_element(token);
        self.tokenizer_state_request = Some(state);
        self.original_insertion_mode = self.insertion_mode;
        self.insertion_mode = InsertionMode::Text;
    }

    // =========================================================================
    // Implied end tags, scope closing, and mode resetting
    // =========================================================================

    /// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element,
    /// an rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements."
    ///
    /// `except` is the element excluded by "generate implied end tags,
    /// except for X elements".
    pub(super) fn generate_implied_end_tags(&mut self, except: Option<HtmlTag>) {
        while let Some(tag) = self.current_node().and_then(|id| self.html_tag_of(id)) {
            let implied = matches!(
                tag,
                HtmlTag::Dd
                    | HtmlTag::Dt
                    | HtmlTag::Li
                    | HtmlTag::Optgroup
                    | HtmlTag::OptionElement
                    | HtmlTag::P
                    | HtmlTag::Rb
                    | HtmlTag::Rp
                    | HtmlTag::Rt
                    | HtmlTag::Rtc
            );
            if !implied || except == Some(tag) {
                break;
            }
            self.pop_current_node();
        }
    }

    /// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
    pub(super) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self.current_node_is_any(&[
            HtmlTag::Caption,
            HtmlTag::Colgroup,
            HtmlTag::Dd,
            HtmlTag::Dt,
            HtmlTag::Li,
            HtmlTag::Optgroup,
            HtmlTag::OptionElement,
            HtmlTag::P,
            HtmlTag::Rb,
            HtmlTag::Rp,
            HtmlTag::Rt,
            HtmlTag::Rtc,
            HtmlTag::Tbody,
            HtmlTag::Td,
            HtmlTag::Tfoot,
            HtmlTag::Th,
            HtmlTag::Thead,
            HtmlTag::Tr,
        ]) {
            self.pop_current_node();
        }
    }

    /// Generate implied end tags, report an error unless the current node is
    /// then `tag`, and pop through `tag`. The shape shared by most "an end
    /// tag whose tag name is X" entries.
    pub(super) fn close_element(&mut self, tag: HtmlTag) {
        self.generate_implied_end_tags(None);
        if !self.current_node_is(tag) {
            self.parse_error(&format!("end-tag-with-open-elements </{tag}>"));
        }
        self.open_elements.pop_until(&self.document, tag);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. If the current
    /// node is not a p element, then this is a parse error. Pop elements from
    /// the stack of open elements until a p element has been popped from the
    /// stack."
    pub(super) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some(HtmlTag::P));
        if !self.current_node_is(HtmlTag::P) {
            self.parse_error("unclosed-elements-inside-p");
        }
        self.open_elements.pop_until(&self.document, HtmlTag::P);
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    pub(super) fn close_p_element_in_button_scope(&mut self) {
        if self
            .open_elements
            .has_in_scope(&self.document, HtmlTag::P, Scope::Button)
        {
            self.close_p_element();
        }
    }

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        self.insertion_mode = self.appropriate_insertion_mode();
    }

    fn appropriate_insertion_mode(&self) -> InsertionMode {
        // STEP 1: "Let last be false."
        // STEP 2: "Let node be the last node in the stack of open elements."
        for index in (0..self.open_elements.len()).rev() {
            let Some(mut node) = self.open_elements.get(index) else {
                continue;
            };
            // STEP 3: "Loop: If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser was
            //          created as part of the HTML fragment parsing algorithm
            //          (fragment case), set node to the context element passed
            //          to that algorithm."
            let last = index == 0;
            if last && let Some(context) = self.context_element {
                node = context;
            }

            match self.html_tag_of(node) {
                // STEP 4: "If node is a select element, run these substeps:"
                Some(HtmlTag::Select) => {
                    if !last {
                        for ancestor_index in (0..index).rev() {
                            let Some(ancestor) = self.open_elements.get(ancestor_index) else {
                                continue;
                            };
                            match self.html_tag_of(ancestor) {
                                Some(HtmlTag::Template) => break,
                                Some(HtmlTag::Table) => return InsertionMode::InSelectInTable,
                                _ => {}
                            }
                        }
                    }
                    return InsertionMode::InSelect;
                }
                // STEP 5: "If node is a td or th element and last is false,
                //          then switch the insertion mode to "in cell" and
                //          return."
                Some(HtmlTag::Td | HtmlTag::Th) if !last => return InsertionMode::InCell,
                Some(HtmlTag::Tr) => return InsertionMode::InRow,
                Some(HtmlTag::Tbody | HtmlTag::Thead | HtmlTag::Tfoot) => {
                    return InsertionMode::InTableBody;
                }
                Some(HtmlTag::Caption) => return InsertionMode::InCaption,
                Some(HtmlTag::Colgroup) => return InsertionMode::InColumnGroup,
                Some(HtmlTag::Table) => return InsertionMode::InTable,
                // STEP 11: "If node is a template element, then switch the
                //           insertion mode to the current template insertion
                //           mode and return."
                Some(HtmlTag::Template) => {
                    return self
                        .template_insertion_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate);
                }
                Some(HtmlTag::Head) if !last => return InsertionMode::InHead,
                Some(HtmlTag::Body) => return InsertionMode::InBody,
                Some(HtmlTag::Frameset) => return InsertionMode::InFrameset,
                // STEP 15: "If node is an html element, run these substeps:
                //           If the head element pointer is null, switch the
                //           insertion mode to "before head" and return.
                //           Otherwise, switch to "after head" and return."
                Some(HtmlTag::Html) => {
                    return if self.head_element_pointer.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ => {}
            }
            // STEP 16: "If last is true, then switch the insertion mode to
            //           "in body" and return. (fragment case)"
            if last {
                return InsertionMode::InBody;
            }
        }
        InsertionMode::InBody
    }

    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(super) fn stop_parsing(&mut self) {
        self.open_elements.truncate(0);
        self.stopped = true;
    }
}

/// The attributes of a start or end tag token; empty for anything else.
pub(super) fn attributes_of(token: &Token) -> &[Attribute] {
    match token {
        Token::StartTag { attributes, .. } | Token::EndTag { attributes, .. } => attributes,
        _ => &[],
    }
}

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
pub(super) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Split a text run into its leading whitespace and the rest.
pub(super) fn split_leading_whitespace(data: &str) -> (&str, &str) {
    let end = data.find(|c| !is_whitespace(c)).unwrap_or(data.len());
    data.split_at(end)
}

/// Whether a text run is whitespace only.
pub(super) fn is_all_whitespace(data: &str) -> bool {
    data.chars().all(is_whitespace)
}
