//! The insertion modes outside of "in body" and the table family.

use thicket_dom::{HtmlTag, Namespace, QuirksMode};

use super::core::{InsertionMode, TreeBuilder, is_whitespace, split_leading_whitespace};
use super::quirks::{is_doctype_error, quirks_mode_for_doctype};
use super::stack::Scope;
use crate::tokenizer::{Attribute, Token, TokenizerState};

impl TreeBuilder {
    // =========================================================================
    // Document start
    // =========================================================================

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Ignore the token."
            Token::Text { data } => {
                let (_, rest) = split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.initial_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => {
                let root = self.document.root();
                self.append_comment_to(root, data);
            }

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                if is_doctype_error(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                ) {
                    self.parse_error("unknown-doctype");
                }

                // "Append a DocumentType node to the Document node, with its
                //  name set to the name given in the DOCTYPE token, or the
                //  empty string if the name was missing; its public ID set to
                //  the public identifier given in the DOCTYPE token, or the
                //  empty string if the public identifier was missing; and its
                //  system ID set to the system identifier given in the DOCTYPE
                //  token, or the empty string if the system identifier was
                //  missing."
                let doctype = self.document.create_document_type(
                    name.as_deref().unwrap_or_default(),
                    public_identifier.as_deref().unwrap_or_default(),
                    system_identifier.as_deref().unwrap_or_default(),
                );
                let root = self.document.root();
                self.append_to(root, doctype);

                let mode = quirks_mode_for_doctype(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                    *force_quirks,
                );
                self.document.set_quirks_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            _ => self.initial_anything_else(token),
        }
    }

    /// "Anything else: If the document is not an iframe srcdoc document,
    /// then this is a parse error; if the parser cannot change the mode flag
    /// is false, set the Document to quirks mode. In any case, switch the
    /// insertion mode to "before html", then reprocess the token."
    fn initial_anything_else(&mut self, token: &Token) {
        self.parse_error("expected-doctype-but-got-other");
        self.document.set_quirks_mode(QuirksMode::Quirks);
        self.reprocess_in(InsertionMode::BeforeHtml, token);
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token: Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => {
                let root = self.document.root();
                self.append_comment_to(root, data);
            }

            // "A character token that is ASCII whitespace: Ignore the token."
            Token::Text { data } => {
                let (_, rest) = split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.before_html_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A start tag whose tag name is "html": Create an element for
            //  the token in the HTML namespace, with the Document as the
            //  intended parent. Append it to the Document object. Put this
            //  element in the stack of open elements. Switch the insertion
            //  mode to "before head"."
            Token::StartTag { name, attributes, .. } if name == "html" => {
                self.insert_document_element(attributes);
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            //  "br": Act as described in the "anything else" entry below."
            // "Any other end tag: Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.unexpected_token(token);
            }

            _ => self.before_html_anything_else(token),
        }
    }

    fn insert_document_element(&mut self, attributes: &[Attribute]) {
        let html = self.create_element_for_token("html", attributes, Namespace::Html);
        let root = self.document.root();
        self.append_to(root, html);
        self.open_elements.push(html);
        self.insertion_mode = InsertionMode::BeforeHead;
    }

    /// "Anything else: Create an html element whose node document is the
    /// Document object. Append it to the Document object. Put this element
    /// in the stack of open elements. Switch the insertion mode to "before
    /// head", then reprocess the token."
    fn before_html_anything_else(&mut self, token: &Token) {
        self.insert_document_element(&[]);
        self.reprocess(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            Token::Text { data } => {
                let (_, rest) = split_leading_whitespace(data);
                if !rest.is_empty() {
                    self.before_head_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html": Process the token using
            //  the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "head": Insert an HTML element
            //  for the token. Set the head element pointer to the newly
            //  created head element. Switch the insertion mode to "in head"."
            Token::StartTag { name, .. } if name == "head" => {
                let head = self.insert_html_element(token);
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
            }

            Token::EndTag { name, .. }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.unexpected_token(token);
            }

            _ => self.before_head_anything_else(token),
        }
    }

    /// "Anything else: Insert an HTML element for a "head" start tag token
    /// with no attributes. Set the head element pointer to the newly created
    /// head element. Switch the insertion mode to "in head". Reprocess the
    /// current token."
    fn before_head_anything_else(&mut self, token: &Token) {
        let head = self.insert_html_element_named("head");
        self.head_element_pointer = Some(head);
        self.reprocess_in(InsertionMode::InHead, token);
    }

    // =========================================================================
    // Head
    // =========================================================================

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Insert the character."
            (Token::Text { data }, _) => {
                let (whitespace, rest) = split_leading_whitespace(data);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.in_head_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }
            (Token::Comment { data }, _) => self.insert_comment(data),
            (Token::Doctype { .. }, _) => self.unexpected_token(token),

            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link": Insert an HTML element for the token.
            //  Immediately pop the current node off the stack of open
            //  elements. Acknowledge the token's self-closing flag, if it is
            //  set."
            // "A start tag whose tag name is "meta"": the same, plus encoding
            //  sniffing, which does not apply to already-decoded text.
            (
                Token::StartTag { .. },
                Some(HtmlTag::Base | HtmlTag::Basefont | HtmlTag::Bgsound | HtmlTag::Link | HtmlTag::Meta),
            ) => self.insert_void_element(token),

            // "A start tag whose tag name is "title": Follow the generic RCDATA
            //  element parsing algorithm."
            (Token::StartTag { .. }, Some(HtmlTag::Title)) => {
                self.parse_text_element(token, TokenizerState::RCDATA);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            //  is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            (Token::StartTag { .. }, Some(HtmlTag::Noscript)) if self.scripting_enabled => {
                self.parse_text_element(token, TokenizerState::RAWTEXT);
            }
            (Token::StartTag { .. }, Some(HtmlTag::Noframes | HtmlTag::Style)) => {
                self.parse_text_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            //  is disabled: Insert an HTML element for the token. Switch the
            //  insertion mode to "in head noscript"."
            (Token::StartTag { .. }, Some(HtmlTag::Noscript)) => {
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InHeadNoscript;
            }

            // "A start tag whose tag name is "script""
            // "1. Let the adjusted insertion location be the appropriate place
            //     for inserting a node.
            //  2. Let element be the result of creating an element for the
            //     token in the given namespace, with the intended parent being
            //     the element in which the adjusted insertion location finds
            //     itself.
            //  ...
            //  6. Insert the newly created element at the adjusted insertion
            //     location.
            //  7. Push the element onto the stack of open elements so that it
            //     is the new current node.
            //  8. Switch the tokenizer to the script data state.
            //  9. Let the original insertion mode be the current insertion
            //     mode.
            //  10. Switch the insertion mode to "text"."
            (Token::StartTag { .. }, Some(HtmlTag::Script)) => {
                self.parse_text_element(token, TokenizerState::ScriptData);
            }

            // "An end tag whose tag name is "head": Pop the current node
            //  (which will be the head element) off the stack of open
            //  elements. Switch the insertion mode to "after head"."
            (Token::EndTag { .. }, Some(HtmlTag::Head)) => {
                self.pop_current_node();
                self.insertion_mode = InsertionMode::AfterHead;
            }

            // "An end tag whose tag name is one of: "body", "html", "br": Act
            //  as described in the "anything else" entry below."
            (Token::EndTag { .. }, Some(HtmlTag::Body | HtmlTag::Html | HtmlTag::Br)) => {
                self.in_head_anything_else(token);
            }

            // "A start tag whose tag name is "template""
            (Token::StartTag { .. }, Some(HtmlTag::Template)) => {
                // "Insert an HTML element for the token. Insert a marker at the
                //  end of the list of active formatting elements. Set the
                //  frameset-ok flag to "not ok". Switch the insertion mode to
                //  "in template". Push "in template" onto the stack of
                //  template insertion modes so that it is the new current
                //  template insertion mode."
                let _ = self.insert_html_element(token);
                self.active_formatting_elements.push_marker();
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InTemplate;
                self.template_insertion_modes.push(InsertionMode::InTemplate);
            }

            // "An end tag whose tag name is "template""
            (Token::EndTag { .. }, Some(HtmlTag::Template)) => {
                // "If there is no template element on the stack of open
                //  elements, then this is a parse error; ignore the token."
                if !self.template_on_stack() {
                    self.unexpected_token(token);
                    return;
                }
                self.close_template();
            }

            // "A start tag whose tag name is "head"" / "Any other end tag":
            // "Parse error. Ignore the token."
            (Token::StartTag { .. }, Some(HtmlTag::Head)) | (Token::EndTag { .. }, _) => {
                self.unexpected_token(token);
            }

            _ => self.in_head_anything_else(token),
        }
    }

    /// "Anything else: Pop the current node (which will be the head element)
    /// off the stack of open elements. Switch the insertion mode to "after
    /// head". Reprocess the token."
    fn in_head_anything_else(&mut self, token: &Token) {
        self.pop_current_node();
        self.reprocess_in(InsertionMode::AfterHead, token);
    }

    /// The "template" end tag steps, also run at end of file in "in
    /// template".
    fn close_template(&mut self) {
        // "1. Generate all implied end tags thoroughly.
        //  2. If the current node is not a template element, then this is a
        //     parse error.
        //  3. Pop elements from the stack of open elements until a template
        //     element has been popped from the stack.
        //  4. Clear the list of active formatting elements up to the last
        //     marker.
        //  5. Pop the current template insertion mode off the stack of
        //     template insertion modes.
        //  6. Reset the insertion mode appropriately."
        self.generate_all_implied_end_tags_thoroughly();
        if !self.current_node_is(HtmlTag::Template) {
            self.parse_error("end-tag-with-open-elements </template>");
        }
        self.open_elements.pop_until(&self.document, HtmlTag::Template);
        self.active_formatting_elements.clear_to_last_marker();
        let _ = self.template_insertion_modes.pop();
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            (Token::Doctype { .. }, _) => self.unexpected_token(token),
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "noscript": Pop the current node
            //  (which will be a noscript element) from the stack of open
            //  elements; the new current node will be a head element. Switch
            //  the insertion mode to "in head"."
            (Token::EndTag { .. }, Some(HtmlTag::Noscript)) => {
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InHead;
            }

            // "A character token that is ASCII whitespace", "A comment token",
            // "A start tag whose tag name is one of: "basefont", "bgsound",
            // "link", "meta", "noframes", "style"": Process the token using
            // the rules for the "in head" insertion mode.
            (Token::Text { data }, _) => {
                let (whitespace, rest) = split_leading_whitespace(data);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.in_head_noscript_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }
            (Token::Comment { .. }, _)
            | (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Basefont
                    | HtmlTag::Bgsound
                    | HtmlTag::Link
                    | HtmlTag::Meta
                    | HtmlTag::Noframes
                    | HtmlTag::Style,
                ),
            ) => self.handle_in_head_mode(token),

            // "An end tag whose tag name is "br": Act as described in the
            //  "anything else" entry below."
            (Token::EndTag { .. }, Some(HtmlTag::Br)) => self.in_head_noscript_anything_else(token),

            // "A start tag whose tag name is one of: "head", "noscript"" /
            // "Any other end tag": "Parse error. Ignore the token."
            (Token::StartTag { .. }, Some(HtmlTag::Head | HtmlTag::Noscript)) | (Token::EndTag { .. }, _) => {
                self.unexpected_token(token);
            }

            _ => self.in_head_noscript_anything_else(token),
        }
    }

    /// "Anything else: Parse error. Pop the current node (which will be a
    /// noscript element) from the stack of open elements; the new current
    /// node will be a head element. Switch the insertion mode to "in head".
    /// Reprocess the token."
    fn in_head_noscript_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.pop_current_node();
        self.reprocess_in(InsertionMode::InHead, token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            (Token::Text { data }, _) => {
                let (whitespace, rest) = split_leading_whitespace(data);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.after_head_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }
            (Token::Comment { data }, _) => self.insert_comment(data),
            (Token::Doctype { .. }, _) => self.unexpected_token(token),
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "body": Insert an HTML element
            //  for the token. Set the frameset-ok flag to "not ok". Switch the
            //  insertion mode to "in body"."
            (Token::StartTag { .. }, Some(HtmlTag::Body)) => {
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InBody;
            }

            // "A start tag whose tag name is "frameset": Insert an HTML
            //  element for the token. Switch the insertion mode to "in
            //  frameset"."
            (Token::StartTag { .. }, Some(HtmlTag::Frameset)) => {
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InFrameset;
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title""
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Base
                    | HtmlTag::Basefont
                    | HtmlTag::Bgsound
                    | HtmlTag::Link
                    | HtmlTag::Meta
                    | HtmlTag::Noframes
                    | HtmlTag::Script
                    | HtmlTag::Style
                    | HtmlTag::Template
                    | HtmlTag::Title,
                ),
            ) => {
                // "Parse error. Push the node pointed to by the head element
                //  pointer onto the stack of open elements. Process the token
                //  using the rules for the "in head" insertion mode. Remove
                //  the node pointed to by the head element pointer from the
                //  stack of open elements. (It might not be the current node
                //  at this point.)"
                self.unexpected_token(token);
                let Some(head) = self.head_element_pointer else {
                    self.handle_in_head_mode(token);
                    return;
                };
                self.open_elements.push(head);
                self.handle_in_head_mode(token);
                self.open_elements.remove(head);
            }

            (Token::EndTag { .. }, Some(HtmlTag::Template)) => self.handle_in_head_mode(token),

            (Token::EndTag { .. }, Some(HtmlTag::Body | HtmlTag::Html | HtmlTag::Br)) => {
                self.after_head_anything_else(token);
            }

            (Token::StartTag { .. }, Some(HtmlTag::Head)) | (Token::EndTag { .. }, _) => {
                self.unexpected_token(token);
            }

            _ => self.after_head_anything_else(token),
        }
    }

    /// "Anything else: Insert an HTML element for a "body" start tag token
    /// with no attributes. Switch the insertion mode to "in body". Reprocess
    /// the current token."
    fn after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element_named("body");
        self.reprocess_in(InsertionMode::InBody, token);
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token: Insert the token's character."
            Token::Text { data } => self.insert_text(data),

            // "An end-of-file token: Parse error. If the current node is a
            //  script element, then set its already started to true. Pop the
            //  current node off the stack of open elements. Switch the
            //  insertion mode to the original insertion mode and reprocess
            //  the token."
            Token::EndOfFile => {
                self.parse_error("expected-named-closing-tag-but-got-eof");
                self.pop_current_node();
                self.reprocess_in(self.original_insertion_mode, token);
            }

            // "An end tag whose tag name is "script""
            Token::EndTag { name, .. } if name == "script" => {
                // "Let script be the current node (which will be a script
                //  element). Pop the current node off the stack of open
                //  elements. Switch the insertion mode to the original
                //  insertion mode."
                let script = self.current_node();
                self.pop_current_node();
                self.insertion_mode = self.original_insertion_mode;
                // Scripts created by the fragment parsing algorithm are
                // marked "already started" and never run.
                if !self.is_fragment() {
                    self.pending_script = script;
                }
            }

            // "Any other end tag: Pop the current node off the stack of open
            //  elements. Switch the insertion mode to the original insertion
            //  mode."
            _ => {
                self.pop_current_node();
                self.insertion_mode = self.original_insertion_mode;
            }
        }
    }

    // =========================================================================
    // Select
    // =========================================================================

    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A character token that is U+0000 NULL: Parse error. Ignore the
            //  token." / "Any other character token: Insert the token's
            //  character."
            (Token::Text { data }, _) => {
                if data.contains('\0') {
                    self.parse_error("unexpected-null-character");
                    self.insert_text(&data.replace('\0', ""));
                } else {
                    self.insert_text(data);
                }
            }
            (Token::Comment { data }, _) => self.insert_comment(data),
            (Token::Doctype { .. }, _) => self.unexpected_token(token),
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "option": If the current node is
            //  an option element, pop that node from the stack of open
            //  elements. Insert an HTML element for the token."
            (Token::StartTag { .. }, Some(HtmlTag::OptionElement)) => {
                self.pop_if_current(HtmlTag::OptionElement);
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "optgroup": If the current node
            //  is an option element, pop that node from the stack of open
            //  elements. If the current node is an optgroup element, pop that
            //  node from the stack of open elements. Insert an HTML element
            //  for the token."
            (Token::StartTag { .. }, Some(HtmlTag::Optgroup)) => {
                self.pop_if_current(HtmlTag::OptionElement);
                self.pop_if_current(HtmlTag::Optgroup);
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "hr""
            (Token::StartTag { .. }, Some(HtmlTag::Hr)) => {
                self.pop_if_current(HtmlTag::OptionElement);
                self.pop_if_current(HtmlTag::Optgroup);
                self.insert_void_element(token);
            }

            // "An end tag whose tag name is "optgroup""
            (Token::EndTag { .. }, Some(HtmlTag::Optgroup)) => {
                // "First, if the current node is an option element, and the
                //  node immediately before it in the stack of open elements is
                //  an optgroup element, then pop the current node from the
                //  stack of open elements."
                let len = self.open_elements.len();
                let before_is_optgroup = len >= 2
                    && self
                        .open_elements
                        .get(len - 2)
                        .is_some_and(|id| self.document.is_html_element(id, HtmlTag::Optgroup));
                if self.current_node_is(HtmlTag::OptionElement) && before_is_optgroup {
                    self.pop_current_node();
                }
                // "If the current node is an optgroup element, then pop that
                //  node from the stack of open elements. Otherwise, this is a
                //  parse error; ignore the token."
                if self.current_node_is(HtmlTag::Optgroup) {
                    self.pop_current_node();
                } else {
                    self.unexpected_token(token);
                }
            }

            // "An end tag whose tag name is "option""
            (Token::EndTag { .. }, Some(HtmlTag::OptionElement)) => {
                if self.current_node_is(HtmlTag::OptionElement) {
                    self.pop_current_node();
                } else {
                    self.unexpected_token(token);
                }
            }

            // "An end tag whose tag name is "select""
            (Token::EndTag { .. }, Some(HtmlTag::Select)) => {
                // "If the stack of open elements does not have a select
                //  element in select scope, this is a parse error; ignore the
                //  token. (fragment case) Otherwise: Pop elements from the
                //  stack of open elements until a select element has been
                //  popped from the stack. Reset the insertion mode
                //  appropriately."
                if !self.close_select() {
                    self.unexpected_token(token);
                }
            }

            // "A start tag whose tag name is "select": Parse error. If the
            //  stack of open elements does not have a select element in
            //  select scope, ignore the token. (fragment case) Otherwise: Pop
            //  elements from the stack of open elements until a select
            //  element has been popped from the stack. Reset the insertion
            //  mode appropriately."
            (Token::StartTag { .. }, Some(HtmlTag::Select)) => {
                self.unexpected_token(token);
                let _ = self.close_select();
            }

            // "A start tag whose tag name is one of: "input", "keygen",
            //  "textarea""
            (Token::StartTag { .. }, Some(HtmlTag::Input | HtmlTag::Keygen | HtmlTag::Textarea)) => {
                self.unexpected_token(token);
                if self.close_select() {
                    self.reprocess(token);
                }
            }

            // "A start tag whose tag name is one of: "script", "template"" /
            // "An end tag whose tag name is "template"": Process the token
            // using the rules for the "in head" insertion mode.
            (Token::StartTag { .. }, Some(HtmlTag::Script | HtmlTag::Template))
            | (Token::EndTag { .. }, Some(HtmlTag::Template)) => self.handle_in_head_mode(token),

            (Token::EndOfFile, _) => self.handle_in_body_mode(token),

            // "Anything else: Parse error. Ignore the token."
            _ => self.unexpected_token(token),
        }
    }

    fn pop_if_current(&mut self, tag: HtmlTag) {
        if self.current_node_is(tag) {
            self.pop_current_node();
        }
    }

    /// Pop through the select element and reset the insertion mode; `false`
    /// when there is no select element in select scope.
    fn close_select(&mut self) -> bool {
        if !self
            .open_elements
            .has_in_scope(&self.document, HtmlTag::Select, Scope::Select)
        {
            return false;
        }
        self.open_elements.pop_until(&self.document, HtmlTag::Select);
        self.reset_insertion_mode_appropriately();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        let table_element = matches!(
            tag,
            Some(
                HtmlTag::Caption
                    | HtmlTag::Table
                    | HtmlTag::Tbody
                    | HtmlTag::Tfoot
                    | HtmlTag::Thead
                    | HtmlTag::Tr
                    | HtmlTag::Td
                    | HtmlTag::Th
            )
        );
        match (token, tag) {
            // "A start tag whose tag name is one of: "caption", "table",
            //  "tbody", "tfoot", "thead", "tr", "td", "th": Parse error. Pop
            //  elements from the stack of open elements until a select
            //  element has been popped from the stack. Reset the insertion
            //  mode appropriately. Reprocess the token."
            (Token::StartTag { .. }, _) if table_element => {
                self.unexpected_token(token);
                self.open_elements.pop_until(&self.document, HtmlTag::Select);
                self.reset_insertion_mode_appropriately();
                self.reprocess(token);
            }

            // "An end tag whose tag name is one of: "caption", "table",
            //  "tbody", "tfoot", "thead", "tr", "td", "th""
            (Token::EndTag { .. }, Some(element)) if table_element => {
                self.unexpected_token(token);
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name
                //  as that of the token, then ignore the token."
                if !self
                    .open_elements
                    .has_in_scope(&self.document, element, Scope::Table)
                {
                    return;
                }
                self.open_elements.pop_until(&self.document, HtmlTag::Select);
                self.reset_insertion_mode_appropriately();
                self.reprocess(token);
            }

            _ => self.handle_in_select_mode(token),
        }
    }

    // =========================================================================
    // Template
    // =========================================================================

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(super) fn handle_in_template_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A character token", "A comment token", "A DOCTYPE token":
            // Process the token using the rules for the "in body" insertion
            // mode.
            (Token::Text { .. } | Token::Comment { .. } | Token::Doctype { .. }, _) => {
                self.handle_in_body_mode(token);
            }

            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Base
                    | HtmlTag::Basefont
                    | HtmlTag::Bgsound
                    | HtmlTag::Link
                    | HtmlTag::Meta
                    | HtmlTag::Noframes
                    | HtmlTag::Script
                    | HtmlTag::Style
                    | HtmlTag::Template
                    | HtmlTag::Title,
                ),
            )
            | (Token::EndTag { .. }, Some(HtmlTag::Template)) => self.handle_in_head_mode(token),

            // "A start tag whose tag name is one of: "caption", "colgroup",
            //  "tbody", "tfoot", "thead""
            (
                Token::StartTag { .. },
                Some(HtmlTag::Caption | HtmlTag::Colgroup | HtmlTag::Tbody | HtmlTag::Tfoot | HtmlTag::Thead),
            ) => self.switch_template_mode(InsertionMode::InTable, token),

            // "A start tag whose tag name is "col""
            (Token::StartTag { .. }, Some(HtmlTag::Col)) => {
                self.switch_template_mode(InsertionMode::InColumnGroup, token);
            }

            // "A start tag whose tag name is "tr""
            (Token::StartTag { .. }, Some(HtmlTag::Tr)) => {
                self.switch_template_mode(InsertionMode::InTableBody, token);
            }

            // "A start tag whose tag name is one of: "td", "th""
            (Token::StartTag { .. }, Some(HtmlTag::Td | HtmlTag::Th)) => {
                self.switch_template_mode(InsertionMode::InRow, token);
            }

            // "Any other start tag"
            (Token::StartTag { .. }, _) => self.switch_template_mode(InsertionMode::InBody, token),

            // "Any other end tag: Parse error. Ignore the token."
            (Token::EndTag { .. }, _) => self.unexpected_token(token),

            // "An end-of-file token"
            (Token::EndOfFile, _) => {
                // "If there is no template element on the stack of open
                //  elements, then stop parsing. (fragment case)"
                if !self.template_on_stack() {
                    self.stop_parsing();
                    return;
                }
                // "Otherwise, this is a parse error."
                self.parse_error("eof-in-template");
                self.close_template();
                self.reprocess(token);
            }
        }
    }

    /// "Pop the current template insertion mode off the stack of template
    /// insertion modes. Push `mode` onto the stack of template insertion
    /// modes so that it is the new current template insertion mode. Switch
    /// the insertion mode to `mode`, and reprocess the token."
    fn switch_template_mode(&mut self, mode: InsertionMode, token: &Token) {
        let _ = self.template_insertion_modes.pop();
        self.template_insertion_modes.push(mode);
        self.reprocess_in(mode, token);
    }

    // =========================================================================
    // After body and framesets
    // =========================================================================

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is ASCII whitespace: Process the token
            //  using the rules for the "in body" insertion mode."
            Token::Text { data } => {
                let (whitespace, rest) = split_leading_whitespace(data);
                if !whitespace.is_empty() {
                    self.handle_in_body_mode(&Token::Text {
                        data: whitespace.to_string(),
                    });
                }
                if !rest.is_empty() {
                    self.after_body_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            // "A comment token: Insert a comment as the last child of the
            //  first element in the stack of open elements (the html
            //  element)."
            Token::Comment { data } => {
                let target = self
                    .open_elements
                    .first()
                    .unwrap_or_else(|| self.document.root());
                self.append_comment_to(target, data);
            }

            Token::Doctype { .. } => self.unexpected_token(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html": If the parser was created
            //  as part of the HTML fragment parsing algorithm, this is a parse
            //  error; ignore the token. (fragment case) Otherwise, switch the
            //  insertion mode to "after after body"."
            Token::EndTag { name, .. } if name == "html" => {
                if self.is_fragment() {
                    self.unexpected_token(token);
                } else {
                    self.insertion_mode = InsertionMode::AfterAfterBody;
                }
            }

            // "An end-of-file token: Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            _ => self.after_body_anything_else(token),
        }
    }

    /// "Anything else: Parse error. Switch the insertion mode to "in body"
    /// and reprocess the token."
    fn after_body_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.reprocess_in(InsertionMode::InBody, token);
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            (Token::Text { data }, _) => self.insert_frameset_whitespace(data),
            (Token::Comment { data }, _) => self.insert_comment(data),
            (Token::Doctype { .. }, _) => self.unexpected_token(token),
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "frameset": Insert an HTML
            //  element for the token."
            (Token::StartTag { .. }, Some(HtmlTag::Frameset)) => {
                let _ = self.insert_html_element(token);
            }

            // "An end tag whose tag name is "frameset""
            (Token::EndTag { .. }, Some(HtmlTag::Frameset)) => {
                // "If the current node is the root html element, then this is
                //  a parse error; ignore the token. (fragment case)"
                if self.open_elements.len() <= 1 {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, pop the current node from the stack of open
                //  elements. If the parser was not created as part of the HTML
                //  fragment parsing algorithm (fragment case), and the current
                //  node is no longer a frameset element, then switch the
                //  insertion mode to "after frameset"."
                self.pop_current_node();
                if !self.is_fragment() && !self.current_node_is(HtmlTag::Frameset) {
                    self.insertion_mode = InsertionMode::AfterFrameset;
                }
            }

            // "A start tag whose tag name is "frame": Insert an HTML element
            //  for the token. Immediately pop the current node off the stack of
            //  open elements. Acknowledge the token's self-closing flag, if it
            //  is set."
            (Token::StartTag { .. }, Some(HtmlTag::Frame)) => self.insert_void_element(token),

            (Token::StartTag { .. }, Some(HtmlTag::Noframes)) => self.handle_in_head_mode(token),

            // "An end-of-file token: If the current node is not the root html
            //  element, then this is a parse error. Note: The current node can
            //  only be the root html element in the fragment case. Stop
            //  parsing."
            (Token::EndOfFile, _) => {
                if self.open_elements.len() > 1 {
                    self.parse_error("eof-in-frameset");
                }
                self.stop_parsing();
            }

            _ => self.unexpected_token(token),
        }
    }

    /// Framesets keep whitespace characters only: "Any other character
    /// token: Parse error. Ignore the token."
    fn insert_frameset_whitespace(&mut self, data: &str) {
        let whitespace: String = data.chars().filter(|&c| is_whitespace(c)).collect();
        if whitespace.len() != data.len() {
            self.parse_error("unexpected-char-in-frameset");
        }
        self.insert_text(&whitespace);
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            (Token::Text { data }, _) => self.insert_frameset_whitespace(data),
            (Token::Comment { data }, _) => self.insert_comment(data),
            (Token::Doctype { .. }, _) => self.unexpected_token(token),
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html": Switch the insertion mode
            //  to "after after frameset"."
            (Token::EndTag { .. }, Some(HtmlTag::Html)) => {
                self.insertion_mode = InsertionMode::AfterAfterFrameset;
            }

            (Token::StartTag { .. }, Some(HtmlTag::Noframes)) => self.handle_in_head_mode(token),
            (Token::EndOfFile, _) => self.stop_parsing(),
            _ => self.unexpected_token(token),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => {
                let root = self.document.root();
                self.append_comment_to(root, data);
            }

            // "A DOCTYPE token", "A character token that is ASCII whitespace",
            // "A start tag whose tag name is "html"": Process the token using
            // the rules for the "in body" insertion mode.
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::Text { data } => {
                let (whitespace, rest) = split_leading_whitespace(data);
                if !whitespace.is_empty() {
                    self.handle_in_body_mode(&Token::Text {
                        data: whitespace.to_string(),
                    });
                }
                if !rest.is_empty() {
                    self.after_body_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }

            Token::EndOfFile => self.stop_parsing(),

            // "Anything else: Parse error. Switch the insertion mode to "in
            //  body" and reprocess the token."
            _ => self.after_body_anything_else(token),
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { data } => {
                let root = self.document.root();
                self.append_comment_to(root, data);
            }
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::Text { data } => {
                let (whitespace, rest) = split_leading_whitespace(data);
                if !whitespace.is_empty() {
                    self.handle_in_body_mode(&Token::Text {
                        data: whitespace.to_string(),
                    });
                }
                if !rest.is_empty() {
                    self.unexpected_token(token);
                }
            }
            Token::EndOfFile => self.stop_parsing(),
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),
            _ => self.unexpected_token(token),
        }
    }
}
