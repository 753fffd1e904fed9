//! Table insertion modes.
//!
//! [§ 13.2.6.4.9 - 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)

use thicket_dom::HtmlTag;

use super::core::{InsertionMode, TreeBuilder, is_all_whitespace, split_leading_whitespace};
use super::in_body::is_hidden_input;
use super::stack::Scope;
use crate::tokenizer::Token;

/// "clear the stack back to a table context": "while the current node is
/// not a table, template, or html element, pop elements from the stack of
/// open elements."
const TABLE_CONTEXT: &[HtmlTag] = &[HtmlTag::Table, HtmlTag::Template, HtmlTag::Html];

/// "clear the stack back to a table body context"
const TABLE_BODY_CONTEXT: &[HtmlTag] = &[
    HtmlTag::Tbody,
    HtmlTag::Tfoot,
    HtmlTag::Thead,
    HtmlTag::Template,
    HtmlTag::Html,
];

/// "clear the stack back to a table row context"
const TABLE_ROW_CONTEXT: &[HtmlTag] = &[HtmlTag::Tr, HtmlTag::Template, HtmlTag::Html];

const TABLE_SECTIONS: &[HtmlTag] = &[HtmlTag::Tbody, HtmlTag::Thead, HtmlTag::Tfoot];

const CELLS: &[HtmlTag] = &[HtmlTag::Td, HtmlTag::Th];

impl TreeBuilder {
    fn clear_stack_back_to(&mut self, context: &[HtmlTag]) {
        self.open_elements.clear_back_to(&self.document, context);
    }

    fn in_table_scope(&self, tag: HtmlTag) -> bool {
        self.open_elements
            .has_in_scope(&self.document, tag, Scope::Table)
    }

    /// "Anything else" in table: process using the "in body" rules with
    /// foster parenting enabled.
    fn process_with_foster_parenting(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.foster_parenting = true;
        self.handle_in_body_mode(token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A character token, if the current node is table, tbody,
            //  template, tfoot, thead, or tr element"
            // "Let the pending table character tokens be an empty list of
            //  tokens. Let the original insertion mode be the current
            //  insertion mode. Switch the insertion mode to "in table text"
            //  and reprocess the token."
            (Token::Text { .. }, _)
                if self.current_node_is_any(&[
                    HtmlTag::Table,
                    HtmlTag::Tbody,
                    HtmlTag::Template,
                    HtmlTag::Tfoot,
                    HtmlTag::Thead,
                    HtmlTag::Tr,
                ]) =>
            {
                self.pending_table_text.clear();
                self.original_insertion_mode = self.insertion_mode;
                self.reprocess_in(InsertionMode::InTableText, token);
            }

            // "A comment token: Insert a comment."
            (Token::Comment { data }, _) => self.insert_comment(data),

            // "A DOCTYPE token: Parse error. Ignore the token."
            (Token::Doctype { .. }, _) => self.unexpected_token(token),

            // "A start tag whose tag name is "caption""
            (Token::StartTag { .. }, Some(HtmlTag::Caption)) => {
                // "Clear the stack back to a table context. Insert a marker at
                //  the end of the list of active formatting elements. Insert an
                //  HTML element for the token, then switch the insertion mode
                //  to "in caption"."
                self.clear_stack_back_to(TABLE_CONTEXT);
                self.active_formatting_elements.push_marker();
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InCaption;
            }

            // "A start tag whose tag name is "colgroup""
            (Token::StartTag { .. }, Some(HtmlTag::Colgroup)) => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InColumnGroup;
            }

            // "A start tag whose tag name is "col""
            // "Clear the stack back to a table context. Insert an HTML element
            //  for a "colgroup" start tag token with no attributes, then
            //  switch the insertion mode to "in column group". Reprocess the
            //  current token."
            (Token::StartTag { .. }, Some(HtmlTag::Col)) => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element_named("colgroup");
                self.reprocess_in(InsertionMode::InColumnGroup, token);
            }

            // "A start tag whose tag name is one of: "tbody", "tfoot", "thead""
            (Token::StartTag { .. }, Some(HtmlTag::Tbody | HtmlTag::Tfoot | HtmlTag::Thead)) => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InTableBody;
            }

            // "A start tag whose tag name is one of: "td", "th", "tr""
            (Token::StartTag { .. }, Some(HtmlTag::Td | HtmlTag::Th | HtmlTag::Tr)) => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element_named("tbody");
                self.reprocess_in(InsertionMode::InTableBody, token);
            }

            // "A start tag whose tag name is "table""
            (Token::StartTag { .. }, Some(HtmlTag::Table)) => {
                self.unexpected_token(token);
                // "If the stack of open elements does not have a table element
                //  in table scope, ignore the token. Otherwise: Pop elements
                //  from this stack until a table element has been popped from
                //  the stack. Reset the insertion mode appropriately.
                //  Reprocess the token."
                if self.in_table_scope(HtmlTag::Table) {
                    self.open_elements.pop_until(&self.document, HtmlTag::Table);
                    self.reset_insertion_mode_appropriately();
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is "table""
            (Token::EndTag { .. }, Some(HtmlTag::Table)) => {
                if !self.in_table_scope(HtmlTag::Table) {
                    self.unexpected_token(token);
                    return;
                }
                self.open_elements.pop_until(&self.document, HtmlTag::Table);
                self.reset_insertion_mode_appropriately();
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            (
                Token::EndTag { .. },
                Some(
                    HtmlTag::Body
                    | HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Html
                    | HtmlTag::Tbody
                    | HtmlTag::Td
                    | HtmlTag::Tfoot
                    | HtmlTag::Th
                    | HtmlTag::Thead
                    | HtmlTag::Tr,
                ),
            ) => self.unexpected_token(token),

            // "A start tag whose tag name is one of: "style", "script",
            //  "template""
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            //  mode."
            (Token::StartTag { .. }, Some(HtmlTag::Style | HtmlTag::Script | HtmlTag::Template))
            | (Token::EndTag { .. }, Some(HtmlTag::Template)) => {
                self.process_using(InsertionMode::InHead, token);
            }

            // "A start tag whose tag name is "input""
            // "If the token does not have an attribute with the name "type",
            //  or if it does, but that attribute's value is not an ASCII
            //  case-insensitive match for the string "hidden", then: act as
            //  described in the "anything else" entry below."
            // "Otherwise: Parse error. Insert an HTML element for the token.
            //  Pop that input element off the stack of open elements.
            //  Acknowledge the token's self-closing flag, if it is set."
            (Token::StartTag { .. }, Some(HtmlTag::Input)) if is_hidden_input(token) => {
                self.unexpected_token(token);
                self.insert_void_element(token);
            }

            // "A start tag whose tag name is "form""
            (Token::StartTag { .. }, Some(HtmlTag::Form)) => {
                self.unexpected_token(token);
                // "If there is a template element on the stack of open
                //  elements, or if the form element pointer is not null,
                //  ignore the token. Otherwise: Insert an HTML element for the
                //  token, and set the form element pointer to point to the
                //  element created. Pop that form element off the stack of
                //  open elements."
                if self.template_on_stack() || self.form_element_pointer.is_some() {
                    return;
                }
                let form = self.insert_html_element(token);
                self.form_element_pointer = Some(form);
                self.pop_current_node();
            }

            // "An end-of-file token: Process the token using the rules for the
            //  "in body" insertion mode."
            (Token::EndOfFile, _) => self.handle_in_body_mode(token),

            // "Anything else: Parse error. Enable foster parenting, process the
            //  token using the rules for the "in body" insertion mode, and then
            //  disable foster parenting."
            _ => self.process_with_foster_parenting(token),
        }
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) {
        if let Token::Text { data } = token {
            // "A character token that is U+0000 NULL: Parse error. Ignore the
            //  token."
            // "Any other character token: Append the character token to the
            //  pending table character tokens list."
            if data.contains('\0') {
                self.parse_error("unexpected-null-character");
            }
            self.pending_table_text
                .extend(data.chars().filter(|&c| c != '\0'));
            return;
        }

        // "Anything else"
        let pending = std::mem::take(&mut self.pending_table_text);
        if is_all_whitespace(&pending) {
            // "Otherwise, insert the characters given by the pending table
            //  character tokens list."
            self.insert_text(&pending);
        } else {
            // "If any of the tokens in the pending table character tokens list
            //  are character tokens that are not ASCII whitespace, then this
            //  is a parse error: reprocess the character tokens in the pending
            //  table character tokens list using the rules given in the
            //  "anything else" entry in the "in table" insertion mode."
            self.parse_error("foster-parenting-character");
            self.foster_parenting = true;
            self.insert_body_text(&pending);
            self.foster_parenting = false;
        }

        // "Switch the insertion mode to the original insertion mode and
        //  reprocess the token."
        self.reprocess_in(self.original_insertion_mode, token);
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "An end tag whose tag name is "caption""
            (Token::EndTag { .. }, Some(HtmlTag::Caption)) => {
                let _ = self.close_caption(token);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Tbody
                    | HtmlTag::Td
                    | HtmlTag::Tfoot
                    | HtmlTag::Th
                    | HtmlTag::Thead
                    | HtmlTag::Tr,
                ),
            )
            | (Token::EndTag { .. }, Some(HtmlTag::Table)) => {
                // "If the stack of open elements does not have a caption
                //  element in table scope, this is a parse error; ignore the
                //  token. (fragment case) Otherwise: ... Reprocess the token."
                if self.close_caption(token) {
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "col", "colgroup",
            //  "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            (
                Token::EndTag { .. },
                Some(
                    HtmlTag::Body
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Html
                    | HtmlTag::Tbody
                    | HtmlTag::Td
                    | HtmlTag::Tfoot
                    | HtmlTag::Th
                    | HtmlTag::Thead
                    | HtmlTag::Tr,
                ),
            ) => self.unexpected_token(token),

            // "Anything else: Process the token using the rules for the "in
            //  body" insertion mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    /// Close the caption and switch to "in table". Returns `false` when there
    /// was no caption in table scope.
    fn close_caption(&mut self, token: &Token) -> bool {
        if !self.in_table_scope(HtmlTag::Caption) {
            self.unexpected_token(token);
            return false;
        }
        // "Generate implied end tags. Now, if the current node is not a
        //  caption element, then this is a parse error. Pop elements from
        //  this stack until a caption element has been popped from the
        //  stack. Clear the list of active formatting elements up to the last
        //  marker. Switch the insertion mode to "in table"."
        self.close_element(HtmlTag::Caption);
        self.active_formatting_elements.clear_to_last_marker();
        self.insertion_mode = InsertionMode::InTable;
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Insert the character."
            (Token::Text { data }, _) => {
                let (whitespace, rest) = split_leading_whitespace(data);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.column_group_anything_else(&Token::Text {
                        data: rest.to_string(),
                    });
                }
            }
            (Token::Comment { data }, _) => self.insert_comment(data),
            (Token::Doctype { .. }, _) => self.unexpected_token(token),

            // "A start tag whose tag name is "html": Process the token using
            //  the rules for the "in body" insertion mode."
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => self.handle_in_body_mode(token),

            // "A start tag whose tag name is "col": Insert an HTML element for
            //  the token. Immediately pop the current node off the stack of
            //  open elements. Acknowledge the token's self-closing flag, if it
            //  is set."
            (Token::StartTag { .. }, Some(HtmlTag::Col)) => self.insert_void_element(token),

            // "An end tag whose tag name is "colgroup""
            (Token::EndTag { .. }, Some(HtmlTag::Colgroup)) => {
                // "If the current node is not a colgroup element, then this is
                //  a parse error; ignore the token. Otherwise, pop the current
                //  node from the stack of open elements. Switch the insertion
                //  mode to "in table"."
                if !self.current_node_is(HtmlTag::Colgroup) {
                    self.unexpected_token(token);
                    return;
                }
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InTable;
            }

            // "An end tag whose tag name is "col": Parse error. Ignore the
            //  token."
            (Token::EndTag { .. }, Some(HtmlTag::Col)) => self.unexpected_token(token),

            (Token::StartTag { .. } | Token::EndTag { .. }, Some(HtmlTag::Template)) => {
                self.process_using(InsertionMode::InHead, token);
            }

            (Token::EndOfFile, _) => self.handle_in_body_mode(token),

            _ => self.column_group_anything_else(token),
        }
    }

    /// "Anything else: If the current node is not a colgroup element, then
    /// this is a parse error; ignore the token. Otherwise, pop the current
    /// node from the stack of open elements. Switch the insertion mode to
    /// "in table". Reprocess the token."
    fn column_group_anything_else(&mut self, token: &Token) {
        if !self.current_node_is(HtmlTag::Colgroup) {
            self.unexpected_token(token);
            return;
        }
        self.pop_current_node();
        self.reprocess_in(InsertionMode::InTable, token);
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A start tag whose tag name is "tr""
            (Token::StartTag { .. }, Some(HtmlTag::Tr)) => {
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InRow;
            }

            // "A start tag whose tag name is one of: "th", "td""
            (Token::StartTag { .. }, Some(HtmlTag::Th | HtmlTag::Td)) => {
                // "Parse error. Clear the stack back to a table body context.
                //  Insert an HTML element for a "tr" start tag token with no
                //  attributes, then switch the insertion mode to "in row".
                //  Reprocess the current token."
                self.unexpected_token(token);
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.insert_html_element_named("tr");
                self.reprocess_in(InsertionMode::InRow, token);
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            (Token::EndTag { .. }, Some(section @ (HtmlTag::Tbody | HtmlTag::Tfoot | HtmlTag::Thead))) => {
                if !self.in_table_scope(section) {
                    self.unexpected_token(token);
                    return;
                }
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InTable;
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "tfoot", "thead""
            // "An end tag whose tag name is "table""
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Tbody
                    | HtmlTag::Tfoot
                    | HtmlTag::Thead,
                ),
            )
            | (Token::EndTag { .. }, Some(HtmlTag::Table)) => {
                // "If the stack of open elements does not have a tbody, thead,
                //  or tfoot element in table scope, this is a parse error;
                //  ignore the token."
                if !self
                    .open_elements
                    .has_any_in_scope(&self.document, TABLE_SECTIONS, Scope::Table)
                {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise: Clear the stack back to a table body context. Pop
                //  the current node from the stack of open elements. Switch
                //  the insertion mode to "in table". Reprocess the token."
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                self.pop_current_node();
                self.reprocess_in(InsertionMode::InTable, token);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html", "td", "th", "tr""
            (
                Token::EndTag { .. },
                Some(
                    HtmlTag::Body
                    | HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Html
                    | HtmlTag::Td
                    | HtmlTag::Th
                    | HtmlTag::Tr,
                ),
            ) => self.unexpected_token(token),

            // "Anything else: Process the token using the rules for the "in
            //  table" insertion mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A start tag whose tag name is one of: "th", "td""
            (Token::StartTag { .. }, Some(HtmlTag::Th | HtmlTag::Td)) => {
                // "Clear the stack back to a table row context. Insert an HTML
                //  element for the token, then switch the insertion mode to "in
                //  cell". Insert a marker at the end of the list of active
                //  formatting elements."
                self.clear_stack_back_to(TABLE_ROW_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InCell;
                self.active_formatting_elements.push_marker();
            }

            // "An end tag whose tag name is "tr""
            (Token::EndTag { .. }, Some(HtmlTag::Tr)) => {
                let _ = self.close_row(token);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "tfoot", "thead", "tr""
            // "An end tag whose tag name is "table""
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Tbody
                    | HtmlTag::Tfoot
                    | HtmlTag::Thead
                    | HtmlTag::Tr,
                ),
            )
            | (Token::EndTag { .. }, Some(HtmlTag::Table)) => {
                if self.close_row(token) {
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            (Token::EndTag { .. }, Some(section @ (HtmlTag::Tbody | HtmlTag::Tfoot | HtmlTag::Thead))) => {
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name
                //  as the token, this is a parse error; ignore the token."
                if !self.in_table_scope(section) {
                    self.unexpected_token(token);
                    return;
                }
                // "If the stack of open elements does not have a tr element in
                //  table scope, ignore the token."
                if !self.in_table_scope(HtmlTag::Tr) {
                    return;
                }
                if self.close_row(token) {
                    self.reprocess(token);
                }
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html", "td", "th""
            (
                Token::EndTag { .. },
                Some(
                    HtmlTag::Body
                    | HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Html
                    | HtmlTag::Td
                    | HtmlTag::Th,
                ),
            ) => self.unexpected_token(token),

            // "Anything else: Process the token using the rules for the "in
            //  table" insertion mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    /// Close the current row and switch to "in table body". Returns `false`
    /// when there was no tr element in table scope.
    fn close_row(&mut self, token: &Token) -> bool {
        if !self.in_table_scope(HtmlTag::Tr) {
            self.unexpected_token(token);
            return false;
        }
        // "Clear the stack back to a table row context. Pop the current node
        //  (which will be a tr element) from the stack of open elements.
        //  Switch the insertion mode to "in table body"."
        self.clear_stack_back_to(TABLE_ROW_CONTEXT);
        self.pop_current_node();
        self.insertion_mode = InsertionMode::InTableBody;
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "An end tag whose tag name is one of: "td", "th""
            (Token::EndTag { .. }, Some(cell @ (HtmlTag::Td | HtmlTag::Th))) => {
                if !self.in_table_scope(cell) {
                    self.unexpected_token(token);
                    return;
                }
                // "Generate implied end tags. Now, if the current node is not
                //  an HTML element with the same tag name as the token, then
                //  this is a parse error. Pop elements from the stack of open
                //  elements until an HTML element with the same tag name as the
                //  token has been popped from the stack. Clear the list of
                //  active formatting elements up to the last marker. Switch the
                //  insertion mode to "in row"."
                self.close_element(cell);
                self.active_formatting_elements.clear_to_last_marker();
                self.insertion_mode = InsertionMode::InRow;
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Tbody
                    | HtmlTag::Td
                    | HtmlTag::Tfoot
                    | HtmlTag::Th
                    | HtmlTag::Thead
                    | HtmlTag::Tr,
                ),
            ) => {
                // "Assert: The stack of open elements has a td or th element in
                //  table scope. Otherwise: Close the cell and reprocess the
                //  token."
                if !self
                    .open_elements
                    .has_any_in_scope(&self.document, CELLS, Scope::Table)
                {
                    self.unexpected_token(token);
                    return;
                }
                self.close_the_cell();
                self.reprocess(token);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html""
            (
                Token::EndTag { .. },
                Some(HtmlTag::Body | HtmlTag::Caption | HtmlTag::Col | HtmlTag::Colgroup | HtmlTag::Html),
            ) => self.unexpected_token(token),

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            //  "thead", "tr""
            (
                Token::EndTag { .. },
                Some(
                    element @ (HtmlTag::Table
                    | HtmlTag::Tbody
                    | HtmlTag::Tfoot
                    | HtmlTag::Thead
                    | HtmlTag::Tr),
                ),
            ) => {
                if !self.in_table_scope(element) {
                    self.unexpected_token(token);
                    return;
                }
                self.close_the_cell();
                self.reprocess(token);
            }

            // "Anything else: Process the token using the rules for the "in
            //  body" insertion mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Generate implied end tags. If the current node is not now a td
    /// element or a th element, then this is a parse error. Pop elements
    /// from the stack of open elements until a td element or a th element has
    /// been popped from the stack. Clear the list of active formatting
    /// elements up to the last marker. Switch the insertion mode to "in
    /// row"."
    fn close_the_cell(&mut self) {
        self.generate_implied_end_tags(None);
        if !self.current_node_is_any(CELLS) {
            self.parse_error("end-tag-with-open-elements </td>");
        }
        self.open_elements.pop_until_any(&self.document, CELLS);
        self.active_formatting_elements.clear_to_last_marker();
        self.insertion_mode = InsertionMode::InRow;
    }
}
