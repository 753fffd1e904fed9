//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use std::borrow::Cow;

use thicket_dom::{HtmlTag, Namespace, NodeId, QuirksMode};

use super::adoption::is_special;
use super::core::{InsertionMode, TreeBuilder, attributes_of, is_all_whitespace};
use super::stack::Scope;
use crate::tokenizer::{Token, TokenizerState};

const HEADINGS: &[HtmlTag] = &[
    HtmlTag::H1,
    HtmlTag::H2,
    HtmlTag::H3,
    HtmlTag::H4,
    HtmlTag::H5,
    HtmlTag::H6,
];

/// Elements that may still be open when the body ends without a parse
/// error.
const CLOSABLE_AT_BODY_END: &[HtmlTag] = &[
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
    HtmlTag::Body,
    HtmlTag::Html,
];

impl TreeBuilder {
    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        let tag = token.tag_name().and_then(HtmlTag::from_local_name);
        match (token, tag) {
            // "A character token that is U+0000 NULL: Parse error. Ignore the
            //  token."
            // "Any other character token: Reconstruct the active formatting
            //  elements, if any. Insert the token's character. Set the
            //  frameset-ok flag to "not ok"."
            (Token::Text { data }, _) => self.insert_body_text(data),

            // "A comment token: Insert a comment."
            (Token::Comment { data }, _) => self.insert_comment(data),

            // "A DOCTYPE token: Parse error. Ignore the token."
            (Token::Doctype { .. }, _) => self.unexpected_token(token),

            // "A start tag whose tag name is "html""
            (Token::StartTag { .. }, Some(HtmlTag::Html)) => {
                self.unexpected_token(token);
                // "If there is a template element on the stack of open
                //  elements, then ignore the token. Otherwise, for each
                //  attribute on the token, check to see if the attribute is
                //  already present on the top element of the stack of open
                //  elements. If it is not, add the attribute and its
                //  corresponding value to that element."
                if !self.template_on_stack()
                    && let Some(html) = self.open_elements.first()
                {
                    self.merge_attributes(html, token);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title""
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            //  mode."
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
            | (Token::EndTag { .. }, Some(HtmlTag::Template)) => {
                self.process_using(InsertionMode::InHead, token);
            }

            // "A start tag whose tag name is "body""
            (Token::StartTag { .. }, Some(HtmlTag::Body)) => {
                self.unexpected_token(token);
                // "If the stack of open elements has only one node on it, if
                //  the second element on the stack of open elements is not a
                //  body element, or if there is a template element on the
                //  stack of open elements, then ignore the token. (fragment
                //  case or there is a template element on the stack)"
                // "Otherwise, set the frameset-ok flag to "not ok"; then, for
                //  each attribute on the token, check to see if the attribute
                //  is already present on the body element (the second element)
                //  on the stack of open elements, and if it is not, add the
                //  attribute and its corresponding value to that element."
                if let Some(body) = self.second_element_if_body()
                    && !self.template_on_stack()
                {
                    self.frameset_ok = false;
                    self.merge_attributes(body, token);
                }
            }

            // "A start tag whose tag name is "frameset""
            (Token::StartTag { .. }, Some(HtmlTag::Frameset)) => {
                self.unexpected_token(token);
                // "If the stack of open elements has only one node on it, or
                //  if the second element on the stack of open elements is not
                //  a body element, then ignore the token. (fragment case or
                //  there is a template element on the stack)"
                // "If the frameset-ok flag is set to "not ok", ignore the
                //  token."
                let Some(body) = self.second_element_if_body() else {
                    return;
                };
                if !self.frameset_ok {
                    return;
                }
                // "Otherwise, run the following steps:
                //  1. Remove the second element on the stack of open elements
                //     from its parent node, if it has one.
                //  2. Pop all the nodes from the bottom of the stack of open
                //     elements, from the current node up to, but not including,
                //     the root html element.
                //  3. Insert an HTML element for the token.
                //  4. Switch the insertion mode to "in frameset"."
                self.document.remove(body);
                self.open_elements.truncate(1);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InFrameset;
            }

            // "An end-of-file token"
            (Token::EndOfFile, _) => {
                // "If the stack of template insertion modes is not empty, then
                //  process the token using the rules for the "in template"
                //  insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    self.process_using(InsertionMode::InTemplate, token);
                    return;
                }
                // "Otherwise, follow these steps: If there is a node in the
                //  stack of open elements that is not either a dd element, a
                //  dt element, ... the html element, then this is a parse
                //  error. Stop parsing."
                self.report_unclosed_elements("eof-in-body");
                self.stop_parsing();
            }

            // "An end tag whose tag name is "body""
            // "An end tag whose tag name is "html""
            (Token::EndTag { .. }, Some(HtmlTag::Body | HtmlTag::Html)) => {
                // "If the stack of open elements does not have a body element
                //  in scope, this is a parse error; ignore the token."
                if !self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::Body, Scope::Default)
                {
                    self.unexpected_token(token);
                    return;
                }
                // "Otherwise, if there is a node in the stack of open elements
                //  that is not either a dd element, ... then this is a parse
                //  error."
                self.report_unclosed_elements("end-body-with-open-elements");
                // "Switch the insertion mode to "after body"."
                self.insertion_mode = InsertionMode::AfterBody;
                // "html": "Reprocess the token."
                if tag == Some(HtmlTag::Html) {
                    self.reprocess_in(InsertionMode::AfterBody, token);
                }
            }

            // "A start tag whose tag name is one of: "address", "article",
            //  "aside", "blockquote", "center", "details", "dialog", "dir",
            //  "div", "dl", "fieldset", "figcaption", "figure", "footer",
            //  "header", "hgroup", "main", "menu", "nav", "ol", "p", "search",
            //  "section", "summary", "ul""
            // "If the stack of open elements has a p element in button scope,
            //  then close a p element. Insert an HTML element for the token."
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Address
                    | HtmlTag::Article
                    | HtmlTag::Aside
                    | HtmlTag::Blockquote
                    | HtmlTag::Center
                    | HtmlTag::Details
                    | HtmlTag::Dialog
                    | HtmlTag::Dir
                    | HtmlTag::Div
                    | HtmlTag::Dl
                    | HtmlTag::Fieldset
                    | HtmlTag::Figcaption
                    | HtmlTag::Figure
                    | HtmlTag::Footer
                    | HtmlTag::Header
                    | HtmlTag::Hgroup
                    | HtmlTag::Main
                    | HtmlTag::Menu
                    | HtmlTag::Nav
                    | HtmlTag::Ol
                    | HtmlTag::P
                    | HtmlTag::Search
                    | HtmlTag::Section
                    | HtmlTag::Summary
                    | HtmlTag::Ul,
                ),
            ) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            //  "h5", "h6""
            (
                Token::StartTag { .. },
                Some(HtmlTag::H1 | HtmlTag::H2 | HtmlTag::H3 | HtmlTag::H4 | HtmlTag::H5 | HtmlTag::H6),
            ) => {
                self.close_p_element_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                //  of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a
                //  parse error; pop the current node off the stack of open
                //  elements."
                if self.current_node_is_any(HEADINGS) {
                    self.unexpected_token(token);
                    self.pop_current_node();
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            (Token::StartTag { .. }, Some(HtmlTag::Pre | HtmlTag::Listing)) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
                // "If the next token is a U+000A LINE FEED (LF) character
                //  token, then ignore that token and move on to the next one.
                //  (Newlines at the start of pre blocks are ignored as an
                //  authoring convenience.)"
                self.ignore_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            (Token::StartTag { .. }, Some(HtmlTag::Form)) => {
                // "If the form element pointer is not null, and there is no
                //  template element on the stack of open elements, then this
                //  is a parse error; ignore the token."
                let in_template = self.template_on_stack();
                if self.form_element_pointer.is_some() && !in_template {
                    self.unexpected_token(token);
                    return;
                }
                self.close_p_element_in_button_scope();
                // "Insert an HTML element for the token, and, if there is no
                //  template element on the stack of open elements, set the form
                //  element pointer to point to the element created."
                let form = self.insert_html_element(token);
                if !in_template {
                    self.form_element_pointer = Some(form);
                }
            }

            // "A start tag whose tag name is "li""
            (Token::StartTag { .. }, Some(HtmlTag::Li)) => {
                self.frameset_ok = false;
                self.close_list_item(&[HtmlTag::Li]);
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "dd", "dt""
            (Token::StartTag { .. }, Some(HtmlTag::Dd | HtmlTag::Dt)) => {
                self.frameset_ok = false;
                self.close_list_item(&[HtmlTag::Dd, HtmlTag::Dt]);
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "plaintext""
            (Token::StartTag { .. }, Some(HtmlTag::Plaintext)) => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(token);
                // "Switch the tokenizer to the PLAINTEXT state."
                self.tokenizer_state_request = Some(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            (Token::StartTag { .. }, Some(HtmlTag::Button)) => {
                // "If the stack of open elements has a button element in
                //  scope, then run these substeps: Parse error. Generate
                //  implied end tags. Pop elements from the stack of open
                //  elements until a button element has been popped from the
                //  stack."
                if self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::Button, Scope::Default)
                {
                    self.unexpected_token(token);
                    self.generate_implied_end_tags(None);
                    self.open_elements.pop_until(&self.document, HtmlTag::Button);
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
            }

            // "An end tag whose tag name is one of: "address", "article",
            //  "aside", "blockquote", "button", "center", "details", "dialog",
            //  "dir", "div", "dl", "fieldset", "figcaption", "figure",
            //  "footer", "header", "hgroup", "listing", "main", "menu", "nav",
            //  "ol", "pre", "search", "section", "summary", "ul""
            (
                Token::EndTag { .. },
                Some(
                    block @ (HtmlTag::Address
                    | HtmlTag::Article
                    | HtmlTag::Aside
                    | HtmlTag::Blockquote
                    | HtmlTag::Button
                    | HtmlTag::Center
                    | HtmlTag::Details
                    | HtmlTag::Dialog
                    | HtmlTag::Dir
                    | HtmlTag::Div
                    | HtmlTag::Dl
                    | HtmlTag::Fieldset
                    | HtmlTag::Figcaption
                    | HtmlTag::Figure
                    | HtmlTag::Footer
                    | HtmlTag::Header
                    | HtmlTag::Hgroup
                    | HtmlTag::Listing
                    | HtmlTag::Main
                    | HtmlTag::Menu
                    | HtmlTag::Nav
                    | HtmlTag::Ol
                    | HtmlTag::Pre
                    | HtmlTag::Search
                    | HtmlTag::Section
                    | HtmlTag::Summary
                    | HtmlTag::Ul),
                ),
            ) => {
                // "If the stack of open elements does not have an element in
                //  scope that is an HTML element with the same tag name as
                //  that of the token, then this is a parse error; ignore the
                //  token."
                if !self
                    .open_elements
                    .has_in_scope(&self.document, block, Scope::Default)
                {
                    self.unexpected_token(token);
                    return;
                }
                self.close_element(block);
            }

            // "An end tag whose tag name is "form""
            (Token::EndTag { .. }, Some(HtmlTag::Form)) => self.end_form(token),

            // "An end tag whose tag name is "p""
            (Token::EndTag { .. }, Some(HtmlTag::P)) => {
                // "If the stack of open elements does not have a p element in
                //  button scope, then this is a parse error; insert an HTML
                //  element for a "p" start tag token with no attributes."
                if !self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::P, Scope::Button)
                {
                    self.unexpected_token(token);
                    let _ = self.insert_html_element_named("p");
                }
                // "Close a p element."
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            (Token::EndTag { .. }, Some(HtmlTag::Li)) => {
                // "If the stack of open elements does not have an li element in
                //  list item scope, then this is a parse error; ignore the
                //  token."
                if !self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::Li, Scope::ListItem)
                {
                    self.unexpected_token(token);
                    return;
                }
                self.close_element_except(HtmlTag::Li);
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            (Token::EndTag { .. }, Some(item @ (HtmlTag::Dd | HtmlTag::Dt))) => {
                if !self
                    .open_elements
                    .has_in_scope(&self.document, item, Scope::Default)
                {
                    self.unexpected_token(token);
                    return;
                }
                self.close_element_except(item);
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            //  "h5", "h6""
            (
                Token::EndTag { .. },
                Some(
                    heading @ (HtmlTag::H1
                    | HtmlTag::H2
                    | HtmlTag::H3
                    | HtmlTag::H4
                    | HtmlTag::H5
                    | HtmlTag::H6),
                ),
            ) => {
                // "If the stack of open elements does not have an element in
                //  scope that is an HTML element and whose tag name is one of
                //  "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                //  error; ignore the token."
                if !self
                    .open_elements
                    .has_any_in_scope(&self.document, HEADINGS, Scope::Default)
                {
                    self.unexpected_token(token);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(heading) {
                    self.parse_error(&format!("end-tag-with-open-elements </{heading}>"));
                }
                // "Pop elements from the stack of open elements until an HTML
                //  element whose tag name is one of "h1", "h2", "h3", "h4",
                //  "h5", or "h6" has been popped from the stack."
                self.open_elements.pop_until_any(&self.document, HEADINGS);
            }

            // "A start tag whose tag name is "a""
            (Token::StartTag { .. }, Some(HtmlTag::A)) => {
                // "If the list of active formatting elements contains an a
                //  element between the end of the list and the last marker on
                //  the list (or the start of the list if there is no marker on
                //  the list), then this is a parse error; run the adoption
                //  agency algorithm for the token, then remove that element
                //  from the list of active formatting elements and the stack
                //  of open elements if the adoption agency algorithm didn't
                //  already remove it (it might not have if the element is not
                //  in table scope)."
                if let Some((_, existing)) = self.active_formatting_elements.last_after_marker(HtmlTag::A) {
                    self.parse_error("unexpected-start-tag-implies-end-tag <a>");
                    let _ = self.run_adoption_agency(HtmlTag::A);
                    self.active_formatting_elements.remove(existing);
                    self.open_elements.remove(existing);
                }
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(token, HtmlTag::A);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            //  "font", "i", "s", "small", "strike", "strong", "tt", "u""
            (
                Token::StartTag { .. },
                Some(
                    formatting @ (HtmlTag::B
                    | HtmlTag::Big
                    | HtmlTag::Code
                    | HtmlTag::Em
                    | HtmlTag::Font
                    | HtmlTag::I
                    | HtmlTag::S
                    | HtmlTag::Small
                    | HtmlTag::Strike
                    | HtmlTag::Strong
                    | HtmlTag::Tt
                    | HtmlTag::U),
                ),
            ) => {
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(token, formatting);
            }

            // "A start tag whose tag name is "nobr""
            (Token::StartTag { .. }, Some(HtmlTag::Nobr)) => {
                self.reconstruct_active_formatting_elements();
                // "If the stack of open elements has a nobr element in scope,
                //  then this is a parse error; run the adoption agency
                //  algorithm for the token, then once again reconstruct the
                //  active formatting elements, if any."
                if self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::Nobr, Scope::Default)
                {
                    self.unexpected_token(token);
                    let _ = self.run_adoption_agency(HtmlTag::Nobr);
                    self.reconstruct_active_formatting_elements();
                }
                self.insert_formatting_element(token, HtmlTag::Nobr);
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            //  "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            //  "tt", "u""
            // "Run the adoption agency algorithm for the token."
            (
                Token::EndTag { name, .. },
                Some(
                    formatting @ (HtmlTag::A
                    | HtmlTag::B
                    | HtmlTag::Big
                    | HtmlTag::Code
                    | HtmlTag::Em
                    | HtmlTag::Font
                    | HtmlTag::I
                    | HtmlTag::Nobr
                    | HtmlTag::S
                    | HtmlTag::Small
                    | HtmlTag::Strike
                    | HtmlTag::Strong
                    | HtmlTag::Tt
                    | HtmlTag::U),
                ),
            ) => {
                if !self.run_adoption_agency(formatting) {
                    self.any_other_end_tag(name);
                }
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            //  "object""
            (Token::StartTag { .. }, Some(HtmlTag::Applet | HtmlTag::Marquee | HtmlTag::Object)) => {
                // "Reconstruct the active formatting elements, if any. Insert
                //  an HTML element for the token. Insert a marker at the end of
                //  the list of active formatting elements. Set the frameset-ok
                //  flag to "not ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.active_formatting_elements.push_marker();
                self.frameset_ok = false;
            }

            // "An end tag token whose tag name is one of: "applet", "marquee",
            //  "object""
            (
                Token::EndTag { .. },
                Some(element @ (HtmlTag::Applet | HtmlTag::Marquee | HtmlTag::Object)),
            ) => {
                if !self
                    .open_elements
                    .has_in_scope(&self.document, element, Scope::Default)
                {
                    self.unexpected_token(token);
                    return;
                }
                // "Generate implied end tags. If the current node is not an
                //  HTML element with the same tag name as that of the token,
                //  then this is a parse error. Pop elements from the stack of
                //  open elements until an HTML element with the same tag name
                //  as the token has been popped from the stack. Clear the list
                //  of active formatting elements up to the last marker."
                self.close_element(element);
                self.active_formatting_elements.clear_to_last_marker();
            }

            // "A start tag whose tag name is "table""
            (Token::StartTag { .. }, Some(HtmlTag::Table)) => {
                // "If the Document is not set to quirks mode, and the stack of
                //  open elements has a p element in button scope, then close a
                //  p element."
                if self.document.quirks_mode() != QuirksMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InTable;
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            //  described in the next entry; i.e. act as if this was a "br"
            //  start tag token with no attributes, rather than the end tag
            //  token that it actually is."
            (Token::EndTag { .. }, Some(HtmlTag::Br)) => {
                self.unexpected_token(token);
                self.handle_in_body_mode(&Token::StartTag {
                    name: "br".to_string(),
                    self_closing: false,
                    attributes: Vec::new(),
                });
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            //  "img", "keygen", "wbr""
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Area
                    | HtmlTag::Br
                    | HtmlTag::Embed
                    | HtmlTag::Img
                    | HtmlTag::Keygen
                    | HtmlTag::Wbr,
                ),
            ) => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(token);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "input""
            (Token::StartTag { .. }, Some(HtmlTag::Input)) => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(token);
                // "If the token does not have an attribute with the name
                //  "type", or if it does, but that attribute's value is not an
                //  ASCII case-insensitive match for the string "hidden", then:
                //  set the frameset-ok flag to "not ok"."
                if !is_hidden_input(token) {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source",
            //  "track""
            (Token::StartTag { .. }, Some(HtmlTag::Param | HtmlTag::Source | HtmlTag::Track)) => {
                self.insert_void_element(token);
            }

            // "A start tag whose tag name is "hr""
            (Token::StartTag { .. }, Some(HtmlTag::Hr)) => {
                self.close_p_element_in_button_scope();
                self.insert_void_element(token);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            //  it. (Don't ask.)"
            (
                Token::StartTag {
                    self_closing,
                    attributes,
                    ..
                },
                Some(HtmlTag::Image),
            ) => {
                self.unexpected_token(token);
                self.handle_in_body_mode(&Token::StartTag {
                    name: "img".to_string(),
                    self_closing: *self_closing,
                    attributes: attributes.clone(),
                });
            }

            // "A start tag whose tag name is "textarea""
            (Token::StartTag { .. }, Some(HtmlTag::Textarea)) => {
                // "1. Insert an HTML element for the token.
                //  2. If the next token is a U+000A LINE FEED (LF) character
                //     token, then ignore that token and move on to the next
                //     one.
                //  3. Switch the tokenizer to the RCDATA state.
                //  4. Set the original insertion mode to the current insertion
                //     mode.
                //  5. Set the frameset-ok flag to "not ok".
                //  6. Switch the insertion mode to "text"."
                self.parse_text_element(token, TokenizerState::RCDATA);
                self.ignore_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "xmp""
            (Token::StartTag { .. }, Some(HtmlTag::Xmp)) => {
                self.close_p_element_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_text_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "iframe""
            (Token::StartTag { .. }, Some(HtmlTag::Iframe)) => {
                self.frameset_ok = false;
                self.parse_text_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting flag
            //  is enabled"
            // "Follow the generic raw text element parsing algorithm."
            (Token::StartTag { .. }, Some(HtmlTag::Noembed)) => {
                self.parse_text_element(token, TokenizerState::RAWTEXT);
            }
            (Token::StartTag { .. }, Some(HtmlTag::Noscript)) if self.scripting_enabled => {
                self.parse_text_element(token, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "select""
            (Token::StartTag { .. }, Some(HtmlTag::Select)) => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption",
                //  "in table body", "in row", or "in cell", then switch the
                //  insertion mode to "in select in table". Otherwise, switch
                //  the insertion mode to "in select"."
                self.insertion_mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            (Token::StartTag { .. }, Some(HtmlTag::Optgroup | HtmlTag::OptionElement)) => {
                // "If the current node is an option element, then pop the
                //  current node off the stack of open elements."
                if self.current_node_is(HtmlTag::OptionElement) {
                    self.pop_current_node();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            (Token::StartTag { .. }, Some(HtmlTag::Rb | HtmlTag::Rtc)) => {
                // "If the stack of open elements has a ruby element in scope,
                //  then generate implied end tags. If the current node is not
                //  now a ruby element, this is a parse error."
                if self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::Ruby, Scope::Default)
                {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is(HtmlTag::Ruby) {
                        self.unexpected_token(token);
                    }
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            (Token::StartTag { .. }, Some(HtmlTag::Rp | HtmlTag::Rt)) => {
                // "If the stack of open elements has a ruby element in scope,
                //  then generate implied end tags, except for rtc elements. If
                //  the current node is not now a rtc element or a ruby element,
                //  this is a parse error."
                if self
                    .open_elements
                    .has_in_scope(&self.document, HtmlTag::Ruby, Scope::Default)
                {
                    self.generate_implied_end_tags(Some(HtmlTag::Rtc));
                    if !self.current_node_is_any(&[HtmlTag::Rtc, HtmlTag::Ruby]) {
                        self.unexpected_token(token);
                    }
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is "math""
            // "A start tag whose tag name is "svg""
            (
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                },
                None,
            ) if name == "math" || name == "svg" => {
                // "Reconstruct the active formatting elements, if any. Adjust
                //  MathML attributes for the token. Adjust foreign attributes
                //  for the token. Insert a foreign element for the token, with
                //  MathML namespace."
                self.reconstruct_active_formatting_elements();
                let namespace = if name == "math" {
                    Namespace::MathMl
                } else {
                    Namespace::Svg
                };
                let _ = self.insert_element(name, attributes, namespace);
                // "If the token has its self-closing flag set, pop the current
                //  node off the stack of open elements and acknowledge the
                //  token's self-closing flag."
                if *self_closing {
                    self.pop_current_node();
                    self.acknowledge_self_closing();
                }
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            //  "thead", "tr""
            // "Parse error. Ignore the token."
            (
                Token::StartTag { .. },
                Some(
                    HtmlTag::Caption
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Frame
                    | HtmlTag::Head
                    | HtmlTag::Tbody
                    | HtmlTag::Td
                    | HtmlTag::Tfoot
                    | HtmlTag::Th
                    | HtmlTag::Thead
                    | HtmlTag::Tr,
                ),
            ) => self.unexpected_token(token),

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any. Insert an
            //  HTML element for the token."
            (Token::StartTag { .. }, _) => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }

            // "Any other end tag"
            (Token::EndTag { name, .. }, _) => self.any_other_end_tag(name),
        }
    }

    /// Character handling for "in body", shared with foster-parented table
    /// text.
    pub(super) fn insert_body_text(&mut self, data: &str) {
        let data = if data.contains('\0') {
            self.parse_error("unexpected-null-character");
            Cow::Owned(data.replace('\0', ""))
        } else {
            Cow::Borrowed(data)
        };
        if data.is_empty() {
            return;
        }
        self.reconstruct_active_formatting_elements();
        self.insert_text(&data);
        if !is_all_whitespace(&data) {
            self.frameset_ok = false;
        }
    }

    /// The body element, when it is the second element on the stack.
    fn second_element_if_body(&self) -> Option<NodeId> {
        self.open_elements
            .get(1)
            .filter(|&body| self.document.is_html_element(body, HtmlTag::Body))
    }

    fn report_unclosed_elements(&mut self, message: &str) {
        let unclosed = self.open_elements.iter().any(|id| {
            self.html_tag_of(id)
                .is_none_or(|tag| !CLOSABLE_AT_BODY_END.contains(&tag))
        });
        if unclosed {
            self.parse_error(message);
        }
    }

    /// Insert an HTML element for the token and push it onto the list of
    /// active formatting elements.
    fn insert_formatting_element(&mut self, token: &Token, tag: HtmlTag) {
        let element = self.insert_html_element(token);
        self.active_formatting_elements
            .push(element, tag, attributes_of(token));
    }

    /// Generate implied end tags except for `tag`, report an error unless the
    /// current node is `tag`, and pop through it.
    fn close_element_except(&mut self, tag: HtmlTag) {
        self.generate_implied_end_tags(Some(tag));
        if !self.current_node_is(tag) {
            self.parse_error(&format!("end-tag-with-open-elements </{tag}>"));
        }
        self.open_elements.pop_until(&self.document, tag);
    }

    /// The loop shared by the "li" and "dd"/"dt" start tags.
    fn close_list_item(&mut self, items: &[HtmlTag]) {
        // STEP 2: "Initialize node to be the current node (the bottommost
        //          node of the stack)."
        for index in (0..self.open_elements.len()).rev() {
            let Some(node) = self.open_elements.get(index) else {
                continue;
            };
            let node_tag = self.html_tag_of(node);

            // STEP 3: "Loop: If node is an li element, then run these
            //          substeps: Generate implied end tags, except for li
            //          elements. If the current node is not an li element,
            //          then this is a parse error. Pop elements from the stack
            //          of open elements until an li element has been popped
            //          from the stack. Jump to the step labeled done below."
            if let Some(item) = node_tag.filter(|tag| items.contains(tag)) {
                self.close_element_except(item);
                return;
            }

            // STEP 4: "If node is in the special category, but is not an
            //          address, div, or p element, then jump to the step
            //          labeled done below."
            let special = self.document.as_element(node).is_some_and(is_special);
            if special
                && !matches!(
                    node_tag,
                    Some(HtmlTag::Address | HtmlTag::Div | HtmlTag::P)
                )
            {
                return;
            }
            // STEP 5: "Otherwise, set node to the previous entry in the stack
            //          of open elements and return to the step labeled loop."
        }
    }

    /// "An end tag whose tag name is "form""
    fn end_form(&mut self, token: &Token) {
        if !self.template_on_stack() {
            // "If there is no template element on the stack of open elements,
            //  then run these substeps:
            //  1. Let node be the element that the form element pointer is set
            //     to, or null if it is not set to an element.
            //  2. Set the form element pointer to null.
            //  3. If node is null or if the stack of open elements does not
            //     have node in scope, then this is a parse error; return and
            //     ignore the token.
            //  4. Generate implied end tags.
            //  5. If the current node is not node, then this is a parse error.
            //  6. Remove node from the stack of open elements."
            let node = self.form_element_pointer.take();
            let Some(node) = node.filter(|&form| {
                self.open_elements
                    .has_node_in_scope(&self.document, form, Scope::Default)
            }) else {
                self.unexpected_token(token);
                return;
            };
            self.generate_implied_end_tags(None);
            if self.current_node() != Some(node) {
                self.parse_error("end-tag-with-open-elements </form>");
            }
            self.open_elements.remove(node);
        } else {
            // "If there is a template element on the stack of open elements,
            //  then run these substeps instead:
            //  1. If the stack of open elements does not have a form element
            //     in scope, then this is a parse error; return and ignore the
            //     token.
            //  2. Generate implied end tags.
            //  3. If the current node is not a form element, then this is a
            //     parse error.
            //  4. Pop elements from the stack of open elements until a form
            //     element has been popped from the stack."
            if !self
                .open_elements
                .has_in_scope(&self.document, HtmlTag::Form, Scope::Default)
            {
                self.unexpected_token(token);
                return;
            }
            self.close_element(HtmlTag::Form);
        }
    }
}

/// `<input type=hidden>` does not reset the frameset-ok flag.
pub(super) fn is_hidden_input(token: &Token) -> bool {
    token
        .attribute("type")
        .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"))
}
