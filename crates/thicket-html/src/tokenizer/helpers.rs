//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! - State transitions ("Switch to", "Reconsume in")
//! - Token emission ("Emit the current token")
//! - Attribute bookkeeping
//! - Parse error reporting

use thicket_common::warning::warn_once;

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::{Attribute, Token};
use crate::issue::ParseIssue;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character is processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// "Switch to the return state" / "Reconsume in the return state"
    pub(super) const fn reconsume_in_return_state(&mut self) {
        self.reconsume_in(self.return_state);
    }

    /// "U+0009 CHARACTER TABULATION (tab), U+000A LINE FEED (LF), U+000C FORM
    /// FEED (FF), U+0020 SPACE". CR never reaches the tokenizer.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// Queue buffered character tokens as one text token.
    pub(super) fn flush_text(&mut self) {
        if !self.pending_text.is_empty() {
            let data = std::mem::take(&mut self.pending_text);
            self.token_stream.push_back(Token::Text { data });
        }
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.pending_text.push(c);
    }

    /// Emit a character token for each character of `text`.
    pub(super) fn emit_characters(&mut self, text: &str) {
        self.pending_text.push_str(text);
    }

    /// "Emit the current tag token" / "Emit the comment token" / "Emit the
    /// current DOCTYPE token".
    pub(super) fn emit_token(&mut self) {
        self.commit_attribute();
        let Some(token) = self.current_token.take() else {
            return;
        };
        match &token {
            Token::StartTag { name, .. } => self.last_start_tag_name = Some(name.clone()),
            // "When an end tag token is emitted with attributes, that is an
            //  end-tag-with-attributes parse error. When an end tag token is
            //  emitted with its self-closing flag set, that is an
            //  end-tag-with-trailing-solidus parse error."
            Token::EndTag {
                attributes,
                self_closing,
                ..
            } => {
                if !attributes.is_empty() {
                    self.parse_error("end-tag-with-attributes");
                }
                if *self_closing {
                    self.parse_error("end-tag-with-trailing-solidus");
                }
            }
            _ => {}
        }
        self.flush_text();
        self.token_stream.push_back(token);
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.flush_text();
        self.token_stream.push_back(Token::EndOfFile);
        self.at_eof = true;
    }

    /// Emit the current token (if any), then end-of-file.
    pub(super) fn emit_token_then_eof(&mut self) {
        self.emit_token();
        self.emit_eof_token();
    }

    /// Append text to the current comment token's data.
    pub(super) fn append_to_comment(&mut self, text: &str) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_comment(text);
        }
    }

    /// Apply `f` to the current token.
    pub(super) fn with_current_token(&mut self, f: impl FnOnce(&mut Token)) {
        if let Some(token) = self.current_token.as_mut() {
            f(token);
        }
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Start a new attribute in the current tag token."
    pub(super) fn start_new_attribute(&mut self, name: &str) {
        self.commit_attribute();
        self.current_attribute = Some(Attribute::new(name, ""));
    }

    /// Move the finished attribute onto the tag token. The first attribute
    /// with a given name wins.
    pub(super) fn commit_attribute(&mut self) {
        let Some(attribute) = self.current_attribute.take() else {
            return;
        };
        let added = self
            .current_token
            .as_mut()
            .is_none_or(|token| token.add_attribute(attribute));
        if !added {
            self.parse_error("duplicate-attribute");
        }
    }

    /// "Append the current input character to the current attribute's name."
    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.current_attribute.as_mut() {
            attr.name.push(c);
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(super) fn append_to_attribute_value(&mut self, text: &str) {
        if let Some(attr) = self.current_attribute.as_mut() {
            attr.value.push_str(text);
        }
    }
}

// =============================================================================
// RCDATA/RAWTEXT/Script Data Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "An appropriate end tag token is an end tag token whose tag name
    /// matches the tag name of the last start tag to have been emitted from
    /// this tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.last_start_tag_name, &self.current_token) {
            (Some(last), Some(Token::EndTag { name, .. })) => name == last,
            _ => false,
        }
    }

    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
    /// character token, and a character token for each of the characters in
    /// the temporary buffer (in the order they were added to the buffer).
    /// Reconsume in the X state."
    pub(super) fn emit_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        self.emit_characters("</");
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.emit_characters(&buffer);
        self.temporary_buffer = buffer;
        self.current_token = None;
        self.current_attribute = None;
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are recorded and logged; the tokenizer always recovers.
    pub(super) fn parse_error(&mut self, code: &'static str) {
        log::trace!(target: "thicket::tokenizer", "{code} at {} in {}", self.position, self.state);
        let _ = warn_once("HTML tokenizer", code);
        self.errors.push(ParseIssue::new(code, self.position));
    }
}
