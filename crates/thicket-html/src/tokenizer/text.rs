//! Text states and tag-open states.
//!
//! [§ 13.2.5.1](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
//! through [§ 13.2.5.17](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state).

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;

impl HTMLTokenizer {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    pub(super) fn handle_data_state(&mut self) {
        match self.current_input_character {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            //  Switch to the character reference state."
            Some('&') => {
                self.return_state = TokenizerState::Data;
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            // "U+0000 NULL - This is an unexpected-null-character parse error.
            //  Emit the current input character as a character token."
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_character_token('\0');
            }
            // "EOF - Emit an end-of-file token."
            None => self.emit_eof_token(),
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    pub(super) fn handle_rcdata_state(&mut self) {
        match self.current_input_character {
            Some('&') => {
                self.return_state = TokenizerState::RCDATA;
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some('<') => self.switch_to(TokenizerState::RCDATALessThanSign),
            // "Emit a U+FFFD REPLACEMENT CHARACTER character token."
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_character_token('\u{FFFD}');
            }
            None => self.emit_eof_token(),
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    pub(super) fn handle_rawtext_state(&mut self) {
        self.handle_raw_state(TokenizerState::RAWTEXTLessThanSign);
    }

    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    pub(super) fn handle_script_data_state(&mut self) {
        self.handle_raw_state(TokenizerState::ScriptDataLessThanSign);
    }

    fn handle_raw_state(&mut self, less_than_sign_state: TokenizerState) {
        match self.current_input_character {
            Some('<') => self.switch_to(less_than_sign_state),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_character_token('\u{FFFD}');
            }
            None => self.emit_eof_token(),
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    pub(super) fn handle_plaintext_state(&mut self) {
        match self.current_input_character {
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_character_token('\u{FFFD}');
            }
            None => self.emit_eof_token(),
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    pub(super) fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration
            //  open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "ASCII alpha - Create a new start tag token, set its tag name to
            //  the empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003F QUESTION MARK (?) - This is an
            //  unexpected-question-mark-instead-of-tag-name parse error.
            //  Create a comment token whose data is the empty string.
            //  Reconsume in the bogus comment state."
            Some('?') => {
                self.parse_error("unexpected-question-mark-instead-of-tag-name");
                self.current_token = Some(Token::new_comment(""));
                self.reconsume_in(TokenizerState::BogusComment);
            }
            // "EOF - This is an eof-before-tag-name parse error. Emit a U+003C
            //  LESS-THAN SIGN character token and an end-of-file token."
            None => {
                self.parse_error("eof-before-tag-name");
                self.emit_character_token('<');
                self.emit_eof_token();
            }
            // "Anything else - This is an invalid-first-character-of-tag-name
            //  parse error. Emit a U+003C LESS-THAN SIGN character token.
            //  Reconsume in the data state."
            Some(_) => {
                self.parse_error("invalid-first-character-of-tag-name");
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    pub(super) fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name
            //  parse error. Switch to the data state."
            Some('>') => {
                self.parse_error("missing-end-tag-name");
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-before-tag-name");
                self.emit_characters("</");
                self.emit_eof_token();
            }
            // "Anything else - This is an invalid-first-character-of-tag-name
            //  parse error. Create a comment token whose data is the empty
            //  string. Reconsume in the bogus comment state."
            Some(_) => {
                self.parse_error("invalid-first-character-of-tag-name");
                self.current_token = Some(Token::new_comment(""));
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    pub(super) fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "ASCII upper alpha - Append the lowercase version of the current
            //  input character ... to the current tag token's tag name."
            Some(c) if c.is_ascii_uppercase() => {
                self.with_current_token(|token| token.append_to_tag_name(c.to_ascii_lowercase()));
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.with_current_token(|token| token.append_to_tag_name('\u{FFFD}'));
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file
            //  token."
            None => {
                self.parse_error("eof-in-tag");
                self.current_token = None;
                self.current_attribute = None;
                self.emit_eof_token();
            }
            Some(c) => self.with_current_token(|token| token.append_to_tag_name(c)),
        }
    }

    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    pub(super) fn handle_text_less_than_sign_state(&mut self, text_state: TokenizerState) {
        match self.current_input_character {
            // "U+002F SOLIDUS (/) - Set the temporary buffer to the empty
            //  string. Switch to the ... end tag open state."
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(Self::end_tag_open_state_for(text_state));
            }
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(text_state);
            }
        }
    }

    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    pub(super) fn handle_script_data_less_than_sign_state(&mut self) {
        match self.current_input_character {
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::ScriptDataEndTagOpen);
            }
            // "U+0021 EXCLAMATION MARK (!) - Switch to the script data escape
            //  start state. Emit a U+003C LESS-THAN SIGN character token and a
            //  U+0021 EXCLAMATION MARK character token."
            Some('!') => {
                self.switch_to(TokenizerState::ScriptDataEscapeStart);
                self.emit_characters("<!");
            }
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    /// and its RAWTEXT, script data, and script data escaped counterparts.
    pub(super) fn handle_text_end_tag_open_state(&mut self, text_state: TokenizerState) {
        match self.current_input_character {
            // "ASCII alpha - Create a new end tag token, set its tag name to
            //  the empty string. Reconsume in the ... end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(Self::end_tag_name_state_for(text_state));
            }
            // "Anything else - Emit a U+003C LESS-THAN SIGN character token and
            //  a U+002F SOLIDUS character token. Reconsume in the ... state."
            _ => {
                self.emit_characters("</");
                self.reconsume_in(text_state);
            }
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    /// and its RAWTEXT, script data, and script data escaped counterparts.
    pub(super) fn handle_text_end_tag_name_state(&mut self, text_state: TokenizerState) {
        match self.current_input_character {
            // "If the current end tag token is an appropriate end tag token,
            //  then switch to the before attribute name state. Otherwise, treat
            //  it as per the "anything else" entry below."
            Some(c) if Self::is_whitespace_char(c) && self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "ASCII alpha - Append the lowercase version of the current input
            //  character to the current tag token's tag name. Append the current
            //  input character to the temporary buffer."
            Some(c) if c.is_ascii_alphabetic() => {
                self.with_current_token(|token| token.append_to_tag_name(c.to_ascii_lowercase()));
                self.temporary_buffer.push(c);
            }
            _ => self.emit_end_tag_name_anything_else(text_state),
        }
    }

    const fn end_tag_open_state_for(text_state: TokenizerState) -> TokenizerState {
        match text_state {
            TokenizerState::RAWTEXT => TokenizerState::RAWTEXTEndTagOpen,
            TokenizerState::ScriptData => TokenizerState::ScriptDataEndTagOpen,
            TokenizerState::ScriptDataEscaped => TokenizerState::ScriptDataEscapedEndTagOpen,
            _ => TokenizerState::RCDATAEndTagOpen,
        }
    }

    const fn end_tag_name_state_for(text_state: TokenizerState) -> TokenizerState {
        match text_state {
            TokenizerState::RAWTEXT => TokenizerState::RAWTEXTEndTagName,
            TokenizerState::ScriptData => TokenizerState::ScriptDataEndTagName,
            TokenizerState::ScriptDataEscaped => TokenizerState::ScriptDataEscapedEndTagName,
            _ => TokenizerState::RCDATAEndTagName,
        }
    }
}
