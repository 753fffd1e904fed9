//! Markup declarations: comments, DOCTYPEs, and CDATA sections.
//!
//! [§ 13.2.5.41](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
//! through [§ 13.2.5.71](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state).

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::Token;
use crate::scanner::{Lookahead, Scanner};

impl HTMLTokenizer {
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    pub(super) fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - Emit the comment. Emit an end-of-file token."
            None => self.emit_token_then_eof(),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.append_to_comment("\u{FFFD}");
            }
            Some(c) => self.append_to_comment(c.encode_utf8(&mut [0; 4])),
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Looks ahead without consuming. Returns false if the buffer is too short
    /// to decide.
    pub(super) fn handle_markup_declaration_open_state(&mut self, input: &mut Scanner) -> bool {
        let dashes = input.matches_ahead("--", false);
        let doctype = input.matches_ahead("DOCTYPE", true);
        let cdata = input.matches_ahead("[CDATA[", false);

        // "Two U+002D HYPHEN-MINUS characters (-) - Consume those two
        //  characters, create a comment token whose data is the empty string,
        //  and switch to the comment start state."
        if dashes == Lookahead::Ready(true) {
            input.advance(2);
            self.current_token = Some(Token::new_comment(""));
            self.switch_to(TokenizerState::CommentStart);
        }
        // "ASCII case-insensitive match for the word "DOCTYPE" - Consume those
        //  characters and switch to the DOCTYPE state."
        else if doctype == Lookahead::Ready(true) {
            input.advance(7);
            self.switch_to(TokenizerState::DOCTYPE);
        }
        // "The string "[CDATA[" (the five uppercase letters "CDATA" with a
        //  U+005B LEFT SQUARE BRACKET character before and after) - Consume
        //  those characters. If there is an adjusted current node and it is
        //  not an element in the HTML namespace, then switch to the CDATA
        //  section state. Otherwise, this is a cdata-in-html-content parse
        //  error. Create a comment token whose data is the "[CDATA[" string.
        //  Switch to the bogus comment state."
        else if cdata == Lookahead::Ready(true) {
            input.advance(7);
            if self.allow_cdata {
                self.switch_to(TokenizerState::CDATASection);
            } else {
                self.parse_error("cdata-in-html-content");
                self.current_token = Some(Token::new_comment("[CDATA["));
                self.switch_to(TokenizerState::BogusComment);
            }
        } else if [dashes, doctype, cdata].contains(&Lookahead::NeedMore) {
            return false;
        }
        // "Anything else - This is an incorrectly-opened-comment parse error.
        //  Create a comment token whose data is the empty string. Switch to
        //  the bogus comment state (don't consume anything in the current
        //  state)."
        else {
            self.position = input.position();
            self.parse_error("incorrectly-opened-comment");
            self.current_token = Some(Token::new_comment(""));
            self.switch_to(TokenizerState::BogusComment);
        }
        true
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            // "This is an abrupt-closing-of-empty-comment parse error. Switch to
            //  the data state. Emit the current comment token."
            Some('>') => {
                self.parse_error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    pub(super) fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.parse_error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('<') => {
                self.append_to_comment("<");
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.append_to_comment("\u{FFFD}");
            }
            None => self.eof_in_comment(),
            Some(c) => self.append_to_comment(c.encode_utf8(&mut [0; 4])),
        }
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    pub(super) fn handle_comment_less_than_sign_state(&mut self) {
        match self.current_input_character {
            Some('!') => {
                self.append_to_comment("!");
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            Some('<') => self.append_to_comment("<"),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    pub(super) fn handle_comment_less_than_sign_bang_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDash),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDashDash),
            _ => self.reconsume_in(TokenizerState::CommentEndDash),
        }
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_dash_state(&mut self) {
        match self.current_input_character {
            Some('>') | None => self.reconsume_in(TokenizerState::CommentEnd),
            // "Anything else - This is a nested-comment parse error. Reconsume
            //  in the comment end state."
            Some(_) => {
                self.parse_error("nested-comment");
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    pub(super) fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    pub(super) fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('!') => self.switch_to(TokenizerState::CommentEndBang),
            Some('-') => self.append_to_comment("-"),
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    pub(super) fn handle_comment_end_bang_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.append_to_comment("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            Some('>') => {
                self.parse_error("incorrectly-closed-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// "EOF - This is an eof-in-comment parse error. Emit the current comment
    /// token. Emit an end-of-file token."
    fn eof_in_comment(&mut self) {
        self.parse_error("eof-in-comment");
        self.emit_token_then_eof();
    }

    // =========================================================================
    // DOCTYPE
    // =========================================================================

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "EOF - This is an eof-in-doctype parse error. Create a new DOCTYPE
            //  token. Set its force-quirks flag to on. Emit the current token.
            //  Emit an end-of-file token."
            None => {
                self.current_token = Some(Token::new_doctype());
                self.eof_in_doctype();
            }
            Some(_) => {
                self.parse_error("missing-whitespace-before-doctype-name");
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-name
            //  parse error. Create a new DOCTYPE token. Set its force-quirks
            //  flag to on. Switch to the data state. Emit the current token."
            Some('>') => {
                self.parse_error("missing-doctype-name");
                let mut token = Token::new_doctype();
                token.set_force_quirks();
                self.current_token = Some(token);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.current_token = Some(Token::new_doctype());
                self.eof_in_doctype();
            }
            Some(c) => {
                let c = match c {
                    '\0' => {
                        self.parse_error("unexpected-null-character");
                        '\u{FFFD}'
                    }
                    c => c.to_ascii_lowercase(),
                };
                let mut token = Token::new_doctype();
                token.append_to_doctype_name(c);
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.with_current_token(|token| token.append_to_doctype_name('\u{FFFD}'));
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                self.with_current_token(|token| token.append_to_doctype_name(c.to_ascii_lowercase()));
            }
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    ///
    /// Returns false if the `PUBLIC`/`SYSTEM` keyword check needs more input.
    pub(super) fn handle_after_doctype_name_state(&mut self, input: &mut Scanner) -> bool {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                // "If the six characters starting from the current input
                //  character are an ASCII case-insensitive match for the word
                //  "PUBLIC", then consume those characters and switch to the
                //  after DOCTYPE public keyword state."
                input.unread(c);
                let public = input.matches_ahead("PUBLIC", true);
                let system = input.matches_ahead("SYSTEM", true);
                if public == Lookahead::Ready(true) {
                    input.advance(6);
                    self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
                } else if system == Lookahead::Ready(true) {
                    input.advance(6);
                    self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
                } else if public == Lookahead::NeedMore || system == Lookahead::NeedMore {
                    return false;
                } else {
                    // "Otherwise, this is an
                    //  invalid-character-sequence-after-doctype-name parse
                    //  error. Set the current DOCTYPE token's force-quirks flag
                    //  to on. Reconsume in the bogus DOCTYPE state."
                    self.parse_error("invalid-character-sequence-after-doctype-name");
                    self.with_current_token(Token::set_force_quirks);
                    // The character was pushed back, so the bogus DOCTYPE
                    // state consumes it again.
                    self.switch_to(TokenizerState::BogusDOCTYPE);
                }
            }
        }
        true
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_keyword_state(&mut self, public: bool) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(if public {
                    TokenizerState::BeforeDOCTYPEPublicIdentifier
                } else {
                    TokenizerState::BeforeDOCTYPESystemIdentifier
                });
            }
            Some(quote @ ('"' | '\'')) => {
                self.parse_error(if public {
                    "missing-whitespace-after-doctype-public-keyword"
                } else {
                    "missing-whitespace-after-doctype-system-keyword"
                });
                self.begin_doctype_identifier(public, quote);
            }
            other => self.doctype_identifier_missing(public, other),
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_identifier_state(&mut self, public: bool) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some(quote @ ('"' | '\'')) => self.begin_doctype_identifier(public, quote),
            other => self.doctype_identifier_missing(public, other),
        }
    }

    /// "Set the current DOCTYPE token's public identifier to the empty string
    /// (not missing), then switch to the DOCTYPE public identifier
    /// (double-quoted) state." and the other three combinations.
    fn begin_doctype_identifier(&mut self, public: bool, quote: char) {
        let next = match (public, quote) {
            (true, '"') => TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
            (true, _) => TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            (false, '"') => TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
            (false, _) => TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
        };
        self.with_current_token(|token| {
            if public {
                token.start_public_identifier();
            } else {
                token.start_system_identifier();
            }
        });
        self.switch_to(next);
    }

    /// The `>`, EOF, and "anything else" entries shared by the keyword and
    /// before-identifier states.
    fn doctype_identifier_missing(&mut self, public: bool, current: Option<char>) {
        match current {
            Some('>') => {
                self.parse_error(if public {
                    "missing-doctype-public-identifier"
                } else {
                    "missing-doctype-system-identifier"
                });
                self.with_current_token(Token::set_force_quirks);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(if public {
                    "missing-quote-before-doctype-public-identifier"
                } else {
                    "missing-quote-before-doctype-system-identifier"
                });
                self.with_current_token(Token::set_force_quirks);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.59](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// through [§ 13.2.5.66](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state):
    /// the four quoted identifier states.
    pub(super) fn handle_doctype_identifier_quoted_state(&mut self, public: bool, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(if public {
                TokenizerState::AfterDOCTYPEPublicIdentifier
            } else {
                TokenizerState::AfterDOCTYPESystemIdentifier
            }),
            Some('>') => {
                self.parse_error(if public {
                    "abrupt-doctype-public-identifier"
                } else {
                    "abrupt-doctype-system-identifier"
                });
                self.with_current_token(Token::set_force_quirks);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                let c = if c == '\0' {
                    self.parse_error("unexpected-null-character");
                    '\u{FFFD}'
                } else {
                    c
                };
                self.with_current_token(|token| {
                    if public {
                        token.append_to_public_identifier(c);
                    } else {
                        token.append_to_system_identifier(c);
                    }
                });
            }
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some(quote @ ('"' | '\'')) => {
                self.parse_error("missing-whitespace-between-doctype-public-and-system-identifiers");
                self.begin_doctype_identifier(false, quote);
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.with_current_token(Token::set_force_quirks);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some(quote @ ('"' | '\'')) => self.begin_doctype_identifier(false, quote),
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.with_current_token(Token::set_force_quirks);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => self.eof_in_doctype(),
            // "This is an unexpected-character-after-doctype-system-identifier
            //  parse error. Reconsume in the bogus DOCTYPE state. (This does
            //  not set the current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.parse_error("unexpected-character-after-doctype-system-identifier");
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('\0') => self.parse_error("unexpected-null-character"),
            None => self.emit_token_then_eof(),
            Some(_) => {}
        }
    }

    /// "EOF - This is an eof-in-doctype parse error. Set the current DOCTYPE
    /// token's force-quirks flag to on. Emit the current DOCTYPE token. Emit
    /// an end-of-file token."
    fn eof_in_doctype(&mut self) {
        self.parse_error("eof-in-doctype");
        self.with_current_token(Token::set_force_quirks);
        self.emit_token_then_eof();
    }

    // =========================================================================
    // CDATA
    // =========================================================================

    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    pub(super) fn handle_cdata_section_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CDATASectionBracket),
            None => {
                self.parse_error("eof-in-cdata");
                self.emit_eof_token();
            }
            // U+0000 NULL characters are handled in the tree construction stage.
            Some(c) => self.emit_character_token(c),
        }
    }

    /// [§ 13.2.5.70 CDATA section bracket state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state)
    pub(super) fn handle_cdata_section_bracket_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CDATASectionEnd),
            _ => {
                self.emit_character_token(']');
                self.reconsume_in(TokenizerState::CDATASection);
            }
        }
    }

    /// [§ 13.2.5.71 CDATA section end state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)
    pub(super) fn handle_cdata_section_end_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.emit_character_token(']'),
            Some('>') => self.switch_to(TokenizerState::Data),
            _ => {
                self.emit_characters("]]");
                self.reconsume_in(TokenizerState::CDATASection);
            }
        }
    }
}
