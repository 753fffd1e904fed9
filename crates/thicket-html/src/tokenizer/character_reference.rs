//! Character reference states.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)

use std::sync::LazyLock;

use regex::Regex;

use super::core::{HTMLTokenizer, TokenizerState};
use super::named_character_references::longest_match;
use crate::scanner::{Lookahead, Scanner};

/// Candidate text for a named reference: the alphanumeric run and an
/// optional terminating semicolon.
static NAMED_REFERENCE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+;?").unwrap());

/// [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
/// Replacements for the C1 control range, from Windows-1252.
const C1_REPLACEMENTS: [(u32, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// [Infra § 4.5](https://infra.spec.whatwg.org/#noncharacter)
const fn is_noncharacter(code: u32) -> bool {
    matches!(code, 0xFDD0..=0xFDEF) || (code & 0xFFFE) == 0xFFFE
}

/// [Infra § 4.5](https://infra.spec.whatwg.org/#control)
const fn is_control(code: u32) -> bool {
    matches!(code, 0x00..=0x1F | 0x7F..=0x9F)
}

impl HTMLTokenizer {
    /// [§ 13.2.5.72](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// "consumed as part of an attribute": the return state is an attribute
    /// value state.
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// "Flush code points consumed as a character reference": append the
    /// temporary buffer to the current attribute's value, or emit it as
    /// character tokens.
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.is_consumed_as_part_of_attribute() {
            self.append_to_attribute_value(&buffer);
        } else {
            self.emit_characters(&buffer);
        }
        self.temporary_buffer = buffer;
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        //  AMPERSAND (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');
        match self.current_input_character {
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in_return_state();
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// Returns false if the longest match cannot be decided until more input
    /// arrives.
    pub(super) fn handle_named_character_reference_state(&mut self, input: &mut Scanner) -> bool {
        // Entered by reconsuming the first alphanumeric; put it back so the
        // lookahead sees the whole name.
        if std::mem::take(&mut self.reconsume) {
            if let Some(c) = self.current_input_character {
                input.unread(c);
            }
        }
        self.position = input.position();

        let candidate = match input.scan_regex(&NAMED_REFERENCE_RUN) {
            Lookahead::NeedMore => return false,
            Lookahead::Ready(run) => run.unwrap_or_default(),
        };

        // "Consume the maximum number of characters possible, where the
        //  consumed characters are one of the identifiers in the named
        //  character references table. Append each character to the
        //  temporary buffer when it's consumed."
        let Some((len, replacement)) = longest_match(candidate) else {
            // "Otherwise: Flush code points consumed as a character reference.
            //  Switch to the ambiguous ampersand state."
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(TokenizerState::AmbiguousAmpersand);
            return true;
        };
        let matched = candidate[..len].to_string();
        let next = input.remaining()[len..].chars().next();
        input.advance(len);
        self.temporary_buffer.push_str(&matched);

        // "If the character reference was consumed as part of an attribute,
        //  and the last character matched is not a U+003B SEMICOLON character
        //  (;), and the next input character is either a U+003D EQUALS SIGN
        //  character (=) or an ASCII alphanumeric, then, for historical
        //  reasons, flush code points consumed as a character reference and
        //  switch to the return state."
        let ends_with_semicolon = matched.ends_with(';');
        if self.is_consumed_as_part_of_attribute()
            && !ends_with_semicolon
            && next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(self.return_state);
            return true;
        }

        // "If the last character matched is not a U+003B SEMICOLON character
        //  (;), then this is a missing-semicolon-after-character-reference
        //  parse error."
        if !ends_with_semicolon {
            self.parse_error("missing-semicolon-after-character-reference");
        }
        // "Set the temporary buffer to the empty string. Append one or two
        //  characters corresponding to the character reference name ... to
        //  the temporary buffer. Flush code points consumed as a character
        //  reference. Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
        true
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "ASCII alphanumeric - If the character reference was consumed as
            //  part of an attribute, then append the current input character
            //  to the current attribute's value. Otherwise, emit the current
            //  input character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.is_consumed_as_part_of_attribute() {
                    self.append_to_attribute_value(c.encode_utf8(&mut [0; 4]));
                } else {
                    self.emit_character_token(c);
                }
            }
            // "U+003B SEMICOLON (;) - This is an unknown-named-character-reference
            //  parse error. Reconsume in the return state."
            Some(';') => {
                self.parse_error("unknown-named-character-reference");
                self.reconsume_in_return_state();
            }
            _ => self.reconsume_in_return_state(),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;
        match self.current_input_character {
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_numeric_character_reference_start_state(&mut self, radix: u32) {
        match self.current_input_character {
            Some(c) if c.is_digit(radix) => self.reconsume_in(if radix == 16 {
                TokenizerState::HexadecimalCharacterReference
            } else {
                TokenizerState::DecimalCharacterReference
            }),
            // "This is an absence-of-digits-in-numeric-character-reference
            //  parse error. Flush code points consumed as a character
            //  reference. Reconsume in the return state."
            _ => {
                self.parse_error("absence-of-digits-in-numeric-character-reference");
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in_return_state();
            }
        }
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_numeric_character_reference_digits_state(&mut self, radix: u32) {
        match self.current_input_character {
            // "Multiply the character reference code by 16. Add a numeric
            //  version of the current input character to the character
            //  reference code."
            Some(c) if c.is_digit(radix) => {
                let digit = c.to_digit(radix).unwrap_or_default();
                // Saturate just past the valid range; the end state only
                // needs to know the value is too large.
                self.character_reference_code = self
                    .character_reference_code
                    .saturating_mul(radix)
                    .saturating_add(digit)
                    .min(0x11_0000);
            }
            Some(';') => self.switch_to(TokenizerState::NumericCharacterReferenceEnd),
            _ => {
                self.parse_error("missing-semicolon-after-character-reference");
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// Consumes nothing. A pending reconsume carries over to the return
    /// state.
    pub(super) fn handle_numeric_character_reference_end_state(&mut self) {
        let mut code = self.character_reference_code;
        // "If the number is 0x00, then this is a null-character-reference
        //  parse error. Set the character reference code to 0xFFFD."
        if code == 0 {
            self.parse_error("null-character-reference");
            code = 0xFFFD;
        }
        // "If the number is greater than 0x10FFFF, then this is a
        //  character-reference-outside-unicode-range parse error."
        else if code > 0x10_FFFF {
            self.parse_error("character-reference-outside-unicode-range");
            code = 0xFFFD;
        }
        // "If the number is a surrogate, then this is a
        //  surrogate-character-reference parse error."
        else if (0xD800..=0xDFFF).contains(&code) {
            self.parse_error("surrogate-character-reference");
            code = 0xFFFD;
        } else if is_noncharacter(code) {
            self.parse_error("noncharacter-character-reference");
        }
        // "If the number is 0x0D, or a control that's not ASCII whitespace,
        //  then this is a control-character-reference parse error. If the
        //  number is one of the numbers in the first column of the following
        //  table, then find the row with that number in the first column, and
        //  set the character reference code to the number in the second
        //  column."
        else if code == 0x0D || (is_control(code) && !matches!(code, 0x09 | 0x0A | 0x0C | 0x20)) {
            self.parse_error("control-character-reference");
            if let Some(&(_, replacement)) = C1_REPLACEMENTS.iter().find(|(from, _)| *from == code) {
                code = u32::from(replacement);
            }
        }

        // "Set the temporary buffer to the empty string. Append a code point
        //  equal to the character reference code to the temporary buffer.
        //  Flush code points consumed as a character reference. Switch to the
        //  return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        self.flush_code_points_consumed_as_character_reference();
        self.state = self.return_state;
    }
}
