//! Input stream buffering for incremental and reentrant parsing.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! The scanner owns the not-yet-tokenized text. Chunks arrive through
//! [`Scanner::push_chunk`]; the tokenizer pulls code points with
//! [`Scanner::next_char`] or inspects ahead with one of three lookahead
//! modes:
//! - fixed length ([`Scanner::matches_ahead`])
//! - string delimited ([`Scanner::scan_until`])
//! - regex delimited ([`Scanner::scan_regex`])
//!
//! Lookahead that runs into the end of the buffer before input is complete
//! answers [`Lookahead::NeedMore`], and the tokenizer suspends without
//! consuming anything.

use regex::Regex;

/// Result of pulling one code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The next code point.
    Char(char),
    /// All input has been consumed and the caller marked it final.
    Eof,
    /// The buffer is exhausted but more input may follow.
    Suspend,
}

/// Result of a lookahead that may depend on text not yet supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead<T> {
    /// The answer is known.
    Ready(T),
    /// The answer depends on input that has not arrived yet.
    NeedMore,
}

/// Outer input saved while a reentrant invocation runs.
#[derive(Debug)]
struct SavedInput {
    buffer: String,
    pos: usize,
    complete: bool,
    pending_cr: bool,
}

/// Normalizing input buffer.
#[derive(Debug, Default)]
pub struct Scanner {
    buffer: String,
    /// Byte offset of the next unconsumed code point.
    pos: usize,
    /// The caller has supplied the final chunk: running out of input is EOF.
    complete: bool,
    /// At least one non-empty chunk has been seen (BOM handling).
    started: bool,
    /// The previous chunk ended in CR, already delivered as LF.
    pending_cr: bool,
    /// Code points consumed so far, for error positions.
    consumed: usize,
    saved: Vec<SavedInput>,
}

impl Scanner {
    /// Create an empty scanner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    /// "normalize newlines": CRLF and lone CR become LF. A CR at the end of
    /// one chunk and an LF at the start of the next are one newline.
    fn normalize(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        if self.pending_cr && chars.peek() == Some(&'\n') {
            let _ = chars.next();
        }
        self.pending_cr = false;
        while let Some(c) = chars.next() {
            if c == '\r' {
                out.push('\n');
                match chars.peek() {
                    Some('\n') => {
                        let _ = chars.next();
                    }
                    None => self.pending_cr = true,
                    Some(_) => {}
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Append a chunk of input. `is_final` marks the end of the stream.
    pub fn push_chunk(&mut self, text: &str, is_final: bool) {
        // Drop consumed text before growing the buffer.
        let _ = self.buffer.drain(..self.pos);
        self.pos = 0;

        let mut text = text;
        if !self.started && !text.is_empty() {
            // "One leading U+FEFF BYTE ORDER MARK character must be ignored
            //  if any are present."
            text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
            self.started = true;
        }
        let normalized = self.normalize(text);
        self.buffer.push_str(&normalized);
        if is_final {
            self.complete = true;
        }
    }

    /// True once the final chunk has been supplied.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// The unconsumed part of the buffer.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.buffer[self.pos..]
    }

    /// "Consume the next input character"
    pub fn next_char(&mut self) -> Input {
        match self.remaining().chars().next() {
            Some(c) => {
                self.pos += c.len_utf8();
                self.consumed += 1;
                Input::Char(c)
            }
            None if self.complete => Input::Eof,
            None => Input::Suspend,
        }
    }

    /// Step back over `c`, which must be the code point just consumed.
    pub fn unread(&mut self, c: char) {
        debug_assert!(self.buffer[..self.pos].ends_with(c));
        self.pos = self.pos.saturating_sub(c.len_utf8());
        self.consumed = self.consumed.saturating_sub(1);
    }

    /// Advance over `len` bytes already inspected with a lookahead.
    pub fn advance(&mut self, len: usize) {
        let end = (self.pos + len).min(self.buffer.len());
        self.consumed += self.buffer[self.pos..end].chars().count();
        self.pos = end;
    }

    /// Number of code points consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.consumed
    }

    /// Fixed-length lookahead: do the next characters spell `target`?
    ///
    /// Answers `NeedMore` only when every available character agrees with
    /// `target` and there are too few of them to decide.
    #[must_use]
    pub fn matches_ahead(&self, target: &str, ignore_case: bool) -> Lookahead<bool> {
        let mut available = self.remaining().chars();
        for expected in target.chars() {
            match available.next() {
                Some(c) if c == expected || (ignore_case && c.eq_ignore_ascii_case(&expected)) => {}
                Some(_) => return Lookahead::Ready(false),
                None if self.complete => return Lookahead::Ready(false),
                None => return Lookahead::NeedMore,
            }
        }
        Lookahead::Ready(true)
    }

    /// String-delimited lookahead: byte length of the text before the next
    /// occurrence of `delimiter`, or `None` if it is not in the buffer.
    #[must_use]
    pub fn scan_until(&self, delimiter: &str) -> Option<usize> {
        self.remaining().find(delimiter)
    }

    /// Regex-delimited lookahead: the match of `pattern` (which should be
    /// anchored with `^`) at the current position.
    ///
    /// Answers `NeedMore` if the match reaches the end of an incomplete
    /// buffer, since more input could extend it.
    #[must_use]
    pub fn scan_regex(&self, pattern: &Regex) -> Lookahead<Option<&str>> {
        let rest = self.remaining();
        match pattern.find(rest) {
            Some(m) if m.start() != 0 => Lookahead::Ready(None),
            Some(m) if m.end() == rest.len() && !self.complete => Lookahead::NeedMore,
            Some(m) => Lookahead::Ready(Some(m.as_str())),
            None => Lookahead::Ready(None),
        }
    }

    /// The match of `pattern` at the current position, even if it touches
    /// the end of the buffer. For runs that may be split freely.
    #[must_use]
    pub fn scan_run(&self, pattern: &Regex) -> Option<&str> {
        pattern
            .find(self.remaining())
            .filter(|m| m.start() == 0 && !m.is_empty())
            .map(|m| m.as_str())
    }

    /// Nesting depth of reentrant invocations.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Save the current input and make `text` the input of a nested
    /// invocation. The nested input is never complete: running out of it
    /// suspends, returning control to the outer invocation.
    pub fn begin_reentrant(&mut self, text: &str) {
        let saved = SavedInput {
            buffer: std::mem::take(&mut self.buffer),
            pos: self.pos,
            complete: self.complete,
            pending_cr: self.pending_cr,
        };
        self.saved.push(saved);
        self.pos = 0;
        self.complete = false;
        self.pending_cr = false;
        self.buffer = self.normalize(text);
    }

    /// Restore the outer input. Whatever the nested invocation left
    /// unconsumed is placed in front of the outer remainder.
    pub fn end_reentrant(&mut self) {
        let Some(saved) = self.saved.pop() else {
            return;
        };
        let mut buffer = self.remaining().to_string();
        buffer.push_str(&saved.buffer[saved.pos..]);
        self.buffer = buffer;
        self.pos = 0;
        self.complete = saved.complete;
        self.pending_cr = saved.pending_cr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scanner: &mut Scanner) -> String {
        let mut out = String::new();
        while let Input::Char(c) = scanner.next_char() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_newline_normalization() {
        let mut scanner = Scanner::new();
        scanner.push_chunk("a\r\nb\rc\n", true);
        assert_eq!(drain(&mut scanner), "a\nb\nc\n");
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut scanner = Scanner::new();
        scanner.push_chunk("a\r", false);
        assert_eq!(drain(&mut scanner), "a\n");
        scanner.push_chunk("\nb", true);
        assert_eq!(drain(&mut scanner), "b");
    }

    #[test]
    fn test_bom_only_on_first_chunk() {
        let mut scanner = Scanner::new();
        scanner.push_chunk("\u{FEFF}x", false);
        scanner.push_chunk("\u{FEFF}y", true);
        assert_eq!(drain(&mut scanner), "x\u{FEFF}y");
    }

    #[test]
    fn test_eof_versus_suspend() {
        let mut scanner = Scanner::new();
        scanner.push_chunk("a", false);
        assert_eq!(scanner.next_char(), Input::Char('a'));
        assert_eq!(scanner.next_char(), Input::Suspend);
        scanner.push_chunk("", true);
        assert_eq!(scanner.next_char(), Input::Eof);
    }

    #[test]
    fn test_matches_ahead() {
        let mut scanner = Scanner::new();
        scanner.push_chunk("DOC", false);
        assert_eq!(scanner.matches_ahead("doctype", true), Lookahead::NeedMore);
        assert_eq!(scanner.matches_ahead("--", false), Lookahead::Ready(false));
        scanner.push_chunk("TYPE html", true);
        assert_eq!(scanner.matches_ahead("doctype", true), Lookahead::Ready(true));
        assert_eq!(scanner.matches_ahead("doctype", false), Lookahead::Ready(false));
    }

    #[test]
    fn test_scan_regex_needs_more_at_buffer_end() {
        let pattern = Regex::new("^[a-z]+").unwrap();
        let mut scanner = Scanner::new();
        scanner.push_chunk("amp", false);
        assert_eq!(scanner.scan_regex(&pattern), Lookahead::NeedMore);
        scanner.push_chunk(";", true);
        assert_eq!(scanner.scan_regex(&pattern), Lookahead::Ready(Some("amp")));
    }

    #[test]
    fn test_scan_regex_match_away_from_cursor_is_no_match() {
        let pattern = Regex::new("[a-z]+").unwrap();
        let mut scanner = Scanner::new();
        scanner.push_chunk("#amp", false);
        assert_eq!(scanner.scan_regex(&pattern), Lookahead::Ready(None));
    }

    #[test]
    fn test_reentrant_leftover_precedes_outer_input() {
        let mut scanner = Scanner::new();
        scanner.push_chunk("outer", true);
        assert_eq!(scanner.next_char(), Input::Char('o'));

        scanner.begin_reentrant("in<!");
        assert_eq!(scanner.depth(), 1);
        assert_eq!(scanner.next_char(), Input::Char('i'));
        assert_eq!(scanner.next_char(), Input::Char('n'));
        scanner.end_reentrant();

        assert_eq!(scanner.depth(), 0);
        assert!(scanner.is_complete());
        assert_eq!(drain(&mut scanner), "<!uter");
    }
}
