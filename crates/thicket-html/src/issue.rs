use std::fmt;

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recoverable parse error reported by the tokenizer or the tree builder.
/// Parsing always continues past these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Error code, e.g. `unexpected-null-character`, or a short description
    /// for tree construction errors.
    pub message: String,
    /// Code points consumed when the error was detected.
    pub position: usize,
}

impl ParseIssue {
    /// Create an issue at `position`.
    #[must_use]
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}
