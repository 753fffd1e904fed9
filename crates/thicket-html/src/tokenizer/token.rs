use core::fmt;

/// An attribute on a start or end tag token.
///
/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create an attribute with the given name and value.
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Consecutive character tokens are delivered as one [`Token::Text`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag."
    ///
    /// Missing identifiers are `None`, which is distinct from the empty
    /// string.
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_identifier: Option<String>,
        /// "a system identifier"
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes and the self-closing flag are parse errors
    /// on end tags but are still recorded.
    EndTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// A run of character tokens.
    Text {
        /// The characters, in order.
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// "When a DOCTYPE token is created, its name, public identifier, and
    /// system identifier must be marked as missing ... and the force-quirks
    /// flag must be set to off."
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype {
            name: None,
            public_identifier: None,
            system_identifier: None,
            force_quirks: false,
        }
    }

    /// "When a start or end tag token is created, its self-closing flag must
    /// be unset ... and its attributes list must be empty."
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// An end tag token with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// A comment token with the given data.
    #[must_use]
    pub fn new_comment(data: &str) -> Self {
        Self::Comment {
            data: data.to_string(),
        }
    }

    /// Tag name for start and end tags.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Value of the named attribute on a start or end tag.
    #[must_use]
    pub fn attribute(&self, wanted: &str) -> Option<&str> {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => attributes
                .iter()
                .find(|attr| attr.name == wanted)
                .map(|attr| attr.value.as_str()),
            _ => None,
        }
    }

    /// True for the end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    /// "Append the current input character to the current DOCTYPE token's
    /// name."
    pub(super) fn append_to_doctype_name(&mut self, c: char) {
        if let Self::Doctype { name, .. } = self {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the DOCTYPE token's public identifier to the empty string (not
    /// missing)"
    pub(super) fn start_public_identifier(&mut self) {
        if let Self::Doctype {
            public_identifier, ..
        } = self
        {
            *public_identifier = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's
    /// public identifier."
    pub(super) fn append_to_public_identifier(&mut self, c: char) {
        if let Self::Doctype {
            public_identifier: Some(id),
            ..
        } = self
        {
            id.push(c);
        }
    }

    /// "Set the DOCTYPE token's system identifier to the empty string (not
    /// missing)"
    pub(super) fn start_system_identifier(&mut self) {
        if let Self::Doctype {
            system_identifier, ..
        } = self
        {
            *system_identifier = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's
    /// system identifier."
    pub(super) fn append_to_system_identifier(&mut self, c: char) {
        if let Self::Doctype {
            system_identifier: Some(id),
            ..
        } = self
        {
            id.push(c);
        }
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub(super) fn set_force_quirks(&mut self) {
        if let Self::Doctype { force_quirks, .. } = self {
            *force_quirks = true;
        }
    }

    /// "Append the current input character to the current tag token's tag
    /// name."
    pub(super) fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name, .. } = self {
            name.push(c);
        }
    }

    /// "Set the self-closing flag of the current tag token."
    pub(super) fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } | Self::EndTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// "Append the current input character to the comment token's data."
    pub(super) fn append_to_comment(&mut self, text: &str) {
        if let Self::Comment { data } = self {
            data.push_str(text);
        }
    }

    /// Add a finished attribute unless one with the same name is already
    /// present.
    ///
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    ///
    /// Returns false for a duplicate.
    pub(super) fn add_attribute(&mut self, attribute: Attribute) -> bool {
        if let Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } = self {
            if attributes.iter().any(|attr| attr.name == attribute.name) {
                return false;
            }
            attributes.push(attribute);
        }
        true
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                write!(f, "<!DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if let Some(id) = public_identifier {
                    write!(f, " PUBLIC \"{id}\"")?;
                }
                if let Some(id) = system_identifier {
                    write!(f, " SYSTEM \"{id}\"")?;
                }
                if *force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                write!(f, ">")
            }
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name, .. } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Text { data } => write!(f, "{data:?}"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
