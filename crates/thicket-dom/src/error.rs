//! DOM exceptions.
//!
//! [§ 2.5 Error names](https://webidl.spec.whatwg.org/#idl-DOMException-error-names)
//!
//! Direct misuse of the tree API is the only failure the crate surfaces.
//! Parsing never produces one of these.

/// Result alias for fallible DOM operations.
pub type DomResult<T> = Result<T, DomException>;

/// A DOM exception, one variant per error name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomException {
    /// "The operation would yield an incorrect node tree."
    #[error("HierarchyRequestError: {0}")]
    HierarchyRequest(&'static str),

    /// "The object can not be found here."
    #[error("NotFoundError: {0}")]
    NotFound(&'static str),

    /// "The object is in the wrong document."
    #[error("WrongDocumentError: node belongs to a different document")]
    WrongDocument,

    /// "The operation is not allowed by Namespaces in XML."
    #[error("NamespaceError: {0}")]
    Namespace(&'static str),

    /// "The string contains invalid characters."
    #[error("InvalidCharacterError: {0:?} is not a valid name")]
    InvalidCharacter(String),

    /// "The operation is not supported."
    #[error("NotSupportedError: {0}")]
    NotSupported(&'static str),

    /// "The supplied node is incorrect or has an incorrect ancestor for this
    /// operation."
    #[error("InvalidNodeTypeError: {0}")]
    InvalidNodeType(&'static str),
}

impl DomException {
    /// The WebIDL error name, e.g. `"HierarchyRequestError"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HierarchyRequest(_) => "HierarchyRequestError",
            Self::NotFound(_) => "NotFoundError",
            Self::WrongDocument => "WrongDocumentError",
            Self::Namespace(_) => "NamespaceError",
            Self::InvalidCharacter(_) => "InvalidCharacterError",
            Self::NotSupported(_) => "NotSupportedError",
            Self::InvalidNodeType(_) => "InvalidNodeTypeError",
        }
    }

    /// The legacy numeric code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::HierarchyRequest(_) => 3,
            Self::WrongDocument => 4,
            Self::InvalidCharacter(_) => 5,
            Self::NotFound(_) => 8,
            Self::NotSupported(_) => 9,
            Self::Namespace(_) => 14,
            Self::InvalidNodeType(_) => 24,
        }
    }
}
