//! Element names, namespaces, and per-element data.
//!
//! [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
//!
//! Elements are distinguished by an [`ElementKind`] tag rather than by a
//! subclass: the tree builder's scope and stack tests match on
//! [`HtmlTag`] values.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::attr::AttributeList;
use crate::node::NodeId;

/// [§ 1.4 Namespaces](https://infra.spec.whatwg.org/#namespaces)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    /// The null namespace.
    #[default]
    None,
    /// "The HTML namespace is `http://www.w3.org/1999/xhtml`."
    Html,
    /// "The MathML namespace is `http://www.w3.org/1998/Math/MathML`."
    MathMl,
    /// "The SVG namespace is `http://www.w3.org/2000/svg`."
    Svg,
    /// "The XLink namespace is `http://www.w3.org/1999/xlink`."
    XLink,
    /// "The XML namespace is `http://www.w3.org/XML/1998/namespace`."
    Xml,
    /// "The XMLNS namespace is `http://www.w3.org/2000/xmlns/`."
    Xmlns,
    /// Any other namespace URL.
    Other(String),
}

impl Namespace {
    /// HTML namespace URL.
    pub const HTML_URL: &'static str = "http://www.w3.org/1999/xhtml";
    /// MathML namespace URL.
    pub const MATHML_URL: &'static str = "http://www.w3.org/1998/Math/MathML";
    /// SVG namespace URL.
    pub const SVG_URL: &'static str = "http://www.w3.org/2000/svg";
    /// XLink namespace URL.
    pub const XLINK_URL: &'static str = "http://www.w3.org/1999/xlink";
    /// XML namespace URL.
    pub const XML_URL: &'static str = "http://www.w3.org/XML/1998/namespace";
    /// XMLNS namespace URL.
    pub const XMLNS_URL: &'static str = "http://www.w3.org/2000/xmlns/";

    /// Map a namespace URL (or `None`/empty for the null namespace) to a value.
    #[must_use]
    pub fn from_url(url: Option<&str>) -> Self {
        match url {
            None | Some("") => Self::None,
            Some(Self::HTML_URL) => Self::Html,
            Some(Self::MATHML_URL) => Self::MathMl,
            Some(Self::SVG_URL) => Self::Svg,
            Some(Self::XLINK_URL) => Self::XLink,
            Some(Self::XML_URL) => Self::Xml,
            Some(Self::XMLNS_URL) => Self::Xmlns,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// The namespace URL, `None` for the null namespace.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Html => Some(Self::HTML_URL),
            Self::MathMl => Some(Self::MATHML_URL),
            Self::Svg => Some(Self::SVG_URL),
            Self::XLink => Some(Self::XLINK_URL),
            Self::Xml => Some(Self::XML_URL),
            Self::Xmlns => Some(Self::XMLNS_URL),
            Self::Other(url) => Some(url),
        }
    }
}

/// A qualified name: namespace, optional prefix, and local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    /// Namespace prefix, e.g. `xlink` in `xlink:href`.
    pub prefix: Option<String>,
    /// Namespace of the name.
    pub ns: Namespace,
    /// Local name.
    pub local: String,
}

impl QualName {
    /// Build a qualified name from its parts.
    #[must_use]
    pub fn new(prefix: Option<&str>, ns: Namespace, local: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            ns,
            local: local.to_string(),
        }
    }

    /// An HTML-namespace name without prefix.
    #[must_use]
    pub fn html(local: &str) -> Self {
        Self::new(None, Namespace::Html, local)
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#concept-element-qualified-name)
    /// "An element's qualified name is its local name if its namespace prefix
    /// is null; otherwise its namespace prefix, followed by ":", followed by
    /// its local name."
    #[must_use]
    pub fn qualified(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}:{}", self.local)),
            None => Cow::Borrowed(&self.local),
        }
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// Known HTML element local names.
///
/// Used wherever the parser or DOM needs to recognise an HTML element by
/// name. Elements with names outside this list still parse as HTML elements
/// with [`ElementKind::UnknownHtml`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum HtmlTag {
    A,
    Abbr,
    Address,
    Applet,
    Area,
    Article,
    Aside,
    Audio,
    B,
    Base,
    Basefont,
    Bdi,
    Bdo,
    Bgsound,
    Big,
    Blockquote,
    Body,
    Br,
    Button,
    Canvas,
    Caption,
    Center,
    Cite,
    Code,
    Col,
    Colgroup,
    Data,
    Datalist,
    Dd,
    Del,
    Details,
    Dfn,
    Dialog,
    Dir,
    Div,
    Dl,
    Dt,
    Em,
    Embed,
    Fieldset,
    Figcaption,
    Figure,
    Font,
    Footer,
    Form,
    Frame,
    Frameset,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Header,
    Hgroup,
    Hr,
    Html,
    I,
    Iframe,
    Image,
    Img,
    Input,
    Ins,
    Kbd,
    Keygen,
    Label,
    Legend,
    Li,
    Link,
    Listing,
    Main,
    Map,
    Mark,
    Marquee,
    Menu,
    Meta,
    Meter,
    Nav,
    Nobr,
    Noembed,
    Noframes,
    Noscript,
    Object,
    Ol,
    Optgroup,
    #[strum(serialize = "option")]
    OptionElement,
    Output,
    P,
    Param,
    Picture,
    Plaintext,
    Pre,
    Progress,
    Q,
    Rb,
    Rp,
    Rt,
    Rtc,
    Ruby,
    S,
    Samp,
    Script,
    Search,
    Section,
    Select,
    Slot,
    Small,
    Source,
    Span,
    Strike,
    Strong,
    Style,
    Sub,
    Summary,
    Sup,
    Table,
    Tbody,
    Td,
    Template,
    Textarea,
    Tfoot,
    Th,
    Thead,
    Time,
    Title,
    Tr,
    Track,
    Tt,
    U,
    Ul,
    Var,
    Video,
    Wbr,
    Xmp,
}

impl HtmlTag {
    /// Look up a (lowercase) local name.
    #[must_use]
    pub fn from_local_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// The element's local name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
    #[must_use]
    pub const fn is_void(self) -> bool {
        matches!(
            self,
            Self::Area
                | Self::Base
                | Self::Basefont
                | Self::Bgsound
                | Self::Br
                | Self::Col
                | Self::Embed
                | Self::Frame
                | Self::Hr
                | Self::Img
                | Self::Input
                | Self::Keygen
                | Self::Link
                | Self::Meta
                | Self::Param
                | Self::Source
                | Self::Track
                | Self::Wbr
        )
    }

    /// `h1` through `h6`.
    #[must_use]
    pub const fn is_heading(self) -> bool {
        matches!(
            self,
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6
        )
    }
}

/// What kind of element a node is, decided once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// An HTML-namespace element with a known tag name.
    Html(HtmlTag),
    /// An HTML-namespace element with any other name (custom elements etc.).
    UnknownHtml,
    /// An SVG-namespace element.
    Svg,
    /// A MathML-namespace element.
    MathMl,
    /// An element in any other namespace.
    Other,
}

impl ElementKind {
    /// Classify an element name.
    #[must_use]
    pub fn classify(name: &QualName) -> Self {
        match name.ns {
            Namespace::Html => {
                HtmlTag::from_local_name(&name.local).map_or(Self::UnknownHtml, Self::Html)
            }
            Namespace::Svg => Self::Svg,
            Namespace::MathMl => Self::MathMl,
            _ => Self::Other,
        }
    }
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name..."
#[derive(Debug, Clone)]
pub struct ElementData {
    pub(crate) name: QualName,
    pub(crate) kind: ElementKind,
    /// HTML-namespace element in an HTML document. Controls case folding of
    /// `tag_name` and of attribute names passed to the attribute API.
    pub(crate) is_html: bool,
    pub(crate) attrs: AttributeList,
    /// [§ 4.12.3 The template element](https://html.spec.whatwg.org/multipage/scripting.html#template-contents)
    pub(crate) template_contents: Option<NodeId>,
}

impl ElementData {
    pub(crate) fn new(name: QualName, is_html_document: bool) -> Self {
        let kind = ElementKind::classify(&name);
        let is_html = is_html_document && name.ns == Namespace::Html;
        Self {
            name,
            kind,
            is_html,
            attrs: AttributeList::default(),
            template_contents: None,
        }
    }

    /// The element's qualified name parts.
    #[must_use]
    pub const fn name(&self) -> &QualName {
        &self.name
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-localname)
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-namespaceuri)
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.name.ns
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-prefix)
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.name.prefix.as_deref()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-tagname)
    /// "If this is in the HTML namespace and its node document is an HTML
    /// document, then set qualifiedName to qualifiedName in ASCII uppercase."
    #[must_use]
    pub fn tag_name(&self) -> String {
        let qualified = self.name.qualified();
        if self.is_html {
            qualified.to_ascii_uppercase()
        } else {
            qualified.into_owned()
        }
    }

    /// The element kind tag.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The HTML tag, for known HTML-namespace elements.
    #[must_use]
    pub const fn html_tag(&self) -> Option<HtmlTag> {
        match self.kind {
            ElementKind::Html(tag) => Some(tag),
            _ => None,
        }
    }

    /// HTML-namespace element in an HTML document.
    #[must_use]
    pub const fn is_html(&self) -> bool {
        self.is_html
    }

    /// True if the element has the given namespace and local name.
    #[must_use]
    pub fn is(&self, ns: &Namespace, local: &str) -> bool {
        self.name.ns == *ns && self.name.local == local
    }

    /// The element's attribute list.
    #[must_use]
    pub const fn attrs(&self) -> &AttributeList {
        &self.attrs
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get_ns(&Namespace::None, "id")
    }

    /// Returns the set of class names from the class attribute.
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attrs
            .get_ns(&Namespace::None, "class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// The content fragment of a `template` element.
    #[must_use]
    pub const fn template_contents(&self) -> Option<NodeId> {
        self.template_contents
    }
}
