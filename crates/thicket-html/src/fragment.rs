//! [§ 13.2.9 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)

use thicket_dom::{Attr, Document, DomException, DomResult, HtmlTag, Namespace, NodeId, QuirksMode};

use crate::driver::{Parser, ParserOptions};
use crate::tokenizer::TokenizerState;

/// The context element a fragment is parsed in.
///
/// The element itself is recreated inside the fragment's own document, so
/// only its name, attributes, and its document's quirks mode are needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    /// Local name, e.g. `"td"`.
    pub local_name: String,
    /// Namespace of the context element.
    pub namespace: Namespace,
    /// Attributes, consulted for `annotation-xml` integration points.
    pub attributes: Vec<Attr>,
    /// Quirks mode of the context element's node document.
    pub quirks_mode: QuirksMode,
    /// The context element is a `form` or sits inside one. Seeds the form
    /// element pointer, so the fragment cannot open a nested form.
    pub form_ancestor: bool,
}

impl FragmentContext {
    /// An HTML context element with no attributes, in a no-quirks document.
    #[must_use]
    pub fn html(local_name: &str) -> Self {
        Self::new(local_name, Namespace::Html)
    }

    /// A context element in `namespace`.
    #[must_use]
    pub fn new(local_name: &str, namespace: Namespace) -> Self {
        Self {
            local_name: local_name.to_string(),
            namespace,
            attributes: Vec::new(),
            quirks_mode: QuirksMode::NoQuirks,
            form_ancestor: false,
        }
    }

    /// Add an attribute to the context element.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attr::new(name, value));
        self
    }

    /// Set the quirks mode of the context's document.
    #[must_use]
    pub const fn with_quirks_mode(mut self, quirks_mode: QuirksMode) -> Self {
        self.quirks_mode = quirks_mode;
        self
    }

    /// Mark the context element as having a `form` ancestor.
    #[must_use]
    pub const fn with_form_ancestor(mut self) -> Self {
        self.form_ancestor = true;
        self
    }

    /// Describe an existing element as a fragment context.
    ///
    /// # Errors
    ///
    /// `NotFoundError` if `element` is not an element of `document`.
    pub fn from_element(document: &Document, element: NodeId) -> DomResult<Self> {
        let data = document
            .as_element(element)
            .ok_or(DomException::NotFound("context is not an element"))?;
        Ok(Self {
            local_name: data.local_name().to_string(),
            namespace: data.namespace().clone(),
            attributes: data.attrs().iter().cloned().collect(),
            quirks_mode: document.quirks_mode(),
            form_ancestor: std::iter::once(element)
                .chain(document.ancestors(element))
                .any(|id| document.is_html_element(id, HtmlTag::Form)),
        })
    }

    /// STEP 5 of the fragment parsing algorithm: the tokenizer state implied
    /// by an HTML context element, if it is not the data state.
    pub(crate) fn initial_tokenizer_state(&self, scripting_enabled: bool) -> Option<TokenizerState> {
        if self.namespace != Namespace::Html {
            return None;
        }
        match HtmlTag::from_local_name(&self.local_name)? {
            // "title, textarea: Switch the tokenizer to the RCDATA state."
            HtmlTag::Title | HtmlTag::Textarea => Some(TokenizerState::RCDATA),
            // "style, xmp, iframe, noembed, noframes: Switch the tokenizer
            //  to the RAWTEXT state."
            HtmlTag::Style
            | HtmlTag::Xmp
            | HtmlTag::Iframe
            | HtmlTag::Noembed
            | HtmlTag::Noframes => Some(TokenizerState::RAWTEXT),
            // "noscript: If the scripting flag is enabled, switch the
            //  tokenizer to the RAWTEXT state."
            HtmlTag::Noscript if scripting_enabled => Some(TokenizerState::RAWTEXT),
            // "script: Switch the tokenizer to the script data state."
            HtmlTag::Script => Some(TokenizerState::ScriptData),
            // "plaintext: Switch the tokenizer to the PLAINTEXT state."
            HtmlTag::Plaintext => Some(TokenizerState::PLAINTEXT),
            _ => None,
        }
    }
}

/// [§ 8.4 innerHTML setter](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml)
///
/// Parse `html` with `element` as the fragment context and replace the
/// element's children with the result. For a `template` element the
/// template contents are replaced instead.
///
/// # Errors
///
/// `NotFoundError` if `element` is not an element of `document`.
pub fn set_inner_html(
    document: &mut Document,
    element: NodeId,
    html: &str,
    options: ParserOptions,
) -> DomResult<()> {
    let context = FragmentContext::from_element(document, element)?;

    // "Let context be this. If context is a template element, then set
    //  context to the template element's template contents."
    let target = document
        .as_element(element)
        .and_then(|data| data.template_contents())
        .unwrap_or(element);

    let mut parser = Parser::new(document.address(), Some(context), options);
    parser.parse(html, true);
    let children = parser.fragment_children();
    let fragment = parser.into_document();

    // "Replace all with fragment within context."
    let imported = children
        .into_iter()
        .map(|child| document.import_node(&fragment, child, true))
        .collect::<DomResult<Vec<_>>>()?;

    for old in document.children(target).to_vec() {
        let _ = document.remove_child(target, old)?;
    }
    for node in imported {
        let _ = document.append_child(target, node)?;
    }
    Ok(())
}
