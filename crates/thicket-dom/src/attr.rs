//! Attribute storage and the element attribute API.
//!
//! [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
//!
//! Attributes are indexed twice: by `(namespace, local name)`, which is
//! unique per element, and by qualified name, which is not (`xlink:href`
//! and `foo:href` in two namespaces can share a local name, and two
//! attributes in different namespaces can share a qualified name). Both
//! indices are updated together on every add and remove.

use std::collections::HashMap;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::document::Document;
use crate::element::{ElementData, Namespace, QualName};
use crate::error::{DomException, DomResult};
use crate::mutation::MutationEvent;
use crate::node::NodeId;
use crate::validate::{is_valid_attribute_name, validate_and_extract};

/// "Attributes have a namespace, namespace prefix, local name, value, and
/// element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Namespace, prefix, and local name.
    pub name: QualName,
    /// Attribute value.
    pub value: String,
}

impl Attr {
    /// A null-namespace attribute.
    #[must_use]
    pub fn new(local: &str, value: &str) -> Self {
        Self {
            name: QualName::new(None, Namespace::None, local),
            value: value.to_string(),
        }
    }

    /// [§ 4.9.2](https://dom.spec.whatwg.org/#concept-attribute-qualified-name)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.name.qualified().into_owned()
    }

    fn key(&self) -> AttrKey {
        (self.name.ns.clone(), self.name.local.clone())
    }
}

type AttrKey = (Namespace, String);

/// An element's attribute list, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct AttributeList {
    by_key: IndexMap<AttrKey, Attr>,
    by_qname: HashMap<String, SmallVec<[AttrKey; 1]>>,
}

impl AttributeList {
    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// True if the element has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.by_key.values()
    }

    /// "get an attribute by name": the first attribute whose qualified name
    /// is `qname`.
    #[must_use]
    pub fn get_attr(&self, qname: &str) -> Option<&Attr> {
        let key = self.by_qname.get(qname)?.first()?;
        self.by_key.get(key)
    }

    /// Value of the first attribute whose qualified name is `qname`.
    #[must_use]
    pub fn get(&self, qname: &str) -> Option<&str> {
        self.get_attr(qname).map(|attr| attr.value.as_str())
    }

    /// "get an attribute by namespace and local name"
    #[must_use]
    pub fn get_ns(&self, ns: &Namespace, local: &str) -> Option<&str> {
        self.by_key
            .get(&(ns.clone(), local.to_string()))
            .map(|attr| attr.value.as_str())
    }

    /// All attributes sharing a qualified name, one per namespace.
    #[must_use]
    pub fn all_named(&self, qname: &str) -> Vec<&Attr> {
        self.by_qname
            .get(qname)
            .map(|keys| keys.iter().filter_map(|key| self.by_key.get(key)).collect())
            .unwrap_or_default()
    }

    /// True if an attribute with this qualified name exists.
    #[must_use]
    pub fn contains(&self, qname: &str) -> bool {
        self.by_qname.contains_key(qname)
    }

    /// Same attributes, compared as a set of (namespace, local name, value).
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .by_key
                .iter()
                .all(|(key, attr)| other.by_key.get(key).is_some_and(|o| o.value == attr.value))
    }

    /// Add `attr`, or change the value of the existing attribute with the same
    /// namespace and local name. Returns the previous value.
    pub(crate) fn set(&mut self, attr: Attr) -> Option<String> {
        let key = attr.key();
        if let Some(existing) = self.by_key.get_mut(&key) {
            return Some(std::mem::replace(&mut existing.value, attr.value));
        }
        self.by_qname
            .entry(attr.qualified_name())
            .or_default()
            .push(key.clone());
        let _ = self.by_key.insert(key, attr);
        None
    }

    fn remove_key(&mut self, key: &AttrKey) -> Option<Attr> {
        let attr = self.by_key.shift_remove(key)?;
        let qname = attr.qualified_name();
        if let Some(keys) = self.by_qname.get_mut(&qname) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                let _ = self.by_qname.remove(&qname);
            }
        }
        Some(attr)
    }

    /// Remove the first attribute with this qualified name.
    pub(crate) fn remove_named(&mut self, qname: &str) -> Option<Attr> {
        let key = self.by_qname.get(qname)?.first()?.clone();
        self.remove_key(&key)
    }

    /// Remove the attribute with this namespace and local name.
    pub(crate) fn remove_ns(&mut self, ns: &Namespace, local: &str) -> Option<Attr> {
        self.remove_key(&(ns.clone(), local.to_string()))
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attr;
    type IntoIter = indexmap::map::Values<'a, AttrKey, Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_key.values()
    }
}

// =============================================================================
// Element attribute API
// =============================================================================

impl Document {
    fn element_data(&self, element: NodeId) -> DomResult<&ElementData> {
        self.check_owned(element)?;
        self.as_element(element)
            .ok_or(DomException::InvalidNodeType("not an element"))
    }

    fn element_data_mut(&mut self, element: NodeId) -> DomResult<&mut ElementData> {
        self.check_owned(element)?;
        self.as_element_mut(element)
            .ok_or(DomException::InvalidNodeType("not an element"))
    }

    /// HTML elements in HTML documents match attribute names in lowercase.
    fn fold_attribute_name(data: &ElementData, qname: &str) -> String {
        if data.is_html() {
            qname.to_ascii_lowercase()
        } else {
            qname.to_string()
        }
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-getattribute)
    #[must_use]
    pub fn get_attribute(&self, element: NodeId, qname: &str) -> Option<&str> {
        let data = self.element_data(element).ok()?;
        data.attrs.get(&Self::fold_attribute_name(data, qname))
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-getattributens)
    #[must_use]
    pub fn get_attribute_ns(&self, element: NodeId, ns: Option<&str>, local: &str) -> Option<&str> {
        let data = self.element_data(element).ok()?;
        data.attrs.get_ns(&Namespace::from_url(ns), local)
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-hasattribute)
    #[must_use]
    pub fn has_attribute(&self, element: NodeId, qname: &str) -> bool {
        self.get_attribute(element, qname).is_some()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-getattributenames)
    #[must_use]
    pub fn attribute_names(&self, element: NodeId) -> Vec<String> {
        self.element_data(element)
            .map(|data| data.attrs.iter().map(Attr::qualified_name).collect())
            .unwrap_or_default()
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// # Errors
    ///
    /// `InvalidCharacterError` if `qname` is not a valid attribute name,
    /// `InvalidNodeTypeError` if `element` is not an element.
    pub fn set_attribute(&mut self, element: NodeId, qname: &str, value: &str) -> DomResult<()> {
        // STEP 1: "If qualifiedName is not a valid attribute local name, then
        //          throw an "InvalidCharacterError" DOMException."
        if !is_valid_attribute_name(qname) {
            return Err(DomException::InvalidCharacter(qname.to_string()));
        }

        // STEP 2: "If this is in the HTML namespace and its node document is an
        //          HTML document, then set qualifiedName to qualifiedName in ASCII
        //          lowercase."
        let data = self.element_data(element)?;
        let qname = Self::fold_attribute_name(data, qname);

        // STEP 3: "Let attribute be the first attribute in this's attribute list
        //          whose qualified name is qualifiedName, and null otherwise."
        // STEP 4: "If attribute is null, create an attribute whose local name is
        //          qualifiedName, value is value..."
        // STEP 5: "Change attribute to value."
        let attr = match data.attrs.get_attr(&qname) {
            Some(existing) => Attr {
                name: existing.name.clone(),
                value: value.to_string(),
            },
            None => Attr::new(&qname, value),
        };
        self.store_attribute(element, attr);
        Ok(())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-setattributens)
    ///
    /// # Errors
    ///
    /// `InvalidCharacterError` or `NamespaceError` from "validate and
    /// extract", `InvalidNodeTypeError` if `element` is not an element.
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        ns: Option<&str>,
        qname: &str,
        value: &str,
    ) -> DomResult<()> {
        // STEP 1: "Let namespace, prefix, and localName be the result of passing
        //          namespace and qualifiedName to validate and extract."
        let name = validate_and_extract(ns, qname)?;
        let _ = self.element_data(element)?;

        // STEP 2: "Set an attribute value for this using localName, value, and
        //          also prefix and namespace."
        self.store_attribute(
            element,
            Attr {
                name,
                value: value.to_string(),
            },
        );
        Ok(())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    ///
    /// Returns whether an attribute was removed.
    ///
    /// # Errors
    ///
    /// `InvalidNodeTypeError` if `element` is not an element.
    pub fn remove_attribute(&mut self, element: NodeId, qname: &str) -> DomResult<bool> {
        let data = self.element_data_mut(element)?;
        let qname = Self::fold_attribute_name(data, qname);
        let removed = data.attrs.remove_named(&qname);
        Ok(self.attribute_removed(element, removed))
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-removeattributens)
    ///
    /// # Errors
    ///
    /// `InvalidNodeTypeError` if `element` is not an element.
    pub fn remove_attribute_ns(
        &mut self,
        element: NodeId,
        ns: Option<&str>,
        local: &str,
    ) -> DomResult<bool> {
        let data = self.element_data_mut(element)?;
        let removed = data.attrs.remove_ns(&Namespace::from_url(ns), local);
        Ok(self.attribute_removed(element, removed))
    }

    /// Add `attr` unless the element already has an attribute with the same
    /// namespace and local name. Used when the parser merges the attributes
    /// of a repeated `<html>` or `<body>` start tag.
    ///
    /// Returns whether the attribute was added.
    pub fn add_attribute_if_missing(&mut self, element: NodeId, attr: Attr) -> bool {
        let present = self
            .as_element(element)
            .is_none_or(|data| data.attrs.get_ns(&attr.name.ns, &attr.name.local).is_some());
        if present {
            return false;
        }
        self.store_attribute(element, attr);
        true
    }

    /// Write `attr` into the element's list and run the change steps: id
    /// index maintenance, modification stamping, and the ATTR event.
    fn store_attribute(&mut self, element: NodeId, attr: Attr) {
        let is_id = attr.name.ns == Namespace::None && attr.name.local == "id";
        let qname = attr.qualified_name();
        let value = attr.value.clone();
        let Some(data) = self.as_element_mut(element) else {
            return;
        };
        let old = data.attrs.set(attr);

        if is_id && self.is_rooted(element) {
            if let Some(old) = old.as_deref() {
                self.id_index_remove(old, element);
            }
            self.id_index_add(&value, element);
        }
        self.modify(element);
        if self.is_rooted(element) {
            self.notify(&MutationEvent::Attr {
                target: element,
                name: qname,
                value,
            });
        }
    }

    fn attribute_removed(&mut self, element: NodeId, removed: Option<Attr>) -> bool {
        let Some(attr) = removed else {
            return false;
        };
        if attr.name.ns == Namespace::None && attr.name.local == "id" && self.is_rooted(element) {
            self.id_index_remove(&attr.value, element);
        }
        self.modify(element);
        if self.is_rooted(element) {
            self.notify(&MutationEvent::RemoveAttr {
                target: element,
                name: attr.qualified_name(),
            });
        }
        true
    }
}
