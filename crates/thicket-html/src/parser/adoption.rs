//! Mis-nested formatting elements.
//!
//! [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
//! [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)

use thicket_dom::{ElementData, HtmlTag, Namespace, NodeId};

use super::core::{InsertionPoint, TreeBuilder};
use super::formatting::FormattingEntry;
use super::stack::Scope;

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
#[must_use]
pub fn is_special(element: &ElementData) -> bool {
    match element.namespace() {
        Namespace::Html => element.html_tag().is_some_and(|tag| {
            matches!(
                tag,
                HtmlTag::Address
                    | HtmlTag::Applet
                    | HtmlTag::Area
                    | HtmlTag::Article
                    | HtmlTag::Aside
                    | HtmlTag::Base
                    | HtmlTag::Basefont
                    | HtmlTag::Bgsound
                    | HtmlTag::Blockquote
                    | HtmlTag::Body
                    | HtmlTag::Br
                    | HtmlTag::Button
                    | HtmlTag::Caption
                    | HtmlTag::Center
                    | HtmlTag::Col
                    | HtmlTag::Colgroup
                    | HtmlTag::Dd
                    | HtmlTag::Details
                    | HtmlTag::Dir
                    | HtmlTag::Div
                    | HtmlTag::Dl
                    | HtmlTag::Dt
                    | HtmlTag::Embed
                    | HtmlTag::Fieldset
                    | HtmlTag::Figcaption
                    | HtmlTag::Figure
                    | HtmlTag::Footer
                    | HtmlTag::Form
                    | HtmlTag::Frame
                    | HtmlTag::Frameset
                    | HtmlTag::H1
                    | HtmlTag::H2
                    | HtmlTag::H3
                    | HtmlTag::H4
                    | HtmlTag::H5
                    | HtmlTag::H6
                    | HtmlTag::Head
                    | HtmlTag::Header
                    | HtmlTag::Hgroup
                    | HtmlTag::Hr
                    | HtmlTag::Html
                    | HtmlTag::Iframe
                    | HtmlTag::Img
                    | HtmlTag::Input
                    | HtmlTag::Keygen
                    | HtmlTag::Li
                    | HtmlTag::Link
                    | HtmlTag::Listing
                    | HtmlTag::Main
                    | HtmlTag::Marquee
                    | HtmlTag::Menu
                    | HtmlTag::Meta
                    | HtmlTag::Nav
                    | HtmlTag::Noembed
                    | HtmlTag::Noframes
                    | HtmlTag::Noscript
                    | HtmlTag::Object
                    | HtmlTag::Ol
                    | HtmlTag::P
                    | HtmlTag::Param
                    | HtmlTag::Plaintext
                    | HtmlTag::Pre
                    | HtmlTag::Script
                    | HtmlTag::Search
                    | HtmlTag::Section
                    | HtmlTag::Select
                    | HtmlTag::Source
                    | HtmlTag::Style
                    | HtmlTag::Summary
                    | HtmlTag::Table
                    | HtmlTag::Tbody
                    | HtmlTag::Td
                    | HtmlTag::Template
                    | HtmlTag::Textarea
                    | HtmlTag::Tfoot
                    | HtmlTag::Th
                    | HtmlTag::Thead
                    | HtmlTag::Title
                    | HtmlTag::Tr
                    | HtmlTag::Track
                    | HtmlTag::Ul
                    | HtmlTag::Wbr
                    | HtmlTag::Xmp
            )
        }),
        Namespace::MathMl => matches!(
            element.local_name(),
            "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
        ),
        Namespace::Svg => matches!(element.local_name(), "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small,
/// strike, strong, tt, and u."
#[must_use]
pub const fn is_formatting(tag: HtmlTag) -> bool {
    matches!(
        tag,
        HtmlTag::A
            | HtmlTag::B
            | HtmlTag::Big
            | HtmlTag::Code
            | HtmlTag::Em
            | HtmlTag::Font
            | HtmlTag::I
            | HtmlTag::Nobr
            | HtmlTag::S
            | HtmlTag::Small
            | HtmlTag::Strike
            | HtmlTag::Strong
            | HtmlTag::Tt
            | HtmlTag::U
    )
}

impl TreeBuilder {
    fn is_special_node(&self, id: NodeId) -> bool {
        self.document.as_element(id).is_some_and(is_special)
    }

    /// Create a fresh element for a formatting list entry, from the
    /// attributes snapshotted when it was pushed.
    fn clone_formatting_entry(&mut self, index: usize) -> Option<NodeId> {
        let (tag, attributes) = match self.active_formatting_elements.get(index)? {
            FormattingEntry::Element { tag, attributes, .. } => (*tag, attributes.clone()),
            FormattingEntry::Marker => return None,
        };
        Some(self.create_element_for_token(tag.as_str(), &attributes, Namespace::Html))
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        let Some(last) = self.active_formatting_elements.len().checked_sub(1) else {
            return;
        };

        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there
        //          is nothing to reconstruct; stop this algorithm."
        let is_open = |builder: &Self, index: usize| match builder.active_formatting_elements.get(index) {
            Some(FormattingEntry::Element { node, .. }) => builder.open_elements.contains(*node),
            _ => true,
        };
        if is_open(self, last) {
            return;
        }

        // STEP 3-6: "Rewind: If there are no entries before entry in the list
        //            of active formatting elements, then jump to the step
        //            labeled create. Let entry be the entry one earlier than
        //            entry in the list of active formatting elements. If entry
        //            is neither a marker nor an element that is also in the
        //            stack of open elements, go to the step labeled rewind.
        //            Advance: Let entry be the element one later than entry in
        //            the list of active formatting elements."
        let mut index = last;
        while index > 0 && !is_open(self, index - 1) {
            index -= 1;
        }

        // STEP 7-10: "Create: Insert an HTML element for the token for which
        //             the element entry was created, to obtain new element.
        //             Replace the entry for entry in the list with an entry for
        //             new element. If the entry for new element in the list of
        //             active formatting elements is not the last entry in the
        //             list, return to the step labeled advance."
        for entry_index in index..=last {
            let Some(element) = self.clone_formatting_entry(entry_index) else {
                continue;
            };
            let point = self.appropriate_place(None);
            self.insert_at(point, element);
            self.open_elements.push(element);
            self.active_formatting_elements
                .replace_node(entry_index, element);
        }
    }

    /// [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Returns `false` when the caller must "act as described in the "any
    /// other end tag" entry" instead.
    pub(super) fn run_adoption_agency(&mut self, subject: HtmlTag) -> bool {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the
        //          stack of open elements and return."
        if let Some(current) = self.current_node()
            && self.document.is_html_element(current, subject)
            && !self.active_formatting_elements.contains(current)
        {
            self.pop_current_node();
            return true;
        }

        // STEP 3-4: "Let outer loop counter be 0. Outer loop: If outer loop
        //            counter is greater than or equal to 8, then return."
        for _ in 0..8 {
            // STEP 4.3: "Let formatting element be the last element in the
            //            list of active formatting elements that: is between
            //            the end of the list and the last marker in the list,
            //            if any, or the start of the list otherwise, and has
            //            the tag name subject. If there is no such element,
            //            then return and instead act as described in the "any
            //            other end tag" entry above."
            let Some((_, formatting_element)) =
                self.active_formatting_elements.last_after_marker(subject)
            else {
                return false;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_index) = self.open_elements.position(formatting_element) else {
                self.parse_error(&format!("adoption-agency-missing-element </{subject}>"));
                self.active_formatting_elements.remove(formatting_element);
                return true;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            //            elements, but the element is not in scope, then this
            //            is a parse error; return."
            if !self
                .open_elements
                .has_node_in_scope(&self.document, formatting_element, Scope::Default)
            {
                self.parse_error(&format!("adoption-agency-out-of-scope </{subject}>"));
                return true;
            }

            // STEP 4.6: "If formatting element is not the current node, this
            //            is a parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error(&format!("adoption-agency-misnested </{subject}>"));
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack
            //            of open elements that is lower in the stack than
            //            formatting element, and is an element in the special
            //            category. There might not be one."
            let furthest_block = (formatting_index + 1..self.open_elements.len())
                .filter_map(|index| self.open_elements.get(index))
                .find(|&id| self.is_special_node(id));

            // STEP 4.8: "If there is no furthest block, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formatting element, then remove formatting element
            //            from the list of active formatting elements, and
            //            finally return."
            let Some(furthest_block) = furthest_block else {
                self.open_elements.truncate(formatting_index);
                self.active_formatting_elements.remove(formatting_element);
                return true;
            };

            // STEP 4.9: "Let common ancestor be the element immediately above
            //            formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .and_then(|index| self.open_elements.get(index))
            else {
                return true;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting
            //             element in the list of active formatting elements
            //             relative to the elements on either side of it in the
            //             list."
            let mut bookmark = self
                .active_formatting_elements
                .position(formatting_element)
                .unwrap_or_default();

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_index = self
                .open_elements
                .position(furthest_block)
                .unwrap_or_default();
            let mut last_node = furthest_block;

            // STEP 4.12-13: "Let inner loop counter be 0. Inner loop:"
            let mut inner_loop_counter = 0;
            loop {
                // "Increment inner loop counter by 1."
                inner_loop_counter += 1;

                // "Let node be the element immediately above node in the stack
                //  of open elements, or if node is no longer in the stack of
                //  open elements (e.g. because it got removed by this
                //  algorithm), the element that was immediately above node in
                //  the stack of open elements before node was removed."
                node_index -= 1;
                let Some(node) = self.open_elements.get(node_index) else {
                    break;
                };

                // "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // "If inner loop counter is greater than 3 and node is in the
                //  list of active formatting elements, then remove node from
                //  the list of active formatting elements."
                if inner_loop_counter > 3
                    && let Some(position) = self.active_formatting_elements.position(node)
                {
                    self.active_formatting_elements.remove(node);
                    if position < bookmark {
                        bookmark -= 1;
                    }
                }

                // "If node is not in the list of active formatting elements,
                //  then remove node from the stack of open elements and
                //  continue."
                let Some(entry_index) = self.active_formatting_elements.position(node) else {
                    self.open_elements.remove_at(node_index);
                    continue;
                };

                // "Create an element for the token for which the element node
                //  was created, in the HTML namespace, with common ancestor as
                //  the intended parent; replace the entry for node in the list
                //  of active formatting elements with an entry for the new
                //  element, replace the entry for node in the stack of open
                //  elements with an entry for the new element, and let node be
                //  the new element."
                let Some(new_element) = self.clone_formatting_entry(entry_index) else {
                    break;
                };
                self.active_formatting_elements
                    .replace_node(entry_index, new_element);
                self.open_elements.replace(node, new_element);

                // "If last node is furthest block, then move the
                //  aforementioned bookmark to be immediately after the new node
                //  in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = entry_index + 1;
                }

                // "Append last node to node."
                self.append_to(new_element, last_node);

                // "Set last node to node."
                last_node = new_element;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            //             previous step at the appropriate place for inserting
            //             a node, but using common ancestor as the override
            //             target."
            let point: InsertionPoint = self.appropriate_place(Some(common_ancestor));
            self.insert_at(point, last_node);

            // STEP 4.15: "Create an element for the token for which formatting
            //             element was created, in the HTML namespace, with
            //             furthest block as the intended parent."
            let Some(formatting_entry) = self.active_formatting_elements.position(formatting_element)
            else {
                return true;
            };
            let Some(new_element) = self.clone_formatting_entry(formatting_entry) else {
                return true;
            };
            let Some(entry) = self.active_formatting_elements.get(formatting_entry).cloned() else {
                return true;
            };

            // STEP 4.16: "Take all of the child nodes of furthest block and
            //             append them to the element created in the last step."
            if let Err(err) = self.document.move_children(furthest_block, new_element) {
                log::debug!(target: "thicket::tree_builder", "adoption agency move rejected: {err}");
            }

            // STEP 4.17: "Append that new element to furthest block."
            self.append_to(furthest_block, new_element);

            // STEP 4.18: "Remove formatting element from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the
            //             position of the aforementioned bookmark."
            self.active_formatting_elements.remove(formatting_element);
            if formatting_entry < bookmark {
                bookmark -= 1;
            }
            let FormattingEntry::Element { tag, attributes, .. } = entry else {
                return true;
            };
            self.active_formatting_elements.insert(
                bookmark,
                FormattingEntry::Element {
                    node: new_element,
                    tag,
                    attributes,
                },
            );

            // STEP 4.19: "Remove formatting element from the stack of open
            //             elements, and insert the new element into the stack
            //             of open elements immediately below the position of
            //             furthest block in that stack."
            self.open_elements.remove(formatting_element);
            let below_furthest = self
                .open_elements
                .position(furthest_block)
                .map_or(self.open_elements.len(), |index| index + 1);
            self.open_elements.insert(below_furthest, new_element);
        }
        true
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag"
    pub(super) fn any_other_end_tag(&mut self, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        for index in (0..self.open_elements.len()).rev() {
            let Some(node) = self.open_elements.get(index) else {
                continue;
            };
            let matches_name = self
                .document
                .as_element(node)
                .is_some_and(|element| *element.namespace() == Namespace::Html && element.local_name() == name);

            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then: Generate implied end tags, except
            //          for HTML elements with the same tag name as the token.
            //          If node is not the current node, then this is a parse
            //          error. Pop all the nodes from the current node up to
            //          node, including node, then stop these steps."
            if matches_name {
                let except = HtmlTag::from_local_name(name);
                self.generate_implied_end_tags(except);
                if self.current_node() != Some(node) {
                    self.parse_error(&format!("end-tag-with-open-elements </{name}>"));
                }
                self.open_elements.pop_until_node(node);
                return;
            }

            // STEP 3: "Otherwise, if node is in the special category, then
            //          this is a parse error; ignore the token, and return."
            if self.is_special_node(node) {
                self.parse_error(&format!("unexpected-end-tag </{name}>"));
                return;
            }
            // STEP 4: "Set node to the previous entry in the stack of open
            //          elements."
        }
    }
}
