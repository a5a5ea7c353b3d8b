//! Element tree model.
//!
//! Each element owns its element children plus two pieces of text: `text`
//! (before the first child) and `tail` (after its own end tag, inside the
//! parent). Namespaced names use Clark notation, `{uri}local`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use xml_search_traits::error::{Error, Result};
use xml_search_traits::read_document;

/// One element and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attrib: BTreeMap<String, String>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = clark_name(node.tag_name().namespace(), node.tag_name().name());
        let attrib = node
            .attributes()
            .map(|attr| {
                (
                    clark_name(attr.namespace(), attr.name()),
                    attr.value().to_string(),
                )
            })
            .collect();
        let children = node
            .children()
            .filter(|child| child.is_element())
            .map(Element::from_node)
            .collect();

        Self {
            tag,
            attrib,
            text: text_run(node.children()),
            tail: text_run(std::iter::successors(node.next_sibling(), |n| n.next_sibling())),
            children,
        }
    }

    /// Tag with any `{uri}` prefix removed
    pub fn local_name(&self) -> &str {
        strip_namespace(&self.tag)
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attrib.get(attribute).map(String::as_str)
    }

    /// This element and all of its descendants in document order
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Concatenated text of this element and every descendant
    pub fn itertext(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.push_text(out);
            if let Some(tail) = &child.tail {
                out.push_str(tail);
            }
        }
    }
}

/// Pre-order iterator returned by [`Element::iter`]
pub struct Iter<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// A parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTree {
    root: Element,
}

impl ElementTree {
    /// Parse XML text. A DOCTYPE is allowed and its internal entities are expanded.
    pub fn parse_str(xml: &str) -> Result<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document = roxmltree::Document::parse_with_options(xml, options)
            .map_err(|e| Error::malformed(e.to_string()))?;
        Ok(Self {
            root: Element::from_node(document.root_element()),
        })
    }

    pub fn parse_file(file: &Path) -> Result<Self> {
        let content = read_document(file)?;
        let tree = Self::parse_str(&content)?;
        tracing::debug!(file = %file.display(), bytes = content.len(), "parsed element tree");
        Ok(tree)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

/// Text nodes up to the next element, joined. Comments and processing
/// instructions are skipped; `None` when there is no text at all.
fn text_run<'a, 'input: 'a>(
    nodes: impl Iterator<Item = roxmltree::Node<'a, 'input>>,
) -> Option<String> {
    let mut run: Option<String> = None;
    for node in nodes.take_while(|node| !node.is_element()) {
        if let Some(text) = node.text().filter(|_| node.is_text()) {
            run.get_or_insert_with(String::new).push_str(text);
        }
    }
    run
}

/// `{uri}local` becomes `local`; anything else is returned unchanged
pub fn strip_namespace(tag: &str) -> &str {
    match tag.split_once('}') {
        Some((_, local)) => local,
        None => tag,
    }
}

fn clark_name(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(uri) if !uri.is_empty() => format!("{{{}}}{}", uri, local),
        _ => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_tail_follow_element_tree_rules() {
        let tree = ElementTree::parse_str("<a>one<b>two</b>three<c/>four</a>").unwrap();
        let root = tree.root();
        assert_eq!(root.text.as_deref(), Some("one"));
        assert_eq!(root.children[0].text.as_deref(), Some("two"));
        assert_eq!(root.children[0].tail.as_deref(), Some("three"));
        assert_eq!(root.children[1].text, None);
        assert_eq!(root.children[1].tail.as_deref(), Some("four"));
        assert_eq!(root.itertext(), "onetwothreefour");
    }

    #[test]
    fn comments_and_instructions_do_not_split_text() {
        let tree =
            ElementTree::parse_str("<a><!-- c -->cat<?pi x?>s<b/>x<!-- d -->y<c/></a>").unwrap();
        let root = tree.root();
        assert_eq!(root.text.as_deref(), Some("cats"));
        assert_eq!(root.children[0].tail.as_deref(), Some("xy"));
        assert_eq!(root.children[1].tail, None);
    }

    #[test]
    fn doctype_entities_are_expanded() {
        let tree = ElementTree::parse_str(
            r#"<!DOCTYPE a [<!ENTITY pub "Acme">]><a owner="&pub;">&pub; Press</a>"#,
        )
        .unwrap();
        assert_eq!(tree.root().text.as_deref(), Some("Acme Press"));
        assert_eq!(tree.root().get("owner"), Some("Acme"));
    }

    #[test]
    fn namespaced_names_use_clark_notation() {
        let tree = ElementTree::parse_str(
            r#"<p:root xmlns:p="urn:p" xmlns="urn:d"><item p:id="1" plain="2"/></p:root>"#,
        )
        .unwrap();
        let root = tree.root();
        assert_eq!(root.tag, "{urn:p}root");
        assert_eq!(root.local_name(), "root");
        let item = &root.children[0];
        assert_eq!(item.tag, "{urn:d}item");
        assert_eq!(item.get("{urn:p}id"), Some("1"));
        assert_eq!(item.get("plain"), Some("2"));
        assert_eq!(root.attrib.len(), 0);
    }

    #[test]
    fn iter_is_preorder() {
        let tree = ElementTree::parse_str("<a><b><c/></b><d/></a>").unwrap();
        let tags: Vec<&str> = tree.root().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn strip_namespace_only_touches_clark_names() {
        assert_eq!(strip_namespace("{urn:x}item"), "item");
        assert_eq!(strip_namespace("x:item"), "x:item");
        assert_eq!(strip_namespace("item"), "item");
    }
}
