//! Read-only view over a document parsed with xot

use std::collections::BTreeMap;
use std::path::Path;

use xml_search_traits::error::{Error, Result};
use xml_search_traits::{read_document, strip_doctype};
use xot::{Node, Xot};

/// A parsed document together with the arena that owns its nodes
#[derive(Debug)]
pub struct DomTree {
    xot: Xot,
    root: Node,
}

impl DomTree {
    /// Parse XML text into a tree. xot has no DTD support, so a DOCTYPE is
    /// dropped first and its internal entities expanded.
    pub fn parse_str(xml: &str) -> Result<Self> {
        let xml = strip_doctype(xml)?;
        let mut xot = Xot::new();
        let document = xot
            .parse(&xml)
            .map_err(|e| Error::malformed(e.to_string()))?;
        let root = xot
            .children(document)
            .find(|node| xot.is_element(*node))
            .ok_or_else(|| Error::malformed("no element found"))?;
        Ok(Self { xot, root })
    }

    /// Read and parse a file
    pub fn parse_file(file: &Path) -> Result<Self> {
        let content = read_document(file)?;
        let tree = Self::parse_str(&content)?;
        tracing::debug!(file = %file.display(), bytes = content.len(), "parsed xot tree");
        Ok(tree)
    }

    /// The document element
    pub fn document_element(&self) -> Node {
        self.root
    }

    /// Element children only; text, comments and processing instructions are skipped
    pub fn child_elements(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.xot
            .children(node)
            .filter(move |child| self.xot.is_element(*child))
    }

    /// Local name of an element, `None` for every other node kind
    pub fn tag(&self, node: Node) -> Option<&str> {
        self.xot
            .element(node)
            .map(|element| self.xot.local_name_str(element.name()))
    }

    /// Attributes keyed by `{uri}local` when namespaced, by plain name otherwise.
    /// Namespace declarations are not attributes here.
    pub fn attributes(&self, node: Node) -> BTreeMap<String, String> {
        self.xot
            .attributes(node)
            .iter()
            .map(|(name, value)| {
                let (local, namespace) = self.xot.name_ns_str(name.to_owned());
                let key = if namespace.is_empty() {
                    local.to_string()
                } else {
                    format!("{{{}}}{}", namespace, local)
                };
                (key, value.to_string())
            })
            .collect()
    }

    /// Value of one attribute, looked up by its key in [`DomTree::attributes`]
    pub fn attribute(&self, node: Node, name: &str) -> Option<String> {
        self.attributes(node).remove(name)
    }

    /// Concatenation of the immediate text children, untrimmed
    pub fn direct_text(&self, node: Node) -> String {
        let mut text = String::new();
        for child in self.xot.children(node) {
            if let xot::Value::Text(value) = self.xot.value(child) {
                text.push_str(value.get());
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_walk() {
        let tree = DomTree::parse_str("<root a='1'>x<!--c--><item>t</item>y</root>").unwrap();
        let root = tree.document_element();
        assert_eq!(tree.tag(root), Some("root"));
        assert_eq!(tree.attribute(root, "a").as_deref(), Some("1"));

        let children: Vec<_> = tree.child_elements(root).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.tag(children[0]), Some("item"));
        assert_eq!(tree.direct_text(root), "xy");
    }

    #[test]
    fn qualified_attributes_keep_distinct_keys() {
        let tree = DomTree::parse_str(
            r#"<book xmlns:a="urn:a" xml:lang="en" lang="fr" a:id="1" id="2"/>"#,
        )
        .unwrap();
        let attributes = tree.attributes(tree.document_element());
        assert_eq!(attributes.len(), 4);
        assert_eq!(attributes["{http://www.w3.org/XML/1998/namespace}lang"], "en");
        assert_eq!(attributes["lang"], "fr");
        assert_eq!(attributes["{urn:a}id"], "1");
        assert_eq!(attributes["id"], "2");
    }

    #[test]
    fn doctype_is_accepted() {
        let tree = DomTree::parse_str(
            "<!DOCTYPE root [<!ENTITY who \"world\">]><root>hello &who;</root>",
        )
        .unwrap();
        assert_eq!(tree.direct_text(tree.document_element()), "hello world");
    }

    #[test]
    fn parse_failure_is_malformed() {
        let err = DomTree::parse_str("<root><unclosed>").unwrap_err();
        assert_eq!(err.kind(), xml_search_traits::ErrorKind::MalformedDocument);
    }
}
