//! ParserStrategy implementation for the in-memory tree

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use xml_search_traits::strategy::{enter_phase, fail};
use xml_search_traits::{
    elapsed_ms, record_search, tag_matches, validate_file, EventSink, ParsedElement,
    ParserStrategy, Phase, Result, SearchQuery, SearchResult,
};
use xot::Node;

use crate::tree::DomTree;

/// Full-document parse followed by a recursive pre-order walk
#[derive(Default, Clone)]
pub struct DomStrategy {
    sink: Option<Arc<dyn EventSink>>,
}

impl DomStrategy {
    pub const NAME: &'static str = "DOM Parser";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report every completed search to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn load(&self, file: &Path) -> Result<DomTree> {
        enter_phase(Self::NAME, Phase::Validating);
        validate_file(file).map_err(|e| fail(Self::NAME, e))?;
        enter_phase(Self::NAME, Phase::Parsing);
        DomTree::parse_file(file).map_err(|e| fail(Self::NAME, e))
    }

    /// Visit `node`, then every element below it
    fn search_elements(
        tree: &DomTree,
        node: Node,
        query: &SearchQuery,
        results: &mut Vec<ParsedElement>,
        path: &mut Vec<String>,
    ) {
        let Some(tag) = tree.tag(node) else {
            return;
        };
        path.push(tag.to_string());

        if query.matches_element(tag) {
            let attributes = tree.attributes(node);
            if query.matches_attribute(&attributes) {
                let text = tree.direct_text(node);
                let text = text.trim();
                if query.matches_text(text) {
                    results.push(ParsedElement::new(tag, attributes, path.join("/")).with_text(text));
                }
            }
        }

        for child in tree.child_elements(node) {
            Self::search_elements(tree, child, query, results, path);
        }
        path.pop();
    }

    fn collect_attributes(
        tree: &DomTree,
        node: Node,
        element_name: &str,
        attribute_name: Option<&str>,
        found: &mut BTreeSet<String>,
    ) {
        if tree.tag(node).is_some_and(|tag| tag_matches(tag, element_name)) {
            let attributes = tree.attributes(node);
            match attribute_name {
                Some(name) => found.extend(attributes.get(name).cloned()),
                None => found.extend(attributes.into_keys()),
            }
        }
        for child in tree.child_elements(node) {
            Self::collect_attributes(tree, child, element_name, attribute_name, found);
        }
    }

    fn collect_names(tree: &DomTree, node: Node, names: &mut BTreeSet<String>) {
        if let Some(tag) = tree.tag(node) {
            names.insert(tag.to_string());
        }
        for child in tree.child_elements(node) {
            Self::collect_names(tree, child, names);
        }
    }
}

impl std::fmt::Debug for DomStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomStrategy")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl ParserStrategy for DomStrategy {
    fn parse(&self, file: &Path, query: &SearchQuery) -> Result<SearchResult> {
        enter_phase(Self::NAME, Phase::Validating);
        validate_file(file).map_err(|e| fail(Self::NAME, e))?;

        let start = Instant::now();
        enter_phase(Self::NAME, Phase::Parsing);
        let tree = DomTree::parse_file(file).map_err(|e| fail(Self::NAME, e))?;

        enter_phase(Self::NAME, Phase::Searching);
        let mut results = Vec::new();
        let mut path = Vec::new();
        Self::search_elements(&tree, tree.document_element(), query, &mut results, &mut path);
        let execution_time_ms = elapsed_ms(start);
        enter_phase(Self::NAME, Phase::Done);

        let result = SearchResult::new(query.clone(), results, Self::NAME, execution_time_ms);
        record_search(self.sink.as_deref(), file, &result);
        Ok(result)
    }

    fn available_attributes(&self, file: &Path, element_name: &str) -> Result<BTreeSet<String>> {
        let tree = self.load(file)?;
        let mut found = BTreeSet::new();
        Self::collect_attributes(&tree, tree.document_element(), element_name, None, &mut found);
        Ok(found)
    }

    fn attribute_values(
        &self,
        file: &Path,
        element_name: &str,
        attribute_name: &str,
    ) -> Result<BTreeSet<String>> {
        let tree = self.load(file)?;
        let mut found = BTreeSet::new();
        Self::collect_attributes(
            &tree,
            tree.document_element(),
            element_name,
            Some(attribute_name),
            &mut found,
        );
        Ok(found)
    }

    fn element_names(&self, file: &Path) -> Result<BTreeSet<String>> {
        let tree = self.load(file)?;
        let mut names = BTreeSet::new();
        Self::collect_names(&tree, tree.document_element(), &mut names);
        Ok(names)
    }

    fn parser_name(&self) -> &'static str {
        Self::NAME
    }
}
