//! ParserStrategy implementation for the element tree

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use xml_search_traits::strategy::{enter_phase, fail};
use xml_search_traits::{
    elapsed_ms, read_document, record_search, strip_doctype, tag_matches, validate_file,
    EventSink, ParsedElement, ParserStrategy, Phase, Result, SearchQuery, SearchResult,
};

use crate::element::{strip_namespace, Element, ElementTree};
use crate::xpath::select_positions;

/// Element-tree search with namespace stripping.
///
/// Tags are compared and reported by local name. Attribute keys keep their
/// `{uri}local` form. Direct text is the element's `text` (the text before
/// its first child, comments skipped), never its tail.
#[derive(Default, Clone)]
pub struct EtreeStrategy {
    sink: Option<Arc<dyn EventSink>>,
}

impl EtreeStrategy {
    pub const NAME: &'static str = "ElementTree Parser";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report every completed search to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn load(&self, file: &Path) -> Result<ElementTree> {
        enter_phase(Self::NAME, Phase::Validating);
        validate_file(file).map_err(|e| fail(Self::NAME, e))?;
        enter_phase(Self::NAME, Phase::Parsing);
        ElementTree::parse_file(file).map_err(|e| fail(Self::NAME, e))
    }

    /// Evaluate an XPath expression and return the elements it selects.
    ///
    /// Not part of [`ParserStrategy`]; returns raw element nodes in
    /// document order. Names in the expression are matched with their
    /// namespace, so only unqualified elements are reachable by plain name.
    pub fn select(&self, file: &Path, expr: &str) -> Result<Vec<Element>> {
        enter_phase(Self::NAME, Phase::Validating);
        validate_file(file).map_err(|e| fail(Self::NAME, e))?;

        enter_phase(Self::NAME, Phase::Parsing);
        let content = read_document(file).map_err(|e| fail(Self::NAME, e))?;
        let xml = strip_doctype(&content).map_err(|e| fail(Self::NAME, e))?;
        let tree = ElementTree::parse_str(&xml).map_err(|e| fail(Self::NAME, e))?;

        enter_phase(Self::NAME, Phase::Searching);
        let positions = select_positions(&xml, expr).map_err(|e| fail(Self::NAME, e))?;
        let elements: Vec<&Element> = tree.root().iter().collect();
        enter_phase(Self::NAME, Phase::Done);

        Ok(positions
            .into_iter()
            .filter_map(|position| elements.get(position).map(|element| (*element).clone()))
            .collect())
    }

    /// Pre-order walk with an explicit stack; `path` is cut back to each node's depth
    fn search_elements(root: &Element, query: &SearchQuery) -> Vec<ParsedElement> {
        let mut results = Vec::new();
        let mut path: Vec<&str> = Vec::new();
        let mut stack: Vec<(&Element, usize)> = vec![(root, 0)];

        while let Some((element, depth)) = stack.pop() {
            let tag = element.local_name();
            path.truncate(depth);
            path.push(tag);

            if query.matches_element(tag) && query.matches_attribute(&element.attrib) {
                let text = element.text.as_deref().unwrap_or_default();
                if query.matches_text(text) {
                    results.push(
                        ParsedElement::new(tag, element.attrib.clone(), path.join("/"))
                            .with_text(text.trim()),
                    );
                }
            }

            stack.extend(element.children.iter().rev().map(|child| (child, depth + 1)));
        }
        results
    }
}

impl std::fmt::Debug for EtreeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtreeStrategy")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl ParserStrategy for EtreeStrategy {
    fn parse(&self, file: &Path, query: &SearchQuery) -> Result<SearchResult> {
        enter_phase(Self::NAME, Phase::Validating);
        validate_file(file).map_err(|e| fail(Self::NAME, e))?;

        let start = Instant::now();
        enter_phase(Self::NAME, Phase::Parsing);
        let tree = ElementTree::parse_file(file).map_err(|e| fail(Self::NAME, e))?;

        enter_phase(Self::NAME, Phase::Searching);
        let elements = Self::search_elements(tree.root(), query);
        let execution_time_ms = elapsed_ms(start);
        enter_phase(Self::NAME, Phase::Done);

        let result = SearchResult::new(query.clone(), elements, Self::NAME, execution_time_ms);
        record_search(self.sink.as_deref(), file, &result);
        Ok(result)
    }

    fn available_attributes(&self, file: &Path, element_name: &str) -> Result<BTreeSet<String>> {
        let tree = self.load(file)?;
        Ok(tree
            .root()
            .iter()
            .filter(|element| tag_matches(element.local_name(), element_name))
            .flat_map(|element| element.attrib.keys().cloned())
            .collect())
    }

    fn attribute_values(
        &self,
        file: &Path,
        element_name: &str,
        attribute_name: &str,
    ) -> Result<BTreeSet<String>> {
        let tree = self.load(file)?;
        Ok(tree
            .root()
            .iter()
            .filter(|element| tag_matches(element.local_name(), element_name))
            .filter_map(|element| element.get(attribute_name).map(str::to_string))
            .collect())
    }

    fn element_names(&self, file: &Path) -> Result<BTreeSet<String>> {
        let tree = self.load(file)?;
        Ok(tree
            .root()
            .iter()
            .map(|element| strip_namespace(&element.tag).to_string())
            .collect())
    }

    fn parser_name(&self) -> &'static str {
        Self::NAME
    }
}
