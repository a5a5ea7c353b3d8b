//! Per-call event handlers.
//!
//! A fresh handler is built for every strategy call, so concurrent streams
//! never share state.

use std::collections::{BTreeMap, BTreeSet};

use xml_search_traits::{tag_matches, ParsedElement, SearchQuery};

use crate::reader::EventHandler;

/// Path stack, one candidate slot and a text buffer
pub struct SearchHandler<'q> {
    query: &'q SearchQuery,
    results: Vec<ParsedElement>,
    path: Vec<String>,
    text: String,
    candidate: Option<ParsedElement>,
}

impl<'q> SearchHandler<'q> {
    pub fn new(query: &'q SearchQuery) -> Self {
        Self {
            query,
            results: Vec::new(),
            path: Vec::new(),
            text: String::new(),
            candidate: None,
        }
    }

    pub fn into_results(self) -> Vec<ParsedElement> {
        self.results
    }
}

impl EventHandler for SearchHandler<'_> {
    fn start_element(&mut self, name: &str, attributes: &BTreeMap<String, String>) {
        self.path.push(name.to_string());
        self.text.clear();

        if self.query.matches_element(name) && self.query.matches_attribute(attributes) {
            self.candidate = Some(ParsedElement::new(
                name,
                attributes.clone(),
                self.path.join("/"),
            ));
        }
    }

    fn end_element(&mut self, name: &str) {
        if let Some(mut candidate) = self.candidate.take() {
            if candidate.tag == name {
                candidate.text = self.text.trim().to_string();
                if self.query.matches_text(&candidate.text) {
                    self.results.push(candidate);
                }
            } else {
                self.candidate = Some(candidate);
            }
        }

        self.path.pop();
        self.text.clear();
    }

    fn characters(&mut self, content: &str) {
        self.text.push_str(content);
    }
}

/// Attribute names, or the values of one attribute, on matching start tags
pub struct AttributeCollector<'a> {
    element_name: &'a str,
    attribute_name: Option<&'a str>,
    found: BTreeSet<String>,
}

impl<'a> AttributeCollector<'a> {
    /// Collect attribute names
    pub fn names(element_name: &'a str) -> Self {
        Self {
            element_name,
            attribute_name: None,
            found: BTreeSet::new(),
        }
    }

    /// Collect the values of `attribute_name`
    pub fn values(element_name: &'a str, attribute_name: &'a str) -> Self {
        Self {
            element_name,
            attribute_name: Some(attribute_name),
            found: BTreeSet::new(),
        }
    }

    pub fn into_found(self) -> BTreeSet<String> {
        self.found
    }
}

impl EventHandler for AttributeCollector<'_> {
    fn start_element(&mut self, name: &str, attributes: &BTreeMap<String, String>) {
        if !tag_matches(name, self.element_name) {
            return;
        }
        match self.attribute_name {
            Some(attribute) => {
                if let Some(value) = attributes.get(attribute) {
                    self.found.insert(value.clone());
                }
            }
            None => self.found.extend(attributes.keys().cloned()),
        }
    }
}

/// Every distinct start-tag name
#[derive(Default)]
pub struct ElementNameCollector {
    names: BTreeSet<String>,
}

impl ElementNameCollector {
    pub fn into_names(self) -> BTreeSet<String> {
        self.names
    }
}

impl EventHandler for ElementNameCollector {
    fn start_element(&mut self, name: &str, _attributes: &BTreeMap<String, String>) {
        self.names.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn text_is_attributed_to_innermost_element() {
        let query = SearchQuery::new("title");
        let mut handler = SearchHandler::new(&query);
        handler.start_element("book", &no_attrs());
        handler.characters("  ignored  ");
        handler.start_element("title", &no_attrs());
        handler.characters("  Dune ");
        handler.end_element("title");
        handler.end_element("book");

        let results = handler.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "Dune");
        assert_eq!(results[0].path, "book/title");
    }

    #[test]
    fn candidate_survives_unrelated_end_tags() {
        let query = SearchQuery::new("book");
        let mut handler = SearchHandler::new(&query);
        handler.start_element("book", &no_attrs());
        handler.start_element("title", &no_attrs());
        handler.characters("Dune");
        handler.end_element("title");
        handler.end_element("book");

        let results = handler.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tag, "book");
        // buffer was reset by </title>
        assert_eq!(results[0].text, "");
    }

    #[test]
    fn nested_match_replaces_outer_candidate() {
        let query = SearchQuery::new("item");
        let mut handler = SearchHandler::new(&query);
        handler.start_element("item", &no_attrs());
        handler.start_element("item", &no_attrs());
        handler.characters("inner");
        handler.end_element("item");
        handler.end_element("item");

        let results = handler.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "inner");
        assert_eq!(results[0].path, "item/item");
    }

    #[test]
    fn attribute_collector_modes() {
        let mut attrs = BTreeMap::new();
        attrs.insert("id".to_string(), "b1".to_string());
        attrs.insert("lang".to_string(), "en".to_string());

        let mut names = AttributeCollector::names("BOOK");
        names.start_element("book", &attrs);
        names.start_element("shelf", &attrs);
        let names = names.into_found();
        assert_eq!(names.len(), 2);
        assert!(names.contains("id") && names.contains("lang"));

        let mut values = AttributeCollector::values("book", "lang");
        values.start_element("book", &attrs);
        values.start_element("book", &no_attrs());
        assert_eq!(values.into_found().into_iter().collect::<Vec<_>>(), vec!["en"]);
    }
}
