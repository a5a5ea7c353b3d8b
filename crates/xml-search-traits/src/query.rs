//! Search query filters

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Case-insensitive comparison of a document tag against a requested element name
pub fn tag_matches(tag: &str, element_name: &str) -> bool {
    tag == element_name || tag.to_lowercase() == element_name.to_lowercase()
}

/// Filters applied to every element a strategy visits.
///
/// The element name is required. The attribute pair only filters when both
/// halves are present and non-empty, and the text filter only when it is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub element_name: String,
    pub attribute_name: Option<String>,
    pub attribute_value: Option<String>,
    pub text_contains: Option<String>,
}

impl SearchQuery {
    /// Create a query that matches every element with the given name
    pub fn new<S: Into<String>>(element_name: S) -> Self {
        Self {
            element_name: element_name.into(),
            attribute_name: None,
            attribute_value: None,
            text_contains: None,
        }
    }

    /// Require `name` to be present with exactly `value`
    pub fn with_attribute<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.attribute_name = Some(name.into());
        self.attribute_value = Some(value.into());
        self
    }

    /// Require the element's direct text to contain `text`, ignoring case
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text_contains = Some(text.into());
        self
    }

    /// Caller-side check that the query is complete enough to run.
    ///
    /// Strategies never call this themselves.
    pub fn validate(&self) -> Result<()> {
        if self.element_name.trim().is_empty() {
            return Err(Error::invalid_input("element name must not be empty"));
        }
        Ok(())
    }

    pub fn matches_element(&self, element_name: &str) -> bool {
        tag_matches(element_name, &self.element_name)
    }

    pub fn matches_attribute(&self, attributes: &BTreeMap<String, String>) -> bool {
        match (self.attribute_filter(), self.attribute_value.as_deref()) {
            (Some(name), Some(value)) if !value.is_empty() => {
                attributes.get(name).is_some_and(|actual| actual == value)
            }
            _ => true,
        }
    }

    pub fn matches_text(&self, text: &str) -> bool {
        match self.text_filter() {
            Some(needle) => text.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// Attribute name, if it takes part in filtering
    pub fn attribute_filter(&self) -> Option<&str> {
        self.attribute_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Text needle, if it takes part in filtering
    pub fn text_filter(&self) -> Option<&str> {
        self.text_contains.as_deref().filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn element_match_ignores_case() {
        let query = SearchQuery::new("Book");
        assert!(query.matches_element("book"));
        assert!(query.matches_element("BOOK"));
        assert!(query.matches_element("Book"));
        assert!(!query.matches_element("books"));
    }

    #[test]
    fn attribute_filter_is_vacuous_without_name_or_value() {
        let query = SearchQuery::new("book");
        assert!(query.matches_attribute(&attrs(&[])));
        assert!(query.matches_attribute(&attrs(&[("id", "1")])));

        let mut half = SearchQuery::new("book");
        half.attribute_name = Some("id".to_string());
        assert!(half.matches_attribute(&attrs(&[])));

        let empty = SearchQuery::new("book").with_attribute("id", "");
        assert!(empty.matches_attribute(&attrs(&[("id", "7")])));
    }

    #[test]
    fn attribute_filter_is_exact_and_case_sensitive() {
        let query = SearchQuery::new("book").with_attribute("lang", "en");
        assert!(query.matches_attribute(&attrs(&[("lang", "en")])));
        assert!(!query.matches_attribute(&attrs(&[("lang", "EN")])));
        assert!(!query.matches_attribute(&attrs(&[("Lang", "en")])));
        assert!(!query.matches_attribute(&attrs(&[])));
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let query = SearchQuery::new("item").with_text("cat");
        assert!(query.matches_text("Category A"));
        assert!(query.matches_text("concatenate"));
        assert!(!query.matches_text("dog"));
        assert!(SearchQuery::new("item").matches_text(""));
        assert!(SearchQuery::new("item").with_text("").matches_text("anything"));
    }

    #[test]
    fn validate_rejects_blank_element_name() {
        assert!(SearchQuery::new("book").validate().is_ok());
        let err = SearchQuery::new("  ").validate().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }
}
