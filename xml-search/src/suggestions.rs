//! Filter suggestions for interactive callers
//!
//! Discovery failures here are logged and turned into empty lists, so a
//! broken document never aborts a session that only wanted hints. Callers
//! who need the precise failure should use the strategy methods directly.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::warn;
use xml_search_traits::{ParserStrategy, Result};

/// Values a caller can offer for each query field
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub elements: Vec<String>,
    pub attributes: Vec<String>,
    pub values: Vec<String>,
}

impl Suggestions {
    /// Discover element names, then attributes of `element`, then values of `attribute` on it.
    ///
    /// Later lists stay empty when the field they depend on is not given.
    pub fn load(
        strategy: &dyn ParserStrategy,
        file: &Path,
        element: Option<&str>,
        attribute: Option<&str>,
    ) -> Self {
        let parser = strategy.parser_name();
        let elements = or_empty(parser, "element names", strategy.element_names(file));

        let element = element.map(str::trim).filter(|e| !e.is_empty());
        let attribute = attribute.map(str::trim).filter(|a| !a.is_empty());

        let attributes = match element {
            Some(element) => or_empty(
                parser,
                "attribute names",
                strategy.available_attributes(file, element),
            ),
            None => Vec::new(),
        };
        let values = match (element, attribute) {
            (Some(element), Some(attribute)) => or_empty(
                parser,
                "attribute values",
                strategy.attribute_values(file, element, attribute),
            ),
            _ => Vec::new(),
        };

        Self {
            elements,
            attributes,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.attributes.is_empty() && self.values.is_empty()
    }
}

fn or_empty(parser: &str, what: &str, found: Result<BTreeSet<String>>) -> Vec<String> {
    match found {
        Ok(set) => set.into_iter().collect(),
        Err(err) => {
            warn!(parser, kind = %err.kind(), error = %err, "could not load {}", what);
            Vec::new()
        }
    }
}
