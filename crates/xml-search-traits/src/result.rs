//! Result types for XML search

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::SearchQuery;

/// Maximum number of characters of element text shown in [`SearchResult::detailed`]
const TEXT_PREVIEW_CHARS: usize = 100;

/// One matched element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Trimmed direct text
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParsedElement>,
    /// Slash-joined tag names from the document element down to this one
    pub path: String,
}

impl ParsedElement {
    pub fn new<T: Into<String>, P: Into<String>>(
        tag: T,
        attributes: BTreeMap<String, String>,
        path: P,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            text: String::new(),
            children: Vec::new(),
            path: path.into(),
        }
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn children_count(&self) -> usize {
        self.children.len()
    }
}

impl fmt::Display for ParsedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attributes.is_empty() {
            return write!(f, "<{}>", self.tag);
        }
        let attrs: Vec<String> = self
            .attributes
            .iter()
            .map(|(k, v)| format!("{}='{}'", k, v))
            .collect();
        write!(f, "<{} {}>", self.tag, attrs.join(", "))
    }
}

/// Everything one strategy found for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: SearchQuery,
    /// Matches in document order
    pub elements: Vec<ParsedElement>,
    pub parser_type: String,
    pub execution_time_ms: f64,
}

impl SearchResult {
    pub fn new<S: Into<String>>(
        query: SearchQuery,
        elements: Vec<ParsedElement>,
        parser_type: S,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            query,
            elements,
            parser_type: parser_type.into(),
            execution_time_ms,
        }
    }

    pub fn add_element(&mut self, element: ParsedElement) {
        self.elements.push(element);
    }

    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Header block: parser, query, active filters, count and timing
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Parser: {}", self.parser_type),
            format!("Query: {}", self.query.element_name),
        ];

        if let Some(text) = self.query.text_filter() {
            lines.push(format!("Text filter: contains '{}'", text));
        }
        if let Some(name) = self.query.attribute_filter() {
            lines.push(format!(
                "Attribute filter: {}={}",
                name,
                self.query.attribute_value.as_deref().unwrap_or_default()
            ));
        }

        lines.push(format!("Results found: {}", self.count()));
        lines.push(format!("Execution time: {:.2}ms", self.execution_time_ms));
        lines.push(String::new());
        lines.join("\n")
    }

    /// Summary followed by a numbered listing of every match
    pub fn detailed(&self) -> String {
        if self.is_empty() {
            return format!("{}\nNo results found.", self.summary());
        }

        let mut lines = vec![self.summary(), "Results:".to_string()];
        for (idx, element) in self.elements.iter().enumerate() {
            lines.push(format!("\n{}. {}", idx + 1, element));
            if !element.path.is_empty() {
                lines.push(format!("   Path: {}", element.path));
            }
            for (key, value) in &element.attributes {
                lines.push(format!("   @{}: {}", key, value));
            }
            let text = element.text.trim();
            if !text.is_empty() {
                let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
                lines.push(format!("   Text: {}...", preview));
            }
        }
        lines.join("\n")
    }
}
