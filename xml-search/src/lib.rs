//! xml-search: one query, three XML parsing strategies
//!
//! Runs the same element/attribute/text query against a document with an
//! event-driven reader, an in-memory tree, or an element tree, and compares
//! what each one finds.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use xml_search::{ParserStrategy, SearchQuery, StrategyKind};
//!
//! let strategy = StrategyKind::Sax.build();
//! let query = SearchQuery::new("book").with_attribute("lang", "en");
//! let result = strategy.parse(Path::new("catalog.xml"), &query)?;
//! println!("{}", result.detailed());
//! # Ok::<(), xml_search::Error>(())
//! ```

pub mod suggestions;
pub mod unified;

// Re-export core types
pub use xml_search_traits::{
    record_search, tag_matches, Error, ErrorKind, EventSink, MemorySink, ParsedElement,
    ParserStrategy, Phase, Result, SearchEvent, SearchQuery, SearchResult, TracingSink,
};

// Re-export strategies
pub use dom_adapter::DomStrategy;
pub use etree_adapter::{Element, EtreeStrategy};
pub use sax_adapter::SaxStrategy;

// Re-export reporting
pub use xml_search_report::{
    compare_strategies, export_to_file, render, result_to_xml, results_to_xml, ComparisonReport,
    ExportFormat, Payload, StrategySummary,
};

pub use suggestions::Suggestions;
pub use unified::{Registry, StrategyKind};
