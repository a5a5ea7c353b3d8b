//! Reporting for XML search results
//!
//! Exports a [`SearchResult`](xml_search_traits::SearchResult) as text, XML
//! or JSON, and compares the output of several strategies on one query.

pub mod compare;
pub mod format;
pub mod xml;

pub use compare::{compare_strategies, ComparisonReport, StrategySummary};
pub use format::{export_to_file, render, ExportFormat, Payload};
pub use xml::{result_to_xml, results_to_xml};
