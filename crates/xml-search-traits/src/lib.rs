//! Core abstractions for multi-strategy XML search.
//!
//! This crate defines the query/result model and the trait that every
//! search strategy implements, so callers can swap parsing technologies
//! without changing how they ask or what they get back.

pub mod error;
pub mod events;
pub mod prolog;
pub mod query;
pub mod result;
pub mod strategy;

pub use error::{Error, ErrorKind, Result};
pub use events::{record_search, EventSink, MemorySink, SearchEvent, TracingSink};
pub use prolog::{decode_document, strip_doctype, Entities};
pub use query::{tag_matches, SearchQuery};
pub use result::{ParsedElement, SearchResult};
pub use strategy::{elapsed_ms, read_document, validate_file, ParserStrategy, Phase};
