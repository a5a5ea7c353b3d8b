//! Streaming search strategy for the unified XML search abstraction
//!
//! Reads the document as a sequence of start, end and text events and
//! never builds a tree. Element and attribute names are taken literally,
//! prefixes included.

pub mod handler;
pub mod reader;
pub mod strategy;

pub use handler::{AttributeCollector, ElementNameCollector, SearchHandler};
pub use reader::{drive, EventHandler};
pub use strategy::SaxStrategy;
