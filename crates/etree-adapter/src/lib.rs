//! Element-tree search strategy for the unified XML search abstraction
//!
//! Parses with roxmltree into a flat element model (element children,
//! `text`, `tail`, attribute map) and walks it iteratively. Also offers an
//! XPath selector, evaluated by xee, for callers that need raw nodes.

pub mod element;
pub mod strategy;
pub mod xpath;

pub use element::{strip_namespace, Element, ElementTree};
pub use strategy::EtreeStrategy;
pub use xpath::select_positions;
