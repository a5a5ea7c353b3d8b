//! In-memory tree search strategy for the unified XML search abstraction
//!
//! Parses the whole document with xot, then walks element nodes depth-first.
//! xot resolves namespaces while parsing, so tags are reported by local
//! name and namespaced attributes by Clark name (`{uri}local`).

pub mod strategy;
pub mod tree;

pub use strategy::DomStrategy;
pub use tree::DomTree;

pub use xot::Node;
