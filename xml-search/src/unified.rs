//! Runtime strategy selection
//!
//! [`StrategyKind`] names the built-in strategies and [`Registry`] maps
//! names to shared instances, so callers can pick a strategy from a string.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dom_adapter::DomStrategy;
use etree_adapter::EtreeStrategy;
use sax_adapter::SaxStrategy;
use xml_search_traits::{Error, EventSink, ParserStrategy, Result};

/// Built-in strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// quick-xml event stream, raw qualified names
    Sax,
    /// xot tree, local names
    Dom,
    /// roxmltree element tree, Clark names stripped for comparison
    ElementTree,
}

impl StrategyKind {
    pub fn all() -> &'static [StrategyKind] {
        &[StrategyKind::Sax, StrategyKind::Dom, StrategyKind::ElementTree]
    }

    /// Short registry key
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::Sax => "sax",
            StrategyKind::Dom => "dom",
            StrategyKind::ElementTree => "etree",
        }
    }

    /// Create a new strategy of this kind
    pub fn build(self) -> Arc<dyn ParserStrategy> {
        match self {
            StrategyKind::Sax => Arc::new(SaxStrategy::new()),
            StrategyKind::Dom => Arc::new(DomStrategy::new()),
            StrategyKind::ElementTree => Arc::new(EtreeStrategy::new()),
        }
    }

    /// Create a new strategy of this kind that reports to `sink`
    pub fn build_with_sink(self, sink: Arc<dyn EventSink>) -> Arc<dyn ParserStrategy> {
        match self {
            StrategyKind::Sax => Arc::new(SaxStrategy::new().with_sink(sink)),
            StrategyKind::Dom => Arc::new(DomStrategy::new().with_sink(sink)),
            StrategyKind::ElementTree => Arc::new(EtreeStrategy::new().with_sink(sink)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sax" | "stream" | "streaming" => Ok(StrategyKind::Sax),
            "dom" | "tree" => Ok(StrategyKind::Dom),
            "etree" | "elementtree" | "element-tree" => Ok(StrategyKind::ElementTree),
            other => Err(Error::invalid_input(format!(
                "unknown strategy '{}' (expected sax, dom or etree)",
                other
            ))),
        }
    }
}

/// Name to strategy mapping, in registration order
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<(String, Arc<dyn ParserStrategy>)>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in strategy under its [`StrategyKind::key`]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in StrategyKind::all() {
            registry.register(kind.key(), kind.build());
        }
        registry
    }

    /// Every built-in strategy, each reporting to `sink`
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        let mut registry = Self::new();
        for kind in StrategyKind::all() {
            registry.register(kind.key(), kind.build_with_sink(Arc::clone(&sink)));
        }
        registry
    }

    /// Add `strategy` under `name`, replacing any entry with the same name
    pub fn register<S: Into<String>>(&mut self, name: S, strategy: Arc<dyn ParserStrategy>) {
        let name = name.into().to_ascii_lowercase();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = strategy,
            None => self.entries.push((name, strategy)),
        }
    }

    /// Look a strategy up by key, kind alias or display name, ignoring case
    pub fn get(&self, name: &str) -> Option<Arc<dyn ParserStrategy>> {
        let wanted = name.trim().to_ascii_lowercase();
        let key = wanted
            .parse::<StrategyKind>()
            .map(|kind| kind.key().to_string())
            .unwrap_or_else(|_| wanted.clone());

        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(_, s)| s.parser_name().to_ascii_lowercase() == wanted)
            })
            .map(|(_, strategy)| Arc::clone(strategy))
    }

    /// Like [`Registry::get`], but unknown names are an `InvalidInput` error
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ParserStrategy>> {
        self.get(name).ok_or_else(|| {
            Error::invalid_input(format!(
                "no strategy registered as '{}' (available: {})",
                name,
                self.names().join(", ")
            ))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn ParserStrategy> + '_ {
        self.entries.iter().map(|(_, strategy)| strategy.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(name, strategy)| (name, strategy.parser_name())),
            )
            .finish()
    }
}
