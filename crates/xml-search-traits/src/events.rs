//! Completed-search events and the sinks that receive them

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::result::SearchResult;

/// One line describing a finished search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEvent {
    pub parser: String,
    pub file_name: String,
    pub element_name: String,
    pub match_count: usize,
    pub elapsed_ms: f64,
}

impl SearchEvent {
    pub fn from_result(file: &Path, result: &SearchResult) -> Self {
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        Self {
            parser: result.parser_type.clone(),
            file_name,
            element_name: result.query.element_name.clone(),
            match_count: result.count(),
            elapsed_ms: result.execution_time_ms,
        }
    }
}

impl fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parser: {}, File: {}, Element: {}, Found: {} elements, Elapsed: {:.2} ms",
            self.parser, self.file_name, self.element_name, self.match_count, self.elapsed_ms
        )
    }
}

/// Destination for search events.
///
/// Persisting them (an append-only log, a remote store) is up to the
/// implementor.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &SearchEvent);
}

/// Sink that forwards events to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &SearchEvent) {
        tracing::info!(
            parser = %event.parser,
            file = %event.file_name,
            element = %event.element_name,
            matches = event.match_count,
            elapsed_ms = event.elapsed_ms,
            "{}",
            event
        );
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<SearchEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<SearchEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &SearchEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Log a finished search and hand it to the optional sink
pub fn record_search(sink: Option<&dyn EventSink>, file: &Path, result: &SearchResult) {
    let event = SearchEvent::from_result(file, result);
    tracing::debug!(
        parser = %event.parser,
        file = %event.file_name,
        matches = event.match_count,
        "search completed"
    );
    if let Some(sink) = sink {
        sink.record(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchQuery;

    #[test]
    fn event_line_format() {
        let result = SearchResult::new(SearchQuery::new("book"), vec![], "SAX Parser", 3.456);
        let event = SearchEvent::from_result(Path::new("/tmp/data/catalog.xml"), &result);
        assert_eq!(
            event.to_string(),
            "Parser: SAX Parser, File: catalog.xml, Element: book, Found: 0 elements, Elapsed: 3.46 ms"
        );
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        let first = SearchResult::new(SearchQuery::new("a"), vec![], "DOM Parser", 1.0);
        let second = SearchResult::new(SearchQuery::new("b"), vec![], "DOM Parser", 2.0);
        record_search(Some(&sink), Path::new("doc.xml"), &first);
        record_search(Some(&sink), Path::new("doc.xml"), &second);
        record_search(None, Path::new("doc.xml"), &second);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].element_name, "a");
        assert_eq!(events[1].element_name, "b");
    }
}
