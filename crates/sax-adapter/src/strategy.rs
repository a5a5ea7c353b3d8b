//! ParserStrategy implementation for the streaming reader

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use xml_search_traits::strategy::{enter_phase, fail};
use xml_search_traits::{
    elapsed_ms, record_search, validate_file, EventSink, ParserStrategy, Phase, Result,
    SearchQuery, SearchResult,
};

use crate::handler::{AttributeCollector, ElementNameCollector, SearchHandler};
use crate::reader::drive;

/// Single-pass, event-driven search
#[derive(Default, Clone)]
pub struct SaxStrategy {
    sink: Option<Arc<dyn EventSink>>,
}

impl SaxStrategy {
    pub const NAME: &'static str = "SAX Parser";

    pub fn new() -> Self {
        Self::default()
    }

    /// Report every completed search to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn validate(&self, file: &Path) -> Result<()> {
        enter_phase(Self::NAME, Phase::Validating);
        validate_file(file).map_err(|e| fail(Self::NAME, e))
    }
}

impl std::fmt::Debug for SaxStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaxStrategy")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl ParserStrategy for SaxStrategy {
    fn parse(&self, file: &Path, query: &SearchQuery) -> Result<SearchResult> {
        self.validate(file)?;

        let start = Instant::now();
        // parsing and searching interleave in a single pass
        enter_phase(Self::NAME, Phase::Parsing);
        let mut handler = SearchHandler::new(query);
        drive(file, &mut handler).map_err(|e| fail(Self::NAME, e))?;
        let elements = handler.into_results();
        let execution_time_ms = elapsed_ms(start);
        enter_phase(Self::NAME, Phase::Done);

        let result = SearchResult::new(query.clone(), elements, Self::NAME, execution_time_ms);
        record_search(self.sink.as_deref(), file, &result);
        Ok(result)
    }

    fn available_attributes(&self, file: &Path, element_name: &str) -> Result<BTreeSet<String>> {
        self.validate(file)?;
        let mut collector = AttributeCollector::names(element_name);
        drive(file, &mut collector).map_err(|e| fail(Self::NAME, e))?;
        Ok(collector.into_found())
    }

    fn attribute_values(
        &self,
        file: &Path,
        element_name: &str,
        attribute_name: &str,
    ) -> Result<BTreeSet<String>> {
        self.validate(file)?;
        let mut collector = AttributeCollector::values(element_name, attribute_name);
        drive(file, &mut collector).map_err(|e| fail(Self::NAME, e))?;
        Ok(collector.into_found())
    }

    fn element_names(&self, file: &Path) -> Result<BTreeSet<String>> {
        self.validate(file)?;
        let mut collector = ElementNameCollector::default();
        drive(file, &mut collector).map_err(|e| fail(Self::NAME, e))?;
        Ok(collector.into_names())
    }

    fn parser_name(&self) -> &'static str {
        Self::NAME
    }
}
